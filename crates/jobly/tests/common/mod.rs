#![allow(dead_code)]

use jobly::{Company, Decimal, Job, JoblyError, JoblyResult, NewCompany, NewJob};
use tokio::sync::OnceCell;
use tokio_postgres::{Client, NoTls, Transaction};

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connect to `DATABASE_URL` with the schema migrated, or `None` when unset.
pub async fn connect(test_name: &str) -> JoblyResult<Option<Client>> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test_name}");
            return Ok(None);
        }
    };

    MIGRATED
        .get_or_try_init(|| async {
            let mut client = open(&database_url).await?;
            jobly::migrate::run(&mut client).await.map(|_| ())
        })
        .await?;

    open(&database_url).await.map(Some)
}

async fn open(database_url: &str) -> JoblyResult<Client> {
    let (client, connection) = tokio_postgres::connect(database_url, NoTls)
        .await
        .map_err(JoblyError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(client)
}

pub fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

/// Replace table contents with the standard fixtures inside `tx`.
///
/// Companies c1, c2, c3, c35, c70 and one job each for c1, c2, c3.
pub async fn seed(tx: &Transaction<'_>) -> JoblyResult<()> {
    tx.batch_execute("DELETE FROM jobs; DELETE FROM companies")
        .await
        .map_err(JoblyError::from_db_error)?;

    for (handle, num_employees) in [("c1", 1), ("c2", 2), ("c3", 3), ("c35", 30), ("c70", 15)] {
        let company = NewCompany::new(
            handle,
            handle.to_uppercase(),
            format!("Desc{}", &handle[1..]),
        )
        .num_employees(num_employees)
        .logo_url(format!("http://{handle}.img"));
        Company::create(tx, &company).await?;
    }

    for (title, salary, handle) in [
        ("Software Developer", 850000, "c1"),
        ("Programmer", 85000, "c2"),
        ("Software Engineer", 85000, "c3"),
    ] {
        let job = NewJob::new(title, handle).salary(salary).equity(dec("0.005"));
        Job::create(tx, &job).await?;
    }

    Ok(())
}
