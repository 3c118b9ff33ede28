mod common;

use jobly::{FieldUpdate, Job, JobFilter, JoblyError, JoblyResult, NewJob};
use serde_json::json;

fn titles(jobs: &[Job]) -> Vec<&str> {
    jobs.iter().map(|j| j.title.as_str()).collect()
}

#[tokio::test]
async fn create_and_get_by_id() -> JoblyResult<()> {
    let Some(mut client) = common::connect("create_and_get_by_id").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    common::seed(&tx).await?;

    let new = NewJob::new("new", "c1").salary(100).equity(common::dec("0.001"));
    let job = Job::create(&tx, &new).await?;
    assert_eq!(job.title, "new");
    assert_eq!(job.salary, Some(100));
    assert_eq!(job.equity, Some(common::dec("0.001")));
    assert_eq!(job.company_handle, "c1");

    assert_eq!(Job::get(&tx, job.id).await?, job);

    let err = Job::get(&tx, -1).await.unwrap_err();
    assert!(err.is_not_found());

    // last statement: the failed insert aborts the transaction
    let err = Job::create(&tx, &NewJob::new("orphan", "nope")).await.unwrap_err();
    assert!(err.is_bad_request());
    assert_eq!(err.status_code(), 400);
    Ok(())
}

#[tokio::test]
async fn find_all_orders_by_id() -> JoblyResult<()> {
    let Some(mut client) = common::connect("find_all_orders_by_id").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    common::seed(&tx).await?;

    let jobs = Job::find_all(&tx).await?;
    assert_eq!(
        titles(&jobs),
        ["Software Developer", "Programmer", "Software Engineer"]
    );
    assert!(jobs.windows(2).all(|w| w[0].id < w[1].id));
    Ok(())
}

#[tokio::test]
async fn search_applies_every_criterion() -> JoblyResult<()> {
    let Some(mut client) = common::connect("search_applies_every_criterion").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    common::seed(&tx).await?;

    let filter = JobFilter::new()
        .title("software")
        .min_salary(95000)
        .has_equity(true);
    let jobs = Job::search(&tx, &filter).await?;
    assert_eq!(titles(&jobs), ["Software Developer"]);

    let jobs = Job::search(&tx, &JobFilter::new().title("SOFT")).await?;
    assert_eq!(titles(&jobs), ["Software Developer", "Software Engineer"]);

    let jobs = Job::search(&tx, &JobFilter::new()).await?;
    assert_eq!(jobs.len(), 3);

    // salary bound is exclusive
    let err = Job::search(&tx, &JobFilter::new().min_salary(850000))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "No such job found");
    Ok(())
}

#[tokio::test]
async fn search_with_equity_skips_zero_equity() -> JoblyResult<()> {
    let Some(mut client) = common::connect("search_with_equity_skips_zero_equity").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    common::seed(&tx).await?;

    let no_equity = NewJob::new("Intern", "c2").salary(1000).equity(common::dec("0"));
    Job::create(&tx, &no_equity).await?;

    let jobs = Job::search(&tx, &JobFilter::new().title("intern")).await?;
    assert_eq!(titles(&jobs), ["Intern"]);

    let err = Job::search(&tx, &JobFilter::new().title("intern").has_equity(true))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let filter = JobFilter::from_query_pairs([("title", "intern"), ("hasEquity", "false")])?;
    assert_eq!(Job::search(&tx, &filter).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn update_by_title_ignores_case() -> JoblyResult<()> {
    let Some(mut client) = common::connect("update_by_title_ignores_case").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    common::seed(&tx).await?;

    let fields = FieldUpdate::new()
        .with("salary", 5)
        .with("equity", 0.7)
        .with("companyHandle", "c3");
    let job = Job::update(&tx, "programmer", &fields).await?;
    assert_eq!(job.title, "Programmer");
    assert_eq!(job.salary, Some(5));
    assert_eq!(job.equity, Some(common::dec("0.7")));
    assert_eq!(job.company_handle, "c3");

    let err = Job::update(&tx, "nope", &FieldUpdate::new().with("salary", 1))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "No job found: nope");

    let err = Job::update(&tx, "programmer", &FieldUpdate::new().with("id", 9))
        .await
        .unwrap_err();
    assert!(err.is_bad_request());

    let err = Job::update(&tx, "programmer", &FieldUpdate::new()).await.unwrap_err();
    assert!(err.is_bad_request());

    // last statement: the failed update aborts the transaction
    let err = Job::update(
        &tx,
        "programmer",
        &FieldUpdate::new().with("companyHandle", "nope"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, JoblyError::ForeignKeyViolation(_)));
    assert_eq!(err.status_code(), 400);
    Ok(())
}

#[tokio::test]
async fn update_rejects_mistyped_values() -> JoblyResult<()> {
    let Some(mut client) = common::connect("update_rejects_mistyped_values").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    common::seed(&tx).await?;

    for body in [
        json!({"salary": "not-a-salary"}),
        json!({"equity": "lots"}),
        json!({"title": null}),
    ] {
        let fields = FieldUpdate::from_json(&body)?;
        let err = Job::update(&tx, "programmer", &fields).await.unwrap_err();
        assert!(err.is_bad_request(), "{body} gave {err:?}");
        assert_eq!(err.status_code(), 400);
    }

    // equity comes back as a string and can be sent back as one
    let programmer = Job::find_all(&tx).await?.remove(1);
    let as_json = serde_json::to_value(&programmer).expect("job serializes");
    let body = json!({"equity": as_json["equity"].clone(), "salary": 90000});
    let job = Job::update(&tx, "programmer", &FieldUpdate::from_json(&body)?).await?;
    assert_eq!(job.equity, Some(common::dec("0.005")));
    assert_eq!(job.salary, Some(90000));

    let fields = FieldUpdate::from_json(&json!({"equity": "0.5"}))?;
    let job = Job::update(&tx, "programmer", &fields).await?;
    assert_eq!(job.equity, Some(common::dec("0.5")));
    Ok(())
}

#[tokio::test]
async fn remove_by_title() -> JoblyResult<()> {
    let Some(mut client) = common::connect("remove_by_title").await? else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    common::seed(&tx).await?;

    Job::remove(&tx, "software engineer").await?;
    let remaining = Job::find_all(&tx).await?;
    assert_eq!(titles(&remaining), ["Software Developer", "Programmer"]);

    let err = Job::remove(&tx, "Software Engineer").await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}
