//! Embedded schema migrations via [`refinery`].
//!
//! SQL files live in `crates/jobly/migrations` and are compiled into the
//! binary, so a deployed service can bring its database up to date on start.

use crate::error::JoblyResult;

pub use refinery::{Report, Runner};

mod embedded {
    refinery::embed_migrations!("migrations");
}

/// Runner over every embedded migration.
pub fn runner() -> Runner {
    embedded::migrations::runner()
}

/// Apply pending migrations on a single connection.
pub async fn run(client: &mut tokio_postgres::Client) -> JoblyResult<Report> {
    Ok(runner().run_async(client).await?)
}

/// Acquire a connection from a pool and run migrations on it.
#[cfg(feature = "pool")]
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> JoblyResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client).await
}
