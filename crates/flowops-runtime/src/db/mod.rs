mod pool;

pub use pool::Database;

/// Store settings for tests that need a live Postgres.
///
/// Only `TEST_DATABASE_URL` is read, never `DATABASE_URL`. Returns `None`
/// when it is unset so those tests pass as no-ops.
#[cfg(test)]
pub(crate) fn test_store_config() -> Option<flowops_core::config::StoreConfig> {
    match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => Some(flowops_core::config::StoreConfig {
            url,
            pool_size: 2,
            pool_timeout_secs: 5,
            ..Default::default()
        }),
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set, skipping live database test");
            None
        }
    }
}
