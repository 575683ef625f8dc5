#![allow(clippy::await_holding_lock)]
pub mod constants;
pub mod database_setup;
pub mod postgres;
pub mod resource;

use constants::*;
use ctor::dtor;
use dbqueue::{Config, PostgresStore};
use resource::{ResourceManager, TestResource, RESOURCE_MANAGER};

/// Pick the database for this run: DBQUEUE_TEST_DSN wins, DBQUEUE_TEST_CONTAINER=1
/// starts a container, anything else means no database.
fn resource_from_env() -> Option<Box<dyn TestResource>> {
    if let Ok(dsn) = std::env::var(ENV_TEST_DSN) {
        return Some(Box::new(postgres::ExternalPostgresResource::new(dsn)));
    }
    match std::env::var(ENV_TEST_CONTAINER).as_deref() {
        Ok("1") | Ok("true") => Some(Box::new(postgres::PostgresResource::new())),
        _ => None,
    }
}

/// DSN with `schema` freshly created, or `None` when no database is configured.
pub async fn get_test_dsn(schema: &str) -> Option<String> {
    {
        let guard = RESOURCE_MANAGER.read().unwrap();
        if let Some(manager) = guard.as_ref() {
            return Some(manager.resource.get_dsn(schema).await);
        }
    }

    let mut guard = RESOURCE_MANAGER.write().unwrap();
    if guard.is_none() {
        let resource = resource_from_env()?;
        resource
            .initialize()
            .await
            .expect("Failed to initialize test database");
        *guard = Some(ResourceManager::new(resource));
    }
    let manager = guard.as_ref()?;
    Some(manager.resource.get_dsn(schema).await)
}

/// Connected store with the message table installed in a fresh `schema`.
pub async fn create_store(schema: &str) -> Option<PostgresStore> {
    let dsn = get_test_dsn(schema).await?;
    let config = Config::from_dsn_with_schema(&dsn, schema)
        .expect("Failed to create config")
        .with_max_connections(MAX_CONNECTIONS);

    let store = PostgresStore::connect(&config)
        .await
        .unwrap_or_else(|e| panic!("Failed to connect with DSN: {}. Error: {:?}", dsn, e));
    store.install().await.expect("Failed to install dbqueue");
    Some(store)
}

/// Bind a store for `schema` or return early from the test when no database is configured.
#[macro_export]
macro_rules! store_or_skip {
    ($schema:expr) => {
        match common::create_store($schema).await {
            Some(store) => store,
            None => {
                eprintln!(
                    "Skipping test: set DBQUEUE_TEST_DSN or DBQUEUE_TEST_CONTAINER=1 to run against PostgreSQL"
                );
                return;
            }
        }
    };
}

#[dtor]
fn drop_database() {
    let mut guard = match RESOURCE_MANAGER.write() {
        Ok(g) => g,
        Err(e) => e.into_inner(),
    };

    if let Some(manager) = guard.take() {
        let rt = tokio::runtime::Runtime::new().expect("Failed to create cleanup runtime");
        rt.block_on(async {
            if let Err(e) = manager.resource.cleanup().await {
                eprintln!("Error during resource cleanup: {}", e);
            }
        });
    }
}
