use async_trait::async_trait;
use std::sync::{Mutex, RwLock};
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;

use super::constants::*;
use super::database_setup::{cleanup_database_common, setup_database_common};
use super::resource::TestResource;

/// PostgreSQL testcontainer, started on first use
pub struct PostgresResource {
    container: RwLock<Option<PostgresContainer>>,
    schemas: Mutex<Vec<String>>,
}

impl PostgresResource {
    pub fn new() -> Self {
        Self {
            container: RwLock::new(None),
            schemas: Mutex::new(Vec::new()),
        }
    }
}

pub struct PostgresContainer {
    container: ContainerAsync<Postgres>,
    dsn: String,
}

impl PostgresContainer {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        println!("Starting PostgreSQL testcontainer...");

        let container = Postgres::default()
            .with_db_name(TEST_DB_NAME)
            .with_user(TEST_DB_USER)
            .with_password(TEST_DB_PASSWORD)
            .start()
            .await?;

        let dsn = format!(
            "postgres://{}:{}@{}:{}/{}",
            TEST_DB_USER,
            TEST_DB_PASSWORD,
            container.get_host().await?,
            container.get_host_port_ipv4(POSTGRES_PORT.tcp()).await?,
            TEST_DB_NAME
        );

        println!("PostgreSQL container started at {}", dsn);
        Ok(Self { container, dsn })
    }
}

#[async_trait]
impl TestResource for PostgresResource {
    async fn initialize(&self) -> Result<(), Box<dyn std::error::Error>> {
        let container = PostgresContainer::new().await?;
        *self.container.write().unwrap() = Some(container);
        Ok(())
    }

    async fn get_dsn(&self, schema: &str) -> String {
        let dsn = self
            .container
            .read()
            .unwrap()
            .as_ref()
            .expect("PostgresResource not initialized")
            .dsn
            .clone();

        setup_database_common(dsn.clone(), schema, "PostgreSQL container")
            .await
            .expect("Failed to setup database schema");
        self.schemas.lock().unwrap().push(schema.to_string());
        dsn
    }

    async fn cleanup(&self) -> Result<(), Box<dyn std::error::Error>> {
        let container = self.container.write().unwrap().take();
        if let Some(c) = container {
            println!("Stopping PostgreSQL container...");
            let _ = c.container.stop().await;
            println!("Stopped.");
        }
        Ok(())
    }
}

/// An already running database named by DBQUEUE_TEST_DSN
pub struct ExternalPostgresResource {
    dsn: String,
    schemas: Mutex<Vec<String>>,
}

impl ExternalPostgresResource {
    pub fn new(dsn: String) -> Self {
        println!("Using external PostgreSQL database: {}", dsn);
        Self {
            dsn,
            schemas: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TestResource for ExternalPostgresResource {
    async fn initialize(&self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    async fn get_dsn(&self, schema: &str) -> String {
        setup_database_common(self.dsn.clone(), schema, "External PostgreSQL")
            .await
            .expect("Failed to setup external database schema");
        self.schemas.lock().unwrap().push(schema.to_string());
        self.dsn.clone()
    }

    async fn cleanup(&self) -> Result<(), Box<dyn std::error::Error>> {
        let schemas = std::mem::take(&mut *self.schemas.lock().unwrap());
        if !schemas.is_empty() {
            cleanup_database_common(self.dsn.clone(), &schemas, "External PostgreSQL").await?;
        }
        Ok(())
    }
}
