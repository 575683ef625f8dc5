use async_trait::async_trait;
use std::sync::RwLock;

/// A Postgres instance the tests can point at.
#[async_trait]
pub trait TestResource: Send + Sync {
    /// Start the resource (no-op for an external database)
    async fn initialize(&self) -> Result<(), Box<dyn std::error::Error>>;

    /// DSN for the resource, with `schema` created fresh
    async fn get_dsn(&self, schema: &str) -> String;

    /// Drop created schemas and stop anything that was started
    async fn cleanup(&self) -> Result<(), Box<dyn std::error::Error>>;
}

pub struct ResourceManager {
    pub resource: Box<dyn TestResource>,
}

impl ResourceManager {
    pub fn new(resource: Box<dyn TestResource>) -> Self {
        Self { resource }
    }
}

/// Global resource manager, shared by every test in the binary.
pub static RESOURCE_MANAGER: RwLock<Option<ResourceManager>> = RwLock::new(None);
