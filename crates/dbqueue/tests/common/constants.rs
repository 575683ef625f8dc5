// Test configuration constants

// Container credentials
pub const TEST_DB_NAME: &str = "dbqueue_test";
pub const TEST_DB_USER: &str = "dbqueue";
pub const TEST_DB_PASSWORD: &str = "dbqueue";
pub const POSTGRES_PORT: u16 = 5432;

// Connection configuration
pub const MAX_CONNECTIONS: u32 = 4;
pub const CONNECTION_TIMEOUT_SECS: u64 = 5;
pub const VERIFICATION_QUERY: &str = "SELECT 1";

// Environment switches
pub const ENV_TEST_DSN: &str = "DBQUEUE_TEST_DSN";
pub const ENV_TEST_CONTAINER: &str = "DBQUEUE_TEST_CONTAINER";
