use std::{env, time::Duration};

/// Configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// AWS region (default: "us-east-1")
    pub region: String,
    /// Session table name (default: "native_iq_sessions")
    pub table_name: String,
    /// Custom DynamoDB endpoint, e.g. a local DynamoDB (default: unset)
    pub endpoint_url: Option<String>,
    /// Deployment environment, recorded as a table tag (default: "Development")
    pub environment: String,
    /// Maximum time to wait for the table to become active (default: 120)
    pub provision_max_wait_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    /// - `DYNAMODB_TABLE_NAME` - Session table name (default: "native_iq_sessions")
    /// - `AWS_ENDPOINT_URL` - Custom DynamoDB endpoint (optional)
    /// - `NATIVE_IQ_ENVIRONMENT` - Environment tag (default: "Development")
    /// - `PROVISION_MAX_WAIT_SECONDS` - Table activation wait (default: 120)
    pub fn from_env() -> Self {
        Self {
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            table_name: env::var("DYNAMODB_TABLE_NAME")
                .unwrap_or_else(|_| "native_iq_sessions".to_string()),
            endpoint_url: env::var("AWS_ENDPOINT_URL").ok().filter(|v| !v.is_empty()),
            environment: env::var("NATIVE_IQ_ENVIRONMENT")
                .unwrap_or_else(|_| "Development".to_string()),
            provision_max_wait_seconds: env::var("PROVISION_MAX_WAIT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
        }
    }

    /// Get the provisioning wait as a Duration.
    pub fn provision_max_wait(&self) -> Duration {
        Duration::from_secs(self.provision_max_wait_seconds)
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
