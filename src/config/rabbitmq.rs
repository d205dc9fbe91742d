//! RabbitMQ configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// RabbitMQ configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RabbitMqConfig {
    /// Broker host name
    #[serde(default)]
    pub host: String,

    /// Broker port (AMQPS by default)
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default = "empty_secret")]
    password: Secret<String>,

    /// Virtual host
    #[serde(default = "default_vhost")]
    pub vhost: String,

    /// Exchange events are consumed from and published to
    #[serde(default)]
    pub exchange: String,

    /// Exchange type, used only when `declare_exchange` is set
    #[serde(default = "default_exchange_type")]
    pub exchange_type: String,

    /// Declare the exchange on startup instead of assuming it exists
    #[serde(default)]
    pub declare_exchange: bool,

    /// Queue bound to the exchange for consuming
    #[serde(default)]
    pub queue: String,

    /// Routing key for both the queue binding and published events
    #[serde(default = "default_routing_key")]
    pub routing_key: String,

    /// Unacknowledged deliveries the broker may push ahead
    #[serde(default = "default_prefetch_count")]
    pub prefetch_count: u16,

    /// Connect with TLS (amqps)
    #[serde(default = "default_tls")]
    pub tls: bool,

    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    #[serde(default = "default_heartbeat")]
    pub heartbeat_secs: u16,

    /// Per-attempt publish timeout in seconds
    #[serde(default = "default_publish_timeout")]
    pub publish_timeout_secs: u64,

    #[serde(default)]
    pub retry_interval_start_secs: u64,

    #[serde(default = "default_retry_interval_step")]
    pub retry_interval_step_secs: u64,

    #[serde(default = "default_retry_interval_max")]
    pub retry_interval_max_secs: u64,

    #[serde(default = "default_retry_max_retries")]
    pub retry_max_retries: u32,
}

impl RabbitMqConfig {
    /// Exposes the password (for opening the connection).
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Sets the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Secret::new(password.into());
        self
    }

    /// Get connection timeout as Duration
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Get per-attempt publish timeout as Duration
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    /// Validate RabbitMQ configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.is_empty() {
            return Err(ValidationError::MissingRequired("RABBITMQ__HOST"));
        }
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.exchange.is_empty() {
            return Err(ValidationError::MissingRequired("RABBITMQ__EXCHANGE"));
        }
        if self.queue.is_empty() {
            return Err(ValidationError::MissingRequired("RABBITMQ__QUEUE"));
        }
        if self.prefetch_count == 0 {
            return Err(ValidationError::InvalidPrefetchCount);
        }
        if self.connection_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("connection_timeout_secs"));
        }
        if self.publish_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("publish_timeout_secs"));
        }
        if self.retry_interval_max_secs < self.retry_interval_start_secs {
            return Err(ValidationError::InvalidRetryPolicy);
        }
        Ok(())
    }
}

impl Default for RabbitMqConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            username: String::new(),
            password: empty_secret(),
            vhost: default_vhost(),
            exchange: String::new(),
            exchange_type: default_exchange_type(),
            declare_exchange: false,
            queue: String::new(),
            routing_key: default_routing_key(),
            prefetch_count: default_prefetch_count(),
            tls: default_tls(),
            connection_timeout_secs: default_connection_timeout(),
            heartbeat_secs: default_heartbeat(),
            publish_timeout_secs: default_publish_timeout(),
            retry_interval_start_secs: 0,
            retry_interval_step_secs: default_retry_interval_step(),
            retry_interval_max_secs: default_retry_interval_max(),
            retry_max_retries: default_retry_max_retries(),
        }
    }
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_port() -> u16 {
    5671
}

fn default_vhost() -> String {
    "/".to_string()
}

fn default_exchange_type() -> String {
    "topic".to_string()
}

fn default_routing_key() -> String {
    "#".to_string()
}

fn default_prefetch_count() -> u16 {
    50
}

fn default_tls() -> bool {
    true
}

fn default_connection_timeout() -> u64 {
    10
}

fn default_heartbeat() -> u16 {
    60
}

fn default_publish_timeout() -> u64 {
    10
}

fn default_retry_interval_step() -> u64 {
    2
}

fn default_retry_interval_max() -> u64 {
    30
}

fn default_retry_max_retries() -> u32 {
    30
}
