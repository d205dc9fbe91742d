//! Broker connection, subscription and publisher.
//!
//! The lifecycle is encoded in the types:
//!
//! ```text
//! RabbitMqConnection::connect ──► RabbitMqConnection ──subscribe──► RabbitMqSubscription ──run──► closed
//!                                        │
//!                                        └──publisher──► RabbitMqPublisher
//! ```
//!
//! `subscribe` and `run` take `self`, so a closed subscription cannot be
//! consumed from again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lapin::options::{
    BasicConsumeOptions, BasicPublishOptions, BasicQosOptions, ConfirmSelectOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::publisher_confirm::Confirmation;
use lapin::types::FieldTable;
use lapin::uri::{AMQPAuthority, AMQPQueryString, AMQPScheme, AMQPUri, AMQPUserInfo};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer, ExchangeKind};
use serde_json::Value;
use tokio::sync::watch;

use super::consumer::{consume, ConsumeStats};
use super::error::BusError;
use super::retry::RetryPolicy;
use crate::config::RabbitMqConfig;
use crate::ports::{EventHandler, EventPublisher, PublishError};

const CONSUMER_TAG: &str = "eiffelactory";
const CONTENT_TYPE_JSON: &str = "application/json";
const PERSISTENT: u8 = 2;

/// An open broker connection.
pub struct RabbitMqConnection {
    connection: Connection,
    config: RabbitMqConfig,
}

impl RabbitMqConnection {
    /// Opens the connection, within the configured connection timeout.
    pub async fn connect(config: &RabbitMqConfig) -> Result<Self, BusError> {
        let uri = amqp_uri(config);
        let timeout = config.connection_timeout();

        tracing::info!(
            host = %config.host,
            port = config.port,
            vhost = %config.vhost,
            tls = config.tls,
            "Connecting to RabbitMQ"
        );

        let connection = tokio::time::timeout(
            timeout,
            Connection::connect_uri(uri, ConnectionProperties::default()),
        )
        .await
        .map_err(|_| BusError::ConnectTimeout {
            timeout_secs: config.connection_timeout_secs,
        })?
        .map_err(|e| BusError::Connect(e.to_string()))?;

        Ok(Self {
            connection,
            config: config.clone(),
        })
    }

    /// Opens a publisher on its own confirm-mode channel.
    pub async fn publisher(&self) -> Result<RabbitMqPublisher, BusError> {
        let channel = self
            .connection
            .create_channel()
            .await
            .map_err(|e| BusError::setup("create publish channel", e))?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| BusError::setup("confirm select", e))?;

        Ok(RabbitMqPublisher {
            channel,
            exchange: self.config.exchange.clone(),
            routing_key: self.config.routing_key.clone(),
            timeout: self.config.publish_timeout(),
            retry: RetryPolicy::from(&self.config),
        })
    }

    /// Declares and binds the queue and starts consuming from it.
    ///
    /// On failure the connection is closed before the error is returned.
    pub async fn subscribe(self) -> Result<RabbitMqSubscription, BusError> {
        match self.start_consumer().await {
            Ok(consumer) => Ok(RabbitMqSubscription {
                connection: self.connection,
                consumer,
            }),
            Err(e) => {
                close_connection(&self.connection).await;
                Err(e)
            }
        }
    }

    async fn start_consumer(&self) -> Result<Consumer, BusError> {
        let config = &self.config;
        let channel = self
            .connection
            .create_channel()
            .await
            .map_err(|e| BusError::setup("create consume channel", e))?;

        if config.declare_exchange {
            channel
                .exchange_declare(
                    &config.exchange,
                    exchange_kind(&config.exchange_type),
                    ExchangeDeclareOptions {
                        durable: true,
                        ..Default::default()
                    },
                    FieldTable::default(),
                )
                .await
                .map_err(|e| BusError::setup("exchange declare", e))?;
        }

        channel
            .queue_declare(
                &config.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::setup("queue declare", e))?;

        channel
            .queue_bind(
                &config.queue,
                &config.exchange,
                &config.routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::setup("queue bind", e))?;

        channel
            .basic_qos(config.prefetch_count, BasicQosOptions::default())
            .await
            .map_err(|e| BusError::setup("basic qos", e))?;

        let consumer = channel
            .basic_consume(
                &config.queue,
                CONSUMER_TAG,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::setup("basic consume", e))?;

        tracing::info!(
            queue = %config.queue,
            exchange = %config.exchange,
            routing_key = %config.routing_key,
            prefetch = config.prefetch_count,
            "Subscribed"
        );

        Ok(consumer)
    }

    /// Closes the connection without consuming.
    pub async fn close(self) {
        close_connection(&self.connection).await;
    }
}

/// A live consumer. Consumed by [`RabbitMqSubscription::run`].
pub struct RabbitMqSubscription {
    connection: Connection,
    consumer: Consumer,
}

impl RabbitMqSubscription {
    /// Runs the consume loop until shutdown, then closes the connection.
    pub async fn run(
        self,
        handler: Arc<dyn EventHandler>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<ConsumeStats, BusError> {
        let result = consume(self.consumer, handler, shutdown).await;
        close_connection(&self.connection).await;
        result
    }
}

async fn close_connection(connection: &Connection) {
    match connection.close(200, "shutdown").await {
        Ok(()) => tracing::info!("RabbitMQ connection closed"),
        Err(e) => tracing::warn!(error = %e, "RabbitMQ connection did not close cleanly"),
    }
}

/// Publishes JSON payloads to the configured exchange with publisher
/// confirms.
pub struct RabbitMqPublisher {
    channel: Channel,
    exchange: String,
    routing_key: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl RabbitMqPublisher {
    /// One attempt, bounded by the publish timeout.
    async fn publish_once(&self, body: &[u8]) -> Result<(), PublishError> {
        ensure_open(self.channel.status().connected())?;
        tokio::time::timeout(self.timeout, self.publish_confirmed(body))
            .await
            .map_err(|_| {
                PublishError::transient(format!(
                    "no confirm within {}s",
                    self.timeout.as_secs()
                ))
            })?
    }

    async fn publish_confirmed(&self, body: &[u8]) -> Result<(), PublishError> {
        let properties = BasicProperties::default()
            .with_content_type(CONTENT_TYPE_JSON.into())
            .with_delivery_mode(PERSISTENT);

        let confirm = self
            .channel
            .basic_publish(
                &self.exchange,
                &self.routing_key,
                BasicPublishOptions::default(),
                body,
                properties,
            )
            .await
            .map_err(|e| PublishError::transient(e.to_string()))?;

        match confirm.await {
            Ok(Confirmation::Nack(_)) => Err(PublishError::transient("broker nacked the message")),
            Ok(_) => Ok(()),
            Err(e) => Err(PublishError::transient(e.to_string())),
        }
    }
}

#[async_trait]
impl EventPublisher for RabbitMqPublisher {
    async fn publish(&self, payload: &Value) -> Result<(), PublishError> {
        let body = serde_json::to_vec(payload).map_err(|e| PublishError::Encoding(e.to_string()))?;
        self.retry.run(|| self.publish_once(&body)).await
    }
}

/// A channel the broker or the client has closed never reopens.
fn ensure_open(connected: bool) -> Result<(), PublishError> {
    if connected {
        Ok(())
    } else {
        Err(PublishError::Closed)
    }
}

/// Builds the broker URI from configuration.
pub fn amqp_uri(config: &RabbitMqConfig) -> AMQPUri {
    AMQPUri {
        scheme: if config.tls {
            AMQPScheme::AMQPS
        } else {
            AMQPScheme::AMQP
        },
        authority: AMQPAuthority {
            userinfo: AMQPUserInfo {
                username: config.username.clone(),
                password: config.password().to_string(),
            },
            host: config.host.clone(),
            port: config.port,
        },
        vhost: config.vhost.clone(),
        query: AMQPQueryString {
            heartbeat: Some(config.heartbeat_secs),
            connection_timeout: Some(config.connection_timeout_secs * 1000),
            ..Default::default()
        },
    }
}

fn exchange_kind(exchange_type: &str) -> ExchangeKind {
    match exchange_type {
        "direct" => ExchangeKind::Direct,
        "fanout" => ExchangeKind::Fanout,
        "headers" => ExchangeKind::Headers,
        "topic" => ExchangeKind::Topic,
        other => ExchangeKind::Custom(other.to_string()),
    }
}
