//! Outbound calls from the payment relay to the order service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use thiserror::Error;

use crate::models::OrderStatus;

#[derive(Debug, Error)]
pub enum OrderClientError {
    #[error("invalid order service url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("order service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("order service answered {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// The order service as seen from the relay.
#[async_trait]
pub trait OrderStatusClient: Send + Sync {
    /// Moves the order to `paid`. Applying it twice leaves the same state.
    async fn mark_paid(&self, order_id: &str, payment_id: &str) -> Result<(), OrderClientError>;
}

#[derive(Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
    payment_id: &'a str,
}

/// HTTP client for `PATCH {base}/orders/{id}/status` with a hard timeout.
#[derive(Debug, Clone)]
pub struct HttpOrderClient {
    client: Client,
    base_url: Url,
}

impl HttpOrderClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, OrderClientError> {
        let invalid = |reason: String| OrderClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("not a base url".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    fn status_url(&self, order_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["orders", order_id, "status"]);
        }
        url
    }
}

#[async_trait]
impl OrderStatusClient for HttpOrderClient {
    async fn mark_paid(&self, order_id: &str, payment_id: &str) -> Result<(), OrderClientError> {
        let url = self.status_url(order_id);
        tracing::debug!(%url, payment_id, "notifying order service");

        let response = self
            .client
            .patch(url)
            .json(&StatusUpdate {
                status: OrderStatus::Paid.as_str(),
                payment_id,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrderClientError::Rejected { status, body });
        }

        Ok(())
    }
}
