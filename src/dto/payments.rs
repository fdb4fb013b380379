use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PaymentCallbackRequest {
    #[serde(default, deserialize_with = "super::optional_id")]
    #[schema(value_type = Option<String>)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "super::optional_id")]
    #[schema(value_type = Option<String>)]
    pub order_id: Option<String>,
    pub payment_method: Option<String>,
    /// Whole currency units.
    pub amount: Option<i64>,
    /// Accepted for compatibility with payment providers; not stored.
    #[schema(value_type = Option<Object>)]
    pub items: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentConfirmed {
    pub payment_id: String,
    pub status: String,
}
