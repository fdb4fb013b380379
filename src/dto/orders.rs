use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[serde(default, deserialize_with = "super::optional_id")]
    #[schema(value_type = Option<String>)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderLineRequest>,
    /// Whole currency units. Computed from the lines when absent.
    pub total_price: Option<i64>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    /// Product id.
    #[serde(deserialize_with = "super::id")]
    #[schema(value_type = String)]
    pub id: String,
    pub quantity: i32,
    /// Unit price in whole currency units.
    pub price: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
    /// Sent by the payment relay; informational only.
    pub payment_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderCreated {
    pub order_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}
