use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable message codes clients branch on.
pub mod codes {
    pub const ITEM_ADDED_TO_CART: &str = "ITEM_ADDED_TO_CART";
    pub const ITEM_REMOVED_FROM_CART: &str = "ITEM_REMOVED_FROM_CART";
    pub const CART_CLEARED: &str = "CART_CLEARED";
    pub const STATUS_UPDATED: &str = "STATUS_UPDATED";

    pub const MISSING_FIELDS: &str = "MISSING_FIELDS";
    pub const INVALID_QUANTITY: &str = "INVALID_QUANTITY";
    pub const INVALID_BODY: &str = "INVALID_BODY";
    pub const INVALID_ORDER_ID: &str = "INVALID_ORDER_ID";
    pub const INVALID_TOTAL: &str = "INVALID_TOTAL";
    pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";
    pub const ORDER_NOT_FOUND: &str = "ORDER_NOT_FOUND";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const ORDER_UPDATE_FAILED: &str = "ORDER_UPDATE_FAILED";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Success envelope. The payload's fields are flattened next to `success`,
/// so `ApiResponse::success(OrderCreated { order_id: 7 })` serializes as
/// `{"success": true, "order_id": 7}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct Empty {}

impl ApiResponse<Empty> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_message(message, Empty {})
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
