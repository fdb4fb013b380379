use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CartItem;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    #[serde(default, deserialize_with = "super::optional_id")]
    #[schema(value_type = Option<String>)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "super::optional_id")]
    #[schema(value_type = Option<String>)]
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    /// Unit price in whole currency units.
    pub price: Option<i64>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemBody {
    pub item: CartItem,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartCleared {
    pub deleted_count: u64,
}
