use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::{
    dto::{
        self,
        cart::{AddToCartRequest, CartCleared, CartItemBody, CartList, UpdateQuantityRequest},
    },
    entity::cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems, Model as CartModel},
    error::{AppError, AppResult},
    models::{CartItem, CartKey},
    response::{ApiResponse, Empty, codes},
    state::CartState,
};

/// Upserts the line for `(user_id, product_id)`, keeping its original `created_at`.
pub async fn add_item(state: &CartState, payload: AddToCartRequest) -> AppResult<ApiResponse<Empty>> {
    let user_id = dto::present(payload.user_id);
    let product_id = dto::present(payload.product_id);
    let (Some(user_id), Some(product_id), Some(quantity)) =
        (user_id, product_id, payload.quantity.filter(|q| *q != 0))
    else {
        return Err(AppError::BadRequest(codes::MISSING_FIELDS));
    };
    if quantity < 1 {
        return Err(AppError::BadRequest(codes::INVALID_QUANTITY));
    }

    let now = Utc::now();
    let line = CartActive {
        user_id: Set(user_id.clone()),
        product_id: Set(product_id.clone()),
        product_name: Set(payload.product_name),
        price: Set(payload.price),
        quantity: Set(quantity),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    CartItems::insert(line)
        .on_conflict(
            OnConflict::columns([CartCol::UserId, CartCol::ProductId])
                .update_columns([
                    CartCol::ProductName,
                    CartCol::Price,
                    CartCol::Quantity,
                    CartCol::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    tracing::debug!(%user_id, %product_id, quantity, "cart line saved");
    Ok(ApiResponse::message(codes::ITEM_ADDED_TO_CART))
}

pub async fn list_by_user(state: &CartState, user_id: &str) -> AppResult<ApiResponse<CartList>> {
    let items = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .order_by_asc(CartCol::ProductId)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(cart_item_from_entity)
        .collect();

    Ok(ApiResponse::success(CartList { items }))
}

pub async fn update_quantity(
    state: &CartState,
    key: CartKey,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartItemBody>> {
    let quantity = match payload.quantity {
        Some(q) if q >= 1 => q,
        _ => return Err(AppError::BadRequest(codes::INVALID_QUANTITY)),
    };

    let now = Utc::now();
    let line = CartActive {
        user_id: Set(key.user_id.clone()),
        product_id: Set(key.product_id.clone()),
        product_name: Set(None),
        price: Set(None),
        quantity: Set(quantity),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    // A missing line is created bare, without name or price.
    CartItems::insert(line)
        .on_conflict(
            OnConflict::columns([CartCol::UserId, CartCol::ProductId])
                .update_columns([CartCol::Quantity, CartCol::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    let line = CartItems::find_by_id(key.clone().into_primary_key())
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart line {key} missing after update")))?;
    tracing::debug!(cart_id = %key, quantity, "cart quantity updated");

    Ok(ApiResponse::success(CartItemBody {
        item: cart_item_from_entity(line),
    }))
}

/// Deleting a line that does not exist is not an error.
pub async fn remove_item(state: &CartState, key: CartKey) -> AppResult<ApiResponse<Empty>> {
    let result = CartItems::delete_by_id(key.clone().into_primary_key())
        .exec(&state.orm)
        .await?;
    tracing::debug!(cart_id = %key, removed = result.rows_affected, "cart line removed");

    Ok(ApiResponse::message(codes::ITEM_REMOVED_FROM_CART))
}

pub async fn clear_cart(state: &CartState, user_id: &str) -> AppResult<ApiResponse<CartCleared>> {
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(&state.orm)
        .await?;

    tracing::info!(%user_id, deleted = result.rows_affected, "cart cleared");
    Ok(ApiResponse::with_message(
        codes::CART_CLEARED,
        CartCleared {
            deleted_count: result.rows_affected,
        },
    ))
}

fn cart_item_from_entity(model: CartModel) -> CartItem {
    let key = CartKey::new(model.user_id, model.product_id);
    CartItem {
        cart_id: key.to_string(),
        user_id: key.user_id,
        product_id: key.product_id,
        product_name: model.product_name,
        price: model.price,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
