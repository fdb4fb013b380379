use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{delete, get, post, put},
};

use crate::{
    dto::cart::{AddToCartRequest, CartCleared, CartItemBody, CartList, UpdateQuantityRequest},
    error::AppResult,
    models::CartKey,
    response::{ApiResponse, Empty, ErrorResponse},
    services::cart_service,
    state::CartState,
};

pub fn router() -> Router<CartState> {
    Router::new()
        .route("/cart", post(add_to_cart))
        // Also the keyed path of a user literally named "user".
        .route(
            "/cart/user/{user_id}",
            get(cart_list)
                .put(update_quantity_of_user_named_user)
                .delete(remove_from_cart_of_user_named_user),
        )
        .route("/cart/user/{user_id}/clear", delete(clear_cart))
        .route(
            "/cart/{user_id}/{product_id}",
            put(update_quantity).delete(remove_from_cart),
        )
}

#[utoipa::path(
    post,
    path = "/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Line added or replaced", body = ApiResponse<Empty>),
        (status = 400, description = "Missing fields or bad quantity", body = ErrorResponse),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<CartState>,
    payload: Result<Json<AddToCartRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Empty>>> {
    let Json(payload) = payload?;
    let resp = cart_service::add_item(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/cart/user/{user_id}",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Cart lines of a user, empty when none", body = ApiResponse<CartList>)
    ),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<CartState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<CartList>>> {
    let resp = cart_service::list_by_user(&state, &user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/cart/{user_id}/{product_id}",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("product_id" = String, Path, description = "Product ID")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Updated line, created without name or price if it was missing", body = ApiResponse<CartItemBody>),
        (status = 400, description = "Quantity missing or below 1", body = ErrorResponse),
    ),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<CartState>,
    Path((user_id, product_id)): Path<(String, String)>,
    payload: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<CartItemBody>>> {
    let Json(payload) = payload?;
    let key = CartKey::new(user_id, product_id);
    let resp = cart_service::update_quantity(&state, key, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/cart/{user_id}/{product_id}",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("product_id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Line removed, or was already absent", body = ApiResponse<Empty>),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<CartState>,
    Path((user_id, product_id)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<Empty>>> {
    let resp = cart_service::remove_item(&state, CartKey::new(user_id, product_id)).await?;
    Ok(Json(resp))
}

const USER_NAMED_USER: &str = "user";

async fn update_quantity_of_user_named_user(
    state: State<CartState>,
    Path(product_id): Path<String>,
    payload: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<CartItemBody>>> {
    update_quantity(state, Path((USER_NAMED_USER.to_string(), product_id)), payload).await
}

async fn remove_from_cart_of_user_named_user(
    state: State<CartState>,
    Path(product_id): Path<String>,
) -> AppResult<Json<ApiResponse<Empty>>> {
    remove_from_cart(state, Path((USER_NAMED_USER.to_string(), product_id))).await
}

#[utoipa::path(
    delete,
    path = "/cart/user/{user_id}/clear",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Every line of the user removed", body = ApiResponse<CartCleared>),
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<CartState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<CartCleared>>> {
    let resp = cart_service::clear_cart(&state, &user_id).await?;
    Ok(Json(resp))
}
