use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    dto::{
        self,
        orders::{CreateOrderRequest, OrderCreated, OrderList, OrderWithItems, UpdateStatusRequest},
    },
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem, OrderStatus},
    response::{ApiResponse, Empty, codes},
    state::OrderState,
};

/// A validated order ready to be written.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<NewOrderLine>,
    pub total_price: i64,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i32,
    pub price: i64,
}

impl NewOrder {
    /// Sum of `price * quantity` over the lines, `None` if it overflows.
    pub fn line_total(&self) -> Option<i64> {
        self.items.iter().try_fold(0i64, |total, line| {
            line.price
                .checked_mul(i64::from(line.quantity))?
                .checked_add(total)
        })
    }
}

pub fn validate_new_order(payload: CreateOrderRequest) -> AppResult<NewOrder> {
    let user_id = dto::present(payload.user_id).ok_or(AppError::BadRequest(codes::MISSING_FIELDS))?;
    if payload.items.is_empty() {
        return Err(AppError::BadRequest(codes::MISSING_FIELDS));
    }
    if payload.items.iter().any(|line| line.quantity < 1) {
        return Err(AppError::BadRequest(codes::INVALID_QUANTITY));
    }

    let items: Vec<NewOrderLine> = payload
        .items
        .into_iter()
        .map(|line| NewOrderLine {
            product_id: line.id,
            quantity: line.quantity,
            price: line.price,
        })
        .collect();

    let mut order = NewOrder {
        user_id,
        items,
        total_price: 0,
        payment_method: dto::present(payload.payment_method),
    };
    order.total_price = match (payload.total_price, order.line_total()) {
        (Some(total), Some(line_total)) => {
            if total != line_total {
                tracing::warn!(
                    user_id = %order.user_id,
                    total_price = total,
                    line_total,
                    "order total does not match its lines; keeping client total"
                );
            }
            total
        }
        (Some(total), None) => {
            tracing::warn!(
                user_id = %order.user_id,
                total_price = total,
                "order lines overflow their total; keeping client total"
            );
            total
        }
        (None, Some(line_total)) => line_total,
        (None, None) => return Err(AppError::BadRequest(codes::INVALID_TOTAL)),
    };

    Ok(order)
}

/// Writes the header and every line in one transaction.
///
/// Any failure drops `txn` before commit, which rolls the whole order back.
pub async fn insert_order(db: &DatabaseConnection, order: &NewOrder) -> Result<i64, DbErr> {
    let txn = db.begin().await?;
    let now = Utc::now();

    let header = OrderActive {
        id: NotSet,
        user_id: Set(order.user_id.clone()),
        total_price: Set(order.total_price),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        payment_method: Set(order.payment_method.clone()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    for line in &order.items {
        OrderItems::insert(OrderItemActive {
            id: NotSet,
            order_id: Set(header.id),
            product_id: Set(line.product_id.clone()),
            quantity: Set(line.quantity),
            price: Set(line.price),
        })
        .exec(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(header.id)
}

/// Single-statement status write. Returns the number of rows touched.
pub async fn set_status(db: &DatabaseConnection, order_id: i64, status: &str) -> Result<u64, DbErr> {
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    let result = Orders::update_many()
        .col_expr(OrderCol::Status, Expr::value(status.to_string()))
        .col_expr(OrderCol::UpdatedAt, Expr::value(now))
        .filter(OrderCol::Id.eq(order_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn create_order(
    state: &OrderState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderCreated>> {
    let order = validate_new_order(payload)?;
    let order_id = insert_order(&state.orm, &order).await?;

    tracing::info!(
        order_id,
        user_id = %order.user_id,
        lines = order.items.len(),
        total_price = order.total_price,
        "order created"
    );

    Ok(ApiResponse::success(OrderCreated { order_id }))
}

pub async fn update_status(
    state: &OrderState,
    order_id: &str,
    payload: UpdateStatusRequest,
) -> AppResult<ApiResponse<Empty>> {
    let order_id = parse_order_id(order_id)?;
    let status = dto::present(payload.status).ok_or(AppError::BadRequest(codes::MISSING_FIELDS))?;

    // Transitions are not checked against the current status.
    if OrderStatus::parse(&status).is_none() {
        tracing::warn!(order_id, %status, "order moved to an unrecognised status");
    }

    let updated = set_status(&state.orm, order_id, &status).await?;
    if updated == 0 {
        tracing::warn!(order_id, %status, "status update matched no order");
    } else {
        tracing::info!(
            order_id,
            %status,
            payment_id = payload.payment_id.as_deref().unwrap_or("-"),
            "order status updated"
        );
    }

    Ok(ApiResponse::message(codes::STATUS_UPDATED))
}

pub async fn list_orders(
    state: &OrderState,
    user_id: Option<&str>,
) -> AppResult<ApiResponse<OrderList>> {
    let mut finder = Orders::find();
    if let Some(user_id) = user_id {
        finder = finder.filter(OrderCol::UserId.eq(user_id));
    }

    let orders = finder
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_desc(OrderCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(ApiResponse::success(OrderList { orders }))
}

pub async fn get_order(state: &OrderState, order_id: &str) -> AppResult<ApiResponse<OrderWithItems>> {
    let order_id = parse_order_id(order_id)?;
    let order = Orders::find_by_id(order_id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound(codes::ORDER_NOT_FOUND)),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(OrderWithItems {
        order: order_from_entity(order),
        items,
    }))
}

fn parse_order_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(codes::INVALID_ORDER_ID))
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        total_price: model.total_price,
        status: model.status,
        payment_method: model.payment_method,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::orders::OrderLineRequest;

    fn line(id: &str, quantity: i32, price: i64) -> OrderLineRequest {
        OrderLineRequest {
            id: id.to_string(),
            quantity,
            price,
        }
    }

    fn request(user_id: Option<&str>, items: Vec<OrderLineRequest>) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: user_id.map(str::to_string),
            items,
            total_price: None,
            payment_method: Some("card".into()),
        }
    }

    #[test]
    fn missing_user_is_rejected() {
        let err = validate_new_order(request(None, vec![line("p1", 1, 100)])).unwrap_err();
        assert_eq!(err.code(), "MISSING_FIELDS");

        let err = validate_new_order(request(Some("  "), vec![line("p1", 1, 100)])).unwrap_err();
        assert_eq!(err.code(), "MISSING_FIELDS");
    }

    #[test]
    fn empty_orders_are_rejected() {
        let err = validate_new_order(request(Some("u1"), vec![])).unwrap_err();
        assert_eq!(err.code(), "MISSING_FIELDS");
    }

    #[test]
    fn non_positive_line_quantity_is_rejected() {
        let err = validate_new_order(request(Some("u1"), vec![line("p1", 0, 100)])).unwrap_err();
        assert_eq!(err.code(), "INVALID_QUANTITY");
    }

    #[test]
    fn missing_total_is_computed_from_lines() {
        let order = validate_new_order(request(
            Some("u1"),
            vec![line("p1", 2, 1500), line("p2", 1, 3000)],
        ))
        .unwrap();
        assert_eq!(order.total_price, 6000);
    }

    #[test]
    fn client_total_is_kept_even_when_it_disagrees() {
        let mut payload = request(Some("u1"), vec![line("p1", 2, 1500)]);
        payload.total_price = Some(2500);
        let order = validate_new_order(payload).unwrap();
        assert_eq!(order.total_price, 2500);
        assert_eq!(order.line_total(), Some(3000));
    }

    #[test]
    fn overflowing_lines_keep_a_client_total() {
        let huge = i64::MAX / 2 + 1;
        let mut payload = request(Some("u1"), vec![line("p1", 2, huge)]);
        payload.total_price = Some(100);
        let order = validate_new_order(payload).unwrap();
        assert_eq!(order.line_total(), None);
        assert_eq!(order.total_price, 100);
    }

    #[test]
    fn overflowing_lines_without_a_total_are_rejected() {
        let huge = i64::MAX / 2 + 1;
        let err = validate_new_order(request(
            Some("u1"),
            vec![line("p1", 1, huge), line("p2", 1, huge)],
        ))
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_TOTAL");
    }

    #[test]
    fn order_ids_must_be_numeric() {
        assert_eq!(parse_order_id(" 42 ").unwrap(), 42);
        assert_eq!(parse_order_id("abc").unwrap_err().code(), "INVALID_ORDER_ID");
    }
}
