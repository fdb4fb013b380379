use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub payment_id: String,
    pub user_id: String,
    /// Weak reference into the order store; never enforced.
    pub order_id: String,
    pub payment_method: String,
    pub amount: Option<i64>,
    pub status: String,
    pub transaction_id: String,
    /// False until the order service has acknowledged the `paid` transition.
    pub order_synced: bool,
    pub notify_attempts: i32,
    pub last_notify_error: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub synced_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
