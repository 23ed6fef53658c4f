use sea_orm::entity::prelude::*;

/// Shipping/contact fields are stored encrypted (`ivhex:cthex`); email stays
/// plaintext so webhook `customer_email` can be correlated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub status: String,
    pub total: i64,
    pub payment_intent_id: String,
    pub payment_url: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub post_code: String,
    pub street: String,
    pub house: String,
    pub phone_code: String,
    pub phone: String,
    pub email: String,
    pub user_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_PAYED: &str = "PAYED";
