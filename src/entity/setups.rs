use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "setups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::setup_products::Entity")]
    SetupProducts,
}

impl Related<super::setup_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SetupProducts.def()
    }
}

// many-to-many with products through the join table
impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        super::setup_products::Relation::Products.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::setup_products::Relation::Setups.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
