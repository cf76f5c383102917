//! Subscription plan entity model
//!
//! Plans are looked up by their unique name; the backfill reserves
//! "Default Plan" for migrated tenants.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subscription_plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Unique plan name
    #[sea_orm(unique)]
    pub name: String,

    pub description: Option<String>,

    /// Price in minor currency units (cents)
    pub price: i64,

    /// Billing cadence (monthly|yearly)
    pub billing_period: String,

    /// Feature flags and usage ceilings granted by the plan
    #[sea_orm(column_type = "JsonBinary")]
    pub features: JsonValue,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tenant_subscription::Entity")]
    TenantSubscription,
}

impl Related<super::tenant_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TenantSubscription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
