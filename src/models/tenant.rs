//! Tenant entity model
//!
//! This module contains the SeaORM entity model for the tenants table,
//! which stores tenant information for multi-tenancy.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Tenant entity representing multi-tenant isolation
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    /// Unique identifier for the tenant (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name for the tenant
    pub name: String,

    /// Kind of tenant (organization|agency|client)
    #[sea_orm(column_name = "type")]
    pub tenant_type: String,

    /// Owning tenant for nested tenants
    pub parent_tenant_id: Option<Uuid>,

    /// Unique subdomain the tenant is served under
    #[sea_orm(unique)]
    pub subdomain: String,

    pub custom_domain: Option<String>,

    /// Lifecycle status (active|suspended|cancelled)
    pub status: String,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub branding_config: Option<JsonValue>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub feature_flags: Option<JsonValue>,

    /// Free-form metadata, including migration provenance
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metadata: Option<JsonValue>,

    /// Timestamp when the tenant was created
    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_role::Entity")]
    UserRole,
    #[sea_orm(has_many = "super::tenant_subscription::Entity")]
    TenantSubscription,
}

impl Related<super::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRole.def()
    }
}

impl Related<super::tenant_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TenantSubscription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
