//! Business analysis entity model
//!
//! Analyses are immutable AI-generated snapshots, so they carry no
//! `updated_at` and reassignment leaves their timestamps untouched.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::{DomainTable, TenantScoped};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "business_analysis")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: Option<String>,

    pub analysis_type: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub content: JsonValue,

    /// Owning tenant; null for rows that predate tenancy
    pub tenant_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScoped for Entity {
    const TABLE: DomainTable = DomainTable::BusinessAnalysis;

    fn tenant_column() -> Column {
        Column::TenantId
    }
}
