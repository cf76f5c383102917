//! Task entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use super::{DomainTable, TenantScoped};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub description: Option<String>,

    pub due_date: Option<DateTimeWithTimeZone>,

    pub completed: bool,

    pub contact_id: Option<i32>,

    pub deal_id: Option<i32>,

    pub assignee_id: Option<String>,

    /// Owning tenant; null for rows that predate tenancy
    pub tenant_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScoped for Entity {
    const TABLE: DomainTable = DomainTable::Tasks;

    fn tenant_column() -> Column {
        Column::TenantId
    }

    fn touched_column() -> Option<Column> {
        Some(Column::UpdatedAt)
    }
}
