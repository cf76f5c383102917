//! Contact entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use super::{DomainTable, TenantScoped};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contacts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub first_name: String,

    pub last_name: String,

    pub email: Option<String>,

    pub phone: Option<String>,

    pub company: Option<String>,

    /// Pipeline status (lead|prospect|customer)
    pub status: String,

    /// User who owns the contact
    pub owner_id: Option<String>,

    /// Owning tenant; null for rows that predate tenancy
    pub tenant_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScoped for Entity {
    const TABLE: DomainTable = DomainTable::Contacts;

    fn tenant_column() -> Column {
        Column::TenantId
    }

    fn touched_column() -> Option<Column> {
        Some(Column::UpdatedAt)
    }
}
