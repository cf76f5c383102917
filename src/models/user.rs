//! User entity model
//!
//! Users are keyed by the identifier issued by the external auth provider.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use super::{DomainTable, TenantScoped};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Auth-provider user id (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub email: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    /// Owning tenant; null for rows that predate tenancy
    pub tenant_id: Option<Uuid>,

    /// Role within the owning tenant
    pub role_id: Option<Uuid>,

    pub is_admin: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_role::Entity",
        from = "Column::RoleId",
        to = "super::user_role::Column::Id"
    )]
    UserRole,
}

impl Related<super::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRole.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScoped for Entity {
    const TABLE: DomainTable = DomainTable::Users;

    fn tenant_column() -> Column {
        Column::TenantId
    }
}
