//! # User Role Repository

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::models::user_role::{
    ActiveModel as RoleActiveModel, Column, Entity as UserRole, Model as RoleModel,
};

/// Repository for tenant-scoped user roles
pub struct UserRoleRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserRoleRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Find a role by name within a tenant
    pub async fn find_by_name(
        &self,
        tenant_id: Uuid,
        name: &str,
    ) -> Result<Option<RoleModel>, DbErr> {
        UserRole::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Name.eq(name))
            .one(self.db)
            .await
    }

    /// Insert the role unless the tenant already has one with that name.
    pub async fn insert_if_absent(&self, role: RoleActiveModel) -> Result<bool, DbErr> {
        let inserted = UserRole::insert(role)
            .on_conflict(
                OnConflict::columns([Column::TenantId, Column::Name])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;

        Ok(inserted > 0)
    }
}
