//! # Tenant Repository
//!
//! Lookup and provisioning of tenants by their unique subdomain.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, prelude::DateTimeWithTimeZone,
    sea_query::Expr, sea_query::OnConflict,
};

use crate::models::tenant::{
    ActiveModel as TenantActiveModel, Column, Entity as Tenant, Model as TenantModel,
};

/// Status a tenant is in while it may be used.
pub const TENANT_STATUS_ACTIVE: &str = "active";

/// Repository for Tenant database operations
pub struct TenantRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TenantRepository<'a, C> {
    /// Create a new TenantRepository over the given connection
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Get tenant by subdomain
    pub async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<TenantModel>, DbErr> {
        Tenant::find()
            .filter(Column::Subdomain.eq(subdomain))
            .one(self.db)
            .await
    }

    /// Insert the tenant unless its subdomain is already taken.
    ///
    /// Returns `true` when this call wrote the row.
    pub async fn insert_if_absent(&self, tenant: TenantActiveModel) -> Result<bool, DbErr> {
        let inserted = Tenant::insert(tenant)
            .on_conflict(OnConflict::column(Column::Subdomain).do_nothing().to_owned())
            .exec_without_returning(self.db)
            .await?;

        Ok(inserted > 0)
    }

    /// Set the tenant's status to active and `updated_at` to `now`.
    ///
    /// Branding, feature flags and metadata are left untouched.
    pub async fn mark_active(
        &self,
        subdomain: &str,
        now: DateTimeWithTimeZone,
    ) -> Result<u64, DbErr> {
        let result = Tenant::update_many()
            .col_expr(Column::Status, Expr::value(TENANT_STATUS_ACTIVE))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Subdomain.eq(subdomain))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
