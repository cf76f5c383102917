//! Migration to create the tenancy support tables.
//!
//! Subscription plans, tenants, tenant subscriptions and per-tenant user roles.
//! The unique keys declared here are what the tenant backfill relies on for
//! its insert-if-absent writes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionPlans::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Name)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SubscriptionPlans::Description).text().null())
                    .col(
                        ColumnDef::new(SubscriptionPlans::Price)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::BillingPeriod)
                            .text()
                            .not_null()
                            .default("monthly"),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Features)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(SubscriptionPlans::CreatedAt))
                    .col(timestamp(SubscriptionPlans::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tenants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tenants::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tenants::Name).text().not_null())
                    .col(
                        ColumnDef::new(Tenants::Type)
                            .text()
                            .not_null()
                            .default("organization"),
                    )
                    .col(ColumnDef::new(Tenants::ParentTenantId).uuid().null())
                    .col(
                        ColumnDef::new(Tenants::Subdomain)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Tenants::CustomDomain).text().null())
                    .col(
                        ColumnDef::new(Tenants::Status)
                            .text()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Tenants::BrandingConfig).json_binary().null())
                    .col(ColumnDef::new(Tenants::FeatureFlags).json_binary().null())
                    .col(ColumnDef::new(Tenants::Metadata).json_binary().null())
                    .col(timestamp(Tenants::CreatedAt))
                    .col(timestamp(Tenants::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenants_parent_tenant_id")
                            .from(Tenants::Table, Tenants::ParentTenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TenantSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TenantSubscriptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TenantSubscriptions::TenantId).uuid().not_null())
                    .col(ColumnDef::new(TenantSubscriptions::PlanId).uuid().not_null())
                    .col(
                        ColumnDef::new(TenantSubscriptions::Status)
                            .text()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(TenantSubscriptions::CurrentPeriodStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TenantSubscriptions::CurrentPeriodEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TenantSubscriptions::CancelAtPeriodEnd)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TenantSubscriptions::Metadata)
                            .json_binary()
                            .null(),
                    )
                    .col(timestamp(TenantSubscriptions::CreatedAt))
                    .col(timestamp(TenantSubscriptions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenant_subscriptions_tenant_id")
                            .from(TenantSubscriptions::Table, TenantSubscriptions::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenant_subscriptions_plan_id")
                            .from(TenantSubscriptions::Table, TenantSubscriptions::PlanId)
                            .to(SubscriptionPlans::Table, SubscriptionPlans::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenant_subscriptions_tenant_id")
                    .table(TenantSubscriptions::Table)
                    .col(TenantSubscriptions::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserRoles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(UserRoles::TenantId).uuid().not_null())
                    .col(ColumnDef::new(UserRoles::Name).text().not_null())
                    .col(ColumnDef::new(UserRoles::Description).text().null())
                    .col(ColumnDef::new(UserRoles::Permissions).json_binary().not_null())
                    .col(
                        ColumnDef::new(UserRoles::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp(UserRoles::CreatedAt))
                    .col(timestamp(UserRoles::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_roles_tenant_id")
                            .from(UserRoles::Table, UserRoles::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Role names are unique within a tenant
        manager
            .create_index(
                Index::create()
                    .name("idx_user_roles_tenant_name")
                    .table(UserRoles::Table)
                    .col(UserRoles::TenantId)
                    .col(UserRoles::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_user_roles_tenant_name").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserRoles::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tenant_subscriptions_tenant_id")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(TenantSubscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tenants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubscriptionPlans::Table).to_owned())
            .await
    }
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(DeriveIden)]
enum SubscriptionPlans {
    Table,
    Id,
    Name,
    Description,
    Price,
    BillingPeriod,
    Features,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
    Name,
    Type,
    ParentTenantId,
    Subdomain,
    CustomDomain,
    Status,
    BrandingConfig,
    FeatureFlags,
    Metadata,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TenantSubscriptions {
    Table,
    Id,
    TenantId,
    PlanId,
    Status,
    CurrentPeriodStart,
    CurrentPeriodEnd,
    CancelAtPeriodEnd,
    Metadata,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserRoles {
    Table,
    Id,
    TenantId,
    Name,
    Description,
    Permissions,
    IsDefault,
    CreatedAt,
    UpdatedAt,
}
