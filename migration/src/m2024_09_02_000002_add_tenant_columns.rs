//! Migration adding the tenant association to every CRM domain table.
//!
//! The new `tenant_id` columns are nullable: rows written before tenancy
//! existed stay unassigned until the tenant backfill claims them for the
//! default tenant. Users additionally gain a role reference and an admin flag.
//!
//! SQLite only accepts one alteration per `ALTER TABLE`, so every column is
//! added by its own statement.

use sea_orm_migration::prelude::*;

/// Domain tables that receive a `tenant_id` column.
const DOMAIN_TABLES: [&str; 7] = [
    "users",
    "contacts",
    "deals",
    "tasks",
    "business_analysis",
    "content_items",
    "voice_profiles",
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in DOMAIN_TABLES {
            manager
                .alter_table(
                    Table::alter()
                        .table(Alias::new(table))
                        .add_column(ColumnDef::new(Alias::new("tenant_id")).uuid().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name(tenant_index_name(table))
                        .table(Alias::new(table))
                        .col(Alias::new("tenant_id"))
                        .to_owned(),
                )
                .await?;
        }

        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(ColumnDef::new(Users::RoleId).uuid().null())
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(
                        ColumnDef::new(Users::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(Users::IsAdmin)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(Users::RoleId)
                    .to_owned(),
            )
            .await?;

        for table in DOMAIN_TABLES.iter().rev() {
            manager
                .drop_index(
                    Index::drop()
                        .name(tenant_index_name(table))
                        .table(Alias::new(*table))
                        .to_owned(),
                )
                .await?;

            manager
                .alter_table(
                    Table::alter()
                        .table(Alias::new(*table))
                        .drop_column(Alias::new("tenant_id"))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

fn tenant_index_name(table: &str) -> String {
    format!("idx_{table}_tenant_id")
}

#[derive(DeriveIden)]
enum Users {
    Table,
    RoleId,
    IsAdmin,
}
