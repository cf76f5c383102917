//! Database migrations for the CRM tenancy service.
//!
//! The first migration is the legacy single-tenant schema; the later ones
//! introduce tenancy and leave existing rows unassigned for the backfill.

pub use sea_orm_migration::prelude::*;

mod m2024_01_15_000001_create_crm_tables;
mod m2024_09_02_000001_create_tenancy_tables;
mod m2024_09_02_000002_add_tenant_columns;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_01_15_000001_create_crm_tables::Migration),
            Box::new(m2024_09_02_000001_create_tenancy_tables::Migration),
            Box::new(m2024_09_02_000002_add_tenant_columns::Migration),
        ]
    }
}
