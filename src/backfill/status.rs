//! Read-only view of how far the tenant backfill has progressed.

use sea_orm::{ConnectionTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::defaults::{ADMIN_ROLE_NAME, DEFAULT_PLAN_NAME, DEFAULT_TENANT_SUBDOMAIN};
use super::error::{BackfillError, BackfillStep, StepContext};
use super::TableCount;
use crate::models::{
    BusinessAnalysis, Contact, ContentItem, Deal, DomainTable, Task, TenantScoped, User,
    VoiceProfile,
};
use crate::repositories::{
    SubscriptionPlanRepository, TenantRepository, TenantSubscriptionRepository,
    UserRoleRepository,
};

/// Support-row presence and unassigned row counts.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TenancyStatus {
    /// Id of the tenant with the reserved subdomain, once provisioned
    pub default_tenant_id: Option<Uuid>,
    pub default_plan_present: bool,
    pub default_tenant_present: bool,
    pub admin_role_present: bool,
    pub subscription_present: bool,
    /// Rows without a tenant, per domain table
    pub unassigned: Vec<TableCount>,
}

impl TenancyStatus {
    pub fn total_unassigned(&self) -> u64 {
        self.unassigned.iter().map(|count| count.rows).sum()
    }

    /// Every domain row has a tenant.
    pub fn is_complete(&self) -> bool {
        self.total_unassigned() == 0
    }

    pub fn unassigned_in(&self, table: DomainTable) -> u64 {
        self.unassigned
            .iter()
            .find(|count| count.table == table)
            .map(|count| count.rows)
            .unwrap_or(0)
    }
}

/// Inspect the datastore without changing it.
pub async fn tenancy_status<C: ConnectionTrait>(db: &C) -> Result<TenancyStatus, BackfillError> {
    let plan = SubscriptionPlanRepository::new(db)
        .find_by_name(DEFAULT_PLAN_NAME)
        .await
        .at_step(BackfillStep::InspectSupportRows)?;
    let tenant = TenantRepository::new(db)
        .find_by_subdomain(DEFAULT_TENANT_SUBDOMAIN)
        .await
        .at_step(BackfillStep::InspectSupportRows)?;

    let (admin_role_present, subscription_present) = match &tenant {
        Some(tenant) => {
            let role = UserRoleRepository::new(db)
                .find_by_name(tenant.id, ADMIN_ROLE_NAME)
                .await
                .at_step(BackfillStep::InspectSupportRows)?;
            let subscription = TenantSubscriptionRepository::new(db)
                .find_for_tenant(tenant.id)
                .await
                .at_step(BackfillStep::InspectSupportRows)?;
            (role.is_some(), subscription.is_some())
        }
        None => (false, false),
    };

    let mut unassigned = Vec::with_capacity(DomainTable::ALL.len());
    for table in DomainTable::ALL {
        let rows = count_unassigned_in(db, table).await?;
        unassigned.push(TableCount { table, rows });
    }

    Ok(TenancyStatus {
        default_tenant_id: tenant.as_ref().map(|t| t.id),
        default_plan_present: plan.is_some(),
        default_tenant_present: tenant.is_some(),
        admin_role_present,
        subscription_present,
        unassigned,
    })
}

async fn count_unassigned_in<C: ConnectionTrait>(
    db: &C,
    table: DomainTable,
) -> Result<u64, BackfillError> {
    match table {
        DomainTable::Users => count_unassigned::<User, _>(db).await,
        DomainTable::Contacts => count_unassigned::<Contact, _>(db).await,
        DomainTable::Deals => count_unassigned::<Deal, _>(db).await,
        DomainTable::Tasks => count_unassigned::<Task, _>(db).await,
        DomainTable::BusinessAnalysis => count_unassigned::<BusinessAnalysis, _>(db).await,
        DomainTable::ContentItems => count_unassigned::<ContentItem, _>(db).await,
        DomainTable::VoiceProfiles => count_unassigned::<VoiceProfile, _>(db).await,
    }
}

async fn count_unassigned<E, C>(db: &C) -> Result<u64, BackfillError>
where
    E: TenantScoped,
    E::Model: Sync,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::unassigned())
        .count(db)
        .await
        .at_step(BackfillStep::CountUnassigned(E::TABLE))
}
