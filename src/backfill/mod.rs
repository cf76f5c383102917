//! # Tenant Backfill
//!
//! Moves a single-tenant CRM datastore onto the multi-tenant schema. A run
//! provisions the default plan, tenant, admin role and subscription, then
//! points every domain row that has no tenant at the default tenant.
//!
//! Every write is conditional (`INSERT ... ON CONFLICT DO NOTHING`, or
//! `UPDATE ... WHERE tenant_id IS NULL`), so a run that fails part way is
//! recovered by running it again.

use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::{
    ConnectionTrait, EntityTrait, QueryFilter, TransactionTrait, prelude::DateTimeWithTimeZone,
    sea_query::Expr,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{AppConfig, BackfillConfig};
use crate::models::{
    BusinessAnalysis, Contact, ContentItem, Deal, DomainTable, Task, TenantScoped, User,
    VoiceProfile, subscription_plan, tenant, tenant_subscription, user, user_role,
};
use crate::repositories::{
    SubscriptionPlanRepository, TenantRepository, TenantSubscriptionRepository,
    UserRoleRepository,
};

pub mod defaults;
mod error;
mod status;

pub use error::{BackfillError, BackfillStep};
pub use status::{TenancyStatus, tenancy_status};

use error::StepContext;

/// Knobs for a backfill run.
#[derive(Debug, Clone)]
pub struct BackfillOptions {
    /// Length of the default tenant's first subscription period
    pub subscription_period_days: u32,
    /// Provision support rows inside a single transaction
    pub transactional_provisioning: bool,
    /// Provenance tag recorded in migration metadata
    pub source_system: String,
}

impl Default for BackfillOptions {
    fn default() -> Self {
        Self::from(&BackfillConfig::default())
    }
}

impl From<&BackfillConfig> for BackfillOptions {
    fn from(config: &BackfillConfig) -> Self {
        Self {
            subscription_period_days: config.subscription_period_days,
            transactional_provisioning: config.transactional,
            source_system: config.source_system.clone(),
        }
    }
}

/// Rows touched in one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TableCount {
    pub table: DomainTable,
    pub rows: u64,
}

/// Which support rows this run inserted (as opposed to found).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SupportRowsCreated {
    pub plan: bool,
    pub tenant: bool,
    pub admin_role: bool,
    pub subscription: bool,
}

impl SupportRowsCreated {
    pub fn any(&self) -> bool {
        self.plan || self.tenant || self.admin_role || self.subscription
    }
}

/// Result of a backfill run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BackfillReport {
    pub tenant_id: Uuid,
    pub plan_id: Uuid,
    pub admin_role_id: Uuid,
    pub subscription_id: Uuid,
    pub created: SupportRowsCreated,
    /// Rows moved onto the default tenant, per table, in processing order
    pub assigned: Vec<TableCount>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BackfillReport {
    pub fn rows_assigned(&self, table: DomainTable) -> u64 {
        self.assigned
            .iter()
            .find(|count| count.table == table)
            .map(|count| count.rows)
            .unwrap_or(0)
    }

    pub fn total_assigned(&self) -> u64 {
        self.assigned.iter().map(|count| count.rows).sum()
    }
}

/// Result of a rollback.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RollbackReport {
    /// Rows whose tenant association was cleared, per table
    pub cleared: Vec<TableCount>,
    pub finished_at: DateTime<Utc>,
}

impl RollbackReport {
    pub fn total_cleared(&self) -> u64 {
        self.cleared.iter().map(|count| count.rows).sum()
    }
}

/// Support rows resolved by the provisioning phase.
struct Provisioned {
    plan: subscription_plan::Model,
    tenant: tenant::Model,
    admin_role: user_role::Model,
    subscription: tenant_subscription::Model,
    created: SupportRowsCreated,
}

/// Runs the backfill against a borrowed datastore handle.
pub struct TenantBackfill<'a, C> {
    db: &'a C,
    options: BackfillOptions,
}

impl<'a, C> TenantBackfill<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(db: &'a C) -> Self {
        Self {
            db,
            options: BackfillOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BackfillOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BackfillOptions {
        &self.options
    }

    /// Provision support rows, then assign unowned rows to the default tenant.
    ///
    /// Users are assigned before the other tables and also receive the admin
    /// role. The first failing datastore call aborts the run.
    #[instrument(skip_all, fields(source = %self.options.source_system))]
    pub async fn run(&self) -> Result<BackfillReport, BackfillError> {
        let started_at = Utc::now();
        let now: DateTimeWithTimeZone = started_at.into();

        let provisioned = if self.options.transactional_provisioning {
            let txn = self
                .db
                .begin()
                .await
                .at_step(BackfillStep::BeginTransaction)?;
            // Dropping `txn` on error rolls the provisioning back.
            let provisioned = self.provision(&txn, now).await?;
            txn.commit()
                .await
                .at_step(BackfillStep::CommitTransaction)?;
            provisioned
        } else {
            self.provision(self.db, now).await?
        };

        record_created(&provisioned.created);

        let mut assigned = Vec::with_capacity(DomainTable::ALL.len());
        for table in DomainTable::ALL {
            let rows = assign_table(self.db, table, &provisioned, now).await?;
            counter!("tenancy_backfill_rows_total", "table" => table.as_str()).increment(rows);
            info!(step = %BackfillStep::AssignTenant(table), %table, rows, "Assigned unowned rows");
            assigned.push(TableCount { table, rows });
        }

        let report = BackfillReport {
            tenant_id: provisioned.tenant.id,
            plan_id: provisioned.plan.id,
            admin_role_id: provisioned.admin_role.id,
            subscription_id: provisioned.subscription.id,
            created: provisioned.created,
            assigned,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            tenant_id = %report.tenant_id,
            rows = report.total_assigned(),
            "Tenant backfill complete"
        );

        Ok(report)
    }

    /// Clear the tenant association on every domain table.
    ///
    /// Support rows are kept, so a later run reuses them. Only meant for
    /// development datastores; see [`ensure_rollback_allowed`].
    #[instrument(skip_all)]
    pub async fn rollback(&self) -> Result<RollbackReport, BackfillError> {
        let mut cleared = Vec::with_capacity(DomainTable::ALL.len());
        for table in DomainTable::ALL {
            let rows = clear_table(self.db, table).await?;
            counter!("tenancy_rollback_rows_total", "table" => table.as_str()).increment(rows);
            warn!(step = %BackfillStep::ClearTenant(table), %table, rows, "Cleared tenant association");
            cleared.push(TableCount { table, rows });
        }

        Ok(RollbackReport {
            cleared,
            finished_at: Utc::now(),
        })
    }

    /// Steps 1-4 and 7: plan, tenant, tenant id, admin role, subscription.
    async fn provision<T: ConnectionTrait + TransactionTrait>(
        &self,
        conn: &T,
        now: DateTimeWithTimeZone,
    ) -> Result<Provisioned, BackfillError> {
        let mut created = SupportRowsCreated::default();

        let plans = SubscriptionPlanRepository::new(conn);
        let existing_plan = plans
            .find_by_name(defaults::DEFAULT_PLAN_NAME)
            .await
            .at_step(BackfillStep::EnsurePlan)?;
        let plan = match existing_plan {
            Some(plan) => plan,
            None => {
                created.plan = plans
                    .insert_if_absent(defaults::default_plan(now))
                    .await
                    .at_step(BackfillStep::EnsurePlan)?;
                // This run or a concurrent one inserted it; only a delete between
                // the insert and this read leaves it missing.
                plans
                    .find_by_name(defaults::DEFAULT_PLAN_NAME)
                    .await
                    .at_step(BackfillStep::EnsurePlan)?
                    .ok_or_else(|| BackfillError::MissingSupportRow {
                        kind: "subscription plan",
                        key: defaults::DEFAULT_PLAN_NAME.to_string(),
                    })?
            }
        };
        info!(step = %BackfillStep::EnsurePlan, plan_id = %plan.id, created = created.plan, "Default plan ready");

        let tenants = TenantRepository::new(conn);
        let existing_tenant = tenants
            .find_by_subdomain(defaults::DEFAULT_TENANT_SUBDOMAIN)
            .await
            .at_step(BackfillStep::EnsureTenant)?;
        if existing_tenant.is_none() {
            created.tenant = tenants
                .insert_if_absent(defaults::default_tenant(now, &self.options.source_system))
                .await
                .at_step(BackfillStep::EnsureTenant)?;
        }
        if !created.tenant {
            tenants
                .mark_active(defaults::DEFAULT_TENANT_SUBDOMAIN, now)
                .await
                .at_step(BackfillStep::EnsureTenant)?;
        }

        // Missing only if the tenant was deleted after the insert above.
        let tenant = tenants
            .find_by_subdomain(defaults::DEFAULT_TENANT_SUBDOMAIN)
            .await
            .at_step(BackfillStep::ResolveTenant)?
            .ok_or_else(|| BackfillError::MissingSupportRow {
                kind: "tenant",
                key: defaults::DEFAULT_TENANT_SUBDOMAIN.to_string(),
            })?;
        info!(step = %BackfillStep::ResolveTenant, tenant_id = %tenant.id, created = created.tenant, "Default tenant ready");

        let roles = UserRoleRepository::new(conn);
        let existing_role = roles
            .find_by_name(tenant.id, defaults::ADMIN_ROLE_NAME)
            .await
            .at_step(BackfillStep::EnsureAdminRole)?;
        let admin_role = match existing_role {
            Some(role) => role,
            None => {
                created.admin_role = roles
                    .insert_if_absent(defaults::admin_role(tenant.id, now))
                    .await
                    .at_step(BackfillStep::EnsureAdminRole)?;
                // Missing only if the role was deleted after the insert above.
                roles
                    .find_by_name(tenant.id, defaults::ADMIN_ROLE_NAME)
                    .await
                    .at_step(BackfillStep::EnsureAdminRole)?
                    .ok_or_else(|| BackfillError::MissingSupportRow {
                        kind: "user role",
                        key: defaults::ADMIN_ROLE_NAME.to_string(),
                    })?
            }
        };
        info!(step = %BackfillStep::EnsureAdminRole, role_id = %admin_role.id, created = created.admin_role, "Admin role ready");

        let (subscription, created_subscription) =
            self.ensure_subscription(conn, &tenant, &plan, now).await?;
        created.subscription = created_subscription;
        info!(step = %BackfillStep::EnsureSubscription, subscription_id = %subscription.id, created = created.subscription, "Tenant subscription ready");

        Ok(Provisioned {
            plan,
            tenant,
            admin_role,
            subscription,
            created,
        })
    }

    /// Step 7: reuse the tenant's subscription or create the first one.
    ///
    /// Subscriptions have no natural unique key, so the lookup and insert run
    /// in their own transaction (a savepoint when `conn` is already one) with
    /// the tenant row locked first. Concurrent runs queue on that lock.
    async fn ensure_subscription<T: ConnectionTrait + TransactionTrait>(
        &self,
        conn: &T,
        tenant: &tenant::Model,
        plan: &subscription_plan::Model,
        now: DateTimeWithTimeZone,
    ) -> Result<(tenant_subscription::Model, bool), BackfillError> {
        let txn = conn
            .begin()
            .await
            .at_step(BackfillStep::BeginTransaction)?;

        // The row update takes the write lock on both Postgres and SQLite.
        TenantRepository::new(&txn)
            .mark_active(&tenant.subdomain, now)
            .await
            .at_step(BackfillStep::EnsureSubscription)?;

        let subscriptions = TenantSubscriptionRepository::new(&txn);
        let existing = subscriptions
            .find_for_tenant(tenant.id)
            .await
            .at_step(BackfillStep::EnsureSubscription)?;
        let (subscription, created) = match existing {
            Some(subscription) => (subscription, false),
            None => {
                let subscription = subscriptions
                    .create(defaults::default_subscription(
                        tenant.id,
                        plan.id,
                        now,
                        self.options.subscription_period_days,
                        &self.options.source_system,
                    ))
                    .await
                    .at_step(BackfillStep::EnsureSubscription)?;
                (subscription, true)
            }
        };

        txn.commit()
            .await
            .at_step(BackfillStep::CommitTransaction)?;
        Ok((subscription, created))
    }
}

/// Run the backfill with default options.
pub async fn run_backfill<C>(db: &C) -> Result<BackfillReport, BackfillError>
where
    C: ConnectionTrait + TransactionTrait,
{
    TenantBackfill::new(db).run().await
}

/// Clear every tenant association. Development datastores only.
pub async fn rollback_backfill<C>(db: &C) -> Result<RollbackReport, BackfillError>
where
    C: ConnectionTrait + TransactionTrait,
{
    TenantBackfill::new(db).rollback().await
}

/// Refuse rollback outside development profiles unless forced.
pub fn ensure_rollback_allowed(config: &AppConfig, force: bool) -> Result<(), BackfillError> {
    if force || config.is_development() {
        return Ok(());
    }
    Err(BackfillError::RollbackRefused {
        profile: config.profile.clone(),
    })
}

fn record_created(created: &SupportRowsCreated) {
    for (kind, was_created) in [
        ("plan", created.plan),
        ("tenant", created.tenant),
        ("admin_role", created.admin_role),
        ("subscription", created.subscription),
    ] {
        if was_created {
            counter!("tenancy_backfill_support_rows_created_total", "kind" => kind).increment(1);
        }
    }
}

async fn assign_table<C: ConnectionTrait>(
    db: &C,
    table: DomainTable,
    provisioned: &Provisioned,
    now: DateTimeWithTimeZone,
) -> Result<u64, BackfillError> {
    let tenant_id = provisioned.tenant.id;
    match table {
        DomainTable::Users => assign_users(db, tenant_id, provisioned.admin_role.id).await,
        DomainTable::Contacts => assign_unowned::<Contact, _>(db, tenant_id, now).await,
        DomainTable::Deals => assign_unowned::<Deal, _>(db, tenant_id, now).await,
        DomainTable::Tasks => assign_unowned::<Task, _>(db, tenant_id, now).await,
        DomainTable::BusinessAnalysis => {
            assign_unowned::<BusinessAnalysis, _>(db, tenant_id, now).await
        }
        DomainTable::ContentItems => assign_unowned::<ContentItem, _>(db, tenant_id, now).await,
        DomainTable::VoiceProfiles => assign_unowned::<VoiceProfile, _>(db, tenant_id, now).await,
    }
}

/// Step 5: unowned users join the default tenant as admins.
async fn assign_users<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    role_id: Uuid,
) -> Result<u64, BackfillError> {
    let result = User::update_many()
        .col_expr(user::Column::TenantId, Expr::value(tenant_id))
        .col_expr(user::Column::RoleId, Expr::value(role_id))
        .col_expr(user::Column::IsAdmin, Expr::value(true))
        .filter(<User as TenantScoped>::unassigned())
        .exec(db)
        .await
        .at_step(BackfillStep::AssignTenant(DomainTable::Users))?;

    Ok(result.rows_affected)
}

/// Step 6 for one table.
async fn assign_unowned<E, C>(
    db: &C,
    tenant_id: Uuid,
    now: DateTimeWithTimeZone,
) -> Result<u64, BackfillError>
where
    E: TenantScoped,
    C: ConnectionTrait,
{
    let mut update = E::update_many().col_expr(E::tenant_column(), Expr::value(tenant_id));
    if let Some(column) = E::touched_column() {
        update = update.col_expr(column, Expr::value(now));
    }

    let result = update
        .filter(E::unassigned())
        .exec(db)
        .await
        .at_step(BackfillStep::AssignTenant(E::TABLE))?;

    Ok(result.rows_affected)
}

async fn clear_table<C: ConnectionTrait>(db: &C, table: DomainTable) -> Result<u64, BackfillError> {
    match table {
        DomainTable::Users => clear_owned::<User, _>(db).await,
        DomainTable::Contacts => clear_owned::<Contact, _>(db).await,
        DomainTable::Deals => clear_owned::<Deal, _>(db).await,
        DomainTable::Tasks => clear_owned::<Task, _>(db).await,
        DomainTable::BusinessAnalysis => clear_owned::<BusinessAnalysis, _>(db).await,
        DomainTable::ContentItems => clear_owned::<ContentItem, _>(db).await,
        DomainTable::VoiceProfiles => clear_owned::<VoiceProfile, _>(db).await,
    }
}

async fn clear_owned<E, C>(db: &C) -> Result<u64, BackfillError>
where
    E: TenantScoped,
    C: ConnectionTrait,
{
    use sea_orm::ColumnTrait;

    let result = E::update_many()
        .col_expr(E::tenant_column(), Expr::value(Option::<Uuid>::None))
        .filter(E::tenant_column().is_not_null())
        .exec(db)
        .await
        .at_step(BackfillStep::ClearTenant(E::TABLE))?;

    Ok(result.rows_affected)
}
