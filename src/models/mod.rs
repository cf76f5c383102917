//! # Data Models
//!
//! SeaORM entities for the tenancy support tables and the CRM domain tables,
//! plus the [`TenantScoped`] seam the backfill is written against.

use sea_orm::{ColumnTrait, EntityTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod business_analysis;
pub mod contact;
pub mod content_item;
pub mod deal;
pub mod subscription_plan;
pub mod task;
pub mod tenant;
pub mod tenant_subscription;
pub mod user;
pub mod user_role;
pub mod voice_profile;

pub use business_analysis::Entity as BusinessAnalysis;
pub use contact::Entity as Contact;
pub use content_item::Entity as ContentItem;
pub use deal::Entity as Deal;
pub use subscription_plan::Entity as SubscriptionPlan;
pub use task::Entity as Task;
pub use tenant::Entity as Tenant;
pub use tenant_subscription::Entity as TenantSubscription;
pub use user::Entity as User;
pub use user_role::Entity as UserRole;
pub use voice_profile::Entity as VoiceProfile;

/// The CRM tables whose rows are partitioned by tenant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DomainTable {
    Users,
    Contacts,
    Deals,
    Tasks,
    BusinessAnalysis,
    ContentItems,
    VoiceProfiles,
}

impl DomainTable {
    /// Every domain table, in backfill order (users first).
    pub const ALL: [DomainTable; 7] = [
        DomainTable::Users,
        DomainTable::Contacts,
        DomainTable::Deals,
        DomainTable::Tasks,
        DomainTable::BusinessAnalysis,
        DomainTable::ContentItems,
        DomainTable::VoiceProfiles,
    ];

    /// SQL table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainTable::Users => "users",
            DomainTable::Contacts => "contacts",
            DomainTable::Deals => "deals",
            DomainTable::Tasks => "tasks",
            DomainTable::BusinessAnalysis => "business_analysis",
            DomainTable::ContentItems => "content_items",
            DomainTable::VoiceProfiles => "voice_profiles",
        }
    }
}

impl std::fmt::Display for DomainTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity whose rows carry a nullable tenant association.
pub trait TenantScoped: EntityTrait {
    /// Which domain table this entity maps to.
    const TABLE: DomainTable;

    /// The `tenant_id` column.
    fn tenant_column() -> Self::Column;

    /// The column refreshed when a row is reassigned, if the entity tracks one.
    fn touched_column() -> Option<Self::Column> {
        None
    }

    /// Filter expression matching rows that belong to no tenant.
    fn unassigned() -> sea_orm::sea_query::SimpleExpr {
        Self::tenant_column().is_null()
    }
}

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "crm-tenancy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
