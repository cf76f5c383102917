//! Fixed payloads for the support rows the backfill provisions.

use chrono::Duration;
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde_json::{Value as JsonValue, json};
use uuid::Uuid;

use crate::models::{subscription_plan, tenant, tenant_subscription, user_role};

pub const DEFAULT_PLAN_NAME: &str = "Default Plan";
pub const DEFAULT_TENANT_SUBDOMAIN: &str = "default";
pub const DEFAULT_TENANT_NAME: &str = "Default Organization";
pub const ADMIN_ROLE_NAME: &str = "Admin";

/// Permissions carried by the admin role.
pub const ADMIN_PERMISSIONS: [&str; 15] = [
    "users:read",
    "users:write",
    "users:delete",
    "contacts:read",
    "contacts:write",
    "contacts:delete",
    "deals:read",
    "deals:write",
    "deals:delete",
    "tasks:read",
    "tasks:write",
    "tasks:delete",
    "analytics:read",
    "ai:use",
    "settings:write",
];

/// Provenance stamped on rows created for migrated data.
pub fn migration_metadata(now: DateTimeWithTimeZone, source_system: &str) -> JsonValue {
    json!({
        "migrated": true,
        "migratedAt": now.to_rfc3339(),
        "source": source_system,
    })
}

pub fn plan_features() -> JsonValue {
    json!({
        "aiTools": true,
        "maxUsers": 100,
        "maxContacts": 100000,
        "maxDeals": 50000,
        "maxAiRequestsPerMonth": 10000,
        "apiAccess": true,
        "support": "standard",
    })
}

pub fn tenant_branding() -> JsonValue {
    json!({
        "companyName": DEFAULT_TENANT_NAME,
        "primaryColor": "#3b82f6",
        "secondaryColor": "#64748b",
        "logoUrl": null,
    })
}

pub fn tenant_feature_flags() -> JsonValue {
    json!({
        "aiTools": true,
        "apiAccess": true,
        "advancedAnalytics": true,
        "voiceAnalysis": true,
        "documentAnalysis": true,
        "multiTenant": false,
        "whiteLabel": false,
    })
}

pub fn default_plan(now: DateTimeWithTimeZone) -> subscription_plan::ActiveModel {
    subscription_plan::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(DEFAULT_PLAN_NAME.to_string()),
        description: Set(Some("Default plan for migrated data".to_string())),
        price: Set(0),
        billing_period: Set("yearly".to_string()),
        features: Set(plan_features()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

pub fn default_tenant(now: DateTimeWithTimeZone, source_system: &str) -> tenant::ActiveModel {
    tenant::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(DEFAULT_TENANT_NAME.to_string()),
        tenant_type: Set("organization".to_string()),
        parent_tenant_id: Set(None),
        subdomain: Set(DEFAULT_TENANT_SUBDOMAIN.to_string()),
        custom_domain: Set(None),
        status: Set("active".to_string()),
        branding_config: Set(Some(tenant_branding())),
        feature_flags: Set(Some(tenant_feature_flags())),
        metadata: Set(Some(migration_metadata(now, source_system))),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

pub fn admin_role(tenant_id: Uuid, now: DateTimeWithTimeZone) -> user_role::ActiveModel {
    user_role::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        name: Set(ADMIN_ROLE_NAME.to_string()),
        description: Set(Some("Full administrative access".to_string())),
        permissions: Set(json!(ADMIN_PERMISSIONS)),
        is_default: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

pub fn default_subscription(
    tenant_id: Uuid,
    plan_id: Uuid,
    now: DateTimeWithTimeZone,
    period_days: u32,
    source_system: &str,
) -> tenant_subscription::ActiveModel {
    tenant_subscription::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        plan_id: Set(plan_id),
        status: Set("active".to_string()),
        current_period_start: Set(now),
        current_period_end: Set(now + Duration::days(i64::from(period_days))),
        cancel_at_period_end: Set(false),
        metadata: Set(Some(migration_metadata(now, source_system))),
        created_at: Set(now),
        updated_at: Set(now),
    }
}
