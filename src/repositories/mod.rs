//! # Repository Layer
//!
//! Data access for the tenancy support tables. Every repository borrows a
//! `ConnectionTrait` handle, so the same code runs on the pool or inside the
//! provisioning transaction.

pub mod subscription_plan;
pub mod tenant;
pub mod tenant_subscription;
pub mod user_role;

pub use subscription_plan::SubscriptionPlanRepository;
pub use tenant::TenantRepository;
pub use tenant_subscription::TenantSubscriptionRepository;
pub use user_role::UserRoleRepository;
