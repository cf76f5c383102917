//! # Tenant Subscription Repository
//!
//! Subscriptions carry no natural unique key, so creation is look-then-insert
//! and callers that need atomicity run it inside a transaction.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::models::tenant_subscription::{
    ActiveModel as SubscriptionActiveModel, Column, Entity as TenantSubscription,
    Model as SubscriptionModel,
};

/// Repository for tenant subscriptions
pub struct TenantSubscriptionRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TenantSubscriptionRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Earliest subscription recorded for a tenant, if any
    pub async fn find_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<SubscriptionModel>, DbErr> {
        TenantSubscription::find()
            .filter(Column::TenantId.eq(tenant_id))
            .order_by_asc(Column::CreatedAt)
            .one(self.db)
            .await
    }

    /// Insert a subscription row
    pub async fn create(
        &self,
        subscription: SubscriptionActiveModel,
    ) -> Result<SubscriptionModel, DbErr> {
        subscription.insert(self.db).await
    }
}
