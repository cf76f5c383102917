//! # Subscription Plan Repository

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, sea_query::OnConflict,
};

use crate::models::subscription_plan::{
    ActiveModel as PlanActiveModel, Column, Entity as SubscriptionPlan, Model as PlanModel,
};

/// Repository for subscription plan lookups and idempotent provisioning
pub struct SubscriptionPlanRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> SubscriptionPlanRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Find a plan by its unique name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<PlanModel>, DbErr> {
        SubscriptionPlan::find()
            .filter(Column::Name.eq(name))
            .one(self.db)
            .await
    }

    /// Insert the plan unless one with the same name exists.
    ///
    /// Returns `true` when this call wrote the row.
    pub async fn insert_if_absent(&self, plan: PlanActiveModel) -> Result<bool, DbErr> {
        let inserted = SubscriptionPlan::insert(plan)
            .on_conflict(OnConflict::column(Column::Name).do_nothing().to_owned())
            .exec_without_returning(self.db)
            .await?;

        Ok(inserted > 0)
    }
}
