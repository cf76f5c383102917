//! Integration tests for the tenant backfill against an in-memory datastore.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use serde_json::json;
use tenancy::backfill::{
    BackfillError, BackfillOptions, BackfillStep, TenantBackfill, defaults, rollback_backfill,
    run_backfill, tenancy_status,
};
use tenancy::models::{
    DomainTable, SubscriptionPlan, Tenant, TenantSubscription, User, UserRole, subscription_plan,
    tenant, tenant_subscription, user_role,
};

#[path = "test_utils/mod.rs"]
mod test_utils;

use test_utils::{DomainSnapshot, legacy_timestamp, seed_legacy_crm, setup_test_db};

async fn support_row_counts(db: &DatabaseConnection) -> (u64, u64, u64, u64) {
    let plans = SubscriptionPlan::find()
        .filter(subscription_plan::Column::Name.eq(defaults::DEFAULT_PLAN_NAME))
        .count(db)
        .await
        .unwrap();
    let tenants = Tenant::find()
        .filter(tenant::Column::Subdomain.eq(defaults::DEFAULT_TENANT_SUBDOMAIN))
        .count(db)
        .await
        .unwrap();
    let roles = UserRole::find()
        .filter(user_role::Column::Name.eq(defaults::ADMIN_ROLE_NAME))
        .count(db)
        .await
        .unwrap();
    let subscriptions = TenantSubscription::find().count(db).await.unwrap();
    (plans, tenants, roles, subscriptions)
}

#[tokio::test]
async fn first_run_provisions_support_rows_and_admin_users() {
    let db = setup_test_db().await.unwrap();
    for id in ["alice", "bob", "carol"] {
        test_utils::insert_user(&db, id, None).await.unwrap();
    }

    let report = run_backfill(&db).await.unwrap();

    assert_eq!(support_row_counts(&db).await, (1, 1, 1, 1));
    assert!(report.created.plan);
    assert!(report.created.tenant);
    assert!(report.created.admin_role);
    assert!(report.created.subscription);
    assert_eq!(report.rows_assigned(DomainTable::Users), 3);

    let users = User::find().all(&db).await.unwrap();
    assert_eq!(users.len(), 3);
    for user in users {
        assert_eq!(user.tenant_id, Some(report.tenant_id));
        assert_eq!(user.role_id, Some(report.admin_role_id));
        assert!(user.is_admin);
    }

    let role = UserRole::find_by_id(report.admin_role_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(role.tenant_id, report.tenant_id);
    assert!(role.is_default);
    assert_eq!(role.permission_list().len(), defaults::ADMIN_PERMISSIONS.len());

    let subscription = TenantSubscription::find_by_id(report.subscription_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(subscription.tenant_id, report.tenant_id);
    assert_eq!(subscription.plan_id, report.plan_id);
    assert_eq!(subscription.status, "active");
    assert!(!subscription.cancel_at_period_end);
    assert_eq!(
        (subscription.current_period_end - subscription.current_period_start).num_days(),
        365
    );
}

#[tokio::test]
async fn second_run_is_a_no_op() {
    let db = setup_test_db().await.unwrap();
    let seeded = seed_legacy_crm(&db, 2).await.unwrap();

    let first = run_backfill(&db).await.unwrap();
    assert_eq!(first.total_assigned(), seeded);
    let after_first = DomainSnapshot::capture(&db).await.unwrap();

    let second = run_backfill(&db).await.unwrap();

    assert_eq!(second.total_assigned(), 0);
    for table in DomainTable::ALL {
        assert_eq!(second.rows_assigned(table), 0, "{table} rows reassigned");
    }
    assert!(!second.created.any());
    assert_eq!(second.tenant_id, first.tenant_id);
    assert_eq!(second.plan_id, first.plan_id);
    assert_eq!(second.admin_role_id, first.admin_role_id);
    assert_eq!(second.subscription_id, first.subscription_id);

    assert_eq!(DomainSnapshot::capture(&db).await.unwrap(), after_first);
    assert_eq!(support_row_counts(&db).await, (1, 1, 1, 1));
}

#[tokio::test]
async fn repeated_runs_never_duplicate_support_rows() {
    let db = setup_test_db().await.unwrap();
    seed_legacy_crm(&db, 1).await.unwrap();

    for _ in 0..4 {
        run_backfill(&db).await.unwrap();
    }

    assert_eq!(support_row_counts(&db).await, (1, 1, 1, 1));
}

#[tokio::test]
async fn every_domain_row_gets_the_default_tenant() {
    let db = setup_test_db().await.unwrap();
    seed_legacy_crm(&db, 3).await.unwrap();

    let before = tenancy_status(&db).await.unwrap();
    assert_eq!(before.total_unassigned(), 21);
    assert!(!before.default_tenant_present);

    let report = run_backfill(&db).await.unwrap();

    for table in DomainTable::ALL {
        assert_eq!(report.rows_assigned(table), 3, "{table}");
    }

    let after = tenancy_status(&db).await.unwrap();
    assert!(after.is_complete());
    assert_eq!(after.default_tenant_id, Some(report.tenant_id));
    assert!(after.default_plan_present);
    assert!(after.admin_role_present);
    assert!(after.subscription_present);

    let snapshot = DomainSnapshot::capture(&db).await.unwrap();
    assert_eq!(snapshot.tenant_ids(), vec![Some(report.tenant_id)]);
}

#[tokio::test]
async fn non_tenancy_columns_are_preserved() {
    let db = setup_test_db().await.unwrap();
    seed_legacy_crm(&db, 2).await.unwrap();
    let before = DomainSnapshot::capture(&db).await.unwrap();

    run_backfill(&db).await.unwrap();

    let after = DomainSnapshot::capture(&db).await.unwrap();
    assert_eq!(
        after.clone().without_tenancy_columns(),
        before.without_tenancy_columns()
    );

    // User timestamps are not part of the reassignment.
    for user in &after.users {
        assert_eq!(user.updated_at, legacy_timestamp());
    }
    // Analyses only track creation time.
    for analysis in &after.analyses {
        assert_eq!(analysis.created_at, legacy_timestamp());
    }
    for contact in &after.contacts {
        assert!(contact.updated_at > legacy_timestamp());
    }
}

#[tokio::test]
async fn rows_already_owned_by_another_tenant_are_left_alone() {
    let db = setup_test_db().await.unwrap();
    let other_tenant = defaults::default_tenant(legacy_timestamp(), "import");
    let other_tenant = tenant::ActiveModel {
        subdomain: Set("acme".to_string()),
        name: Set("Acme".to_string()),
        ..other_tenant
    }
    .insert(&db)
    .await
    .unwrap();

    test_utils::insert_user(&db, "owned", Some(other_tenant.id))
        .await
        .unwrap();
    test_utils::insert_user(&db, "orphan", None).await.unwrap();

    let report = run_backfill(&db).await.unwrap();
    assert_eq!(report.rows_assigned(DomainTable::Users), 1);

    let owned = User::find_by_id("owned").one(&db).await.unwrap().unwrap();
    assert_eq!(owned.tenant_id, Some(other_tenant.id));
    assert!(!owned.is_admin);
    assert_eq!(owned.role_id, None);
}

#[tokio::test]
async fn rollback_then_backfill_restores_the_same_tenant() {
    let db = setup_test_db().await.unwrap();
    let seeded = seed_legacy_crm(&db, 2).await.unwrap();

    let first = run_backfill(&db).await.unwrap();

    let rollback = rollback_backfill(&db).await.unwrap();
    assert_eq!(rollback.total_cleared(), seeded);
    let status = tenancy_status(&db).await.unwrap();
    assert_eq!(status.total_unassigned(), seeded);
    // Support rows survive a rollback.
    assert!(status.default_tenant_present);
    assert!(status.subscription_present);

    let second = run_backfill(&db).await.unwrap();

    assert_eq!(second.total_assigned(), seeded);
    assert!(!second.created.any());
    assert_eq!(second.tenant_id, first.tenant_id);
    assert_eq!(support_row_counts(&db).await, (1, 1, 1, 1));

    let snapshot = DomainSnapshot::capture(&db).await.unwrap();
    assert_eq!(snapshot.tenant_ids(), vec![Some(first.tenant_id)]);
}

#[tokio::test]
async fn rollback_on_a_fresh_datastore_clears_nothing() {
    let db = setup_test_db().await.unwrap();
    seed_legacy_crm(&db, 1).await.unwrap();

    let report = rollback_backfill(&db).await.unwrap();

    assert_eq!(report.total_cleared(), 0);
    assert_eq!(report.cleared.len(), DomainTable::ALL.len());
}

#[tokio::test]
async fn resumes_after_interruption_between_tenant_and_role() {
    let db = setup_test_db().await.unwrap();
    seed_legacy_crm(&db, 1).await.unwrap();

    // A previous run got as far as the plan and tenant.
    defaults::default_plan(legacy_timestamp())
        .insert(&db)
        .await
        .unwrap();
    let tenant = defaults::default_tenant(legacy_timestamp(), "single-tenant")
        .insert(&db)
        .await
        .unwrap();

    let report = run_backfill(&db).await.unwrap();

    assert!(!report.created.plan);
    assert!(!report.created.tenant);
    assert!(report.created.admin_role);
    assert!(report.created.subscription);
    assert_eq!(report.tenant_id, tenant.id);
    assert_eq!(report.total_assigned(), 7);
    assert_eq!(support_row_counts(&db).await, (1, 1, 1, 1));
}

#[tokio::test]
async fn existing_tenant_is_reactivated_without_losing_branding() {
    let db = setup_test_db().await.unwrap();
    let custom_branding = json!({"companyName": "Initech", "primaryColor": "#ff0000"});
    let custom_flags = json!({"aiTools": false});

    let existing = tenant::ActiveModel {
        status: Set("suspended".to_string()),
        branding_config: Set(Some(custom_branding.clone())),
        feature_flags: Set(Some(custom_flags.clone())),
        ..defaults::default_tenant(legacy_timestamp(), "single-tenant")
    }
    .insert(&db)
    .await
    .unwrap();

    let report = run_backfill(&db).await.unwrap();
    assert_eq!(report.tenant_id, existing.id);
    assert!(!report.created.tenant);

    let tenant = Tenant::find_by_id(existing.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tenant.status, "active");
    assert_eq!(tenant.branding_config, Some(custom_branding));
    assert_eq!(tenant.feature_flags, Some(custom_flags));
    assert!(tenant.updated_at > legacy_timestamp());

    // One run stamps every row it writes with the same instant.
    let role = UserRole::find_by_id(report.admin_role_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let subscription = TenantSubscription::find_by_id(report.subscription_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tenant.updated_at, role.created_at);
    assert_eq!(tenant.updated_at, subscription.created_at);
}

#[tokio::test]
async fn existing_subscription_is_reused() {
    let db = setup_test_db().await.unwrap();
    let plan = defaults::default_plan(legacy_timestamp())
        .insert(&db)
        .await
        .unwrap();
    let tenant = defaults::default_tenant(legacy_timestamp(), "single-tenant")
        .insert(&db)
        .await
        .unwrap();
    let subscription = tenant_subscription::ActiveModel {
        status: Set("past_due".to_string()),
        ..defaults::default_subscription(tenant.id, plan.id, legacy_timestamp(), 30, "billing")
    }
    .insert(&db)
    .await
    .unwrap();

    let report = run_backfill(&db).await.unwrap();

    assert_eq!(report.subscription_id, subscription.id);
    assert!(!report.created.subscription);
    let stored = TenantSubscription::find_by_id(subscription.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, "past_due");
}

#[tokio::test]
async fn failing_step_aborts_and_is_named() {
    let db = setup_test_db().await.unwrap();
    seed_legacy_crm(&db, 1).await.unwrap();
    test_utils::drop_table(&db, "voice_profiles").await.unwrap();

    let err = run_backfill(&db).await.unwrap_err();

    assert!(matches!(err, BackfillError::Database { .. }));
    assert_eq!(
        err.step(),
        Some(BackfillStep::AssignTenant(DomainTable::VoiceProfiles))
    );
    assert!(err.to_string().contains("assign tenant to voice_profiles"));

    // Earlier steps are not undone; a re-run resumes from here.
    let users = User::find()
        .filter(tenancy::models::user::Column::TenantId.is_null())
        .count(&db)
        .await
        .unwrap();
    assert_eq!(users, 0);
    assert_eq!(support_row_counts(&db).await, (1, 1, 1, 1));
}

#[tokio::test]
async fn provisioning_failure_rolls_back_support_rows() {
    let db = setup_test_db().await.unwrap();
    test_utils::drop_table(&db, "tenant_subscriptions")
        .await
        .unwrap();

    let err = run_backfill(&db).await.unwrap_err();

    assert_eq!(err.step(), Some(BackfillStep::EnsureSubscription));
    assert_eq!(SubscriptionPlan::find().count(&db).await.unwrap(), 0);
    assert_eq!(Tenant::find().count(&db).await.unwrap(), 0);
    assert_eq!(UserRole::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn non_transactional_run_reaches_the_same_state() {
    let db = setup_test_db().await.unwrap();
    let seeded = seed_legacy_crm(&db, 2).await.unwrap();

    let options = BackfillOptions {
        transactional_provisioning: false,
        subscription_period_days: 30,
        source_system: "legacy-crm".to_string(),
    };
    let report = TenantBackfill::new(&db)
        .with_options(options)
        .run()
        .await
        .unwrap();

    assert_eq!(report.total_assigned(), seeded);
    assert!(tenancy_status(&db).await.unwrap().is_complete());

    let subscription = TenantSubscription::find_by_id(report.subscription_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        (subscription.current_period_end - subscription.current_period_start).num_days(),
        30
    );
    assert_eq!(subscription.metadata.unwrap()["source"], "legacy-crm");

    let tenant = Tenant::find_by_id(report.tenant_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tenant.metadata.unwrap()["migrated"], true);
}

#[tokio::test]
async fn concurrent_non_transactional_runs_create_one_subscription() {
    let db = setup_test_db().await.unwrap();
    seed_legacy_crm(&db, 2).await.unwrap();

    let options = BackfillOptions {
        transactional_provisioning: false,
        ..BackfillOptions::default()
    };
    let first = TenantBackfill::new(&db).with_options(options.clone());
    let second = TenantBackfill::new(&db).with_options(options);

    let (a, b) = tokio::join!(first.run(), second.run());
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(support_row_counts(&db).await, (1, 1, 1, 1));
    assert_eq!(a.subscription_id, b.subscription_id);
    assert_eq!(a.tenant_id, b.tenant_id);
    assert!(tenancy_status(&db).await.unwrap().is_complete());
}

#[tokio::test]
async fn empty_datastore_still_gets_support_rows() {
    let db = setup_test_db().await.unwrap();

    let report = run_backfill(&db).await.unwrap();

    assert_eq!(report.total_assigned(), 0);
    assert_eq!(report.assigned.len(), DomainTable::ALL.len());
    assert_eq!(support_row_counts(&db).await, (1, 1, 1, 1));
}
