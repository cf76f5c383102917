//! Test utilities for database testing.
//!
//! In-memory SQLite with the real migrator applied, plus fixtures that model
//! a single-tenant CRM datastore just before the tenant backfill.

#![allow(dead_code)]

use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, QueryOrder,
    Set, Statement, prelude::DateTimeWithTimeZone,
};
use serde_json::json;
use uuid::Uuid;

use tenancy::models::{
    BusinessAnalysis, Contact, ContentItem, Deal, Task, User, VoiceProfile, business_analysis,
    contact, content_item, deal, task, user, voice_profile,
};

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Timestamp used for every fixture row, well before any backfill run.
pub fn legacy_timestamp() -> DateTimeWithTimeZone {
    chrono::DateTime::parse_from_rfc3339("2024-03-01T09:30:00+00:00").unwrap()
}

pub async fn insert_user(
    db: &DatabaseConnection,
    id: &str,
    tenant_id: Option<Uuid>,
) -> Result<user::Model> {
    let model = user::ActiveModel {
        id: Set(id.to_string()),
        email: Set(format!("{id}@example.com")),
        first_name: Set(Some("Ada".to_string())),
        last_name: Set(Some(id.to_uppercase())),
        tenant_id: Set(tenant_id),
        role_id: Set(None),
        is_admin: Set(false),
        created_at: Set(legacy_timestamp()),
        updated_at: Set(legacy_timestamp()),
    }
    .insert(db)
    .await?;
    Ok(model)
}

pub async fn insert_contact(
    db: &DatabaseConnection,
    owner_id: &str,
    tenant_id: Option<Uuid>,
) -> Result<contact::Model> {
    let model = contact::ActiveModel {
        first_name: Set("Grace".to_string()),
        last_name: Set("Hopper".to_string()),
        email: Set(Some("grace@navy.example".to_string())),
        phone: Set(None),
        company: Set(Some("Navy".to_string())),
        status: Set("prospect".to_string()),
        owner_id: Set(Some(owner_id.to_string())),
        tenant_id: Set(tenant_id),
        created_at: Set(legacy_timestamp()),
        updated_at: Set(legacy_timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(model)
}

pub async fn insert_deal(
    db: &DatabaseConnection,
    contact_id: i32,
    tenant_id: Option<Uuid>,
) -> Result<deal::Model> {
    let model = deal::ActiveModel {
        title: Set("Compiler licence renewal".to_string()),
        value_cents: Set(1_250_000),
        stage: Set("negotiation".to_string()),
        contact_id: Set(Some(contact_id)),
        owner_id: Set(None),
        tenant_id: Set(tenant_id),
        created_at: Set(legacy_timestamp()),
        updated_at: Set(legacy_timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(model)
}

pub async fn insert_task(
    db: &DatabaseConnection,
    deal_id: i32,
    tenant_id: Option<Uuid>,
) -> Result<task::Model> {
    let model = task::ActiveModel {
        title: Set("Send proposal".to_string()),
        description: Set(Some("Include volume discount".to_string())),
        due_date: Set(Some(legacy_timestamp())),
        completed: Set(false),
        contact_id: Set(None),
        deal_id: Set(Some(deal_id)),
        assignee_id: Set(None),
        tenant_id: Set(tenant_id),
        created_at: Set(legacy_timestamp()),
        updated_at: Set(legacy_timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(model)
}

pub async fn insert_analysis(
    db: &DatabaseConnection,
    user_id: &str,
    tenant_id: Option<Uuid>,
) -> Result<business_analysis::Model> {
    let model = business_analysis::ActiveModel {
        user_id: Set(Some(user_id.to_string())),
        analysis_type: Set("swot".to_string()),
        content: Set(json!({"strengths": ["pipeline"], "weaknesses": []})),
        tenant_id: Set(tenant_id),
        created_at: Set(legacy_timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(model)
}

pub async fn insert_content_item(
    db: &DatabaseConnection,
    user_id: &str,
    tenant_id: Option<Uuid>,
) -> Result<content_item::Model> {
    let model = content_item::ActiveModel {
        title: Set("Launch email".to_string()),
        content_type: Set("email".to_string()),
        body: Set("Hello from the team".to_string()),
        user_id: Set(Some(user_id.to_string())),
        tenant_id: Set(tenant_id),
        created_at: Set(legacy_timestamp()),
        updated_at: Set(legacy_timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(model)
}

pub async fn insert_voice_profile(
    db: &DatabaseConnection,
    user_id: &str,
    tenant_id: Option<Uuid>,
) -> Result<voice_profile::Model> {
    let model = voice_profile::ActiveModel {
        name: Set("Friendly".to_string()),
        description: Set(None),
        tone: Set(Some("warm".to_string())),
        characteristics: Set(Some(json!({"formality": "low"}))),
        user_id: Set(Some(user_id.to_string())),
        tenant_id: Set(tenant_id),
        created_at: Set(legacy_timestamp()),
        updated_at: Set(legacy_timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(model)
}

/// Seeds `users` users and one row per other domain table for each of them,
/// all without a tenant. Returns the number of rows inserted.
pub async fn seed_legacy_crm(db: &DatabaseConnection, users: usize) -> Result<u64> {
    for n in 0..users {
        let user_id = format!("user_{n}");
        insert_user(db, &user_id, None).await?;
        let contact = insert_contact(db, &user_id, None).await?;
        let deal = insert_deal(db, contact.id, None).await?;
        insert_task(db, deal.id, None).await?;
        insert_analysis(db, &user_id, None).await?;
        insert_content_item(db, &user_id, None).await?;
        insert_voice_profile(db, &user_id, None).await?;
    }
    Ok(users as u64 * 7)
}

/// Every domain row, ordered by primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSnapshot {
    pub users: Vec<user::Model>,
    pub contacts: Vec<contact::Model>,
    pub deals: Vec<deal::Model>,
    pub tasks: Vec<task::Model>,
    pub analyses: Vec<business_analysis::Model>,
    pub content_items: Vec<content_item::Model>,
    pub voice_profiles: Vec<voice_profile::Model>,
}

impl DomainSnapshot {
    pub async fn capture(db: &DatabaseConnection) -> Result<Self> {
        Ok(Self {
            users: User::find().order_by_asc(user::Column::Id).all(db).await?,
            contacts: Contact::find().order_by_asc(contact::Column::Id).all(db).await?,
            deals: Deal::find().order_by_asc(deal::Column::Id).all(db).await?,
            tasks: Task::find().order_by_asc(task::Column::Id).all(db).await?,
            analyses: BusinessAnalysis::find()
                .order_by_asc(business_analysis::Column::Id)
                .all(db)
                .await?,
            content_items: ContentItem::find()
                .order_by_asc(content_item::Column::Id)
                .all(db)
                .await?,
            voice_profiles: VoiceProfile::find()
                .order_by_asc(voice_profile::Column::Id)
                .all(db)
                .await?,
        })
    }

    /// The snapshot with every column the backfill may write reset, so two
    /// snapshots compare equal when nothing else changed.
    pub fn without_tenancy_columns(mut self) -> Self {
        let epoch = legacy_timestamp();
        for row in &mut self.users {
            row.tenant_id = None;
            row.role_id = None;
            row.is_admin = false;
        }
        for row in &mut self.contacts {
            row.tenant_id = None;
            row.updated_at = epoch;
        }
        for row in &mut self.deals {
            row.tenant_id = None;
            row.updated_at = epoch;
        }
        for row in &mut self.tasks {
            row.tenant_id = None;
            row.updated_at = epoch;
        }
        for row in &mut self.analyses {
            row.tenant_id = None;
        }
        for row in &mut self.content_items {
            row.tenant_id = None;
            row.updated_at = epoch;
        }
        for row in &mut self.voice_profiles {
            row.tenant_id = None;
            row.updated_at = epoch;
        }
        self
    }

    /// Distinct tenant ids found across all rows (`None` for unassigned rows).
    pub fn tenant_ids(&self) -> Vec<Option<Uuid>> {
        let mut ids: Vec<Option<Uuid>> = self
            .users
            .iter()
            .map(|r| r.tenant_id)
            .chain(self.contacts.iter().map(|r| r.tenant_id))
            .chain(self.deals.iter().map(|r| r.tenant_id))
            .chain(self.tasks.iter().map(|r| r.tenant_id))
            .chain(self.analyses.iter().map(|r| r.tenant_id))
            .chain(self.content_items.iter().map(|r| r.tenant_id))
            .chain(self.voice_profiles.iter().map(|r| r.tenant_id))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Drops a table out from under the backfill to simulate a failing step.
pub async fn drop_table(db: &DatabaseConnection, table: &str) -> Result<()> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        format!("DROP TABLE {table}"),
    ))
    .await?;
    Ok(())
}
