//! Migration to create the single-tenant CRM tables.
//!
//! These are the domain tables as they existed before tenancy was introduced:
//! none of them carries a tenant association yet.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).text().not_null())
                    .col(ColumnDef::new(Users::FirstName).text().null())
                    .col(ColumnDef::new(Users::LastName).text().null())
                    .col(created_at(Users::CreatedAt))
                    .col(updated_at(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Contacts::Table)
                    .if_not_exists()
                    .col(serial_id(Contacts::Id))
                    .col(ColumnDef::new(Contacts::FirstName).text().not_null())
                    .col(ColumnDef::new(Contacts::LastName).text().not_null())
                    .col(ColumnDef::new(Contacts::Email).text().null())
                    .col(ColumnDef::new(Contacts::Phone).text().null())
                    .col(ColumnDef::new(Contacts::Company).text().null())
                    .col(
                        ColumnDef::new(Contacts::Status)
                            .text()
                            .not_null()
                            .default("lead"),
                    )
                    .col(ColumnDef::new(Contacts::OwnerId).text().null())
                    .col(created_at(Contacts::CreatedAt))
                    .col(updated_at(Contacts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Deals::Table)
                    .if_not_exists()
                    .col(serial_id(Deals::Id))
                    .col(ColumnDef::new(Deals::Title).text().not_null())
                    .col(
                        ColumnDef::new(Deals::ValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Deals::Stage)
                            .text()
                            .not_null()
                            .default("prospecting"),
                    )
                    .col(ColumnDef::new(Deals::ContactId).integer().null())
                    .col(ColumnDef::new(Deals::OwnerId).text().null())
                    .col(created_at(Deals::CreatedAt))
                    .col(updated_at(Deals::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(serial_id(Tasks::Id))
                    .col(ColumnDef::new(Tasks::Title).text().not_null())
                    .col(ColumnDef::new(Tasks::Description).text().null())
                    .col(
                        ColumnDef::new(Tasks::DueDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Tasks::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Tasks::ContactId).integer().null())
                    .col(ColumnDef::new(Tasks::DealId).integer().null())
                    .col(ColumnDef::new(Tasks::AssigneeId).text().null())
                    .col(created_at(Tasks::CreatedAt))
                    .col(updated_at(Tasks::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Analyses are immutable snapshots, so there is no updated_at.
        manager
            .create_table(
                Table::create()
                    .table(BusinessAnalysis::Table)
                    .if_not_exists()
                    .col(serial_id(BusinessAnalysis::Id))
                    .col(ColumnDef::new(BusinessAnalysis::UserId).text().null())
                    .col(
                        ColumnDef::new(BusinessAnalysis::AnalysisType)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BusinessAnalysis::Content)
                            .json_binary()
                            .not_null(),
                    )
                    .col(created_at(BusinessAnalysis::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContentItems::Table)
                    .if_not_exists()
                    .col(serial_id(ContentItems::Id))
                    .col(ColumnDef::new(ContentItems::Title).text().not_null())
                    .col(ColumnDef::new(ContentItems::ContentType).text().not_null())
                    .col(ColumnDef::new(ContentItems::Body).text().not_null())
                    .col(ColumnDef::new(ContentItems::UserId).text().null())
                    .col(created_at(ContentItems::CreatedAt))
                    .col(updated_at(ContentItems::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VoiceProfiles::Table)
                    .if_not_exists()
                    .col(serial_id(VoiceProfiles::Id))
                    .col(ColumnDef::new(VoiceProfiles::Name).text().not_null())
                    .col(ColumnDef::new(VoiceProfiles::Description).text().null())
                    .col(ColumnDef::new(VoiceProfiles::Tone).text().null())
                    .col(
                        ColumnDef::new(VoiceProfiles::Characteristics)
                            .json_binary()
                            .null(),
                    )
                    .col(ColumnDef::new(VoiceProfiles::UserId).text().null())
                    .col(created_at(VoiceProfiles::CreatedAt))
                    .col(updated_at(VoiceProfiles::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VoiceProfiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContentItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BusinessAnalysis::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contacts::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_users_email").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

fn serial_id<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn created_at<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn updated_at<T: IntoIden>(col: T) -> ColumnDef {
    created_at(col)
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Contacts {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    Status,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Deals {
    Table,
    Id,
    Title,
    ValueCents,
    Stage,
    ContactId,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Title,
    Description,
    DueDate,
    Completed,
    ContactId,
    DealId,
    AssigneeId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BusinessAnalysis {
    Table,
    Id,
    UserId,
    AnalysisType,
    Content,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ContentItems {
    Table,
    Id,
    Title,
    ContentType,
    Body,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum VoiceProfiles {
    Table,
    Id,
    Name,
    Description,
    Tone,
    Characteristics,
    UserId,
    CreatedAt,
    UpdatedAt,
}
