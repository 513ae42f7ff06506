use sea_orm_migration::prelude::*;

use super::m20260601_000001_create_users::Users;
use super::m20260601_000002_create_plugins::Plugins;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Subscriptions::Table)
          .if_not_exists()
          .col(ColumnDef::new(Subscriptions::Id).string().not_null().primary_key())
          .col(ColumnDef::new(Subscriptions::UserId).string().not_null())
          .col(ColumnDef::new(Subscriptions::PluginId).string().not_null())
          .col(ColumnDef::new(Subscriptions::PlanType).string().not_null())
          .col(
            ColumnDef::new(Subscriptions::Status)
              .string()
              .not_null()
              .default("active"),
          )
          .col(ColumnDef::new(Subscriptions::Price).decimal_len(10, 2).not_null())
          .col(ColumnDef::new(Subscriptions::StartDate).date_time().not_null())
          .col(ColumnDef::new(Subscriptions::EndDate).date_time().null())
          .col(
            ColumnDef::new(Subscriptions::AutoRenew)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(Subscriptions::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_subscriptions_user")
              .from(Subscriptions::Table, Subscriptions::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_subscriptions_plugin")
              .from(Subscriptions::Table, Subscriptions::PluginId)
              .to(Plugins::Table, Plugins::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_subscriptions_user")
          .table(Subscriptions::Table)
          .col(Subscriptions::UserId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Subscriptions {
  Table,
  Id,
  UserId,
  PluginId,
  PlanType,
  Status,
  Price,
  StartDate,
  EndDate,
  AutoRenew,
  CreatedAt,
}
