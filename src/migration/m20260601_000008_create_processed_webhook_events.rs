use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    // The primary key on the upstream event id is the backstop against
    // double entitlement under concurrent deliveries.
    manager
      .create_table(
        Table::create()
          .table(ProcessedWebhookEvents::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(ProcessedWebhookEvents::Id)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(ProcessedWebhookEvents::Provider).string().not_null())
          .col(ColumnDef::new(ProcessedWebhookEvents::EventType).string().null())
          .col(
            ColumnDef::new(ProcessedWebhookEvents::ProcessedAt)
              .date_time()
              .not_null(),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(ProcessedWebhookEvents::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum ProcessedWebhookEvents {
  Table,
  Id,
  Provider,
  EventType,
  ProcessedAt,
}
