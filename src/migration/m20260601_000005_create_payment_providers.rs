use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PaymentProviders::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PaymentProviders::Id)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(PaymentProviders::Name).string().not_null())
          .col(ColumnDef::new(PaymentProviders::ProviderType).string().not_null())
          .col(ColumnDef::new(PaymentProviders::DisplayName).string().not_null())
          .col(
            ColumnDef::new(PaymentProviders::IsActive)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(
            ColumnDef::new(PaymentProviders::IsDefault)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(PaymentProviders::Config).json().not_null())
          .col(ColumnDef::new(PaymentProviders::WebhookUrl).string().null())
          .col(ColumnDef::new(PaymentProviders::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(PaymentProviders::UpdatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PaymentProviders::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PaymentProviders {
  Table,
  Id,
  Name,
  ProviderType,
  DisplayName,
  IsActive,
  IsDefault,
  Config,
  WebhookUrl,
  CreatedAt,
  UpdatedAt,
}
