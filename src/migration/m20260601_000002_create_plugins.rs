use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Plugins::Table)
          .if_not_exists()
          .col(ColumnDef::new(Plugins::Id).string().not_null().primary_key())
          .col(ColumnDef::new(Plugins::Name).string().not_null())
          .col(ColumnDef::new(Plugins::Slug).string().not_null().unique_key())
          .col(ColumnDef::new(Plugins::Version).string().not_null())
          .col(ColumnDef::new(Plugins::Price).decimal_len(10, 2).not_null())
          .col(ColumnDef::new(Plugins::MonthlyPrice).decimal_len(10, 2).null())
          .col(ColumnDef::new(Plugins::YearlyPrice).decimal_len(10, 2).null())
          .col(ColumnDef::new(Plugins::IsActive).boolean().not_null().default(true))
          .col(ColumnDef::new(Plugins::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Plugins::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Plugins {
  Table,
  Id,
  Name,
  Slug,
  Version,
  Price,
  MonthlyPrice,
  YearlyPrice,
  IsActive,
  CreatedAt,
}
