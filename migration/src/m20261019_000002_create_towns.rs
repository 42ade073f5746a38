use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Towns::Table)
          .if_not_exists()
          .col(ColumnDef::new(Towns::Uuid).string().not_null().primary_key())
          .col(ColumnDef::new(Towns::Name).string().not_null())
          .col(ColumnDef::new(Towns::Mayor).string().null())
          .col(ColumnDef::new(Towns::Founder).string().null())
          .col(ColumnDef::new(Towns::Balance).double().not_null().default(0.0))
          // display back-reference only, nations may be renamed or removed
          .col(ColumnDef::new(Towns::Nation).string().null())
          .col(ColumnDef::new(Towns::NationName).string().null())
          .col(ColumnDef::new(Towns::Founded).big_integer().null())
          .col(
            ColumnDef::new(Towns::ResidentTaxPercent)
              .double()
              .not_null()
              .default(0.0),
          )
          .col(
            ColumnDef::new(Towns::IsActive).boolean().not_null().default(false),
          )
          .col(
            ColumnDef::new(Towns::ClaimedChunks)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Towns::ColorHex).string().null())
          .col(ColumnDef::new(Towns::Tag).string().null())
          .col(ColumnDef::new(Towns::Board).text().null())
          .col(ColumnDef::new(Towns::SpawnLocX).double().not_null().default(0.0))
          .col(ColumnDef::new(Towns::SpawnLocZ).double().not_null().default(0.0))
          .col(ColumnDef::new(Towns::SpawnLocY).double().not_null().default(0.0))
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Towns::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Towns {
  Table,
  Uuid,
  Name,
  Mayor,
  Founder,
  Balance,
  Nation,
  NationName,
  Founded,
  ResidentTaxPercent,
  IsActive,
  ClaimedChunks,
  ColorHex,
  Tag,
  Board,
  SpawnLocX,
  SpawnLocZ,
  SpawnLocY,
}
