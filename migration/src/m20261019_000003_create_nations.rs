use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Nations::Table)
          .if_not_exists()
          .col(ColumnDef::new(Nations::Uuid).string().not_null().primary_key())
          .col(ColumnDef::new(Nations::Name).string().not_null())
          .col(ColumnDef::new(Nations::Leader).string().null())
          .col(ColumnDef::new(Nations::CapitolTown).string().null())
          .col(ColumnDef::new(Nations::CapitolTownName).string().null())
          .col(ColumnDef::new(Nations::Balance).double().not_null().default(0.0))
          .col(
            ColumnDef::new(Nations::TownTaxDollars)
              .double()
              .not_null()
              .default(0.0),
          )
          .col(ColumnDef::new(Nations::Founded).big_integer().null())
          .col(
            ColumnDef::new(Nations::ColorHex)
              .string()
              .not_null()
              .default("000000"),
          )
          .col(ColumnDef::new(Nations::Tag).string().null())
          .col(ColumnDef::new(Nations::Board).text().null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Nations::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Nations {
  Table,
  Uuid,
  Name,
  Leader,
  CapitolTown,
  CapitolTownName,
  Balance,
  TownTaxDollars,
  Founded,
  ColorHex,
  Tag,
  Board,
}
