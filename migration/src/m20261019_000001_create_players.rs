use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Players::Table)
          .if_not_exists()
          .col(ColumnDef::new(Players::Uuid).string().not_null().primary_key())
          .col(ColumnDef::new(Players::Name).string().not_null())
          .col(
            ColumnDef::new(Players::OnlineDuration)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Players::AfkDuration)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Players::Balance).double().null())
          .col(ColumnDef::new(Players::Title).string().null())
          .col(ColumnDef::new(Players::Town).string().null())
          .col(ColumnDef::new(Players::TownName).string().null())
          .col(ColumnDef::new(Players::Nation).string().null())
          .col(ColumnDef::new(Players::NationName).string().null())
          .col(ColumnDef::new(Players::Bio).text().null())
          .col(ColumnDef::new(Players::FirstJoined).big_integer().null())
          .col(ColumnDef::new(Players::LastOnline).big_integer().null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Players::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Players {
  Table,
  Uuid,
  Name,
  OnlineDuration,
  AfkDuration,
  Balance,
  Title,
  Town,
  TownName,
  Nation,
  NationName,
  Bio,
  FirstJoined,
  LastOnline,
}
