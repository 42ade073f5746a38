use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Kills::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Kills::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Kills::KillerUuid).string().not_null())
          .col(ColumnDef::new(Kills::KillerName).string().not_null())
          .col(ColumnDef::new(Kills::VictimUuid).string().not_null())
          .col(ColumnDef::new(Kills::VictimName).string().not_null())
          .col(ColumnDef::new(Kills::DeathMessage).text().null())
          .col(ColumnDef::new(Kills::WeaponJson).text().null())
          .col(ColumnDef::new(Kills::Timestamp).big_integer().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_kills_timestamp")
          .table(Kills::Table)
          .col(Kills::Timestamp)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Kills::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Kills {
  Table,
  Id,
  KillerUuid,
  KillerName,
  VictimUuid,
  VictimName,
  DeathMessage,
  WeaponJson,
  Timestamp,
}
