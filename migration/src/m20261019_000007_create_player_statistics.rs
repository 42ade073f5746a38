use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PlayerStatistics::Table)
          .if_not_exists()
          .col(ColumnDef::new(PlayerStatistics::PlayerUuid).string().not_null())
          .col(ColumnDef::new(PlayerStatistics::Category).string().not_null())
          .col(ColumnDef::new(PlayerStatistics::StatKey).string().not_null())
          .col(
            ColumnDef::new(PlayerStatistics::StatValue)
              .big_integer()
              .not_null(),
          )
          .primary_key(
            Index::create()
              .col(PlayerStatistics::PlayerUuid)
              .col(PlayerStatistics::Category)
              .col(PlayerStatistics::StatKey),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_player_statistics_stat")
          .table(PlayerStatistics::Table)
          .col(PlayerStatistics::Category)
          .col(PlayerStatistics::StatKey)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PlayerStatistics::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PlayerStatistics {
  Table,
  PlayerUuid,
  Category,
  StatKey,
  StatValue,
}
