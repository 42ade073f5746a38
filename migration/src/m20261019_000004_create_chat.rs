use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Chat::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Chat::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Chat::Sender).string().null())
          .col(ColumnDef::new(Chat::SenderUuid).string().null())
          .col(ColumnDef::new(Chat::Message).text().not_null())
          .col(ColumnDef::new(Chat::Timestamp).big_integer().not_null())
          .col(ColumnDef::new(Chat::Type).string().null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_chat_timestamp")
          .table(Chat::Table)
          .col(Chat::Timestamp)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Chat::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Chat {
  Table,
  Id,
  Sender,
  SenderUuid,
  Message,
  Timestamp,
  Type,
}
