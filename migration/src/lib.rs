//! Schema migrations for the live and the statistics databases

pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_players;
mod m20261019_000002_create_towns;
mod m20261019_000003_create_nations;
mod m20261019_000004_create_chat;
mod m20261019_000005_create_kills;
mod m20261019_000006_create_variables;
mod m20261019_000007_create_player_statistics;

/// Migrations of the live database (players, towny, logs, variables).
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20261019_000001_create_players::Migration),
      Box::new(m20261019_000002_create_towns::Migration),
      Box::new(m20261019_000003_create_nations::Migration),
      Box::new(m20261019_000004_create_chat::Migration),
      Box::new(m20261019_000005_create_kills::Migration),
      Box::new(m20261019_000006_create_variables::Migration),
    ]
  }
}

/// Migrations of the statistics database.
pub struct StatsMigrator;

#[async_trait::async_trait]
impl MigratorTrait for StatsMigrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![Box::new(m20261019_000007_create_player_statistics::Migration)]
  }

  // both databases may live in one file
  fn migration_table_name() -> DynIden {
    Alias::new("seaql_stats_migrations").into_iden()
  }
}
