use sea_orm::sea_query::OnConflict;

use crate::{entity::variable, prelude::*};

pub struct Variables<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Variables<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn set(&self, name: &str, value: impl ToString) -> Result<()> {
    self.set_many([(name, value.to_string())]).await
  }

  pub async fn set_many<'n>(
    &self,
    values: impl IntoIterator<Item = (&'n str, String)>,
  ) -> Result<()> {
    let models: Vec<_> = values
      .into_iter()
      .map(|(name, value)| variable::ActiveModel {
        variable: Set(name.to_string()),
        value: Set(value),
      })
      .collect();

    if models.is_empty() {
      return Ok(());
    }

    variable::Entity::insert_many(models)
      .on_conflict(
        OnConflict::column(variable::Column::Variable)
          .update_column(variable::Column::Value)
          .to_owned(),
      )
      .exec_without_returning(self.db)
      .await?;

    Ok(())
  }

  /// Stamps a freshness variable with the current time.
  pub async fn touch(&self, name: &str) -> Result<i64> {
    let now = utils::now_millis();
    self.set(name, now).await?;
    Ok(now)
  }

  pub async fn get(&self, name: &str) -> Result<Option<String>> {
    let var = variable::Entity::find_by_id(name).one(self.db).await?;
    Ok(var.map(|var| var.value))
  }

  pub async fn many(&self, names: &[&str]) -> Result<HashMap<String, String>> {
    let vars = variable::Entity::find()
      .filter(variable::Column::Variable.is_in(names.iter().copied()))
      .all(self.db)
      .await?;

    Ok(vars.into_iter().map(|var| (var.variable, var.value)).collect())
  }

  /// Numeric variable, `0` when missing or unparsable.
  pub async fn millis(&self, name: &str) -> Result<i64> {
    Ok(self.get(name).await?.and_then(|v| v.parse().ok()).unwrap_or(0))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test::live_db;

  #[tokio::test]
  async fn variables_are_upserted() {
    let db = live_db().await;
    let sv = Variables::new(&db);

    sv.set("weather", "clear").await.unwrap();
    sv.set("weather", "rain").await.unwrap();
    sv.set("day", 812).await.unwrap();

    assert_eq!(sv.get("weather").await.unwrap().as_deref(), Some("rain"));
    assert_eq!(sv.millis("day").await.unwrap(), 812);
    assert_eq!(sv.millis("missing").await.unwrap(), 0);
    assert_eq!(variable::Entity::find().count(&db).await.unwrap(), 2);

    let many = sv.many(&["weather", "day", "missing"]).await.unwrap();
    assert_eq!(many.len(), 2);
  }

  #[tokio::test]
  async fn touch_stamps_now() {
    let db = live_db().await;
    let sv = Variables::new(&db);

    let before = utils::now_millis();
    let stamped = sv.touch("last_chat_update").await.unwrap();
    assert!(stamped >= before);
    assert_eq!(sv.millis("last_chat_update").await.unwrap(), stamped);
  }
}
