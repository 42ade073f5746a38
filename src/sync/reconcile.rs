//! Pure halves of the reconcilers
//!
//! The store services in `sv` apply these decisions inside one transaction
//! per feed.

use crate::{prelude::*, tapi::model::Stamped};

/// Rows per multi-row insert, keeps statements under SQLite's bound
/// variable limit for the widest table.
pub const BATCH: usize = 256;

/// Rows touched by one reconcile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
  pub written: u64,
  pub removed: u64,
}

/// Ids present in the store but absent from the latest snapshot.
pub fn vanished<V>(
  stored: impl IntoIterator<Item = String>,
  snapshot: &BTreeMap<String, V>,
) -> Vec<String> {
  stored.into_iter().filter(|id| !snapshot.contains_key(id)).collect()
}

/// Log entries strictly newer than the stored high-water mark.
///
/// The cursor is not advanced within a batch: entries sharing a new
/// timestamp are all kept, entries sharing the stored maximum are all lost.
pub fn fresh<T: Stamped>(
  cursor: i64,
  entries: &[T],
) -> impl Iterator<Item = &T> {
  entries.iter().filter(move |entry| entry.timestamp() > cursor)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatStat {
  pub category: String,
  pub key: String,
  pub value: i64,
}

/// Flattens `category -> key -> value` and `category -> key -> sub -> value`
/// into `(category, key)` and `(category, "key:sub")` rows.
pub fn flatten_stats(stats: &json::Value) -> Vec<FlatStat> {
  let mut rows = Vec::new();
  let Some(categories) = stats.as_object() else {
    return rows;
  };

  for (category, entries) in categories {
    let Some(entries) = entries.as_object() else {
      continue;
    };

    for (key, value) in entries {
      match value {
        json::Value::Object(nested) => {
          for (sub, value) in nested {
            if let Some(value) = integer(value) {
              rows.push(FlatStat {
                category: category.clone(),
                key: format!("{key}:{sub}"),
                value,
              });
            }
          }
        }
        value => {
          if let Some(value) = integer(value) {
            rows.push(FlatStat {
              category: category.clone(),
              key: key.clone(),
              value,
            });
          }
        }
      }
    }
  }

  rows
}

fn integer(value: &json::Value) -> Option<i64> {
  value.as_i64().or_else(|| {
    value.as_f64().filter(|float| float.fract() == 0.0).map(|float| float as i64)
  })
}
