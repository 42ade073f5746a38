use chrono::Utc;

/// Wall clock in epoch milliseconds, the time unit of every stored timestamp.
pub fn now_millis() -> i64 {
  Utc::now().timestamp_millis()
}

pub fn millis(duration: std::time::Duration) -> i64 {
  i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Whole minutes elapsed since `then`, both in epoch millis.
pub fn age_minutes(now: i64, then: i64) -> i64 {
  (now - then).div_euclid(60_000)
}

/// Minecraft ticks (20/s) to hours with one decimal.
pub fn ticks_to_hours(ticks: i64) -> String {
  format!("{:.1}", ticks as f64 / 20.0 / 60.0 / 60.0)
}

pub fn cm_to_km(cm: i64) -> String {
  format!("{:.3}", cm as f64 / 100_000.0)
}

/// Renders a scalar json value the way it is stored in `variables`.
/// Strings lose their quotes, `null` yields nothing.
pub fn scalar_text(value: &json::Value) -> Option<String> {
  match value {
    json::Value::Null => None,
    json::Value::String(s) => Some(s.clone()),
    other => Some(other.to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unit_conversions() {
    assert_eq!(ticks_to_hours(72_000), "1.0");
    assert_eq!(ticks_to_hours(0), "0.0");
    assert_eq!(cm_to_km(150_000), "1.500");
  }

  #[test]
  fn ages_round_down() {
    assert_eq!(age_minutes(119_999, 0), 1);
    assert_eq!(age_minutes(120_000, 0), 2);
  }

  #[test]
  fn scalars_render_without_quotes() {
    assert_eq!(scalar_text(&json::json!("clear")), Some("clear".into()));
    assert_eq!(scalar_text(&json::json!(42)), Some("42".into()));
    assert_eq!(scalar_text(&json::Value::Null), None);
  }
}
