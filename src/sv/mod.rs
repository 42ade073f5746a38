//! Store services, one per table family
//!
//! Every write opens its own transaction and releases it before returning.

pub mod chat;
pub mod kill;
pub mod nation;
pub mod player;
pub mod stats;
pub mod status;
pub mod town;
pub mod variable;

pub use chat::Chat;
pub use kill::Kills;
pub use nation::Nations;
pub use player::Players;
pub use stats::Stats;
pub use status::Status;
pub use town::Towns;
pub use variable::Variables;

/// Cursor of a paginated log read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
  /// Most recent rows
  Latest,
  /// Rows with an id lower than the given one
  Before(i32),
  /// Rows with an id greater than the given one
  After(i32),
}

impl Page {
  pub fn new(oldest: Option<i32>, newest: Option<i32>) -> Self {
    match (oldest, newest) {
      (_, Some(id)) => Page::After(id),
      (Some(id), None) => Page::Before(id),
      (None, None) => Page::Latest,
    }
  }
}
