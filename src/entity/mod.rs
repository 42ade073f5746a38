//! SeaORM entities of the live and the statistics databases

pub mod chat;
pub mod kill;
pub mod nation;
pub mod player;
pub mod stat;
pub mod town;
pub mod variable;
