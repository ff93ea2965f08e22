pub mod chamber;
pub mod config;
pub mod error;
pub mod event;
pub mod io;
pub mod lifecycle;
pub mod live;
pub mod merge;
pub mod nationstates;
pub mod paginate;
pub mod paths;
pub mod reconcile;
pub mod roster;
pub mod types;

pub use error::{Result, VoteError};
