//! Pure data structures shared by the translator, the channel and the coordinator.

pub mod dictionary;
pub mod raw;
pub mod schema;

pub use dictionary::*;
pub use raw::*;
pub use schema::*;
