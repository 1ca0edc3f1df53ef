//! Domain models for the renal-care system.

mod history;
mod schedule;
mod status;
mod summary;

pub use history::*;
pub use schedule::*;
pub use status::*;
pub use summary::*;
