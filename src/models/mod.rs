//! Data models for the parish backend.
//!
//! Wire names are camelCase, except document IDs which keep the `documentID` spelling
//! the enrollment forms use.

mod child;
mod enrollment;
mod guardian;
mod member;
mod program;

pub use child::*;
pub use enrollment::*;
pub use guardian::*;
pub use member::*;
pub use program::*;
