//! Domain models for the exercise catalog.
//!
//! - [`Exercise`]: the only stored entity, written by ingestion and read by the API.
//! - [`Muscle`]: the closed set of muscle tags an exercise can target.
//! - [`Equipment`]: open, free-form equipment category.
//! - [`ExerciseFilter`], [`PageRequest`], [`Pagination`]: query inputs and
//!   listing metadata shared by the store and the HTTP layer.

mod exercise;
mod muscle;
mod query;

pub use exercise::*;
pub use muscle::*;
pub use query::*;
