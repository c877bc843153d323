//! Exercise catalog service.
//!
//! A read-only HTTP API over a SQLite catalog of strength-training exercises:
//! filtered and paginated listings, random samples, lookup by id, and the
//! distinct equipment and muscle values present in the catalog.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
