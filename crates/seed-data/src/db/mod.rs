//! Database integration for seeding the dashboard tables.
//!
//! [`seed`] runs the whole procedure on a caller-owned connection inside a
//! single transaction; [`Seeder`] does the same through a pool.

mod schema;
mod seeder;

pub use schema::{MAX_BIND_PARAMS, Table};
pub use seeder::{SeedError, SeedSummary, Seeder, TableSummary, seed};
