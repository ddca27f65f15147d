//! Seed data for the invoice dashboard.
//!
//! This crate owns the fixed demo dataset (users, customers, invoices and
//! monthly revenue) and the procedure that writes it to Postgres: create the
//! tables if they are missing, then insert every record, skipping rows whose
//! key already exists. The whole run is one transaction.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seed_data::prelude::*;
//!
//! let pool = DatabaseConfig::from_env()?.connect_pool().await?;
//! let summary = Seeder::new(pool)
//!     .seed(&PlaceholderData.dataset())
//!     .await?;
//! println!("{} new rows", summary.total_inserted());
//! ```

pub mod api;
pub mod config;
pub mod data;
pub mod db;
pub mod password;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::api::{ApiSeeder, SeedResponse};
    pub use crate::config::{DatabaseConfig, SeedConfig};
    pub use crate::data::{
        Customer, Dataset, DatasetProvider, Invoice, InvoiceStatus, PlaceholderData, Revenue,
        User,
    };
    pub use crate::db::{SeedError, SeedSummary, Seeder, Table, TableSummary};
}
