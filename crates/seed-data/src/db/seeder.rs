//! Database seeding.

use serde::{Deserialize, Serialize};
use sqlx::{
    Connection, PgConnection, PgPool, Postgres, QueryBuilder, query_builder::Separated,
};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::info;
use uuid::Uuid;

use super::schema::Table;
use crate::config::SeedConfig;
use crate::data::{Customer, Dataset, Invoice, Revenue, User};
use crate::password::hash_password;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Hash(String),
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),
    #[error("Seeding task failed: {0}")]
    Task(String),
}

/// Outcome of seeding one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    /// Rows in the dataset for this table.
    pub attempted: u64,
    /// Rows actually written; the rest already existed.
    pub inserted: u64,
}

impl TableSummary {
    pub fn skipped(&self) -> u64 {
        self.attempted.saturating_sub(self.inserted)
    }
}

/// Per-table outcome of a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub users: TableSummary,
    pub customers: TableSummary,
    pub invoices: TableSummary,
    pub revenue: TableSummary,
}

impl SeedSummary {
    pub fn table(&self, table: Table) -> TableSummary {
        match table {
            Table::Users => self.users,
            Table::Customers => self.customers,
            Table::Invoices => self.invoices,
            Table::Revenue => self.revenue,
        }
    }

    pub fn total_inserted(&self) -> u64 {
        Table::ALL.iter().map(|t| self.table(*t).inserted).sum()
    }
}

/// Seeds the dataset through a pooled connection.
///
/// One connection is held for the whole run and returned to the pool when
/// the run finishes, whether or not it succeeded.
#[derive(Clone)]
pub struct Seeder {
    pool: PgPool,
    config: SeedConfig,
}

impl Seeder {
    /// Creates a new seeder with the given database pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            config: SeedConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SeedConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the number of rows per INSERT statement.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub async fn seed(&self, dataset: &Dataset) -> Result<SeedSummary, SeedError> {
        // Checked here too so a bad dataset fails without waiting on the pool.
        dataset.validate()?;
        let mut conn = self.pool.acquire().await?;
        seed(&mut conn, dataset, &self.config).await
    }

    /// Returns a reference to the pool for advanced usage.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Creates the dashboard tables and inserts the dataset in one transaction.
///
/// Tables are filled in [`Table::ALL`] order. Rows whose identity already
/// exists are skipped. On any error the transaction is dropped uncommitted,
/// so neither tables nor rows from this run persist.
pub async fn seed(
    conn: &mut PgConnection,
    dataset: &Dataset,
    config: &SeedConfig,
) -> Result<SeedSummary, SeedError> {
    dataset.validate()?;

    let batch_size = config.batch_size;
    let hashes = hash_passwords(&dataset.users).await?;

    let mut tx = conn.begin().await?;

    let users = seed_users(&mut tx, &dataset.users, hashes, batch_size).await?;
    let customers = seed_customers(&mut tx, &dataset.customers, batch_size).await?;
    let invoices = seed_invoices(&mut tx, &dataset.invoices, batch_size).await?;
    let revenue = seed_revenue(&mut tx, &dataset.revenue, batch_size).await?;

    tx.commit().await?;

    let summary = SeedSummary {
        users,
        customers,
        invoices,
        revenue,
    };
    info!("Seeding committed, {} new rows", summary.total_inserted());
    Ok(summary)
}

/// Hashes every password on the blocking pool, returning hashes in input order.
async fn hash_passwords(users: &[User]) -> Result<Vec<String>, SeedError> {
    let mut tasks = JoinSet::new();
    for (index, user) in users.iter().enumerate() {
        let password = user.password.clone();
        tasks.spawn_blocking(move || hash_password(&password).map(|hash| (index, hash)));
    }

    let mut hashes = vec![String::new(); users.len()];
    // Returning early drops the set, which cancels the remaining tasks.
    while let Some(joined) = tasks.join_next().await {
        let (index, hash) = joined.map_err(|e| SeedError::Task(e.to_string()))??;
        hashes[index] = hash;
    }

    Ok(hashes)
}

async fn seed_users(
    conn: &mut PgConnection,
    users: &[User],
    hashes: Vec<String>,
    batch_size: usize,
) -> Result<TableSummary, SeedError> {
    let rows: Vec<(Uuid, &User, String)> = users
        .iter()
        .zip(hashes)
        .map(|(user, hash)| (user.resolved_id(), user, hash))
        .collect();

    seed_table(conn, Table::Users, &rows, batch_size, bind_user).await
}

async fn seed_customers(
    conn: &mut PgConnection,
    customers: &[Customer],
    batch_size: usize,
) -> Result<TableSummary, SeedError> {
    seed_table(conn, Table::Customers, customers, batch_size, bind_customer).await
}

async fn seed_invoices(
    conn: &mut PgConnection,
    invoices: &[Invoice],
    batch_size: usize,
) -> Result<TableSummary, SeedError> {
    let rows: Vec<(Uuid, &Invoice)> = invoices
        .iter()
        .enumerate()
        .map(|(position, invoice)| (invoice.resolved_id(position), invoice))
        .collect();

    seed_table(conn, Table::Invoices, &rows, batch_size, bind_invoice).await
}

async fn seed_revenue(
    conn: &mut PgConnection,
    revenue: &[Revenue],
    batch_size: usize,
) -> Result<TableSummary, SeedError> {
    seed_table(conn, Table::Revenue, revenue, batch_size, bind_revenue).await
}

// Row binders. Column order must match `Table::insert_prefix`.

fn bind_user<'r>(mut b: Separated<'_, 'r, Postgres, &'static str>, row: &'r (Uuid, &User, String)) {
    let (id, user, hash) = row;
    b.push_bind(*id)
        .push_bind(&user.name)
        .push_bind(&user.email)
        .push_bind(hash);
}

fn bind_customer<'r>(mut b: Separated<'_, 'r, Postgres, &'static str>, customer: &'r Customer) {
    b.push_bind(customer.id)
        .push_bind(&customer.name)
        .push_bind(&customer.email)
        .push_bind(&customer.image_url);
}

fn bind_invoice<'r>(mut b: Separated<'_, 'r, Postgres, &'static str>, row: &'r (Uuid, &Invoice)) {
    let (id, invoice) = row;
    b.push_bind(*id)
        .push_bind(invoice.customer_id)
        .push_bind(invoice.amount)
        .push_bind(invoice.status.as_str())
        .push_bind(invoice.date);
}

fn bind_revenue<'r>(mut b: Separated<'_, 'r, Postgres, &'static str>, rev: &'r Revenue) {
    b.push_bind(&rev.month).push_bind(rev.revenue);
}

/// Creates `table` if needed, then inserts `rows` in batches, skipping conflicts.
///
/// Batches larger than the table's bind-parameter limit allows are split.
async fn seed_table<'r, T, F>(
    conn: &mut PgConnection,
    table: Table,
    rows: &'r [T],
    batch_size: usize,
    mut bind: F,
) -> Result<TableSummary, SeedError>
where
    F: FnMut(Separated<'_, 'r, Postgres, &'static str>, &'r T),
{
    info!("Seeding {} {}...", rows.len(), table.name());

    sqlx::query(table.create_statement())
        .execute(&mut *conn)
        .await?;

    let mut inserted = 0;
    for chunk in rows.chunks(table.rows_per_statement(batch_size)) {
        let mut builder = insert_statement(table, chunk, &mut bind);
        inserted += builder.build().execute(&mut *conn).await?.rows_affected();
    }

    let summary = TableSummary {
        attempted: rows.len() as u64,
        inserted,
    };
    info!(
        "Seeded {} {} ({} new, {} skipped)",
        summary.attempted,
        table.name(),
        summary.inserted,
        summary.skipped()
    );
    Ok(summary)
}

/// Builds one multi-row insert-or-ignore statement for `rows`.
fn insert_statement<'r, T, F>(table: Table, rows: &'r [T], bind: &mut F) -> QueryBuilder<'r, Postgres>
where
    F: FnMut(Separated<'_, 'r, Postgres, &'static str>, &'r T),
{
    let mut builder = QueryBuilder::new(table.insert_prefix());
    builder.push_values(rows, |b, row| bind(b, row));
    builder.push(table.conflict_clause());
    builder
}
