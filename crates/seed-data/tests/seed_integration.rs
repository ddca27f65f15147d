//! Integration tests for seeding against a real Postgres database.
//!
//! These tests verify:
//! - Re-seeding the same dataset changes nothing
//! - Stored passwords are hashes, never the plaintext
//! - A failure in any table rolls back every table
//! - Conflicting identities keep the first row
//!
//! To run these tests you need a PostgreSQL 13+ database and the
//! DATABASE_URL environment variable set.
//!
//! Run with: `DATABASE_URL=postgres://... cargo nextest run -p seed-data`
//!
//! Each test works in its own freshly created schema, dropped afterwards,
//! so they can safely run against a development database.

use seed_data::db;
use seed_data::password::verify_password;
use seed_data::prelude::*;
use sqlx::{
    PgPool,
    postgres::{PgPoolOptions, PgSslMode},
};
use std::env;
use uuid::Uuid;

/// A pool whose search_path points at a private schema.
struct TestDb {
    admin: PgPool,
    pool: PgPool,
    schema: String,
}

/// Creates an isolated schema, skipping tests if DATABASE_URL is not set.
async fn get_test_db() -> Option<TestDb> {
    let database_url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return None;
        }
    };

    // Local test databases usually don't speak TLS.
    let config = DatabaseConfig::with_url(database_url).ssl_mode(PgSslMode::Prefer);
    let options = config.connect_options().expect("Invalid DATABASE_URL");

    let admin = match PgPoolOptions::new()
        .max_connections(1)
        .connect_with(options.clone())
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: Failed to connect to database: {e}");
            return None;
        }
    };

    let schema = format!("seed_test_{}", Uuid::new_v4().simple());
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .expect("Failed to create test schema");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect_with(options.options([("search_path", &schema)]))
        .await
        .expect("Failed to connect to test schema");

    Some(TestDb {
        admin,
        pool,
        schema,
    })
}

/// Drops the test schema and everything in it.
async fn cleanup(db: TestDb) {
    db.pool.close().await;
    let _ = sqlx::query(&format!("DROP SCHEMA {} CASCADE", db.schema))
        .execute(&db.admin)
        .await;
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

async fn table_exists(pool: &PgPool, table: &str) -> bool {
    let found: Option<String> = sqlx::query_scalar("SELECT to_regclass($1)::text")
        .bind(table)
        .fetch_one(pool)
        .await
        .expect("Failed to look up table");
    found.is_some()
}

fn ada() -> User {
    User {
        id: Some(Uuid::new_v5(&Uuid::NAMESPACE_OID, b"u1")),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        password: "secret".to_string(),
    }
}

fn revenue(month: &str, amount: i32) -> Revenue {
    Revenue {
        month: month.to_string(),
        revenue: amount,
    }
}

#[tokio::test]
async fn test_seed_counts_match_dataset() {
    let Some(db) = get_test_db().await else {
        return;
    };

    let dataset = PlaceholderData.dataset();
    let summary = Seeder::new(db.pool.clone())
        .seed(&dataset)
        .await
        .expect("Seeding failed");

    assert_eq!(count(&db.pool, "users").await, dataset.users.len() as i64);
    assert_eq!(count(&db.pool, "customers").await, dataset.customers.len() as i64);
    assert_eq!(count(&db.pool, "invoices").await, dataset.invoices.len() as i64);
    assert_eq!(count(&db.pool, "revenue").await, dataset.revenue.len() as i64);
    assert_eq!(summary.total_inserted(), dataset.len() as u64);

    cleanup(db).await;
}

#[tokio::test]
async fn test_seed_twice_is_idempotent() {
    let Some(db) = get_test_db().await else {
        return;
    };

    let dataset = PlaceholderData.dataset();
    let seeder = Seeder::new(db.pool.clone()).with_batch_size(5);

    seeder.seed(&dataset).await.expect("First seed failed");
    let mut counts = Vec::new();
    for table in Table::ALL {
        counts.push(count(&db.pool, table.name()).await);
    }

    let second = seeder.seed(&dataset).await.expect("Second seed failed");
    for (table, before) in Table::ALL.iter().zip(counts) {
        assert_eq!(count(&db.pool, table.name()).await, before);
        assert_eq!(second.table(*table).inserted, 0);
        assert_eq!(second.table(*table).skipped(), before as u64);
    }

    cleanup(db).await;
}

#[tokio::test]
async fn test_stored_password_is_a_hash() {
    let Some(db) = get_test_db().await else {
        return;
    };

    let user = ada();
    let dataset = Dataset {
        users: vec![user.clone()],
        ..Dataset::default()
    };
    Seeder::new(db.pool.clone())
        .seed(&dataset)
        .await
        .expect("Seeding failed");

    let stored: String = sqlx::query_scalar("SELECT password FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&db.pool)
        .await
        .expect("Seeded user not found");

    assert_ne!(stored, "secret");
    assert!(!stored.contains("secret"));
    assert!(verify_password("secret", &stored).unwrap());

    cleanup(db).await;
}

#[tokio::test]
async fn test_failure_in_invoices_rolls_back_every_table() {
    let Some(db) = get_test_db().await else {
        return;
    };

    // An existing invoices table with an extra required column makes every
    // invoice insert violate NOT NULL.
    sqlx::query(
        r#"
        CREATE TABLE invoices (
            id UUID PRIMARY KEY,
            customer_id UUID NOT NULL,
            amount INT NOT NULL,
            status VARCHAR(255) NOT NULL,
            date DATE NOT NULL,
            approved_by TEXT NOT NULL
        )
        "#,
    )
    .execute(&db.pool)
    .await
    .expect("Failed to create conflicting invoices table");

    let err = Seeder::new(db.pool.clone())
        .seed(&PlaceholderData.dataset())
        .await
        .expect_err("Seeding should fail on invoices");
    assert!(matches!(err, SeedError::Database(_)));

    assert!(!table_exists(&db.pool, "users").await);
    assert!(!table_exists(&db.pool, "customers").await);
    assert!(!table_exists(&db.pool, "revenue").await);
    assert_eq!(count(&db.pool, "invoices").await, 0);

    cleanup(db).await;
}

#[tokio::test]
async fn test_duplicate_month_keeps_first_row() {
    let Some(db) = get_test_db().await else {
        return;
    };

    let dataset = Dataset {
        revenue: vec![revenue("Jan", 2000), revenue("Jan", 9999), revenue("Feb", 1800)],
        ..Dataset::default()
    };

    for batch_size in [50, 1] {
        sqlx::query("DROP TABLE IF EXISTS revenue")
            .execute(&db.pool)
            .await
            .expect("Failed to reset revenue");

        let summary = Seeder::new(db.pool.clone())
            .with_batch_size(batch_size)
            .seed(&dataset)
            .await
            .expect("Seeding failed");

        let jan: Vec<i32> = sqlx::query_scalar("SELECT revenue FROM revenue WHERE month = 'Jan'")
            .fetch_all(&db.pool)
            .await
            .expect("Failed to read revenue");
        assert_eq!(jan, vec![2000]);
        assert_eq!(summary.revenue.attempted, 3);
        assert_eq!(summary.revenue.inserted, 2);
    }

    cleanup(db).await;
}

#[tokio::test]
async fn test_oversized_batch_is_split() {
    let Some(db) = get_test_db().await else {
        return;
    };

    // 40000 rows x 2 columns would exceed the per-statement parameter limit.
    let dataset = Dataset {
        revenue: (0..40_000).map(|i| revenue(&format!("{i:04x}"), i)).collect(),
        ..Dataset::default()
    };

    let mut conn = db.pool.acquire().await.expect("Failed to acquire connection");
    let summary = db::seed(&mut conn, &dataset, &SeedConfig { batch_size: 40_000 })
        .await
        .expect("Seeding failed");
    drop(conn);

    assert_eq!(summary.revenue.inserted, 40_000);
    assert_eq!(count(&db.pool, "revenue").await, 40_000);

    cleanup(db).await;
}

#[tokio::test]
async fn test_existing_rows_are_left_untouched() {
    let Some(db) = get_test_db().await else {
        return;
    };

    sqlx::query("CREATE TABLE revenue (month VARCHAR(4) NOT NULL UNIQUE, revenue INT NOT NULL)")
        .execute(&db.pool)
        .await
        .expect("Failed to create revenue");
    sqlx::query("INSERT INTO revenue (month, revenue) VALUES ('Jan', 1)")
        .execute(&db.pool)
        .await
        .expect("Failed to insert revenue");

    let summary = Seeder::new(db.pool.clone())
        .seed(&PlaceholderData.dataset())
        .await
        .expect("Seeding failed");

    let jan: i32 = sqlx::query_scalar("SELECT revenue FROM revenue WHERE month = 'Jan'")
        .fetch_one(&db.pool)
        .await
        .expect("Failed to read revenue");
    assert_eq!(jan, 1);
    assert_eq!(summary.revenue.skipped(), 1);
    assert_eq!(count(&db.pool, "revenue").await, 12);

    cleanup(db).await;
}

#[tokio::test]
async fn test_seed_on_caller_connection() {
    let Some(db) = get_test_db().await else {
        return;
    };

    let mut conn = db.pool.acquire().await.expect("Failed to acquire connection");
    let dataset = Dataset {
        users: vec![User { id: None, ..ada() }],
        revenue: vec![revenue("Mar", 2200)],
        ..Dataset::default()
    };

    let summary = db::seed(&mut conn, &dataset, &SeedConfig::default())
        .await
        .expect("Seeding failed");
    drop(conn);

    assert_eq!(summary.users.inserted, 1);
    assert_eq!(summary.customers, TableSummary::default());

    let stored_id: Uuid = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind("ada@example.com")
        .fetch_one(&db.pool)
        .await
        .expect("Seeded user not found");
    assert_eq!(stored_id, dataset.users[0].resolved_id());
    // Empty collections still get their tables.
    assert!(table_exists(&db.pool, "invoices").await);

    cleanup(db).await;
}
