//! Record types for the dashboard dataset.
//!
//! A [`Dataset`] bundles the four collections the [`Seeder`](crate::db::Seeder)
//! writes. Datasets come from a [`DatasetProvider`]; [`PlaceholderData`] is the
//! built-in demo dataset.

mod placeholder;

pub use placeholder::PlaceholderData;

use std::fmt;

use time::Date;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::db::SeedError;

/// Namespace for identifiers the seeder derives itself.
const SEED_NAMESPACE: Uuid = uuid::uuid!("6f1d3c2a-8b4e-4c55-9a0e-2d7f6b1c9e34");

/// A dashboard login. `password` is plaintext and is hashed before storage.
#[derive(Clone, Validate)]
pub struct User {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl User {
    /// Returns the supplied id, or one derived from the email address.
    pub fn resolved_id(&self) -> Uuid {
        self.id.unwrap_or_else(|| {
            Uuid::new_v5(&SEED_NAMESPACE, format!("user:{}", self.email).as_bytes())
        })
    }
}

// Keeps plaintext passwords out of logs.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Validate)]
pub struct Customer {
    pub id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(
        email(message = "Invalid email address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "Image URL must be between 1 and 255 characters"))]
    pub image_url: String,
}

/// Payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

#[derive(Debug, Clone, Validate)]
pub struct Invoice {
    pub id: Option<Uuid>,
    pub customer_id: Uuid,
    /// Amount in cents.
    #[validate(range(min = 0, message = "Amount must not be negative"))]
    pub amount: i32,
    pub status: InvoiceStatus,
    pub date: Date,
}

impl Invoice {
    /// Returns the supplied id, or one derived from the invoice's position and
    /// content so that re-seeding the same dataset hits the same primary key.
    pub fn resolved_id(&self, position: usize) -> Uuid {
        self.id.unwrap_or_else(|| {
            let key = format!(
                "invoice:{position}:{}:{}:{}:{}",
                self.customer_id,
                self.amount,
                self.status.as_str(),
                self.date
            );
            Uuid::new_v5(&SEED_NAMESPACE, key.as_bytes())
        })
    }
}

/// Revenue for one month, keyed by a short month code such as `"Jan"`.
#[derive(Debug, Clone, Validate)]
pub struct Revenue {
    #[validate(length(min = 1, max = 4, message = "Month must be between 1 and 4 characters"))]
    pub month: String,
    pub revenue: i32,
}

/// The four collections written by one seeding run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Vec<User>,
    pub customers: Vec<Customer>,
    pub invoices: Vec<Invoice>,
    pub revenue: Vec<Revenue>,
}

impl Dataset {
    /// Checks every record against the column constraints of its table.
    ///
    /// Duplicate identity values are allowed; they are skipped at insert time.
    pub fn validate(&self) -> Result<(), SeedError> {
        let mut problems = Vec::new();

        collect_problems("user", &self.users, &mut problems);
        collect_problems("customer", &self.customers, &mut problems);
        collect_problems("invoice", &self.invoices, &mut problems);
        collect_problems("revenue", &self.revenue, &mut problems);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(SeedError::InvalidDataset(problems.join(", ")))
        }
    }

    /// Total number of records across all four collections.
    pub fn len(&self) -> usize {
        self.users.len() + self.customers.len() + self.invoices.len() + self.revenue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of the fixed dataset a seeding run writes.
pub trait DatasetProvider {
    fn dataset(&self) -> Dataset;
}

fn collect_problems<T: Validate>(kind: &str, records: &[T], problems: &mut Vec<String>) {
    for (index, record) in records.iter().enumerate() {
        if let Err(errors) = record.validate() {
            problems.extend(
                describe(&errors)
                    .into_iter()
                    .map(|message| format!("{kind} #{index}: {message}")),
            );
        }
    }
}

fn describe(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| match &e.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: {}", e.code),
            })
        })
        .collect();
    messages.sort();
    messages
}
