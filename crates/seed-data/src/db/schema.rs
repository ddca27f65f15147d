//! Table definitions and insert statements for the seeded tables.

/// Postgres rejects statements with more bind parameters than this.
pub const MAX_BIND_PARAMS: usize = u16::MAX as usize;

/// The seeded tables, in the order they are created and filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Customers,
    Invoices,
    Revenue,
}

impl Table {
    /// Seeding order. Invoices follow customers because they reference them.
    pub const ALL: [Table; 4] = [Table::Users, Table::Customers, Table::Invoices, Table::Revenue];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Customers => "customers",
            Table::Invoices => "invoices",
            Table::Revenue => "revenue",
        }
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for the table.
    pub fn create_statement(&self) -> &'static str {
        match self {
            Table::Users => {
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
                    name VARCHAR(255) NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    password TEXT NOT NULL
                )
                "#
            }
            Table::Customers => {
                r#"
                CREATE TABLE IF NOT EXISTS customers (
                    id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
                    name VARCHAR(255) NOT NULL,
                    email VARCHAR(255) NOT NULL,
                    image_url VARCHAR(255) NOT NULL
                )
                "#
            }
            // customer_id is not a foreign key; invoices may be seeded for
            // customers that live elsewhere.
            Table::Invoices => {
                r#"
                CREATE TABLE IF NOT EXISTS invoices (
                    id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
                    customer_id UUID NOT NULL,
                    amount INT NOT NULL,
                    status VARCHAR(255) NOT NULL,
                    date DATE NOT NULL
                )
                "#
            }
            Table::Revenue => {
                r#"
                CREATE TABLE IF NOT EXISTS revenue (
                    month VARCHAR(4) NOT NULL UNIQUE,
                    revenue INT NOT NULL
                )
                "#
            }
        }
    }

    /// Insert prefix up to (not including) the VALUES list.
    pub fn insert_prefix(&self) -> &'static str {
        match self {
            Table::Users => "INSERT INTO users (id, name, email, password) ",
            Table::Customers => "INSERT INTO customers (id, name, email, image_url) ",
            Table::Invoices => "INSERT INTO invoices (id, customer_id, amount, status, date) ",
            Table::Revenue => "INSERT INTO revenue (month, revenue) ",
        }
    }

    /// Number of bound columns per row in [`Table::insert_prefix`].
    pub fn column_count(&self) -> usize {
        match self {
            Table::Users | Table::Customers => 4,
            Table::Invoices => 5,
            Table::Revenue => 2,
        }
    }

    /// Rows per INSERT, capped so one statement stays under [`MAX_BIND_PARAMS`].
    pub fn rows_per_statement(&self, batch_size: usize) -> usize {
        batch_size.clamp(1, MAX_BIND_PARAMS / self.column_count())
    }

    /// Column that identifies a row; conflicting inserts are skipped.
    pub fn identity_column(&self) -> &'static str {
        match self {
            Table::Users | Table::Customers | Table::Invoices => "id",
            Table::Revenue => "month",
        }
    }

    pub fn conflict_clause(&self) -> String {
        format!(" ON CONFLICT ({}) DO NOTHING", self.identity_column())
    }
}
