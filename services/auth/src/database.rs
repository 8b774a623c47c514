//! Schema for the credential store

use sqlx::migrate::Migrator;

/// Migrations for the `users` table, embedded at compile time
pub static MIGRATOR: Migrator = sqlx::migrate!();
