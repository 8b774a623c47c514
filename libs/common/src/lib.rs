//! Common library for the Astro Album backend
//!
//! This crate provides shared functionality used across the services:
//! environment-driven configuration helpers, PostgreSQL connectivity, the
//! uniform HTTP error envelope and the per-call deadline helper.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, init_pool, health_check};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     let is_healthy = health_check(&pool).await?;
//!     println!("Database health check: {}", is_healthy);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod deadline;
pub mod env;
pub mod error;

pub use error::{AppError, AppResult};
