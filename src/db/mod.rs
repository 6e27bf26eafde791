//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database initialization, migrations, and exclusion seeding
//! - SQLite pragma configuration
//! - Repository layer for exclusions and saved draws

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
