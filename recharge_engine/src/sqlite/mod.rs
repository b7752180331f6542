//! SQLite database module for the recharge engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
