//! Helpers for setting up throwaway databases in integration tests.
pub mod prepare_env;

pub use prepare_env::*;
