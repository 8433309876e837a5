// ABOUTME: Validated domain types for unit and environment names.
// ABOUTME: Construction validates up front so the rest of the crate never re-checks.

mod env_name;
mod unit_name;

pub use env_name::{EnvName, EnvNameError};
pub use unit_name::{UnitName, UnitNameError};
