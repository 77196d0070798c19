//! Chart of accounts.
//!
//! Hierarchical, tenant-scoped account definitions:
//! - Account types and their implied normal balance
//! - Validation of new accounts against the existing chart
//! - The built-in cooperative chart used at tenant onboarding

pub mod chart;
pub mod error;
pub mod types;
pub mod validation;

pub use chart::{ChartTemplate, default_chart, instantiate_default_chart};
pub use error::CoaError;
pub use types::{Account, AccountType, NewAccount, NormalBalance};
pub use validation::validate_new_account;
