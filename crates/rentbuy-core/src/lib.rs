//! Month-by-month rent vs buy analysis.
//!
//! The engine projects both scenarios over a fixed horizon (amortized
//! mortgage, owner costs, tax shield, appreciation on the buy side; rent
//! growth and an invested surplus on the rent side) and reduces the two
//! tables to net worth, NPV, IRR and break-even metrics. All math is in
//! `rust_decimal::Decimal`.

pub mod error;
pub mod models;
pub mod time_value;
pub mod types;
pub mod validation;

pub mod analysis;
pub mod mortgage;
pub mod projection;
pub mod tax;

pub use error::RentBuyError;
pub use types::*;

/// Standard result type for all rent vs buy operations
pub type RentBuyResult<T> = Result<T, RentBuyError>;
