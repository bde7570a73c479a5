pub mod amortize;
pub mod analyze;
pub mod cash_flows;
pub mod compare;
pub mod sensitivity;
pub mod validate;
