pub mod comparison;
pub mod engine;
pub mod metrics;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;
