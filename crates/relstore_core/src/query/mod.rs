//! Declarative query descriptors and their SQL translation.
//!
//! # Responsibility
//! - Define the condition model used by id-lookup reads.
//! - Keep placeholder naming and clause assembly in one place.

pub mod condition;
