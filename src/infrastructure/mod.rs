//! Implementations of the [`crate::domain::repositories`] contracts.

pub mod cache;
pub mod persistence;
