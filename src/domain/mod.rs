//! Domain types shared by the HTTP API and the analytics consumer.
//!
//! - [`alias`] - short alias generation
//! - [`events`] - events published about stored aliases
//! - [`repositories`] - storage contracts implemented in
//!   [`crate::infrastructure`]

pub mod alias;
pub mod events;
pub mod repositories;

pub use alias::{AliasGenerator, HashAliasGenerator};
pub use events::UrlEvent;
