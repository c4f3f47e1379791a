//! Config storage module.
//!
//! This module owns the on-disk config record: its data model, the collaborator
//! traits used to populate it, and the store that loads and persists it.

pub mod provider;
pub mod record;
pub mod store;
