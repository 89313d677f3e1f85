#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! City documents, and a client for the Elasticsearch index that stores
//! them.

mod client;
mod domain;

pub use client::CityStore;
pub use domain::{CityEnvelope, CityRecord};
