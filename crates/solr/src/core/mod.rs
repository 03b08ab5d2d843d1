//! Transport abstraction.
//!
//! The adapter never speaks HTTP itself. Everything that reaches the engine
//! goes through [`SolrApi`], which a transport crate (or a test double)
//! implements.

mod client;

pub use client::{SolrApi, SolrClientError};
