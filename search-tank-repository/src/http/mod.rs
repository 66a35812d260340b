//! HTTP implementation of the index provider.
//!
//! This module provides a concrete implementation of `IndexProvider`
//! talking to the service's REST API with `reqwest`.

mod params;
mod provider;
mod wire;

pub use params::search_params;
pub use provider::HttpIndexProvider;
