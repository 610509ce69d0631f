//! Corner-kick ("Olympic goal") simulation and search.
//!
//! The member crates do the work; this facade ties a scenario file to the
//! flight model and the search engine and renders results for the binaries.

pub mod plot;
pub mod scenario;

pub use olympic_config as config;
pub use olympic_core::{constants, units, vector};
pub use olympic_export as export;
pub use olympic_flight as flight;
pub use olympic_search as search;
