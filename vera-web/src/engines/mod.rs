//! Search backend implementations.
//!
//! Each module provides a struct implementing [`crate::engine::SearchBackend`]
//! that scrapes a specific engine's HTML results page for links.

pub mod brave;
pub mod duckduckgo;

pub use brave::BraveEngine;
pub use duckduckgo::DuckDuckGoLiteEngine;
