//! # vera-web
//!
//! Web answering for Vera: turns a free-text question into a short,
//! source-cited answer grounded in live web pages.
//!
//! ## Design
//!
//! - Scrapes Brave, falling back to DuckDuckGo Lite, for candidate links
//! - Filters hosts by allow/block lists, failing open
//! - Fetches pages concurrently under a per-page timeout, stopping early
//!   once enough sources are in
//! - Ranks sources by keyword overlap and packs the best into a bounded
//!   context
//! - Asks a chat-completion model for a grounded answer
//! - Caches final answers per query with TTL and LRU eviction
//!
//! ## Security
//!
//! - No API keys or secrets for search
//! - No network listeners; this is a library
//! - Queries are logged only at trace level
//!
//! ## Example
//!
//! ```no_run
//! # use vera_web::{ChatMessage, ChatModel, GenerationOptions, PipelineConfig, WebAnswerer, WebError};
//! # struct Model;
//! # #[async_trait::async_trait]
//! # impl ChatModel for Model {
//! #     async fn complete(&self, _: &[ChatMessage], _: &GenerationOptions) -> Result<String, WebError> {
//! #         Ok(String::new())
//! #     }
//! # }
//! # async fn example() -> vera_web::Result<()> {
//! let config = PipelineConfig::default();
//! let answerer = WebAnswerer::with_defaults(&config)?;
//! let mut sources = Vec::new();
//! let text = answerer
//!     .answer_from_web("who wrote Dune", &config, "You are Vera.", &Model, &mut sources)
//!     .await;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod content;
pub mod context;
pub mod discovery;
pub mod engine;
pub mod engines;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod http;
pub mod pipeline;
pub mod ranking;
pub mod synth;
pub mod types;

pub use cache::{CachedAnswer, QueryCache};
pub use config::PipelineConfig;
pub use context::AssembledContext;
pub use discovery::LinkDiscovery;
pub use engine::SearchBackend;
pub use error::{Result, WebError};
pub use fetch::{fetch_many, HttpPageFetcher, PageFetcher, PageLimits};
pub use pipeline::{AnswerOutcome, WebAnswer, WebAnswerer};
pub use synth::{ChatMessage, ChatModel, GenerationOptions, Synthesis};
pub use types::{Candidate, FetchOutcome, ScoredSource, SearchEngine};
