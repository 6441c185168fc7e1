//! Content source collaborator
//!
//! Resolves a caller-supplied title or article URL into a cleaned
//! [`SourceDocument`](duet_core::SourceDocument)

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod clean;
mod error;
mod query;
pub mod wikipedia;

use async_trait::async_trait;
use duet_core::SourceDocument;

pub use error::{Result, SourceError};
pub use query::{DocumentQuery, InputKind};
pub use wikipedia::WikipediaSource;

/// Trait implemented by each content backend
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch and clean the article named by `query`
    async fn fetch(&self, query: &DocumentQuery) -> Result<SourceDocument>;

    /// Backend name used in logs and metadata
    fn name(&self) -> &str;
}
