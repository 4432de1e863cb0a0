//! Resource store capability
//!
//! The single injected dependency every builder and the assembler work
//! against. Production code uses [`super::client::FhirClient`]; tests swap in
//! an in-memory double.

use crate::domain::{BundleEntry, ResourceKind, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Read/write access to the remote document store
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Look a resource up by natural key.
    ///
    /// Returns the first matching document and its resolved reference
    /// (`<Type>/<id>`), or `(None, "")` when the search has no entries.
    ///
    /// # Errors
    ///
    /// Returns an error on any response status other than 200 (after the
    /// single credential-refresh retry).
    async fn fetch_by_identifier(
        &self,
        kind: ResourceKind,
        identifier: &str,
    ) -> Result<(Option<Value>, String)>;

    /// Fetch a resource at a resolved reference.
    ///
    /// Any non-200 response yields `None` rather than an error.
    async fn fetch_by_reference(&self, reference: &str) -> Result<Option<Value>>;

    /// Submit entries as one atomic transaction bundle.
    ///
    /// # Errors
    ///
    /// Returns an error carrying status and body on any non-200 response
    /// (after the single credential-refresh retry). The store applies either
    /// the whole bundle or nothing.
    async fn submit_transaction(&self, entries: &[BundleEntry]) -> Result<()>;
}
