//! Per-kind sweep contract consumed by the orchestrator

use async_trait::async_trait;

use crate::batch::AggregateError;

/// A sweepable AWS resource kind.
///
/// Implementations hold their own service client and filter rule; there is no
/// shared mutable state between kinds. The orchestrator drives every kind
/// through this trait uniformly: list, chunk to [`max_batch_size`], nuke.
///
/// [`max_batch_size`]: Resource::max_batch_size
#[async_trait]
pub trait Resource: Send + Sync {
    /// Stable kind tag used in reporting and CLI selection.
    fn resource_name(&self) -> &'static str;

    /// List identifiers of all sweep candidates in the region, with the
    /// inclusion rules already applied. A pure read; safe to re-invoke.
    /// Transport or auth failures abort the listing for this kind.
    async fn resource_identifiers(&self) -> anyhow::Result<Vec<String>>;

    /// Largest number of identifiers safely deleted in one batch without
    /// provider throttling. A conservative per-kind constant.
    fn max_batch_size(&self) -> usize;

    /// Delete a batch of identifiers, recording one outcome per identifier.
    ///
    /// Callers must chunk `identifiers` to at most [`max_batch_size`] first.
    /// An empty batch succeeds immediately with no provider calls. Individual
    /// failures never abort the rest of the batch; they are collected into
    /// the returned [`AggregateError`].
    ///
    /// [`max_batch_size`]: Resource::max_batch_size
    async fn nuke(&self, identifiers: &[String]) -> Result<(), AggregateError>;
}
