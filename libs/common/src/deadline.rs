//! Bounded-duration scope for downstream calls
//!
//! Every call a service makes to the credential store, the object store or
//! an external API runs under a fixed budget. When the budget runs out the
//! future is dropped and the caller sees [`DeadlineExceeded`]; nothing is
//! retried.

use std::{future::Future, time::Duration};

use thiserror::Error;

/// The downstream call did not finish within its budget
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation timed out after {0:?}")]
pub struct DeadlineExceeded(pub Duration);

/// Run `fut` to completion or give up after `budget`
pub async fn within<F, T>(budget: Duration, fut: F) -> Result<T, DeadlineExceeded>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(budget, fut)
        .await
        .map_err(|_| DeadlineExceeded(budget))
}
