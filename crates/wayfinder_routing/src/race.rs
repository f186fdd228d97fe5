use std::{future::Future, time::Duration};

use futures::{StreamExt, stream::FuturesUnordered};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::RoutingError;

/// Runs a provider call against a wall-clock deadline and an optional
/// cancellation token. Whichever finishes first wins and the call is dropped
/// if it lost.
pub async fn with_deadline<T, F>(
    timeout: Duration,
    cancellation: Option<&CancellationToken>,
    future: F,
) -> Result<T, RoutingError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    let cancelled = async {
        match cancellation {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        biased;

        _ = cancelled => Err(RoutingError::Cancelled),
        result = tokio::time::timeout(timeout, future) => match result {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(RoutingError::Acquisition(error)),
            Err(_) => Err(RoutingError::Timeout(timeout)),
        },
    }
}

/// Starts every future at once and returns the first success. The remaining
/// futures are dropped. When all of them fail, or none succeeds before the
/// deadline, the individual failures are reported together.
pub async fn first_success<T, F, I>(futures: I, timeout: Duration) -> Result<T, RoutingError>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = anyhow::Result<T>>,
{
    let mut pending: FuturesUnordered<F> = futures.into_iter().collect();
    let mut errors = Vec::new();

    let race = async {
        while let Some(result) = pending.next().await {
            match result {
                Ok(value) => return Some(value),
                Err(error) => {
                    warn!("Racing request failed: {:#}", error);
                    errors.push(RoutingError::Acquisition(error));
                }
            }
        }

        None
    };

    let outcome = tokio::time::timeout(timeout, race).await;

    match outcome {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(RoutingError::AllFailed(errors)),
        Err(_) => {
            errors.push(RoutingError::Timeout(timeout));
            Err(RoutingError::AllFailed(errors))
        }
    }
}
