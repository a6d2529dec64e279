//! Time-bounded execution of cache and delivery side effects.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::DeliveryWarning;

/// Run a side effect under `budget`. Failures and timeouts are logged
/// and returned as [`DeliveryWarning`]s; they never propagate as errors.
pub(crate) async fn bounded<T, E, Fut>(
    budget: Duration,
    operation: &'static str,
    fut: Fut,
) -> Result<T, DeliveryWarning>
where
    E: fmt::Display,
    Fut: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!(operation, error = %e, "side effect failed");
            Err(DeliveryWarning::SideEffect {
                operation,
                reason: e.to_string(),
            })
        }
        Err(_) => {
            warn!(operation, budget_ms = budget.as_millis() as u64, "side effect timed out");
            Err(DeliveryWarning::Timeout {
                operation,
                budget_ms: budget.as_millis() as u64,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn success_passes_through() {
        let out: Result<i32, DeliveryWarning> =
            bounded::<_, &str, _>(Duration::from_secs(1), "noop", async { Ok(7) }).await;
        assert_eq!(out.unwrap(), 7);
    }

    #[tokio::test]
    async fn failure_becomes_side_effect_warning() {
        let out: Result<i32, DeliveryWarning> =
            bounded(Duration::from_secs(1), "boom", async { Err("broken") }).await;
        assert_matches!(
            out,
            Err(DeliveryWarning::SideEffect { operation: "boom", .. })
        );
    }

    #[tokio::test]
    async fn overrun_becomes_timeout_warning() {
        let out: Result<i32, DeliveryWarning> =
            bounded::<_, &str, _>(Duration::from_millis(5), "slow", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(1)
            })
            .await;
        assert_matches!(
            out,
            Err(DeliveryWarning::Timeout { operation: "slow", .. })
        );
    }
}
