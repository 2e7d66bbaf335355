//! Long-running operation polling.
//!
//! Re-issues a status check until the operation reports `done`, sleeping
//! with exponential backoff between checks. The number of checks is
//! bounded by [`PollConfig::max_attempts`]; exhausting it yields
//! [`RagError::Timeout`].

use clinicbot_types::config::PollConfig;
use clinicbot_types::error::RagError;
use clinicbot_types::rag::Operation;
use tracing::debug;

use super::gateway::RagGateway;

/// Poll `operation` until it completes.
///
/// An operation that finishes with a remote error is returned as
/// [`RagError::Remote`].
pub async fn wait_for_operation<G: RagGateway>(
    gateway: &G,
    operation: Operation,
    policy: &PollConfig,
) -> Result<Operation, RagError> {
    let mut current = operation;
    let mut attempts: u32 = 0;

    while !current.done {
        if attempts >= policy.max_attempts {
            return Err(RagError::Timeout { attempts });
        }
        let delay = policy.delay_for(attempts);
        debug!(operation = %current.name, attempt = attempts + 1, delay_ms = delay.as_millis() as u64, "Polling operation");
        tokio::time::sleep(delay).await;
        current = gateway.poll_operation(&current).await?;
        attempts += 1;
    }

    if let Some(message) = current.error.take() {
        return Err(RagError::Remote(message));
    }
    Ok(current)
}
