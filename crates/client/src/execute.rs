//! Execution engine: drives a frozen transaction across the node pool.
//!
//! The retry decision is a pure function over the precheck status
//! ([`StatusClass`]); the async driver owns the suspension points: signer
//! invocation, the transport call, and inter-attempt backoff. States:
//!
//! ```text
//! New ──► Executing ──► Finished
//!             │  ▲
//!             ▼  │ (budget remains)
//!       RetryableError ──► FatalError (budget exhausted)
//! ```
//!
//! Per attempt: freeze implicitly, apply the auto-signing identity, select a
//! node, lazily serialize the (row, node) cell, transmit, classify. Success
//! advances the identifier cursor so a later `execute` on a multi-chunk
//! transaction targets the next chunk.

use crate::client::Client;
use crate::config::ExecuteConfig;
use crate::error::ClientError;
use crate::node_health::Selection;
use crate::transaction::Transaction;
use meridian_proto::{decode_response, encode_for_transmission, Status};
use meridian_types::{AccountId, Hash, TransactionId};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Handle returned on success: where the transaction went and how to find it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResponse {
    /// Node that accepted the submission.
    pub node_account_id: AccountId,
    /// Identifier of the accepted row.
    pub transaction_id: TransactionId,
    /// Content hash of the transmitted bytes.
    pub transaction_hash: Hash,
}

/// Retry classification of a precheck status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusClass {
    /// Accepted; the attempt loop finishes.
    Success,
    /// Node-local trouble; retry the same identifier on the next node.
    Retryable,
    /// The validity window passed; regenerate identifiers when permitted.
    Expired,
    /// Anything else; surfaced to the caller unchanged.
    Fatal,
}

impl StatusClass {
    pub(crate) fn of(status: Status) -> Self {
        match status {
            Status::Ok => StatusClass::Success,
            Status::Busy
            | Status::Unknown
            | Status::PlatformTransactionNotCreated
            | Status::PlatformNotActive => StatusClass::Retryable,
            Status::TransactionExpired => StatusClass::Expired,
            _ => StatusClass::Fatal,
        }
    }
}

/// One attempt's bookkeeping. Scoped to a single `execute` call, never
/// persisted.
#[derive(Debug)]
struct ExecutionAttempt {
    attempt: usize,
    node_index: usize,
    row: usize,
    column: usize,
}

impl Transaction {
    /// Execute with the client's configured budget.
    pub async fn execute(&mut self, client: &Client) -> Result<TransactionResponse, ClientError> {
        let config = client.execute_config().clone();
        self.execute_with_config(client, &config).await
    }

    /// Execute with a caller-supplied total timeout, checked between
    /// attempts.
    pub async fn execute_with_timeout(
        &mut self,
        client: &Client,
        timeout: Duration,
    ) -> Result<TransactionResponse, ClientError> {
        let mut config = client.execute_config().clone();
        config.total_timeout = Some(timeout);
        self.execute_with_config(client, &config).await
    }

    #[instrument(skip_all, fields(kind = %self.operation_kind()))]
    async fn execute_with_config(
        &mut self,
        client: &Client,
        config: &ExecuteConfig,
    ) -> Result<TransactionResponse, ClientError> {
        let started = Instant::now();
        let deadline = config.total_timeout.map(|t| started + t);
        let max_attempts = config.max_attempts.max(1);

        if !self.is_frozen() {
            self.freeze_with(Some(client)).await?;
        }

        // Auto-signing identity: the operator signs when it pays.
        if let Some(operator) = client.operator() {
            if self.payer_account_id() == Some(operator.account_id) {
                self.sign_with(operator.signer.clone()).await?;
            }
        }

        let allow_regeneration = self.effective_regeneration(client);
        let row = self.current_row();
        let kind = self.operation_kind();
        let eligible: Vec<AccountId> = self.node_account_ids().to_vec();

        let mut last_error: Option<ClientError> = None;
        let mut backoff = config.min_backoff;

        for attempt in 1..=max_attempts {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(ClientError::TimedOut {
                        elapsed: started.elapsed(),
                        last: last_error.map(Box::new),
                    });
                }
            }

            // Node selection; when every candidate is backing off, wait for
            // the earliest readmission (still bounded by the deadline).
            let (node_index, endpoint) = loop {
                match client.pool().select_among(&eligible) {
                    Selection::Node { index, endpoint } => break (index, endpoint),
                    Selection::AllExcluded { retry_in } => {
                        if let Some(deadline) = deadline {
                            if Instant::now() + retry_in >= deadline {
                                return Err(ClientError::TimedOut {
                                    elapsed: started.elapsed(),
                                    last: last_error.map(Box::new),
                                });
                            }
                        }
                        debug!(?retry_in, "All candidate nodes excluded; waiting for readmission");
                        tokio::time::sleep(retry_in).await;
                    }
                    Selection::NoneEligible => return Err(ClientError::NoEligibleNodes),
                }
            };
            let column = eligible
                .iter()
                .position(|account| *account == endpoint.account_id)
                .unwrap_or(0);

            let transaction_id = self.transaction_ids()[row];
            let cell = self.signed_cell(row, column).await?;
            let request = encode_for_transmission(&cell)?;
            let transaction_hash = Hash::from_bytes(&request);

            let progress = ExecutionAttempt {
                attempt,
                node_index,
                row,
                column,
            };
            debug!(?progress, node = %endpoint, %transaction_id, "Submitting transaction");

            let outcome = client
                .channel()
                .invoke(
                    &endpoint.address,
                    kind.service_name(),
                    kind.method_name(),
                    request,
                )
                .await;

            match outcome {
                Err(err) if err.is_retryable() => {
                    client.pool().record_failure(node_index);
                    warn!(node = %endpoint, error = %err, "Retryable transport failure");
                    last_error = Some(ClientError::Transport(err));
                }
                Err(err) => return Err(ClientError::Transport(err)),
                Ok(bytes) => {
                    let response = decode_response(&bytes)?;
                    match StatusClass::of(response.status) {
                        StatusClass::Success => {
                            client.pool().record_success(node_index);
                            self.advance_row();
                            info!(node = %endpoint, %transaction_id, "Transaction accepted");
                            return Ok(TransactionResponse {
                                node_account_id: endpoint.account_id,
                                transaction_id,
                                transaction_hash,
                            });
                        }
                        StatusClass::Retryable => {
                            client.pool().record_failure(node_index);
                            warn!(
                                node = %endpoint,
                                status = %response.status,
                                "Retryable precheck status; rotating node"
                            );
                            last_error = Some(ClientError::Precheck {
                                status: response.status,
                                node: endpoint.account_id,
                                transaction_id,
                            });
                        }
                        StatusClass::Expired => {
                            let error = ClientError::Precheck {
                                status: response.status,
                                node: endpoint.account_id,
                                transaction_id,
                            };
                            if !allow_regeneration {
                                return Err(error);
                            }
                            debug!(%transaction_id, "Identifier expired; regenerating pending rows");
                            self.regenerate_pending_ids()?;
                            last_error = Some(error);
                        }
                        StatusClass::Fatal => {
                            return Err(ClientError::Precheck {
                                status: response.status,
                                node: endpoint.account_id,
                                transaction_id,
                            });
                        }
                    }
                }
            }

            if attempt < max_attempts {
                debug!(attempt, ?backoff, "Backing off before next attempt");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(config.max_backoff);
            }
        }

        match last_error {
            Some(last) => Err(ClientError::RetryBudgetExhausted {
                attempts: max_attempts,
                last: Box::new(last),
            }),
            None => unreachable!("every attempt records an error before exhausting the budget"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(StatusClass::of(Status::Ok), StatusClass::Success);
        assert_eq!(StatusClass::of(Status::Busy), StatusClass::Retryable);
        assert_eq!(StatusClass::of(Status::Unknown), StatusClass::Retryable);
        assert_eq!(
            StatusClass::of(Status::PlatformTransactionNotCreated),
            StatusClass::Retryable
        );
        assert_eq!(
            StatusClass::of(Status::PlatformNotActive),
            StatusClass::Retryable
        );
        assert_eq!(
            StatusClass::of(Status::TransactionExpired),
            StatusClass::Expired
        );
        assert_eq!(
            StatusClass::of(Status::InvalidSignature),
            StatusClass::Fatal
        );
        assert_eq!(
            StatusClass::of(Status::DuplicateTransaction),
            StatusClass::Fatal
        );
    }
}
