//! Transaction assembly, submission and confirmation.
//!
//! A failed confirmation is not an `Err`: the transaction was sent and its
//! effects (if any) are final, so the submitter reports what the ledger logs
//! say went wrong and leaves the decision to the caller.

use std::sync::Arc;

use solana_sdk::{instruction::Instruction, signature::Signature, transaction::Transaction};

use crate::{connection::LedgerConnection, errors::StoreError, signer::TransactionSigner};

/// Substring the system program logs when an address is taken.
pub const ACCOUNT_IN_USE_LOG: &str = "already in use";
pub const ACCOUNT_IN_USE_MESSAGE: &str = "Account already in use!";

const ERROR_MARKER: &str = "Error: ";

/// Outcome of waiting for a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    /// Confirmation was not requested.
    NotAwaited,
    Failed(TransactionFailure),
}

impl Confirmation {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Confirmation::Confirmed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Confirmation::Failed(_))
    }
}

/// Causes extracted from the execution log of a failed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFailure {
    pub messages: Vec<String>,
}

impl TransactionFailure {
    pub fn is_account_collision(&self) -> bool {
        self.messages.iter().any(|m| m == ACCOUNT_IN_USE_MESSAGE)
    }
}

/// A transaction that made it to the network.
#[derive(Debug, Clone)]
pub struct Submission {
    pub signature: Signature,
    pub confirmation: Confirmation,
}

/// Pull human-readable causes out of execution log entries.
///
/// An entry mentioning an address already in use yields
/// [`ACCOUNT_IN_USE_MESSAGE`]. Entries may span several lines; every line
/// containing `Error: <message>` yields `<message>`, which runs to the end of
/// that line.
pub fn extract_log_errors<S: AsRef<str>>(logs: &[S]) -> Vec<String> {
    let mut errors = Vec::new();
    for entry in logs {
        let entry = entry.as_ref();
        if entry.contains(ACCOUNT_IN_USE_LOG) {
            errors.push(ACCOUNT_IN_USE_MESSAGE.to_string());
        }

        for line in entry.lines() {
            if let Some(pos) = line.find(ERROR_MARKER) {
                let message = &line[pos + ERROR_MARKER.len()..];
                if !message.is_empty() {
                    errors.push(message.to_string());
                }
            }
        }
    }
    errors
}

/// Builds, signs, sends and optionally confirms transactions.
#[derive(Clone)]
pub struct TransactionSubmitter {
    connection: Arc<dyn LedgerConnection>,
    await_confirmation: bool,
}

impl TransactionSubmitter {
    pub fn new(connection: Arc<dyn LedgerConnection>, await_confirmation: bool) -> Self {
        Self {
            connection,
            await_confirmation,
        }
    }

    /// Submit `instructions` as one atomic transaction paid for by `signer`.
    pub async fn submit(
        &self,
        instructions: &[Instruction],
        signer: &dyn TransactionSigner,
    ) -> Result<Submission, StoreError> {
        let payer = signer.public_key().ok_or(StoreError::MissingSignerKey)?;

        let mut transaction = Transaction::new_with_payer(instructions, Some(&payer));
        transaction.message.recent_blockhash = self.connection.latest_checkpoint().await?;

        let transaction = signer.sign(transaction).await?;
        let signature = match self.connection.send_signed_transaction(&transaction).await {
            Ok(signature) => signature,
            Err(StoreError::TransactionRejected { reason, logs }) => {
                let signature = transaction.signatures.first().copied().unwrap_or_default();
                return Ok(Submission {
                    signature,
                    confirmation: Confirmation::Failed(Self::rejection(&signature, reason, &logs)),
                });
            }
            Err(e) => return Err(e),
        };
        tracing::debug!(%signature, instructions = instructions.len(), "Transaction sent");

        if !self.await_confirmation {
            return Ok(Submission {
                signature,
                confirmation: Confirmation::NotAwaited,
            });
        }

        let confirmation = match self.connection.confirm(&signature).await {
            Ok(true) => Confirmation::Confirmed,
            Ok(false) => Confirmation::Failed(self.failure_for(&signature).await),
            Err(e) => {
                tracing::warn!(%signature, error = %e, "Confirmation did not complete");
                Confirmation::Failed(self.failure_for(&signature).await)
            }
        };

        if let Confirmation::Failed(failure) = &confirmation {
            tracing::warn!(
                %signature,
                errors = ?failure.messages,
                "Error executing transaction"
            );
        }

        Ok(Submission {
            signature,
            confirmation,
        })
    }

    /// Failure for a transaction the node refused before it ran.
    fn rejection(signature: &Signature, reason: String, logs: &[String]) -> TransactionFailure {
        let mut messages = extract_log_errors(logs);
        if messages.is_empty() {
            messages.push(reason);
        }
        tracing::warn!(%signature, errors = ?messages, "Transaction rejected before execution");
        TransactionFailure { messages }
    }

    async fn failure_for(&self, signature: &Signature) -> TransactionFailure {
        match self.connection.execution_log(signature).await {
            Ok(logs) => TransactionFailure {
                messages: extract_log_errors(&logs),
            },
            Err(e) => {
                tracing::warn!(%signature, error = %e, "Could not fetch execution log");
                TransactionFailure::default()
            }
        }
    }
}
