//! Ledger connection capability.
//!
//! The store only needs six calls from the network. `LedgerConnection`
//! names them; `RpcLedgerConnection` serves them from a Solana RPC node
//! with rate limiting. Reads are retried, sends are not.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcSendTransactionConfig, RpcTransactionConfig},
    rpc_request::{RpcError, RpcResponseErrorData},
};
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use solana_transaction_status::{option_serializer::OptionSerializer, UiTransactionEncoding};
use tokio::time::sleep;

use crate::{
    config::StoreConfig,
    errors::StoreError,
    rpc::{RetryExecutor, RpcRateLimiter},
};

/// Network operations consumed by the record store.
#[async_trait]
pub trait LedgerConnection: Send + Sync {
    /// Raw account data, or `None` if no account lives at `address`.
    async fn account_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, StoreError>;

    /// Rent-exempt minimum balance for an account of `width` bytes.
    async fn minimum_balance_for(&self, width: usize) -> Result<u64, StoreError>;

    /// Recent blockhash to anchor a new transaction.
    async fn latest_checkpoint(&self) -> Result<Hash, StoreError>;

    /// Submit once. A transaction the node refuses before execution comes
    /// back as [`StoreError::TransactionRejected`].
    async fn send_signed_transaction(&self, transaction: &Transaction) -> Result<Signature, StoreError>;

    /// Wait until `signature` lands. `Ok(false)` means it landed and failed.
    async fn confirm(&self, signature: &Signature) -> Result<bool, StoreError>;

    /// Log messages recorded while executing `signature`.
    async fn execution_log(&self, signature: &Signature) -> Result<Vec<String>, StoreError>;
}

/// `LedgerConnection` backed by a nonblocking Solana RPC client.
pub struct RpcLedgerConnection {
    rpc: Arc<RpcClient>,
    rate_limiter: Arc<RpcRateLimiter>,
    retry_executor: RetryExecutor,
    commitment: CommitmentConfig,
    skip_preflight: bool,
}

impl RpcLedgerConnection {
    pub fn new(config: &StoreConfig) -> Self {
        let rpc = Arc::new(RpcClient::new_with_commitment(
            config.rpc_url.clone(),
            config.commitment,
        ));
        Self::with_client(rpc, config)
    }

    /// Share an existing RPC client.
    pub fn with_client(rpc: Arc<RpcClient>, config: &StoreConfig) -> Self {
        Self {
            rpc,
            rate_limiter: Arc::new(RpcRateLimiter::new(config.rate_limit.clone())),
            retry_executor: RetryExecutor::new(config.retry.clone()),
            commitment: config.commitment,
            skip_preflight: config.skip_preflight,
        }
    }

    pub fn rpc(&self) -> &Arc<RpcClient> {
        &self.rpc
    }
}

#[async_trait]
impl LedgerConnection for RpcLedgerConnection {
    async fn account_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, StoreError> {
        self.rate_limiter.acquire().await?;

        let account = self
            .retry_executor
            .execute_with(|| async {
                self.rpc
                    .get_account_with_commitment(address, self.commitment)
                    .await
                    .map(|response| response.value)
            })
            .await?;

        Ok(account.map(|a| a.data))
    }

    async fn minimum_balance_for(&self, width: usize) -> Result<u64, StoreError> {
        self.rate_limiter.acquire().await?;

        self.retry_executor
            .execute_with(|| self.rpc.get_minimum_balance_for_rent_exemption(width))
            .await
    }

    async fn latest_checkpoint(&self) -> Result<Hash, StoreError> {
        self.rate_limiter.acquire().await?;

        self.retry_executor
            .execute_with(|| self.rpc.get_latest_blockhash())
            .await
    }

    async fn send_signed_transaction(&self, transaction: &Transaction) -> Result<Signature, StoreError> {
        self.rate_limiter.acquire().await?;

        self.rpc
            .send_transaction_with_config(
                transaction,
                RpcSendTransactionConfig {
                    skip_preflight: self.skip_preflight,
                    preflight_commitment: Some(self.commitment.commitment),
                    ..RpcSendTransactionConfig::default()
                },
            )
            .await
            .map_err(classify_send_error)
    }

    async fn confirm(&self, signature: &Signature) -> Result<bool, StoreError> {
        let timeout = self.retry_executor.confirmation_timeout();
        let poll_interval = self.retry_executor.confirmation_poll_interval();
        let started = Instant::now();

        loop {
            let status = {
                self.rate_limiter.acquire().await?;
                self.retry_executor
                    .execute_with(|| {
                        self.rpc
                            .get_signature_status_with_commitment(signature, self.commitment)
                    })
                    .await?
            };

            match status {
                Some(Ok(())) => return Ok(true),
                Some(Err(err)) => {
                    tracing::debug!(%signature, error = %err, "Transaction landed with an error");
                    return Ok(false);
                }
                None if started.elapsed() >= timeout => {
                    return Err(StoreError::ConfirmationTimeout {
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                None => sleep(poll_interval).await,
            }
        }
    }

    async fn execution_log(&self, signature: &Signature) -> Result<Vec<String>, StoreError> {
        self.rate_limiter.acquire().await?;

        let tx = self
            .retry_executor
            .execute_with(|| {
                self.rpc.get_transaction_with_config(
                    signature,
                    RpcTransactionConfig {
                        encoding: Some(UiTransactionEncoding::Json),
                        commitment: Some(self.commitment),
                        max_supported_transaction_version: Some(0),
                    },
                )
            })
            .await?;

        let logs = match tx.transaction.meta {
            Some(meta) => match meta.log_messages {
                OptionSerializer::Some(logs) => logs,
                _ => vec![],
            },
            None => vec![],
        };
        Ok(logs)
    }
}

/// Split send failures into refusals of this transaction and transport trouble.
fn classify_send_error(err: ClientError) -> StoreError {
    let rejection = match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            message,
            data: RpcResponseErrorData::SendTransactionPreflightFailure(simulation),
            ..
        }) => Some((message.clone(), simulation.logs.clone().unwrap_or_default())),
        ClientErrorKind::TransactionError(e) => Some((e.to_string(), Vec::new())),
        _ => None,
    };

    match rejection {
        Some((reason, logs)) => StoreError::TransactionRejected { reason, logs },
        None => StoreError::Rpc(err),
    }
}
