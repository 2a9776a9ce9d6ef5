//! Request throttling and read retries for [`crate::RpcLedgerConnection`].

pub mod rate_limiter;
pub mod retry;

pub use rate_limiter::RpcRateLimiter;
pub use retry::RetryExecutor;
