use crate::domain::model::{DeliveryRecord, Msisdn, SendOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Outbound gateway collaborator: one call per recipient.
///
/// Infallible by type: every provider failure mode is folded into
/// [`SendOutcome::Failed`] at this boundary. No automatic retry; a failed
/// send is terminal for that recipient in that batch.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, to: &Msisdn, message: &str) -> SendOutcome;
}

/// Persistence collaborator for delivery records.
#[async_trait]
pub trait DeliveryStore: Send + Sync {
    /// Persists one record and returns its assigned id.
    async fn save(&self, record: DeliveryRecord) -> Result<String>;

    /// Records for one account, newest first.
    async fn find_by_account(&self, account_id: &str) -> Result<Vec<DeliveryRecord>>;
}

/// Per-account consumable credit balance.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Fresh balance read, used for the optimistic sufficiency check.
    async fn balance(&self, account_id: &str) -> Result<u64>;

    /// Decrements the balance, guarded by `credits >= amount` at commit time.
    ///
    /// Atomic relative to concurrent decrements on the same account. Fails
    /// with [`DispatchError::InsufficientAtCommit`] and applies nothing when
    /// the guard would be violated. `amount == 0` is a no-op that returns the
    /// current balance.
    ///
    /// [`DispatchError::InsufficientAtCommit`]: crate::utils::error::DispatchError::InsufficientAtCommit
    async fn try_decrement(&self, account_id: &str, amount: u64) -> Result<u64>;
}
