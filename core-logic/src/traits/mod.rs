use crate::config::Amount;
use crate::error::OperationError;
use crate::utils::wallet_manager::Account;
use async_trait::async_trait;

/// Counters collected by a run. No per-cycle history is kept.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles started.
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Operations handed to the client.
    pub submitted: u64,
    /// Operations with a successful receipt.
    pub confirmed: u64,
    /// Inter-cycle pauses taken.
    pub delays: u64,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn merge(&mut self, other: &RunSummary) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.submitted += other.submitted;
        self.confirmed += other.confirmed;
        self.delays += other.delays;
        self.cancelled |= other.cancelled;
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            (self.succeeded as f64 / self.attempted as f64) * 100.0
        }
    }
}

/// One entry of a cycle template.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<O> {
    /// Submit `operation` and wait for its confirmation.
    Submit { label: String, operation: O },
    /// Pause inside the cycle for a delay drawn from the run's delay range.
    Settle,
}

impl<O> Step<O> {
    pub fn submit(label: impl Into<String>, operation: O) -> Self {
        Step::Submit {
            label: label.into(),
            operation,
        }
    }
}

/// The external blockchain client: everything the runner needs from it.
///
/// Nonces, gas estimation, signing and transport stay behind this seam.
#[async_trait]
pub trait OperationClient: Send + Sync {
    type Signer: Send + Sync;
    type Operation: Send + Sync;
    type Pending: Send + Sync;

    async fn submit(
        &self,
        account: &Account<Self::Signer>,
        operation: &Self::Operation,
    ) -> Result<Self::Pending, OperationError>;

    /// Resolves once the network has included the operation.
    /// Returns the confirmed transaction hash.
    async fn confirm(&self, pending: &Self::Pending) -> Result<String, OperationError>;

    fn tx_hash(&self, pending: &Self::Pending) -> String;

    fn explorer_link(&self, pending: &Self::Pending) -> String {
        self.tx_hash(pending)
    }
}

/// A fixed sequence of operations repeated every cycle.
pub trait CycleTemplate<C: OperationClient>: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the cycle needs a randomized amount.
    fn requires_amount(&self) -> bool;

    fn build(
        &self,
        account: &Account<C::Signer>,
        amount: Option<Amount>,
    ) -> Result<Vec<Step<C::Operation>>, OperationError>;
}
