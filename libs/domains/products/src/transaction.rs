use std::future::Future;
use std::pin::Pin;

use sea_orm::{AccessMode, DatabaseTransaction, IsolationLevel, TransactionSession, TransactionTrait};
use strum::Display;
use tracing::{debug, error};

use crate::error::{ProductError, ProductResult};

/// Lifecycle of one coordinated transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TxState {
    Idle,
    Started,
    Committed,
    RolledBack,
}

/// Body of a coordinated transaction; borrows the open transaction
pub type TxBody<'c, T> = Pin<Box<dyn Future<Output = ProductResult<T>> + Send + 'c>>;

/// Runs a multi-statement sequence as a single atomic unit.
///
/// `Idle -> Started -> Committed | RolledBack`, one pass only. On a body error
/// the transaction is rolled back before the error is returned, and the error
/// is returned as the body produced it. The transaction handle is consumed by
/// commit or rollback on every path.
pub struct TransactionCoordinator<'a, C> {
    db: &'a C,
    state: TxState,
    isolation: Option<IsolationLevel>,
    access: Option<AccessMode>,
}

impl<'a, C> TransactionCoordinator<'a, C>
where
    C: TransactionTrait<Transaction = DatabaseTransaction>,
{
    /// Write transaction at the server's default isolation level
    pub fn new(db: &'a C) -> Self {
        Self {
            db,
            state: TxState::Idle,
            isolation: None,
            access: None,
        }
    }

    /// Read-only `REPEATABLE READ` transaction: every statement of the body
    /// sees the same committed snapshot, so a product and its images are
    /// never read from two different writes.
    pub fn read_snapshot(db: &'a C) -> Self {
        Self {
            isolation: Some(IsolationLevel::RepeatableRead),
            access: Some(AccessMode::ReadOnly),
            ..Self::new(db)
        }
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    fn advance(&mut self, next: TxState) {
        debug!(from = %self.state, to = %next, "Transaction state change");
        self.state = next;
    }

    pub async fn run<F, T>(&mut self, body: F) -> ProductResult<T>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxBody<'c, T> + Send,
        T: Send,
    {
        if self.state != TxState::Idle {
            return Err(ProductError::Internal(format!(
                "Transaction coordinator reused in state {}",
                self.state
            )));
        }

        let txn = self.db.begin_with_config(self.isolation, self.access).await?;
        self.advance(TxState::Started);

        match body(&txn).await {
            Ok(value) => {
                txn.commit().await?;
                self.advance(TxState::Committed);
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    error!(error = %rollback_err, "Rollback failed");
                }
                self.advance(TxState::RolledBack);
                Err(err)
            }
        }
    }
}
