use indexmap::IndexMap;
use std::sync::RwLock;

use super::poisoned;
use crate::domain::{LendingTransaction, MemberId, TransactionId};
use crate::ports::transaction_repository::{Result, TransactionRepository};

/// TransactionRepositoryのインメモリ実装
#[derive(Debug, Default)]
pub struct InMemoryTransactionRepository {
    transactions: RwLock<IndexMap<TransactionId, LendingTransaction>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionRepository for InMemoryTransactionRepository {
    fn get(&self, transaction_id: TransactionId) -> Result<Option<LendingTransaction>> {
        let transactions = self.transactions.read().map_err(poisoned)?;
        Ok(transactions.get(&transaction_id).cloned())
    }

    fn save(&self, transaction: LendingTransaction) -> Result<()> {
        let mut transactions = self.transactions.write().map_err(poisoned)?;
        transactions.insert(transaction.id(), transaction);
        Ok(())
    }

    fn delete(&self, transaction_id: TransactionId) -> Result<bool> {
        let mut transactions = self.transactions.write().map_err(poisoned)?;
        Ok(transactions.shift_remove(&transaction_id).is_some())
    }

    fn find_by_member(&self, member_id: MemberId) -> Result<Vec<LendingTransaction>> {
        let transactions = self.transactions.read().map_err(poisoned)?;
        Ok(transactions
            .values()
            .filter(|t| t.member_id() == member_id)
            .cloned()
            .collect())
    }

    fn list_all(&self) -> Result<Vec<LendingTransaction>> {
        let transactions = self.transactions.read().map_err(poisoned)?;
        Ok(transactions.values().cloned().collect())
    }
}
