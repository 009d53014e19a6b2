//! Ledger service for a single group.
//!
//! Owns the group's parties, categories and transactions, and checks every
//! transaction against them before it is recorded:
//! 1. The amount is in the group currency
//! 2. The payer is a known member (expense destinations never pay)
//! 3. An explicit payee is a known party
//! 4. Every sharer is a known member
//! 5. The category, if given, belongs to the group
//!
//! Split-level validation and allocation are delegated to [`Transaction`].

use tally_shared::types::{CategoryId, Money, PartyId, TransactionId};

use super::balance::{self, PartyBalance};
use super::error::LedgerError;
use super::group::{Category, Group, GroupSetup};
use super::party::Party;
use super::transaction::{NewTransaction, Transaction};
use crate::split::{ShareAllocator, Split};

/// In-memory ledger of one group.
#[derive(Debug, Clone)]
pub struct LedgerService {
    group: Group,
    parties: Vec<Party>,
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
    allocator: ShareAllocator,
}

impl LedgerService {
    /// Creates a ledger for a freshly created group.
    #[must_use]
    pub fn new(setup: GroupSetup, allocator: ShareAllocator) -> Self {
        Self {
            group: setup.group,
            parties: setup.members,
            categories: vec![setup.default_category],
            transactions: Vec::new(),
            allocator,
        }
    }

    /// The group.
    #[must_use]
    pub const fn group(&self) -> &Group {
        &self.group
    }

    /// All parties, members first in creation order.
    #[must_use]
    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    /// All categories, starting with the default one.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// All transactions in recording order.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Adds a member to the group.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if another party already uses the name.
    pub fn add_member(&mut self, name: impl Into<String>) -> Result<&Party, LedgerError> {
        let party = Party::member(self.group.id, name);
        self.push_party(party)
    }

    /// Adds an expense destination to the group.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if another party already uses the name.
    pub fn add_sink(&mut self, name: impl Into<String>) -> Result<&Party, LedgerError> {
        let party = Party::sink(self.group.id, name);
        self.push_party(party)
    }

    /// Adds a category and turns categories on for the group.
    pub fn add_category(&mut self, name: impl Into<String>) -> &Category {
        let category = self.group.new_category(name);
        self.group.use_categories = true;
        let index = self.categories.len();
        self.categories.push(category);
        &self.categories[index]
    }

    /// Looks up a party.
    ///
    /// # Errors
    ///
    /// Returns `UnknownParty` if the party is not in the group.
    pub fn party(&self, id: PartyId) -> Result<&Party, LedgerError> {
        self.parties
            .iter()
            .find(|p| p.id == id)
            .ok_or(LedgerError::UnknownParty(id))
    }

    /// Looks up a party by its exact name.
    #[must_use]
    pub fn party_by_name(&self, name: &str) -> Option<&Party> {
        self.parties.iter().find(|p| p.name == name)
    }

    /// Looks up a category by its exact name.
    #[must_use]
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Looks up a transaction.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTransaction` if no such transaction was recorded.
    pub fn transaction(&self, id: TransactionId) -> Result<&Transaction, LedgerError> {
        self.transactions
            .iter()
            .find(|tx| tx.id == id)
            .ok_or(LedgerError::UnknownTransaction(id))
    }

    /// Validates, allocates and stores a transaction.
    ///
    /// Transactions without a category land in the group's default category.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if any party, category or currency does not fit
    /// the group, or if the split is invalid.
    pub fn record(&mut self, mut input: NewTransaction) -> Result<&Transaction, LedgerError> {
        self.check_currency(input.amount)?;
        self.check_payer(input.paid_by)?;
        if let Some(payee) = input.paid_to {
            self.party(payee)?;
        }
        self.check_sharers(&input.split)?;
        input.category = Some(self.resolve_category(input.category)?);

        let tx = Transaction::record(self.group.id, input, &self.allocator)?;
        let index = self.transactions.len();
        self.transactions.push(tx);
        Ok(&self.transactions[index])
    }

    /// Replaces a transaction's amount and split.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the transaction is unknown or the new split
    /// does not fit the group. The transaction is unchanged on error.
    pub fn revise(
        &mut self,
        id: TransactionId,
        amount: Money,
        split: Split,
    ) -> Result<&Transaction, LedgerError> {
        self.check_currency(amount)?;
        self.check_sharers(&split)?;

        let allocator = self.allocator;
        let tx = self
            .transactions
            .iter_mut()
            .find(|tx| tx.id == id)
            .ok_or(LedgerError::UnknownTransaction(id))?;
        tx.replace_split(amount, split, &allocator)?;
        Ok(tx)
    }

    /// Deletes a transaction together with its shares.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTransaction` if no such transaction was recorded.
    pub fn remove(&mut self, id: TransactionId) -> Result<Transaction, LedgerError> {
        let index = self
            .transactions
            .iter()
            .position(|tx| tx.id == id)
            .ok_or(LedgerError::UnknownTransaction(id))?;
        Ok(self.transactions.remove(index))
    }

    /// Balances of every party, in party order.
    #[must_use]
    pub fn balances(&self) -> Vec<PartyBalance> {
        balance::group_balances(&self.parties, self.group.currency, &self.transactions)
    }

    /// Balance of one party.
    ///
    /// # Errors
    ///
    /// Returns `UnknownParty` if the party is not in the group.
    pub fn balance_of(&self, party: PartyId) -> Result<PartyBalance, LedgerError> {
        self.party(party)?;
        Ok(balance::balance(party, self.group.currency, &self.transactions))
    }

    /// Transactions involving a party, newest first.
    ///
    /// # Errors
    ///
    /// Returns `UnknownParty` if the party is not in the group.
    pub fn history_of(&self, party: PartyId) -> Result<Vec<&Transaction>, LedgerError> {
        self.party(party)?;
        Ok(balance::transactions_involving(party, &self.transactions))
    }

    /// Total spent in a category.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCategory` if the category is not in the group.
    pub fn category_total(&self, category: CategoryId) -> Result<Money, LedgerError> {
        let category = self.resolve_category(Some(category))?;
        Ok(balance::category_total(category, self.group.currency, &self.transactions))
    }

    /// Names identify parties in ledger files, so they must stay unique.
    fn push_party(&mut self, party: Party) -> Result<&Party, LedgerError> {
        if self.party_by_name(&party.name).is_some() {
            return Err(LedgerError::DuplicateName(party.name));
        }
        let index = self.parties.len();
        self.parties.push(party);
        Ok(&self.parties[index])
    }

    fn check_currency(&self, amount: Money) -> Result<(), LedgerError> {
        if amount.currency == self.group.currency {
            Ok(())
        } else {
            Err(LedgerError::CurrencyMismatch {
                expected: self.group.currency,
                actual: amount.currency,
            })
        }
    }

    fn check_payer(&self, payer: PartyId) -> Result<(), LedgerError> {
        if self.party(payer)?.is_member() {
            Ok(())
        } else {
            Err(LedgerError::SinkCannotPay(payer))
        }
    }

    fn check_sharers(&self, split: &Split) -> Result<(), LedgerError> {
        for id in split.participants() {
            if !self.party(id)?.is_member() {
                return Err(LedgerError::SinkCannotShare(id));
            }
        }
        Ok(())
    }

    fn resolve_category(&self, category: Option<CategoryId>) -> Result<CategoryId, LedgerError> {
        match category {
            None => Ok(self.group.default_category),
            Some(id) if self.categories.iter().any(|c| c.id == id) => Ok(id),
            Some(id) => Err(LedgerError::UnknownCategory(id)),
        }
    }
}
