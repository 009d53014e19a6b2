//! Plain-text balance and history reports.

use std::fmt::Write;

use rust_decimal::Decimal;
use tally_core::ledger::{LedgerService, PartyBalance, PartyKind};
use tally_shared::types::{Currency, Money};

/// Renders one row per party with paid, owed and net balance.
#[must_use]
pub fn balance_table(ledger: &LedgerService) -> String {
    let group = ledger.group();
    let currency = group.currency;
    let mut out = format!("{} ({currency})\n", group.name);
    let _ = writeln!(out, "{:<16} {:>12} {:>12} {:>12}", "Party", "Paid", "Owed", "Balance");

    for (party, balance) in ledger.parties().iter().zip(ledger.balances()) {
        if party.kind == PartyKind::Sink {
            continue;
        }
        let _ = writeln!(
            out,
            "{:<16} {:>12} {:>12} {:>12}",
            party.name,
            amount(balance.paid_total, currency),
            amount(balance.owed_total, currency),
            signed(&balance),
        );
    }
    out
}

/// Renders each member's transactions, newest first, with their share.
#[must_use]
pub fn history(ledger: &LedgerService) -> String {
    let currency = ledger.group().currency;
    let mut out = String::new();

    for party in ledger.parties().iter().filter(|p| p.is_member()) {
        let _ = writeln!(out, "\n{}", party.name);
        let Ok(transactions) = ledger.history_of(party.id) else {
            continue;
        };
        for tx in transactions {
            let share = tx
                .share_of(party.id)
                .map_or(Money::zero(currency), |s| s.amount);
            let _ = writeln!(
                out,
                "  {} {:<24} {:>12} {:>12}  {}",
                tx.paid_at.format("%Y-%m-%d"),
                tx.description,
                amount(tx.amount().amount, currency),
                amount(share.amount, currency),
                tx.mode().label(),
            );
        }
    }
    out
}

fn amount(value: Decimal, currency: Currency) -> String {
    let places = currency.decimal_places() as usize;
    format!("{value:.places$}")
}

fn signed(balance: &PartyBalance) -> String {
    let formatted = amount(balance.balance, balance.currency);
    if balance.balance > Decimal::ZERO {
        format!("+{formatted}")
    } else {
        formatted
    }
}
