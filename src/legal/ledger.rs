//! Case ledger aggregation.
//!
//! Amounts are exact decimals; nothing is rounded until [`format_amount`].

use rust_decimal::Decimal;
use serde::Serialize;

use crate::legal::case::{LedgerEntry, LedgerKind};

/// Per-kind sums and the resulting balance of a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub advance: Decimal,
    pub balance: Decimal,
}

pub fn totals(entries: &[LedgerEntry]) -> LedgerTotals {
    let mut out = LedgerTotals::default();
    for entry in entries {
        match entry.kind {
            LedgerKind::Income => out.income += entry.amount,
            LedgerKind::Expense => out.expense += entry.amount,
            LedgerKind::Advance => out.advance += entry.amount,
        }
    }
    out.balance = out.income - out.expense - out.advance;
    out
}

/// Income minus expenses and advances. Zero for an empty ledger.
pub fn balance(entries: &[LedgerEntry]) -> Decimal {
    totals(entries).balance
}

/// Two-decimal rendering for display.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}
