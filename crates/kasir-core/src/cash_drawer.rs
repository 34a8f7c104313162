//! # Cash Drawer Balance
//!
//! The till balance is never stored. It is folded from the full ledger on
//! every request:
//!
//! ```text
//! balance = Σ amount(masuk) + Σ amount(saldo_awal) − Σ amount(keluar)
//! ```

use crate::money::Money;
use crate::types::CashDrawerType;

impl CashDrawerType {
    /// Signed contribution of an entry of this type.
    pub fn signed(self, amount: Money) -> Money {
        match self {
            CashDrawerType::In | CashDrawerType::OpeningBalance => amount,
            CashDrawerType::Out => -amount,
        }
    }
}

/// Folds `(type, amount)` pairs into a balance. Empty input is zero.
pub fn drawer_balance<I>(entries: I) -> Money
where
    I: IntoIterator<Item = (CashDrawerType, Money)>,
{
    entries
        .into_iter()
        .map(|(entry_type, amount)| entry_type.signed(amount))
        .sum()
}
