//! The machine's coin reserve and greedy change-making.
//!
//! Change is assembled greedily: for each denomination from largest to
//! smallest, take as many coins as fit into the remaining amount and are
//! available. This is optimal only for canonical denomination sets and may
//! report change as unavailable even though another combination of coins
//! would have worked (e.g. 6 from `{4: 1, 3: 2}`). That failure mode is part
//! of the machine's observable behaviour and is kept as is.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::Amount;
use crate::model::{Change, Denomination};

/// Errors raised by direct reserve mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReserveError {
    #[error("denomination {0} is not accepted by this machine")]
    UnknownDenomination(Denomination),
    #[error("not enough {denomination} coins: have {available}, need {requested}")]
    InsufficientCoins {
        denomination: Denomination,
        available: u32,
        requested: u32,
    },
    #[error("change of {0} cannot be assembled from the reserve")]
    ChangeUnavailable(Amount),
}

/// Multiset of coins held by the machine, keyed by denomination.
///
/// The set of denominations is fixed at construction; counts may drop to
/// zero but the denomination stays known.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoinReserve {
    coins: BTreeMap<Denomination, u32>,
}

impl CoinReserve {
    /// Build a reserve from `(denomination, count)` pairs. Repeated
    /// denominations are merged.
    pub fn new(coins: impl IntoIterator<Item = (Denomination, u32)>) -> Self {
        let mut map = BTreeMap::new();
        for (denomination, count) in coins {
            *map.entry(denomination).or_insert(0) += count;
        }
        Self { coins: map }
    }

    pub fn count(&self, denomination: Denomination) -> u32 {
        self.coins.get(&denomination).copied().unwrap_or(0)
    }

    /// Accepted denominations, largest first.
    pub fn denominations(&self) -> impl Iterator<Item = Denomination> + '_ {
        self.coins.keys().rev().copied()
    }

    /// `(denomination, count)` pairs, largest denomination first.
    pub fn coins(&self) -> impl Iterator<Item = (Denomination, u32)> + '_ {
        self.coins.iter().rev().map(|(d, c)| (*d, *c))
    }

    /// Sum of the value of every coin held.
    pub fn total(&self) -> Amount {
        self.coins.iter().map(|(d, c)| *d * *c).sum()
    }

    /// Put one coin into the reserve. Returns `false`, leaving the reserve
    /// untouched, if the denomination is not one of the machine's.
    pub fn accept(&mut self, denomination: Denomination) -> bool {
        match self.coins.get_mut(&denomination) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }

    /// Remove `count` coins of one denomination.
    pub fn take(&mut self, denomination: Denomination, count: u32) -> Result<(), ReserveError> {
        let available = self
            .coins
            .get_mut(&denomination)
            .ok_or(ReserveError::UnknownDenomination(denomination))?;
        if *available < count {
            return Err(ReserveError::InsufficientCoins {
                denomination,
                available: *available,
                requested: count,
            });
        }
        *available -= count;
        Ok(())
    }

    /// Whether `amount` can be paid out greedily. Runs on a private copy;
    /// the reserve itself is never touched.
    pub fn can_assemble_change(&self, amount: Amount) -> bool {
        if amount.is_zero() {
            return true;
        }
        if !amount.is_positive() {
            return false;
        }
        let mut scratch = self.coins.clone();
        let (_, remaining) = drain_greedy(&mut scratch, amount);
        remaining.is_zero()
    }

    /// Remove the coins paying out `amount` and return them, largest first.
    ///
    /// Fails without removing anything when the amount cannot be assembled.
    pub fn assemble_and_remove(&mut self, amount: Amount) -> Result<Change, ReserveError> {
        if amount.is_zero() {
            return Ok(Change::new());
        }
        if !self.can_assemble_change(amount) {
            return Err(ReserveError::ChangeUnavailable(amount));
        }
        let (change, remaining) = drain_greedy(&mut self.coins, amount);
        debug_assert!(remaining.is_zero());
        Ok(change)
    }
}

/// Greedy denomination-descending exhaustion over `coins`.
///
/// Decrements `coins` for every coin taken and returns the coins taken
/// together with the amount that could not be covered.
fn drain_greedy(coins: &mut BTreeMap<Denomination, u32>, amount: Amount) -> (Change, Amount) {
    let mut remaining = amount;
    let mut change = Change::new();

    for (&denomination, count) in coins.iter_mut().rev() {
        let mut given = 0;
        while remaining >= denomination && *count > 0 {
            remaining -= denomination;
            *count -= 1;
            given += 1;
        }
        if given > 0 {
            change.push((denomination, given));
        }
        if remaining.is_zero() {
            break;
        }
    }

    (change, remaining)
}
