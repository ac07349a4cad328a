use std::mem;

use crate::Amount;
use crate::model::Denomination;

/// Money state of the machine: the coins inserted toward the active purchase,
/// the value of the coin reserve and the profit accumulated since the last
/// collection.
#[derive(Debug, Default, Clone)]
pub struct TransactionState {
    /// Coins inserted since the last purchase or cancellation, in order.
    inserted: Vec<Denomination>,
    inserted_amount: Amount,
    /// Always equal to the value of the coin reserve.
    total_balance: Amount,
    profit: Amount,
}

impl TransactionState {
    pub fn new(total_balance: Amount) -> Self {
        Self {
            total_balance,
            ..Self::default()
        }
    }

    pub fn inserted_amount(&self) -> Amount {
        self.inserted_amount
    }

    pub fn inserted_coins(&self) -> &[Denomination] {
        &self.inserted
    }

    pub fn total_balance(&self) -> Amount {
        self.total_balance
    }

    pub fn profit(&self) -> Amount {
        self.profit
    }

    /// No coins inserted toward a purchase.
    pub fn is_idle(&self) -> bool {
        self.inserted.is_empty()
    }

    /// A coin went into the reserve on behalf of the customer.
    pub fn record_coin(&mut self, coin: Denomination) {
        self.inserted.push(coin);
        self.inserted_amount += coin;
        self.total_balance += coin;
    }

    /// Close the active transaction as a sale of `price`. The inserted coins
    /// stay in the reserve.
    pub fn settle_purchase(&mut self, price: Amount) {
        self.profit += price;
        self.inserted.clear();
        self.inserted_amount = Amount::ZERO;
    }

    /// Close the active transaction without a sale. Returns the amount that
    /// was inserted.
    pub fn clear_inserted(&mut self) -> Amount {
        self.inserted.clear();
        mem::take(&mut self.inserted_amount)
    }

    /// Coins worth `value` left the reserve.
    pub fn coins_removed(&mut self, value: Amount) {
        self.total_balance -= value;
    }

    /// The reserve was replaced wholesale.
    pub fn reset_balance(&mut self, total_balance: Amount) {
        self.total_balance = total_balance;
    }

    pub fn take_profit(&mut self) -> Amount {
        mem::take(&mut self.profit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_idle() {
        let state = TransactionState::new(Amount::from_major(720));
        assert!(state.is_idle());
        assert_eq!(state.inserted_amount(), Amount::ZERO);
        assert_eq!(state.total_balance(), Amount::from_major(720));
        assert_eq!(state.profit(), Amount::ZERO);
    }

    #[test]
    fn record_coin_tracks_amount_balance_and_coins() {
        let mut state = TransactionState::new(Amount::ZERO);
        state.record_coin(Amount::from_major(50));
        state.record_coin(Amount::from_major(10));

        assert!(!state.is_idle());
        assert_eq!(state.inserted_amount(), Amount::from_major(60));
        assert_eq!(state.total_balance(), Amount::from_major(60));
        assert_eq!(
            state.inserted_coins(),
            &[Amount::from_major(50), Amount::from_major(10)]
        );
    }

    #[test]
    fn settle_purchase_moves_price_to_profit() {
        let mut state = TransactionState::new(Amount::ZERO);
        state.record_coin(Amount::from_major(100));
        state.settle_purchase(Amount::from_major(85));

        assert!(state.is_idle());
        assert_eq!(state.profit(), Amount::from_major(85));
        assert_eq!(state.total_balance(), Amount::from_major(100));
    }

    #[test]
    fn clear_inserted_resets_transaction() {
        let mut state = TransactionState::new(Amount::ZERO);
        state.record_coin(Amount::from_major(5));
        state.record_coin(Amount::from_major(1));

        assert_eq!(state.clear_inserted(), Amount::from_major(6));
        assert!(state.is_idle());
        assert!(state.inserted_coins().is_empty());
        assert_eq!(state.inserted_amount(), Amount::ZERO);
    }

    #[test]
    fn take_profit_resets_profit() {
        let mut state = TransactionState::new(Amount::ZERO);
        state.settle_purchase(Amount::from_major(230));
        assert_eq!(state.take_profit(), Amount::from_major(230));
        assert_eq!(state.profit(), Amount::ZERO);
    }
}
