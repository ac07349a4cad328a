//! Vending transaction engine.
//!
//! The engine owns the product catalog, the coin reserve and the money state
//! of the active purchase. Every operation either completes or fails without
//! touching any state. It is driven either through the direct methods or
//! through [`Engine::apply`] / [`Engine::run`] with [`Command`]s.
//!
//! The engine is meant to be owned by a single task: the feasibility check
//! for change and the removal of change coins are only correct if nothing
//! else mutates the reserve in between.

use std::collections::BTreeMap;

use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::Amount;
use crate::catalog::Catalog;
use crate::config::{ConfigError, MachineConfig};
use crate::model::{
    Change, Command, Denomination, Outcome, Product, ProductListing, Purchase, Refund,
    ReserveReport,
};
use crate::reserve::CoinReserve;

mod state;
pub use state::TransactionState;

mod error;
pub use error::{AdminError, EngineError, PaymentError, PurchaseError};

/// The vending machine engine.
pub struct Engine {
    catalog: Catalog,
    reserve: CoinReserve,
    /// Float the reserve is reset to when profit is collected.
    initial_reserve: CoinReserve,
    state: TransactionState,
    admin_password: String,
    /// Set by a successful [`Command::Authenticate`], cleared by [`Command::Logout`].
    admin_session: bool,
}

/// Public API
impl Engine {
    /// Build a machine with an empty catalog.
    pub fn new(
        admin_password: impl Into<String>,
        coins: impl IntoIterator<Item = (Denomination, u32)>,
    ) -> Self {
        let reserve = CoinReserve::new(coins);
        Self {
            catalog: Catalog::new(),
            state: TransactionState::new(reserve.total()),
            initial_reserve: reserve.clone(),
            reserve,
            admin_password: admin_password.into(),
            admin_session: false,
        }
    }

    /// Build a machine from a validated configuration, products included.
    pub fn from_config(config: &MachineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut engine = Self::new(
            config.admin_password.clone(),
            config.coins.iter().copied(),
        );
        for product in &config.products {
            engine
                .catalog
                .add(&product.name, product.price, product.quantity)
                .map_err(|_| ConfigError::InvalidPrice {
                    name: product.name.clone(),
                    price: product.price,
                })?;
        }
        Ok(engine)
    }

    /// Run the engine over a stream of commands until it ends.
    pub async fn run(&mut self, mut stream: impl Stream<Item = Command> + Unpin) {
        while let Some(command) = stream.next().await {
            // failures are reported by `apply` and never stop the machine
            let _ = self.apply(command);
        }
    }

    /// Apply a single command on top of the current state.
    ///
    /// Administrative commands require an open administrator session.
    pub fn apply(&mut self, command: Command) -> Result<Outcome, EngineError> {
        let name = command.name();
        let result = self.dispatch(command);
        Self::log_result(name, &result);
        result
    }

    pub fn inserted_amount(&self) -> Amount {
        self.state.inserted_amount()
    }

    pub fn total_balance(&self) -> Amount {
        self.state.total_balance()
    }

    pub fn profit(&self) -> Amount {
        self.state.profit()
    }

    pub fn reserve(&self) -> &CoinReserve {
        &self.reserve
    }

    pub fn initial_reserve(&self) -> &CoinReserve {
        &self.initial_reserve
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_admin_session(&self) -> bool {
        self.admin_session
    }

    /// Add a product, or add stock to the product with the same name.
    /// Returns the product's display index and stock.
    pub fn add_product(
        &mut self,
        name: &str,
        price: Amount,
        quantity: u32,
    ) -> Result<(usize, u32), EngineError> {
        Ok(self.catalog.add(name, price, quantity)?)
    }

    pub fn list_products(&self) -> Vec<ProductListing> {
        self.catalog.list()
    }

    /// Insert one coin toward the active purchase. Returns the amount
    /// inserted so far.
    pub fn insert_coin(&mut self, coin: Denomination) -> Result<Amount, EngineError> {
        if !self.reserve.accept(coin) {
            return Err(PaymentError::InvalidDenomination(coin).into());
        }
        self.state.record_coin(coin);
        Ok(self.state.inserted_amount())
    }

    /// Whether `amount` could be paid out of the current reserve.
    pub fn can_assemble_change(&self, amount: Amount) -> bool {
        self.reserve.can_assemble_change(amount)
    }

    /// Sell the product at the 1-based `index` with the money inserted so far
    /// and pay out the change.
    ///
    /// The sale is refused with [`PurchaseError::NoChangeAvailable`] when the
    /// reserve cannot assemble the change; the inserted money then stays
    /// credited to the customer.
    pub fn select_product(&mut self, index: usize) -> Result<Purchase, EngineError> {
        let product = self
            .catalog
            .get(index)
            .map_err(|_| PurchaseError::InvalidIndex(index))?;

        if product.stock == 0 {
            return Err(PurchaseError::OutOfStock(product.name.clone()).into());
        }

        let price = product.price;
        let inserted = self.state.inserted_amount();
        if inserted < price {
            return Err(PurchaseError::InsufficientFunds { price, inserted }.into());
        }

        let change_amount = inserted - price;
        if !self.reserve.can_assemble_change(change_amount) {
            warn!(
                product = %product.name,
                change = %change_amount,
                "reserve cannot assemble change"
            );
            return Err(PurchaseError::NoChangeAvailable(change_amount).into());
        }

        // Nothing below can fail: stock and change were both checked above.
        let change = self.reserve.assemble_and_remove(change_amount)?;
        let product = self.catalog.take_one(index)?.name.clone();
        self.state.settle_purchase(price);
        self.state.coins_removed(change_amount);

        if !change.is_empty() {
            info!(
                product = %product,
                change = %change_amount,
                coins = %format_coins(&change),
                "change dispensed"
            );
        }

        Ok(Purchase {
            product,
            price,
            change_amount,
            change,
        })
    }

    /// Give back the exact coins inserted since the last purchase.
    pub fn cancel_transaction(&mut self) -> Result<Refund, EngineError> {
        if self.state.is_idle() {
            return Err(PaymentError::NothingToCancel.into());
        }

        let coins = group_coins(self.state.inserted_coins());
        let mut reserve = self.reserve.clone();
        for &(coin, count) in &coins {
            reserve.take(coin, count)?;
        }

        self.reserve = reserve;
        let amount = self.state.clear_inserted();
        self.state.coins_removed(amount);

        info!(amount = %amount, coins = %format_coins(&coins), "coins refunded");

        Ok(Refund { amount, coins })
    }

    pub fn list_coin_reserve(&self) -> ReserveReport {
        ReserveReport {
            coins: self.reserve.coins().collect(),
            total_balance: self.state.total_balance(),
        }
    }

    /// Hand the accumulated profit to the operator and restore the float.
    ///
    /// The reserve goes back to the initial snapshot; coins of a purchase in
    /// progress are kept on top of it so they can still be refunded.
    pub fn collect_profit(&mut self) -> Result<Amount, EngineError> {
        if self.state.profit().is_zero() {
            return Err(AdminError::NothingToCollect.into());
        }

        let mut reserve = self.initial_reserve.clone();
        for &coin in self.state.inserted_coins() {
            reserve.accept(coin);
        }
        self.reserve = reserve;
        self.state.reset_balance(self.reserve.total());

        let collected = self.state.take_profit();
        info!(collected = %collected, balance = %self.state.total_balance(), "float restored");
        Ok(collected)
    }

    pub fn restock_product(
        &mut self,
        index: usize,
        quantity: u32,
    ) -> Result<&Product, EngineError> {
        Ok(self.catalog.restock(index, quantity)?)
    }

    /// Plain comparison with the configured credential.
    pub fn authenticate(&self, password: &str) -> bool {
        password == self.admin_password
    }
}

/// Private API
impl Engine {
    fn dispatch(&mut self, command: Command) -> Result<Outcome, EngineError> {
        if command.requires_admin() && !self.admin_session {
            return Err(AdminError::NotAuthenticated.into());
        }

        match command {
            Command::AddProduct {
                name,
                price,
                quantity,
            } => {
                let (_, stock) = self.add_product(&name, price, quantity)?;
                Ok(Outcome::ProductAdded { name, stock })
            }
            Command::ListProducts => Ok(Outcome::Products(self.list_products())),
            Command::InsertCoin(coin) => {
                let inserted = self.insert_coin(coin)?;
                Ok(Outcome::CoinAccepted { inserted })
            }
            Command::SelectProduct(index) => Ok(Outcome::Dispensed(self.select_product(index)?)),
            Command::Cancel => Ok(Outcome::Refunded(self.cancel_transaction()?)),
            Command::Authenticate(password) => {
                if !self.authenticate(&password) {
                    return Err(AdminError::AuthenticationFailed.into());
                }
                self.admin_session = true;
                Ok(Outcome::Authenticated)
            }
            Command::Logout => {
                self.admin_session = false;
                Ok(Outcome::LoggedOut)
            }
            Command::ListCoins => Ok(Outcome::Coins(self.list_coin_reserve())),
            Command::Restock { index, quantity } => {
                let product = self.restock_product(index, quantity)?;
                Ok(Outcome::Restocked {
                    name: product.name.clone(),
                    stock: product.stock,
                })
            }
            Command::Collect => Ok(Outcome::Collected(self.collect_profit()?)),
        }
    }

    /// Small helper to log `apply` results
    fn log_result(command: &str, result: &Result<Outcome, EngineError>) {
        match result {
            Ok(outcome) => {
                info!(outcome = ?outcome, "{command} applied");
            }
            Err(e) => {
                info!(reason = %e, "{command} skipped");
            }
        }
    }
}

/// Collapse a list of coins into `(denomination, count)`, largest first.
fn group_coins(coins: &[Denomination]) -> Change {
    let mut grouped = BTreeMap::new();
    for &coin in coins {
        *grouped.entry(coin).or_insert(0u32) += 1;
    }
    grouped.into_iter().rev().collect()
}

fn format_coins(coins: &[(Denomination, u32)]) -> String {
    coins
        .iter()
        .map(|(coin, count)| format!("{count}x{coin}"))
        .collect::<Vec<_>>()
        .join(" ")
}
