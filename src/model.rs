//! Core domain types for the vending engine.

use crate::Amount;

/// One coin value accepted and dispensed by the machine.
pub type Denomination = Amount;

/// Coins handed out by the machine, largest denomination first.
pub type Change = Vec<(Denomination, u32)>;

/// A product slot of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub name: String,
    pub price: Amount,
    pub stock: u32,
}

impl Product {
    pub fn new(name: impl Into<String>, price: Amount, stock: u32) -> Self {
        Self {
            name: name.into(),
            price,
            stock,
        }
    }
}

/// A catalog row as shown to the customer. `index` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListing {
    pub index: usize,
    pub name: String,
    pub price: Amount,
    pub stock: u32,
}

/// Snapshot of the coin reserve, largest denomination first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveReport {
    pub coins: Vec<(Denomination, u32)>,
    pub total_balance: Amount,
}

/// Result of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub product: String,
    pub price: Amount,
    pub change_amount: Amount,
    /// Empty when no change was owed.
    pub change: Change,
}

/// Result of a cancelled transaction: the exact coins the customer inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refund {
    pub amount: Amount,
    pub coins: Change,
}

/// The inputs of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a new product or top up the stock of an existing one (matched by name).
    AddProduct {
        name: String,
        price: Amount,
        quantity: u32,
    },
    ListProducts,
    InsertCoin(Denomination),
    /// Select a product by its 1-based display index.
    SelectProduct(usize),
    Cancel,
    /// Open an administrator session.
    Authenticate(String),
    /// Close the administrator session.
    Logout,
    ListCoins,
    Restock { index: usize, quantity: u32 },
    Collect,
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddProduct { .. } => "add product",
            Command::ListProducts => "list products",
            Command::InsertCoin(_) => "insert coin",
            Command::SelectProduct(_) => "select product",
            Command::Cancel => "cancel",
            Command::Authenticate(_) => "authenticate",
            Command::Logout => "logout",
            Command::ListCoins => "list coins",
            Command::Restock { .. } => "restock",
            Command::Collect => "collect",
        }
    }

    /// Commands reserved to an authenticated administrator.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Command::ListCoins | Command::Restock { .. } | Command::Collect
        )
    }
}

/// Successful result of [`Engine::apply`](crate::Engine::apply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    ProductAdded { name: String, stock: u32 },
    Products(Vec<ProductListing>),
    /// Coin accepted; carries the amount inserted so far.
    CoinAccepted { inserted: Amount },
    Dispensed(Purchase),
    Refunded(Refund),
    Authenticated,
    LoggedOut,
    Coins(ReserveReport),
    Restocked { name: String, stock: u32 },
    Collected(Amount),
}
