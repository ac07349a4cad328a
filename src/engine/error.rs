//! Error types for vending operations.

use thiserror::Error;

use crate::Amount;
use crate::catalog::CatalogError;
use crate::model::Denomination;
use crate::reserve::ReserveError;

/// Top-level error returned by [`Engine::apply`](super::Engine::apply).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("payment failed: {0}")]
    Payment(#[from] PaymentError),

    #[error("purchase failed: {0}")]
    Purchase(#[from] PurchaseError),

    #[error("{0}")]
    Admin(#[from] AdminError),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("coin reserve: {0}")]
    Reserve(#[from] ReserveError),
}

/// Error while inserting coins or cancelling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("invalid denomination {0}")]
    InvalidDenomination(Denomination),
    #[error("nothing to cancel")]
    NothingToCancel,
}

/// Error while selecting a product.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("no product at index {0}")]
    InvalidIndex(usize),
    #[error("product '{0}' is out of stock")]
    OutOfStock(String),
    #[error("insufficient funds: price {price}, inserted {inserted}")]
    InsufficientFunds { price: Amount, inserted: Amount },
    #[error("no change available for {0}")]
    NoChangeAvailable(Amount),
}

/// Error of an administrative operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminError {
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("administrator session required")]
    NotAuthenticated,
    #[error("nothing to collect")]
    NothingToCollect,
}
