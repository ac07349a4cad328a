//! Machine configuration, supplied once when the engine is built.

use std::collections::HashSet;
use std::env;

use thiserror::Error;

use crate::Amount;
use crate::model::Denomination;

/// Environment variable overriding the administrator credential.
pub const ADMIN_PASSWORD_ENV: &str = "VENDING_ADMIN_PASSWORD";

const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one coin denomination is required")]
    NoDenominations,
    #[error("denomination {0} must be positive")]
    InvalidDenomination(Denomination),
    #[error("denomination {0} is configured twice")]
    DuplicateDenomination(Denomination),
    #[error("product '{name}' has invalid price {price}")]
    InvalidPrice { name: String, price: Amount },
}

/// A product loaded into the machine at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSpec {
    pub name: String,
    pub price: Amount,
    pub quantity: u32,
}

impl ProductSpec {
    pub fn new(name: impl Into<String>, price: Amount, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    pub admin_password: String,
    /// Accepted denominations and the initial count of each. This is also the
    /// float the reserve is reset to when profit is collected.
    pub coins: Vec<(Denomination, u32)>,
    pub products: Vec<ProductSpec>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            coins: vec![
                (Amount::from_major(1), 20),
                (Amount::from_major(5), 10),
                (Amount::from_major(10), 10),
                (Amount::from_major(50), 5),
                (Amount::from_major(100), 3),
            ],
            products: vec![
                ProductSpec::new("Cone with boiled condensed milk", Amount::from_major(85), 5),
                ProductSpec::new("Ham and cheese sandwich", Amount::from_major(145), 3),
                ProductSpec::new("Orange juice", Amount::from_major(90), 10),
                ProductSpec::new("Milka chocolate", Amount::from_major(75), 8),
            ],
        }
    }
}

impl MachineConfig {
    /// The default machine, with the administrator credential taken from
    /// [`ADMIN_PASSWORD_ENV`] when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(password) = env::var(ADMIN_PASSWORD_ENV) {
            config.admin_password = password;
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coins.is_empty() {
            return Err(ConfigError::NoDenominations);
        }

        let mut seen = HashSet::new();
        for &(denomination, _) in &self.coins {
            if !denomination.is_positive() {
                return Err(ConfigError::InvalidDenomination(denomination));
            }
            if !seen.insert(denomination) {
                return Err(ConfigError::DuplicateDenomination(denomination));
            }
        }

        if let Some(product) = self.products.iter().find(|p| !p.price.is_positive()) {
            return Err(ConfigError::InvalidPrice {
                name: product.name.clone(),
                price: product.price,
            });
        }

        Ok(())
    }
}
