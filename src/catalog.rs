//! Ordered product catalog.
//!
//! Products are addressed by their 1-based display index and are never
//! removed once added.

use thiserror::Error;

use crate::Amount;
use crate::model::{Product, ProductListing};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no product at index {0}")]
    InvalidIndex(usize),
    #[error("invalid quantity {0}, must be positive")]
    InvalidQuantity(u32),
    #[error("invalid price {0}, must be positive")]
    InvalidPrice(Amount),
    #[error("product '{0}' is out of stock")]
    OutOfStock(String),
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Add `quantity` of a product. A product whose name matches an existing
    /// one (case-insensitively) only has its stock increased; its price is
    /// left as it was.
    ///
    /// Returns the index and resulting stock of the product.
    pub fn add(
        &mut self,
        name: &str,
        price: Amount,
        quantity: u32,
    ) -> Result<(usize, u32), CatalogError> {
        if let Some(position) = self.position_of(name) {
            let product = &mut self.products[position];
            product.stock = product
                .stock
                .checked_add(quantity)
                .ok_or(CatalogError::InvalidQuantity(quantity))?;
            return Ok((position + 1, product.stock));
        }

        if !price.is_positive() {
            return Err(CatalogError::InvalidPrice(price));
        }
        self.products.push(Product::new(name, price, quantity));
        Ok((self.products.len(), quantity))
    }

    /// Product at a 1-based index.
    pub fn get(&self, index: usize) -> Result<&Product, CatalogError> {
        index
            .checked_sub(1)
            .and_then(|i| self.products.get(i))
            .ok_or(CatalogError::InvalidIndex(index))
    }

    pub fn find(&self, name: &str) -> Option<&Product> {
        self.position_of(name).map(|i| &self.products[i])
    }

    pub fn list(&self) -> Vec<ProductListing> {
        self.products
            .iter()
            .enumerate()
            .map(|(i, p)| ProductListing {
                index: i + 1,
                name: p.name.clone(),
                price: p.price,
                stock: p.stock,
            })
            .collect()
    }

    /// Increase the stock of the product at `index`. A quantity that would
    /// overflow the stock counter is rejected like a zero one.
    pub fn restock(&mut self, index: usize, quantity: u32) -> Result<&Product, CatalogError> {
        let product = self.get_mut(index)?;
        product.stock = product
            .stock
            .checked_add(quantity)
            .filter(|_| quantity > 0)
            .ok_or(CatalogError::InvalidQuantity(quantity))?;
        Ok(product)
    }

    /// Take one unit of the product at `index` out of stock.
    pub fn take_one(&mut self, index: usize) -> Result<&Product, CatalogError> {
        let product = self.get_mut(index)?;
        if product.stock == 0 {
            return Err(CatalogError::OutOfStock(product.name.clone()));
        }
        product.stock -= 1;
        Ok(product)
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut Product, CatalogError> {
        index
            .checked_sub(1)
            .and_then(|i| self.products.get_mut(i))
            .ok_or(CatalogError::InvalidIndex(index))
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        let name = name.to_lowercase();
        self.products
            .iter()
            .position(|p| p.name.to_lowercase() == name)
    }
}
