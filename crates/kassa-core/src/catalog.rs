//! # Catalog
//!
//! The product list the combo and recommendation engines resolve ids against.
//! Order is preserved: it breaks ties between equally ranked suggestions.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Product;
use crate::validation::validate_product;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Builds a catalog, validating every product.
    pub fn with_products(products: Vec<Product>) -> CoreResult<Self> {
        let mut catalog = Catalog::new();
        for product in products {
            catalog.upsert(product)?;
        }
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Looks up a product by `id` or returns `ProductNotFound`.
    pub fn require(&self, id: &str) -> CoreResult<&Product> {
        self.get(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    pub fn find_by_barcode(&self, barcode: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.barcode.as_deref() == Some(barcode))
    }

    /// Position in catalog order, used for deterministic tie-breaking.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.products.iter().position(|p| p.id == id)
    }

    /// Inserts a product or replaces the one with the same id in place.
    pub fn upsert(&mut self, product: Product) -> CoreResult<()> {
        validate_product(&product)?;

        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => self.products.push(product),
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> CoreResult<Product> {
        let index = self
            .position(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
        Ok(self.products.remove(index))
    }

    /// Takes `quantity` units out of stock, never going below zero.
    pub fn take_stock(&mut self, id: &str, quantity: i64) -> CoreResult<()> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
        product.stock = (product.stock - quantity).max(0);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
