//! Catalog

use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;

use crate::products::{ProductKey, ProductLine};

/// Errors related to catalog construction.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A product's currency differs from the catalog currency (index, product currency, catalog currency).
    #[error("Product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),
}

/// An ordered set of product lines priced in a single currency.
///
/// Iteration follows insertion order, which every planning algorithm uses to
/// break ties.
#[derive(Debug)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, ProductLine<'a>>,
    order: Vec<ProductKey>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    pub fn new(currency: &'static Currency) -> Self {
        Catalog {
            products: SlotMap::with_key(),
            order: Vec::new(),
            currency,
        }
    }

    /// Create a catalog with the given product lines.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if a product is priced in another currency.
    pub fn with_products(
        products: impl IntoIterator<Item = ProductLine<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::new(currency);

        for product in products {
            catalog.insert(product)?;
        }

        Ok(catalog)
    }

    /// Add a product line, returning its key.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the product is priced in another currency.
    pub fn insert(&mut self, product: ProductLine<'a>) -> Result<ProductKey, CatalogError> {
        let product_currency = product.unit_cost().currency();

        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                self.order.len(),
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let key = self.products.insert(product);
        self.order.push(key);

        Ok(key)
    }

    /// Lookup a product line by key.
    pub fn get(&self, key: ProductKey) -> Option<&ProductLine<'a>> {
        self.products.get(key)
    }

    /// Iterate product lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &ProductLine<'a>)> {
        self.order
            .iter()
            .filter_map(|key| self.products.get(*key).map(|product| (*key, product)))
    }

    /// Product keys in insertion order.
    pub fn keys(&self) -> &[ProductKey] {
        &self.order
    }

    /// Get the number of product lines.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Get the currency of the catalog.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Amount in the catalog currency from minor units.
    pub fn money(&self, minor_units: i64) -> Money<'static, Currency> {
        Money::from_minor(minor_units, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{history::MonthlyHistory, lots::LotSize};

    use super::*;

    fn line(reference: &str, minor: i64, currency: &'static Currency) -> ProductLine<'static> {
        ProductLine::new(
            reference,
            MonthlyHistory::default(),
            Money::from_minor(minor, currency),
            LotSize::ONE,
        )
    }

    #[test]
    fn new_with_currency() {
        let catalog = Catalog::new(iso::GBP);

        assert_eq!(catalog.currency(), iso::GBP);
        assert!(catalog.is_empty());
    }

    #[test]
    fn with_products_currency_mismatch_errors() {
        let products = [line("A", 100, iso::GBP), line("B", 100, iso::USD)];

        let result = Catalog::with_products(products, iso::GBP);

        match result {
            Err(CatalogError::CurrencyMismatch(idx, product_currency, catalog_currency)) => {
                assert_eq!(idx, 1);
                assert_eq!(product_currency, iso::USD.iso_alpha_code);
                assert_eq!(catalog_currency, iso::GBP.iso_alpha_code);
            }
            other => panic!("expected CurrencyMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn iter_follows_insertion_order() -> TestResult {
        let catalog = Catalog::with_products(
            [
                line("C", 300, iso::GBP),
                line("A", 100, iso::GBP),
                line("B", 200, iso::GBP),
            ],
            iso::GBP,
        )?;

        let refs: Vec<&str> = catalog
            .iter()
            .map(|(_, product)| product.product_ref.as_str())
            .collect();

        assert_eq!(refs, vec!["C", "A", "B"]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.keys().len(), 3);

        Ok(())
    }
}
