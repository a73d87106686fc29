//! Fixtures
//!
//! Loads catalogs and planning parameters from YAML files under
//! `<base>/catalogs/<name>.yml`.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError},
    plan::PlanParameters,
    products::{ProductKey, ProductLine},
};

pub mod catalogs;

use catalogs::{CatalogFixture, parse_currency};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between the catalog and a price
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Two products share a reference
    #[error("Duplicate product reference: {0}")]
    DuplicateProduct(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// No catalog loaded yet
    #[error("No catalog loaded")]
    NoCatalog,

    /// Catalog construction error
    #[error("Failed to create catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Product reference -> catalog key
    product_keys: FxHashMap<String, ProductKey>,

    catalog: Option<Catalog<'static>>,

    parameters: PlanParameters<'static>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            product_keys: FxHashMap::default(),
            catalog: None,
            parameters: PlanParameters::default(),
        }
    }

    /// Load a catalog and its parameters from a YAML fixture file, replacing
    /// anything loaded before.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a price or
    /// parameter is malformed, if prices mix currencies, or if two products
    /// share a reference.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalogs").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        let currency = parse_currency(&fixture.currency)?;
        let parameters = fixture.parameters.to_parameters(currency)?;

        let mut catalog = Catalog::new(currency);
        let mut product_keys = FxHashMap::default();

        for product_fixture in fixture.products {
            let reference = product_fixture.reference.clone();

            if product_keys.contains_key(&reference) {
                return Err(FixtureError::DuplicateProduct(reference));
            }

            let product: ProductLine<'static> = product_fixture.try_into()?;
            let product_currency = product.unit_cost().currency();

            if product_currency != currency {
                return Err(FixtureError::CurrencyMismatch(
                    currency.iso_alpha_code.to_string(),
                    product_currency.iso_alpha_code.to_string(),
                ));
            }

            product_keys.insert(reference, catalog.insert(product)?);
        }

        debug!(
            fixture = name,
            products = catalog.len(),
            "catalog fixture loaded"
        );

        self.product_keys = product_keys;
        self.catalog = Some(catalog);
        self.parameters = parameters;

        Ok(self)
    }

    /// Load the named catalog from the default fixture directory
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_catalog(name)?;

        Ok(fixture)
    }

    /// Get the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns an error if no catalog has been loaded yet.
    pub fn catalog(&self) -> Result<&Catalog<'static>, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCatalog)
    }

    /// Parameters from the fixture (defaults when the file has none)
    pub fn parameters(&self) -> &PlanParameters<'static> {
        &self.parameters
    }

    /// Get a product key by its reference
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, reference: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(reference)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(reference.to_string()))
    }

    /// Get a product by its reference
    ///
    /// # Errors
    ///
    /// Returns an error if no catalog is loaded or the product is not found.
    pub fn product(&self, reference: &str) -> Result<&ProductLine<'static>, FixtureError> {
        let key = self.product_key(reference)?;

        self.catalog()?
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(reference.to_string()))
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
