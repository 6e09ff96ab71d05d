// Product catalog: the list of ticket packages offered by the backend
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info};

use crate::api::{BookingBackend, ClientConfig};
use crate::pricing::FALLBACK_TAX_PERCENT;

// Numeric columns may come back as null for half-configured products
fn zero_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn fallback_tax_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(FALLBACK_TAX_PERCENT))
}

fn fallback_tax_percent() -> f64 {
    FALLBACK_TAX_PERCENT
}

// Product as returned by the backend inside the products envelope
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Product {
    #[serde(rename = "PRODUCTID")]
    pub id: i64,
    #[serde(rename = "PROD_CODE")]
    pub code: i64,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "MRP", default, deserialize_with = "zero_if_null")]
    pub retail_price: f64,
    #[serde(rename = "RATE", default, deserialize_with = "zero_if_null")]
    pub rate: f64,
    #[serde(rename = "ACTIVE", default)]
    pub active: String,
    #[serde(rename = "DESCRIPTION", default)]
    pub description: Option<String>,
    #[serde(rename = "IMG", default)]
    pub image: Option<String>,
    #[serde(
        rename = "GST_PERC",
        default = "fallback_tax_percent",
        deserialize_with = "fallback_tax_if_null"
    )]
    pub tax_percent: f64,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.active.eq_ignore_ascii_case("Y")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    // Fetch all active products once. Any failure keeps whatever was loaded before.
    pub async fn load(&mut self, backend: &dyn BookingBackend) -> bool {
        match backend.fetch_products().await {
            Ok(products) => {
                info!(count = products.len(), "catalog loaded");
                self.products = products;
                true
            }
            Err(e) => {
                error!(error = %e, "error fetching products");
                false
            }
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    // Names are the join key between cart lines and products; first match wins
    pub fn find_by_name(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    pub fn image_url(&self, config: &ClientConfig, product: &Product) -> Option<String> {
        product
            .image
            .as_deref()
            .filter(|img| !img.is_empty())
            .map(|img| {
                format!(
                    "{}/{}/{}",
                    config.base_url.trim_end_matches('/'),
                    config.image_route,
                    img
                )
            })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::api::mock_server::MockBackend;
    use crate::api::ApiError;

    #[test]
    fn test_find_by_name_first_match_wins() {
        let catalog = Catalog::new(vec![
            product(1, "Day Pass", 500.0, 18.0),
            product(2, "Day Pass", 700.0, 5.0),
        ]);

        let found = catalog.find_by_name("Day Pass").unwrap();
        assert_eq!(found.code, 1);
        assert!(catalog.find_by_name("day pass").is_none());
    }

    #[test]
    fn test_image_url() {
        let catalog = catalog();
        let day = catalog.find_by_name("Day Pass").unwrap();
        let config = ClientConfig::new("https://tickets.example.com/").unwrap();
        assert_eq!(
            catalog.image_url(&config, day),
            Some("https://tickets.example.com/UploadImages/101.jpg".to_string())
        );

        let custom = ClientConfig {
            image_route: "media/packages".to_string(),
            ..config.clone()
        };
        assert_eq!(
            catalog.image_url(&custom, day),
            Some("https://tickets.example.com/media/packages/101.jpg".to_string())
        );

        let mut no_image = day.clone();
        no_image.image = Some(String::new());
        assert_eq!(catalog.image_url(&config, &no_image), None);
    }

    #[test]
    fn test_load_replaces_products() {
        let backend = MockBackend::new();
        let mut loaded = Catalog::default();

        tokio_test::block_on(async {
            backend.set_products(catalog().products().to_vec()).await;
            assert!(loaded.load(&backend).await);
        });

        assert_eq!(loaded.products().len(), 3);
        assert!(loaded.products().iter().all(Product::is_active));
        assert_eq!(backend.product_requests(), 1);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_existing_catalog() {
        let backend = MockBackend::new();
        backend
            .fail_products(ApiError::NetworkError("connection refused".to_string()))
            .await;

        let mut existing = catalog();
        assert!(!existing.load(&backend).await);
        assert_eq!(existing.products().len(), 3);

        let mut empty = Catalog::default();
        assert!(!empty.load(&backend).await);
        assert!(empty.is_empty());
        assert_eq!(backend.product_requests(), 2);
    }
}
