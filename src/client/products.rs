//! Product catalog endpoints

use super::error::ApiError;
use super::http::{decode_model, ApiClient, RequestOptions};
use super::models::{Product, ProductInput};
use reqwest::Method;
use serde_json::Value;

pub const PRODUCTS_PATH: &str = "/products";
pub const CREATE_PRODUCT_PATH: &str = "/products/create";

/// Path of the product listing with an encoded query string
pub fn products_path<K, V>(query: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if query.is_empty() {
        return PRODUCTS_PATH.to_string();
    }

    let query = query
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding::encode(k.as_ref()),
                urlencoding::encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", PRODUCTS_PATH, query)
}

fn product_path(product_id: &str) -> String {
    format!("{}/{}", PRODUCTS_PATH, urlencoding::encode(product_id))
}

/// Mutations answer either with the product or with `{message, product}`
fn unwrap_product(value: Value) -> Result<Product, ApiError> {
    match value {
        Value::Object(mut body) if body.contains_key("product") => {
            decode_model(body.remove("product").unwrap_or(Value::Null))
        }
        other => decode_model(other),
    }
}

impl ApiClient {
    /// List products, optionally filtered by query parameters
    pub async fn get_products<K, V>(&self, query: &[(K, V)]) -> Result<Vec<Product>, ApiError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.request_as(&products_path(query), RequestOptions::get())
            .await
    }

    pub async fn get_product(&self, product_id: &str) -> Result<Product, ApiError> {
        self.request_as(&product_path(product_id), RequestOptions::get())
            .await
    }

    pub async fn create_product(&self, product: &ProductInput) -> Result<Product, ApiError> {
        let options = RequestOptions::json(Method::POST, product)?;
        let value = self.request(CREATE_PRODUCT_PATH, options).await?;
        unwrap_product(value)
    }

    pub async fn update_product(
        &self,
        product_id: &str,
        product: &ProductInput,
    ) -> Result<Product, ApiError> {
        let options = RequestOptions::json(Method::PUT, product)?;
        let value = self.request(&product_path(product_id), options).await?;
        unwrap_product(value)
    }

    /// Delete a product; returns whatever acknowledgement the server sent
    pub async fn delete_product(&self, product_id: &str) -> Result<Value, ApiError> {
        self.request(&product_path(product_id), RequestOptions::delete())
            .await
    }
}
