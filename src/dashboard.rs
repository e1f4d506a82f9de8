//! Distributor Dashboard
//!
//! Loads what the distributor dashboard shows: the signed-in user and
//! inventory KPIs computed from the product catalog.

use crate::client::{ApiClient, ApiError, Product, UserProfile};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Inventory KPIs over a product list
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventorySummary {
    pub total_products: usize,
    pub active_products: usize,
    /// Units on hand across all products
    pub total_units: i64,
    /// Sum of price x stock quantity
    pub total_value: f64,
}

impl InventorySummary {
    pub fn from_products(products: &[Product]) -> Self {
        products.iter().fold(Self::default(), |mut summary, product| {
            summary.total_products += 1;
            if product.is_active {
                summary.active_products += 1;
            }
            summary.total_units += product.stock_quantity;
            summary.total_value += product.stock_value();
            summary
        })
    }
}

/// Everything the dashboard renders
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub user: UserProfile,
    /// Absent when the product listing could not be loaded
    pub inventory: Option<InventorySummary>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Access denied. Distributor account required.")]
    AccessDenied,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Load dashboard data for the signed-in distributor
///
/// Access is decided from the cached profile before any request is made.
/// Failing to load products is tolerated; failing to load the user is not.
pub async fn load_dashboard(client: &ApiClient) -> Result<Dashboard, DashboardError> {
    if !client.is_authenticated() {
        return Err(DashboardError::NotAuthenticated);
    }
    if !client.is_distributor() {
        return Err(DashboardError::AccessDenied);
    }

    let user = client.get_current_user().await?;
    let title = match user.full_name.as_deref() {
        Some(name) if !name.is_empty() => format!("{}'s Dashboard", name),
        _ => "Dashboard".to_string(),
    };

    let empty: [(&str, &str); 0] = [];
    let inventory = match client.get_products(&empty).await {
        Ok(products) => Some(InventorySummary::from_products(&products)),
        Err(e) => {
            tracing::warn!("Products unavailable, dashboard shows no inventory: {}", e);
            None
        }
    };

    Ok(Dashboard {
        title,
        user,
        inventory,
        generated_at: Utc::now(),
    })
}
