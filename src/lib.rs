//! # MedCore
//!
//! Client for the MedCore medical-device storefront API.
//!
//! ## Features
//!
//! - **Session persistence**: bearer token and cached profile survive restarts
//! - **Authenticated requests**: the token is attached to every call
//! - **Uniform errors**: transport, decode, and status failures as one [`ApiError`]
//! - **Storefront endpoints**: auth, products, users, distributor dashboard
//!
//! ## Modules
//!
//! - [`session`]: token and profile storage
//! - [`client`]: HTTP client and endpoints
//! - [`dashboard`]: distributor KPIs
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medcore::{ApiClient, ApiConfig, Credentials, SessionStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new(&ApiConfig::default(), SessionStore::in_memory())?;
//!
//!     client
//!         .login(&Credentials {
//!             email: "jane@example.com".into(),
//!             password: "secret".into(),
//!         })
//!         .await?;
//!
//!     if client.check_auth().await {
//!         let products = client.get_products(&[("limit", "10")]).await?;
//!         println!("{} products", products.len());
//!     }
//!
//!     client.logout()?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod session;

pub use client::{
    derive_username, ApiClient, ApiError, AuthResponse, Credentials, Product, ProductInput,
    RequestOptions, Role, SignupRequest, UserProfile, UserUpdate,
};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, SessionConfig};

pub use dashboard::{load_dashboard, Dashboard, DashboardError, InventorySummary};

pub use session::{FileStore, KeyValueStore, MemoryStore, Session, SessionError, SessionStore};
