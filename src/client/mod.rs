//! Storefront API Client
//!
//! Authenticated HTTP client for the MedCore storefront API.
//!
//! ## Architecture
//!
//! - **ApiClient**: request building, bearer auth, response normalization
//! - **Auth endpoints**: signup, login, current user, logout, role checks
//! - **Resource endpoints**: product and user CRUD
//!
//! ## Data Flow
//!
//! 1. A call builds a path and [`RequestOptions`]
//! 2. The client attaches the token from the [`SessionStore`](crate::session::SessionStore)
//! 3. The response body is parsed (empty body as `{}`) or turned into an [`ApiError`]
//! 4. Auth endpoints write the token and profile back to the session

mod auth;
mod error;
mod http;
mod models;
mod products;
mod users;

#[cfg(test)]
pub(crate) mod mock;

pub use auth::{CURRENT_USER_PATH, LOGIN_PATH, SIGNUP_PATH};
pub use error::{ApiError, INVALID_BODY_MESSAGE};
pub use http::{ApiClient, RequestOptions};
pub use models::{
    derive_username, AuthResponse, Credentials, ParseRoleError, Product, ProductInput, Role,
    SignupRequest, UserProfile, UserUpdate,
};
pub use products::{products_path, CREATE_PRODUCT_PATH, PRODUCTS_PATH};
pub use users::USERS_PATH;
