//! Wire models for the storefront API
//!
//! Request bodies are serialized exactly as the backend expects them.
//! Response models are lenient: unknown fields are ignored and most
//! fields are optional, since the cached profile is otherwise opaque.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============================================
// Roles
// ============================================

/// Account role offered at signup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Distributor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Distributor => "distributor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown role name
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown role '{0}', expected 'customer' or 'distributor'")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "distributor" => Ok(Role::Distributor),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

// ============================================
// Auth
// ============================================

/// Signup form contents
#[derive(Debug, Clone)]
pub struct SignupRequest {
    /// Human display name, sent as `full_name`
    pub name: String,
    /// Explicit handle; derived from `name` when absent
    pub username: Option<String>,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl SignupRequest {
    /// Handle sent to the server
    pub fn handle(&self) -> String {
        match self.username.as_deref().map(str::trim) {
            Some(username) if !username.is_empty() => username.to_string(),
            _ => derive_username(&self.name),
        }
    }

    pub(crate) fn body(&self) -> SignupBody<'_> {
        SignupBody {
            username: self.handle(),
            email: &self.email,
            password: &self.password,
            full_name: &self.name,
            role: self.role,
        }
    }
}

/// Machine-safe handle from a display name: lowercase, whitespace runs
/// joined by a single underscore
pub fn derive_username(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

#[derive(Debug, Serialize)]
pub(crate) struct SignupBody<'a> {
    pub username: String,
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    pub role: Role,
}

/// Login form contents
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response of the signup and login endpoints
///
/// The token is read from `access_token`, or from `session.access_token`
/// when the backend wraps it in a session envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<Value>,
    #[serde(default)]
    session: Option<SessionEnvelope>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SessionEnvelope {
    #[serde(default)]
    access_token: Option<String>,
}

impl AuthResponse {
    /// Bearer token issued by this response, if any
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .or_else(|| self.session.as_ref()?.access_token.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// Typed view of the returned profile
    pub fn user_profile(&self) -> Option<UserProfile> {
        serde_json::from_value(self.user.clone()?).ok()
    }
}

// ============================================
// Users
// ============================================

/// Typed view over a user profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_premium: Option<bool>,
}

impl UserProfile {
    /// Whether `role` is the single role or a member of the role list
    pub fn has_role(&self, role: Role) -> bool {
        self.role.as_deref() == Some(role.as_str()) || self.roles.iter().any(|r| r == role.as_str())
    }

    /// Best display name available
    pub fn display_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
    }
}

/// Partial user update; absent fields are left unchanged server-side
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.full_name.is_none()
            && self.is_active.is_none()
            && self.roles.is_none()
    }
}

// ============================================
// Products
// ============================================

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "opt_id")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "opt_id")]
    pub company_id: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default, deserialize_with = "opt_id")]
    pub owner_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Value of the units on hand
    pub fn stock_value(&self) -> f64 {
        self.price * self.stock_quantity as f64
    }
}

/// Fields sent when creating or replacing a product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub stock_quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub limit: u32,
}

impl ProductInput {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            stock_quantity: 0,
            company_id: None,
            limit: 10,
        }
    }
}

// ============================================
// Helpers
// ============================================

/// Ids arrive as strings (UUIDs) or integers depending on the backend
fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
