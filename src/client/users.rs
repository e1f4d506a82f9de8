//! User administration endpoints

use super::error::ApiError;
use super::http::{ApiClient, RequestOptions};
use super::models::{UserProfile, UserUpdate};
use reqwest::Method;

pub const USERS_PATH: &str = "/users/";

impl ApiClient {
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.request_as(USERS_PATH, RequestOptions::get()).await
    }

    /// Apply a partial update; fields left `None` are not sent
    pub async fn update_user(
        &self,
        user_id: &str,
        update: &UserUpdate,
    ) -> Result<UserProfile, ApiError> {
        let path = format!("/users/{}", urlencoding::encode(user_id));
        let options = RequestOptions::json(Method::PUT, update)?;
        self.request_as(&path, options).await
    }
}
