use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::gateway::Acknowledgement;
use crate::{ClientError, Role};

/// An account as seen by an administrator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub role: Role,
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_users: u64,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserPage {
    #[serde(default)]
    pub data: Vec<User>,
    #[serde(default)]
    pub pagination: Option<UserPagination>,
}

impl UserPage {
    /// Total across all pages, or the length of this page when the backend
    /// omits pagination.
    pub fn total_users(&self) -> u64 {
        self.pagination
            .as_ref()
            .map_or(self.data.len() as u64, |p| p.total_users)
    }
}

/// Fields an administrator may change. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

pub struct Users<'a> {
    api: &'a ApiClient,
}

impl<'a> Users<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &UserQuery) -> Result<UserPage, ClientError> {
        self.api
            .fetch(self.api.request(Method::GET, "/users").query(query))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<User, ClientError> {
        self.api
            .fetch_data(self.api.request(Method::GET, &format!("/users/{id}")))
            .await
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> Result<User, ClientError> {
        if let Some(email) = &update.email {
            crate::validators::validate_email(email)?;
        }
        self.api
            .fetch_data(self.api.request(Method::PUT, &format!("/users/{id}")).json(update))
            .await
    }

    /// Activates a disabled account or disables an active one.
    pub async fn toggle_status(&self, id: &str) -> Result<User, ClientError> {
        self.api
            .fetch_data(self.api.request(Method::PUT, &format!("/users/{id}/toggle-status")))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Acknowledgement, ClientError> {
        self.api
            .acknowledge(self.api.request(Method::DELETE, &format!("/users/{id}")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_shape() {
        let page: UserPage = serde_json::from_str(
            r#"{
                "success": true,
                "data": [{"_id":"u1","username":"lan","email":"lan@farm.vn","role":"admin","isActive":true}],
                "pagination": {"currentPage":1,"totalPages":3,"totalUsers":42,"limit":20}
            }"#,
        )
        .unwrap();

        assert_eq!(page.data[0].role, Role::Admin);
        assert_eq!(page.pagination.as_ref().unwrap().total_pages, 3);
        assert_eq!(page.total_users(), 42);
    }

    #[test]
    fn test_total_without_pagination() {
        let page: UserPage = serde_json::from_str(
            r#"{"data":[{"_id":"u1","username":"a","email":"a@b.co","role":"user","isActive":false}]}"#,
        )
        .unwrap();
        assert_eq!(page.total_users(), 1);
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = UserUpdate {
            is_active: Some(false),
            ..UserUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "isActive": false })
        );
    }
}
