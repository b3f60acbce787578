use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::gateway::Acknowledgement;
use crate::validators::require;
use crate::{ClientError, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub message: String,
    /// Missing on alerts raised before severities existed.
    #[serde(default)]
    pub severity: Severity,
    /// Origin of the alert, e.g. `threshold` or `manual_notice`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub status: Option<AlertStatus>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Alerts without an explicit status are treated as active.
    pub fn is_active(&self) -> bool {
        !matches!(self.status, Some(AlertStatus::Resolved))
    }

    /// Most relevant time to show: creation, then last update, then resolution.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .or(self.updated_at)
            .or(self.resolved_at)
            .or(self.timestamp)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AlertStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl AlertQuery {
    pub fn active() -> Self {
        Self {
            status: Some(AlertStatus::Active),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    #[must_use]
    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }
}

/// One page of alerts. `pages` is at least 1.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "one")]
    pub pages: u32,
    #[serde(default)]
    pub data: Vec<Alert>,
}

fn one() -> u32 {
    1
}

/// A notice raised by an administrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: String,
    pub target_all: bool,
    /// Ignored when `target_all` is set.
    pub target_users: Vec<String>,
    pub data: serde_json::Value,
}

impl NewAlert {
    /// A notice to every user.
    pub fn broadcast(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            kind: "manual_notice".to_owned(),
            target_all: true,
            target_users: Vec::new(),
            data: serde_json::json!({}),
        }
    }

    /// Restricts delivery to the given user ids.
    #[must_use]
    pub fn to_users(mut self, user_ids: Vec<String>) -> Self {
        self.target_all = false;
        self.target_users = user_ids;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("message", &self.message)?;
        if !self.target_all && self.target_users.is_empty() {
            return Err(ValidationError::NoRecipients);
        }
        Ok(())
    }
}

pub struct Alerts<'a> {
    api: &'a ApiClient,
}

impl<'a> Alerts<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &AlertQuery) -> Result<AlertPage, ClientError> {
        self.api
            .fetch(self.api.request(Method::GET, "/alerts").query(query))
            .await
    }

    /// Alerts still awaiting attention. The backend has no unread endpoint,
    /// so this is the active list.
    pub async fn unread(&self, limit: u32) -> Result<Vec<Alert>, ClientError> {
        let query = AlertQuery {
            limit: Some(limit),
            ..AlertQuery::active()
        };
        Ok(self.list(&query).await?.data)
    }

    /// Admin only.
    pub async fn create(&self, alert: &NewAlert) -> Result<Alert, ClientError> {
        alert.validate()?;

        let mut body = alert.clone();
        if body.target_all {
            body.target_users.clear();
        }
        self.api
            .fetch_data(self.api.request(Method::POST, "/alerts").json(&body))
            .await
    }

    pub async fn mark_read(&self, id: &str) -> Result<Acknowledgement, ClientError> {
        self.api
            .acknowledge(self.api.request(Method::PUT, &format!("/alerts/{id}/read")))
            .await
    }

    pub async fn resolve(&self, id: &str) -> Result<Acknowledgement, ClientError> {
        self.api
            .acknowledge(self.api.request(Method::PUT, &format!("/alerts/{id}/resolve")))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Acknowledgement, ClientError> {
        self.api
            .acknowledge(self.api.request(Method::DELETE, &format!("/alerts/{id}")))
            .await
    }
}
