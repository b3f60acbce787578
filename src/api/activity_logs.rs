use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Success,
    #[serde(alias = "failure")]
    Failed,
}

/// The acting user, either a bare id or populated by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ActivityActor {
    Id(String),
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

impl ActivityActor {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Populated { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<ActivityActor>,
    #[serde(default)]
    pub username: Option<String>,
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub resource_name: Option<String>,
    pub status: ActivityStatus,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl ActivityLog {
    /// Best available display name of whoever performed the action.
    pub fn actor_name(&self) -> Option<&str> {
        if let Some(name) = self.username.as_deref() {
            return Some(name);
        }
        match &self.user_id {
            Some(ActivityActor::Populated { username, email, .. }) => {
                username.as_deref().or(email.as_deref())
            }
            _ => None,
        }
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.or(self.created_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActivityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogPagination {
    pub total: u64,
    pub page: u32,
    pub pages: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActivityLogPage {
    #[serde(default)]
    pub logs: Vec<ActivityLog>,
    pub pagination: LogPagination,
}

#[derive(Serialize)]
struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RangeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,
}

pub struct ActivityLogs<'a> {
    api: &'a ApiClient,
}

impl<'a> ActivityLogs<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// The calling user's own history.
    pub async fn mine(&self, page: Option<u32>, limit: Option<u32>) -> Result<Vec<ActivityLog>, ClientError> {
        self.api
            .fetch_data(
                self.api
                    .request(Method::GET, "/activity-logs/my-logs")
                    .query(&PageQuery { page, limit }),
            )
            .await
    }

    /// Everyone's history. Admin only.
    pub async fn list(&self, query: &ActivityLogQuery) -> Result<ActivityLogPage, ClientError> {
        self.api
            .fetch_data(self.api.request(Method::GET, "/activity-logs").query(query))
            .await
    }

    /// Aggregates over the range; the backend's shape here is not stable.
    pub async fn stats(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<serde_json::Value, ClientError> {
        self.api
            .fetch(
                self.api
                    .request(Method::GET, "/activity-logs/stats")
                    .query(&RangeQuery { start_date, end_date }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_populated_actor() {
        let log: ActivityLog = serde_json::from_str(
            r#"{
                "_id": "l1",
                "userId": {"_id": "u1", "username": "minh", "role": "admin"},
                "action": "device_control",
                "resourceType": "device",
                "resourceName": "pump",
                "status": "success",
                "createdAt": "2024-05-01T08:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(log.user_id.as_ref().unwrap().id(), "u1");
        assert_eq!(log.actor_name(), Some("minh"));
        assert_eq!(log.resource_type.as_deref(), Some("device"));
        assert!(log.occurred_at().is_some());
    }

    #[test]
    fn test_bare_actor_and_failure_alias() {
        let log: ActivityLog = serde_json::from_str(
            r#"{"_id":"l2","userId":"u9","action":"login","status":"failure"}"#,
        )
        .unwrap();

        assert_eq!(log.user_id, Some(ActivityActor::Id("u9".to_owned())));
        assert_eq!(log.status, ActivityStatus::Failed);
        assert_eq!(log.actor_name(), None);
    }

    #[test]
    fn test_query_encoding() {
        let query = ActivityLogQuery {
            status: Some(ActivityStatus::Failed),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            limit: Some(5),
            ..ActivityLogQuery::default()
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({ "status": "failed", "startDate": "2024-05-01", "limit": 5 })
        );
    }

    #[test]
    fn test_page_shape() {
        let page: ActivityLogPage = serde_json::from_str(
            r#"{"logs":[],"pagination":{"total":0,"page":1,"pages":0,"limit":20}}"#,
        )
        .unwrap();
        assert_eq!(page.pagination.limit, 20);
    }
}
