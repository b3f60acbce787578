use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, DeviceMode, DeviceName};
use crate::gateway::Acknowledgement;
use crate::validators::{require, validate_days_of_week, validate_schedule_time};
use crate::{ClientError, ValidationError};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub device_name: DeviceName,
    pub action: DeviceMode,
    /// Local time of day, `HH:mm`.
    pub time: String,
    /// 0 = Sunday through 6 = Saturday.
    pub days_of_week: Vec<u8>,
    pub enabled: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub name: String,
    pub device_name: DeviceName,
    pub action: DeviceMode,
    pub time: String,
    pub days_of_week: Vec<u8>,
    pub enabled: bool,
}

impl ScheduleInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        validate_schedule_time(&self.time)?;
        validate_days_of_week(&self.days_of_week)
    }
}

pub struct Schedules<'a> {
    api: &'a ApiClient,
}

impl<'a> Schedules<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Schedule>, ClientError> {
        self.api
            .fetch_data(self.api.request(Method::GET, "/schedules"))
            .await
    }

    pub async fn create(&self, input: &ScheduleInput) -> Result<Schedule, ClientError> {
        input.validate()?;
        self.api
            .fetch_data(self.api.request(Method::POST, "/schedules").json(input))
            .await
    }

    pub async fn update(&self, id: &str, input: &ScheduleInput) -> Result<Schedule, ClientError> {
        input.validate()?;
        self.api
            .fetch_data(
                self.api
                    .request(Method::PUT, &format!("/schedules/{id}"))
                    .json(input),
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Acknowledgement, ClientError> {
        self.api
            .acknowledge(self.api.request(Method::DELETE, &format!("/schedules/{id}")))
            .await
    }

    /// Flips `enabled` and returns the updated schedule.
    pub async fn toggle(&self, id: &str) -> Result<Schedule, ClientError> {
        self.api
            .fetch_data(self.api.request(Method::PUT, &format!("/schedules/{id}/toggle")))
            .await
    }
}
