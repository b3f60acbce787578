use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::gateway::Acknowledgement;
use crate::{ClientError, ValidationError};

/// Actuators wired to the farm controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceName {
    Pump,
    Fan,
    Light,
    ServoDoor,
    ServoFeed,
    LedFarm,
    LedAnimal,
    LedHallway,
}

impl DeviceName {
    pub const ALL: [DeviceName; 8] = [
        Self::Pump,
        Self::Fan,
        Self::Light,
        Self::ServoDoor,
        Self::ServoFeed,
        Self::LedFarm,
        Self::LedAnimal,
        Self::LedHallway,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pump => "pump",
            Self::Fan => "fan",
            Self::Light => "light",
            Self::ServoDoor => "servo_door",
            Self::ServoFeed => "servo_feed",
            Self::LedFarm => "led_farm",
            Self::LedAnimal => "led_animal",
            Self::LedHallway => "led_hallway",
        }
    }

    /// Largest accepted `value`: the servo's angle limit, or the PWM range.
    pub fn max_value(&self) -> u32 {
        match self {
            Self::ServoDoor => 90,
            Self::ServoFeed => 50,
            _ => 255,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceMode {
    On,
    Off,
    Auto,
}

impl DeviceMode {
    /// `Auto` counts as active: the controller may switch it on at any time.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Off)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCommand {
    pub device_name: DeviceName,
    pub action: DeviceMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

impl DeviceCommand {
    pub fn new(device_name: DeviceName, action: DeviceMode) -> Self {
        Self {
            device_name,
            action,
            value: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: u32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.value {
            Some(value) if value > self.device_name.max_value() => Err(ValidationError::OutOfRange {
                field: "value",
                max: self.device_name.max_value(),
                value,
            }),
            _ => Ok(()),
        }
    }
}

/// Mode of every device the controller reports, keyed by device name.
///
/// Unknown device names from newer firmware are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DeviceStatusMap(BTreeMap<String, DeviceMode>);

impl DeviceStatusMap {
    pub fn get(&self, device: DeviceName) -> Option<DeviceMode> {
        self.0.get(device.as_str()).copied()
    }

    /// Records the outcome of a control call that the backend accepted,
    /// without waiting for the next status poll.
    pub fn apply(&mut self, command: &DeviceCommand) {
        self.0
            .insert(command.device_name.as_str().to_owned(), command.action);
    }

    pub fn active_count(&self) -> usize {
        self.0.values().filter(|mode| mode.is_active()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DeviceMode)> {
        self.0.iter().map(|(name, mode)| (name.as_str(), *mode))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceHistoryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<DeviceName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

pub struct Devices<'a> {
    api: &'a ApiClient,
}

impl<'a> Devices<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Sends one command. Out-of-range values are rejected locally.
    pub async fn control(&self, command: &DeviceCommand) -> Result<Acknowledgement, ClientError> {
        command.validate()?;

        let ack = self
            .api
            .acknowledge(self.api.request(Method::POST, "/devices/control").json(command))
            .await?;

        log::info!(
            target: "smartfarm::api",
            "msg=\"device command accepted\" device={} action={:?}",
            command.device_name.as_str(),
            command.action
        );
        Ok(ack)
    }

    pub async fn status(&self) -> Result<DeviceStatusMap, ClientError> {
        self.api
            .fetch_data(self.api.request(Method::GET, "/devices/status"))
            .await
    }

    pub async fn history(&self, query: &DeviceHistoryQuery) -> Result<serde_json::Value, ClientError> {
        self.api
            .fetch(self.api.request(Method::GET, "/devices/history").query(query))
            .await
    }
}
