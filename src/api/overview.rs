use super::{ActivityLog, ActivityLogQuery, AlertQuery, ApiClient, UserQuery};
use crate::ClientError;

const RECENT_ACTIVITY: u32 = 5;

/// Headline numbers for the administrator's home screen.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminOverview {
    pub total_users: u64,
    /// Admins on the first page of users.
    pub admins: usize,
    /// Devices in `ON` or `AUTO`.
    pub active_devices: usize,
    pub enabled_schedules: usize,
    pub active_alerts: u64,
    pub recent_activity: Vec<ActivityLog>,
}

impl ApiClient {
    /// Collects the overview one request at a time. Any failure aborts
    /// the whole collection.
    pub async fn overview(&self) -> Result<AdminOverview, ClientError> {
        let users = self.users().list(&UserQuery::default()).await?;
        let admins = users.data.iter().filter(|u| u.role.is_admin()).count();

        let active_devices = self.devices().status().await?.active_count();

        let enabled_schedules = self
            .schedules()
            .list()
            .await?
            .iter()
            .filter(|s| s.enabled)
            .count();

        let alerts = self
            .alerts()
            .list(&AlertQuery {
                limit: Some(1),
                ..AlertQuery::active()
            })
            .await?;
        let active_alerts = alerts.total.max(alerts.count);

        let recent_activity = self
            .activity_logs()
            .list(&ActivityLogQuery {
                limit: Some(RECENT_ACTIVITY),
                ..ActivityLogQuery::default()
            })
            .await?
            .logs;

        Ok(AdminOverview {
            total_users: users.total_users(),
            admins,
            active_devices,
            enabled_schedules,
            active_alerts,
            recent_activity,
        })
    }
}
