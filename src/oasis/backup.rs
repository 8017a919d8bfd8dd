//! Backup service: backups, backup policies and cross-region copies

use super::client::{segment, service_client};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Backup {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub deployment_id: String,
    pub backup_policy_id: String,
    pub region_id: String,
    pub upload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeOfDay {
    pub hours: i32,
    pub minutes: i32,
    pub time_zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlySchedule {
    pub schedule_interval: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailySchedule {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_at: Option<TimeOfDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlySchedule {
    pub day_of_month: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_at: Option<TimeOfDay>,
}

/// Schedule type names used on the wire and in configuration
pub const SCHEDULE_HOURLY: &str = "Hourly";
pub const SCHEDULE_DAILY: &str = "Daily";
pub const SCHEDULE_MONTHLY: &str = "Monthly";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub schedule_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_schedule: Option<HourlySchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_schedule: Option<DailySchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_schedule: Option<MonthlySchedule>,
}

impl Schedule {
    /// Clear every branch except the one selected by `schedule_type`
    pub fn retain_selected_branch(&mut self) {
        match self.schedule_type.as_str() {
            SCHEDULE_HOURLY => {
                self.daily_schedule = None;
                self.monthly_schedule = None;
            }
            SCHEDULE_DAILY => {
                self.hourly_schedule = None;
                self.monthly_schedule = None;
            }
            SCHEDULE_MONTHLY => {
                self.hourly_schedule = None;
                self.daily_schedule = None;
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupPolicyStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_backup: Option<DateTime<Utc>>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupPolicy {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub deployment_id: String,
    pub is_paused: bool,
    pub upload: bool,
    pub locked: bool,
    pub email_notification: String,
    pub additional_region_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    #[serde(
        with = "super::duration::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub retention_period: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BackupPolicyStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyBackupRequest {
    pub source_backup_id: String,
    pub region_id: String,
}

service_client!(
    /// Stub for the backup service
    BackupClient,
    "backup"
);

impl BackupClient<'_> {
    pub async fn get_backup(&self, id: &str) -> Result<Backup> {
        self.client.get(&self.url(&format!("backups/{}", segment(id)))).await
    }

    pub async fn create_backup(&self, backup: &Backup) -> Result<Backup> {
        self.client.post(&self.url("backups"), backup).await
    }

    pub async fn update_backup(&self, backup: &Backup) -> Result<Backup> {
        self.client.put(&self.url(&format!("backups/{}", segment(&backup.id))), backup).await
    }

    pub async fn delete_backup(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("backups/{}", segment(id)))).await
    }

    /// Copy a backup into another region; returns the new backup
    pub async fn copy_backup(&self, request: &CopyBackupRequest) -> Result<Backup> {
        self.client.post(&self.url("backups/copy"), request).await
    }

    pub async fn get_backup_policy(&self, id: &str) -> Result<BackupPolicy> {
        self.client.get(&self.url(&format!("backuppolicies/{}", segment(id)))).await
    }

    pub async fn create_backup_policy(&self, policy: &BackupPolicy) -> Result<BackupPolicy> {
        self.client.post(&self.url("backuppolicies"), policy).await
    }

    pub async fn update_backup_policy(&self, policy: &BackupPolicy) -> Result<BackupPolicy> {
        let url = self.url(&format!("backuppolicies/{}", segment(&policy.id)));
        self.client.put(&url, policy).await
    }

    pub async fn delete_backup_policy(&self, id: &str) -> Result<()> {
        self.client.delete(&self.url(&format!("backuppolicies/{}", segment(id)))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_schedule(kind: &str) -> Schedule {
        Schedule {
            schedule_type: kind.to_string(),
            hourly_schedule: Some(HourlySchedule { schedule_interval: 6 }),
            daily_schedule: Some(DailySchedule {
                monday: true,
                ..Default::default()
            }),
            monthly_schedule: Some(MonthlySchedule {
                day_of_month: 12,
                schedule_at: None,
            }),
        }
    }

    #[test]
    fn test_retain_hourly() {
        let mut schedule = full_schedule(SCHEDULE_HOURLY);
        schedule.retain_selected_branch();
        assert!(schedule.hourly_schedule.is_some());
        assert!(schedule.daily_schedule.is_none());
        assert!(schedule.monthly_schedule.is_none());
    }

    #[test]
    fn test_retain_monthly() {
        let mut schedule = full_schedule(SCHEDULE_MONTHLY);
        schedule.retain_selected_branch();
        assert!(schedule.hourly_schedule.is_none());
        assert!(schedule.daily_schedule.is_none());
        assert_eq!(schedule.monthly_schedule.unwrap().day_of_month, 12);
    }

    #[test]
    fn test_unknown_type_left_alone() {
        let mut schedule = full_schedule("Weekly");
        schedule.retain_selected_branch();
        assert!(schedule.hourly_schedule.is_some());
        assert!(schedule.daily_schedule.is_some());
    }

    #[test]
    fn test_retention_period_wire_format() {
        let policy = BackupPolicy {
            retention_period: Some(Duration::from_secs(7200)),
            ..Default::default()
        };
        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!(json["retention_period"], "7200s");
    }
}
