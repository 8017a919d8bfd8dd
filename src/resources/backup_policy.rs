//! Backup policy resource
//!
//! The schedule is one `type` plus three optional branches. Only the branch
//! selected by `type` ever reaches the service; the others are cleared on
//! create and on every update.

use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::helpers::{expand_int32, expand_non_empty_string_list, retention_period, timestamp_value};
use crate::oasis::backup::{
    BackupPolicy, DailySchedule, HourlySchedule, MonthlySchedule, Schedule, TimeOfDay,
    SCHEDULE_DAILY, SCHEDULE_HOURLY, SCHEDULE_MONTHLY,
};
use crate::{in_range, one_of};
use crate::resource::{ensure_unchanged, fetch_for_update, Resource, Session};
use crate::schema::data::BlockExt;
use crate::schema::diff::suppress_zero;
use crate::schema::{Attribute, AttributeMap, AttributeType, AttributeValue, ResourceData, Schema};
use async_trait::async_trait;
use std::time::Duration;

pub struct BackupPolicyResource;

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

fn schedule_at_schema() -> Schema {
    Schema::nested()
        .attr("hours", Attribute::int().optional().validate(in_range!(0, 23)))
        .attr("minutes", Attribute::int().optional().validate(in_range!(0, 59)))
        .attr("timezone", Attribute::string().optional().default_value("UTC"))
}

fn hourly_schema() -> Schema {
    Schema::nested().attr(
        "interval",
        Attribute::int().required().describe("Hours between two backups"),
    )
}

fn daily_schema() -> Schema {
    WEEKDAYS
        .into_iter()
        .fold(Schema::nested(), |schema, day| {
            schema.attr(day, Attribute::bool().optional().default_value(false))
        })
        .attr("schedule_at", Attribute::single_block(schedule_at_schema()).required())
}

fn monthly_schema() -> Schema {
    Schema::nested()
        .attr("day_of_month", Attribute::int().required())
        .attr("schedule_at", Attribute::single_block(schedule_at_schema()).required())
}

fn schedule_schema() -> Schema {
    Schema::nested()
        .attr(
            "type",
            Attribute::string()
                .required()
                .validate(one_of![SCHEDULE_HOURLY, SCHEDULE_DAILY, SCHEDULE_MONTHLY]),
        )
        .attr("hourly", Attribute::single_block(hourly_schema()).optional())
        .attr("daily", Attribute::single_block(daily_schema()).optional())
        .attr("monthly", Attribute::single_block(monthly_schema()).optional())
}

pub fn schema() -> Schema {
    Schema::new()
        .attr("name", Attribute::string().required())
        .attr("description", Attribute::string().optional())
        .attr(
            "deployment_id",
            Attribute::string().required().describe("Fixed once the policy exists"),
        )
        .attr(
            "email_notification",
            Attribute::string()
                .required()
                .validate(one_of!["None", "FailureOnly", "Always"]),
        )
        .attr("schedule", Attribute::single_block(schedule_schema()).required())
        .attr(
            "retention_period_hour",
            Attribute::int().optional().suppress_diff(suppress_zero),
        )
        .attr(
            "additional_region_ids",
            Attribute::list_of(AttributeType::String).optional().min_items(1),
        )
        .attr("is_paused", Attribute::bool().optional())
        .attr("upload", Attribute::bool().optional())
        .attr("locked", Attribute::bool().optional())
        .attr("created_at", Attribute::string().computed())
        .attr("next_backup", Attribute::string().computed())
}

fn expand_time_of_day(block: Option<&AttributeMap>, path: &str) -> Result<Option<TimeOfDay>> {
    block
        .map(|at| {
            Ok(TimeOfDay {
                hours: expand_int32(&format!("{path}.0.hours"), at.int_of("hours"))?,
                minutes: expand_int32(&format!("{path}.0.minutes"), at.int_of("minutes"))?,
                time_zone: at.str_of("timezone").to_string(),
            })
        })
        .transpose()
}

/// Schedule from its block, keeping only the branch `type` selects
pub fn expand_schedule(block: &AttributeMap) -> Result<Schedule> {
    let schedule_type = block.str_of("type");
    let mut schedule = Schedule {
        schedule_type: schedule_type.to_string(),
        hourly_schedule: block
            .block_of("hourly")
            .map(|h| -> Result<HourlySchedule> {
                Ok(HourlySchedule {
                    schedule_interval: expand_int32("schedule.0.hourly.0.interval", h.int_of("interval"))?,
                })
            })
            .transpose()?,
        daily_schedule: block
            .block_of("daily")
            .map(|d| -> Result<DailySchedule> {
                Ok(DailySchedule {
                    monday: d.bool_of("monday"),
                    tuesday: d.bool_of("tuesday"),
                    wednesday: d.bool_of("wednesday"),
                    thursday: d.bool_of("thursday"),
                    friday: d.bool_of("friday"),
                    saturday: d.bool_of("saturday"),
                    sunday: d.bool_of("sunday"),
                    schedule_at: expand_time_of_day(
                        d.block_of("schedule_at"),
                        "schedule.0.daily.0.schedule_at",
                    )?,
                })
            })
            .transpose()?,
        monthly_schedule: block
            .block_of("monthly")
            .map(|m| -> Result<MonthlySchedule> {
                Ok(MonthlySchedule {
                    day_of_month: expand_int32("schedule.0.monthly.0.day_of_month", m.int_of("day_of_month"))?,
                    schedule_at: expand_time_of_day(
                        m.block_of("schedule_at"),
                        "schedule.0.monthly.0.schedule_at",
                    )?,
                })
            })
            .transpose()?,
    };
    let selected_present = match schedule_type {
        SCHEDULE_HOURLY => schedule.hourly_schedule.is_some(),
        SCHEDULE_DAILY => schedule.daily_schedule.is_some(),
        SCHEDULE_MONTHLY => schedule.monthly_schedule.is_some(),
        other => {
            return Err(ProviderError::malformed(
                "schedule.0.type",
                format!("unknown schedule type {other:?}"),
            ))
        }
    };
    if !selected_present {
        return Err(ProviderError::malformed(
            "schedule",
            format!("a {} block is required for type {schedule_type}", schedule_type.to_lowercase()),
        ));
    }
    schedule.retain_selected_branch();
    Ok(schedule)
}

fn expand_retention(data: &ResourceData) -> Result<Option<Duration>> {
    data.get_ok("retention_period_hour")
        .and_then(AttributeValue::as_int)
        .map(|hours| retention_period("retention_period_hour", hours))
        .transpose()
}

pub fn expand_backup_policy(data: &ResourceData) -> Result<BackupPolicy> {
    Ok(BackupPolicy {
        name: data.require_str("name")?.to_string(),
        description: data.get_string("description"),
        deployment_id: data.require_str("deployment_id")?.to_string(),
        email_notification: data.require_str("email_notification")?.to_string(),
        schedule: Some(expand_schedule(data.require_block("schedule")?)?),
        retention_period: expand_retention(data)?,
        additional_region_ids: expand_non_empty_string_list(data.get_list("additional_region_ids")),
        is_paused: data.get_bool("is_paused"),
        upload: data.get_bool("upload"),
        locked: data.get_bool("locked"),
        ..Default::default()
    })
}

fn flatten_time_of_day(at: &Option<TimeOfDay>) -> AttributeValue {
    let at = at.clone().unwrap_or_default();
    AttributeValue::single_block(attrs! {
        "hours" => at.hours,
        "minutes" => at.minutes,
        "timezone" => at.time_zone,
    })
}

pub fn flatten_schedule(schedule: &Schedule) -> AttributeValue {
    let mut values = attrs! { "type" => &schedule.schedule_type };
    if let Some(hourly) = &schedule.hourly_schedule {
        values.insert(
            "hourly".into(),
            AttributeValue::single_block(attrs! { "interval" => hourly.schedule_interval }),
        );
    }
    if let Some(daily) = &schedule.daily_schedule {
        values.insert(
            "daily".into(),
            AttributeValue::single_block(attrs! {
                "monday" => daily.monday,
                "tuesday" => daily.tuesday,
                "wednesday" => daily.wednesday,
                "thursday" => daily.thursday,
                "friday" => daily.friday,
                "saturday" => daily.saturday,
                "sunday" => daily.sunday,
                "schedule_at" => flatten_time_of_day(&daily.schedule_at),
            }),
        );
    }
    if let Some(monthly) = &schedule.monthly_schedule {
        values.insert(
            "monthly".into(),
            AttributeValue::single_block(attrs! {
                "day_of_month" => monthly.day_of_month,
                "schedule_at" => flatten_time_of_day(&monthly.schedule_at),
            }),
        );
    }
    AttributeValue::single_block(values)
}

pub fn flatten_backup_policy(policy: &BackupPolicy) -> AttributeMap {
    let mut values = attrs! {
        "name" => &policy.name,
        "description" => &policy.description,
        "deployment_id" => &policy.deployment_id,
        "email_notification" => &policy.email_notification,
        "retention_period_hour" => policy.retention_period.map(|d| (d.as_secs() / 3600) as i64).unwrap_or(0),
        "is_paused" => policy.is_paused,
        "upload" => policy.upload,
        "locked" => policy.locked,
        "created_at" => timestamp_value(policy.created_at.as_ref()),
        "next_backup" => timestamp_value(policy.status.as_ref().and_then(|s| s.next_backup.as_ref())),
    };
    if let Some(schedule) = &policy.schedule {
        values.insert("schedule".into(), flatten_schedule(schedule));
    }
    if !policy.additional_region_ids.is_empty() {
        values.insert(
            "additional_region_ids".into(),
            policy.additional_region_ids.clone().into(),
        );
    }
    values
}

#[async_trait]
impl Resource for BackupPolicyResource {
    fn kind(&self) -> &'static str {
        "oasis_backup_policy"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let policy = expand_backup_policy(data)?;
        let created = session.backup().create_backup_policy(&policy).await?;
        data.set_id(&created.id);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let policy = session.backup().get_backup_policy(data.id()).await?;
        data.set_all(flatten_backup_policy(&policy));
        Ok(())
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        ensure_unchanged(data, "deployment_id")?;
        let client = session.backup();
        let id = data.id().to_string();
        let mut policy = fetch_for_update(data, client.get_backup_policy(&id)).await?;
        apply_changes(data, &mut policy)?;
        client.update_backup_policy(&policy).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.backup().delete_backup_policy(data.id()).await
    }

    fn customize_diff(&self, data: &ResourceData) -> Result<()> {
        ensure_unchanged(data, "deployment_id")
    }
}

/// Merge the changed attributes of `data` into the fetched `policy`
pub fn apply_changes(data: &ResourceData, policy: &mut BackupPolicy) -> Result<()> {
    if data.has_change("name") {
        policy.name = data.require_str("name")?.to_string();
    }
    if data.has_change("description") {
        policy.description = data.get_string("description");
    }
    if data.has_change("email_notification") {
        policy.email_notification = data.require_str("email_notification")?.to_string();
    }
    if data.has_change("schedule") {
        policy.schedule = Some(expand_schedule(data.require_block("schedule")?)?);
    }
    if data.has_change("retention_period_hour") {
        policy.retention_period = expand_retention(data)?;
    }
    if data.has_change("additional_region_ids") {
        policy.additional_region_ids =
            expand_non_empty_string_list(data.get_list("additional_region_ids"));
    }
    if data.has_change("is_paused") {
        policy.is_paused = data.get_bool("is_paused");
    }
    if data.has_change("upload") {
        policy.upload = data.get_bool("upload");
    }
    if data.has_change("locked") {
        policy.locked = data.get_bool("locked");
    }
    if let Some(schedule) = policy.schedule.as_mut() {
        schedule.retain_selected_branch();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{apply_defaults, validate};

    fn at(hours: i64, minutes: i64) -> AttributeValue {
        AttributeValue::single_block(attrs! { "hours" => hours, "minutes" => minutes, "timezone" => "UTC" })
    }

    fn schedule_block(kind: &str) -> AttributeValue {
        AttributeValue::single_block(attrs! {
            "type" => kind,
            "hourly" => AttributeValue::single_block(attrs! { "interval" => 6 }),
            "daily" => AttributeValue::single_block(attrs! {
                "monday" => true,
                "tuesday" => false,
                "wednesday" => true,
                "thursday" => false,
                "friday" => true,
                "saturday" => false,
                "sunday" => false,
                "schedule_at" => at(3, 30),
            }),
            "monthly" => AttributeValue::single_block(attrs! {
                "day_of_month" => 12,
                "schedule_at" => at(4, 0),
            }),
        })
    }

    fn view(schedule: AttributeValue) -> ResourceData {
        ResourceData::new(attrs! {
            "name" => "test-policy",
            "description" => "test-description",
            "deployment_id" => "dep-1",
            "email_notification" => "FailureOnly",
            "schedule" => schedule,
            "retention_period_hour" => 120,
            "additional_region_ids" => vec!["aws-us-east-2".to_string()],
            "is_paused" => true,
            "upload" => true,
            "locked" => false,
        })
    }

    #[test]
    fn test_hourly_clears_other_branches() {
        let policy = expand_backup_policy(&view(schedule_block(SCHEDULE_HOURLY))).unwrap();
        let schedule = policy.schedule.unwrap();
        assert_eq!(schedule.hourly_schedule, Some(HourlySchedule { schedule_interval: 6 }));
        assert!(schedule.daily_schedule.is_none());
        assert!(schedule.monthly_schedule.is_none());
    }

    #[test]
    fn test_round_trip_daily() {
        let daily = AttributeValue::single_block(attrs! {
            "type" => SCHEDULE_DAILY,
            "daily" => AttributeValue::single_block(attrs! {
                "monday" => true,
                "tuesday" => false,
                "wednesday" => true,
                "thursday" => false,
                "friday" => true,
                "saturday" => false,
                "sunday" => false,
                "schedule_at" => at(3, 30),
            }),
        });
        let data = view(daily);
        let policy = expand_backup_policy(&data).unwrap();
        assert_eq!(policy.retention_period, Some(Duration::from_secs(120 * 3600)));
        let flattened = flatten_backup_policy(&policy);
        for (key, value) in data.state() {
            assert_eq!(flattened.get(key), Some(value), "attribute {key}");
        }
    }

    #[test]
    fn test_schedule_time_out_of_range() {
        let schedule = AttributeValue::single_block(attrs! {
            "type" => SCHEDULE_MONTHLY,
            "monthly" => AttributeValue::single_block(attrs! {
                "day_of_month" => 12,
                "schedule_at" => at(24, 60),
            }),
        });
        let errors = validate(&schema(), view(schedule).state());
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(messages.len(), 2, "{messages:?}");
        assert!(messages.iter().any(|m| m.contains("schedule.0.monthly.0.schedule_at.0.hours")));
        assert!(messages.iter().any(|m| m.contains("schedule.0.monthly.0.schedule_at.0.minutes")));
    }

    #[test]
    fn test_oversized_retention_is_malformed() {
        let mut data = view(schedule_block(SCHEDULE_HOURLY));
        data.set("retention_period_hour", AttributeValue::Int(i64::MAX));
        let err = expand_backup_policy(&data).unwrap_err();
        assert!(
            matches!(err, ProviderError::Malformed { ref attribute, .. } if attribute == "retention_period_hour")
        );
    }

    #[test]
    fn test_oversized_interval_is_malformed() {
        let schedule = AttributeValue::single_block(attrs! {
            "type" => SCHEDULE_HOURLY,
            "hourly" => AttributeValue::single_block(attrs! { "interval" => i64::MAX }),
        });
        let err = expand_backup_policy(&view(schedule)).unwrap_err();
        assert!(err.to_string().contains("schedule.0.hourly.0.interval"));
    }

    #[test]
    fn test_missing_selected_branch() {
        let schedule = AttributeValue::single_block(attrs! {
            "type" => SCHEDULE_MONTHLY,
            "hourly" => AttributeValue::single_block(attrs! { "interval" => 6 }),
        });
        let err = expand_backup_policy(&view(schedule)).unwrap_err();
        assert!(err.to_string().contains("monthly block is required"));
    }

    #[test]
    fn test_update_clears_non_selected_branches() {
        let mut remote = BackupPolicy {
            id: "policy-1".into(),
            deployment_id: "dep-1".into(),
            schedule: Some(expand_schedule_unchecked(SCHEDULE_DAILY)),
            ..Default::default()
        };
        let state = attrs! { "name" => "renamed", "deployment_id" => "dep-1" };
        let data = ResourceData::with_prior(
            "policy-1",
            attrs! { "name" => "old", "deployment_id" => "dep-1" },
            state,
        );
        apply_changes(&data, &mut remote).unwrap();
        assert_eq!(remote.name, "renamed");
        let schedule = remote.schedule.unwrap();
        assert!(schedule.daily_schedule.is_some());
        assert!(schedule.hourly_schedule.is_none());
        assert!(schedule.monthly_schedule.is_none());
    }

    fn expand_schedule_unchecked(kind: &str) -> Schedule {
        Schedule {
            schedule_type: kind.to_string(),
            hourly_schedule: Some(HourlySchedule { schedule_interval: 1 }),
            daily_schedule: Some(DailySchedule {
                friday: true,
                ..Default::default()
            }),
            monthly_schedule: Some(MonthlySchedule {
                day_of_month: 1,
                schedule_at: None,
            }),
        }
    }

    #[test]
    fn test_changed_deployment_is_rejected() {
        let data = ResourceData::with_prior(
            "policy-1",
            attrs! { "deployment_id" => "dep-1" },
            attrs! { "deployment_id" => "dep-2" },
        );
        let err = BackupPolicyResource.customize_diff(&data).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_region_ids_are_dropped() {
        let mut data = view(schedule_block(SCHEDULE_HOURLY));
        data.set(
            "additional_region_ids",
            vec![String::new(), "gcp-europe-west4".to_string()],
        );
        let policy = expand_backup_policy(&data).unwrap();
        assert_eq!(policy.additional_region_ids, vec!["gcp-europe-west4".to_string()]);
    }

    #[test]
    fn test_schema_validation() {
        let mut state = view(schedule_block("Weekly")).into_state();
        apply_defaults(&schema(), &mut state);
        let errors = validate(&schema(), &state);
        assert!(errors.iter().any(|e| e.to_string().contains("schedule.0.type")));

        let mut state = view(schedule_block(SCHEDULE_DAILY)).into_state();
        state.remove("email_notification");
        let errors = validate(&schema(), &state);
        assert!(errors.iter().any(|e| e.to_string().contains("email_notification")));
    }
}
