//! Pure reminder planning over in-memory snapshots.
//!
//! # Responsibility
//! - Decide which deadline/meeting reminders are missing for one owner.
//! - Stay free of I/O so every rule is reproducible from fixed inputs.
//!
//! # Invariants
//! - A reminder is planned only when no notification of the same kind already
//!   references the same source id.
//! - Existing reminders are never re-prioritized when the day count shrinks.
//! - Planning the same snapshot twice, after applying the first plan, yields
//!   nothing.

use crate::config::ReminderConfig;
use crate::model::meeting::{Meeting, MeetingStatus};
use crate::model::notification::{
    NewNotification, Notification, NotificationKind, NotificationOrigin, Priority,
};
use crate::model::project::{Project, ProjectStatus};
use crate::model::DAY_MS;
use chrono::{FixedOffset, TimeZone};
use log::warn;
use std::collections::HashSet;

/// Inputs shared by every rule in one planning pass.
#[derive(Debug, Clone, Copy)]
pub struct ReminderContext<'a> {
    pub owner_id: &'a str,
    /// Evaluation instant in epoch milliseconds.
    pub now_ms: i64,
    pub config: &'a ReminderConfig,
}

/// Whole days left until `end_ms`, rounded up.
///
/// Any positive remainder counts as a full day, so a deadline 1 ms away is
/// one day away and a deadline exactly now is zero days away.
pub fn days_until(end_ms: i64, now_ms: i64) -> i64 {
    let diff = end_ms.saturating_sub(now_ms);
    let whole = diff.div_euclid(DAY_MS);
    if diff.rem_euclid(DAY_MS) == 0 {
        whole
    } else {
        whole + 1
    }
}

/// Priority for a project `days` away from its deadline, or `None` when the
/// project is outside the reminder window.
pub fn deadline_priority(days: i64, config: &ReminderConfig) -> Option<Priority> {
    if days <= 0 || days > i64::from(config.deadline_window_days) {
        return None;
    }
    if days <= i64::from(config.high_priority_days) {
        Some(Priority::High)
    } else {
        Some(Priority::Medium)
    }
}

/// Inclusive `[start, end]` millisecond bounds of the calendar day holding `at_ms`.
pub fn calendar_day_bounds(at_ms: i64, offset: FixedOffset) -> Option<(i64, i64)> {
    let local = offset.timestamp_millis_opt(at_ms).single()?;
    let start = local
        .date_naive()
        .and_hms_opt(0, 0, 0)?
        .and_local_timezone(offset)
        .single()?
        .timestamp_millis();
    Some((start, start + DAY_MS - 1))
}

/// Plans every missing reminder for `context.owner_id`.
///
/// Records owned by someone else are ignored.
pub fn plan_reminders(
    context: &ReminderContext<'_>,
    projects: &[Project],
    meetings: &[Meeting],
    existing: &[Notification],
) -> Vec<NewNotification> {
    let mut covered = existing
        .iter()
        .filter_map(|notification| {
            notification
                .related_id
                .as_deref()
                .map(|related_id| (notification.kind, related_id.to_string()))
        })
        .collect::<HashSet<_>>();
    let mut planned = Vec::new();

    for project in projects {
        if project.owner_id != context.owner_id {
            continue;
        }
        let Some(command) = plan_deadline(context, project) else {
            continue;
        };
        if covered.insert((NotificationKind::Deadline, project.id.clone())) {
            planned.push(command);
        }
    }

    let Some(offset) = context.config.utc_offset() else {
        warn!(
            "event=reminder_plan module=service status=skipped rule=meeting reason=invalid_offset offset_minutes={}",
            context.config.utc_offset_minutes
        );
        return planned;
    };
    let lookahead_ms = i64::from(context.config.meeting_lookahead_days).saturating_mul(DAY_MS);
    let Some(target_day) = calendar_day_bounds(context.now_ms.saturating_add(lookahead_ms), offset)
    else {
        return planned;
    };

    for meeting in meetings {
        if meeting.owner_id != context.owner_id {
            continue;
        }
        let Some(command) = plan_meeting(context, meeting, target_day, offset) else {
            continue;
        };
        if covered.insert((NotificationKind::Meeting, meeting.id.clone())) {
            planned.push(command);
        }
    }

    planned
}

fn plan_deadline(context: &ReminderContext<'_>, project: &Project) -> Option<NewNotification> {
    if project.status != ProjectStatus::InProgress {
        return None;
    }
    let days = days_until(project.end_date?, context.now_ms);
    let priority = deadline_priority(days, context.config)?;
    let when = if days == 1 {
        "tomorrow".to_string()
    } else {
        format!("in {days} days")
    };

    Some(NewNotification {
        kind: NotificationKind::Deadline,
        title: "Project deadline approaching".to_string(),
        message: format!("\"{}\" is due {when}.", project.title),
        priority,
        related_id: Some(project.id.clone()),
        owner_id: context.owner_id.to_string(),
        origin: NotificationOrigin::Auto,
    })
}

fn plan_meeting(
    context: &ReminderContext<'_>,
    meeting: &Meeting,
    (day_start, day_end): (i64, i64),
    offset: FixedOffset,
) -> Option<NewNotification> {
    if meeting.status != MeetingStatus::Scheduled {
        return None;
    }
    if meeting.scheduled_at < day_start || meeting.scheduled_at > day_end {
        return None;
    }

    let starts_at = offset
        .timestamp_millis_opt(meeting.scheduled_at)
        .single()?
        .format("%H:%M");
    let title = if context.config.meeting_lookahead_days == 1 {
        "Meeting tomorrow"
    } else {
        "Upcoming meeting"
    };
    let mut message = format!("\"{}\" starts at {starts_at}", meeting.title);
    if let Some(location) = meeting.location.as_deref().filter(|value| !value.trim().is_empty()) {
        message.push_str(&format!(" ({location})"));
    }
    message.push('.');

    Some(NewNotification {
        kind: NotificationKind::Meeting,
        title: title.to_string(),
        message,
        priority: Priority::Medium,
        related_id: Some(meeting.id.clone()),
        owner_id: context.owner_id.to_string(),
        origin: NotificationOrigin::Auto,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    const OWNER: &str = "owner-1";

    fn now() -> i64 {
        Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn at(day: u32, hour: u32, minute: u32) -> i64 {
        Utc.with_ymd_and_hms(2026, 3, day, hour, minute, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn in_progress(id: &str, end_date: i64) -> Project {
        Project::new(id, OWNER, format!("Project {id}"), ProjectStatus::InProgress)
            .with_end_date(end_date)
    }

    fn scheduled(id: &str, scheduled_at: i64) -> Meeting {
        Meeting::new(id, OWNER, format!("Meeting {id}"), MeetingStatus::Scheduled, scheduled_at)
    }

    fn existing(kind: NotificationKind, related_id: &str) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            kind,
            title: "prior".to_string(),
            message: String::new(),
            created_at: 0,
            read: true,
            priority: Priority::Medium,
            related_id: Some(related_id.to_string()),
            owner_id: OWNER.to_string(),
            origin: NotificationOrigin::Auto,
        }
    }

    fn plan(
        projects: &[Project],
        meetings: &[Meeting],
        existing: &[Notification],
    ) -> Vec<NewNotification> {
        let config = ReminderConfig::default();
        let context = ReminderContext {
            owner_id: OWNER,
            now_ms: now(),
            config: &config,
        };
        plan_reminders(&context, projects, meetings, existing)
    }

    #[test]
    fn days_until_rounds_partial_days_up() {
        assert_eq!(days_until(now(), now()), 0);
        assert_eq!(days_until(now() + 1, now()), 1);
        assert_eq!(days_until(now() + DAY_MS, now()), 1);
        assert_eq!(days_until(now() + DAY_MS + 1, now()), 2);
        assert_eq!(days_until(now() - 1, now()), 0);
        assert_eq!(days_until(now() - DAY_MS - 1, now()), -1);
    }

    #[test]
    fn deadline_two_days_out_is_medium() {
        let planned = plan(&[in_progress("p1", now() + 2 * DAY_MS)], &[], &[]);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].kind, NotificationKind::Deadline);
        assert_eq!(planned[0].related_id.as_deref(), Some("p1"));
        assert_eq!(planned[0].priority, Priority::Medium);
        assert_eq!(planned[0].origin, NotificationOrigin::Auto);
        assert_eq!(planned[0].owner_id, OWNER);
    }

    #[test]
    fn deadline_within_one_day_is_high() {
        let planned = plan(
            &[
                in_progress("soon", now() + 3 * 60 * 60 * 1000),
                in_progress("exact", now() + DAY_MS),
            ],
            &[],
            &[],
        );
        assert_eq!(planned.len(), 2);
        assert!(planned.iter().all(|n| n.priority == Priority::High));
    }

    #[test]
    fn deadline_outside_window_or_not_in_progress_is_ignored() {
        let mut on_hold = in_progress("hold", now() + DAY_MS);
        on_hold.status = ProjectStatus::OnHold;
        let no_end = Project::new("none", OWNER, "No end", ProjectStatus::InProgress);
        let planned = plan(
            &[
                in_progress("past", now() - DAY_MS),
                in_progress("now", now()),
                in_progress("far", now() + 3 * DAY_MS + 1),
                on_hold,
                no_end,
            ],
            &[],
            &[],
        );
        assert!(planned.is_empty());
    }

    #[test]
    fn deadline_three_days_out_is_included() {
        let planned = plan(&[in_progress("edge", now() + 3 * DAY_MS)], &[], &[]);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].priority, Priority::Medium);
    }

    #[test]
    fn existing_deadline_blocks_duplicate_without_repriority() {
        let planned = plan(
            &[in_progress("p1", now() + 1000)],
            &[],
            &[existing(NotificationKind::Deadline, "p1")],
        );
        assert!(planned.is_empty());
    }

    #[test]
    fn manual_notification_about_same_source_blocks_reminder() {
        let manual = Notification {
            origin: NotificationOrigin::Manual,
            ..existing(NotificationKind::Deadline, "p1")
        };
        let planned = plan(&[in_progress("p1", now() + DAY_MS)], &[], &[manual]);
        assert!(planned.is_empty());
    }

    #[test]
    fn existing_notification_of_other_kind_does_not_block() {
        let planned = plan(
            &[in_progress("p1", now() + DAY_MS)],
            &[],
            &[existing(NotificationKind::Meeting, "p1")],
        );
        assert_eq!(planned.len(), 1);
    }

    #[test]
    fn meeting_on_tomorrow_calendar_day_is_planned() {
        let last_ms_of_tomorrow = at(12, 0, 0) - 1;
        let planned = plan(
            &[],
            &[
                scheduled("start", at(11, 0, 0)),
                scheduled("late", last_ms_of_tomorrow),
            ],
            &[],
        );
        assert_eq!(planned.len(), 2);
        assert!(planned
            .iter()
            .all(|n| n.kind == NotificationKind::Meeting && n.priority == Priority::Medium));
        assert_eq!(planned[0].title, "Meeting tomorrow");
        assert!(planned[0].message.contains("00:00"));
    }

    #[test]
    fn meeting_outside_tomorrow_or_not_scheduled_is_ignored() {
        let mut cancelled = scheduled("cancelled", at(11, 9, 0));
        cancelled.status = MeetingStatus::Cancelled;
        let planned = plan(
            &[],
            &[
                scheduled("today", at(10, 23, 59)),
                scheduled("day_after", at(12, 0, 0)),
                cancelled,
            ],
            &[],
        );
        assert!(planned.is_empty());
    }

    #[test]
    fn meeting_day_follows_configured_offset() {
        // 2026-03-10T10:00Z is 18:00 on 03-10 at UTC+8; tomorrow there is 03-11,
        // which spans 03-10T16:00Z..03-11T15:59:59.999Z.
        let config = ReminderConfig {
            utc_offset_minutes: 8 * 60,
            ..ReminderConfig::default()
        };
        let context = ReminderContext {
            owner_id: OWNER,
            now_ms: now(),
            config: &config,
        };
        let meetings = [
            scheduled("early", at(10, 16, 0)),
            scheduled("utc_tomorrow_late", at(11, 16, 0)),
        ];
        let planned = plan_reminders(&context, &[], &meetings, &[]);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].related_id.as_deref(), Some("early"));
        assert!(planned[0].message.contains("00:00"));
    }

    #[test]
    fn records_of_other_owners_are_ignored() {
        let mut foreign = in_progress("p1", now() + DAY_MS);
        foreign.owner_id = "someone-else".to_string();
        assert!(plan(&[foreign], &[], &[]).is_empty());
    }

    #[test]
    fn duplicate_source_ids_in_one_snapshot_plan_once() {
        let planned = plan(
            &[
                in_progress("p1", now() + DAY_MS),
                in_progress("p1", now() + 2 * DAY_MS),
            ],
            &[],
            &[],
        );
        assert_eq!(planned.len(), 1);
    }

    #[test]
    fn second_pass_after_applying_plan_is_empty() {
        let projects = [in_progress("p1", now() + 2 * DAY_MS)];
        let meetings = [scheduled("m1", at(11, 14, 30))];
        let first = plan(&projects, &meetings, &[]);
        assert_eq!(first.len(), 2);

        let applied = first
            .iter()
            .map(|command| existing(command.kind, command.related_id.as_deref().unwrap()))
            .collect::<Vec<_>>();
        assert!(plan(&projects, &meetings, &applied).is_empty());
    }

    #[test]
    fn wider_window_config_is_honoured() {
        let config = ReminderConfig {
            deadline_window_days: 7,
            high_priority_days: 2,
            ..ReminderConfig::default()
        };
        assert_eq!(deadline_priority(7, &config), Some(Priority::Medium));
        assert_eq!(deadline_priority(2, &config), Some(Priority::High));
        assert_eq!(deadline_priority(8, &config), None);
    }
}
