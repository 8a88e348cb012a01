use bizdesk_core::db::open_db_in_memory;
use bizdesk_core::{
    snapshot_feed, FeedSnapshot, FixedClock, Meeting, MeetingStatus, NotificationKind,
    NotificationRepository, Project, ProjectStatus, Reconciler, ReminderConfig, SourceEvent,
    SqliteNotificationRepository, DAY_MS,
};
use chrono::{TimeZone, Utc};

const OWNER: &str = "owner-1";

fn now() -> i64 {
    Utc.with_ymd_and_hms(2026, 9, 14, 8, 0, 0)
        .unwrap()
        .timestamp_millis()
}

fn due_in(id: &str, delta_ms: i64) -> Project {
    Project::new(id, OWNER, id, ProjectStatus::InProgress).with_end_date(now() + delta_ms)
}

#[test]
fn no_sweep_runs_while_notifications_are_loading() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();
    let clock = FixedClock::new(now());
    let mut reconciler = Reconciler::new(repo, &clock, ReminderConfig::default());

    assert!(reconciler
        .handle(SourceEvent::OwnerChanged(Some(OWNER.to_string())))
        .is_none());
    assert!(reconciler
        .handle(SourceEvent::Projects(FeedSnapshot::Ready(vec![due_in("p1", DAY_MS)])))
        .is_none());
    assert!(reconciler
        .handle(SourceEvent::Notifications(FeedSnapshot::Loading))
        .is_none());
    assert!(repo.list_notifications(OWNER).unwrap().is_empty());

    let report = reconciler
        .handle(SourceEvent::Notifications(FeedSnapshot::Ready(Vec::new())))
        .unwrap();
    assert_eq!(report.created.len(), 1);
    assert_eq!(reconciler.notifications().unwrap().len(), 1);
}

#[test]
fn no_sweep_runs_without_owner() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();
    let mut reconciler = Reconciler::new(repo, FixedClock::new(now()), ReminderConfig::default());

    assert!(reconciler
        .handle(SourceEvent::Notifications(FeedSnapshot::Ready(Vec::new())))
        .is_none());
    assert!(reconciler
        .handle(SourceEvent::Projects(FeedSnapshot::Ready(vec![due_in("p1", DAY_MS)])))
        .is_none());
    assert!(reconciler.owner_id().is_none());
}

#[test]
fn repeated_events_do_not_duplicate_reminders() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();
    let mut reconciler = Reconciler::new(repo, FixedClock::new(now()), ReminderConfig::default());
    let projects = vec![due_in("p1", 2 * DAY_MS), due_in("p2", 5 * DAY_MS)];

    let summary = reconciler.run([
        SourceEvent::OwnerChanged(Some(OWNER.to_string())),
        SourceEvent::Notifications(FeedSnapshot::Ready(Vec::new())),
        SourceEvent::Projects(FeedSnapshot::Ready(projects.clone())),
        SourceEvent::Projects(FeedSnapshot::Ready(projects.clone())),
        SourceEvent::Meetings(FeedSnapshot::Ready(Vec::new())),
    ]);

    assert_eq!(summary.events, 5);
    assert_eq!(summary.sweeps, 4);
    assert_eq!(summary.created, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(repo.list_notifications(OWNER).unwrap().len(), 1);
}

#[test]
fn failed_snapshot_is_treated_as_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();
    let mut reconciler = Reconciler::new(repo, FixedClock::new(now()), ReminderConfig::default());

    reconciler.handle(SourceEvent::OwnerChanged(Some(OWNER.to_string())));
    reconciler.handle(SourceEvent::Notifications(FeedSnapshot::Failed(
        "permission denied".to_string(),
    )));
    let report = reconciler
        .handle(SourceEvent::Projects(FeedSnapshot::Failed("offline".to_string())))
        .unwrap();

    assert!(report.is_noop());
    assert_eq!(reconciler.notifications().unwrap().len(), 0);
}

#[test]
fn clock_advance_picks_up_newly_qualifying_meeting() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();
    let clock = FixedClock::new(now());
    let mut reconciler = Reconciler::new(repo, &clock, ReminderConfig::default());
    let in_two_days = Utc
        .with_ymd_and_hms(2026, 9, 16, 15, 0, 0)
        .unwrap()
        .timestamp_millis();
    let meetings = vec![Meeting::new(
        "m1",
        OWNER,
        "Review",
        MeetingStatus::Scheduled,
        in_two_days,
    )];

    reconciler.handle(SourceEvent::OwnerChanged(Some(OWNER.to_string())));
    reconciler.handle(SourceEvent::Notifications(FeedSnapshot::Ready(Vec::new())));
    let before = reconciler
        .handle(SourceEvent::Meetings(FeedSnapshot::Ready(meetings.clone())))
        .unwrap();
    assert!(before.is_noop());

    clock.advance(DAY_MS);
    let after = reconciler
        .handle(SourceEvent::Meetings(FeedSnapshot::Ready(meetings)))
        .unwrap();
    assert_eq!(after.created.len(), 1);
    assert_eq!(after.created[0].kind, NotificationKind::Meeting);
}

#[test]
fn owner_change_resets_state_until_notifications_load() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();
    let mut reconciler = Reconciler::new(repo, FixedClock::new(now()), ReminderConfig::default());

    reconciler.handle(SourceEvent::OwnerChanged(Some(OWNER.to_string())));
    reconciler.handle(SourceEvent::Notifications(FeedSnapshot::Ready(Vec::new())));
    reconciler.handle(SourceEvent::OwnerChanged(Some("owner-2".to_string())));

    assert_eq!(reconciler.owner_id(), Some("owner-2"));
    assert!(reconciler.notifications().is_none());
    let project = Project::new("p9", "owner-2", "p9", ProjectStatus::InProgress)
        .with_end_date(now() + DAY_MS);
    assert!(reconciler
        .handle(SourceEvent::Projects(FeedSnapshot::Ready(vec![project])))
        .is_none());
}

#[test]
fn run_drains_a_channel_feed_until_publishers_drop() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNotificationRepository::try_new(&conn).unwrap();
    let mut reconciler = Reconciler::new(repo, FixedClock::new(now()), ReminderConfig::default());
    let (publisher, subscription) = snapshot_feed();

    let producer = std::thread::spawn(move || {
        assert!(publisher.publish_owner(Some(OWNER.to_string())));
        assert!(publisher.publish_notifications(Vec::new()));
        assert!(publisher.publish_projects(vec![due_in("p1", DAY_MS), due_in("p2", 2 * DAY_MS)]));
    });
    producer.join().unwrap();

    let summary = reconciler.run(subscription);
    assert_eq!(summary.events, 3);
    assert_eq!(summary.created, 2);
    assert_eq!(repo.list_notifications(OWNER).unwrap().len(), 2);
}
