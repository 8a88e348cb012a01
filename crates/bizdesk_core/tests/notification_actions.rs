use bizdesk_core::{NotificationKind, NotifyRequest, Priority, ReminderConfig, Session};
use rusqlite::params;
use uuid::Uuid;

const OWNER: &str = "owner-1";

fn request(title: &str) -> NotifyRequest {
    NotifyRequest {
        kind: NotificationKind::Info,
        title: title.to_string(),
        message: "body".to_string(),
        priority: Priority::Low,
        related_id: None,
    }
}

#[test]
fn mark_all_as_read_turns_every_notification_read() {
    let session = Session::open_in_memory(OWNER, ReminderConfig::default()).unwrap();
    let service = session.notifications().unwrap();
    let ids = ["a", "b", "c", "d"]
        .iter()
        .map(|title| service.notify(request(title)).unwrap().id)
        .collect::<Vec<_>>();
    service.mark_as_read(ids[0]);

    assert_eq!(service.unread_count(), 3);
    assert_eq!(service.mark_all_as_read(), 3);
    assert_eq!(service.unread_count(), 0);
    let listed = service.list();
    assert_eq!(listed.len(), 4);
    assert!(listed.iter().all(|n| n.read));

    assert_eq!(service.mark_all_as_read(), 0);
}

#[test]
fn mark_as_read_is_idempotent() {
    let session = Session::open_in_memory(OWNER, ReminderConfig::default()).unwrap();
    let service = session.notifications().unwrap();
    let created = service.notify(request("one")).unwrap();

    service.mark_as_read(created.id);
    service.mark_as_read(created.id);
    service.mark_as_read(Uuid::new_v4());

    assert_eq!(service.unread_count(), 0);
    assert!(service.list()[0].read);
}

#[test]
fn dismiss_removes_exactly_one_and_ignores_missing_ids() {
    let session = Session::open_in_memory(OWNER, ReminderConfig::default()).unwrap();
    let service = session.notifications().unwrap();
    let first = service.notify(request("one")).unwrap();
    service.notify(request("two")).unwrap();
    service.notify(request("three")).unwrap();

    service.dismiss(first.id);
    assert_eq!(service.list().len(), 2);
    assert!(service.list().iter().all(|n| n.id != first.id));

    service.dismiss(first.id);
    service.dismiss(Uuid::new_v4());
    assert_eq!(service.list().len(), 2);
}

#[test]
fn list_orders_by_timestamp_descending() {
    let session = Session::open_in_memory(OWNER, ReminderConfig::default()).unwrap();
    let service = session.notifications().unwrap();
    let t1 = service.notify(request("t1")).unwrap();
    let t2 = service.notify(request("t2")).unwrap();
    let t3 = service.notify(request("t3")).unwrap();
    for (stamp, id) in [(100_i64, t3.id), (300, t1.id), (200, t2.id)] {
        session
            .connection()
            .execute(
                "UPDATE notifications SET created_at = ?1 WHERE id = ?2;",
                params![stamp, id.to_string()],
            )
            .unwrap();
    }

    let titles = service
        .list()
        .into_iter()
        .map(|n| n.title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["t1", "t2", "t3"]);
}

#[test]
fn notifications_are_scoped_to_session_owner() {
    let session = Session::open_in_memory(OWNER, ReminderConfig::default()).unwrap();
    let service = session.notifications().unwrap();
    let created = service.notify(request("mine")).unwrap();

    session
        .connection()
        .execute(
            "UPDATE notifications SET owner_id = 'owner-2' WHERE id = ?1;",
            [created.id.to_string()],
        )
        .unwrap();

    assert!(service.list().is_empty());
    service.dismiss(created.id);
    let remaining: i64 = session
        .connection()
        .query_row("SELECT COUNT(*) FROM notifications;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 1);
}
