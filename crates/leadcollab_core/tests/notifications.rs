use leadcollab_core::{
    demo_directory, Actor, CollabError, CollabService, EntityKind, InMemoryUserDirectory,
    LeadDraft, LeadId, LeadPatch, NotificationKind,
};

fn admin() -> Actor {
    Actor::new(1, "Admin User")
}

fn seeded() -> (CollabService<InMemoryUserDirectory>, LeadId) {
    let service = CollabService::new(demo_directory()).unwrap();
    let lead = service
        .create_lead(&admin(), LeadDraft::new("John Doe", "john@example.com"))
        .unwrap();
    service.add_watcher(&admin(), lead.id, 2).unwrap();
    service.add_watcher(&admin(), lead.id, 3).unwrap();
    (service, lead.id)
}

#[test]
fn fanout_reaches_every_watcher_except_actor() {
    let (service, lead_id) = seeded();

    let update = service
        .update_lead(&admin(), lead_id, &LeadPatch::status("Qualified"))
        .unwrap();

    let recipients: Vec<_> = update.notifications.iter().map(|n| n.user_id).collect();
    assert_eq!(recipients, vec![2, 3]);
    assert!(update.notifications.iter().all(|n| !n.read));
    assert_eq!(service.unread_count(1).unwrap(), 0);
    assert_eq!(service.unread_count(2).unwrap(), 1);
    assert_eq!(service.unread_count(3).unwrap(), 1);
}

#[test]
fn inbox_is_newest_first_with_lead_name() {
    let (service, lead_id) = seeded();
    service
        .update_lead(&admin(), lead_id, &LeadPatch::status("Qualified"))
        .unwrap();
    service
        .add_note(&admin(), lead_id, "call scheduled @mohan")
        .unwrap();

    let inbox = service.list_notifications(2).unwrap();
    let kinds: Vec<_> = inbox.iter().map(|n| n.notification.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::WatcherUpdate,
            NotificationKind::Mention,
            NotificationKind::WatcherUpdate,
        ]
    );
    assert!(inbox
        .iter()
        .all(|n| n.lead_name.as_deref() == Some("John Doe")));
    assert!(inbox.windows(2).all(|pair| {
        (pair[0].notification.created_at, pair[0].notification.id)
            > (pair[1].notification.created_at, pair[1].notification.id)
    }));
}

#[test]
fn inbox_serializes_with_type_field() {
    let (service, lead_id) = seeded();
    service
        .update_lead(&admin(), lead_id, &LeadPatch::status("Qualified"))
        .unwrap();

    let inbox = service.list_notifications(2).unwrap();
    let json = serde_json::to_value(&inbox[0]).unwrap();
    assert_eq!(json["type"], "watcher_update");
    assert_eq!(json["lead_name"], "John Doe");
    assert_eq!(json["read"], false);
}

#[test]
fn mark_read_is_scoped_to_recipient() {
    let (service, lead_id) = seeded();
    let update = service
        .update_lead(&admin(), lead_id, &LeadPatch::status("Qualified"))
        .unwrap();
    let for_mohan = update.notifications[0].id;

    assert!(matches!(
        service.mark_notification_read(3, for_mohan),
        Err(CollabError::NotFound {
            entity: EntityKind::Notification,
            ..
        })
    ));
    let marked = service.mark_notification_read(2, for_mohan).unwrap();
    assert!(marked.read);
    assert_eq!(service.unread_count(2).unwrap(), 0);
    assert!(service.mark_notification_read(2, for_mohan).unwrap().read);
}

#[test]
fn mark_all_read_sets_every_flag_and_reports_unread_count() {
    let (service, lead_id) = seeded();
    service
        .update_lead(&admin(), lead_id, &LeadPatch::status("Qualified"))
        .unwrap();
    service.add_note(&admin(), lead_id, "@mohan see").unwrap();
    let first = service.list_notifications(2).unwrap()[0].notification.id;
    service.mark_notification_read(2, first).unwrap();

    assert_eq!(service.mark_all_notifications_read(2).unwrap(), 2);
    assert_eq!(service.unread_count(2).unwrap(), 0);
    assert!(service
        .list_notifications(2)
        .unwrap()
        .iter()
        .all(|n| n.notification.read));
    assert_eq!(service.mark_all_notifications_read(2).unwrap(), 0);
    assert_eq!(service.unread_count(3).unwrap(), 2);
}
