use leadcollab_core::{
    demo_directory, Actor, ActivityAction, ActivityDetails, CollabError, CollabService,
    InMemoryUserDirectory, LeadDraft, LeadId, LeadPatch, UserRef,
};

fn admin() -> Actor {
    Actor::new(1, "Admin User")
}

fn service_with_lead() -> (CollabService<InMemoryUserDirectory>, LeadId) {
    let service = CollabService::new(demo_directory()).unwrap();
    let lead = service
        .create_lead(&admin(), LeadDraft::new("John Doe", "john@example.com"))
        .unwrap();
    (service, lead.id)
}

fn watcher_ids(service: &CollabService<InMemoryUserDirectory>, lead_id: LeadId) -> Vec<i64> {
    service
        .list_watchers(lead_id)
        .unwrap()
        .into_iter()
        .map(|user| user.id)
        .collect()
}

#[test]
fn add_watcher_is_idempotent_and_logged_once() {
    let (service, lead_id) = service_with_lead();

    assert!(service.add_watcher(&admin(), lead_id, 3).unwrap());
    assert!(!service.add_watcher(&admin(), lead_id, 3).unwrap());

    assert_eq!(watcher_ids(&service, lead_id), vec![1, 3]);
    let added: Vec<_> = service
        .list_activities(lead_id)
        .unwrap()
        .into_iter()
        .filter(|a| a.action == ActivityAction::WatcherAdded)
        .collect();
    assert_eq!(added.len(), 1);
    assert_eq!(
        added[0].details,
        ActivityDetails::Watcher {
            watcher_name: "Ravi Singh".to_string()
        }
    );
    assert!(service.list_notifications(3).unwrap().is_empty());
}

#[test]
fn removing_non_watcher_changes_nothing() {
    let (service, lead_id) = service_with_lead();
    let before = service.list_activities(lead_id).unwrap();

    assert!(!service.remove_watcher(&admin(), lead_id, 2).unwrap());

    assert_eq!(watcher_ids(&service, lead_id), vec![1]);
    assert_eq!(service.list_activities(lead_id).unwrap(), before);
}

#[test]
fn removed_watcher_stops_receiving_updates() {
    let (service, lead_id) = service_with_lead();
    service.add_watcher(&admin(), lead_id, 2).unwrap();

    assert!(service.remove_watcher(&admin(), lead_id, 2).unwrap());
    service
        .update_lead(&admin(), lead_id, &LeadPatch::status("Contacted"))
        .unwrap();

    let latest = service.list_activities(lead_id).unwrap();
    assert_eq!(latest[1].action, ActivityAction::WatcherRemoved);
    assert_eq!(
        latest[1].details,
        ActivityDetails::Watcher {
            watcher_name: "Mohan Kumar".to_string()
        }
    );
    assert!(service.list_notifications(2).unwrap().is_empty());
}

#[test]
fn creator_can_unwatch_own_lead() {
    let (service, lead_id) = service_with_lead();
    service.add_watcher(&admin(), lead_id, 2).unwrap();
    service.remove_watcher(&admin(), lead_id, 1).unwrap();

    let update = service
        .update_lead(&Actor::new(2, "Mohan Kumar"), lead_id, &LeadPatch::status("Won"))
        .unwrap();

    assert!(update.notifications.is_empty());
    assert_eq!(watcher_ids(&service, lead_id), vec![2]);
}

#[test]
fn unknown_watcher_and_missing_lead_are_rejected() {
    let (service, lead_id) = service_with_lead();

    assert!(matches!(
        service.add_watcher(&admin(), lead_id, 99),
        Err(CollabError::PreconditionViolation(_))
    ));
    assert!(matches!(
        service.add_watcher(&admin(), 404, 2),
        Err(CollabError::NotFound { .. })
    ));
    assert!(matches!(
        service.list_watchers(404),
        Err(CollabError::NotFound { .. })
    ));
}

#[test]
fn removing_user_unknown_to_directory_is_a_noop() {
    let directory = InMemoryUserDirectory::from_users([
        UserRef::new(1, "admin", "Admin User"),
        UserRef::new(2, "mohan", "Mohan Kumar"),
    ])
    .unwrap();
    let service = CollabService::new(directory).unwrap();
    let lead = service
        .create_lead(&admin(), LeadDraft::new("John Doe", "john@example.com"))
        .unwrap();

    assert!(!service.remove_watcher(&admin(), lead.id, 7).unwrap());
    assert_eq!(service.list_activities(lead.id).unwrap().len(), 1);
}

#[test]
fn list_users_exposes_directory_for_autocomplete() {
    let (service, _) = service_with_lead();
    let handles: Vec<_> = service
        .list_users()
        .into_iter()
        .map(|user| user.username)
        .collect();
    assert_eq!(handles, vec!["admin", "mohan", "ravi"]);
}
