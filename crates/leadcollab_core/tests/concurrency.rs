use leadcollab_core::{demo_directory, Actor, CollabService, LeadDraft, LeadPatch};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

const THREADS: i64 = 8;
const LEADS_PER_THREAD: i64 = 25;

#[test]
fn concurrent_creates_get_distinct_ids() {
    let service = Arc::new(CollabService::new(demo_directory()).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let actor = Actor::new(worker % 3 + 1, format!("worker-{worker}"));
                (0..LEADS_PER_THREAD)
                    .map(|n| {
                        service
                            .create_lead(
                                &actor,
                                LeadDraft::new(format!("lead {worker}-{n}"), "x@example.com"),
                            )
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "duplicate lead id {id}");
        }
    }
    assert_eq!(ids.len() as i64, THREADS * LEADS_PER_THREAD);
    assert_eq!(service.list_leads().unwrap().len() as i64, THREADS * LEADS_PER_THREAD);
}

#[test]
fn concurrent_updates_never_notify_their_actor() {
    let service = Arc::new(CollabService::new(demo_directory()).unwrap());
    let admin = Actor::new(1, "Admin User");
    let lead = service
        .create_lead(&admin, LeadDraft::new("Shared", "shared@example.com"))
        .unwrap();
    service.add_watcher(&admin, lead.id, 2).unwrap();
    service.add_watcher(&admin, lead.id, 3).unwrap();

    let handles: Vec<_> = (1..=3)
        .map(|user_id| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let actor = Actor::new(user_id, format!("user {user_id}"));
                for round in 0..10 {
                    service
                        .update_lead(
                            &actor,
                            lead.id,
                            &LeadPatch::status(format!("u{user_id}-r{round}")),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for user_id in 1..=3 {
        let inbox = service.list_notifications(user_id).unwrap();
        assert_eq!(inbox.len(), 20);
        assert!(inbox
            .iter()
            .all(|n| !n.notification.message.contains(&format!("to u{user_id}-"))));
    }
    assert_eq!(service.list_activities(lead.id).unwrap().len(), 3 + 30);
}
