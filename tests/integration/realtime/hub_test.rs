//! Hub scenarios driven through `handle_frame` with in-memory collaborators

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use timeplanner::backend::realtime::connection::{channel, ConnectionReceiver};
use timeplanner::backend::realtime::{ConnectionId, RealtimeHub};
use timeplanner::shared::{ClientFrame, Domain, EventType, Identity, Role, ServerFrame, UserId};

use crate::common::{test_tokens, MemoryDomain};

fn hub_with_capacity(capacity: usize) -> (RealtimeHub, Arc<MemoryDomain>) {
    let domain = Arc::new(MemoryDomain::default());
    (RealtimeHub::new(test_tokens(), domain.clone(), capacity), domain)
}

fn join(hub: &RealtimeHub, user_id: UserId) -> (ConnectionId, ConnectionReceiver) {
    let (tx, rx) = channel();
    (hub.connect(Identity::new(user_id, Role::User), tx), rx)
}

fn drain(rx: &mut ConnectionReceiver) -> Vec<ServerFrame> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}

#[tokio::test]
async fn test_task_create_broadcasts_records_and_notifies() {
    let (hub, domain) = hub_with_capacity(500);
    let (seven, mut rx_seven) = join(&hub, 7);
    let (_eight, mut rx_eight) = join(&hub, 8);
    drain(&mut rx_seven);
    drain(&mut rx_eight);

    hub.handle_frame(seven, ClientFrame::new("task:create", json!({ "title": "X" })))
        .await;

    let frames = drain(&mut rx_seven);
    let events: Vec<&str> = frames.iter().map(|f| f.event.as_str()).collect();
    assert_eq!(events, vec!["task:created", "notification:new"]);
    assert_eq!(frames[0].data["title"], "X");
    assert_eq!(frames[1].data["userId"], 7);
    assert_eq!(frames[1].data["type"], "TASK_CREATED");

    let others = drain(&mut rx_eight);
    assert_eq!(others.len(), 1);
    assert_eq!(others[0].event, "task:created");

    let history = hub.events_since(0);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].event_type, EventType::created(Domain::Task));
    assert_eq!(domain.rows_of(Domain::Notification).len(), 1);
}

#[tokio::test]
async fn test_multi_device_presence() {
    let (hub, _) = hub_with_capacity(10);
    let (observer, mut rx_observer) = join(&hub, 1);
    drain(&mut rx_observer);

    let (phone, _rx_phone) = join(&hub, 2);
    let (laptop, _rx_laptop) = join(&hub, 2);
    assert_eq!(drain(&mut rx_observer), vec![ServerFrame::status_changed(2, true)]);
    assert!(hub.is_online(2));
    assert_eq!(hub.online_users(), vec![1, 2]);

    hub.disconnect(phone);
    assert!(hub.is_online(2));
    assert!(drain(&mut rx_observer).is_empty());

    hub.disconnect(laptop);
    assert!(!hub.is_online(2));
    assert_eq!(drain(&mut rx_observer), vec![ServerFrame::status_changed(2, false)]);

    hub.disconnect(laptop);
    assert!(drain(&mut rx_observer).is_empty());
    assert_eq!(hub.connection_count(), 1);
    let _ = observer;
}

#[tokio::test]
async fn test_replay_after_eviction_returns_survivors() {
    let (hub, _) = hub_with_capacity(3);
    let actor = Identity::new(1, Role::User);

    let mut stamps = Vec::new();
    for n in 0..5 {
        let event = hub
            .commit(EventType::updated(Domain::Task), json!({ "id": n }), &actor)
            .await;
        stamps.push(event.timestamp);
    }
    assert_eq!(hub.history_len(), 3);

    let (id, mut rx) = join(&hub, 1);
    drain(&mut rx);
    hub.handle_frame(id, ClientFrame::new("sync:events", json!(0))).await;

    let frames = drain(&mut rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].event, "sync:events");
    let ids: Vec<i64> = frames[0]
        .data
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["payload"]["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 3, 4]);
}

#[tokio::test]
async fn test_unauthenticated_handshake_refused() {
    let (hub, _) = hub_with_capacity(10);

    assert!(hub.authenticate(None).is_err());
    assert!(hub.authenticate(Some("garbage")).is_err());

    let refresh = test_tokens().issue_refresh(3).unwrap();
    assert!(hub.authenticate(Some(refresh.as_str())).is_err());

    let access = test_tokens().issue_access(&Identity::new(3, Role::User)).unwrap();
    assert_eq!(hub.authenticate(Some(access.as_str())).unwrap().user_id, 3);
    assert_eq!(hub.connection_count(), 0);
}

#[tokio::test]
async fn test_foreign_update_is_scoped_error() {
    let (hub, _) = hub_with_capacity(10);
    let (owner, mut rx_owner) = join(&hub, 1);
    let (intruder, mut rx_intruder) = join(&hub, 2);

    hub.handle_frame(owner, ClientFrame::new("task:create", json!({ "title": "Mine" })))
        .await;
    let id = hub.events_since(0)[0].payload["id"].clone();
    drain(&mut rx_owner);
    drain(&mut rx_intruder);

    hub.handle_frame(intruder, ClientFrame::new("task:update", json!({ "id": id, "title": "Yours" })))
        .await;

    let frames = drain(&mut rx_intruder);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].event, "task:error");
    assert!(drain(&mut rx_owner).is_empty());
    assert_eq!(hub.history_len(), 1);
}
