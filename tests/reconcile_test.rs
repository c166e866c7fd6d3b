mod common;

use common::{
    MockHttpClient, Scripted, ScriptedTransportFactory, admin_params, eventually, make_client,
};
use inboxcore::net::TransportEvent;
use sakura_inbox::client::SyncClient;
use std::sync::Arc;

fn user_with_chat(user_id: &str, name: &str, chat_id: &str, message_count: usize) -> String {
    let messages: Vec<String> = (0..message_count)
        .map(|i| {
            format!(
                r#"{{"role": "user", "text": "msg {i}", "timestamp": "2026-08-01T10:00:0{i}Z", "read": true}}"#
            )
        })
        .collect();
    format!(
        r#"{{"_id": "{user_id}", "name": "{name}", "email": "{user_id}@example.com",
            "chats": [{{"chat_id": "{chat_id}", "status": "active", "messages": [{}]}}]}}"#,
        messages.join(",")
    )
}

fn users_body(users: &[String]) -> String {
    format!(r#"{{"users": [{}]}}"#, users.join(","))
}

fn snapshot_frame(users: &[String]) -> String {
    format!(
        r#"{{"type": "chat_updates", "data": {{"users": [{}]}}}}"#,
        users.join(",")
    )
}

async fn selected_id(client: &Arc<SyncClient>) -> Option<String> {
    client.snapshot().await.selected
}

#[tokio::test]
async fn connect_subscribes_to_chat_updates() {
    let http = MockHttpClient::new(vec![]);
    let (factory, events) = ScriptedTransportFactory::new();
    let transport = factory.transport.clone();
    let client = make_client(http, factory, admin_params("unified-inbox"));

    let handle = tokio::spawn(client.clone().run());
    events.send(TransportEvent::Connected).await.unwrap();

    assert!(
        eventually(move || {
            let transport = transport.clone();
            async move {
                transport
                    .sent
                    .lock()
                    .unwrap()
                    .iter()
                    .any(|frame| frame.contains(r#""subscription_type":"chat_updates""#))
            }
        })
        .await
    );
    assert!(client.is_connected());

    client.shutdown().await;
    handle.await.unwrap();
}

#[tokio::test]
async fn snapshot_keeps_selection_when_chat_survives() {
    let maya = user_with_chat("u1", "Maya", "c1", 1);
    let noor = user_with_chat("u2", "Noor", "c2", 1);
    let http = MockHttpClient::new(vec![Scripted::ok(&users_body(&[
        maya.clone(),
        noor.clone(),
    ]))]);
    let (factory, events) = ScriptedTransportFactory::new();
    let client = make_client(http, factory, admin_params("unified-inbox"));

    client.load_chats().await;
    client.select_chat("c2").await;
    assert_eq!(selected_id(&client).await.as_deref(), Some("c2"));

    let handle = tokio::spawn(client.clone().run());
    events.send(TransportEvent::Connected).await.unwrap();

    // c1 disappears, c2 gains a message, c3 is new: selection must stay c2
    // with refreshed content.
    let noor_updated = user_with_chat("u2", "Noor", "c2", 3);
    let omar = user_with_chat("u3", "Omar", "c3", 1);
    events
        .send(TransportEvent::MessageReceived(snapshot_frame(&[
            noor_updated,
            omar,
        ])))
        .await
        .unwrap();

    let probe = client.clone();
    assert!(
        eventually(move || {
            let client = probe.clone();
            async move {
                let state = client.snapshot().await;
                state.chats.len() == 2
                    && state.selected.as_deref() == Some("c2")
                    && state
                        .selected_chat()
                        .is_some_and(|chat| chat.messages.len() == 3)
            }
        })
        .await
    );

    client.shutdown().await;
    handle.await.unwrap();
}

#[tokio::test]
async fn snapshot_falls_back_to_first_when_selection_vanishes() {
    let maya = user_with_chat("u1", "Maya", "c1", 1);
    let noor = user_with_chat("u2", "Noor", "c2", 1);
    let http = MockHttpClient::new(vec![Scripted::ok(&users_body(&[maya.clone(), noor]))]);
    let (factory, events) = ScriptedTransportFactory::new();
    let client = make_client(http, factory, admin_params("unified-inbox"));

    client.load_chats().await;
    client.select_chat("c2").await;

    let handle = tokio::spawn(client.clone().run());
    events.send(TransportEvent::Connected).await.unwrap();
    events
        .send(TransportEvent::MessageReceived(snapshot_frame(&[maya])))
        .await
        .unwrap();

    let probe = client.clone();
    assert!(
        eventually(move || {
            let client = probe.clone();
            async move { client.snapshot().await.selected.as_deref() == Some("c1") }
        })
        .await
    );

    // An empty snapshot clears the selection entirely.
    events
        .send(TransportEvent::MessageReceived(snapshot_frame(&[])))
        .await
        .unwrap();
    let probe = client.clone();
    assert!(
        eventually(move || {
            let client = probe.clone();
            async move {
                let state = client.snapshot().await;
                state.chats.is_empty() && state.selected.is_none()
            }
        })
        .await
    );

    client.shutdown().await;
    handle.await.unwrap();
}

#[tokio::test]
async fn notification_triggers_a_full_refetch() {
    let before = users_body(&[user_with_chat("u1", "Maya", "c1", 1)]);
    let after = users_body(&[
        user_with_chat("u1", "Maya", "c1", 2),
        user_with_chat("u2", "Noor", "c2", 1),
    ]);
    let http = MockHttpClient::new(vec![Scripted::ok(&before), Scripted::ok(&after)]);
    let (factory, events) = ScriptedTransportFactory::new();
    let client = make_client(http.clone(), factory, admin_params("unified-inbox"));

    client.load_chats().await;
    assert_eq!(client.snapshot().await.chats.len(), 1);

    let handle = tokio::spawn(client.clone().run());
    events.send(TransportEvent::Connected).await.unwrap();
    events
        .send(TransportEvent::MessageReceived(
            r#"{"type": "chat_updates", "data": {"type": "chat_message_notification", "chat_id": "c2", "message_role": "user", "timestamp": "2026-08-01T11:00:00Z"}}"#
                .to_string(),
        ))
        .await
        .unwrap();

    let probe = client.clone();
    assert!(
        eventually(move || {
            let client = probe.clone();
            async move { client.snapshot().await.chats.len() == 2 }
        })
        .await
    );
    assert_eq!(http.request_count(), 2);

    client.shutdown().await;
    handle.await.unwrap();
}

#[tokio::test]
async fn unknown_and_malformed_frames_are_ignored() {
    let body = users_body(&[user_with_chat("u1", "Maya", "c1", 1)]);
    let http = MockHttpClient::new(vec![Scripted::ok(&body)]);
    let (factory, events) = ScriptedTransportFactory::new();
    let client = make_client(http.clone(), factory, admin_params("unified-inbox"));

    client.load_chats().await;

    let handle = tokio::spawn(client.clone().run());
    events.send(TransportEvent::Connected).await.unwrap();
    for frame in [
        "not json at all",
        r#"{"type": "connected", "connection_id": "abc"}"#,
        r#"{"type": "subscribed", "subscription_type": "chat_updates"}"#,
        r#"{"type": "pong"}"#,
        r#"{"type": "website_status", "data": {"up": true}}"#,
    ] {
        events
            .send(TransportEvent::MessageReceived(frame.to_string()))
            .await
            .unwrap();
    }

    // The loop must still be processing frames afterwards.
    events
        .send(TransportEvent::MessageReceived(snapshot_frame(&[
            user_with_chat("u1", "Maya", "c1", 2),
        ])))
        .await
        .unwrap();
    let probe = client.clone();
    assert!(
        eventually(move || {
            let client = probe.clone();
            async move {
                let state = client.snapshot().await;
                state.chats.len() == 1 && state.chats[0].messages.len() == 2
            }
        })
        .await
    );
    // None of the noise frames caused a refetch.
    assert_eq!(http.request_count(), 1);
    assert!(client.snapshot().await.error.is_none());

    client.shutdown().await;
    handle.await.unwrap();
}
