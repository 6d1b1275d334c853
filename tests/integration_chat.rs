mod common;

use common::TestApp;
use serde_json::Value;

#[tokio::test]
async fn test_both_directions_share_one_conversation() {
    let Some(app) = TestApp::spawn().await else { return };
    let run_id = common::run_id();

    let alice = app.signup(&format!("alice_{run_id}")).await;
    let bob = app.signup(&format!("bob_{run_id}")).await;
    let item_id = app.create_item(&alice.token, &format!("Calc textbook {run_id}"), "Books").await;

    let resp = app.send_message(&alice.token, item_id, bob.user_id, "hello").await;
    assert_eq!(resp.status(), 201);
    let first: Value = resp.json().await.unwrap();

    let resp = app.send_message(&bob.token, item_id, alice.user_id, "hi, still available?").await;
    assert_eq!(resp.status(), 201);
    let second: Value = resp.json().await.unwrap();

    let expected = common::expected_conversation_id(alice.user_id, bob.user_id, item_id);
    assert_eq!(first["conversationId"].as_str().unwrap(), expected);
    assert_eq!(second["conversationId"].as_str().unwrap(), expected);

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations WHERE id = $1")
        .bind(&expected)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);

    assert_eq!(app.get_conversations(&alice.token).await.len(), 1);
    assert_eq!(app.get_conversations(&bob.token).await.len(), 1);
}

#[tokio::test]
async fn test_concurrent_first_sends_create_one_conversation() {
    let Some(app) = TestApp::spawn().await else { return };
    let run_id = common::run_id();

    let alice = app.signup(&format!("ada_{run_id}")).await;
    let bob = app.signup(&format!("ben_{run_id}")).await;
    let item_id = app.create_item(&alice.token, &format!("Mini fridge {run_id}"), "Appliances").await;

    // Both sides race their first message, several times over.
    for i in 0..4 {
        let (from_alice, from_bob) = tokio::join!(
            app.send_message(&alice.token, item_id, bob.user_id, "is it free?"),
            app.send_message(&bob.token, item_id, alice.user_id, "ping"),
        );
        assert_eq!(from_alice.status(), 201, "send {i} from alice failed");
        assert_eq!(from_bob.status(), 201, "send {i} from bob failed");
    }

    let expected = common::expected_conversation_id(alice.user_id, bob.user_id, item_id);
    let conversations: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations WHERE id = $1")
        .bind(&expected)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(conversations.0, 1, "concurrent first-sends must not duplicate the conversation");

    let messages: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
        .bind(&expected)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(messages.0, 8);
}

#[tokio::test]
async fn test_transcript_order_and_read_marking() {
    let Some(app) = TestApp::spawn().await else { return };
    let run_id = common::run_id();

    let alice = app.signup(&format!("amy_{run_id}")).await;
    let bob = app.signup(&format!("bill_{run_id}")).await;
    let item_id = app.create_item(&alice.token, &format!("Kettle {run_id}"), "Kitchen").await;

    app.send_message(&alice.token, item_id, bob.user_id, "hello").await;
    app.send_message(&alice.token, item_id, bob.user_id, "are you there").await;

    // Bob views the thread: chronological, and flips Alice's messages to read.
    let transcript = app.get_messages(&bob.token, item_id, alice.user_id).await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0]["message"].as_str().unwrap(), "hello");
    assert_eq!(transcript[1]["message"].as_str().unwrap(), "are you there");
    assert!(transcript[0]["createdAt"].as_str().unwrap() <= transcript[1]["createdAt"].as_str().unwrap());
    assert!(transcript.iter().all(|m| m["senderName"].as_str().unwrap() == format!("amy_{run_id}")));

    // Second view: same transcript, everything read, no further change.
    let transcript = app.get_messages(&bob.token, item_id, alice.user_id).await;
    assert_eq!(transcript.len(), 2);
    assert!(transcript.iter().all(|m| m["read"].as_bool().unwrap()));

    let again = app.get_messages(&bob.token, item_id, alice.user_id).await;
    assert_eq!(again, transcript, "re-listing with no new messages must be a no-op");

    // Alice's own messages were read by Bob, not by her viewing; her unread
    // count for the thread stays 0.
    let summaries = app.get_conversations(&alice.token).await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["unreadCount"].as_i64().unwrap(), 0);
}

#[tokio::test]
async fn test_reader_does_not_mark_own_messages() {
    let Some(app) = TestApp::spawn().await else { return };
    let run_id = common::run_id();

    let alice = app.signup(&format!("ana_{run_id}")).await;
    let bob = app.signup(&format!("bart_{run_id}")).await;
    let item_id = app.create_item(&alice.token, &format!("Monitor {run_id}"), "Electronics").await;

    app.send_message(&alice.token, item_id, bob.user_id, "want it?").await;

    // Alice re-reads her own thread; her message stays unread for Bob.
    let transcript = app.get_messages(&alice.token, item_id, bob.user_id).await;
    assert_eq!(transcript.len(), 1);

    let summaries = app.get_conversations(&bob.token).await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["unreadCount"].as_i64().unwrap(), 1);
}

#[tokio::test]
async fn test_conversation_summaries() {
    let Some(app) = TestApp::spawn().await else { return };
    let run_id = common::run_id();

    let alice = app.signup(&format!("alma_{run_id}")).await;
    let bob = app.signup(&format!("bruno_{run_id}")).await;
    let item_id = app.create_item(&alice.token, &format!("Skateboard {run_id}"), "Sports").await;

    app.send_message(&bob.token, item_id, alice.user_id, "first").await;
    app.send_message(&bob.token, item_id, alice.user_id, "second").await;
    app.send_message(&bob.token, item_id, alice.user_id, "third").await;

    let summaries = app.get_conversations(&alice.token).await;
    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary["conversationId"].as_str().unwrap(), common::expected_conversation_id(alice.user_id, bob.user_id, item_id));
    assert_eq!(summary["item"]["id"].as_str().unwrap(), item_id.to_string());
    assert_eq!(summary["item"]["title"].as_str().unwrap(), format!("Skateboard {run_id}"));
    assert_eq!(summary["otherUser"]["id"].as_str().unwrap(), bob.user_id.to_string());
    assert_eq!(summary["lastMessage"].as_str().unwrap(), "third");
    assert_eq!(summary["unreadCount"].as_i64().unwrap(), 3);

    // Reading resets the count; a new message bumps it again.
    app.get_messages(&alice.token, item_id, bob.user_id).await;
    let summaries = app.get_conversations(&alice.token).await;
    assert_eq!(summaries[0]["unreadCount"].as_i64().unwrap(), 0);

    app.send_message(&bob.token, item_id, alice.user_id, "fourth").await;
    let summaries = app.get_conversations(&alice.token).await;
    assert_eq!(summaries[0]["unreadCount"].as_i64().unwrap(), 1);
    assert_eq!(summaries[0]["lastMessage"].as_str().unwrap(), "fourth");
}

#[tokio::test]
async fn test_summaries_order_by_latest_activity() {
    let Some(app) = TestApp::spawn().await else { return };
    let run_id = common::run_id();

    let alice = app.signup(&format!("avery_{run_id}")).await;
    let bob = app.signup(&format!("blair_{run_id}")).await;
    let carol = app.signup(&format!("cleo_{run_id}")).await;
    let first_item = app.create_item(&alice.token, &format!("Tent {run_id}"), "Outdoors").await;
    let second_item = app.create_item(&alice.token, &format!("Stove {run_id}"), "Outdoors").await;

    app.send_message(&bob.token, first_item, alice.user_id, "tent?").await;
    app.send_message(&carol.token, second_item, alice.user_id, "stove?").await;

    let summaries = app.get_conversations(&alice.token).await;
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0]["item"]["id"].as_str().unwrap(), second_item.to_string());

    // Activity in the older thread moves it back to the top.
    app.send_message(&bob.token, first_item, alice.user_id, "still want the tent").await;
    let summaries = app.get_conversations(&alice.token).await;
    assert_eq!(summaries[0]["item"]["id"].as_str().unwrap(), first_item.to_string());
}

#[tokio::test]
async fn test_summaries_only_contain_own_threads() {
    let Some(app) = TestApp::spawn().await else { return };
    let run_id = common::run_id();

    let alice = app.signup(&format!("asha_{run_id}")).await;
    let bob = app.signup(&format!("badr_{run_id}")).await;
    let outsider = app.signup(&format!("oscar_{run_id}")).await;
    let item_id = app.create_item(&alice.token, &format!("Router {run_id}"), "Electronics").await;

    app.send_message(&alice.token, item_id, bob.user_id, "yours if you want it").await;

    assert_eq!(app.get_conversations(&outsider.token).await.len(), 0);
}

#[tokio::test]
async fn test_summaries_skip_vanished_items() {
    let Some(app) = TestApp::spawn().await else { return };
    let run_id = common::run_id();

    let alice = app.signup(&format!("ava_{run_id}")).await;
    let bob = app.signup(&format!("boris_{run_id}")).await;
    let item_id = app.create_item(&alice.token, &format!("Heater {run_id}"), "Appliances").await;

    app.send_message(&bob.token, item_id, alice.user_id, "heater?").await;
    assert_eq!(app.get_conversations(&alice.token).await.len(), 1);

    // The item disappears out of band; the listing tolerates it.
    sqlx::query("DELETE FROM items WHERE id = $1").bind(item_id).execute(&app.pool).await.unwrap();

    assert_eq!(app.get_conversations(&alice.token).await.len(), 0);
}

#[tokio::test]
async fn test_summaries_skip_vanished_counterpart() {
    let Some(app) = TestApp::spawn().await else { return };
    let run_id = common::run_id();

    let alice = app.signup(&format!("aida_{run_id}")).await;
    let bob = app.signup(&format!("basil_{run_id}")).await;
    let item_id = app.create_item(&alice.token, &format!("Scanner {run_id}"), "Electronics").await;

    app.send_message(&bob.token, item_id, alice.user_id, "scanner free?").await;
    assert_eq!(app.get_conversations(&alice.token).await.len(), 1);

    // The counterpart disappears out of band; the listing tolerates it.
    sqlx::query("DELETE FROM users WHERE id = $1").bind(bob.user_id).execute(&app.pool).await.unwrap();

    assert_eq!(app.get_conversations(&alice.token).await.len(), 0);
}

#[tokio::test]
async fn test_send_from_vanished_sender_is_unauthorized() {
    let Some(app) = TestApp::spawn().await else { return };
    let run_id = common::run_id();

    let alice = app.signup(&format!("alba_{run_id}")).await;
    let bob = app.signup(&format!("bjorn_{run_id}")).await;
    let item_id = app.create_item(&alice.token, &format!("Printer {run_id}"), "Electronics").await;

    // The sender's account disappears while its token is still valid; the
    // name snapshot has nothing to snapshot.
    sqlx::query("DELETE FROM users WHERE id = $1").bind(bob.user_id).execute(&app.pool).await.unwrap();

    let resp = app.send_message(&bob.token, item_id, alice.user_id, "still selling?").await;
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_self_message_is_rejected() {
    let Some(app) = TestApp::spawn().await else { return };
    let run_id = common::run_id();

    let alice = app.signup(&format!("aditi_{run_id}")).await;
    let item_id = app.create_item(&alice.token, &format!("Mirror {run_id}"), "Furniture").await;

    let resp = app.send_message(&alice.token, item_id, alice.user_id, "note to self").await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_chat_requires_token() {
    let Some(app) = TestApp::spawn().await else { return };

    let resp = app
        .client
        .get(format!("{}/api/conversations", app.server_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
