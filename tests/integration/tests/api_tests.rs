//! API Integration Tests
//!
//! Each test starts its own server on an ephemeral port backed by in-memory
//! storage. The PostgreSQL smoke test runs only when DATABASE_URL is set.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use std::time::Duration;

use integration_tests::{
    assert_json, assert_status, fixtures::*, TestServer, TestUser, TEST_TYPING_WINDOW_MS,
};
use reqwest::StatusCode;

async fn open_conversation(server: &TestServer, caller: &TestUser, other: &TestUser) -> String {
    let response = server
        .post_auth(
            "/api/v1/dms",
            &caller.token,
            &OpenConversation {
                username: &other.username,
            },
        )
        .await
        .unwrap();
    let body: Data<ConversationCreated> = assert_json(response, StatusCode::OK).await.unwrap();
    body.data.conversation_id
}

async fn typing_seen_by(server: &TestServer, viewer: &TestUser, conversation: &str) -> Vec<String> {
    let response = server
        .get_auth(&format!("/api/v1/dms/{conversation}/typing"), &viewer.token)
        .await
        .unwrap();
    let body: Data<TypingUsersBody> = assert_json(response, StatusCode::OK).await.unwrap();
    body.data.usernames
}

async fn arm_typing(server: &TestServer, user: &TestUser, conversation: &str) -> TypingBody {
    let response = server
        .post_empty_auth(&format!("/api/v1/dms/{conversation}/typing"), &user.token)
        .await
        .unwrap();
    let body: Data<TypingBody> = assert_json(response, StatusCode::OK).await.unwrap();
    body.data
}

fn window() -> Duration {
    Duration::from_millis(TEST_TYPING_WINDOW_MS as u64)
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Identity Tests
// ============================================================================

#[tokio::test]
async fn test_webhook_sync_and_current_user() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();

    let response = server.get_auth("/api/v1/users/@me", &alice.token).await.unwrap();
    let me: Data<UserBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.data.id, alice.id);
    assert_eq!(me.data.username, alice.username);

    // Profile update keeps the id
    let update = SyncUser {
        external_id: alice.external_id.clone(),
        username: format!("{}_new", alice.username),
        image: Some("https://img.example.com/a.png".to_string()),
    };
    let response = server.post_webhook("/api/v1/webhooks/users", &update).await.unwrap();
    let updated: Data<UserBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(updated.data.id, alice.id);
    assert_eq!(updated.data.image.as_deref(), Some("https://img.example.com/a.png"));

    let response = server
        .get_auth(
            &format!("/api/v1/users/by-username/{}", update.username),
            &alice.token,
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_unknown_or_missing_identity_rejected() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/api/v1/users/@me").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .get_auth("/api/v1/users/@me", "not-a-token")
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    // Valid token, but the subject was never synced
    let token = server.token_for("idp|ghost").unwrap();
    let response = server.get_auth("/api/v1/users/@me", &token).await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body.error.code, "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_webhook_secret_and_removal() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .client
        .post(server.url("/api/v1/webhooks/users"))
        .header("x-webhook-secret", "wrong")
        .json(&SyncUser::named("mallory"))
        .send()
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let bob = server.create_user("bob").await.unwrap();
    let response = server
        .delete_webhook(&format!("/api/v1/webhooks/users/{}", bob.external_id))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_auth("/api/v1/users/@me", &bob.token).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    // Removing again is a no-op
    let response = server
        .delete_webhook(&format!("/api/v1/webhooks/users/{}", bob.external_id))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
}

// ============================================================================
// Conversation Tests
// ============================================================================

#[tokio::test]
async fn test_open_conversation_is_idempotent_both_ways() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();
    let bob = server.create_user("bob").await.unwrap();

    let first = open_conversation(&server, &alice, &bob).await;
    let again = open_conversation(&server, &alice, &bob).await;
    let reverse = open_conversation(&server, &bob, &alice).await;
    assert_eq!(first, again);
    assert_eq!(first, reverse);

    let response = server.get_auth("/api/v1/dms", &alice.token).await.unwrap();
    let listed: Data<Vec<ConversationBody>> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(listed.data.len(), 1);
    assert_eq!(listed.data[0].id, first);
    assert_eq!(
        listed.data[0].other_user.as_ref().map(|u| u.username.as_str()),
        Some(bob.username.as_str())
    );
}

#[tokio::test]
async fn test_concurrent_opens_share_conversation() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();
    let bob = server.create_user("bob").await.unwrap();

    let (a, b) = tokio::join!(
        open_conversation(&server, &alice, &bob),
        open_conversation(&server, &bob, &alice)
    );
    assert_eq!(a, b);

    let response = server.get_auth("/api/v1/dms", &bob.token).await.unwrap();
    let listed: Data<Vec<ConversationBody>> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(listed.data.len(), 1);
}

#[tokio::test]
async fn test_open_conversation_errors() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/dms",
            &alice.token,
            &OpenConversation {
                username: "nobody-here",
            },
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body.error.code, "UNKNOWN_USER");

    let response = server
        .post_auth(
            "/api/v1/dms",
            &alice.token,
            &OpenConversation {
                username: &alice.username,
            },
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "CANNOT_MESSAGE_SELF");
}

#[tokio::test]
async fn test_outsider_cannot_read_conversation() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();
    let bob = server.create_user("bob").await.unwrap();
    let carol = server.create_user("carol").await.unwrap();
    let conversation = open_conversation(&server, &alice, &bob).await;

    let response = server
        .get_auth(&format!("/api/v1/dms/{conversation}"), &carol.token)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "NOT_PARTICIPANT");

    let response = server
        .get_auth(&format!("/api/v1/dms/{conversation}/messages"), &carol.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .get_auth("/api/v1/dms/not-an-id", &alice.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Message Tests
// ============================================================================

#[tokio::test]
async fn test_send_list_delete_messages() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();
    let bob = server.create_user("bob").await.unwrap();
    let conversation = open_conversation(&server, &alice, &bob).await;
    let path = format!("/api/v1/dms/{conversation}/messages");

    let response = server
        .post_auth(
            &path,
            &alice.token,
            &NewMessage {
                content: "hello",
                attachment: None,
            },
        )
        .await
        .unwrap();
    let first: Data<MessageBody> = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(first.data.sender_id, alice.id);
    assert_eq!(first.data.conversation_id, conversation);

    let response = server
        .post_auth(
            &path,
            &bob.token,
            &NewMessage {
                content: "look",
                attachment: Some("uploads/photo.png"),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = server.get_auth(&path, &bob.token).await.unwrap();
    let listed: Data<Vec<MessageBody>> = assert_json(response, StatusCode::OK).await.unwrap();
    let contents: Vec<_> = listed.data.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["hello", "look"]);
    assert_eq!(listed.data[1].attachment.as_deref(), Some("uploads/photo.png"));

    let delete_path = format!("/api/v1/messages/{}", first.data.id);
    let response = server.delete_auth(&delete_path, &bob.token).await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "NOT_MESSAGE_SENDER");

    let response = server.delete_auth(&delete_path, &alice.token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_auth(&path, &alice.token).await.unwrap();
    let listed: Data<Vec<MessageBody>> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(listed.data.len(), 1);
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();
    let bob = server.create_user("bob").await.unwrap();
    let conversation = open_conversation(&server, &alice, &bob).await;

    let response = server
        .post_auth(
            &format!("/api/v1/dms/{conversation}/messages"),
            &alice.token,
            &NewMessage {
                content: "",
                attachment: None,
            },
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "VALIDATION_ERROR");
}

// ============================================================================
// Typing Tests
// ============================================================================

#[tokio::test]
async fn test_typing_expires_after_window() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();
    let bob = server.create_user("bob").await.unwrap();
    let conversation = open_conversation(&server, &alice, &bob).await;

    let armed = arm_typing(&server, &alice, &conversation).await;
    assert_eq!(armed.conversation_id, conversation);

    assert_eq!(
        typing_seen_by(&server, &bob, &conversation).await,
        vec![alice.username.clone()]
    );
    assert!(typing_seen_by(&server, &alice, &conversation).await.is_empty());

    tokio::time::sleep(window() * 2).await;
    assert!(typing_seen_by(&server, &bob, &conversation).await.is_empty());
}

#[tokio::test]
async fn test_rearm_extends_typing() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();
    let bob = server.create_user("bob").await.unwrap();
    let conversation = open_conversation(&server, &alice, &bob).await;

    let first = arm_typing(&server, &alice, &conversation).await;
    tokio::time::sleep(window() / 2).await;
    let second = arm_typing(&server, &alice, &conversation).await;
    assert!(second.expires_at > first.expires_at);

    // Past the first deadline, before the second
    tokio::time::sleep(window() * 3 / 4).await;
    assert_eq!(
        typing_seen_by(&server, &bob, &conversation).await,
        vec![alice.username.clone()]
    );

    tokio::time::sleep(window()).await;
    assert!(typing_seen_by(&server, &bob, &conversation).await.is_empty());
}

#[tokio::test]
async fn test_sending_message_clears_typing() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();
    let bob = server.create_user("bob").await.unwrap();
    let conversation = open_conversation(&server, &alice, &bob).await;

    arm_typing(&server, &alice, &conversation).await;
    let response = server
        .post_auth(
            &format!("/api/v1/dms/{conversation}/messages"),
            &alice.token,
            &NewMessage {
                content: "sent",
                attachment: None,
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    assert!(typing_seen_by(&server, &bob, &conversation).await.is_empty());

    // The pending expiry fires later without effect
    tokio::time::sleep(window() * 2).await;
    assert!(typing_seen_by(&server, &bob, &conversation).await.is_empty());
}

#[tokio::test]
async fn test_explicit_typing_clear() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();
    let bob = server.create_user("bob").await.unwrap();
    let conversation = open_conversation(&server, &alice, &bob).await;
    let path = format!("/api/v1/dms/{conversation}/typing");

    arm_typing(&server, &alice, &conversation).await;
    let response = server.delete_auth(&path, &alice.token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    assert!(typing_seen_by(&server, &bob, &conversation).await.is_empty());

    let carol = server.create_user("carol").await.unwrap();
    let response = server.post_empty_auth(&path, &carol.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Friend Tests
// ============================================================================

#[tokio::test]
async fn test_friend_request_flow() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();
    let bob = server.create_user("bob").await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/friends",
            &alice.token,
            &FriendRequestBody {
                username: &bob.username,
            },
        )
        .await
        .unwrap();
    let sent: Data<FriendBody> = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(sent.data.status, "pending");
    assert!(sent.data.outgoing);

    let response = server
        .post_auth(
            "/api/v1/friends",
            &bob.token,
            &FriendRequestBody {
                username: &alice.username,
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    let response = server.get_auth("/api/v1/friends/pending", &bob.token).await.unwrap();
    let pending: Data<Vec<FriendBody>> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(pending.data.len(), 1);
    assert_eq!(pending.data[0].user.username, alice.username);

    let response = server
        .patch_auth(
            &format!("/api/v1/friends/{}", sent.data.id),
            &bob.token,
            &FriendAnswer { status: "accepted" },
        )
        .await
        .unwrap();
    let answered: Data<FriendBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(answered.data.status, "accepted");

    let response = server.get_auth("/api/v1/friends", &alice.token).await.unwrap();
    let friends: Data<Vec<FriendBody>> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(friends.data.len(), 1);
    assert_eq!(friends.data[0].user.username, bob.username);
}

#[tokio::test]
async fn test_friend_answer_must_be_final_status() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("alice").await.unwrap();
    let bob = server.create_user("bob").await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/friends",
            &alice.token,
            &FriendRequestBody {
                username: &bob.username,
            },
        )
        .await
        .unwrap();
    let sent: Data<FriendBody> = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .patch_auth(
            &format!("/api/v1/friends/{}", sent.data.id),
            &bob.token,
            &FriendAnswer { status: "pending" },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// PostgreSQL
// ============================================================================

#[tokio::test]
async fn test_postgres_backend_smoke() {
    let Some(server) = TestServer::start_postgres().await.unwrap() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let alice = server.create_user("pg_alice").await.unwrap();
    let bob = server.create_user("pg_bob").await.unwrap();

    let first = open_conversation(&server, &alice, &bob).await;
    assert_eq!(open_conversation(&server, &bob, &alice).await, first);

    arm_typing(&server, &alice, &first).await;
    assert_eq!(
        typing_seen_by(&server, &bob, &first).await,
        vec![alice.username.clone()]
    );

    tokio::time::sleep(window() * 2).await;
    assert!(typing_seen_by(&server, &bob, &first).await.is_empty());

    for user in [&alice, &bob] {
        let response = server
            .delete_webhook(&format!("/api/v1/webhooks/users/{}", user.external_id))
            .await
            .unwrap();
        assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    }
}
