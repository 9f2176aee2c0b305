mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use todo_share_api::observer::EventName;

use common::{data, str_field, TestServer};

#[tokio::test]
async fn viewer_can_read_but_not_write() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("alice").await?;
    let bob = server.register("bob").await?;
    let list = server.create_list(&alice, "Trip").await?;
    let list_id = str_field(&list, "id").to_string();

    assert_eq!(server.share(&alice, &list_id, &bob, "View").await?, StatusCode::OK);

    let res = server
        .request(Method::GET, &bob, &format!("/api/todo/list/{}", list_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.add_item(&bob, &list, &[("name", "passport")]).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn editor_cannot_delete_or_reshare() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("alice").await?;
    let bob = server.register("bob").await?;
    let carol = server.register("carol").await?;
    let list = server.create_list(&alice, "Trip").await?;
    let list_id = str_field(&list, "id").to_string();
    server.share(&alice, &list_id, &bob, "Edit").await?;

    let res = server.add_item(&bob, &list, &[("name", "tickets")]).await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    assert_eq!(server.share(&bob, &list_id, &carol, "View").await?, StatusCode::FORBIDDEN);
    let res = server
        .request(Method::DELETE, &bob, &format!("/api/todo/list/{}", list_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn sharing_twice_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("alice").await?;
    let bob = server.register("bob").await?;
    let list = server.create_list(&alice, "Trip").await?;
    let list_id = str_field(&list, "id").to_string();

    assert_eq!(server.share(&alice, &list_id, &bob, "View").await?, StatusCode::OK);
    assert_eq!(server.share(&alice, &list_id, &bob, "Edit").await?, StatusCode::BAD_REQUEST);

    let fetched = data(
        server
            .request(Method::GET, &alice, &format!("/api/todo/list/{}", list_id))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(fetched["shares"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn share_without_user_id_is_a_bad_request() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("alice").await?;
    let list = server.create_list(&alice, "Trip").await?;

    let res = server
        .request(Method::POST, &alice, &format!("/api/todo/share/{}", str_field(&list, "id")))
        .json(&json!({ "permission": "View" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "User ID is required");
    Ok(())
}

#[tokio::test]
async fn unshare_revokes_access_and_notifies_the_user() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("alice").await?;
    let bob = server.register("bob").await?;
    let carol = server.register("carol").await?;
    let mut bob_events = server.hub.subscribe_user(bob.id);

    let list = server.create_list(&alice, "Trip").await?;
    let list_id = str_field(&list, "id").to_string();
    server.share(&alice, &list_id, &bob, "Edit").await?;

    let unshare = |user_id: uuid::Uuid| {
        server
            .request(Method::POST, &alice, &format!("/api/todo/unshare/{}", list_id))
            .json(&json!({ "user_id": user_id }))
            .send()
    };

    assert_eq!(unshare(carol.id).await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(unshare(bob.id).await?.status(), StatusCode::OK);

    let res = server
        .request(Method::GET, &bob, &format!("/api/todo/list/{}", list_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let timeout = std::time::Duration::from_secs(2);
    let shared = tokio::time::timeout(timeout, bob_events.recv()).await??;
    let unshared = tokio::time::timeout(timeout, bob_events.recv()).await??;
    assert_eq!(shared.event, EventName::ListShared);
    assert_eq!(unshared.event, EventName::ListUnshared);
    Ok(())
}
