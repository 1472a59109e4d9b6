//! End-to-end ownership isolation across the whole API surface.
//!
//! Two users share one app; nothing either creates may leak into the
//! other's listings, and every cross-user access reads as absent.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use backend::test_support::{MemoryStore, login_as, test_app};

#[rstest]
#[actix_web::test]
async fn listings_are_scoped_to_the_session_user() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    let eve = store.seed_user("Eve", "eve@example.com", "hunter2");
    let pantry = store.seed_room(&ada, "Pantry");
    store.seed_thing(&pantry, "Flour", 2);
    let cellar = store.seed_room(&eve, "Cellar");
    store.seed_thing(&cellar, "Cider", 6);
    let app = actix_test::init_service(test_app(&store)).await;

    let cookie = login_as(&app, "ada@example.com", "hunter2").await;
    let rooms: Value = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/rooms")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await,
    )
    .await;
    let rooms = rooms.as_array().expect("rooms array");
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["name"], "Pantry");

    let things: Value = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/things")
                .cookie(cookie)
                .to_request(),
        )
        .await,
    )
    .await;
    let things = things.as_array().expect("things array");
    assert_eq!(things.len(), 1);
    assert_eq!(things[0]["name"], "Flour");
    assert_eq!(things[0]["roomName"], "Pantry");
}

#[rstest]
#[actix_web::test]
async fn foreign_and_absent_rooms_are_indistinguishable() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    store.seed_user("Eve", "eve@example.com", "hunter2");
    let pantry = store.seed_room(&ada, "Pantry");
    let app = actix_test::init_service(test_app(&store)).await;
    let cookie = login_as(&app, "eve@example.com", "hunter2").await;

    let foreign = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/rooms/{}", pantry.id()))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    let foreign_body: Value = actix_test::read_body_json(foreign).await;

    let absent = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/rooms/{}", uuid::Uuid::new_v4()))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(absent.status(), StatusCode::NOT_FOUND);
    let absent_body: Value = actix_test::read_body_json(absent).await;

    assert_eq!(foreign_body, absent_body);
}

#[rstest]
#[actix_web::test]
async fn renaming_a_foreign_room_changes_nothing() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    store.seed_user("Eve", "eve@example.com", "hunter2");
    let pantry = store.seed_room(&ada, "Pantry");
    let app = actix_test::init_service(test_app(&store)).await;

    let eve_cookie = login_as(&app, "eve@example.com", "hunter2").await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/rooms/{}", pantry.id()))
            .cookie(eve_cookie)
            .set_json(json!({ "name": "Mine now" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let ada_cookie = login_as(&app, "ada@example.com", "hunter2").await;
    let room: Value = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/rooms/{}", pantry.id()))
                .cookie(ada_cookie)
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(room["name"], "Pantry");
}

#[rstest]
#[actix_web::test]
async fn deleting_a_room_removes_exactly_its_things() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    let pantry = store.seed_room(&ada, "Pantry");
    let cellar = store.seed_room(&ada, "Cellar");
    store.seed_thing(&pantry, "Flour", 2);
    let cider = store.seed_thing(&cellar, "Cider", 6);
    let app = actix_test::init_service(test_app(&store)).await;
    let cookie = login_as(&app, "ada@example.com", "hunter2").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/rooms/{}", pantry.id()))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let things: Value = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/things")
                .cookie(cookie)
                .to_request(),
        )
        .await,
    )
    .await;
    let things = things.as_array().expect("things array");
    assert_eq!(things.len(), 1);
    assert_eq!(things[0]["id"], cider.id().to_string());
}

#[rstest]
#[actix_web::test]
async fn shopping_list_add_to_a_foreign_room_is_invalid_room() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    store.seed_user("Eve", "eve@example.com", "hunter2");
    let pantry = store.seed_room(&ada, "Pantry");
    let app = actix_test::init_service(test_app(&store)).await;
    let cookie = login_as(&app, "eve@example.com", "hunter2").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/shopping-list")
            .cookie(cookie)
            .set_json(json!({
                "room": pantry.id().to_string(),
                "name": "Flour",
                "quantity": 1,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "invalid room");
}

#[rstest]
#[actix_web::test]
async fn every_endpoint_requires_a_session() {
    let store = MemoryStore::shared();
    let app = actix_test::init_service(test_app(&store)).await;

    for uri in [
        "/api/v1/rooms",
        "/api/v1/things",
        "/api/v1/shopping-list",
        "/api/v1/export-things",
        "/api/v1/admin/activity",
    ] {
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}
