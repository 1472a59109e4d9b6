//! CSV export behaviour over the full HTTP surface.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;

use backend::test_support::{MemoryStore, login_as, test_app};

async fn fetch_export<S, B>(app: &S, cookie: actix_web::cookie::Cookie<'static>) -> (StatusCode, String)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::get()
            .uri("/api/v1/export-things")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    (status, String::from_utf8(body.to_vec()).expect("utf-8 csv"))
}

#[rstest]
#[actix_web::test]
async fn empty_inventory_exports_the_header_only() {
    let store = MemoryStore::shared();
    store.seed_user("Ada", "ada@example.com", "hunter2");
    let app = actix_test::init_service(test_app(&store)).await;
    let cookie = login_as(&app, "ada@example.com", "hunter2").await;

    let (status, body) = fetch_export(&app, cookie).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Name,Room,Quantity\n");
}

#[rstest]
#[actix_web::test]
async fn each_thing_exports_with_its_own_room() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    let pantry = store.seed_room(&ada, "Pantry");
    let cellar = store.seed_room(&ada, "Cellar");
    store.seed_thing(&pantry, "Flour", 2);
    store.seed_thing(&cellar, "Cider", 6);
    let app = actix_test::init_service(test_app(&store)).await;
    let cookie = login_as(&app, "ada@example.com", "hunter2").await;

    let (status, body) = fetch_export(&app, cookie).await;
    assert_eq!(status, StatusCode::OK);

    let mut lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.remove(0), "Name,Room,Quantity");
    lines.sort_unstable();
    assert_eq!(lines, vec!["Cider,Cellar,6", "Flour,Pantry,2"]);
}

#[rstest]
#[actix_web::test]
async fn export_is_scoped_to_the_session_user() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    store.seed_user("Eve", "eve@example.com", "hunter2");
    let pantry = store.seed_room(&ada, "Pantry");
    store.seed_thing(&pantry, "Flour", 2);
    let app = actix_test::init_service(test_app(&store)).await;
    let cookie = login_as(&app, "eve@example.com", "hunter2").await;

    let (status, body) = fetch_export(&app, cookie).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Name,Room,Quantity\n");
}

#[rstest]
#[actix_web::test]
async fn embedded_commas_are_quoted() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    let pantry = store.seed_room(&ada, "Pantry");
    store.seed_thing(&pantry, "Salt, coarse", 1);
    let app = actix_test::init_service(test_app(&store)).await;
    let cookie = login_as(&app, "ada@example.com", "hunter2").await;

    let (_, body) = fetch_export(&app, cookie).await;
    assert_eq!(body, "Name,Room,Quantity\n\"Salt, coarse\",Pantry,1\n");
}

#[rstest]
#[actix_web::test]
async fn export_downloads_as_an_attachment() {
    let store = MemoryStore::shared();
    store.seed_user("Ada", "ada@example.com", "hunter2");
    let app = actix_test::init_service(test_app(&store)).await;
    let cookie = login_as(&app, "ada@example.com", "hunter2").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/export-things")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .expect("content disposition set");
    assert_eq!(disposition, "attachment; filename=\"my_things.csv\"");
}
