//! Capability gating, export job lifecycle, and the audit trail.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use backend::domain::Capability;
use backend::test_support::{MemoryStore, login_as, test_app};

#[rstest]
#[actix_web::test]
async fn plain_users_cannot_reach_admin_operations() {
    let store = MemoryStore::shared();
    store.seed_user("Ada", "ada@example.com", "hunter2");
    let app = actix_test::init_service(test_app(&store)).await;
    let cookie = login_as(&app, "ada@example.com", "hunter2").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/admin/activity")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "not permitted");
}

#[rstest]
#[actix_web::test]
async fn missing_capability_reads_the_same_as_no_admin() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    store.seed_user("Eve", "eve@example.com", "hunter2");
    store.seed_admin(&ada, [Capability::RunExports]);
    let app = actix_test::init_service(test_app(&store)).await;

    let admin_cookie = login_as(&app, "ada@example.com", "hunter2").await;
    let gated = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/admin/activity")
            .cookie(admin_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(gated.status(), StatusCode::FORBIDDEN);
    let gated_body: Value = actix_test::read_body_json(gated).await;

    let plain_cookie = login_as(&app, "eve@example.com", "hunter2").await;
    let plain = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/admin/activity")
            .cookie(plain_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(plain.status(), StatusCode::FORBIDDEN);
    let plain_body: Value = actix_test::read_body_json(plain).await;

    assert_eq!(gated_body, plain_body);
}

#[rstest]
#[actix_web::test]
async fn export_job_runs_once_and_is_audited() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    store.seed_admin(&ada, [Capability::RunExports, Capability::ViewActivity]);
    let pantry = store.seed_room(&ada, "Pantry");
    store.seed_thing(&pantry, "Flour", 2);
    let app = actix_test::init_service(test_app(&store)).await;
    let cookie = login_as(&app, "ada@example.com", "hunter2").await;

    let created = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/admin/export-jobs")
            .cookie(cookie.clone())
            .set_json(json!({ "exportType": "things_csv" }))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let job: Value = actix_test::read_body_json(created).await;
    assert_eq!(job["status"], "pending");
    assert!(job["completedAt"].is_null());
    let job_id = job["id"].as_str().expect("job id").to_owned();

    let ran = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/admin/export-jobs/{job_id}/run"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(ran.status(), StatusCode::OK);
    let done: Value = actix_test::read_body_json(ran).await;
    assert_eq!(done["status"], "done");
    assert!(done["completedAt"].is_string());
    assert!(done["fileId"].is_string());

    // A second run must lose to the first.
    let rerun = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/admin/export-jobs/{job_id}/run"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(rerun.status(), StatusCode::CONFLICT);

    let activity: Value = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/activity")
                .cookie(cookie)
                .to_request(),
        )
        .await,
    )
    .await;
    let entries = activity.as_array().expect("activity array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["action"], "export_job_completed");
    assert_eq!(entries[1]["action"], "export_job_created");
    assert_eq!(entries[1]["details"]["exportType"], "things_csv");
}

#[rstest]
#[actix_web::test]
async fn another_admins_job_is_not_found() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    let bob = store.seed_user("Bob", "bob@example.com", "hunter2");
    store.seed_admin(&ada, [Capability::RunExports]);
    store.seed_admin(&bob, [Capability::RunExports]);
    let app = actix_test::init_service(test_app(&store)).await;

    let ada_cookie = login_as(&app, "ada@example.com", "hunter2").await;
    let created = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/admin/export-jobs")
            .cookie(ada_cookie)
            .set_json(json!({ "exportType": "things_csv" }))
            .to_request(),
    )
    .await;
    let job: Value = actix_test::read_body_json(created).await;
    let job_id = job["id"].as_str().expect("job id").to_owned();

    let bob_cookie = login_as(&app, "bob@example.com", "hunter2").await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/admin/export-jobs/{job_id}/run"))
            .cookie(bob_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn deleting_a_user_removes_their_whole_tree() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    let eve = store.seed_user("Eve", "eve@example.com", "hunter2");
    store.seed_admin(&ada, [Capability::ManageUsers, Capability::ViewActivity]);
    let cellar = store.seed_room(&eve, "Cellar");
    store.seed_thing(&cellar, "Cider", 6);
    let app = actix_test::init_service(test_app(&store)).await;
    let cookie = login_as(&app, "ada@example.com", "hunter2").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/admin/users/{}", eve.id()))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.user_is_gone(&eve));

    // The audit entry references the user by id only.
    let activity: Value = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/activity")
                .cookie(cookie)
                .to_request(),
        )
        .await,
    )
    .await;
    let entries = activity.as_array().expect("activity array");
    assert_eq!(entries[0]["action"], "user_deleted");
    assert_eq!(entries[0]["details"]["userId"], eve.id().to_string());
    assert!(entries[0]["details"]["email"].is_null());
}

#[rstest]
#[actix_web::test]
async fn deleting_an_unknown_user_is_not_found() {
    let store = MemoryStore::shared();
    let ada = store.seed_user("Ada", "ada@example.com", "hunter2");
    store.seed_admin(&ada, [Capability::ManageUsers]);
    let app = actix_test::init_service(test_app(&store)).await;
    let cookie = login_as(&app, "ada@example.com", "hunter2").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/admin/users/{}", uuid::Uuid::new_v4()))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
