//! Admin API handlers.
//!
//! ```text
//! GET    /api/v1/admin/activity
//! POST   /api/v1/admin/export-jobs {"exportType":"things_csv"}
//! POST   /api/v1/admin/export-jobs/{id}/run
//! DELETE /api/v1/admin/users/{id}
//! ```
//!
//! Authorisation lives in the domain service; these handlers only parse
//! and render.

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{AdminActivity, ExportJob, ExportJobId, ExportType, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_value_error, parse_uuid};

const EXPORT_TYPE_FIELD: FieldName = FieldName::new("exportType");
const ID_FIELD: FieldName = FieldName::new("id");

/// Request body for `POST /api/v1/admin/export-jobs`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExportJobRequest {
    pub export_type: String,
}

/// One activity log entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: String,
    pub admin_id: String,
    pub action: String,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

impl From<&AdminActivity> for ActivityResponse {
    fn from(entry: &AdminActivity) -> Self {
        Self {
            id: entry.id().to_string(),
            admin_id: entry.admin_id().to_string(),
            action: entry.action().to_string(),
            details: entry.details().clone(),
            created_at: entry.created_at(),
        }
    }
}

/// One export job.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJobResponse {
    pub id: String,
    pub export_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

impl From<&ExportJob> for ExportJobResponse {
    fn from(job: &ExportJob) -> Self {
        Self {
            id: job.id().to_string(),
            export_type: job.export_type().to_string(),
            status: job.status().to_string(),
            created_at: job.created_at(),
            completed_at: job.completed_at(),
            file_id: job.file_id().map(ToString::to_string),
        }
    }
}

/// Read the activity log, newest first.
#[get("/admin/activity")]
pub async fn list_activity(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ActivityResponse>>> {
    let requester = session.require_user_id()?;
    let entries = state.admin.list_activity(&requester).await?;
    Ok(web::Json(
        entries.iter().map(ActivityResponse::from).collect(),
    ))
}

/// Create a pending export job.
#[post("/admin/export-jobs")]
pub async fn create_export_job(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<CreateExportJobRequest>,
) -> ApiResult<HttpResponse> {
    let requester = session.require_user_id()?;
    let export_type = ExportType::new(payload.into_inner().export_type)
        .map_err(|err| invalid_value_error(EXPORT_TYPE_FIELD, err.to_string()))?;
    let job = state
        .admin
        .create_export_job(&requester, export_type)
        .await?;
    Ok(HttpResponse::Created().json(ExportJobResponse::from(&job)))
}

/// Run a pending export job to completion.
#[post("/admin/export-jobs/{id}/run")]
pub async fn run_export_job(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ExportJobResponse>> {
    let requester = session.require_user_id()?;
    let job_id = ExportJobId::from_uuid(parse_uuid(&path.into_inner(), ID_FIELD)?);
    let job = state.admin.run_export_job(&requester, &job_id).await?;
    Ok(web::Json(ExportJobResponse::from(&job)))
}

/// Delete a user account and everything it owns.
#[delete("/admin/users/{id}")]
pub async fn delete_user(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let requester = session.require_user_id()?;
    let user_id = UserId::from_uuid(parse_uuid(&path.into_inner(), ID_FIELD)?);
    state.admin.delete_user(&requester, &user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Capability;
    use crate::test_support::{MemoryStore, login_as, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;

    #[rstest]
    #[actix_web::test]
    async fn plain_users_are_forbidden() {
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
    }

    #[rstest]
    #[actix_web::test]
    async fn a_job_can_be_created_and_run_once() {
        let store = MemoryStore::shared();
        let user = store.seed_user("Root", "root@example.com", "hunter2");
        store.seed_admin(&user, [Capability::RunExports, Capability::ViewActivity]);
        let app = actix_test::init_service(test_app(&store)).await;
        let cookie = login_as(&app, "root@example.com", "hunter2").await;

        let created = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/admin/export-jobs")
                .cookie(cookie.clone())
                .set_json(&CreateExportJobRequest {
                    export_type: "things_csv".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let job: ExportJobResponse = actix_test::read_body_json(created).await;
        assert_eq!(job.status, "pending");
        assert!(job.completed_at.is_none());

        let run_uri = format!("/api/v1/admin/export-jobs/{}/run", job.id);
        let ran = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&run_uri)
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(ran.status(), StatusCode::OK);
        let finished: ExportJobResponse = actix_test::read_body_json(ran).await;
        assert_eq!(finished.status, "done");
        assert!(finished.completed_at.is_some());
        assert!(finished.file_id.is_some());

        let again = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&run_uri)
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(again.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[actix_web::test]
    async fn the_activity_log_is_newest_first() {
        let store = MemoryStore::shared();
        let user = store.seed_user("Root", "root@example.com", "hunter2");
        store.seed_admin(&user, [Capability::RunExports, Capability::ViewActivity]);
        let app = actix_test::init_service(test_app(&store)).await;
        let cookie = login_as(&app, "root@example.com", "hunter2").await;

        for export_type in ["first_csv", "second_csv"] {
            let response = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/admin/export-jobs")
                    .cookie(cookie.clone())
                    .set_json(&CreateExportJobRequest {
                        export_type: export_type.into(),
                    })
                    .to_request(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/activity")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let entries: Vec<ActivityResponse> = actix_test::read_body_json(response).await;
        assert_eq!(entries.len(), 2);
        assert!(entries[0].created_at >= entries[1].created_at);
        assert_eq!(
            entries[0].details.pointer("/exportType").and_then(|v| v.as_str()),
            Some("second_csv")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn deleting_a_user_requires_the_manage_users_capability() {
        let store = MemoryStore::shared();
        let admin = store.seed_user("Root", "root@example.com", "hunter2");
        store.seed_admin(&admin, [Capability::RunExports]);
        let target = store.seed_user("Ada", "ada@example.com", "hunter2");
        let app = actix_test::init_service(test_app(&store)).await;
        let cookie = login_as(&app, "root@example.com", "hunter2").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/admin/users/{}", target.id()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[actix_web::test]
    async fn deleting_a_user_cascades_to_their_rooms() {
        let store = MemoryStore::shared();
        let admin = store.seed_user("Root", "root@example.com", "hunter2");
        store.seed_admin(&admin, [Capability::ManageUsers]);
        let target = store.seed_user("Ada", "ada@example.com", "hunter2");
        let room = store.seed_room(&target, "Pantry");
        store.seed_thing(&room, "Flour", 2);
        let app = actix_test::init_service(test_app(&store)).await;
        let cookie = login_as(&app, "root@example.com", "hunter2").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/admin/users/{}", target.id()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(store.user_is_gone(&target));
    }
}
