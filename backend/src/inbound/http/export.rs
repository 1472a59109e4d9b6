//! CSV export API handler.
//!
//! ```text
//! GET /api/v1/export-things
//! ```
//!
//! Streams nothing; the whole document is rendered in memory and served
//! as an attachment named `my_things.csv`.

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const ATTACHMENT_NAME: &str = "my_things.csv";

/// Download the caller's things as CSV.
#[get("/export-things")]
pub async fn export_things(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let requester = session.require_user_id()?;
    let bytes = state.export.export_csv(&requester).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(ATTACHMENT_NAME.to_owned())],
        })
        .body(bytes))
}
