//! Account API handlers.
//!
//! ```text
//! POST /api/v1/register {"name":"Ada","email":"ada@example.com","password":"..."}
//! POST /api/v1/login {"email":"ada@example.com","password":"..."}
//! POST /api/v1/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{EmailAddress, NewAccount, PasswordDigest, UserName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, user_validation_error};

const NAME_FIELD: FieldName = FieldName::new("name");
const EMAIL_FIELD: FieldName = FieldName::new("email");
const PASSWORD_FIELD: FieldName = FieldName::new("password");

/// Request body for `POST /api/v1/register`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Register a new account and establish a session.
#[post("/register")]
pub async fn register(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        name,
        email,
        password,
    } = payload.into_inner();
    let account = NewAccount {
        name: UserName::new(name).map_err(|err| user_validation_error(NAME_FIELD, &err))?,
        email: EmailAddress::new(email).map_err(|err| user_validation_error(EMAIL_FIELD, &err))?,
        password: PasswordDigest::from_password(&password)
            .map_err(|err| user_validation_error(PASSWORD_FIELD, &err))?,
    };

    let user = state.accounts.register(account).await?;
    session.persist_user(user.id())?;
    Ok(HttpResponse::Created().json(UserResponse {
        id: user.id().to_string(),
        name: user.name().to_string(),
        email: user.email().to_string(),
    }))
}

/// Authenticate and establish a session.
#[post("/login")]
pub async fn login(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { email, password } = payload.into_inner();
    let email =
        EmailAddress::new(email).map_err(|err| user_validation_error(EMAIL_FIELD, &err))?;
    let user_id = state.accounts.authenticate(&email, &password).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Drop the current session.
#[post("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}
