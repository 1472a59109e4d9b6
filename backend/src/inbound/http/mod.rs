//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod error;
pub mod export;
pub mod rooms;
pub mod routes;
pub mod session;
pub mod shopping_list;
pub mod state;
pub mod things;
pub mod users;
pub mod validation;

pub use error::ApiResult;
