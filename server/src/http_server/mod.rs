use axum::{extract::State, response::Response, Json};

use crate::{state::VersionInfo, AppState};
use errors::ApiError;

pub(crate) mod cmd;
pub(crate) mod routes;

mod api {
    pub mod collections;
    pub mod ingredients;
    pub mod recipes;
    pub mod responses;
    pub mod shopping_cart;
    pub mod tags;
}

mod current_user;
pub mod errors;
mod pagination;
mod trace;
mod validation;

#[cfg(test)]
mod test_helpers;

type ResponseResult<T = Response> = Result<T, ApiError>;

pub(crate) async fn versions(State(app): State<AppState>) -> Json<VersionInfo> {
    Json(app.versions)
}
