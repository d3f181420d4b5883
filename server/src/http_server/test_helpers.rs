use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use db::{
    cooking::{IngredientAmount, NewRecipe, Recipe},
    users::User,
    MemoryStore, Store,
};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;
use uuid::Uuid;

use crate::{
    state::{VersionInfo, DEFAULT_PAGE_SIZE},
    AppConfig, AppState,
};

pub fn test_config() -> AppConfig {
    AppConfig {
        base_url: Url::parse("http://localhost:3000").unwrap(),
        page_size: DEFAULT_PAGE_SIZE,
        shopping_list_dir: None,
    }
}

pub fn test_state(store: Arc<MemoryStore>) -> AppState {
    AppState {
        app: test_config(),
        store,
        versions: VersionInfo::from_env(),
    }
}

pub fn test_app(store: Arc<MemoryStore>) -> Router {
    app_with_state(test_state(store))
}

pub fn app_with_state(state: AppState) -> Router {
    crate::http_server::routes::make_router().with_state(state)
}

/// A user plus a token that authenticates as them.
pub async fn signed_in(store: &MemoryStore, username: &str) -> (User, Uuid) {
    let user = store.create_user(username).await.unwrap();
    let token = store.issue_token(user.user_id).await.unwrap();
    (user, token.token)
}

pub async fn seed_recipe(
    store: &MemoryStore,
    author: &User,
    name: &str,
    ingredients: &[(Uuid, i32)],
    tag_ids: &[Uuid],
) -> Recipe {
    store
        .create_recipe(
            author.user_id,
            &NewRecipe {
                name: name.to_string(),
                text: format!("How to make {name}"),
                cooking_time: 15,
                ingredients: ingredients
                    .iter()
                    .map(|&(ingredient_id, amount)| IngredientAmount {
                        ingredient_id,
                        amount,
                    })
                    .collect(),
                tag_ids: tag_ids.to_vec(),
            },
        )
        .await
        .unwrap()
}

pub fn request(method: &str, uri: &str, token: Option<Uuid>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Token {token}")),
        None => builder,
    }
}

pub fn json_request<T: Serialize>(
    method: &str,
    uri: &str,
    token: Option<Uuid>,
    body: &T,
) -> Request<Body> {
    request(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<Uuid>) -> Request<Body> {
    request(method, uri, token).body(Body::empty()).unwrap()
}

pub async fn response_body_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

pub async fn response_body_text(response: Response<Body>) -> String {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body_bytes.to_vec()).unwrap()
}
