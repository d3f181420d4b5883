use axum::{
    extract::{Path, State},
    Json,
};
use color_eyre::eyre::WrapErr;
use uuid::Uuid;

use super::responses::TagResponse;
use crate::{
    http_server::{errors::ApiError, ResponseResult},
    AppState,
};

pub async fn list_tags(State(state): State<AppState>) -> ResponseResult<Json<Vec<TagResponse>>> {
    let tags = state
        .store
        .list_tags()
        .await
        .wrap_err("Failed to list tags")?;

    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<Uuid>,
) -> ResponseResult<Json<TagResponse>> {
    let tag = state
        .store
        .tag_by_id(tag_id)
        .await?
        .ok_or(ApiError::NotFound("Tag"))?;

    Ok(Json(tag.into()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use db::{MemoryStore, Store};
    use tower::ServiceExt;

    use super::TagResponse;
    use crate::http_server::test_helpers::{
        empty_request, response_body_json, response_body_text, test_app,
    };

    #[tokio::test]
    async fn tags_are_listed_by_name() {
        let store = Arc::new(MemoryStore::new());
        store.create_tag("lunch", Some("#00ff00")).await.unwrap();
        store.create_tag("breakfast", None).await.unwrap();

        let response = test_app(store)
            .oneshot(empty_request("GET", "/tags/", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let tags: Vec<TagResponse> = response_body_json(response).await;
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["breakfast", "lunch"]);
        assert_eq!(tags[1].color.as_deref(), Some("#00ff00"));
    }

    #[tokio::test]
    async fn unknown_tag_is_not_found() {
        let store = Arc::new(MemoryStore::new());

        let response = test_app(store)
            .oneshot(empty_request(
                "GET",
                &format!("/tags/{}/", uuid::Uuid::new_v4()),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response_body_text(response).await, "Tag not found");
    }
}
