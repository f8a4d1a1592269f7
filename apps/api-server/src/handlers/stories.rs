//! Story endpoints.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use campus_core::ports::ViewEvent;
use campus_shared::ApiResponse;
use campus_shared::dto::{CreateStoryRequest, LikeResponse};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/stories
pub async fn create_story(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateStoryRequest>,
) -> AppResult<HttpResponse> {
    let story = state
        .content
        .create_story(&identity.actor(), body.into_inner().into())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(story, "Story created")))
}

/// GET /api/v1/stories
pub async fn list_stories(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let stories = state.feed.list_live_stories(identity.user_id()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stories)))
}

/// POST /api/v1/stories/{id}/like
pub async fn toggle_like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let liked = state
        .engagement
        .toggle_story_like(&identity.actor(), *path)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(LikeResponse { liked })))
}

/// POST /api/v1/stories/{id}/view
///
/// Missing or expired stories are rejected; the view itself is queued.
pub async fn record_view(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let story = state.engagement.require_live_story(*path).await?;
    let accepted = state.views.submit(ViewEvent::Story {
        story_id: story.id,
        user_id: identity.user_id,
    });
    if !accepted {
        tracing::debug!(story_id = %story.id, "View queue full, story view dropped");
    }

    Ok(HttpResponse::Ok().json(ApiResponse::message("View recorded")))
}

/// DELETE /api/v1/stories/{id}/hard
pub async fn hard_delete_story(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .content
        .hard_delete_story(&identity.actor(), *path)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Story permanently deleted")))
}
