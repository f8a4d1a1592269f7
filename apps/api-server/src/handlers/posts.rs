//! Post endpoints.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use campus_core::ports::ViewEvent;
use campus_shared::ApiResponse;
use campus_shared::dto::{
    AddCommentRequest, CreatePostRequest, LikeResponse, ListPostsQuery, RecordViewRequest,
    SharePostRequest, UpdatePostRequest,
};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .content
        .create_post(&identity.actor(), body.into_inner().into())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(post, "Post created")))
}

/// GET /api/v1/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .feed
        .list_posts(identity.user_id(), query.filter(), query.page_request())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let item = state.feed.get_post(identity.user_id(), *path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(item)))
}

/// PUT /api/v1/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .content
        .update_post(&identity.actor(), *path, body.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(post, "Post updated")))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.content.soft_delete_post(&identity.actor(), *path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted")))
}

/// DELETE /api/v1/posts/{id}/hard
pub async fn hard_delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.content.hard_delete_post(&identity.actor(), *path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Post permanently deleted")))
}

/// POST /api/v1/posts/{id}/like
pub async fn toggle_like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let liked = state
        .engagement
        .toggle_post_like(&identity.actor(), *path)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(LikeResponse { liked })))
}

/// POST /api/v1/posts/{id}/comment
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<AddCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let comment = state
        .engagement
        .add_comment(&identity.actor(), *path, &req.content, req.parent_comment_id)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(comment, "Comment added")))
}

/// GET /api/v1/posts/{id}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let threads = state.feed.list_comments(*path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(threads)))
}

/// DELETE /api/v1/posts/{id}/comments/{comment_id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state
        .engagement
        .delete_comment(&identity.actor(), post_id, comment_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Comment deleted")))
}

/// POST /api/v1/posts/{id}/share
///
/// The body is optional; an empty one records a share without a method.
pub async fn share_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        SharePostRequest::default()
    } else {
        serde_json::from_slice::<SharePostRequest>(&body)
            .map_err(|err| AppError::BadRequest(format!("Invalid request body: {err}")))?
    };
    let method = request.method()?;
    let share = state
        .engagement
        .share_post(&identity.actor(), *path, method)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(share, "Post shared")))
}

/// POST /api/v1/posts/{id}/view
///
/// Anonymous callers allowed. The view is queued and this never fails.
pub async fn record_view(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: Option<web::Json<RecordViewRequest>>,
) -> HttpResponse {
    let req = body.map(|b| b.into_inner()).unwrap_or_default();
    let accepted = state.views.submit(ViewEvent::Post {
        post_id: *path,
        user_id: identity.user_id(),
        duration_watched_seconds: req.duration_watched_seconds,
    });
    if !accepted {
        tracing::debug!(post_id = %path, "View queue full, post view dropped");
    }

    HttpResponse::Ok().json(ApiResponse::message("View recorded"))
}
