use crate::comment::model::{
    CreateCommentRequest, CreateReplyRequest, Reaction, UpdateCommentRequest,
};
use crate::comment::service::CommentService;
use crate::utils::context::RequestContext;
use crate::utils::error::CustomError;
use actix_web::{HttpRequest, HttpResponse, web};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

fn parse_object_id(value: &str, label: &str) -> Result<ObjectId, CustomError> {
    ObjectId::parse_str(value)
        .map_err(|_| CustomError::BadRequestError(format!("Invalid {} ID", label)))
}

/// Create a new top-level comment on a post
/// POST /comments
pub async fn create_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let ctx = RequestContext::from_request(&req)?;
    let post_id = parse_object_id(&body.post_id, "post")?;

    if body.body.trim().is_empty() {
        return Err(CustomError::BadRequestError(
            "Comment body cannot be empty".to_string(),
        ));
    }

    let comment = comment_service
        .add_comment(
            &ctx,
            post_id,
            body.body.clone(),
            body.summary.clone().unwrap_or_default(),
        )
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Comment created successfully",
        "httpStatusCode": 201,
        "data": comment
    })))
}

/// Get all non-deleted comments for a post
/// GET /comments/post/{post_id}
pub async fn get_post_comments(
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let post_id = parse_object_id(&path.into_inner(), "post")?;

    let comments = comment_service.get_comments_for_post(&post_id).await?;
    let count = comments.len();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comments retrieved successfully",
        "httpStatusCode": 200,
        "count": count,
        "data": comments
    })))
}

/// Get a single comment
/// GET /comments/{post_id}/{comment_id}
pub async fn get_comment(
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, CustomError> {
    let (post_id, comment_id) = path.into_inner();
    let post_id = parse_object_id(&post_id, "post")?;
    let comment_id = parse_object_id(&comment_id, "comment")?;

    let comment = comment_service.get_comment(&post_id, &comment_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment retrieved successfully",
        "httpStatusCode": 200,
        "data": comment
    })))
}

/// Update a comment's content
/// PUT /comments/{post_id}/{comment_id}
pub async fn update_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
    body: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let ctx = RequestContext::from_request(&req)?;
    let (post_id, comment_id) = path.into_inner();
    let post_id = parse_object_id(&post_id, "post")?;
    let comment_id = parse_object_id(&comment_id, "comment")?;

    if body.body.is_none() && body.summary.is_none() {
        return Err(CustomError::BadRequestError(
            "No updatable fields provided".to_string(),
        ));
    }
    if let Some(new_body) = &body.body {
        if new_body.trim().is_empty() {
            return Err(CustomError::BadRequestError(
                "Comment body cannot be empty".to_string(),
            ));
        }
    }

    comment_service
        .update_comment(
            &ctx,
            &post_id,
            &comment_id,
            body.body.clone(),
            body.summary.clone(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment updated successfully",
        "httpStatusCode": 200
    })))
}

/// Soft-delete a comment
/// DELETE /comments/{post_id}/{comment_id}
pub async fn delete_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, CustomError> {
    let ctx = RequestContext::from_request(&req)?;
    let (post_id, comment_id) = path.into_inner();
    let post_id = parse_object_id(&post_id, "post")?;
    let comment_id = parse_object_id(&comment_id, "comment")?;

    comment_service
        .delete_comment(&ctx, &post_id, &comment_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment deleted successfully",
        "httpStatusCode": 200
    })))
}

/// List the visible replies of a comment
/// GET /comments/{post_id}/{comment_id}/replies
pub async fn get_replies(
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, CustomError> {
    let (post_id, comment_id) = path.into_inner();
    let post_id = parse_object_id(&post_id, "post")?;
    let comment_id = parse_object_id(&comment_id, "comment")?;

    let replies = comment_service.get_replies(&post_id, &comment_id).await?;
    let count = replies.len();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Replies retrieved successfully",
        "httpStatusCode": 200,
        "count": count,
        "data": replies
    })))
}

/// Create a reply under a comment
/// POST /comments/{post_id}/{comment_id}/replies
pub async fn create_reply(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
    body: web::Json<CreateReplyRequest>,
) -> Result<HttpResponse, CustomError> {
    let ctx = RequestContext::from_request(&req)?;
    let (post_id, parent_id) = path.into_inner();
    let post_id = parse_object_id(&post_id, "post")?;
    let parent_id = parse_object_id(&parent_id, "comment")?;

    if body.body.trim().is_empty() {
        return Err(CustomError::BadRequestError(
            "Reply body cannot be empty".to_string(),
        ));
    }

    let reply = comment_service
        .add_reply(
            &ctx,
            post_id,
            parent_id,
            body.body.clone(),
            body.summary.clone().unwrap_or_default(),
        )
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Reply created successfully",
        "httpStatusCode": 201,
        "data": reply
    })))
}

/// Soft-delete a reply and unlink it from its parent
/// DELETE /comments/{post_id}/{comment_id}/replies/{reply_id}
pub async fn delete_reply(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String, String)>,
) -> Result<HttpResponse, CustomError> {
    let ctx = RequestContext::from_request(&req)?;
    let (post_id, parent_id, reply_id) = path.into_inner();
    let post_id = parse_object_id(&post_id, "post")?;
    let parent_id = parse_object_id(&parent_id, "comment")?;
    let reply_id = parse_object_id(&reply_id, "reply")?;

    comment_service
        .delete_reply(&ctx, &post_id, &parent_id, &reply_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Reply deleted successfully",
        "httpStatusCode": 200
    })))
}

/// Like a comment
/// POST /comments/{post_id}/{comment_id}/like
pub async fn like_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, CustomError> {
    react(req, comment_service, path, Reaction::Like, "Comment liked successfully").await
}

/// Remove a like from a comment
/// DELETE /comments/{post_id}/{comment_id}/like
pub async fn unlike_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, CustomError> {
    unreact(req, comment_service, path, Reaction::Like, "Like removed successfully").await
}

/// Dislike a comment
/// POST /comments/{post_id}/{comment_id}/dislike
pub async fn dislike_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, CustomError> {
    react(req, comment_service, path, Reaction::Dislike, "Comment disliked successfully").await
}

/// Remove a dislike from a comment
/// DELETE /comments/{post_id}/{comment_id}/dislike
pub async fn undislike_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, CustomError> {
    unreact(req, comment_service, path, Reaction::Dislike, "Dislike removed successfully").await
}

async fn react(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
    reaction: Reaction,
    message: &str,
) -> Result<HttpResponse, CustomError> {
    let ctx = RequestContext::from_request(&req)?;
    let (post_id, comment_id) = path.into_inner();
    let post_id = parse_object_id(&post_id, "post")?;
    let comment_id = parse_object_id(&comment_id, "comment")?;

    comment_service
        .react(&ctx, &post_id, &comment_id, reaction)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "httpStatusCode": 200
    })))
}

async fn unreact(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
    reaction: Reaction,
    message: &str,
) -> Result<HttpResponse, CustomError> {
    let ctx = RequestContext::from_request(&req)?;
    let (post_id, comment_id) = path.into_inner();
    let post_id = parse_object_id(&post_id, "post")?;
    let comment_id = parse_object_id(&comment_id, "comment")?;

    comment_service
        .unreact(&ctx, &post_id, &comment_id, reaction)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "httpStatusCode": 200
    })))
}
