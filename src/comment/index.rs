use super::controller::{
    create_comment, create_reply, delete_comment, delete_reply, dislike_comment, get_comment,
    get_post_comments, get_replies, like_comment, undislike_comment, unlike_comment,
    update_comment,
};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn comment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("", web::post().to(create_comment))
            .route("/post/{post_id}", web::get().to(get_post_comments))
            .route("/{post_id}/{comment_id}", web::get().to(get_comment))
            .route("/{post_id}/{comment_id}", web::put().to(update_comment))
            .route("/{post_id}/{comment_id}", web::delete().to(delete_comment))
            .route("/{post_id}/{comment_id}/replies", web::get().to(get_replies))
            .route("/{post_id}/{comment_id}/replies", web::post().to(create_reply))
            .route(
                "/{post_id}/{comment_id}/replies/{reply_id}",
                web::delete().to(delete_reply),
            )
            .route("/{post_id}/{comment_id}/like", web::post().to(like_comment))
            .route("/{post_id}/{comment_id}/like", web::delete().to(unlike_comment))
            .route("/{post_id}/{comment_id}/dislike", web::post().to(dislike_comment))
            .route(
                "/{post_id}/{comment_id}/dislike",
                web::delete().to(undislike_comment),
            ),
    );
}
