use crate::comment::model::{Comment, Reaction};
use crate::utils::context::RequestContext;
use crate::utils::error::CustomError;
use chrono::Utc;
use futures_util::TryStreamExt;
use log::{info, warn};
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::{Client, Collection};
use std::collections::HashMap;

pub struct CommentService {
    collection: Collection<Comment>,
}

impl CommentService {
    pub fn new(client: &Client) -> Self {
        let collection = client
            .database("comments_db")
            .collection::<Comment>("comments");
        CommentService { collection }
    }

    /// Look up a comment by its composite key. A comment id that exists
    /// under a different post is not a match. Tombstone state is checked by
    /// the callers, which map it to different outcomes per operation.
    async fn resolve(
        &self,
        post_id: &ObjectId,
        comment_id: &ObjectId,
    ) -> Result<Comment, CustomError> {
        self.collection
            .find_one(doc! { "_id": comment_id, "post_id": post_id })
            .await
            .map_err(|e| CustomError::UnavailableError(format!("Failed to fetch comment: {}", e)))?
            .ok_or_else(|| CustomError::NotFoundError("Comment not found".to_string()))
    }

    /// Tombstone a resolved, still-live comment. One guarded `$set`: the
    /// content is destroyed, the child list moves to `detached_children`,
    /// identity and structure fields survive.
    async fn tombstone(&self, comment: &Comment) -> Result<(), CustomError> {
        let comment_id = comment.id.ok_or_else(|| {
            CustomError::InternalServerError("Comment is missing its ID".to_string())
        })?;

        let mut tombstoned = comment.clone();
        tombstoned.tombstone();

        let result = self
            .collection
            .update_one(
                doc! { "_id": comment_id, "deleted": false },
                doc! {
                    "$set": {
                        "deleted": true,
                        "detached_children": tombstoned.detached_children.clone(),
                        "children": [],
                        "body": "",
                        "summary": "",
                        "updated_at": tombstoned.updated_at.to_rfc3339(),
                    }
                },
            )
            .await
            .map_err(|e| {
                CustomError::UnavailableError(format!("Failed to delete comment: {}", e))
            })?;

        if result.matched_count == 0 {
            return Err(CustomError::AlreadyDeletedError(
                "Comment has been deleted".to_string(),
            ));
        }

        Ok(())
    }

    /// Add a new top-level comment to a post
    pub async fn add_comment(
        &self,
        ctx: &RequestContext,
        post_id: ObjectId,
        body: String,
        summary: String,
    ) -> Result<Comment, CustomError> {
        let mut comment = Comment::new(post_id, ctx.caller_id, None, body, summary);

        let result = self.collection.insert_one(&comment).await.map_err(|e| {
            CustomError::UnavailableError(format!("Failed to add comment: {}", e))
        })?;

        let comment_id = result.inserted_id.as_object_id().ok_or_else(|| {
            CustomError::InternalServerError("Failed to get inserted comment ID".to_string())
        })?;
        comment.id = Some(comment_id);

        info!(
            "[req {}] caller {} created comment {} on post {}",
            ctx.request_id, ctx.caller_id, comment_id, post_id
        );

        Ok(comment)
    }

    /// Get a single comment. A tombstoned comment is reported as
    /// AlreadyDeleted, not as missing.
    pub async fn get_comment(
        &self,
        post_id: &ObjectId,
        comment_id: &ObjectId,
    ) -> Result<Comment, CustomError> {
        let comment = self.resolve(post_id, comment_id).await?;
        comment.ensure_live()?;
        Ok(comment)
    }

    /// Get every non-deleted comment of a post, top-level and replies alike.
    /// Clients reassemble the thread through `parent_id`.
    pub async fn get_comments_for_post(
        &self,
        post_id: &ObjectId,
    ) -> Result<Vec<Comment>, CustomError> {
        let cursor = self
            .collection
            .find(doc! { "post_id": post_id, "deleted": false })
            .await
            .map_err(|e| {
                CustomError::UnavailableError(format!("Failed to fetch comments: {}", e))
            })?;

        cursor.try_collect().await.map_err(|e| {
            CustomError::UnavailableError(format!("Failed to collect comments: {}", e))
        })
    }

    /// Update a comment's content (only the author, only before deletion).
    /// The patch is allow-listed to `body` and `summary`.
    pub async fn update_comment(
        &self,
        ctx: &RequestContext,
        post_id: &ObjectId,
        comment_id: &ObjectId,
        body: Option<String>,
        summary: Option<String>,
    ) -> Result<(), CustomError> {
        let comment = self.resolve(post_id, comment_id).await?;
        comment.ensure_live()?;
        comment.ensure_owned_by(&ctx.caller_id)?;

        let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
        if let Some(body) = body {
            set.insert("body", body);
        }
        if let Some(summary) = summary {
            set.insert("summary", summary);
        }

        let result = self
            .collection
            .update_one(
                doc! { "_id": comment_id, "deleted": false },
                doc! { "$set": set },
            )
            .await
            .map_err(|e| {
                CustomError::UnavailableError(format!("Failed to update comment: {}", e))
            })?;

        if result.matched_count == 0 {
            return Err(CustomError::AlreadyDeletedError(
                "Comment has been deleted".to_string(),
            ));
        }

        Ok(())
    }

    /// Delete a comment (only the author). The document is kept as a
    /// tombstone so replies stay addressable; a second delete is rejected
    /// as AlreadyDeleted before this point.
    pub async fn delete_comment(
        &self,
        ctx: &RequestContext,
        post_id: &ObjectId,
        comment_id: &ObjectId,
    ) -> Result<(), CustomError> {
        let comment = self.resolve(post_id, comment_id).await?;
        comment.ensure_live()?;
        comment.ensure_owned_by(&ctx.caller_id)?;

        self.tombstone(&comment).await?;

        info!(
            "[req {}] caller {} deleted comment {} on post {}",
            ctx.request_id, ctx.caller_id, comment_id, post_id
        );

        Ok(())
    }

    /// Create a reply under a parent comment and link it into the parent's
    /// `children`. The link is a guarded `$addToSet`; when the parent was
    /// tombstoned between the two writes the orphan insert is removed again.
    pub async fn add_reply(
        &self,
        ctx: &RequestContext,
        post_id: ObjectId,
        parent_id: ObjectId,
        body: String,
        summary: String,
    ) -> Result<Comment, CustomError> {
        let mut parent = self.resolve(&post_id, &parent_id).await?;
        parent.ensure_active("reply to")?;

        let mut reply = Comment::new(post_id, ctx.caller_id, Some(parent_id), body, summary);

        let result = self.collection.insert_one(&reply).await.map_err(|e| {
            CustomError::UnavailableError(format!("Failed to add reply: {}", e))
        })?;

        let reply_id = result.inserted_id.as_object_id().ok_or_else(|| {
            CustomError::InternalServerError("Failed to get inserted reply ID".to_string())
        })?;
        reply.id = Some(reply_id);

        // $addToSet keeps the link exactly-once even under a concurrent
        // duplicate; appending preserves reply creation order.
        let linked = self
            .collection
            .update_one(
                doc! { "_id": parent_id, "deleted": false },
                doc! { "$addToSet": { "children": reply_id } },
            )
            .await
            .map_err(|e| {
                CustomError::UnavailableError(format!("Failed to link reply: {}", e))
            })?;

        if linked.matched_count == 0 {
            let _ = self.collection.delete_one(doc! { "_id": reply_id }).await;
            return Err(CustomError::ConflictError(
                "Cannot reply to a deleted comment".to_string(),
            ));
        }

        parent.attach_child(reply_id);
        info!(
            "[req {}] caller {} created reply {} under comment {} ({} linked replies)",
            ctx.request_id,
            ctx.caller_id,
            reply_id,
            parent_id,
            parent.children.len()
        );

        Ok(reply)
    }

    /// List the visible replies of a comment, in reply creation order.
    /// Tombstoned replies are filtered out; no visible reply is NotFound,
    /// which is a different outcome from the parent itself being missing.
    pub async fn get_replies(
        &self,
        post_id: &ObjectId,
        parent_id: &ObjectId,
    ) -> Result<Vec<Comment>, CustomError> {
        let parent = self.resolve(post_id, parent_id).await?;
        parent.ensure_active("list replies of")?;

        let cursor = self
            .collection
            .find(doc! {
                "_id": { "$in": parent.children.clone() },
                "post_id": post_id,
                "deleted": false,
            })
            .await
            .map_err(|e| {
                CustomError::UnavailableError(format!("Failed to fetch replies: {}", e))
            })?;

        let fetched: Vec<Comment> = cursor.try_collect().await.map_err(|e| {
            CustomError::UnavailableError(format!("Failed to collect replies: {}", e))
        })?;

        // $in does not preserve order; restore the parent's children order.
        let mut by_id: HashMap<ObjectId, Comment> = fetched
            .into_iter()
            .filter_map(|c| c.id.map(|id| (id, c)))
            .collect();
        let replies: Vec<Comment> = parent
            .children
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();

        if replies.is_empty() {
            return Err(CustomError::NotFoundError(
                "No visible replies for this comment".to_string(),
            ));
        }

        Ok(replies)
    }

    /// Delete a reply from under its parent (only the reply's author).
    ///
    /// The reply is unlinked from the parent's `children` before the author
    /// check runs; a Forbidden outcome leaves the reply detached but not
    /// tombstoned.
    pub async fn delete_reply(
        &self,
        ctx: &RequestContext,
        post_id: &ObjectId,
        parent_id: &ObjectId,
        reply_id: &ObjectId,
    ) -> Result<(), CustomError> {
        let mut parent = self.resolve(post_id, parent_id).await?;
        parent.ensure_active("modify replies of")?;

        let reply = self.resolve(post_id, reply_id).await?;
        reply.ensure_live()?;

        if !parent.detach_child(reply_id) {
            return Err(CustomError::NotFoundError(
                "Reply is not a child of this comment".to_string(),
            ));
        }

        let detached = self
            .collection
            .update_one(
                doc! { "_id": parent_id, "children": reply_id },
                doc! { "$pull": { "children": reply_id } },
            )
            .await
            .map_err(|e| {
                CustomError::UnavailableError(format!("Failed to detach reply: {}", e))
            })?;

        if detached.matched_count == 0 {
            return Err(CustomError::NotFoundError(
                "Reply is not a child of this comment".to_string(),
            ));
        }

        if let Err(err) = reply.ensure_owned_by(&ctx.caller_id) {
            warn!(
                "[req {}] reply {} detached from comment {} but caller {} is not its author",
                ctx.request_id, reply_id, parent_id, ctx.caller_id
            );
            return Err(err);
        }

        self.tombstone(&reply).await?;

        info!(
            "[req {}] caller {} deleted reply {} under comment {}",
            ctx.request_id, ctx.caller_id, reply_id, parent_id
        );

        Ok(())
    }

    /// Record a like or dislike for the caller. The opposite reaction, if
    /// present, is swapped out in the same document update so the caller is
    /// never observable in both sets.
    pub async fn react(
        &self,
        ctx: &RequestContext,
        post_id: &ObjectId,
        comment_id: &ObjectId,
        reaction: Reaction,
    ) -> Result<(), CustomError> {
        let comment = self.resolve(post_id, comment_id).await?;
        comment.ensure_active("react to")?;

        // Validate the transition on the fetched snapshot; a repeated
        // reaction is a Conflict with the sets left untouched.
        let mut snapshot = comment.clone();
        snapshot.add_reaction(ctx.caller_id, reaction)?;

        let mut filter = doc! { "_id": comment_id, "deleted": false };
        filter.insert(reaction.field(), doc! { "$ne": ctx.caller_id });

        let mut add = Document::new();
        add.insert(reaction.field(), ctx.caller_id);
        let mut pull = Document::new();
        pull.insert(reaction.opposite().field(), ctx.caller_id);

        let result = self
            .collection
            .update_one(filter, doc! { "$addToSet": add, "$pull": pull })
            .await
            .map_err(|e| {
                CustomError::UnavailableError(format!("Failed to record reaction: {}", e))
            })?;

        if result.matched_count == 0 {
            return Err(CustomError::ConflictError(format!(
                "You have already {} this comment",
                reaction.verb()
            )));
        }

        Ok(())
    }

    /// Remove the caller's like or dislike. Removing a reaction that is not
    /// present is a Conflict, including when the caller holds the opposite
    /// reaction.
    pub async fn unreact(
        &self,
        ctx: &RequestContext,
        post_id: &ObjectId,
        comment_id: &ObjectId,
        reaction: Reaction,
    ) -> Result<(), CustomError> {
        let comment = self.resolve(post_id, comment_id).await?;
        comment.ensure_active("react to")?;

        let mut snapshot = comment.clone();
        snapshot.remove_reaction(&ctx.caller_id, reaction)?;

        let mut filter = doc! { "_id": comment_id, "deleted": false };
        filter.insert(reaction.field(), ctx.caller_id);

        let mut pull = Document::new();
        pull.insert(reaction.field(), ctx.caller_id);

        let result = self
            .collection
            .update_one(filter, doc! { "$pull": pull })
            .await
            .map_err(|e| {
                CustomError::UnavailableError(format!("Failed to remove reaction: {}", e))
            })?;

        if result.matched_count == 0 {
            return Err(CustomError::ConflictError(format!(
                "You have not {} this comment",
                reaction.verb()
            )));
        }

        Ok(())
    }
}
