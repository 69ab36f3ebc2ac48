use crate::utils::error::CustomError;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A comment on a post, or a reply to another comment.
///
/// `likes`, `dislikes` and `children` are persisted as arrays but used as
/// sets; element order of the reaction arrays carries no meaning, while
/// `children` keeps reply creation order. Uniqueness is enforced by the
/// methods below and by the guarded updates in the service layer.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Comment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub post_id: ObjectId,
    pub author_id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectId>,
    pub children: Vec<ObjectId>,
    pub detached_children: Vec<ObjectId>,
    pub body: String,
    pub summary: String,
    pub likes: Vec<ObjectId>,
    pub dislikes: Vec<ObjectId>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A caller's like or dislike on a comment. The two are mutually exclusive
/// per caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    /// Document field holding this reaction's caller set.
    pub fn field(&self) -> &'static str {
        match self {
            Reaction::Like => "likes",
            Reaction::Dislike => "dislikes",
        }
    }

    pub fn opposite(&self) -> Reaction {
        match self {
            Reaction::Like => Reaction::Dislike,
            Reaction::Dislike => Reaction::Like,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Reaction::Like => "liked",
            Reaction::Dislike => "disliked",
        }
    }
}

impl Comment {
    pub fn new(
        post_id: ObjectId,
        author_id: ObjectId,
        parent_id: Option<ObjectId>,
        body: String,
        summary: String,
    ) -> Self {
        Comment {
            id: None,
            post_id,
            author_id,
            parent_id,
            children: Vec::new(),
            detached_children: Vec::new(),
            body,
            summary,
            likes: Vec::new(),
            dislikes: Vec::new(),
            deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Fail with `AlreadyDeleted` when the comment is tombstoned. Used on
    /// the get/update/delete paths, where a tombstoned target is a distinct
    /// outcome from a missing one.
    pub fn ensure_live(&self) -> Result<(), CustomError> {
        if self.deleted {
            return Err(CustomError::AlreadyDeletedError(
                "Comment has been deleted".to_string(),
            ));
        }
        Ok(())
    }

    /// Fail with `Conflict` when the comment is tombstoned. A tombstoned
    /// comment accepts no new replies, exposes no reply list, and rejects
    /// all reactions.
    pub fn ensure_active(&self, action: &str) -> Result<(), CustomError> {
        if self.deleted {
            return Err(CustomError::ConflictError(format!(
                "Cannot {} a deleted comment",
                action
            )));
        }
        Ok(())
    }

    /// Ownership check for author-restricted operations (edit, delete,
    /// reply-delete). Reactions are open to any authenticated caller.
    pub fn ensure_owned_by(&self, caller_id: &ObjectId) -> Result<(), CustomError> {
        if self.author_id != *caller_id {
            return Err(CustomError::ForbiddenError(
                "Only the author may modify this comment".to_string(),
            ));
        }
        Ok(())
    }

    pub fn reaction_of(&self, caller_id: &ObjectId) -> Option<Reaction> {
        if self.likes.contains(caller_id) {
            Some(Reaction::Like)
        } else if self.dislikes.contains(caller_id) {
            Some(Reaction::Dislike)
        } else {
            None
        }
    }

    fn reaction_set_mut(&mut self, reaction: Reaction) -> &mut Vec<ObjectId> {
        match reaction {
            Reaction::Like => &mut self.likes,
            Reaction::Dislike => &mut self.dislikes,
        }
    }

    /// Record a reaction for `caller_id`. A repeated reaction is a
    /// `Conflict`; the opposite reaction is swapped out so the caller is
    /// never present in both sets.
    pub fn add_reaction(
        &mut self,
        caller_id: ObjectId,
        reaction: Reaction,
    ) -> Result<(), CustomError> {
        match self.reaction_of(&caller_id) {
            Some(current) if current == reaction => Err(CustomError::ConflictError(format!(
                "You have already {} this comment",
                reaction.verb()
            ))),
            Some(current) => {
                self.reaction_set_mut(current).retain(|id| id != &caller_id);
                self.reaction_set_mut(reaction).push(caller_id);
                Ok(())
            }
            None => {
                self.reaction_set_mut(reaction).push(caller_id);
                Ok(())
            }
        }
    }

    /// Remove a reaction previously recorded by `caller_id`. Removing a
    /// reaction that is not present is a `Conflict`, including when the
    /// caller currently holds the opposite reaction.
    pub fn remove_reaction(
        &mut self,
        caller_id: &ObjectId,
        reaction: Reaction,
    ) -> Result<(), CustomError> {
        if self.reaction_of(caller_id) != Some(reaction) {
            return Err(CustomError::ConflictError(format!(
                "You have not {} this comment",
                reaction.verb()
            )));
        }
        self.reaction_set_mut(reaction).retain(|id| id != caller_id);
        Ok(())
    }

    /// Link a reply id under this comment. Appending is idempotent per id;
    /// `children` keeps reply creation order.
    pub fn attach_child(&mut self, child_id: ObjectId) {
        if !self.children.contains(&child_id) {
            self.children.push(child_id);
        }
    }

    /// Unlink a reply id. Returns false when the id is not a child of this
    /// comment, which callers report as `NotFound`.
    pub fn detach_child(&mut self, child_id: &ObjectId) -> bool {
        let before = self.children.len();
        self.children.retain(|id| id != child_id);
        self.children.len() != before
    }

    /// Tombstone this comment: the content is destroyed, the child list is
    /// preserved in `detached_children`, and identity/structure fields
    /// (`id`, `post_id`, `author_id`, `parent_id`) survive so that replies
    /// stay addressable through their `parent_id`.
    pub fn tombstone(&mut self) {
        self.deleted = true;
        self.detached_children = std::mem::take(&mut self.children);
        self.body.clear();
        self.summary.clear();
        self.updated_at = Utc::now();
    }
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub post_id: String,
    pub body: String,
    pub summary: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateReplyRequest {
    pub body: String,
    pub summary: Option<String>,
}

/// Allow-listed partial update. Only the free-text content fields can be
/// patched; identity and structure fields are not addressable here.
#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub body: Option<String>,
    pub summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(author: ObjectId) -> Comment {
        Comment::new(
            ObjectId::new(),
            author,
            None,
            "first".to_string(),
            "a comment".to_string(),
        )
    }

    #[test]
    fn test_tombstone_clears_content_and_preserves_children() {
        let author = ObjectId::new();
        let mut c = comment(author);
        let (r1, r2) = (ObjectId::new(), ObjectId::new());
        c.attach_child(r1);
        c.attach_child(r2);

        c.tombstone();

        assert!(c.deleted);
        assert_eq!(c.body, "");
        assert_eq!(c.summary, "");
        assert!(c.children.is_empty());
        assert_eq!(c.detached_children, vec![r1, r2]);
        assert_eq!(c.author_id, author);
    }

    #[test]
    fn test_tombstoned_comment_rejects_everything() {
        let mut c = comment(ObjectId::new());
        c.tombstone();

        assert!(matches!(
            c.ensure_live(),
            Err(CustomError::AlreadyDeletedError(_))
        ));
        assert!(matches!(
            c.ensure_active("reply to"),
            Err(CustomError::ConflictError(_))
        ));
    }

    #[test]
    fn test_duplicate_like_is_conflict_and_leaves_set_unchanged() {
        let mut c = comment(ObjectId::new());
        let caller = ObjectId::new();

        c.add_reaction(caller, Reaction::Like).unwrap();
        let result = c.add_reaction(caller, Reaction::Like);

        assert!(matches!(result, Err(CustomError::ConflictError(_))));
        assert_eq!(c.likes, vec![caller]);
        assert!(c.dislikes.is_empty());
    }

    #[test]
    fn test_reaction_swap_never_lands_in_both_sets() {
        let mut c = comment(ObjectId::new());
        let caller = ObjectId::new();

        c.add_reaction(caller, Reaction::Like).unwrap();
        c.add_reaction(caller, Reaction::Dislike).unwrap();

        assert!(c.likes.is_empty());
        assert_eq!(c.dislikes, vec![caller]);

        c.add_reaction(caller, Reaction::Like).unwrap();
        assert_eq!(c.likes, vec![caller]);
        assert!(c.dislikes.is_empty());
    }

    #[test]
    fn test_reactions_from_distinct_callers_are_independent() {
        let author = ObjectId::new();
        let mut c = comment(author);
        let other = ObjectId::new();

        // The author may react to their own comment.
        c.add_reaction(author, Reaction::Like).unwrap();
        c.add_reaction(other, Reaction::Dislike).unwrap();

        assert_eq!(c.likes, vec![author]);
        assert_eq!(c.dislikes, vec![other]);
    }

    #[test]
    fn test_exclusivity_holds_across_arbitrary_sequences() {
        let mut c = comment(ObjectId::new());
        let caller = ObjectId::new();

        let _ = c.add_reaction(caller, Reaction::Like);
        let _ = c.add_reaction(caller, Reaction::Dislike);
        let _ = c.remove_reaction(&caller, Reaction::Like);
        let _ = c.add_reaction(caller, Reaction::Dislike);
        let _ = c.remove_reaction(&caller, Reaction::Dislike);
        let _ = c.add_reaction(caller, Reaction::Like);

        let in_likes = c.likes.contains(&caller) as u8;
        let in_dislikes = c.dislikes.contains(&caller) as u8;
        assert!(in_likes + in_dislikes <= 1);
        assert_eq!(c.reaction_of(&caller), Some(Reaction::Like));
    }

    #[test]
    fn test_removing_absent_or_opposite_reaction_is_conflict() {
        let mut c = comment(ObjectId::new());
        let caller = ObjectId::new();

        assert!(matches!(
            c.remove_reaction(&caller, Reaction::Like),
            Err(CustomError::ConflictError(_))
        ));

        c.add_reaction(caller, Reaction::Dislike).unwrap();
        assert!(matches!(
            c.remove_reaction(&caller, Reaction::Like),
            Err(CustomError::ConflictError(_))
        ));
        assert_eq!(c.dislikes, vec![caller]);
    }

    #[test]
    fn test_non_author_is_forbidden() {
        let author = ObjectId::new();
        let c = comment(author);
        let stranger = ObjectId::new();

        assert!(matches!(
            c.ensure_owned_by(&stranger),
            Err(CustomError::ForbiddenError(_))
        ));
        assert!(c.ensure_owned_by(&author).is_ok());
    }

    #[test]
    fn test_attach_child_is_append_once() {
        let mut c = comment(ObjectId::new());
        let (r1, r2) = (ObjectId::new(), ObjectId::new());

        c.attach_child(r1);
        c.attach_child(r2);
        c.attach_child(r1);

        assert_eq!(c.children, vec![r1, r2]);
    }

    #[test]
    fn test_detach_child_reports_membership() {
        let mut c = comment(ObjectId::new());
        let r1 = ObjectId::new();
        c.attach_child(r1);

        assert!(!c.detach_child(&ObjectId::new()));
        assert_eq!(c.children, vec![r1]);

        assert!(c.detach_child(&r1));
        assert!(c.children.is_empty());
    }
}
