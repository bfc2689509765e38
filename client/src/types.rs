//! Wire types for the post aggregate service
//!
//! Field names mirror the service's JSON exactly (camelCase, and the
//! literal `_count` key for aggregate counts). `content` stays an opaque
//! string here - decoding it into a todo list is `daylog-core`'s job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Grouping tag for a post. Presentation-only: it does not change the
/// todo encoding inside `content`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Dated schedule entry
    Schedule,
    /// Daily to-do card
    Daily,
}

/// Kind of media attached to a post
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Still image
    Image,
    /// Video clip
    Video,
    /// Audio clip
    Audio,
}

/// Post author, as embedded in post and comment payloads
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorPayload {
    /// Display name
    pub nickname: String,
}

/// One entry of a post's `likes` relation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeEntry {
    /// The user who liked the post
    pub user_id: String,
}

/// Aggregate counts attached to a post
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Number of likes
    pub likes: u32,
    /// Number of comments (including replies)
    pub comments: u32,
}

/// A full post as returned by the service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    /// Post identifier
    pub id: String,
    /// Post title
    pub title: String,
    /// Opaque content column - the encoded todo list (or legacy text)
    pub content: String,
    /// Grouping tag; absent on very old rows
    #[serde(default)]
    pub category: Option<Category>,
    /// Schedule date, when the post is a schedule entry
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Attached media location
    #[serde(default)]
    pub media_url: Option<String>,
    /// Attached media kind
    #[serde(default)]
    pub media_type: Option<MediaType>,
    /// Owning author's user id
    pub author_id: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Embedded author record
    pub author: AuthorPayload,
    /// Who liked this post; omitted by some list endpoints
    #[serde(default)]
    pub likes: Vec<LikeEntry>,
    /// Aggregate counts
    #[serde(rename = "_count")]
    pub counts: Counts,
}

/// Full-content replace sent to `PUT /posts/{id}`
///
/// There is no partial/delta todo endpoint: every todo mutation rewrites
/// the whole encoded list through this request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
    /// Post title (unchanged titles are re-sent as-is)
    pub title: String,
    /// Canonical encoding of the full todo list
    pub content: String,
    /// Attached media location, `null` to clear
    pub media_url: Option<String>,
    /// Attached media kind, `null` to clear
    pub media_type: Option<MediaType>,
}

/// Creation request for `POST /posts`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    /// Post title
    pub title: String,
    /// Canonical encoding of the drafted todo list
    pub content: String,
    /// Grouping tag chosen at creation
    pub category: Category,
    /// Schedule date; set for schedule entries, absent for daily cards
    pub date: Option<DateTime<Utc>>,
    /// Attached media location
    pub media_url: Option<String>,
    /// Attached media kind
    pub media_type: Option<MediaType>,
}

/// Response of the idempotent like toggle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    /// Whether the current user now likes the post (server-authoritative)
    pub liked: bool,
    /// Authoritative like count, when the service supplies one
    #[serde(default)]
    pub like_count: Option<u32>,
}

/// A comment, with one level of nested replies
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    /// Comment identifier
    pub id: String,
    /// Comment body
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Comment author's user id
    pub author_id: String,
    /// Parent comment id for replies
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Embedded author record
    pub author: AuthorPayload,
    /// Direct replies to this comment
    #[serde(default)]
    pub replies: Vec<CommentPayload>,
}

/// Creation request for `POST /posts/{id}/comments`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    /// Comment body, already trimmed
    pub content: String,
    /// Parent comment id when replying
    pub parent_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Category, LikeResponse, NewComment, PostPayload, UpdatePost};

    #[test]
    fn post_payload_parses_service_shape() {
        let json = r#"{
            "id": "p1",
            "title": "groceries",
            "content": "[{\"text\":\"milk\",\"completed\":false}]",
            "category": "daily",
            "mediaUrl": null,
            "mediaType": null,
            "authorId": "u1",
            "createdAt": "2024-03-01T09:00:00Z",
            "author": { "nickname": "mina" },
            "likes": [ { "userId": "u2" } ],
            "_count": { "likes": 1, "comments": 3 }
        }"#;

        let post: PostPayload = serde_json::from_str(json).unwrap();
        assert_eq!(post.category, Some(Category::Daily));
        assert_eq!(post.likes[0].user_id, "u2");
        assert_eq!(post.counts.likes, 1);
        assert_eq!(post.counts.comments, 3);
    }

    #[test]
    fn update_post_serializes_nulls_for_cleared_media() {
        let update = UpdatePost {
            title: "t".to_string(),
            content: "[]".to_string(),
            media_url: None,
            media_type: None,
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(
            json,
            r#"{"title":"t","content":"[]","mediaUrl":null,"mediaType":null}"#
        );
    }

    #[test]
    fn like_response_count_is_optional() {
        let bare: LikeResponse = serde_json::from_str(r#"{"liked":true}"#).unwrap();
        assert_eq!(bare.like_count, None);

        let counted: LikeResponse =
            serde_json::from_str(r#"{"liked":false,"likeCount":4}"#).unwrap();
        assert_eq!(counted.like_count, Some(4));
    }

    #[test]
    fn new_comment_serializes_null_parent() {
        let comment = NewComment {
            content: "nice".to_string(),
            parent_id: None,
        };
        assert_eq!(
            serde_json::to_string(&comment).unwrap(),
            r#"{"content":"nice","parentId":null}"#
        );
    }
}
