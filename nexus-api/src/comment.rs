use crate::{de, CommentId, Time, User, UserId};

/// A comment in the canonical shape used throughout the client.
///
/// `replies` is never read from the wire: it is only filled in by the client
/// when it assembles the discussion tree.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(from = "WireComment")]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub author_id: UserId,
    pub author_name: String,
    pub parent_id: Option<CommentId>,
    pub created_at: Option<Time>,

    /// Direct replies, in arrival order
    pub replies: Vec<Comment>,
}

/// Everything the backend has been seen to send for a comment
#[derive(serde::Deserialize)]
struct WireComment {
    #[serde(alias = "ID")]
    id: CommentId,

    #[serde(default, deserialize_with = "de::null_as_default")]
    content: String,

    #[serde(default)]
    author: Option<User>,

    #[serde(default, alias = "authorId", alias = "AuthorID", alias = "user_id")]
    author_id: Option<UserId>,

    #[serde(default, alias = "authorName")]
    author_name: Option<String>,

    #[serde(
        default,
        alias = "parentId",
        alias = "ParentID",
        deserialize_with = "de::zero_as_none"
    )]
    parent_id: Option<CommentId>,

    #[serde(
        default,
        alias = "createdAt",
        alias = "CreatedAt",
        deserialize_with = "de::lenient_time"
    )]
    created_at: Option<Time>,
}

impl From<WireComment> for Comment {
    fn from(c: WireComment) -> Comment {
        let (author_id, author_name) = match c.author {
            Some(author) => (author.id, author.username),
            None => (
                c.author_id.unwrap_or(UserId(0)),
                c.author_name.unwrap_or_default(),
            ),
        };
        Comment {
            id: c.id,
            content: c.content,
            author_id,
            author_name,
            parent_id: c.parent_id,
            created_at: c.created_at,
            replies: Vec::new(),
        }
    }
}

impl Comment {
    /// Advisory only: the backend is the one enforcing ownership
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author_id == user.id
    }

    pub fn author_initial(&self) -> char {
        self.author_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('U')
    }
}

/// Data of `GET /posts/{id}/comments/`
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentList {
    #[serde(default, alias = "Comments", deserialize_with = "de::null_as_default")]
    pub comments: Vec<Comment>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

/// Data of `POST /posts/{id}/comments/`: either `{comment: {..}}` or the comment itself
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum CreatedComment {
    Wrapped { comment: Comment },
    Bare(Comment),
}

impl From<CreatedComment> for Comment {
    fn from(c: CreatedComment) -> Comment {
        match c {
            CreatedComment::Wrapped { comment } => comment,
            CreatedComment::Bare(comment) => comment,
        }
    }
}
