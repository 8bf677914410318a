use chrono::Utc;

mod auth;
pub use auth::{AuthToken, LoginRequest, LoginResponse, PasswordResetRequest, RegisterRequest, VerifyPasswordReset, VerifyRegister};

mod backend;
pub use backend::Backend;

mod comment;
pub use comment::{Comment, CommentList, CreatedComment, NewComment};

mod de;

mod envelope;
pub use envelope::{Envelope, TOKEN_INVALID_CODE};

mod error;
pub use error::Error;

mod post;
pub use post::{
    CreatedPost, FavoriteState, LikeState, NewPost, PageQuery, Post, PostPage, PostQuery, PostRef,
    TagCount, UserPostStatus,
};

mod user;
pub use user::{Gender, Profile, ProfileUpdate, User};

pub type Time = chrono::DateTime<Utc>;

pub const API_PREFIX: &str = "/api/v1";

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct UserId(pub u64);

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct PostId(pub u64);

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub u64);

macro_rules! impl_display_for_id {
    ($($id:ident),*) => {$(
        impl std::fmt::Display for $id {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<u64> for $id {
            fn from(id: u64) -> $id {
                $id(id)
            }
        }

        impl std::str::FromStr for $id {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map($id)
            }
        }
    )*};
}

impl_display_for_id!(UserId, PostId, CommentId);

/// Checks that a user-provided text field has something other than whitespace
pub fn validate_not_blank(field: &'static str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(())
}
