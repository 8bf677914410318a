use async_trait::async_trait;

use crate::{
    Comment, CommentId, Error, FavoriteState, LikeState, LoginRequest, LoginResponse, NewComment,
    NewPost, PageQuery, Post, PostId, PostPage, PostQuery, Profile, ProfileUpdate, TagCount,
    UserPostStatus, VerifyPasswordReset, VerifyRegister,
};

/// The forum backend, as seen by the client.
///
/// Implementations attach their own credentials; operations that need a
/// logged-in user fail with an authentication error when there are none.
/// Futures are not `Send` so that the browser implementation can use it.
#[async_trait(?Send)]
pub trait Backend {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, Error>;

    async fn register(&self, email: &str) -> Result<(), Error>;

    async fn verify_register(&self, req: &VerifyRegister) -> Result<(), Error>;

    async fn request_password_reset(&self, email: &str) -> Result<(), Error>;

    async fn verify_password_reset(&self, req: &VerifyPasswordReset) -> Result<(), Error>;

    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, Error>;

    async fn popular_posts(&self, limit: u32) -> Result<Vec<Post>, Error>;

    async fn get_post(&self, post: PostId) -> Result<Post, Error>;

    /// Returns the id of the new post, when the backend tells it
    async fn create_post(&self, post: &NewPost) -> Result<Option<PostId>, Error>;

    async fn update_post(&self, id: PostId, post: &NewPost) -> Result<(), Error>;

    async fn delete_post(&self, post: PostId) -> Result<(), Error>;

    async fn toggle_like(&self, post: PostId) -> Result<LikeState, Error>;

    async fn toggle_favorite(&self, post: PostId) -> Result<FavoriteState, Error>;

    async fn user_status(&self, post: PostId) -> Result<UserPostStatus, Error>;

    /// Flat list, in the backend's order, `replies` left empty
    async fn list_comments(&self, post: PostId, page: PageQuery) -> Result<Vec<Comment>, Error>;

    async fn add_comment(&self, post: PostId, comment: &NewComment) -> Result<Comment, Error>;

    async fn delete_comment(&self, comment: CommentId) -> Result<(), Error>;

    async fn list_tags(&self, sorted_by: Option<&str>) -> Result<Vec<TagCount>, Error>;

    async fn get_profile(&self) -> Result<Profile, Error>;

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), Error>;

    /// Returns the new avatar URL, when the backend tells it
    async fn upload_avatar(&self, file_name: String, bytes: Vec<u8>)
        -> Result<Option<String>, Error>;
}
