use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde_json::Value;

use crate::api::{
    AuthToken, Backend, Comment, CommentId, CommentList, CreatedComment, CreatedPost, Envelope,
    Error, FavoriteState, LikeState, LoginRequest, LoginResponse, NewComment, NewPost,
    PasswordResetRequest, PageQuery, Post, PostId, PostPage, PostQuery, Profile, ProfileUpdate,
    RegisterRequest, TagCount, UserPostStatus, VerifyPasswordReset, VerifyRegister, API_PREFIX,
};

pub const DEFAULT_HOST: &str = "http://localhost:8080";

/// [`Backend`] over the forum's REST API
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    host: String,
    token: Option<AuthToken>,
}

impl HttpBackend {
    pub fn new(host: impl Into<String>) -> HttpBackend {
        HttpBackend::with_client(reqwest::Client::new(), host)
    }

    pub fn with_client(client: reqwest::Client, host: impl Into<String>) -> HttpBackend {
        let host = host.into();
        HttpBackend {
            client,
            host: host.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(self, token: Option<AuthToken>) -> HttpBackend {
        HttpBackend { token, ..self }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.host, API_PREFIX, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.client.request(method, self.url(path));
        match &self.token {
            Some(tok) => req.bearer_auth(&tok.0),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Envelope, Error> {
        let resp = req
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        if !status.is_success() {
            let err = Error::from_http(status, &body);
            tracing::debug!(%status, error = %err, "backend returned an error status");
            return Err(err);
        }
        Envelope::parse(&body)
    }

    async fn get(&self, path: &str) -> Result<Envelope, Error> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn call<B: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Envelope, Error> {
        self.send(self.request(method, path).json(body)).await
    }
}

/// Some list endpoints send the array bare, others wrap it in an object
fn posts_of(data: Value) -> Result<Vec<Post>, Error> {
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => serde_json::from_value(data),
        data => serde_json::from_value::<PostPage>(data).map(|p| p.posts),
    }
    .map_err(|e| Error::MalformedResponse(e.to_string()))
}

fn avatar_url_of(data: Value) -> Option<String> {
    match data {
        Value::String(url) => Some(url),
        Value::Object(map) => ["avatar", "avatar_url", "url"]
            .iter()
            .find_map(|k| map.get(*k).and_then(|v| v.as_str()).map(String::from)),
        _ => None,
    }
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, Error> {
        req.validate()?;
        self.call(Method::POST, "/users/login", req)
            .await?
            .into_data()
    }

    async fn register(&self, email: &str) -> Result<(), Error> {
        let req = RegisterRequest {
            email: email.to_string(),
        };
        self.call(Method::POST, "/users/register", &req).await?;
        Ok(())
    }

    async fn verify_register(&self, req: &VerifyRegister) -> Result<(), Error> {
        req.validate()?;
        self.call(Method::POST, "/users/verify-register", req).await?;
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        let req = PasswordResetRequest {
            email: email.to_string(),
        };
        self.call(Method::POST, "/users/password/reset", &req).await?;
        Ok(())
    }

    async fn verify_password_reset(&self, req: &VerifyPasswordReset) -> Result<(), Error> {
        req.validate()?;
        self.call(Method::POST, "/users/password/verify-reset", req)
            .await?;
        Ok(())
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, Error> {
        let req = self
            .request(Method::GET, "/posts/")
            .query(&query.to_query_pairs());
        match self.send(req).await?.data {
            data @ Value::Object(_) => serde_json::from_value(data)
                .map_err(|e| Error::MalformedResponse(e.to_string())),
            data => Ok(PostPage {
                posts: posts_of(data)?,
                total: None,
            }),
        }
    }

    async fn popular_posts(&self, limit: u32) -> Result<Vec<Post>, Error> {
        let req = self
            .request(Method::GET, "/posts/popular")
            .query(&[("limit", limit)]);
        posts_of(self.send(req).await?.data)
    }

    async fn get_post(&self, post: PostId) -> Result<Post, Error> {
        self.get(&format!("/posts/{post}")).await?.into_data()
    }

    async fn create_post(&self, post: &NewPost) -> Result<Option<PostId>, Error> {
        let env = self.call(Method::POST, "/posts/", post).await?;
        match env.into_optional_data::<CreatedPost>() {
            Ok(created) => Ok(created.map(|c| c.id())),
            Err(e) => {
                tracing::warn!(error = %e, "post created, but its id could not be read");
                Ok(None)
            }
        }
    }

    async fn update_post(&self, id: PostId, post: &NewPost) -> Result<(), Error> {
        self.call(Method::PUT, &format!("/posts/{id}"), post).await?;
        Ok(())
    }

    async fn delete_post(&self, post: PostId) -> Result<(), Error> {
        self.send(self.request(Method::DELETE, &format!("/posts/{post}")))
            .await?;
        Ok(())
    }

    async fn toggle_like(&self, post: PostId) -> Result<LikeState, Error> {
        self.send(self.request(Method::POST, &format!("/posts/{post}/like/")))
            .await?
            .into_data()
    }

    async fn toggle_favorite(&self, post: PostId) -> Result<FavoriteState, Error> {
        self.send(self.request(Method::POST, &format!("/posts/{post}/favorite/")))
            .await?
            .into_data()
    }

    async fn user_status(&self, post: PostId) -> Result<UserPostStatus, Error> {
        Ok(self
            .get(&format!("/posts/{post}/user-status"))
            .await?
            .into_optional_data()?
            .unwrap_or_default())
    }

    async fn list_comments(&self, post: PostId, page: PageQuery) -> Result<Vec<Comment>, Error> {
        let req = self
            .request(Method::GET, &format!("/posts/{post}/comments/"))
            .query(&[("page", page.page), ("size", page.size)]);
        let list: Option<CommentList> = self.send(req).await?.into_optional_data()?;
        Ok(list.map(|l| l.comments).unwrap_or_default())
    }

    async fn add_comment(&self, post: PostId, comment: &NewComment) -> Result<Comment, Error> {
        let created: CreatedComment = self
            .call(Method::POST, &format!("/posts/{post}/comments/"), comment)
            .await?
            .into_data()?;
        Ok(created.into())
    }

    async fn delete_comment(&self, comment: CommentId) -> Result<(), Error> {
        self.send(self.request(Method::DELETE, &format!("/comments/{comment}")))
            .await?;
        Ok(())
    }

    async fn list_tags(&self, sorted_by: Option<&str>) -> Result<Vec<TagCount>, Error> {
        let mut req = self.request(Method::GET, "/tags/");
        if let Some(s) = sorted_by.filter(|s| !s.is_empty()) {
            req = req.query(&[("sortedBy", s)]);
        }
        Ok(self.send(req).await?.into_optional_data()?.unwrap_or_default())
    }

    async fn get_profile(&self) -> Result<Profile, Error> {
        self.get("/me/").await?.into_data()
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), Error> {
        self.call(Method::PUT, "/me/", update).await?;
        Ok(())
    }

    async fn upload_avatar(
        &self,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<Option<String>, Error> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("avatar", part);
        let env = self
            .send(self.request(Method::POST, "/me/avatar").multipart(form))
            .await?;
        Ok(avatar_url_of(env.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls() {
        let b = HttpBackend::new("http://forum.example/");
        assert_eq!(b.url("/posts/3"), "http://forum.example/api/v1/posts/3");
        assert_eq!(HttpBackend::new(DEFAULT_HOST).host(), "http://localhost:8080");
    }

    #[test]
    fn post_lists_in_every_shape() {
        let bare = serde_json::json!([{"id": 1, "author": {"id": 1}}]);
        assert_eq!(posts_of(bare).unwrap().len(), 1);
        let wrapped = serde_json::json!({"Post": [{"ID": 1, "author": {"ID": 1}}]});
        assert_eq!(posts_of(wrapped).unwrap().len(), 1);
        assert!(posts_of(Value::Null).unwrap().is_empty());
        assert!(matches!(
            posts_of(serde_json::json!(3)),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn avatar_url_shapes() {
        assert_eq!(
            avatar_url_of(serde_json::json!("/a.png")).as_deref(),
            Some("/a.png")
        );
        assert_eq!(
            avatar_url_of(serde_json::json!({"avatar_url": "/b.png"})).as_deref(),
            Some("/b.png")
        );
        assert_eq!(avatar_url_of(serde_json::json!({})), None);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // port 9 is discard, nothing listens there in test environments
        let b = HttpBackend::new("http://127.0.0.1:9");
        assert!(matches!(
            b.get_post(PostId(1)).await,
            Err(Error::Transport(_))
        ));
    }

    #[tokio::test]
    async fn blank_login_never_leaves_the_client() {
        let b = HttpBackend::new("http://127.0.0.1:9");
        let req = LoginRequest {
            identifier: String::from(" "),
            password: String::from("pw"),
        };
        assert!(matches!(b.login(&req).await, Err(Error::Validation(_))));
    }
}
