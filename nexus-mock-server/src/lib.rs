use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap, HashSet},
};

use async_trait::async_trait;
use nexus_api::{
    AuthToken, Backend, Comment, CommentId, Error, FavoriteState, LikeState, LoginRequest,
    LoginResponse, NewComment, NewPost, PageQuery, Post, PostId, PostPage, PostQuery, Profile,
    ProfileUpdate, TagCount, User, UserId, UserPostStatus, VerifyPasswordReset, VerifyRegister,
    TOKEN_INVALID_CODE,
};

const NOT_FOUND_CODE: i64 = 40004;
const PERMISSION_DENIED_CODE: i64 = 40003;
const CONFLICT_CODE: i64 = 40009;
const BAD_CODE_CODE: i64 = 40010;

/// In-memory forum backend, with the same observable behavior as the real
/// one as far as the client is concerned
pub struct MockServer {
    state: RefCell<State>,
    requests: Cell<usize>,
    fail_next: RefCell<Option<Error>>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    users: BTreeMap<UserId, DbUser>,
    sessions: HashMap<AuthToken, UserId>,
    pending_codes: HashMap<String, String>,
    posts: BTreeMap<PostId, DbPost>,
    // flat, in creation order
    comments: Vec<(PostId, Comment)>,
}

#[derive(Debug)]
struct DbUser {
    user: User,
    password: String,
    profile: Profile,
}

#[derive(Debug)]
struct DbPost {
    post: Post,
    likes: HashSet<UserId>,
    favorites: HashSet<UserId>,
}

impl DbPost {
    fn view_for(&self, viewer: Option<UserId>) -> Post {
        let mut p = self.post.clone();
        p.like_count = self.likes.len() as i64;
        p.favorite_count = self.favorites.len() as i64;
        p.liked = viewer.map(|u| self.likes.contains(&u)).unwrap_or(false);
        p.favorited = viewer.map(|u| self.favorites.contains(&u)).unwrap_or(false);
        p
    }
}

impl State {
    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn resolve(&self, tok: Option<&AuthToken>) -> Result<UserId, Error> {
        tok.and_then(|t| self.sessions.get(t))
            .copied()
            .ok_or_else(|| Error::from_code(TOKEN_INVALID_CODE, "authentication token is invalid"))
    }

    fn post_mut(&mut self, id: PostId) -> Result<&mut DbPost, Error> {
        self.posts
            .get_mut(&id)
            .ok_or_else(|| Error::from_code(NOT_FOUND_CODE, "post not found"))
    }

    fn user(&self, id: UserId) -> Result<&DbUser, Error> {
        self.users
            .get(&id)
            .ok_or_else(|| Error::from_code(NOT_FOUND_CODE, "user not found"))
    }
}

fn paginate<T>(items: Vec<T>, page: PageQuery) -> Vec<T> {
    let skip = (page.page.max(1) as usize - 1) * page.size as usize;
    items.into_iter().skip(skip).take(page.size as usize).collect()
}

impl Default for MockServer {
    fn default() -> Self {
        MockServer::new()
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            state: RefCell::new(State::default()),
            requests: Cell::new(0),
            fail_next: RefCell::new(None),
        }
    }

    /// A client of this server, acting with `token`
    pub fn client(&self, token: Option<AuthToken>) -> MockBackend<'_> {
        MockBackend {
            server: self,
            token,
        }
    }

    /// Number of requests that reached the server so far
    pub fn test_num_requests(&self) -> usize {
        self.requests.get()
    }

    /// Make the next request fail with `err`, without touching any state
    pub fn test_fail_next(&self, err: Error) {
        *self.fail_next.borrow_mut() = Some(err);
    }

    pub fn admin_create_user(&self, username: &str, password: &str) -> User {
        let mut s = self.state.borrow_mut();
        let id = UserId(s.fresh_id());
        let user = User {
            id,
            username: username.to_string(),
            email: Some(format!("{username}@example.org")),
            avatar: None,
        };
        s.users.insert(
            id,
            DbUser {
                user: user.clone(),
                password: password.to_string(),
                profile: Profile {
                    username: username.to_string(),
                    email: format!("{username}@example.org"),
                    ..Profile::default()
                },
            },
        );
        user
    }

    /// Open a session for `user` without going through the login endpoint
    pub fn test_session_for(&self, user: UserId) -> AuthToken {
        let mut s = self.state.borrow_mut();
        let tok = AuthToken(format!("mock-token-{}", s.fresh_id()));
        s.sessions.insert(tok.clone(), user);
        tok
    }

    pub fn test_create_post(&self, author: UserId, title: &str, tags: &[&str]) -> PostId {
        let mut s = self.state.borrow_mut();
        let id = PostId(s.fresh_id());
        let author = s.users[&author].user.clone();
        s.posts.insert(
            id,
            DbPost {
                post: Post {
                    id,
                    title: title.to_string(),
                    content: format!("Content of {title}"),
                    author,
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                    created_at: Some(chrono::Utc::now()),
                    like_count: 0,
                    favorite_count: 0,
                    liked: false,
                    favorited: false,
                },
                likes: HashSet::new(),
                favorites: HashSet::new(),
            },
        );
        id
    }

    pub fn test_add_comment(
        &self,
        post: PostId,
        author: UserId,
        content: &str,
        parent_id: Option<CommentId>,
    ) -> CommentId {
        let mut s = self.state.borrow_mut();
        let id = CommentId(s.fresh_id());
        let author_name = s.users[&author].user.username.clone();
        s.comments.push((
            post,
            Comment {
                id,
                content: content.to_string(),
                author_id: author,
                author_name,
                parent_id,
                created_at: Some(chrono::Utc::now()),
                replies: Vec::new(),
            },
        ));
        id
    }

    pub fn test_verification_code(&self, email: &str) -> Option<String> {
        self.state.borrow().pending_codes.get(email).cloned()
    }

    pub fn test_comment_ids(&self, post: PostId) -> Vec<CommentId> {
        self.state
            .borrow()
            .comments
            .iter()
            .filter(|(p, _)| *p == post)
            .map(|(_, c)| c.id)
            .collect()
    }

    fn begin(&self, what: &str) -> Result<(), Error> {
        self.requests.set(self.requests.get() + 1);
        tracing::trace!(request = what, "mock server got request");
        match self.fail_next.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub struct MockBackend<'a> {
    server: &'a MockServer,
    token: Option<AuthToken>,
}

impl<'a> MockBackend<'a> {
    fn whoami(&self) -> Result<UserId, Error> {
        self.server.state.borrow().resolve(self.token.as_ref())
    }

    fn viewer(&self) -> Option<UserId> {
        self.whoami().ok()
    }
}

#[async_trait(?Send)]
impl<'a> Backend for MockBackend<'a> {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, Error> {
        self.server.begin("login")?;
        let mut s = self.server.state.borrow_mut();
        let user = s
            .users
            .values()
            .find(|u| {
                (u.user.username == req.identifier
                    || u.user.email.as_deref() == Some(&req.identifier))
                    && u.password == req.password
            })
            .map(|u| u.user.clone())
            .ok_or_else(|| Error::from_code(PERMISSION_DENIED_CODE, "invalid credentials"))?;
        let token = AuthToken(format!("mock-token-{}", s.fresh_id()));
        s.sessions.insert(token.clone(), user.id);
        Ok(LoginResponse { user, token })
    }

    async fn register(&self, email: &str) -> Result<(), Error> {
        self.server.begin("register")?;
        let mut s = self.server.state.borrow_mut();
        if s.users.values().any(|u| u.user.email.as_deref() == Some(email)) {
            return Err(Error::from_code(CONFLICT_CODE, "email already registered"));
        }
        let code = format!("{:06}", 100_000 + s.fresh_id());
        s.pending_codes.insert(email.to_string(), code);
        Ok(())
    }

    async fn verify_register(&self, req: &VerifyRegister) -> Result<(), Error> {
        self.server.begin("verify_register")?;
        let mut s = self.server.state.borrow_mut();
        if s.pending_codes.get(&req.email) != Some(&req.code) {
            return Err(Error::from_code(BAD_CODE_CODE, "invalid verification code"));
        }
        if s.users.values().any(|u| u.user.username == req.username) {
            return Err(Error::from_code(CONFLICT_CODE, "username already taken"));
        }
        s.pending_codes.remove(&req.email);
        let id = UserId(s.fresh_id());
        let user = User {
            id,
            username: req.username.clone(),
            email: Some(req.email.clone()),
            avatar: None,
        };
        s.users.insert(
            id,
            DbUser {
                user,
                password: req.password.clone(),
                profile: Profile {
                    username: req.username.clone(),
                    email: req.email.clone(),
                    ..Profile::default()
                },
            },
        );
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        self.server.begin("request_password_reset")?;
        let mut s = self.server.state.borrow_mut();
        if !s.users.values().any(|u| u.user.email.as_deref() == Some(email)) {
            return Err(Error::from_code(NOT_FOUND_CODE, "no user with this email"));
        }
        let code = format!("{:06}", 100_000 + s.fresh_id());
        s.pending_codes.insert(email.to_string(), code);
        Ok(())
    }

    async fn verify_password_reset(&self, req: &VerifyPasswordReset) -> Result<(), Error> {
        self.server.begin("verify_password_reset")?;
        let mut s = self.server.state.borrow_mut();
        if s.pending_codes.get(&req.email) != Some(&req.code) {
            return Err(Error::from_code(BAD_CODE_CODE, "invalid verification code"));
        }
        s.pending_codes.remove(&req.email);
        let user = s
            .users
            .values_mut()
            .find(|u| u.user.email.as_deref() == Some(&req.email))
            .ok_or_else(|| Error::from_code(NOT_FOUND_CODE, "no user with this email"))?;
        user.password = req.password.clone();
        Ok(())
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, Error> {
        self.server.begin("list_posts")?;
        let viewer = self.viewer();
        let s = self.server.state.borrow();
        let posts = s
            .posts
            .values()
            .rev()
            .filter(|p| match &query.tag {
                Some(tag) if !tag.is_empty() => p.post.tags.contains(tag),
                _ => true,
            })
            .map(|p| p.view_for(viewer))
            .collect::<Vec<_>>();
        let total = posts.len() as u64;
        Ok(PostPage {
            posts: paginate(posts, query.page),
            total: Some(total),
        })
    }

    async fn popular_posts(&self, limit: u32) -> Result<Vec<Post>, Error> {
        self.server.begin("popular_posts")?;
        let viewer = self.viewer();
        let s = self.server.state.borrow();
        let mut posts = s.posts.values().map(|p| p.view_for(viewer)).collect::<Vec<_>>();
        posts.sort_by_key(|p| std::cmp::Reverse(p.like_count));
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn get_post(&self, post: PostId) -> Result<Post, Error> {
        self.server.begin("get_post")?;
        let viewer = self.viewer();
        let s = self.server.state.borrow();
        s.posts
            .get(&post)
            .map(|p| p.view_for(viewer))
            .ok_or_else(|| Error::from_code(NOT_FOUND_CODE, "post not found"))
    }

    async fn create_post(&self, post: &NewPost) -> Result<Option<PostId>, Error> {
        self.server.begin("create_post")?;
        let me = self.whoami()?;
        let mut s = self.server.state.borrow_mut();
        let id = PostId(s.fresh_id());
        let author = s.user(me)?.user.clone();
        s.posts.insert(
            id,
            DbPost {
                post: Post {
                    id,
                    title: post.title.clone(),
                    content: post.content.clone(),
                    author,
                    tags: post.tags.clone(),
                    created_at: Some(chrono::Utc::now()),
                    like_count: 0,
                    favorite_count: 0,
                    liked: false,
                    favorited: false,
                },
                likes: HashSet::new(),
                favorites: HashSet::new(),
            },
        );
        Ok(Some(id))
    }

    async fn update_post(&self, id: PostId, post: &NewPost) -> Result<(), Error> {
        self.server.begin("update_post")?;
        let me = self.whoami()?;
        let mut s = self.server.state.borrow_mut();
        let p = s.post_mut(id)?;
        if p.post.author.id != me {
            return Err(Error::from_code(PERMISSION_DENIED_CODE, "permission denied"));
        }
        p.post.title = post.title.clone();
        p.post.content = post.content.clone();
        p.post.tags = post.tags.clone();
        Ok(())
    }

    async fn delete_post(&self, post: PostId) -> Result<(), Error> {
        self.server.begin("delete_post")?;
        let me = self.whoami()?;
        let mut s = self.server.state.borrow_mut();
        if s.post_mut(post)?.post.author.id != me {
            return Err(Error::from_code(PERMISSION_DENIED_CODE, "permission denied"));
        }
        s.posts.remove(&post);
        s.comments.retain(|(p, _)| *p != post);
        Ok(())
    }

    async fn toggle_like(&self, post: PostId) -> Result<LikeState, Error> {
        self.server.begin("toggle_like")?;
        let me = self.whoami()?;
        let mut s = self.server.state.borrow_mut();
        let p = s.post_mut(post)?;
        let liked = match p.likes.remove(&me) {
            true => false,
            false => p.likes.insert(me),
        };
        Ok(LikeState {
            liked,
            like_count: p.likes.len() as i64,
        })
    }

    async fn toggle_favorite(&self, post: PostId) -> Result<FavoriteState, Error> {
        self.server.begin("toggle_favorite")?;
        let me = self.whoami()?;
        let mut s = self.server.state.borrow_mut();
        let p = s.post_mut(post)?;
        let favorited = match p.favorites.remove(&me) {
            true => false,
            false => p.favorites.insert(me),
        };
        Ok(FavoriteState {
            favorited,
            favorite_count: p.favorites.len() as i64,
        })
    }

    async fn user_status(&self, post: PostId) -> Result<UserPostStatus, Error> {
        self.server.begin("user_status")?;
        let me = self.whoami()?;
        let mut s = self.server.state.borrow_mut();
        let p = s.post_mut(post)?;
        Ok(UserPostStatus {
            liked: p.likes.contains(&me),
            favorited: p.favorites.contains(&me),
        })
    }

    async fn list_comments(&self, post: PostId, page: PageQuery) -> Result<Vec<Comment>, Error> {
        self.server.begin("list_comments")?;
        let s = self.server.state.borrow();
        if !s.posts.contains_key(&post) {
            return Err(Error::from_code(NOT_FOUND_CODE, "post not found"));
        }
        let comments = s
            .comments
            .iter()
            .filter(|(p, _)| *p == post)
            .map(|(_, c)| c.clone())
            .collect();
        Ok(paginate(comments, page))
    }

    async fn add_comment(&self, post: PostId, comment: &NewComment) -> Result<Comment, Error> {
        self.server.begin("add_comment")?;
        let me = self.whoami()?;
        let mut s = self.server.state.borrow_mut();
        if !s.posts.contains_key(&post) {
            return Err(Error::from_code(NOT_FOUND_CODE, "post not found"));
        }
        let id = CommentId(s.fresh_id());
        let author_name = s.user(me)?.user.username.clone();
        let c = Comment {
            id,
            content: comment.content.clone(),
            author_id: me,
            author_name,
            parent_id: comment.parent_id,
            created_at: Some(chrono::Utc::now()),
            replies: Vec::new(),
        };
        s.comments.push((post, c.clone()));
        Ok(c)
    }

    async fn delete_comment(&self, comment: CommentId) -> Result<(), Error> {
        self.server.begin("delete_comment")?;
        let me = self.whoami()?;
        let mut s = self.server.state.borrow_mut();
        let idx = s
            .comments
            .iter()
            .position(|(_, c)| c.id == comment)
            .ok_or_else(|| Error::from_code(NOT_FOUND_CODE, "comment not found"))?;
        if s.comments[idx].1.author_id != me {
            return Err(Error::from_code(PERMISSION_DENIED_CODE, "permission denied"));
        }
        s.comments.remove(idx);
        Ok(())
    }

    async fn list_tags(&self, sorted_by: Option<&str>) -> Result<Vec<TagCount>, Error> {
        self.server.begin("list_tags")?;
        let s = self.server.state.borrow();
        let mut counts = BTreeMap::<String, u64>::new();
        for p in s.posts.values() {
            for t in &p.post.tags {
                *counts.entry(t.clone()).or_default() += 1;
            }
        }
        let mut tags = counts
            .into_iter()
            .map(|(name, count)| TagCount { name, count })
            .collect::<Vec<_>>();
        if sorted_by == Some("post_count") {
            tags.sort_by_key(|t| std::cmp::Reverse(t.count));
        }
        Ok(tags)
    }

    async fn get_profile(&self) -> Result<Profile, Error> {
        self.server.begin("get_profile")?;
        let me = self.whoami()?;
        let s = self.server.state.borrow();
        Ok(s.user(me)?.profile.clone())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), Error> {
        self.server.begin("update_profile")?;
        let me = self.whoami()?;
        let mut s = self.server.state.borrow_mut();
        if let Some(u) = s.users.get_mut(&me) {
            u.profile.apply(update);
        }
        Ok(())
    }

    async fn upload_avatar(
        &self,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<Option<String>, Error> {
        self.server.begin("upload_avatar")?;
        let me = self.whoami()?;
        if bytes.is_empty() {
            return Err(Error::from_code(40000, "empty avatar file"));
        }
        let url = format!("/uploads/avatars/{me}/{file_name}");
        let mut s = self.server.state.borrow_mut();
        if let Some(u) = s.users.get_mut(&me) {
            u.profile.avatar = url.clone();
            u.user.avatar = Some(url.clone());
        }
        Ok(Some(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registration_then_login() {
        let server = MockServer::new();
        let anon = server.client(None);
        anon.register("eve@example.org").await.unwrap();
        let code = server.test_verification_code("eve@example.org").unwrap();

        let mut req = VerifyRegister {
            email: String::from("eve@example.org"),
            username: String::from("eve"),
            password: String::from("pw"),
            code: String::from("nope"),
        };
        assert!(anon.verify_register(&req).await.is_err());
        req.code = code;
        anon.verify_register(&req).await.unwrap();

        let resp = anon
            .login(&LoginRequest {
                identifier: String::from("eve@example.org"),
                password: String::from("pw"),
            })
            .await
            .unwrap();
        assert_eq!(resp.user.username, "eve");
        let me = server.client(Some(resp.token));
        assert_eq!(me.get_profile().await.unwrap().email, "eve@example.org");
    }

    #[tokio::test]
    async fn anonymous_writes_are_refused_with_invalid_token() {
        let server = MockServer::new();
        let alice = server.admin_create_user("alice", "pw");
        let post = server.test_create_post(alice.id, "Hello", &[]);
        let err = server.client(None).toggle_like(post).await.unwrap_err();
        assert!(err.is_token_invalid());
        let bogus = server.client(Some(AuthToken(String::from("bogus"))));
        assert!(bogus.user_status(post).await.unwrap_err().is_token_invalid());
    }

    #[tokio::test]
    async fn only_authors_delete() {
        let server = MockServer::new();
        let alice = server.admin_create_user("alice", "pw");
        let bob = server.admin_create_user("bob", "pw");
        let post = server.test_create_post(alice.id, "Hello", &["rust"]);
        let c = server.test_add_comment(post, alice.id, "first", None);

        let as_bob = server.client(Some(server.test_session_for(bob.id)));
        assert!(as_bob.delete_comment(c).await.is_err());
        assert!(as_bob.delete_post(post).await.is_err());

        let as_alice = server.client(Some(server.test_session_for(alice.id)));
        as_alice.delete_comment(c).await.unwrap();
        assert!(server.test_comment_ids(post).is_empty());
        as_alice.delete_post(post).await.unwrap();
        assert!(as_alice.get_post(post).await.is_err());
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_filtered() {
        let server = MockServer::new();
        let alice = server.admin_create_user("alice", "pw");
        let a = server.test_create_post(alice.id, "A", &["rust"]);
        let b = server.test_create_post(alice.id, "B", &["web"]);
        let c = server.test_create_post(alice.id, "C", &["rust", "web"]);
        let anon = server.client(None);

        let query = |tag: Option<&str>| PostQuery {
            page: PageQuery::first(PageQuery::POSTS_PER_PAGE),
            tag: tag.map(String::from),
        };
        let all = anon.list_posts(&query(None)).await.unwrap();
        let ids = all.posts.iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![c, b, a]);
        assert_eq!(all.total, Some(3));

        let rust = anon.list_posts(&query(Some("rust"))).await.unwrap();
        let ids = rust.posts.iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![c, a]);

        let tags = anon.list_tags(Some("post_count")).await.unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags.iter().all(|t| t.count == 2));
    }

    #[tokio::test]
    async fn injected_failures_leave_state_alone() {
        let server = MockServer::new();
        let alice = server.admin_create_user("alice", "pw");
        let post = server.test_create_post(alice.id, "Hello", &[]);
        let me = server.client(Some(server.test_session_for(alice.id)));

        server.test_fail_next(Error::Transport(String::from("offline")));
        assert!(me.toggle_like(post).await.is_err());
        assert_eq!(me.get_post(post).await.unwrap().like_count, 0);
        assert_eq!(server.test_num_requests(), 2);
    }

    #[tokio::test]
    async fn avatar_upload_updates_user() {
        let server = MockServer::new();
        let alice = server.admin_create_user("alice", "pw");
        let me = server.client(Some(server.test_session_for(alice.id)));
        assert!(me.upload_avatar(String::from("a.png"), Vec::new()).await.is_err());
        let url = me
            .upload_avatar(String::from("a.png"), vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(url.as_deref(), Some(&*format!("/uploads/avatars/{}/a.png", alice.id)));
        assert_eq!(me.get_profile().await.unwrap().avatar, url.unwrap());
    }
}
