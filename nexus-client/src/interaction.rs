use crate::api::{Backend, Error, FavoriteState, LikeState, Post, PostId, UserPostStatus};

/// A per-user flag on a post together with the post's total for it
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Toggle {
    pub active: bool,
    pub count: i64,
}

impl Toggle {
    pub fn new(active: bool, count: i64) -> Toggle {
        Toggle { active, count }
    }

    /// Optimistic flip, returning the state to revert to
    pub fn flip(&mut self) -> Toggle {
        let before = *self;
        self.active = !self.active;
        self.count += if self.active { 1 } else { -1 };
        before
    }

    pub fn reconcile(&mut self, active: bool, count: i64) {
        if (active, count) != (self.active, self.count) {
            tracing::debug!(
                guessed_active = self.active,
                guessed_count = self.count,
                active,
                count,
                "server disagreed with optimistic toggle"
            );
        }
        self.active = active;
        self.count = count;
    }

    pub fn revert(&mut self, before: Toggle) {
        *self = before;
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ViewKind {
    List,
    Detail,
}

/// What to do with a like or favorite click
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Gate {
    Send,
    RedirectToDetail(PostId),
    PromptLogin,
}

/// Like and favorite state of one post, as shown to the current viewer
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PostInteractions {
    post_id: PostId,
    pub like: Toggle,
    pub favorite: Toggle,
}

impl PostInteractions {
    pub fn from_post(post: &Post) -> PostInteractions {
        PostInteractions {
            post_id: post.id,
            like: Toggle::new(post.liked, post.like_count),
            favorite: Toggle::new(post.favorited, post.favorite_count),
        }
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    /// List views never toggle in place, they send the user to the post;
    /// on the post itself an anonymous user is asked to log in first.
    pub fn gate(&self, view: ViewKind, logged_in: bool) -> Gate {
        match (view, logged_in) {
            (ViewKind::List, _) => Gate::RedirectToDetail(self.post_id),
            (ViewKind::Detail, false) => Gate::PromptLogin,
            (ViewKind::Detail, true) => Gate::Send,
        }
    }

    /// `None` is an anonymous viewer, who has neither liked nor favorited
    pub fn hydrate_status(&mut self, status: Option<UserPostStatus>) {
        let status = status.unwrap_or_default();
        self.like.active = status.liked;
        self.favorite.active = status.favorited;
    }

    pub async fn load_status<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        logged_in: bool,
    ) -> Result<(), Error> {
        let status = match logged_in {
            true => Some(backend.user_status(self.post_id).await?),
            false => None,
        };
        self.hydrate_status(status);
        Ok(())
    }

    pub fn begin_like(&mut self) -> Toggle {
        self.like.flip()
    }

    pub fn finish_like(&mut self, before: Toggle, res: Result<LikeState, Error>) -> Result<(), Error> {
        match res {
            Ok(s) => {
                self.like.reconcile(s.liked, s.like_count);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(post = %self.post_id, error = %e, "like failed, reverting");
                self.like.revert(before);
                Err(e)
            }
        }
    }

    pub fn begin_favorite(&mut self) -> Toggle {
        self.favorite.flip()
    }

    pub fn finish_favorite(
        &mut self,
        before: Toggle,
        res: Result<FavoriteState, Error>,
    ) -> Result<(), Error> {
        match res {
            Ok(s) => {
                self.favorite.reconcile(s.favorited, s.favorite_count);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(post = %self.post_id, error = %e, "favorite failed, reverting");
                self.favorite.revert(before);
                Err(e)
            }
        }
    }

    pub async fn toggle_like<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<(), Error> {
        let before = self.begin_like();
        let res = backend.toggle_like(self.post_id).await;
        self.finish_like(before, res)
    }

    pub async fn toggle_favorite<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<(), Error> {
        let before = self.begin_favorite();
        let res = backend.toggle_favorite(self.post_id).await;
        self.finish_favorite(before, res)
    }

    /// Copies the current state onto `post`, for views holding the post itself
    pub fn apply_to(&self, post: &mut Post) {
        post.liked = self.like.active;
        post.like_count = self.like.count;
        post.favorited = self.favorite.active;
        post.favorite_count = self.favorite.count;
    }
}

#[cfg(test)]
mod tests {
    use nexus_mock_server::MockServer;

    use super::*;

    #[test]
    fn flip_is_an_involution() {
        bolero::check!()
            .with_type::<(bool, i32)>()
            .cloned()
            .for_each(|(active, count)| {
                let orig = Toggle::new(active, i64::from(count));
                let mut t = orig;
                t.flip();
                assert_eq!((t.count - orig.count).abs(), 1);
                assert_ne!(t.active, orig.active);
                t.flip();
                assert_eq!(t, orig);
            })
    }

    #[test]
    fn gates() {
        let i = PostInteractions {
            post_id: PostId(3),
            like: Toggle::default(),
            favorite: Toggle::default(),
        };
        assert_eq!(i.gate(ViewKind::List, false), Gate::RedirectToDetail(PostId(3)));
        assert_eq!(i.gate(ViewKind::List, true), Gate::RedirectToDetail(PostId(3)));
        assert_eq!(i.gate(ViewKind::Detail, false), Gate::PromptLogin);
        assert_eq!(i.gate(ViewKind::Detail, true), Gate::Send);
    }

    #[tokio::test]
    async fn like_twice_restores() {
        let server = MockServer::new();
        let alice = server.admin_create_user("alice", "pw");
        let post = server.test_create_post(alice.id, "p", &[]);
        let backend = server.client(Some(server.test_session_for(alice.id)));

        let mut i = PostInteractions::from_post(&backend.get_post(post).await.unwrap());
        let orig = i.clone();
        i.toggle_like(&backend).await.unwrap();
        assert_eq!(i.like, Toggle::new(true, 1));
        i.toggle_like(&backend).await.unwrap();
        assert_eq!(i, orig);
    }

    #[tokio::test]
    async fn server_count_wins() {
        let server = MockServer::new();
        let alice = server.admin_create_user("alice", "pw");
        let bob = server.admin_create_user("bob", "pw");
        let post = server.test_create_post(alice.id, "p", &[]);
        let alice_backend = server.client(Some(server.test_session_for(alice.id)));
        let bob_backend = server.client(Some(server.test_session_for(bob.id)));

        // stale view from before bob favorited
        let mut i = PostInteractions::from_post(&alice_backend.get_post(post).await.unwrap());
        bob_backend.toggle_favorite(post).await.unwrap();

        i.toggle_favorite(&alice_backend).await.unwrap();
        assert_eq!(i.favorite, Toggle::new(true, 2));
    }

    #[tokio::test]
    async fn failure_reverts() {
        let server = MockServer::new();
        let alice = server.admin_create_user("alice", "pw");
        let post = server.test_create_post(alice.id, "p", &[]);
        let backend = server.client(Some(server.test_session_for(alice.id)));
        let mut i = PostInteractions::from_post(&backend.get_post(post).await.unwrap());

        server.test_fail_next(Error::MalformedResponse(String::from("missing like_count")));
        assert!(i.toggle_like(&backend).await.is_err());
        assert_eq!(i.like, Toggle::new(false, 0));

        let anonymous = server.client(None);
        assert!(i.toggle_favorite(&anonymous).await.unwrap_err().is_token_invalid());
        assert_eq!(i.favorite, Toggle::new(false, 0));
    }

    #[tokio::test]
    async fn status_follows_viewer() {
        let server = MockServer::new();
        let alice = server.admin_create_user("alice", "pw");
        let post = server.test_create_post(alice.id, "p", &[]);
        let backend = server.client(Some(server.test_session_for(alice.id)));
        backend.toggle_like(post).await.unwrap();

        let mut i = PostInteractions::from_post(&server.client(None).get_post(post).await.unwrap());
        assert!(!i.like.active);
        i.load_status(&backend, true).await.unwrap();
        assert!(i.like.active);
        assert!(!i.favorite.active);
        assert_eq!(i.like.count, 1);

        i.load_status(&backend, false).await.unwrap();
        assert!(!i.like.active);

        let mut p = backend.get_post(post).await.unwrap();
        i.apply_to(&mut p);
        assert!(!p.liked);
        assert_eq!(p.like_count, 1);
    }
}
