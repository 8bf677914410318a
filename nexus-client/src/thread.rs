use crate::{
    api::{Backend, Comment, CommentId, Error, NewComment, PageQuery, PostId, User},
    CommentTree,
};

/// The comment the user is currently answering
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplyTarget {
    pub comment_id: CommentId,
    pub author_name: String,
}

/// State of the comment section of one post.
///
/// The tree is only ever mutated incrementally, after the backend
/// acknowledged the change. Event-driven views use the `prepare_*`/`apply_*`
/// halves; the `async` methods chain both around a [`Backend`] call.
#[derive(Clone, Debug)]
pub struct CommentThread {
    post_id: PostId,
    tree: CommentTree,
    reply_to: Option<ReplyTarget>,
    in_flight: Option<Option<CommentId>>,
}

impl CommentThread {
    pub fn new(post_id: PostId, flat: Vec<Comment>) -> CommentThread {
        CommentThread {
            post_id,
            tree: CommentTree::build(flat),
            reply_to: None,
            in_flight: None,
        }
    }

    pub async fn load<B: Backend + ?Sized>(
        backend: &B,
        post_id: PostId,
    ) -> Result<CommentThread, Error> {
        let flat = backend
            .list_comments(post_id, PageQuery::first(PageQuery::COMMENTS_PER_PAGE))
            .await?;
        tracing::debug!(post = %post_id, num_comments = flat.len(), "loaded comments");
        Ok(CommentThread::new(post_id, flat))
    }

    /// Rebuilds the tree from a fresh listing, keeping the reply target and
    /// any in-flight submission
    pub fn replace_comments(&mut self, flat: Vec<Comment>) {
        self.tree = CommentTree::build(flat);
        if let Some(t) = &self.reply_to {
            if self.tree.find(t.comment_id).is_none() {
                tracing::debug!(comment = %t.comment_id, "reply target no longer listed");
                self.reply_to = None;
            }
        }
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn tree(&self) -> &CommentTree {
        &self.tree
    }

    pub fn reply_target(&self) -> Option<&ReplyTarget> {
        self.reply_to.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn reply_to(&mut self, comment: &Comment) {
        self.reply_to = Some(ReplyTarget {
            comment_id: comment.id,
            author_name: comment.author_name.clone(),
        });
    }

    pub fn cancel_reply(&mut self) {
        self.reply_to = None;
    }

    /// Validates `content` and marks a submission as in flight.
    ///
    /// Content is sent as typed, but must not be blank.
    pub fn prepare_submit(&mut self, content: &str) -> Result<NewComment, Error> {
        if content.trim().is_empty() {
            return Err(Error::EmptyContent);
        }
        if self.in_flight.is_some() {
            return Err(Error::Validation(String::from(
                "A comment is already being submitted",
            )));
        }
        let parent_id = self.reply_to.as_ref().map(|t| t.comment_id);
        self.in_flight = Some(parent_id);
        Ok(NewComment {
            content: content.to_string(),
            parent_id,
        })
    }

    /// Ends the in-flight submission with the backend's answer
    pub fn apply_submitted(&mut self, res: Result<Comment, Error>) -> Result<(), Error> {
        let parent = self.in_flight.take().flatten();
        let mut comment = res?;
        if comment.parent_id.is_none() {
            comment.parent_id = parent;
        }
        tracing::debug!(comment = %comment.id, parent = ?comment.parent_id, "comment added");
        // a reload that raced the submission may already list it
        if self.tree.find(comment.id).is_none() {
            self.tree.insert(comment);
        }
        self.reply_to = None;
        Ok(())
    }

    /// Returns whether the comment was found where the caller said it was
    pub fn apply_deleted(&mut self, id: CommentId, parent: Option<CommentId>) -> bool {
        let found = self.tree.remove(id, parent).is_some();
        if !found {
            tracing::warn!(comment = %id, ?parent, "deleted comment was not in the local tree");
        }
        if self.reply_to.as_ref().map(|t| t.comment_id) == Some(id) {
            self.reply_to = None;
        }
        found
    }

    /// Whether to offer the delete action to `viewer`
    pub fn can_delete(viewer: Option<&User>, comment: &Comment) -> bool {
        viewer.map_or(false, |u| comment.is_authored_by(u))
    }

    pub async fn submit<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        content: &str,
    ) -> Result<(), Error> {
        let new = self.prepare_submit(content)?;
        let res = backend.add_comment(self.post_id, &new).await;
        self.apply_submitted(res)
    }

    pub async fn delete<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        id: CommentId,
        parent: Option<CommentId>,
    ) -> Result<(), Error> {
        backend.delete_comment(id).await?;
        self.apply_deleted(id, parent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nexus_mock_server::MockServer;

    use super::*;
    use crate::api::UserId;

    struct Fixture {
        server: MockServer,
        alice: User,
        bob: User,
        post: PostId,
    }

    fn fixture() -> Fixture {
        let server = MockServer::new();
        let alice = server.admin_create_user("alice", "pass");
        let bob = server.admin_create_user("bob", "pass");
        let post = server.test_create_post(alice.id, "Hello", &["intro"]);
        Fixture {
            server,
            alice,
            bob,
            post,
        }
    }

    #[tokio::test]
    async fn root_comments_are_prepended() {
        let f = fixture();
        let first = f.server.test_add_comment(f.post, f.bob.id, "first", None);
        let tok = f.server.test_session_for(f.alice.id);
        let backend = f.server.client(Some(tok));

        let mut thread = CommentThread::load(&backend, f.post).await.unwrap();
        assert_eq!(thread.tree().len(), 1);

        thread.submit(&backend, "second").await.unwrap();
        let roots = thread.tree().roots();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].content, "second");
        assert_eq!(roots[0].author_id, f.alice.id);
        assert_eq!(roots[1].id, first);
        assert!(!thread.is_submitting());
    }

    #[tokio::test]
    async fn nested_reply_lands_under_its_target() {
        let f = fixture();
        let root = f.server.test_add_comment(f.post, f.bob.id, "root", None);
        let reply = f.server.test_add_comment(f.post, f.alice.id, "reply", Some(root));
        let tok = f.server.test_session_for(f.bob.id);
        let backend = f.server.client(Some(tok));

        let mut thread = CommentThread::load(&backend, f.post).await.unwrap();
        let target = thread.tree().find(reply).unwrap().clone();
        thread.reply_to(&target);
        assert_eq!(thread.reply_target().unwrap().author_name, "alice");

        thread.submit(&backend, "deep").await.unwrap();
        assert!(thread.reply_target().is_none());
        let target = thread.tree().find(reply).unwrap();
        assert_eq!(target.replies.len(), 1);
        assert_eq!(target.replies[0].content, "deep");
        assert_eq!(target.replies[0].parent_id, Some(reply));
        assert_eq!(thread.tree().roots().len(), 1);
    }

    #[tokio::test]
    async fn blank_comment_sends_nothing() {
        let f = fixture();
        let backend = f.server.client(Some(f.server.test_session_for(f.alice.id)));
        let mut thread = CommentThread::new(f.post, Vec::new());
        let before = f.server.test_num_requests();

        assert_eq!(thread.submit(&backend, "").await, Err(Error::EmptyContent));
        assert_eq!(thread.submit(&backend, " \n\t").await, Err(Error::EmptyContent));
        assert_eq!(f.server.test_num_requests(), before);
        assert!(!thread.is_submitting());
        assert!(thread.tree().is_empty());
    }

    #[tokio::test]
    async fn failed_submit_leaves_state_alone() {
        let f = fixture();
        let root = f.server.test_add_comment(f.post, f.bob.id, "root", None);
        let backend = f.server.client(Some(f.server.test_session_for(f.alice.id)));
        let mut thread = CommentThread::load(&backend, f.post).await.unwrap();
        let target = thread.tree().find(root).unwrap().clone();
        thread.reply_to(&target);

        f.server.test_fail_next(Error::Transport(String::from("connection reset")));
        let res = thread.submit(&backend, "lost").await;
        assert_eq!(res, Err(Error::Transport(String::from("connection reset"))));
        assert_eq!(thread.tree().len(), 1);
        assert_eq!(thread.reply_target().map(|t| t.comment_id), Some(root));
        assert!(!thread.is_submitting());
    }

    #[tokio::test]
    async fn anonymous_submit_is_rejected_by_the_backend() {
        let f = fixture();
        let backend = f.server.client(None);
        let mut thread = CommentThread::new(f.post, Vec::new());
        let err = thread.submit(&backend, "hi").await.unwrap_err();
        assert!(err.is_token_invalid());
        assert!(thread.tree().is_empty());
    }

    #[tokio::test]
    async fn delete_reply() {
        let f = fixture();
        let root = f.server.test_add_comment(f.post, f.bob.id, "root", None);
        let reply = f.server.test_add_comment(f.post, f.alice.id, "reply", Some(root));
        let backend = f.server.client(Some(f.server.test_session_for(f.alice.id)));
        let mut thread = CommentThread::load(&backend, f.post).await.unwrap();

        // not the author
        assert!(thread.delete(&backend, root, None).await.is_err());
        assert_eq!(thread.tree().len(), 2);

        thread.delete(&backend, reply, Some(root)).await.unwrap();
        assert_eq!(thread.tree().len(), 1);
        assert!(thread.tree().find(reply).is_none());
        assert_eq!(f.server.test_comment_ids(f.post), vec![root]);
    }

    #[test]
    fn delete_affordance() {
        let c = Comment {
            id: CommentId(1),
            content: String::from("x"),
            author_id: UserId(3),
            author_name: String::from("carol"),
            parent_id: None,
            created_at: None,
            replies: Vec::new(),
        };
        let carol = User {
            id: UserId(3),
            username: String::from("carol"),
            email: None,
            avatar: None,
        };
        let dave = User {
            id: UserId(4),
            ..carol.clone()
        };
        assert!(CommentThread::can_delete(Some(&carol), &c));
        assert!(!CommentThread::can_delete(Some(&dave), &c));
        assert!(!CommentThread::can_delete(None, &c));
    }

    #[test]
    fn double_submit_is_refused() {
        let mut thread = CommentThread::new(PostId(1), Vec::new());
        thread.prepare_submit("a").unwrap();
        assert!(matches!(thread.prepare_submit("b"), Err(Error::Validation(_))));
        thread.apply_submitted(Err(Error::EmptyContent)).unwrap_err();
        assert!(thread.prepare_submit("b").is_ok());
    }

    #[tokio::test]
    async fn reload_during_submit_keeps_it_in_flight() {
        let f = fixture();
        let root = f.server.test_add_comment(f.post, f.bob.id, "first", None);
        let backend = f
            .server
            .client(Some(f.server.test_session_for(f.alice.id)));
        let mut thread = CommentThread::load(&backend, f.post).await.unwrap();
        let first = thread.tree().find(root).cloned().unwrap();
        thread.reply_to(&first);
        let new = thread.prepare_submit("answer").unwrap();

        // the backend stores the reply, then a listing that includes it comes back first
        let ack = backend.add_comment(f.post, &new).await;
        let listed = backend
            .list_comments(f.post, PageQuery::first(PageQuery::COMMENTS_PER_PAGE))
            .await
            .unwrap();
        thread.replace_comments(listed);
        assert!(thread.is_submitting());
        assert_eq!(thread.reply_target().map(|t| t.comment_id), Some(root));
        assert!(matches!(thread.prepare_submit("again"), Err(Error::Validation(_))));

        thread.apply_submitted(ack).unwrap();
        assert!(!thread.is_submitting());
        assert_eq!(thread.reply_target(), None);
        assert_eq!(thread.tree().len(), 2);
        assert_eq!(thread.tree().find(root).unwrap().replies.len(), 1);
    }

    #[test]
    fn reload_drops_vanished_reply_target() {
        let c = |id: u64| -> Comment {
            serde_json::from_value(serde_json::json!({"id": id, "content": "x"})).unwrap()
        };
        let mut thread = CommentThread::new(PostId(1), vec![c(1), c(2)]);
        thread.reply_to(&c(2));
        thread.replace_comments(vec![c(1)]);
        assert_eq!(thread.reply_target(), None);
        assert_eq!(thread.tree().len(), 1);
    }
}
