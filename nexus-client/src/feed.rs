use crate::api::{Backend, Error, PageQuery, Post, PostPage, PostQuery};

/// The home page post list, loaded one page at a time
#[derive(Clone, Debug)]
pub struct PostFeed {
    tag: Option<String>,
    posts: Vec<Post>,
    next: PageQuery,
    has_more: bool,
}

impl PostFeed {
    pub fn new(tag: Option<String>) -> PostFeed {
        PostFeed {
            tag: tag.filter(|t| !t.is_empty()),
            posts: Vec::new(),
            next: PageQuery::first(PageQuery::POSTS_PER_PAGE),
            has_more: true,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn posts_mut(&mut self) -> &mut [Post] {
        &mut self.posts
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn next_query(&self) -> PostQuery {
        PostQuery {
            page: self.next,
            tag: self.tag.clone(),
        }
    }

    /// Records the page fetched with `query`. The first page replaces the
    /// list, later ones extend it; a short page means there is nothing more.
    pub fn apply_page(&mut self, query: &PostQuery, page: PostPage) {
        self.has_more = page.posts.len() as u32 >= query.page.size;
        if query.page.page <= 1 {
            self.posts = page.posts;
        } else {
            self.posts.extend(page.posts);
        }
        self.next = query.page.next();
    }

    pub async fn load_more<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<(), Error> {
        let query = self.next_query();
        let page = backend.list_posts(&query).await?;
        self.apply_page(&query, page);
        Ok(())
    }

    /// Drops everything and fetches the first page again
    pub async fn refresh<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<(), Error> {
        self.next = PageQuery::first(PageQuery::POSTS_PER_PAGE);
        self.load_more(backend).await
    }
}

#[cfg(test)]
mod tests {
    use nexus_mock_server::MockServer;

    use super::*;

    #[tokio::test]
    async fn pages_until_short() {
        let server = MockServer::new();
        let alice = server.admin_create_user("alice", "pw");
        for i in 0..13 {
            let tags: &[&str] = if i % 2 == 0 { &["even"] } else { &[] };
            server.test_create_post(alice.id, &format!("post {i}"), tags);
        }
        let backend = server.client(None);

        let mut feed = PostFeed::new(None);
        feed.load_more(&backend).await.unwrap();
        assert_eq!(feed.posts().len(), 10);
        assert_eq!(feed.posts()[0].title, "post 12");
        assert!(feed.has_more());

        feed.load_more(&backend).await.unwrap();
        assert_eq!(feed.posts().len(), 13);
        assert!(!feed.has_more());

        feed.refresh(&backend).await.unwrap();
        assert_eq!(feed.posts().len(), 10);

        let mut even = PostFeed::new(Some(String::from("even")));
        even.load_more(&backend).await.unwrap();
        assert_eq!(even.posts().len(), 7);
        assert!(!even.has_more());
        assert!(even.posts().iter().all(|p| p.tags == vec![String::from("even")]));
    }

    #[test]
    fn empty_tag_is_no_tag() {
        assert_eq!(PostFeed::new(Some(String::new())).tag(), None);
    }
}
