use crate::{de, validate_not_blank, Error, PostId, Time, User};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Post {
    #[serde(alias = "ID")]
    pub id: PostId,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub content: String,

    pub author: User,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub tags: Vec<String>,

    #[serde(
        default,
        alias = "createdAt",
        alias = "CreatedAt",
        deserialize_with = "de::lenient_time"
    )]
    pub created_at: Option<Time>,

    #[serde(default)]
    pub like_count: i64,

    #[serde(default)]
    pub favorite_count: i64,

    /// Only meaningful when fetched with the requesting user's token
    #[serde(default)]
    pub liked: bool,

    #[serde(default)]
    pub favorited: bool,
}

impl Post {
    /// Advisory only: the backend is the one enforcing ownership
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author.id == user.id
    }
}

/// Body of both `POST /posts/` and `PUT /posts/{id}`
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NewPost {
    /// Builds a post out of the raw form fields, `tags` being comma-separated
    pub fn from_form(title: &str, content: &str, tags: &str) -> Result<NewPost, Error> {
        validate_not_blank("Title", title)?;
        validate_not_blank("Content", content)?;
        Ok(NewPost {
            title: title.trim().to_string(),
            content: content.to_string(),
            tags: tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
        })
    }

    pub fn tags_as_form(tags: &[String]) -> String {
        tags.join(", ")
    }
}

/// Data of `POST /posts/`: either `{post: {..}}` or the post itself
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum CreatedPost {
    Wrapped { post: PostRef },
    Bare(PostRef),
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct PostRef {
    #[serde(alias = "ID")]
    pub id: PostId,
}

impl CreatedPost {
    pub fn id(&self) -> PostId {
        match self {
            CreatedPost::Wrapped { post } => post.id,
            CreatedPost::Bare(post) => post.id,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PostPage {
    #[serde(
        default,
        alias = "Post",
        alias = "Posts",
        deserialize_with = "de::null_as_default"
    )]
    pub posts: Vec<Post>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
}

impl PageQuery {
    pub const POSTS_PER_PAGE: u32 = 10;

    /// Large enough to fetch a whole discussion in one batch, so that replies
    /// don't end up separated from their parent by a page boundary
    pub const COMMENTS_PER_PAGE: u32 = 100;

    pub fn first(size: u32) -> PageQuery {
        PageQuery { page: 1, size }
    }

    pub fn next(self) -> PageQuery {
        PageQuery {
            page: self.page + 1,
            size: self.size,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PostQuery {
    pub page: PageQuery,
    pub tag: Option<String>,
}

impl PostQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut res = vec![
            ("page", self.page.page.to_string()),
            ("size", self.page.size.to_string()),
        ];
        if let Some(tag) = self.tag.as_ref().filter(|t| !t.is_empty()) {
            res.push(("tag", tag.clone()));
        }
        res
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct FavoriteState {
    pub favorited: bool,
    pub favorite_count: i64,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UserPostStatus {
    #[serde(default)]
    pub liked: bool,

    #[serde(default)]
    pub favorited: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct TagCount {
    pub name: String,

    #[serde(default, alias = "post_count")]
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserId;

    #[test]
    fn post_with_go_casing() {
        let p: Post = serde_json::from_str(
            r#"{
                "ID": 12,
                "title": "Welcome",
                "content": "hello",
                "author": {"ID": 1, "username": "admin"},
                "tags": ["welcome"],
                "CreatedAt": "2024-03-01T10:00:00+08:00",
                "like_count": 5,
                "favorite_count": 1
            }"#,
        )
        .unwrap();
        assert_eq!(p.id, PostId(12));
        assert_eq!(p.author.id, UserId(1));
        assert_eq!(
            p.created_at.map(|t| t.to_rfc3339()),
            Some(String::from("2024-03-01T02:00:00+00:00")),
        );
        assert!(!p.liked);
    }

    #[test]
    fn bad_timestamp_does_not_fail_the_post() {
        let p: Post = serde_json::from_str(
            r#"{"id":1,"author":{"id":1,"username":"a"},"created_at":"yesterday"}"#,
        )
        .unwrap();
        assert_eq!(p.created_at, None);
    }

    #[test]
    fn page_field_casing() {
        let page: PostPage =
            serde_json::from_str(r#"{"Post":[{"id":1,"author":{"id":1}}],"total":1}"#).unwrap();
        assert_eq!(page.posts.len(), 1);
        let page: PostPage = serde_json::from_str(r#"{"posts":[]}"#).unwrap();
        assert!(page.posts.is_empty());
    }

    #[test]
    fn null_fields_read_as_empty() {
        let page: PostPage = serde_json::from_str(r#"{"Post":null,"total":0}"#).unwrap();
        assert!(page.posts.is_empty());
        let page: PostPage = serde_json::from_str(r#"{"posts":null}"#).unwrap();
        assert!(page.posts.is_empty());

        let p: Post = serde_json::from_str(
            r#"{"id":2,"title":null,"content":null,"tags":null,"author":{"id":1,"username":null}}"#,
        )
        .unwrap();
        assert!(p.tags.is_empty());
        assert_eq!(p.title, "");
        assert_eq!(p.content, "");
        assert_eq!(p.author.username, "");
    }

    #[test]
    fn created_post_shapes() {
        let c: CreatedPost = serde_json::from_str(r#"{"post":{"id":4,"title":"x"}}"#).unwrap();
        assert_eq!(c.id(), PostId(4));
        let c: CreatedPost = serde_json::from_str(r#"{"ID":5}"#).unwrap();
        assert_eq!(c.id(), PostId(5));
    }

    #[test]
    fn post_form() {
        let p = NewPost::from_form(" Title ", "body", "rust, ,web ,").unwrap();
        assert_eq!(p.title, "Title");
        assert_eq!(p.tags, vec![String::from("rust"), String::from("web")]);
        assert_eq!(
            NewPost::from_form("t", " \n", ""),
            Err(Error::Validation(String::from("Content is required"))),
        );
        assert_eq!(NewPost::tags_as_form(&p.tags), "rust, web");
    }

    #[test]
    fn query_pairs_skip_empty_tag() {
        let q = PostQuery {
            page: PageQuery::first(PageQuery::POSTS_PER_PAGE).next(),
            tag: Some(String::new()),
        };
        assert_eq!(
            q.to_query_pairs(),
            vec![("page", String::from("2")), ("size", String::from("10"))],
        );
    }
}
