mod comment;
pub use comment::{flatten_replies, CommentTree, FlatReply, Iter};

mod feed;
pub use feed::PostFeed;

mod http;
pub use http::{HttpBackend, DEFAULT_HOST};

mod interaction;
pub use interaction::{Gate, PostInteractions, Toggle, ViewKind};

mod session;
pub use session::{
    FileStore, MemoryStore, Session, SessionContext, SessionStore, TOKEN_KEY, USER_KEY,
};

mod thread;
pub use thread::{CommentThread, ReplyTarget};

pub mod api {
    pub use nexus_api::*;
}
