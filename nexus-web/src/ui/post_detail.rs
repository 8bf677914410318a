use nexus_client::{
    api::{
        Backend, Comment, CommentId, Error, FavoriteState, LikeState, PageQuery, Post, PostId,
        UserPostStatus,
    },
    CommentThread, Gate, PostInteractions, Toggle, ViewKind,
};
use yew::{context::ContextHandle, prelude::*};

use crate::{
    route::Route,
    ui::{AppContext, CommentView, Link},
    util,
};

#[derive(Clone, PartialEq, Properties)]
pub struct PostDetailProps {
    pub id: PostId,
}

pub enum PostDetailMsg {
    AppChanged(AppContext),
    PostLoaded(Result<Post, Error>),
    StatusLoaded(Result<UserPostStatus, Error>),
    CommentsLoaded(Result<Vec<Comment>, Error>),

    LikeClicked,
    LikeDone(Toggle, Result<LikeState, Error>),
    FavoriteClicked,
    FavoriteDone(Toggle, Result<FavoriteState, Error>),

    DraftChanged(String),
    ReplyTo(Comment),
    CancelReply,
    Submit,
    Submitted(Result<Comment, Error>),
    DeleteComment(CommentId, Option<CommentId>),
    CommentDeleted(CommentId, Option<CommentId>, Result<(), Error>),

    DeletePost,
    PostDeleted(Result<(), Error>),
}

pub struct PostDetail {
    app: AppContext,
    _app_handle: Option<ContextHandle<AppContext>>,
    post: Option<Post>,
    load_error: Option<String>,
    interactions: Option<PostInteractions>,
    thread: CommentThread,
    comments_loaded: bool,
    draft: String,
}

impl PostDetail {
    fn fetch_post(&self, ctx: &Context<Self>) {
        let backend = self.app.backend();
        let id = ctx.props().id;
        ctx.link().send_future(async move {
            PostDetailMsg::PostLoaded(backend.get_post(id).await)
        });
    }

    fn fetch_status(&self, ctx: &Context<Self>) {
        if !self.app.is_logged_in() {
            return;
        }
        let backend = self.app.backend();
        let id = ctx.props().id;
        ctx.link().send_future(async move {
            PostDetailMsg::StatusLoaded(backend.user_status(id).await)
        });
    }

    fn fetch_comments(&self, ctx: &Context<Self>) {
        let backend = self.app.backend();
        let id = ctx.props().id;
        ctx.link().send_future(async move {
            let page = PageQuery::first(PageQuery::COMMENTS_PER_PAGE);
            PostDetailMsg::CommentsLoaded(backend.list_comments(id, page).await)
        });
    }

    /// Whether the click may go to the backend, otherwise deals with it
    fn gate(&self) -> bool {
        let Some(i) = &self.interactions else {
            return false;
        };
        match i.gate(ViewKind::Detail, self.app.is_logged_in()) {
            Gate::Send => true,
            Gate::PromptLogin => {
                if util::confirm("You need to log in to do this. Go to the login page?") {
                    self.app.navigate.emit(Route::Login);
                }
                false
            }
            Gate::RedirectToDetail(_) => false,
        }
    }

    fn view_post(&self, ctx: &Context<Self>, post: &Post) -> Html {
        let is_owner = self.app.user().map_or(false, |u| post.is_authored_by(u));
        let (like, favorite) = match &self.interactions {
            Some(i) => (i.like, i.favorite),
            None => (
                Toggle::new(post.liked, post.like_count),
                Toggle::new(post.favorited, post.favorite_count),
            ),
        };
        html! {
            <article class="mb-4">
                <h1>{ &post.title }</h1>
                <div class="text-muted mb-2">
                    { &post.author.username }{ " · " }{ util::fmt_time(post.created_at) }
                </div>
                <div class="mb-3">
                    { for post.tags.iter().map(|t| html! {
                        <Link to={Route::Home { tag: Some(t.clone()) }} class="badge bg-secondary me-1">
                            { t }
                        </Link>
                    }) }
                </div>
                <div class="post-content mb-4" style="white-space: pre-wrap">{ &post.content }</div>
                <div class="d-flex align-items-center">
                    <button
                        class={classes!("btn", "me-2", if like.active { "btn-danger" } else { "btn-outline-danger" })}
                        onclick={ctx.link().callback(|_| PostDetailMsg::LikeClicked)}
                    >
                        { if like.active { "❤️ Liked " } else { "🤍 Like " } }{ like.count }
                    </button>
                    <button
                        class={classes!("btn", "me-2", if favorite.active { "btn-warning" } else { "btn-outline-warning" })}
                        onclick={ctx.link().callback(|_| PostDetailMsg::FavoriteClicked)}
                    >
                        { if favorite.active { "⭐ Favorited " } else { "☆ Favorite " } }{ favorite.count }
                    </button>
                    { for is_owner.then(|| html! {
                        <span class="ms-auto">
                            <Link to={Route::EditPost(post.id)} class="btn btn-outline-secondary me-2">
                                { "Edit" }
                            </Link>
                            <button
                                class="btn btn-outline-danger"
                                onclick={ctx.link().callback(|_| PostDetailMsg::DeletePost)}
                            >
                                { "Delete" }
                            </button>
                        </span>
                    }) }
                </div>
            </article>
        }
    }

    fn view_comment_form(&self, ctx: &Context<Self>) -> Html {
        if !self.app.is_logged_in() {
            return html! {
                <p class="text-muted">
                    <Link to={Route::Login}>{ "Log in" }</Link>{ " to join the discussion." }
                </p>
            };
        }
        let submitting = self.thread.is_submitting();
        let disabled = submitting || !self.comments_loaded;
        html! {
            <form class="mb-4" onsubmit={ctx.link().callback(|e: SubmitEvent| {
                e.prevent_default();
                PostDetailMsg::Submit
            })}>
                { for self.thread.reply_target().map(|t| html! {
                    <div class="alert alert-info py-1 d-flex align-items-center">
                        { "Replying to @" }{ &t.author_name }
                        <button
                            type="button"
                            class="btn btn-sm btn-link ms-auto"
                            onclick={ctx.link().callback(|_| PostDetailMsg::CancelReply)}
                        >
                            { "Cancel" }
                        </button>
                    </div>
                }) }
                <textarea
                    class="form-control mb-2"
                    rows="3"
                    placeholder="Write a comment..."
                    value={self.draft.clone()}
                    oninput={ctx.link().callback(|e: InputEvent| {
                        PostDetailMsg::DraftChanged(util::event_value(&e))
                    })}
                />
                <button type="submit" class="btn btn-primary" {disabled}>
                    { if submitting { "Posting..." } else { "Post comment" } }
                </button>
            </form>
        }
    }
}

impl Component for PostDetail {
    type Message = PostDetailMsg;
    type Properties = PostDetailProps;

    fn create(ctx: &Context<Self>) -> Self {
        let (app, handle) = AppContext::subscribe(ctx, PostDetailMsg::AppChanged);
        let this = PostDetail {
            app,
            _app_handle: handle,
            post: None,
            load_error: None,
            interactions: None,
            thread: CommentThread::new(ctx.props().id, Vec::new()),
            comments_loaded: false,
            draft: String::new(),
        };
        this.fetch_post(ctx);
        this.fetch_comments(ctx);
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            PostDetailMsg::AppChanged(app) => {
                let relogged = app.session != self.app.session;
                self.app = app;
                if relogged {
                    if let Some(i) = &mut self.interactions {
                        i.hydrate_status(None);
                    }
                    self.fetch_status(ctx);
                }
            }
            PostDetailMsg::PostLoaded(Ok(post)) => {
                let mut interactions = PostInteractions::from_post(&post);
                if !self.app.is_logged_in() {
                    interactions.hydrate_status(None);
                }
                self.interactions = Some(interactions);
                self.post = Some(post);
                self.fetch_status(ctx);
            }
            PostDetailMsg::PostLoaded(Err(e)) => {
                tracing::warn!(post = %ctx.props().id, error = %e, "failed loading post");
                self.load_error = Some(e.to_string());
            }
            PostDetailMsg::StatusLoaded(res) => match res {
                Ok(status) => {
                    if let Some(i) = &mut self.interactions {
                        i.hydrate_status(Some(status));
                    }
                }
                Err(e) => {
                    // The post itself shows fine without the flags
                    tracing::warn!(error = %e, "failed loading like/favorite status");
                    if e.is_token_invalid() {
                        self.app.report("Loading post", &e);
                    }
                }
            },
            PostDetailMsg::CommentsLoaded(res) => {
                self.comments_loaded = true;
                match res {
                    Ok(flat) => self.thread.replace_comments(flat),
                    Err(e) => tracing::warn!(error = %e, "failed loading comments"),
                }
            }

            PostDetailMsg::LikeClicked => {
                if !self.gate() {
                    return false;
                }
                let Some(i) = &mut self.interactions else {
                    return false;
                };
                let before = i.begin_like();
                let backend = self.app.backend();
                let id = i.post_id();
                ctx.link().send_future(async move {
                    PostDetailMsg::LikeDone(before, backend.toggle_like(id).await)
                });
            }
            PostDetailMsg::LikeDone(before, res) => {
                if let Some(i) = &mut self.interactions {
                    if let Err(e) = i.finish_like(before, res) {
                        self.app.report("Like failed", &e);
                    }
                }
            }
            PostDetailMsg::FavoriteClicked => {
                if !self.gate() {
                    return false;
                }
                let Some(i) = &mut self.interactions else {
                    return false;
                };
                let before = i.begin_favorite();
                let backend = self.app.backend();
                let id = i.post_id();
                ctx.link().send_future(async move {
                    PostDetailMsg::FavoriteDone(before, backend.toggle_favorite(id).await)
                });
            }
            PostDetailMsg::FavoriteDone(before, res) => {
                if let Some(i) = &mut self.interactions {
                    if let Err(e) = i.finish_favorite(before, res) {
                        self.app.report("Favorite failed", &e);
                    }
                }
            }

            PostDetailMsg::DraftChanged(d) => self.draft = d,
            PostDetailMsg::ReplyTo(c) => self.thread.reply_to(&c),
            PostDetailMsg::CancelReply => self.thread.cancel_reply(),
            PostDetailMsg::Submit => {
                if !self.comments_loaded {
                    return false;
                }
                if !self.app.is_logged_in() {
                    util::alert(&Error::NotLoggedIn.to_string());
                    return false;
                }
                let new = match self.thread.prepare_submit(&self.draft) {
                    Ok(new) => new,
                    Err(e) => {
                        util::alert(&e.to_string());
                        return false;
                    }
                };
                let backend = self.app.backend();
                let id = ctx.props().id;
                ctx.link().send_future(async move {
                    PostDetailMsg::Submitted(backend.add_comment(id, &new).await)
                });
            }
            PostDetailMsg::Submitted(res) => match self.thread.apply_submitted(res) {
                Ok(()) => self.draft.clear(),
                Err(e) => self.app.report("Failed posting comment", &e),
            },
            PostDetailMsg::DeleteComment(id, parent) => {
                if !util::confirm("Delete this comment?") {
                    return false;
                }
                let backend = self.app.backend();
                ctx.link().send_future(async move {
                    PostDetailMsg::CommentDeleted(id, parent, backend.delete_comment(id).await)
                });
                return false;
            }
            PostDetailMsg::CommentDeleted(id, parent, res) => match res {
                Ok(()) => {
                    self.thread.apply_deleted(id, parent);
                }
                Err(e) => self.app.report("Failed deleting comment", &e),
            },

            PostDetailMsg::DeletePost => {
                if !util::confirm("Delete this post? This cannot be undone.") {
                    return false;
                }
                let backend = self.app.backend();
                let id = ctx.props().id;
                ctx.link().send_future(async move {
                    PostDetailMsg::PostDeleted(backend.delete_post(id).await)
                });
                return false;
            }
            PostDetailMsg::PostDeleted(res) => match res {
                Ok(()) => self.app.navigate.emit(Route::home()),
                Err(e) => self.app.report("Failed deleting post", &e),
            },
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        if let Some(e) = &self.load_error {
            return html! {
                <div class="alert alert-danger">
                    { e }{ " " }
                    <Link to={Route::home()}>{ "Back to the home page" }</Link>
                </div>
            };
        }
        let Some(post) = &self.post else {
            return html! {
                <div class="text-center"><div class="spinner-border" role="status"></div></div>
            };
        };
        let viewer = self.app.user().cloned();
        let on_reply = ctx.link().callback(PostDetailMsg::ReplyTo);
        let on_delete = ctx
            .link()
            .callback(|(id, parent)| PostDetailMsg::DeleteComment(id, parent));
        html! {
            <>
                { self.view_post(ctx, post) }
                <section>
                    <h4>{ "Comments (" }{ self.thread.tree().len() }{ ")" }</h4>
                    { self.view_comment_form(ctx) }
                    { for (!self.comments_loaded).then(|| html! {
                        <div class="spinner-border spinner-border-sm" role="status"></div>
                    }) }
                    { for (self.comments_loaded && self.thread.tree().is_empty()).then(|| html! {
                        <p class="text-muted">{ "No comments yet." }</p>
                    }) }
                    { for self.thread.tree().roots().iter().map(|c| html! {
                        <CommentView
                            comment={c.clone()}
                            viewer={viewer.clone()}
                            on_reply={on_reply.clone()}
                            on_delete={on_delete.clone()}
                        />
                    }) }
                </section>
            </>
        }
    }
}
