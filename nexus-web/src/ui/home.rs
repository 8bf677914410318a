use nexus_client::{
    api::{Backend, Error, Post, PostPage, PostQuery, TagCount},
    PostFeed,
};
use yew::{context::ContextHandle, prelude::*};

use crate::{
    modules::Module,
    route::Route,
    ui::{AppContext, Link, PostCard},
};

const POPULAR_COUNT: u32 = 5;

#[derive(Clone, PartialEq, Properties)]
pub struct HomeProps {
    pub tag: Option<String>,
}

pub enum HomeMsg {
    AppChanged(AppContext),
    LoadMore,
    FeedLoaded(PostQuery, Result<PostPage, Error>),
    SidebarLoaded(Result<Vec<Post>, Error>, Result<Vec<TagCount>, Error>),
}

pub struct Home {
    app: AppContext,
    _app_handle: Option<ContextHandle<AppContext>>,
    feed: PostFeed,
    loading: bool,
    error: Option<String>,
    popular: Vec<Post>,
    tags: Vec<TagCount>,
}

impl Home {
    fn fetch_page(&mut self, ctx: &Context<Self>) {
        self.loading = true;
        let query = self.feed.next_query();
        let backend = self.app.backend();
        ctx.link().send_future(async move {
            let res = backend.list_posts(&query).await;
            HomeMsg::FeedLoaded(query, res)
        });
    }

    fn fetch_sidebar(&self, ctx: &Context<Self>) {
        let backend = self.app.backend();
        ctx.link().send_future(async move {
            let (popular, tags) = futures::join!(
                backend.popular_posts(POPULAR_COUNT),
                backend.list_tags(Some("post_count")),
            );
            HomeMsg::SidebarLoaded(popular, tags)
        });
    }

    fn view_sidebar(&self, ctx: &Context<Self>) -> Html {
        let current = ctx.props().tag.as_deref();
        html! {
            <aside class="col-lg-4">
                <div class="card mb-3">
                    <div class="card-header">{ "Popular" }</div>
                    <ul class="list-group list-group-flush">
                        { for self.popular.iter().map(|p| html! {
                            <li class="list-group-item d-flex">
                                <Link to={Route::Post(p.id)}>{ &p.title }</Link>
                                <span class="ms-auto text-muted">{ "❤️ " }{ p.like_count }</span>
                            </li>
                        }) }
                    </ul>
                </div>
                <div class="card mb-3">
                    <div class="card-header">{ "Tags" }</div>
                    <div class="card-body">
                        { for self.tags.iter().map(|t| {
                            let class = match current == Some(t.name.as_str()) {
                                true => "badge bg-primary me-1",
                                false => "badge bg-secondary me-1",
                            };
                            html! {
                                <Link to={Route::Home { tag: Some(t.name.clone()) }} {class}>
                                    { &t.name }{ " (" }{ t.count }{ ")" }
                                </Link>
                            }
                        }) }
                    </div>
                </div>
                <div class="card">
                    <div class="card-header">{ "Coming soon" }</div>
                    <ul class="list-group list-group-flush">
                        { for Module::ALL.iter().map(|m| html! {
                            <li class="list-group-item">
                                <Link to={Route::ModuleIntro(*m)}>
                                    { m.info().icon }{ " " }{ m.info().title }
                                </Link>
                            </li>
                        }) }
                    </ul>
                </div>
            </aside>
        }
    }
}

impl Component for Home {
    type Message = HomeMsg;
    type Properties = HomeProps;

    fn create(ctx: &Context<Self>) -> Self {
        let (app, handle) = AppContext::subscribe(ctx, HomeMsg::AppChanged);
        let mut this = Home {
            app,
            _app_handle: handle,
            feed: PostFeed::new(ctx.props().tag.clone()),
            loading: false,
            error: None,
            popular: Vec::new(),
            tags: Vec::new(),
        };
        this.fetch_page(ctx);
        this.fetch_sidebar(ctx);
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            HomeMsg::AppChanged(app) => {
                let relogged = app.session != self.app.session;
                self.app = app;
                if relogged {
                    // liked/favorited flags depend on who is looking
                    self.feed = PostFeed::new(ctx.props().tag.clone());
                    self.fetch_page(ctx);
                }
            }
            HomeMsg::LoadMore => {
                if !self.loading && self.feed.has_more() {
                    self.fetch_page(ctx);
                }
            }
            HomeMsg::FeedLoaded(query, res) => {
                self.loading = false;
                match res {
                    Ok(page) => {
                        self.error = None;
                        self.feed.apply_page(&query, page);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed loading posts");
                        self.error = Some(e.to_string());
                    }
                }
            }
            HomeMsg::SidebarLoaded(popular, tags) => {
                match popular {
                    Ok(p) => self.popular = p,
                    Err(e) => tracing::warn!(error = %e, "failed loading popular posts"),
                }
                match tags {
                    Ok(t) => self.tags = t,
                    Err(e) => tracing::warn!(error = %e, "failed loading tags"),
                }
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let heading = match self.feed.tag() {
            Some(tag) => html! {
                <div class="d-flex align-items-center mb-3">
                    <h2 class="me-3">{ "Posts tagged " }{ tag }</h2>
                    <Link to={Route::home()}>{ "Show all" }</Link>
                </div>
            },
            None => html! { <h2 class="mb-3">{ "Latest posts" }</h2> },
        };
        let empty = self.feed.posts().is_empty() && !self.loading && self.error.is_none();
        html! {
            <div class="row">
                <section class="col-lg-8">
                    { heading }
                    { for self.error.as_ref().map(|e| html! {
                        <div class="alert alert-danger">{ e }</div>
                    }) }
                    { for self.feed.posts().iter().map(|p| html! {
                        <PostCard post={p.clone()} />
                    }) }
                    { for empty.then(|| html! {
                        <p class="text-muted">{ "No posts yet." }</p>
                    }) }
                    { for self.loading.then(|| html! {
                        <div class="text-center"><div class="spinner-border" role="status"></div></div>
                    }) }
                    { for (!self.loading && self.feed.has_more() && self.error.is_none()).then(|| html! {
                        <button
                            class="btn btn-outline-secondary w-100"
                            onclick={ctx.link().callback(|_| HomeMsg::LoadMore)}
                        >
                            { "Load more" }
                        </button>
                    }) }
                </section>
                { self.view_sidebar(ctx) }
            </div>
        }
    }
}
