use nexus_client::api::{Backend, Error, NewPost, Post, PostId};
use yew::{context::ContextHandle, prelude::*};

use crate::{route::Route, ui::AppContext, util};

#[derive(Clone, PartialEq, Properties)]
pub struct PostEditorProps {
    /// The post being edited, `None` for a new one
    pub post: Option<PostId>,
}

pub enum PostEditorMsg {
    AppChanged(AppContext),
    Loaded(Result<Post, Error>),
    TitleChanged(String),
    ContentChanged(String),
    TagsChanged(String),
    Submit,
    Created(Result<Option<PostId>, Error>),
    Updated(PostId, Result<(), Error>),
}

pub struct PostEditor {
    app: AppContext,
    _app_handle: Option<ContextHandle<AppContext>>,
    /// Set once an edited post is known to belong to the viewer
    ready: bool,
    title: String,
    content: String,
    tags: String,
    submitting: bool,
    error: Option<String>,
}

impl Component for PostEditor {
    type Message = PostEditorMsg;
    type Properties = PostEditorProps;

    fn create(ctx: &Context<Self>) -> Self {
        let (app, handle) = AppContext::subscribe(ctx, PostEditorMsg::AppChanged);
        if let Some(id) = ctx.props().post {
            let backend = app.backend();
            ctx.link().send_future(async move {
                PostEditorMsg::Loaded(backend.get_post(id).await)
            });
        }
        Self {
            app,
            _app_handle: handle,
            ready: ctx.props().post.is_none(),
            title: String::new(),
            content: String::new(),
            tags: String::new(),
            submitting: false,
            error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            PostEditorMsg::AppChanged(app) => self.app = app,
            PostEditorMsg::Loaded(Ok(post)) => {
                if !self.app.user().map_or(false, |u| post.is_authored_by(u)) {
                    util::alert("You can only edit your own posts.");
                    self.app.navigate.emit(Route::Post(post.id));
                    return false;
                }
                self.title = post.title;
                self.content = post.content;
                self.tags = NewPost::tags_as_form(&post.tags);
                self.ready = true;
            }
            PostEditorMsg::Loaded(Err(e)) => {
                self.app.report("Loading the post", &e);
                self.app.navigate.emit(Route::home());
            }
            PostEditorMsg::TitleChanged(v) => self.title = v,
            PostEditorMsg::ContentChanged(v) => self.content = v,
            PostEditorMsg::TagsChanged(v) => self.tags = v,
            PostEditorMsg::Submit => {
                if self.submitting || !self.ready {
                    return false;
                }
                let post = match NewPost::from_form(&self.title, &self.content, &self.tags) {
                    Ok(p) => p,
                    Err(e) => {
                        self.error = Some(e.to_string());
                        return true;
                    }
                };
                self.submitting = true;
                self.error = None;
                let backend = self.app.backend();
                match ctx.props().post {
                    Some(id) => ctx.link().send_future(async move {
                        PostEditorMsg::Updated(id, backend.update_post(id, &post).await)
                    }),
                    None => ctx.link().send_future(async move {
                        PostEditorMsg::Created(backend.create_post(&post).await)
                    }),
                }
            }
            PostEditorMsg::Created(res) => {
                self.submitting = false;
                match res {
                    Ok(Some(id)) => self.app.navigate.emit(Route::Post(id)),
                    Ok(None) => self.app.navigate.emit(Route::home()),
                    Err(e) => self.app.report("Publishing the post", &e),
                }
            }
            PostEditorMsg::Updated(id, res) => {
                self.submitting = false;
                match res {
                    Ok(()) => self.app.navigate.emit(Route::Post(id)),
                    Err(e) => self.app.report("Saving the post", &e),
                }
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        if !self.ready {
            return html! {
                <div class="text-center"><div class="spinner-border" role="status"></div></div>
            };
        }
        macro_rules! callback_for {
            ($msg:ident) => {
                ctx.link()
                    .callback(|e: InputEvent| PostEditorMsg::$msg(util::event_value(&e)))
            };
        }
        let editing = ctx.props().post.is_some();
        html! {<>
            <h1 class="mb-4">{ if editing { "Edit post" } else { "New post" } }</h1>
            <form onsubmit={ctx.link().callback(|e: SubmitEvent| {
                e.prevent_default();
                PostEditorMsg::Submit
            })}>
                { for self.error.as_ref().map(|e| html! {
                    <div class="alert alert-danger">{ e }</div>
                }) }
                <div class="mb-3">
                    <label class="form-label" for="title">{ "Title" }</label>
                    <input
                        type="text"
                        class="form-control form-control-lg"
                        id="title"
                        value={self.title.clone()}
                        oninput={callback_for!(TitleChanged)}
                    />
                </div>
                <div class="mb-3">
                    <label class="form-label" for="content">{ "Content" }</label>
                    <textarea
                        class="form-control"
                        id="content"
                        rows="12"
                        value={self.content.clone()}
                        oninput={callback_for!(ContentChanged)}
                    />
                </div>
                <div class="mb-3">
                    <label class="form-label" for="tags">{ "Tags" }</label>
                    <input
                        type="text"
                        class="form-control"
                        id="tags"
                        placeholder="rust, web, news"
                        value={self.tags.clone()}
                        oninput={callback_for!(TagsChanged)}
                    />
                    <div class="form-text">{ "Comma-separated" }</div>
                </div>
                <button type="submit" class="btn btn-primary" disabled={self.submitting}>
                    { match (self.submitting, editing) {
                        (true, _) => "Saving...",
                        (false, true) => "Save",
                        (false, false) => "Publish",
                    } }
                </button>
            </form>
        </>}
    }
}
