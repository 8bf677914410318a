use nexus_client::{
    api::{Error, LoginResponse, User},
    HttpBackend, Session, SessionContext,
};
use wasm_bindgen::{closure::Closure, JsCast};
use yew::{prelude::*, context::ContextHandle};

use crate::{
    route::Route,
    ui,
    util::{self, LocalStorageStore},
};

/// Everything pages need from the application shell
#[derive(Clone, PartialEq)]
pub struct AppContext {
    pub session: Option<Session>,
    pub navigate: Callback<Route>,
    pub login: Callback<LoginResponse>,
    pub logout: Callback<()>,
    pub update_user: Callback<User>,
}

impl AppContext {
    /// Only used if a page ends up rendered outside of the [`App`]
    fn detached() -> AppContext {
        AppContext {
            session: None,
            navigate: Callback::noop(),
            login: Callback::noop(),
            logout: Callback::noop(),
            update_user: Callback::noop(),
        }
    }

    /// Subscribes a struct component to the context
    pub fn subscribe<C, F>(ctx: &Context<C>, on_change: F) -> (AppContext, Option<ContextHandle<AppContext>>)
    where
        C: Component,
        F: Fn(AppContext) -> C::Message + 'static,
    {
        match ctx.link().context(ctx.link().callback(on_change)) {
            Some((app, handle)) => (app, Some(handle)),
            None => {
                tracing::error!("component rendered without an app context");
                (AppContext::detached(), None)
            }
        }
    }

    pub fn backend(&self) -> HttpBackend {
        crate::backend(self.session.as_ref().map(|s| s.token.clone()))
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Tells the user about `err`. An invalid token ends the session.
    pub fn report(&self, action: &str, err: &Error) {
        tracing::warn!(%action, error = %err, "request failed");
        if err.is_token_invalid() && self.is_logged_in() {
            util::alert("Your session has expired, please log in again.");
            self.logout.emit(());
            self.navigate.emit(Route::Login);
            return;
        }
        util::alert(&format!("{action}: {err}"));
    }
}

pub enum AppMsg {
    /// In-app navigation, recorded in the browser history
    Navigate(Route),
    /// Back or forward button
    Navigated(Route),
    Login(LoginResponse),
    Logout,
    UpdateUser(User),
}

pub struct App {
    session: SessionContext<LocalStorageStore>,
    route: Route,
    navigate: Callback<Route>,
    login: Callback<LoginResponse>,
    logout: Callback<()>,
    update_user: Callback<User>,
    _popstate: Option<Closure<dyn Fn()>>,
}

impl App {
    fn listen_popstate(ctx: &Context<Self>) -> Option<Closure<dyn Fn()>> {
        let link = ctx.link().clone();
        let closure = Closure::wrap(Box::new(move || {
            link.send_message(AppMsg::Navigated(Route::current()))
        }) as Box<dyn Fn()>);
        let window = web_sys::window()?;
        if let Err(e) = window
            .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
        {
            tracing::error!(error = ?e, "failed listening to history changes");
            return None;
        }
        Some(closure)
    }

    fn context(&self) -> AppContext {
        AppContext {
            session: self.session.current().cloned(),
            navigate: self.navigate.clone(),
            login: self.login.clone(),
            logout: self.logout.clone(),
            update_user: self.update_user.clone(),
        }
    }

    fn page(&self) -> Html {
        if self.route.needs_login() && !self.session.is_logged_in() {
            return html! { <ui::Login /> };
        }
        match &self.route {
            Route::Home { tag } => html! {
                <ui::Home key={tag.clone().unwrap_or_default()} tag={tag.clone()} />
            },
            Route::Post(id) => html! { <ui::PostDetail key={id.0} id={*id} /> },
            Route::EditPost(id) => html! { <ui::PostEditor key={id.0} post={Some(*id)} /> },
            Route::CreatePost => html! { <ui::PostEditor key="new" post={None} /> },
            Route::Login => html! { <ui::Login /> },
            Route::Register => html! { <ui::Register /> },
            Route::ResetPassword => html! { <ui::ResetPassword /> },
            Route::Profile => html! { <ui::Profile /> },
            Route::ModuleIntro(m) => html! { <ui::ModuleIntro module={*m} /> },
            Route::NotFound => html! {
                <div class="text-center my-5">
                    <h1>{ "404" }</h1>
                    <p>{ "This page does not exist." }</p>
                    <ui::Link to={Route::home()}>{ "Back to the home page" }</ui::Link>
                </div>
            },
        }
    }
}

impl Component for App {
    type Message = AppMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let session = SessionContext::hydrate(LocalStorageStore);
        App {
            session,
            route: Route::current(),
            navigate: ctx.link().callback(AppMsg::Navigate),
            login: ctx.link().callback(AppMsg::Login),
            logout: ctx.link().callback(|()| AppMsg::Logout),
            update_user: ctx.link().callback(AppMsg::UpdateUser),
            _popstate: App::listen_popstate(ctx),
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::Navigate(route) => {
                util::push_history(&route.to_path());
                self.route = route;
            }
            AppMsg::Navigated(route) => self.route = route,
            AppMsg::Login(resp) => {
                tracing::info!(user = %resp.user.username, "logged in");
                self.session.login(resp.user, resp.token);
            }
            AppMsg::Logout => {
                tracing::info!("logged out");
                self.session.logout();
            }
            AppMsg::UpdateUser(user) => self.session.update_user(|u| *u = user),
        }
        true
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <ContextProvider<AppContext> context={self.context()}>
                <ui::Navbar />
                <main class="container py-4">
                    { self.page() }
                </main>
                <footer class="text-center text-muted py-3">
                    { "Nexus forum" }
                </footer>
            </ContextProvider<AppContext>>
        }
    }
}
