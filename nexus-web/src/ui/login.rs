use nexus_client::api::{Backend, Error, LoginRequest, LoginResponse};
use yew::{context::ContextHandle, prelude::*};

use crate::{
    route::Route,
    ui::{AppContext, Link},
    util,
};

pub struct Login {
    app: AppContext,
    _app_handle: Option<ContextHandle<AppContext>>,
    identifier: String,
    password: String,
    submitting: bool,
    error: Option<String>,
}

pub enum LoginMsg {
    AppChanged(AppContext),
    IdentifierChanged(String),
    PasswordChanged(String),
    SubmitClicked,
    LoggedIn(Result<LoginResponse, Error>),
}

impl Component for Login {
    type Message = LoginMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let (app, handle) = AppContext::subscribe(ctx, LoginMsg::AppChanged);
        Self {
            app,
            _app_handle: handle,
            identifier: String::new(),
            password: String::new(),
            submitting: false,
            error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            LoginMsg::AppChanged(app) => self.app = app,
            LoginMsg::IdentifierChanged(i) => self.identifier = i,
            LoginMsg::PasswordChanged(p) => self.password = p,
            LoginMsg::SubmitClicked => {
                if self.submitting {
                    return false;
                }
                let req = LoginRequest {
                    identifier: self.identifier.trim().to_string(),
                    password: self.password.clone(),
                };
                if let Err(e) = req.validate() {
                    self.error = Some(e.to_string());
                    return true;
                }
                self.submitting = true;
                self.error = None;
                let backend = self.app.backend();
                ctx.link().send_future(async move {
                    LoginMsg::LoggedIn(backend.login(&req).await)
                });
            }
            LoginMsg::LoggedIn(res) => {
                self.submitting = false;
                match res {
                    Ok(resp) => {
                        self.password.clear();
                        self.app.login.emit(resp);
                        self.app.navigate.emit(Route::home());
                    }
                    Err(e) => {
                        tracing::info!(error = %e, "login refused");
                        self.error = Some(e.to_string());
                    }
                }
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        macro_rules! callback_for {
            ($msg:ident) => {
                ctx.link()
                    .callback(|e: web_sys::Event| LoginMsg::$msg(util::event_value(&e)))
            };
        }
        html! {<>
            <div class="text-center my-4">
                <h1>{ "Login" }</h1>
            </div>
            <form class="login-form" onsubmit={ctx.link().callback(|e: SubmitEvent| {
                e.prevent_default();
                LoginMsg::SubmitClicked
            })}>
                { for self.error.as_ref().map(|e| html! {
                    <div class="alert alert-danger">{ e }</div>
                }) }
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-2" for="identifier">{ "Username or email" }</label>
                    <input
                        type="text"
                        class="form-control form-control-lg"
                        id="identifier"
                        placeholder="user"
                        value={self.identifier.clone()}
                        onchange={callback_for!(IdentifierChanged)}
                    />
                </div>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-2" for="pass">{ "Password" }</label>
                    <input
                        type="password"
                        class="form-control form-control-lg"
                        id="pass"
                        placeholder="pass"
                        value={self.password.clone()}
                        onchange={callback_for!(PasswordChanged)}
                    />
                </div>
                <button type="submit" class="btn btn-primary" disabled={self.submitting}>
                    { if self.submitting { "Logging in..." } else { "Login" } }
                </button>
                <div class="mt-3">
                    <Link to={Route::Register} class="me-3">{ "Create an account" }</Link>
                    <Link to={Route::ResetPassword}>{ "Forgot your password?" }</Link>
                </div>
            </form>
        </>}
    }
}
