use nexus_client::api::{validate_not_blank, Backend, Error, VerifyPasswordReset};
use yew::{context::ContextHandle, prelude::*};

use crate::{
    route::Route,
    ui::{AppContext, Link},
    util,
};

pub struct ResetPassword {
    app: AppContext,
    _app_handle: Option<ContextHandle<AppContext>>,
    code_sent: bool,
    email: String,
    code: String,
    password: String,
    busy: bool,
    error: Option<String>,
}

pub enum ResetPasswordMsg {
    AppChanged(AppContext),
    EmailChanged(String),
    CodeChanged(String),
    PasswordChanged(String),
    Submit,
    CodeSent(Result<(), Error>),
    Reset(Result<(), Error>),
}

impl Component for ResetPassword {
    type Message = ResetPasswordMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let (app, handle) = AppContext::subscribe(ctx, ResetPasswordMsg::AppChanged);
        Self {
            app,
            _app_handle: handle,
            code_sent: false,
            email: String::new(),
            code: String::new(),
            password: String::new(),
            busy: false,
            error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            ResetPasswordMsg::AppChanged(app) => self.app = app,
            ResetPasswordMsg::EmailChanged(v) => self.email = v,
            ResetPasswordMsg::CodeChanged(v) => self.code = v,
            ResetPasswordMsg::PasswordChanged(v) => self.password = v,
            ResetPasswordMsg::Submit if self.busy => return false,
            ResetPasswordMsg::Submit => {
                let backend = self.app.backend();
                let email = self.email.trim().to_string();
                if !self.code_sent {
                    if let Err(e) = validate_not_blank("Email", &email) {
                        self.error = Some(e.to_string());
                        return true;
                    }
                    ctx.link().send_future(async move {
                        ResetPasswordMsg::CodeSent(backend.request_password_reset(&email).await)
                    });
                } else {
                    let req = VerifyPasswordReset {
                        email,
                        password: self.password.clone(),
                        code: self.code.trim().to_string(),
                    };
                    if let Err(e) = req.validate() {
                        self.error = Some(e.to_string());
                        return true;
                    }
                    ctx.link().send_future(async move {
                        ResetPasswordMsg::Reset(backend.verify_password_reset(&req).await)
                    });
                }
                self.busy = true;
                self.error = None;
            }
            ResetPasswordMsg::CodeSent(res) => {
                self.busy = false;
                match res {
                    Ok(()) => self.code_sent = true,
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
            ResetPasswordMsg::Reset(res) => {
                self.busy = false;
                match res {
                    Ok(()) => {
                        util::alert("Your password was changed, you can now log in.");
                        self.app.navigate.emit(Route::Login);
                    }
                    Err(e) => {
                        tracing::info!(error = %e, "password reset refused");
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
                ctx.link().callback(|e: web_sys::Event| {
                    ResetPasswordMsg::$msg(util::event_value(&e))
                })
            };
        }
        html! {<>
            <div class="text-center my-4">
                <h1>{ "Reset your password" }</h1>
            </div>
            <form class="login-form" onsubmit={ctx.link().callback(|e: SubmitEvent| {
                e.prevent_default();
                ResetPasswordMsg::Submit
            })}>
                { for self.error.as_ref().map(|e| html! {
                    <div class="alert alert-danger">{ e }</div>
                }) }
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-2" for="email">{ "Email" }</label>
                    <input
                        type="email"
                        class="form-control form-control-lg"
                        id="email"
                        disabled={self.code_sent}
                        value={self.email.clone()}
                        onchange={callback_for!(EmailChanged)}
                    />
                </div>
                { for self.code_sent.then(|| html! {<>
                    <div class="input-group mb-3">
                        <label class="input-group-text col-xl-2" for="code">{ "Code" }</label>
                        <input
                            type="text"
                            class="form-control form-control-lg"
                            id="code"
                            value={self.code.clone()}
                            onchange={callback_for!(CodeChanged)}
                        />
                    </div>
                    <div class="input-group mb-3">
                        <label class="input-group-text col-xl-2" for="pass">{ "New password" }</label>
                        <input
                            type="password"
                            class="form-control form-control-lg"
                            id="pass"
                            value={self.password.clone()}
                            onchange={callback_for!(PasswordChanged)}
                        />
                    </div>
                </>}) }
                <button type="submit" class="btn btn-primary" disabled={self.busy}>
                    { if self.code_sent { "Change password" } else { "Send verification code" } }
                </button>
                <div class="mt-3">
                    <Link to={Route::Login}>{ "Back to login" }</Link>
                </div>
            </form>
        </>}
    }
}
