use nexus_client::api::{validate_not_blank, Backend, Error, VerifyRegister};
use yew::{context::ContextHandle, prelude::*};

use crate::{
    route::Route,
    ui::{AppContext, Link},
    util,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Step {
    /// Asking for the address the code will be sent to
    Email,
    /// Code sent, asking for it along with the account details
    Verify,
}

pub struct Register {
    app: AppContext,
    _app_handle: Option<ContextHandle<AppContext>>,
    step: Step,
    email: String,
    username: String,
    password: String,
    confirm: String,
    code: String,
    busy: bool,
    error: Option<String>,
}

pub enum RegisterMsg {
    AppChanged(AppContext),
    EmailChanged(String),
    UsernameChanged(String),
    PasswordChanged(String),
    ConfirmChanged(String),
    CodeChanged(String),
    SendCode,
    CodeSent(Result<(), Error>),
    Verify,
    Verified(Result<(), Error>),
    ChangeEmail,
}

impl Register {
    fn fail(&mut self, e: &Error) {
        tracing::info!(error = %e, "registration step refused");
        self.error = Some(e.to_string());
    }
}

impl Component for Register {
    type Message = RegisterMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let (app, handle) = AppContext::subscribe(ctx, RegisterMsg::AppChanged);
        Self {
            app,
            _app_handle: handle,
            step: Step::Email,
            email: String::new(),
            username: String::new(),
            password: String::new(),
            confirm: String::new(),
            code: String::new(),
            busy: false,
            error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            RegisterMsg::AppChanged(app) => self.app = app,
            RegisterMsg::EmailChanged(v) => self.email = v,
            RegisterMsg::UsernameChanged(v) => self.username = v,
            RegisterMsg::PasswordChanged(v) => self.password = v,
            RegisterMsg::ConfirmChanged(v) => self.confirm = v,
            RegisterMsg::CodeChanged(v) => self.code = v,
            RegisterMsg::SendCode => {
                if self.busy {
                    return false;
                }
                let email = self.email.trim().to_string();
                if let Err(e) = validate_not_blank("Email", &email) {
                    self.fail(&e);
                    return true;
                }
                self.busy = true;
                self.error = None;
                let backend = self.app.backend();
                ctx.link().send_future(async move {
                    RegisterMsg::CodeSent(backend.register(&email).await)
                });
            }
            RegisterMsg::CodeSent(res) => {
                self.busy = false;
                match res {
                    Ok(()) => self.step = Step::Verify,
                    Err(e) => self.fail(&e),
                }
            }
            RegisterMsg::Verify => {
                if self.busy {
                    return false;
                }
                let req = VerifyRegister {
                    email: self.email.trim().to_string(),
                    username: self.username.trim().to_string(),
                    password: self.password.clone(),
                    code: self.code.trim().to_string(),
                };
                if let Err(e) = req.validate() {
                    self.fail(&e);
                    return true;
                }
                if self.password != self.confirm {
                    self.fail(&Error::Validation(String::from("Passwords do not match")));
                    return true;
                }
                self.busy = true;
                self.error = None;
                let backend = self.app.backend();
                ctx.link().send_future(async move {
                    RegisterMsg::Verified(backend.verify_register(&req).await)
                });
            }
            RegisterMsg::Verified(res) => {
                self.busy = false;
                match res {
                    Ok(()) => {
                        util::alert("Your account is ready, you can now log in.");
                        self.app.navigate.emit(Route::Login);
                    }
                    Err(e) => self.fail(&e),
                }
            }
            RegisterMsg::ChangeEmail => {
                self.step = Step::Email;
                self.code.clear();
                self.error = None;
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        macro_rules! callback_for {
            ($msg:ident) => {
                ctx.link()
                    .callback(|e: web_sys::Event| RegisterMsg::$msg(util::event_value(&e)))
            };
        }
        let fields = match self.step {
            Step::Email => html! {<>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-2" for="email">{ "Email" }</label>
                    <input
                        type="email"
                        class="form-control form-control-lg"
                        id="email"
                        placeholder="you@example.org"
                        value={self.email.clone()}
                        onchange={callback_for!(EmailChanged)}
                    />
                </div>
                <button type="submit" class="btn btn-primary" disabled={self.busy}>
                    { "Send verification code" }
                </button>
            </>},
            Step::Verify => html! {<>
                <p>
                    { "A verification code was sent to " }<strong>{ &self.email }</strong>{ ". " }
                    <button
                        type="button"
                        class="btn btn-link p-0"
                        onclick={ctx.link().callback(|_| RegisterMsg::ChangeEmail)}
                    >
                        { "Use another address" }
                    </button>
                </p>
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
                    <label class="input-group-text col-xl-2" for="user">{ "Username" }</label>
                    <input
                        type="text"
                        class="form-control form-control-lg"
                        id="user"
                        value={self.username.clone()}
                        onchange={callback_for!(UsernameChanged)}
                    />
                </div>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-2" for="pass">{ "Password" }</label>
                    <input
                        type="password"
                        class="form-control form-control-lg"
                        id="pass"
                        value={self.password.clone()}
                        onchange={callback_for!(PasswordChanged)}
                    />
                </div>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-2" for="confirm">{ "Confirm" }</label>
                    <input
                        type="password"
                        class="form-control form-control-lg"
                        id="confirm"
                        value={self.confirm.clone()}
                        onchange={callback_for!(ConfirmChanged)}
                    />
                </div>
                <button type="submit" class="btn btn-primary" disabled={self.busy}>
                    { "Create account" }
                </button>
            </>},
        };
        let step = self.step;
        html! {<>
            <div class="text-center my-4">
                <h1>{ "Register" }</h1>
            </div>
            <form class="login-form" onsubmit={ctx.link().callback(move |e: SubmitEvent| {
                e.prevent_default();
                match step {
                    Step::Email => RegisterMsg::SendCode,
                    Step::Verify => RegisterMsg::Verify,
                }
            })}>
                { for self.error.as_ref().map(|e| html! {
                    <div class="alert alert-danger">{ e }</div>
                }) }
                { fields }
                <div class="mt-3">
                    { "Already registered? " }<Link to={Route::Login}>{ "Log in" }</Link>
                </div>
            </form>
        </>}
    }
}
