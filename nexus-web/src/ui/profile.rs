use nexus_client::api::{Backend, Error, Gender, Profile as UserProfile, ProfileUpdate};
use yew::{context::ContextHandle, prelude::*};

use crate::{ui::AppContext, util};

#[derive(Clone, Copy, Debug)]
pub enum TextField {
    Phone,
    Qq,
    Wechat,
    Bio,
}

#[derive(Clone, Copy, Debug)]
pub enum PrivacyFlag {
    Phone,
    Email,
    Qq,
    Wechat,
    Gender,
}

impl PrivacyFlag {
    const ALL: [(PrivacyFlag, &'static str); 5] = [
        (PrivacyFlag::Email, "Show my email"),
        (PrivacyFlag::Phone, "Show my phone number"),
        (PrivacyFlag::Qq, "Show my QQ"),
        (PrivacyFlag::Wechat, "Show my WeChat"),
        (PrivacyFlag::Gender, "Show my gender"),
    ];

    fn get(self, u: &ProfileUpdate) -> bool {
        match self {
            PrivacyFlag::Phone => u.is_phone_public,
            PrivacyFlag::Email => u.is_email_public,
            PrivacyFlag::Qq => u.is_qq_public,
            PrivacyFlag::Wechat => u.is_wechat_public,
            PrivacyFlag::Gender => u.is_gender_public,
        }
    }

    fn set(self, u: &mut ProfileUpdate, v: bool) {
        match self {
            PrivacyFlag::Phone => u.is_phone_public = v,
            PrivacyFlag::Email => u.is_email_public = v,
            PrivacyFlag::Qq => u.is_qq_public = v,
            PrivacyFlag::Wechat => u.is_wechat_public = v,
            PrivacyFlag::Gender => u.is_gender_public = v,
        }
    }
}

pub enum ProfileMsg {
    AppChanged(AppContext),
    Loaded(Result<UserProfile, Error>),
    TextChanged(TextField, String),
    GenderChanged(Gender),
    PrivacyChanged(PrivacyFlag, bool),
    Save,
    Saved(ProfileUpdate, Result<(), Error>),
    AvatarPicked(Option<web_sys::File>),
    AvatarUploaded(Result<Option<String>, Error>),
}

pub struct Profile {
    app: AppContext,
    _app_handle: Option<ContextHandle<AppContext>>,
    profile: Option<UserProfile>,
    form: ProfileUpdate,
    saving: bool,
    uploading: bool,
}

impl Profile {
    fn fetch(&self, ctx: &Context<Self>) {
        let backend = self.app.backend();
        ctx.link()
            .send_future(async move { ProfileMsg::Loaded(backend.get_profile().await) });
    }

    /// Keeps the navbar's avatar in line with what the backend stores
    fn sync_avatar(&self, avatar: &str) {
        let Some(user) = self.app.user() else { return };
        if avatar.is_empty() || user.avatar.as_deref() == Some(avatar) {
            return;
        }
        let mut user = user.clone();
        user.avatar = Some(avatar.to_string());
        self.app.update_user.emit(user);
    }

    fn view_avatar(&self, ctx: &Context<Self>, profile: &UserProfile) -> Html {
        let initial = self.app.user().map(|u| u.initial()).unwrap_or('U');
        html! {
            <div class="d-flex align-items-center mb-4">
                { match profile.avatar.as_str() {
                    "" => html! { <span class="avatar-lg rounded-circle me-3">{ initial }</span> },
                    url => html! {
                        <img src={url.to_string()} class="avatar-lg rounded-circle me-3" alt="avatar" />
                    },
                } }
                <div>
                    <h2 class="mb-0">{ &profile.username }</h2>
                    <div class="text-muted">{ &profile.email }</div>
                    <label class="btn btn-sm btn-outline-secondary mt-2">
                        { if self.uploading { "Uploading..." } else { "Change avatar" } }
                        <input
                            type="file"
                            accept="image/*"
                            hidden={true}
                            disabled={self.uploading}
                            onchange={ctx.link().callback(|e: Event| {
                                ProfileMsg::AvatarPicked(util::event_file(&e))
                            })}
                        />
                    </label>
                </div>
            </div>
        }
    }
}

impl Component for Profile {
    type Message = ProfileMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let (app, handle) = AppContext::subscribe(ctx, ProfileMsg::AppChanged);
        let this = Self {
            app,
            _app_handle: handle,
            profile: None,
            form: ProfileUpdate::default(),
            saving: false,
            uploading: false,
        };
        this.fetch(ctx);
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            ProfileMsg::AppChanged(app) => {
                let relogged = app.session != self.app.session;
                self.app = app;
                if relogged && self.app.is_logged_in() {
                    self.fetch(ctx);
                }
            }
            ProfileMsg::Loaded(Ok(profile)) => {
                self.form = ProfileUpdate::from(&profile);
                self.sync_avatar(&profile.avatar);
                self.profile = Some(profile);
            }
            ProfileMsg::Loaded(Err(e)) => self.app.report("Loading your profile", &e),
            ProfileMsg::TextChanged(field, v) => match field {
                TextField::Phone => self.form.phone = v,
                TextField::Qq => self.form.qq = v,
                TextField::Wechat => self.form.wechat = v,
                TextField::Bio => self.form.bio = v,
            },
            ProfileMsg::GenderChanged(g) => self.form.gender = g,
            ProfileMsg::PrivacyChanged(flag, v) => flag.set(&mut self.form, v),
            ProfileMsg::Save => {
                if self.saving {
                    return false;
                }
                self.saving = true;
                let backend = self.app.backend();
                let update = self.form.clone();
                ctx.link().send_future(async move {
                    let res = backend.update_profile(&update).await;
                    ProfileMsg::Saved(update, res)
                });
            }
            ProfileMsg::Saved(update, res) => {
                self.saving = false;
                match res {
                    Ok(()) => {
                        if let Some(p) = &mut self.profile {
                            p.apply(&update);
                        }
                        util::alert("Profile saved.");
                    }
                    Err(e) => self.app.report("Saving your profile", &e),
                }
            }
            ProfileMsg::AvatarPicked(None) => return false,
            ProfileMsg::AvatarPicked(Some(file)) => {
                self.uploading = true;
                let backend = self.app.backend();
                ctx.link().send_future(async move {
                    let res = async {
                        let bytes = util::read_file(&file).await?;
                        backend.upload_avatar(file.name(), bytes).await
                    };
                    ProfileMsg::AvatarUploaded(res.await)
                });
            }
            ProfileMsg::AvatarUploaded(res) => {
                self.uploading = false;
                match res {
                    Ok(Some(url)) => {
                        self.sync_avatar(&url);
                        if let Some(p) = &mut self.profile {
                            p.avatar = url;
                        }
                    }
                    // the backend did not say where it put it
                    Ok(None) => self.fetch(ctx),
                    Err(e) => self.app.report("Uploading your avatar", &e),
                }
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let Some(profile) = &self.profile else {
            return html! {
                <div class="text-center"><div class="spinner-border" role="status"></div></div>
            };
        };
        let text = |field: TextField, label: &'static str, value: &str| {
            html! {
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-2">{ label }</label>
                    <input
                        type="text"
                        class="form-control"
                        value={value.to_string()}
                        onchange={ctx.link().callback(move |e: Event| {
                            ProfileMsg::TextChanged(field, util::event_value(&e))
                        })}
                    />
                </div>
            }
        };
        let gender = u8::from(self.form.gender);
        html! {
            <div class="profile">
                { self.view_avatar(ctx, profile) }
                <form onsubmit={ctx.link().callback(|e: SubmitEvent| {
                    e.prevent_default();
                    ProfileMsg::Save
                })}>
                    <div class="input-group mb-3">
                        <label class="input-group-text col-xl-2">{ "Gender" }</label>
                        <select
                            class="form-select"
                            onchange={ctx.link().callback(|e: Event| {
                                let v = util::event_value(&e).parse::<u8>().unwrap_or(0);
                                ProfileMsg::GenderChanged(Gender::from(v))
                            })}
                        >
                            <option value="0" selected={gender == 0}>{ "Unspecified" }</option>
                            <option value="1" selected={gender == 1}>{ "Male" }</option>
                            <option value="2" selected={gender == 2}>{ "Female" }</option>
                        </select>
                    </div>
                    { text(TextField::Phone, "Phone", &self.form.phone) }
                    { text(TextField::Qq, "QQ", &self.form.qq) }
                    { text(TextField::Wechat, "WeChat", &self.form.wechat) }
                    <div class="mb-3">
                        <label class="form-label" for="bio">{ "Bio" }</label>
                        <textarea
                            class="form-control"
                            id="bio"
                            rows="4"
                            value={self.form.bio.clone()}
                            onchange={ctx.link().callback(|e: Event| {
                                ProfileMsg::TextChanged(TextField::Bio, util::event_value(&e))
                            })}
                        />
                    </div>
                    <fieldset class="mb-3">
                        <legend class="fs-6">{ "Privacy" }</legend>
                        { for PrivacyFlag::ALL.iter().map(|&(flag, label)| html! {
                            <div class="form-check">
                                <input
                                    type="checkbox"
                                    class="form-check-input"
                                    checked={flag.get(&self.form)}
                                    onchange={ctx.link().callback(move |e: Event| {
                                        ProfileMsg::PrivacyChanged(flag, util::event_checked(&e))
                                    })}
                                />
                                <label class="form-check-label">{ label }</label>
                            </div>
                        }) }
                    </fieldset>
                    <button type="submit" class="btn btn-primary" disabled={self.saving}>
                        { if self.saving { "Saving..." } else { "Save" } }
                    </button>
                </form>
            </div>
        }
    }
}
