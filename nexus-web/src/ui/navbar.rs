use yew::prelude::*;

use crate::{
    modules::Module,
    route::Route,
    ui::{AppContext, Link},
};

#[function_component(Navbar)]
pub fn navbar() -> Html {
    let app = use_context::<AppContext>();
    let Some(app) = app else {
        return html! {};
    };

    let on_logout = {
        let app = app.clone();
        Callback::from(move |_: MouseEvent| {
            app.logout.emit(());
            app.navigate.emit(Route::home());
        })
    };

    let account = match app.user() {
        Some(user) => html! {
            <>
                <li class="nav-item">
                    <Link to={Route::CreatePost} class="btn btn-primary me-2">{ "New post" }</Link>
                </li>
                <li class="nav-item">
                    <Link to={Route::Profile} class="nav-link d-flex align-items-center">
                        { match &user.avatar {
                            Some(url) if !url.is_empty() => html! {
                                <img src={url.clone()} class="avatar-sm rounded-circle me-2" alt="avatar" />
                            },
                            _ => html! {
                                <span class="avatar-sm rounded-circle me-2">{ user.initial() }</span>
                            },
                        } }
                        { &user.username }
                    </Link>
                </li>
                <li class="nav-item">
                    <button class="btn btn-link nav-link" onclick={on_logout}>{ "Logout" }</button>
                </li>
            </>
        },
        None => html! {
            <>
                <li class="nav-item">
                    <Link to={Route::Login} class="nav-link">{ "Login" }</Link>
                </li>
                <li class="nav-item">
                    <Link to={Route::Register} class="btn btn-outline-primary">{ "Register" }</Link>
                </li>
            </>
        },
    };

    html! {
        <nav class="navbar navbar-expand-lg bg-light">
            <div class="container">
                <Link to={Route::home()} class="navbar-brand">{ "Nexus" }</Link>
                <ul class="navbar-nav me-auto">
                    { for Module::ALL.iter().map(|m| {
                        let info = m.info();
                        html! {
                            <li class="nav-item">
                                <Link to={Route::ModuleIntro(*m)} class="nav-link">
                                    { info.icon }{ " " }{ info.title }
                                </Link>
                            </li>
                        }
                    }) }
                </ul>
                <ul class="navbar-nav">
                    { account }
                </ul>
            </div>
        </nav>
    }
}
