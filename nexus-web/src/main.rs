use nexus_client::{api::AuthToken, HttpBackend, DEFAULT_HOST};

mod modules;
mod route;
mod ui;
mod util;

/// Where the forum API lives, fixed at build time
const API_HOST: &str = match option_env!("NEXUS_API_HOST") {
    Some(host) => host,
    None => DEFAULT_HOST,
};

lazy_static::lazy_static! {
    static ref CLIENT: reqwest::Client = reqwest::Client::new();
}

/// A backend acting on behalf of `token`'s owner, or anonymously
pub fn backend(token: Option<AuthToken>) -> HttpBackend {
    HttpBackend::with_client(CLIENT.clone(), API_HOST).with_token(token)
}

fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    tracing::info!(api = API_HOST, "starting");
    yew::Renderer::<ui::App>::new().render();
}
