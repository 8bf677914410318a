use nexus_client::api::PostId;
use reqwest::Url;

use crate::modules::Module;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Route {
    Home { tag: Option<String> },
    Post(PostId),
    EditPost(PostId),
    CreatePost,
    Login,
    Register,
    ResetPassword,
    Profile,
    ModuleIntro(Module),
    NotFound,
}

impl Route {
    pub fn home() -> Route {
        Route::Home { tag: None }
    }

    /// `url` is anything from a bare path to a full URL
    pub fn from_url(url: &str) -> Route {
        let url = match Url::parse("http://nexus.invalid/").and_then(|base| base.join(url)) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(%url, error = %e, "unparseable location");
                return Route::NotFound;
            }
        };
        let segments = url
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        match segments.as_slice() {
            [] => Route::Home {
                tag: url
                    .query_pairs()
                    .find(|(k, _)| k == "tag")
                    .map(|(_, v)| v.into_owned())
                    .filter(|t| !t.is_empty()),
            },
            ["post", id] => id.parse().map(Route::Post).unwrap_or(Route::NotFound),
            ["post", id, "edit"] => id.parse().map(Route::EditPost).unwrap_or(Route::NotFound),
            ["create-post"] => Route::CreatePost,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["reset-password"] => Route::ResetPassword,
            ["profile"] => Route::Profile,
            [module, "intro"] => Module::from_slug(module)
                .map(Route::ModuleIntro)
                .unwrap_or(Route::NotFound),
            _ => Route::NotFound,
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Route::Home { tag: None } => String::from("/"),
            Route::Home { tag: Some(tag) } => {
                let mut url = match Url::parse("http://nexus.invalid/") {
                    Ok(url) => url,
                    Err(_) => return String::from("/"),
                };
                url.query_pairs_mut().append_pair("tag", tag);
                format!("/?{}", url.query().unwrap_or_default())
            }
            Route::Post(id) => format!("/post/{id}"),
            Route::EditPost(id) => format!("/post/{id}/edit"),
            Route::CreatePost => String::from("/create-post"),
            Route::Login => String::from("/login"),
            Route::Register => String::from("/register"),
            Route::ResetPassword => String::from("/reset-password"),
            Route::Profile => String::from("/profile"),
            Route::ModuleIntro(m) => format!("/{}/intro", m.slug()),
            Route::NotFound => String::from("/404"),
        }
    }

    /// The route the browser is currently showing
    pub fn current() -> Route {
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return Route::home();
        };
        let path = location.pathname().unwrap_or_default();
        let search = location.search().unwrap_or_default();
        Route::from_url(&format!("{path}{search}"))
    }

    /// Whether this page is only reachable when logged in
    pub fn needs_login(&self) -> bool {
        matches!(self, Route::CreatePost | Route::EditPost(_) | Route::Profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_round_trips() {
        let mut routes = vec![
            Route::home(),
            Route::Home {
                tag: Some(String::from("rust")),
            },
            Route::Home {
                tag: Some(String::from("c++ & friends/é")),
            },
            Route::Post(PostId(42)),
            Route::EditPost(PostId(7)),
            Route::CreatePost,
            Route::Login,
            Route::Register,
            Route::ResetPassword,
            Route::Profile,
            Route::NotFound,
        ];
        routes.extend(Module::ALL.into_iter().map(Route::ModuleIntro));
        for r in routes {
            assert_eq!(Route::from_url(&r.to_path()), r, "path {}", r.to_path());
        }
    }

    #[test]
    fn paths() {
        assert_eq!(Route::from_url("/?tag=web"), Route::Home { tag: Some(String::from("web")) });
        assert_eq!(Route::from_url("/?tag="), Route::home());
        assert_eq!(Route::from_url("/post/12/"), Route::Post(PostId(12)));
        assert_eq!(Route::from_url("/post/abc"), Route::NotFound);
        assert_eq!(
            Route::from_url("/ai-chat/intro"),
            Route::ModuleIntro(Module::AiChat)
        );
        assert_eq!(Route::from_url("/chess/intro"), Route::NotFound);
        assert_eq!(Route::from_url("/nowhere"), Route::NotFound);
        assert_eq!(Route::ModuleIntro(Module::NftMarket).to_path(), "/nft-market/intro");
    }
}
