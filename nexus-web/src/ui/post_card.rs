use nexus_client::{api::Post, Gate, PostInteractions, ViewKind};
use yew::prelude::*;

use crate::{
    route::Route,
    ui::{AppContext, Link},
    util,
};

const EXCERPT_LEN: usize = 200;

#[derive(Clone, PartialEq, Properties)]
pub struct PostCardProps {
    pub post: Post,
}

fn excerpt(content: &str) -> String {
    match content.char_indices().nth(EXCERPT_LEN) {
        Some((i, _)) => format!("{}…", &content[..i]),
        None => content.to_string(),
    }
}

/// Shown before taking an anonymous reader to the post's page
fn toggle_notice(logged_in: bool) -> Option<&'static str> {
    (!logged_in).then_some("Please log in first to like or favorite posts.")
}

#[function_component(PostCard)]
pub fn post_card(p: &PostCardProps) -> Html {
    let app = use_context::<AppContext>();
    let post = &p.post;

    // Toggling is only ever done from the post's own page
    let on_toggle = {
        let interactions = PostInteractions::from_post(post);
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            let Some(app) = &app else { return };
            match interactions.gate(ViewKind::List, app.is_logged_in()) {
                Gate::RedirectToDetail(id) => {
                    if let Some(msg) = toggle_notice(app.is_logged_in()) {
                        util::alert(msg);
                    }
                    app.navigate.emit(Route::Post(id));
                }
                Gate::PromptLogin => app.navigate.emit(Route::Login),
                Gate::Send => (),
            }
        })
    };

    html! {
        <div class="card mb-3">
            <div class="card-body">
                <h5 class="card-title">
                    <Link to={Route::Post(post.id)}>{ &post.title }</Link>
                </h5>
                <h6 class="card-subtitle mb-2 text-muted">
                    { &post.author.username }{ " · " }{ util::fmt_time(post.created_at) }
                </h6>
                <p class="card-text">{ excerpt(&post.content) }</p>
                <div class="d-flex align-items-center">
                    { for post.tags.iter().map(|t| html! {
                        <Link
                            to={Route::Home { tag: Some(t.clone()) }}
                            class="badge bg-secondary me-1"
                        >
                            { t }
                        </Link>
                    }) }
                    <span class="ms-auto">
                        <button class="btn btn-sm btn-link" onclick={on_toggle.clone()}>
                            { if post.liked { "❤️ " } else { "🤍 " } }{ post.like_count }
                        </button>
                        <button class="btn btn-sm btn-link" onclick={on_toggle}>
                            { if post.favorited { "⭐ " } else { "☆ " } }{ post.favorite_count }
                        </button>
                    </span>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpts_cut_on_char_boundaries() {
        assert_eq!(excerpt("short"), "short");
        let long = "é".repeat(EXCERPT_LEN + 5);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), EXCERPT_LEN + 1);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn anonymous_clicks_are_told_to_log_in() {
        assert!(toggle_notice(false).is_some());
        assert_eq!(toggle_notice(true), None);
    }
}
