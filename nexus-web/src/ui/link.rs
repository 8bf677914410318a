use yew::prelude::*;

use crate::{route::Route, ui::AppContext};

#[derive(Clone, PartialEq, Properties)]
pub struct LinkProps {
    pub to: Route,

    #[prop_or_default]
    pub class: &'static str,

    #[prop_or_default]
    pub children: Children,
}

/// An `<a>` that navigates without reloading the page
#[function_component(Link)]
pub fn link(p: &LinkProps) -> Html {
    let app = use_context::<AppContext>();
    let onclick = {
        let to = p.to.clone();
        Callback::from(move |e: MouseEvent| {
            if let Some(app) = &app {
                e.prevent_default();
                app.navigate.emit(to.clone());
            }
        })
    };
    html! {
        <a href={p.to.to_path()} class={p.class} {onclick}>
            { for p.children.iter() }
        </a>
    }
}
