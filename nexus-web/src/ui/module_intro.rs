use yew::prelude::*;

use crate::{
    modules::Module,
    route::Route,
    ui::Link,
};

#[derive(Clone, PartialEq, Properties)]
pub struct ModuleIntroProps {
    pub module: Module,
}

/// Presentation page of a section that is not open yet
#[function_component(ModuleIntro)]
pub fn module_intro(p: &ModuleIntroProps) -> Html {
    let info = p.module.info();
    html! {
        <div class="module-intro">
            <Link to={Route::home()} class="btn btn-link px-0 mb-3">{ "← Back to the forum" }</Link>
            <div class="text-center mb-5">
                <div class="display-1">{ info.icon }</div>
                <h1>{ info.title }</h1>
                <p class="lead">{ info.description }</p>
                <span class="badge bg-info text-dark fs-6">
                    { "Coming soon · expected " }{ info.expected_launch }
                </span>
            </div>
            <h2 class="h4 mb-3">{ "Features" }</h2>
            <div class="row row-cols-1 row-cols-md-2 g-3 mb-5">
                { for info.features.iter().map(|f| html! {
                    <div class="col">
                        <div class="card h-100">
                            <div class="card-body">
                                <h3 class="h5 card-title">{ f.icon }{ " " }{ f.title }</h3>
                                <p class="card-text">{ f.description }</p>
                            </div>
                        </div>
                    </div>
                }) }
            </div>
            <h2 class="h4 mb-3">{ "Why it matters" }</h2>
            <ul class="list-unstyled">
                { for info.benefits.iter().map(|(title, description)| html! {
                    <li class="mb-2"><strong>{ *title }</strong>{ ": " }{ *description }</li>
                }) }
            </ul>
        </div>
    }
}
