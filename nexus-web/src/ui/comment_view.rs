use nexus_client::{
    api::{Comment, CommentId, User},
    flatten_replies, CommentThread,
};
use yew::prelude::*;

use crate::util;

#[derive(Clone, PartialEq, Properties)]
pub struct CommentViewProps {
    /// A root comment, with its replies
    pub comment: Comment,
    pub viewer: Option<User>,
    pub on_reply: Callback<Comment>,
    /// `(comment, parent)`, with `None` as parent for a root comment
    pub on_delete: Callback<(CommentId, Option<CommentId>)>,
}

fn view_one(
    p: &CommentViewProps,
    c: &Comment,
    parent: Option<CommentId>,
    reply_to: Option<&str>,
) -> Html {
    let on_reply = {
        let c = c.clone();
        p.on_reply.reform(move |_: MouseEvent| c.clone())
    };
    let on_delete = {
        let id = c.id;
        p.on_delete.reform(move |_: MouseEvent| (id, parent))
    };
    let can_delete = CommentThread::can_delete(p.viewer.as_ref(), c);
    html! {
        <div class="d-flex mb-2">
            <span class="avatar-sm rounded-circle me-2">{ c.author_initial() }</span>
            <div class="flex-grow-1">
                <div>
                    <strong>{ &c.author_name }</strong>
                    { for reply_to.map(|name| html! {
                        <span class="text-muted">{ " replying to @" }{ name }</span>
                    }) }
                    <small class="text-muted ms-2">{ util::fmt_time(c.created_at) }</small>
                </div>
                <p class="mb-1" style="white-space: pre-wrap">{ &c.content }</p>
                <div>
                    { for p.viewer.is_some().then(|| html! {
                        <button class="btn btn-sm btn-link p-0 me-2" onclick={on_reply}>
                            { "Reply" }
                        </button>
                    }) }
                    { for can_delete.then(|| html! {
                        <button class="btn btn-sm btn-link text-danger p-0" onclick={on_delete}>
                            { "Delete" }
                        </button>
                    }) }
                </div>
            </div>
        </div>
    }
}

/// A discussion thread, drawn with a single level of indentation
#[function_component(CommentView)]
pub fn comment_view(p: &CommentViewProps) -> Html {
    let root = &p.comment;
    html! {
        <div class="comment border-bottom py-2">
            { view_one(p, root, None, None) }
            <div class="ms-5">
                { for flatten_replies(root).into_iter().map(|r| {
                    view_one(p, r.comment, r.comment.parent_id, r.reply_to)
                }) }
            </div>
        </div>
    }
}
