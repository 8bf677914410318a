mod app;
pub use app::{App, AppContext, AppMsg};

mod comment_view;
pub use comment_view::CommentView;

mod home;
pub use home::Home;

mod link;
pub use link::Link;

mod login;
pub use login::Login;

mod module_intro;
pub use module_intro::ModuleIntro;

mod navbar;
pub use navbar::Navbar;

mod post_card;
pub use post_card::PostCard;

mod post_detail;
pub use post_detail::PostDetail;

mod post_editor;
pub use post_editor::PostEditor;

mod profile;
pub use profile::Profile;

mod register;
pub use register::Register;

mod reset_password;
pub use reset_password::ResetPassword;
