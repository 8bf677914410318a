use std::path::PathBuf;

use anyhow::Context;
use nexus_client::{
    api::{
        Backend, CommentId, Error, LoginRequest, NewPost, PageQuery, Post, PostId, PostQuery,
        VerifyPasswordReset, VerifyRegister,
    },
    CommentThread, FileStore, Gate, HttpBackend, PostInteractions, SessionContext, ViewKind,
};

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long, env = "NEXUS_HOST", default_value = "http://localhost:8080")]
    host: String,

    /// Where the login session is kept between invocations
    #[structopt(long, env = "NEXUS_SESSION", default_value = "nexus-session.json")]
    session: PathBuf,

    /// Log requests and responses
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// List posts, newest first
    Posts {
        #[structopt(long)]
        tag: Option<String>,

        #[structopt(long, default_value = "1")]
        page: u32,
    },

    /// List the most liked posts
    Popular {
        #[structopt(long, default_value = "10")]
        limit: u32,
    },

    /// List tags by number of posts
    Tags,

    /// Show a post and its discussion
    Show { post: PostId },

    /// Create a post
    NewPost {
        title: String,
        content: String,

        /// Comma-separated
        #[structopt(long, default_value = "")]
        tags: String,
    },

    /// Delete one of your posts
    DeletePost { post: PostId },

    /// Comment on a post, or reply to one of its comments
    Comment {
        post: PostId,
        content: String,

        #[structopt(long)]
        reply_to: Option<CommentId>,
    },

    /// Delete one of your comments
    DeleteComment { post: PostId, comment: CommentId },

    /// Like or unlike a post
    Like { post: PostId },

    /// Favorite or unfavorite a post
    Favorite { post: PostId },

    /// Log in with a username or email
    Login { identifier: String, password: String },

    Logout,

    Whoami,

    /// Show your profile
    Profile,

    /// Start registration, the backend mails a verification code
    Register { email: String },

    /// Finish registration with the mailed code
    ConfirmRegister {
        email: String,
        username: String,
        password: String,
        code: String,
    },

    /// Start a password reset, the backend mails a verification code
    ResetPassword { email: String },

    /// Finish a password reset with the mailed code
    ConfirmReset {
        email: String,
        password: String,
        code: String,
    },
}

fn print_post_line(p: &Post) {
    println!(
        "#{:<6} {} (by {}, {} likes, {} favorites){}",
        p.id,
        p.title,
        p.author.username,
        p.like_count,
        p.favorite_count,
        match p.tags.is_empty() {
            true => String::new(),
            false => format!(" [{}]", p.tags.join(", ")),
        },
    );
}

fn fmt_time(t: Option<nexus_client::api::Time>) -> String {
    t.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| String::from("unknown date"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = <Opt as structopt::StructOpt>::from_args();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(match opt.verbose {
            true => tracing::Level::DEBUG,
            false => tracing::Level::WARN,
        })
        .init();

    let mut session = SessionContext::hydrate(FileStore::new(&opt.session));
    let backend = HttpBackend::new(opt.host.clone()).with_token(session.token().cloned());

    let res = run(opt.cmd, &backend, &mut session).await;
    if let Err(e) = &res {
        if let Some(api_err) = e.downcast_ref::<Error>() {
            if api_err.is_token_invalid() {
                tracing::info!("session rejected by the backend, logging out");
                session.logout();
            }
        }
    }
    res
}

async fn run(
    cmd: Command,
    backend: &HttpBackend,
    session: &mut SessionContext<FileStore>,
) -> anyhow::Result<()> {
    match cmd {
        Command::Posts { tag, page } => {
            let query = PostQuery {
                page: PageQuery {
                    page,
                    size: PageQuery::POSTS_PER_PAGE,
                },
                tag,
            };
            let page = backend.list_posts(&query).await?;
            for p in &page.posts {
                print_post_line(p);
            }
            if page.posts.len() as u32 >= PageQuery::POSTS_PER_PAGE {
                println!("-- more on page {}", query.page.page + 1);
            }
        }
        Command::Popular { limit } => {
            for p in backend.popular_posts(limit).await? {
                print_post_line(&p);
            }
        }
        Command::Tags => {
            for t in backend.list_tags(Some("post_count")).await? {
                println!("{:>4}  {}", t.count, t.name);
            }
        }
        Command::Show { post } => {
            let p = backend
                .get_post(post)
                .await
                .with_context(|| format!("fetching post {post}"))?;
            println!("{}", p.title);
            println!(
                "by {} on {}{}",
                p.author.username,
                fmt_time(p.created_at),
                match p.tags.is_empty() {
                    true => String::new(),
                    false => format!(", tagged {}", p.tags.join(", ")),
                },
            );
            println!("{} likes, {} favorites", p.like_count, p.favorite_count);
            println!();
            println!("{}", p.content);
            println!();

            let thread = CommentThread::load(backend, post)
                .await
                .with_context(|| format!("fetching comments of post {post}"))?;
            println!("{} comments", thread.tree().len());
            for (depth, c) in thread.tree().iter() {
                println!(
                    "{}[{}] {} ({}): {}",
                    "    ".repeat(depth + 1),
                    c.id,
                    c.author_name,
                    fmt_time(c.created_at),
                    c.content,
                );
            }
        }
        Command::NewPost {
            title,
            content,
            tags,
        } => {
            let new = NewPost::from_form(&title, &content, &tags)?;
            match backend.create_post(&new).await? {
                Some(id) => println!("created post {id}"),
                None => println!("created post"),
            }
        }
        Command::DeletePost { post } => {
            backend.delete_post(post).await?;
            println!("deleted post {post}");
        }
        Command::Comment {
            post,
            content,
            reply_to,
        } => {
            let mut thread = CommentThread::load(backend, post).await?;
            if let Some(target) = reply_to {
                let target = thread
                    .tree()
                    .find(target)
                    .cloned()
                    .with_context(|| format!("no comment {target} on post {post}"))?;
                thread.reply_to(&target);
            }
            thread.submit(backend, &content).await?;
            println!("comment posted");
        }
        Command::DeleteComment { post, comment } => {
            let mut thread = CommentThread::load(backend, post).await?;
            let parent = thread
                .tree()
                .position_of(comment)
                .with_context(|| format!("no comment {comment} on post {post}"))?;
            thread.delete(backend, comment, parent).await?;
            println!("deleted comment {comment}");
        }
        Command::Like { post } => {
            let mut i = interactions_for(backend, session, post).await?;
            i.toggle_like(backend).await?;
            println!(
                "{} ({} likes)",
                if i.like.active { "liked" } else { "unliked" },
                i.like.count,
            );
        }
        Command::Favorite { post } => {
            let mut i = interactions_for(backend, session, post).await?;
            i.toggle_favorite(backend).await?;
            println!(
                "{} ({} favorites)",
                if i.favorite.active { "favorited" } else { "unfavorited" },
                i.favorite.count,
            );
        }
        Command::Login {
            identifier,
            password,
        } => {
            let resp = backend
                .login(&LoginRequest {
                    identifier,
                    password,
                })
                .await?;
            println!("logged in as {}", resp.user.username);
            session.login(resp.user, resp.token);
        }
        Command::Logout => {
            session.logout();
            println!("logged out");
        }
        Command::Whoami => match session.user() {
            Some(u) => println!("{} (id {})", u.username, u.id),
            None => println!("not logged in"),
        },
        Command::Profile => {
            let p = backend.get_profile().await?;
            println!("username: {}", p.username);
            println!("email:    {}", p.email);
            println!("phone:    {}", p.phone);
            println!("qq:       {}", p.qq);
            println!("wechat:   {}", p.wechat);
            println!("bio:      {}", p.bio);
        }
        Command::Register { email } => {
            backend.register(&email).await?;
            println!("verification code sent to {email}");
        }
        Command::ConfirmRegister {
            email,
            username,
            password,
            code,
        } => {
            backend
                .verify_register(&VerifyRegister {
                    email,
                    username,
                    password,
                    code,
                })
                .await?;
            println!("registered, you can now log in");
        }
        Command::ResetPassword { email } => {
            backend.request_password_reset(&email).await?;
            println!("verification code sent to {email}");
        }
        Command::ConfirmReset {
            email,
            password,
            code,
        } => {
            backend
                .verify_password_reset(&VerifyPasswordReset {
                    email,
                    password,
                    code,
                })
                .await?;
            println!("password changed");
        }
    }
    Ok(())
}

async fn interactions_for(
    backend: &HttpBackend,
    session: &SessionContext<FileStore>,
    post: PostId,
) -> anyhow::Result<PostInteractions> {
    let p = backend.get_post(post).await?;
    let mut i = PostInteractions::from_post(&p);
    match i.gate(ViewKind::Detail, session.is_logged_in()) {
        Gate::Send => (),
        Gate::PromptLogin | Gate::RedirectToDetail(_) => return Err(Error::NotLoggedIn.into()),
    }
    i.load_status(backend, true).await?;
    Ok(i)
}
