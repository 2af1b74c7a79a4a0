use std::ops::ControlFlow;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::domain::{
    AnalyzeResult, LoginRequest, MAX_POST_CHARS, Post, PostDraft, PostId, SignUpRequest,
};
use crate::frameworks::config::ClientConfig;
use crate::interface_adapters::clients::{AnalysisClient, BackendClient};
use crate::interface_adapters::commands::{self, Command, HELP, ParseError};
use crate::interface_adapters::token_file::FileTokenStore;
use crate::use_cases::{
    AnalysisPhase, AnalysisState, Composer, DebouncedAnalyzer, FeedLoader, LoadOutcome,
    LogInUseCase, LogOutUseCase, RestoreSessionUseCase, Session, SignUpUseCase, analyze_post,
};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so they never interleave with console output.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ClientConfig::from_env();
    tracing::debug!(?config, "client configured.");

    let session = Session::new();
    let store = FileTokenStore::new(&config.token_file);
    let restore = RestoreSessionUseCase {
        store: store.clone(),
        session: session.clone(),
    };
    if let Err(e) = restore.execute().await {
        tracing::warn!(error = %e, "starting without a saved session.");
    }

    let backend = match BackendClient::new(&config.api_url, session.clone(), config.http_timeout) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build backend client");
            return;
        }
    };
    let analysis = match AnalysisClient::new(&config.ai_url, session.clone(), config.http_timeout)
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build analysis client");
            return;
        }
    };

    let analyzer = DebouncedAnalyzer::new(analysis.clone(), config.analyze_debounce);
    tokio::spawn(report_analysis(analyzer.subscribe()));

    let mut console = Console {
        feed: FeedLoader::new(backend.clone(), config.page_size),
        composer: Composer::new(analyzer),
        session,
        store,
        backend,
        analysis,
    };

    console.reload().await;
    println!("type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "failed to read input");
                break;
            }
        };

        match commands::parse(&line) {
            Ok(command) => {
                if console.handle(command).await.is_break() {
                    break;
                }
            }
            Err(ParseError::Empty) => {}
            Err(e) => println!("{e}"),
        }
    }

    tracing::info!("bye.");
}

// Prints each applied analysis as it lands.
async fn report_analysis(mut rx: watch::Receiver<AnalysisState>) {
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        if state.phase != AnalysisPhase::Analyzed {
            continue;
        }
        if let Some(analyzed) = state.result {
            println!("analysis: {}", describe_analysis(&analyzed.result));
        }
    }
}

struct Console {
    session: Session,
    store: FileTokenStore,
    backend: BackendClient,
    analysis: AnalysisClient,
    feed: FeedLoader<BackendClient>,
    composer: Composer<AnalysisClient>,
}

impl Console {
    async fn handle(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::SignUp {
                email,
                password,
                nickname,
            } => {
                let use_case = SignUpUseCase {
                    auth: self.backend.clone(),
                };
                match use_case
                    .execute(SignUpRequest {
                        email,
                        password,
                        nickname,
                    })
                    .await
                {
                    Ok(profile) => println!("account created for {}, now log in", profile.nickname),
                    Err(e) => println!("sign up failed: {}", e.user_message()),
                }
            }
            Command::LogIn { email, password } => {
                let use_case = LogInUseCase {
                    auth: self.backend.clone(),
                    store: self.store.clone(),
                    session: self.session.clone(),
                };
                match use_case.execute(LoginRequest { email, password }).await {
                    Ok(()) => {
                        println!("logged in");
                        self.reload().await;
                    }
                    Err(e) => println!("login failed: {}", e.user_message()),
                }
            }
            Command::LogOut => {
                let use_case = LogOutUseCase {
                    store: self.store.clone(),
                    session: self.session.clone(),
                };
                match use_case.execute().await {
                    Ok(()) => println!("logged out"),
                    Err(e) => println!("logged out, but {}", e.user_message()),
                }
            }
            Command::Feed => self.reload().await,
            Command::More => self.load_more().await,
            Command::Show(id) => match self.feed.fetch(id).await {
                Ok(post) => println!("{}", render_post(&post)),
                Err(e) => println!("{}", e.user_message()),
            },
            Command::Author(name) => self.composer.set_author(name),
            Command::Type(text) => {
                self.composer.set_content(text);
                self.print_char_count();
            }
            Command::Tag(tag) => {
                self.composer.apply_hashtag(&tag);
                println!("{}", self.composer.content());
                self.print_char_count();
            }
            Command::Post => {
                if !self.composer.can_submit() {
                    println!("set an author and some text (at most {MAX_POST_CHARS} chars) first");
                    return ControlFlow::Continue(());
                }
                match self.composer.submit(&self.feed).await {
                    Ok(post) => println!("posted\n{}", render_post(&post)),
                    Err(e) => println!("post failed: {}", e.user_message()),
                }
            }
            Command::Edit { id, content } => {
                let Some(current) = self.find_post(id).await else {
                    return ControlFlow::Continue(());
                };
                match self
                    .feed
                    .update(id, PostDraft::new(content, current.author))
                    .await
                {
                    Ok(post) => println!("updated\n{}", render_post(&post)),
                    Err(e) => println!("edit failed: {}", e.user_message()),
                }
            }
            Command::Delete(id) => match self.feed.delete(id).await {
                Ok(_) => println!("deleted {id}"),
                Err(e) => println!("delete failed: {}", e.user_message()),
            },
            Command::Analyze(id) => {
                let Some(post) = self.find_post(id).await else {
                    return ControlFlow::Continue(());
                };
                match analyze_post(&self.analysis, &post.content).await {
                    Some(result) => println!("[{id}] {}", describe_analysis(&result)),
                    None => println!("analysis unavailable right now"),
                }
            }
            Command::Status => self.print_status(),
            Command::Help => println!("{HELP}"),
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    async fn reload(&self) {
        match self.feed.reload().await {
            Ok(_) => {
                let snapshot = self.feed.snapshot();
                if snapshot.posts.is_empty() {
                    println!("no posts yet, write the first one");
                }
                for post in &snapshot.posts {
                    println!("{}", render_post(post));
                }
                print_more_hint(snapshot.cursor.is_some_and(|cursor| cursor.has_more));
            }
            Err(e) => println!("failed to load posts: {}", e.user_message()),
        }
    }

    async fn load_more(&self) {
        let before = self.feed.snapshot().posts.len();
        match self.feed.load_more().await {
            Ok(LoadOutcome::Loaded { has_more, .. }) => {
                for post in self.feed.snapshot().posts.iter().skip(before) {
                    println!("{}", render_post(post));
                }
                print_more_hint(has_more);
            }
            Ok(LoadOutcome::Exhausted) => println!("no more posts"),
            Ok(LoadOutcome::Skipped) => println!("still loading"),
            Err(e) => println!("failed to load posts: {}", e.user_message()),
        }
    }

    // Prefer the listed copy; fall back to the server.
    async fn find_post(&self, id: PostId) -> Option<Post> {
        if let Some(post) = self.feed.snapshot().posts.into_iter().find(|post| post.id == id) {
            return Some(post);
        }
        match self.feed.fetch(id).await {
            Ok(post) => Some(post),
            Err(e) => {
                println!("{}", e.user_message());
                None
            }
        }
    }

    fn print_char_count(&self) {
        let marker = if self.composer.is_over_limit() { " (too long)" } else { "" };
        println!("{}/{MAX_POST_CHARS}{marker}", self.composer.char_count());
    }

    fn print_status(&self) {
        let snapshot = self.feed.snapshot();
        let analysis = self.composer.analysis();
        println!(
            "session: {}",
            if self.session.is_authenticated() { "logged in" } else { "anonymous" }
        );
        println!("author: {}", self.composer.author());
        println!(
            "draft: {}/{MAX_POST_CHARS} chars, analysis {:?}",
            self.composer.char_count(),
            analysis.phase
        );
        if let Some(analyzed) = analysis.result {
            println!("  {}", describe_analysis(&analyzed.result));
        }
        match snapshot.cursor {
            Some(cursor) => println!(
                "feed: {} posts, page {}, more: {}",
                snapshot.posts.len(),
                cursor.page,
                cursor.has_more
            ),
            None => println!("feed: not loaded"),
        }
        if let Some(error) = snapshot.last_error {
            println!("last error: {error}");
        }
    }
}

fn print_more_hint(has_more: bool) {
    if has_more {
        println!("(more available, type `more`)");
    }
}

fn render_post(post: &Post) -> String {
    format!(
        "[{}] {} · {}\n    {}",
        post.id, post.author, post.created_at, post.content
    )
}

fn describe_analysis(result: &AnalyzeResult) -> String {
    let mut line = format!(
        "{} {} ({:.2})",
        result.sentiment.emoji,
        result.sentiment.label.as_str(),
        result.sentiment.score
    );
    for tag in &result.hashtags {
        line.push_str(" #");
        line.push_str(tag);
    }
    line
}
