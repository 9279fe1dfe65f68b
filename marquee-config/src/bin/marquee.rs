use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use marquee_config::{MarqueeConfig, StorageBackend, build_stores, telemetry};
use marquee_core::{Stores, dedupe_candidates};
use marquee_model::{
    CandidateMovie, LibraryEntry, MovieKey, NewUserMovie, UserId,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "marquee", about = "Marquee local library and session client")]
struct Cli {
    /// Config file to load instead of the usual lookup
    #[arg(long, env = "MARQUEE_CONFIG_PATH")]
    config: Option<PathBuf>,
    /// Keep all state in memory for this run
    #[arg(long)]
    ephemeral: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and manage the current identity
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    Favorites {
        #[command(subcommand)]
        action: LibraryAction,
    },
    Downloads {
        #[command(subcommand)]
        action: LibraryAction,
    },
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Fan-submitted movies
    Uploads {
        #[command(subcommand)]
        action: UploadAction,
    },
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum SessionAction {
    Login {
        email: String,
        #[arg(long)]
        password: Option<String>,
        /// Store the identity without contacting the account service
        #[arg(long)]
        offline: bool,
    },
    Signup {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    Logout,
    Whoami,
}

#[derive(Subcommand)]
enum LibraryAction {
    List,
    Add {
        /// Catalog id, or an upload key such as `fan-<id>`
        id: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long)]
        poster_path: Option<String>,
    },
    Remove {
        id: String,
    },
    Clear,
}

#[derive(Subcommand)]
enum HistoryAction {
    List,
    Add {
        id: String,
        #[arg(long, default_value = "")]
        title: String,
    },
    Clear,
}

#[derive(Subcommand)]
enum UploadAction {
    /// List your uploads, or the shared feed with `--all`
    List {
        #[arg(long)]
        all: bool,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        poster_uri: Option<String>,
        #[arg(long)]
        trailer_url: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long = "actor")]
        actors: Vec<String>,
    },
    Remove {
        id: String,
    },
    Search {
        #[arg(default_value = "")]
        term: String,
    },
    Clear,
}

#[derive(Subcommand)]
enum NotificationAction {
    List,
    Unread,
    ReadAll,
    Clear,
    /// Sync from JSON files holding arrays of catalog results
    Sync {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum WatchlistAction {
    List,
    Add { id: u64 },
    Remove { id: u64 },
    Toggle { id: u64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init("warn,marquee_core=info");

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = MarqueeConfig::load_from_file(path)?;
            config.apply_overrides(|name| std::env::var(name).ok());
            config.validate()?;
            config
        }
        None => MarqueeConfig::load_from_env()?.0,
    };
    if cli.ephemeral {
        config.storage.backend = StorageBackend::Memory;
    }

    if let Command::Config = cli.command {
        return print_json(&config);
    }

    let stores = build_stores(&config)?;
    match cli.command {
        Command::Session { action } => session(&stores, action).await,
        Command::Favorites { action } => favorites(&stores, action).await,
        Command::Downloads { action } => downloads(&stores, action).await,
        Command::History { action } => history(&stores, action).await,
        Command::Uploads { action } => uploads(&stores, action).await,
        Command::Notifications { action } => {
            notifications(&stores, action).await
        }
        Command::Watchlist { action } => watchlist(&stores, action).await,
        Command::Config => Ok(()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn movie_key(raw: &str) -> MovieKey {
    match raw.parse::<u64>() {
        Ok(id) => MovieKey::Catalog(id),
        Err(_) => MovieKey::Upload(raw.to_string()),
    }
}

async fn signed_in(stores: &Stores) -> Result<UserId> {
    stores
        .session
        .current_user_id()
        .await
        .context("not signed in; run `marquee session login` first")
}

fn changed<T>(result: Option<T>) -> Result<T> {
    result.context("storage unavailable, nothing was changed")
}

async fn session(stores: &Stores, action: SessionAction) -> Result<()> {
    match action {
        SessionAction::Login {
            email,
            password,
            offline,
        } => {
            let identity = if offline {
                stores.session.login_offline(&email).await
            } else {
                stores.session.login(&email, password.as_deref()).await
            };
            match identity {
                Ok(identity) => print_json(&identity),
                Err(err) => bail!("{} ({})", err.code(), err),
            }
        }
        SessionAction::Signup {
            email,
            password,
            name,
        } => match stores.session.signup(&name, &email, &password).await {
            Ok(identity) => print_json(&identity),
            Err(err) => bail!("{} ({})", err.code(), err),
        },
        SessionAction::Logout => {
            stores.session.logout().await?;
            Ok(())
        }
        SessionAction::Whoami => print_json(&stores.session.get_user().await),
    }
}

async fn favorites(stores: &Stores, action: LibraryAction) -> Result<()> {
    let user = signed_in(stores).await?;
    let library = &stores.library;
    match action {
        LibraryAction::List => print_json(&library.get_favorites(&user).await),
        LibraryAction::Add {
            id,
            title,
            poster_path,
        } => {
            let mut entry = LibraryEntry::new(movie_key(&id), title);
            entry.poster_path = poster_path;
            print_json(&changed(library.add_favorite(&user, entry).await)?)
        }
        LibraryAction::Remove { id } => {
            let key = movie_key(&id);
            print_json(&changed(library.remove_favorite(&user, &key).await)?)
        }
        LibraryAction::Clear => {
            library.clear_favorites(&user).await;
            Ok(())
        }
    }
}

async fn downloads(stores: &Stores, action: LibraryAction) -> Result<()> {
    let user = signed_in(stores).await?;
    let library = &stores.library;
    match action {
        LibraryAction::List => print_json(&library.get_downloads(&user).await),
        LibraryAction::Add {
            id,
            title,
            poster_path,
        } => {
            let mut entry = LibraryEntry::new(movie_key(&id), title);
            entry.poster_path = poster_path;
            print_json(&changed(library.add_download(&user, entry).await)?)
        }
        LibraryAction::Remove { id } => {
            let key = movie_key(&id);
            print_json(&changed(library.remove_download(&user, &key).await)?)
        }
        LibraryAction::Clear => {
            library.clear_downloads(&user).await;
            Ok(())
        }
    }
}

async fn history(stores: &Stores, action: HistoryAction) -> Result<()> {
    let user = signed_in(stores).await?;
    let library = &stores.library;
    match action {
        HistoryAction::List => print_json(&library.get_history(&user).await),
        HistoryAction::Add { id, title } => {
            let entry = LibraryEntry::new(movie_key(&id), title);
            print_json(&changed(library.add_history(&user, entry).await)?)
        }
        HistoryAction::Clear => {
            library.clear_history(&user).await;
            Ok(())
        }
    }
}

async fn uploads(stores: &Stores, action: UploadAction) -> Result<()> {
    let movies = &stores.user_movies;
    match action {
        UploadAction::List { all: true } => {
            print_json(&movies.list_all_user_movies().await)
        }
        UploadAction::List { all: false } => {
            let user = signed_in(stores).await?;
            print_json(&movies.list_user_movies(&user).await)
        }
        UploadAction::Add {
            title,
            description,
            poster_uri,
            trailer_url,
            genre,
            year,
            actors,
        } => {
            let user = signed_in(stores).await?;
            let input = NewUserMovie {
                title,
                description,
                poster_uri,
                trailer_url,
                genre,
                year,
                actors,
            };
            print_json(&changed(movies.add_user_movie(&user, input).await)?)
        }
        UploadAction::Remove { id } => {
            let user = signed_in(stores).await?;
            print_json(&changed(movies.remove_user_movie(&user, &id).await)?)
        }
        UploadAction::Search { term } => {
            print_json(&movies.search_user_movies(&term).await)
        }
        UploadAction::Clear => {
            let user = signed_in(stores).await?;
            movies.clear_user_movies(&user).await;
            Ok(())
        }
    }
}

async fn notifications(
    stores: &Stores,
    action: NotificationAction,
) -> Result<()> {
    let center = &stores.notifications;
    match action {
        NotificationAction::List => {
            print_json(&center.get_notifications().await)
        }
        NotificationAction::Unread => {
            println!("{}", center.get_unread_count().await);
            Ok(())
        }
        NotificationAction::ReadAll => {
            print_json(&center.mark_all_read().await)
        }
        NotificationAction::Clear => {
            center.clear_notifications().await;
            Ok(())
        }
        NotificationAction::Sync { files } => {
            let mut pages = Vec::with_capacity(files.len());
            for path in &files {
                let shown = path.display();
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {shown}"))?;
                let page: Vec<CandidateMovie> = serde_json::from_str(&raw)
                    .with_context(|| {
                        format!("invalid candidate list {shown}")
                    })?;
                pages.push(page);
            }
            let added = center
                .sync_new_movie_notifications(&dedupe_candidates(pages))
                .await;
            println!("{added}");
            Ok(())
        }
    }
}

async fn watchlist(stores: &Stores, action: WatchlistAction) -> Result<()> {
    let list = &stores.watchlist;
    match action {
        WatchlistAction::List => print_json(&list.load().await),
        WatchlistAction::Add { id } => {
            print_json(&changed(list.add(id).await)?)
        }
        WatchlistAction::Remove { id } => {
            print_json(&changed(list.remove(id).await)?)
        }
        WatchlistAction::Toggle { id } => {
            print_json(&changed(list.toggle(id).await)?)
        }
    }
}
