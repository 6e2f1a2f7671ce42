use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use melodia_catalog_server::cache::{CatalogCache, CatalogResult};
use melodia_catalog_server::catalog::{Artist, PlaybackSource, PlayedSong, Song, User};
use melodia_catalog_server::catalog_store::{
    ArtistId, ArtistUpdate, NewArtist, NewSong, NewUser, SongId, SongUpdate, SqliteCatalogDb,
    UserId, UserRole, UserUpdate,
};
use melodia_catalog_server::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_HISTORY_CAPACITY, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SEARCH_LIMIT,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli_style;
use cli_style::{get_styles, TableBuilder};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    UserRole::from_db_str(&s.to_lowercase())
        .ok_or_else(|| format!("Invalid role '{}'. Valid roles are: user, admin", s))
}

#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Path to the SQLite catalog database file, created if missing.
    #[clap(value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the CLI ones.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Number of plays kept per user in the history.
    #[clap(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    pub history_capacity: usize,

    /// Number of songs a user can queue ahead of the playlist.
    #[clap(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Default number of search results.
    #[clap(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub search_limit: usize,
}

#[derive(Parser)]
#[command(styles=get_styles(),name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Shows a song.
    Song { song_id: SongId },

    /// Lists every song.
    Songs,

    /// Lists every song ordered by title.
    SongsSorted,

    /// Lists the songs of an artist.
    SongsByArtist { artist_id: ArtistId },

    /// Lists the songs of a category.
    SongsByCategory { category: String },

    /// Lists the songs whose title falls between two titles, inclusive.
    SongsInRange { start: String, end: String },

    /// Lists the songs whose title contains the given text.
    SongsContaining { text: String },

    /// Lists the most played songs.
    Popular { limit: Option<usize> },

    /// Adds a song to an artist.
    AddSong {
        title: String,
        song_url: String,
        artist_id: ArtistId,
        #[clap(long)]
        image_url: Option<String>,
    },

    /// Changes the given fields of a song.
    UpdateSong {
        song_id: SongId,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        song_url: Option<String>,
        #[clap(long)]
        image_url: Option<String>,
        #[clap(long)]
        artist_id: Option<ArtistId>,
    },

    /// Deletes a song from the catalog, libraries and histories.
    DeleteSong { song_id: SongId },

    /// Shows an artist by id or slug.
    Artist { id_or_slug: String },

    /// Shows an artist together with its songs.
    ArtistSongs { artist_id: ArtistId },

    /// Lists every artist.
    Artists,

    /// Lists every artist ordered by name.
    ArtistsSorted,

    /// Lists the artists of a category.
    ArtistsByCategory { category: String },

    /// Finds an artist by exact name, ignoring case.
    FindArtist { name: String },

    /// Lists the artists related to an artist.
    Related {
        artist_id: ArtistId,
        limit: Option<usize>,
    },

    /// Adds an artist.
    AddArtist {
        name: String,
        #[clap(long)]
        category: Option<String>,
        #[clap(long)]
        image_url: Option<String>,
    },

    /// Changes the given fields of an artist.
    UpdateArtist {
        artist_id: ArtistId,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        category: Option<String>,
        #[clap(long)]
        image_url: Option<String>,
    },

    /// Deletes an artist and all of its songs.
    DeleteArtist { artist_id: ArtistId },

    /// Lists every category.
    Categories,

    /// Searches songs and artists by prefix.
    Search {
        query: String,
        #[clap(long)]
        limit: Option<usize>,
    },

    /// Shows autocomplete suggestions for a query.
    Suggest {
        query: String,
        #[clap(long)]
        limit: Option<usize>,
    },

    /// Lists every user.
    Users,

    /// Shows a user.
    User { user_id: UserId },

    /// Adds a user.
    AddUser {
        name: String,
        email: String,
        #[clap(long)]
        admin: bool,
    },

    /// Changes the given fields of a user.
    UpdateUser {
        user_id: UserId,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        email: Option<String>,
        #[clap(long, value_parser = parse_role)]
        role: Option<UserRole>,
    },

    /// Deletes a user with their library and history.
    DeleteUser { user_id: UserId },

    /// Lists the library of a user.
    Library { user_id: UserId },

    /// Adds a song to the library of a user.
    LibraryAdd { user_id: UserId, song_id: SongId },

    /// Removes a song from the library of a user.
    LibraryRemove { user_id: UserId, song_id: SongId },

    /// Tells whether a song is in the library of a user.
    InLibrary { user_id: UserId, song_id: SongId },

    /// Records that a user played a song.
    Play { user_id: UserId, song_id: SongId },

    /// Shows the recent plays of a user.
    History {
        user_id: UserId,
        #[clap(long)]
        limit: Option<usize>,
    },

    /// Clears the history of a user.
    ClearHistory { user_id: UserId },

    /// Starts playing the songs of an artist.
    PlayArtist {
        user_id: UserId,
        artist_id: ArtistId,
        #[clap(long)]
        start: Option<SongId>,
    },

    /// Starts playing the songs of a category.
    PlayCategory {
        user_id: UserId,
        category: String,
        #[clap(long)]
        start: Option<SongId>,
    },

    /// Starts playing the library of a user.
    PlayLibrary {
        user_id: UserId,
        #[clap(long)]
        start: Option<SongId>,
    },

    /// Skips to the next song.
    Next { user_id: UserId },

    /// Goes back to the previous song.
    Previous { user_id: UserId },

    /// Queues a song to play next.
    Queue { user_id: UserId, song_id: SongId },

    /// Lists the queued songs.
    UpNext { user_id: UserId },

    /// Shows the song playing for a user.
    NowPlaying { user_id: UserId },

    /// Stops the playback session of a user.
    Stop { user_id: UserId },

    /// Shows catalog statistics.
    Stats,

    /// Checks that every index agrees with the others.
    Check,

    /// Shows the path of the current catalog db.
    Where,

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

const PROMPT: &str = ">> ";

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => cli_style::print_error(&format!("Could not render result: {}", err)),
    }
}

fn print_songs(songs: &[Song]) {
    let mut table = TableBuilder::new(&["id", "title", "artist", "category", "plays"]);
    for song in songs {
        table.add_row(vec![
            song.id.to_string(),
            song.title.clone(),
            song.artist_name.clone().unwrap_or_default(),
            song.category.clone().unwrap_or_default(),
            song.play_count.to_string(),
        ]);
    }
    table.print();
}

fn print_played(played: &[PlayedSong]) {
    let mut table = TableBuilder::new(&["played at", "id", "title", "artist"]);
    for entry in played {
        table.add_row(vec![
            entry.played_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.song.id.to_string(),
            entry.song.title.clone(),
            entry.song.artist_name.clone().unwrap_or_default(),
        ]);
    }
    table.print();
}

fn print_artists(artists: &[Artist]) {
    let mut table = TableBuilder::new(&["id", "name", "slug", "category"]);
    for artist in artists {
        table.add_row(vec![
            artist.id.to_string(),
            artist.name.clone(),
            artist.slug.clone(),
            artist.category.clone().unwrap_or_default(),
        ]);
    }
    table.print();
}

fn print_users(users: &[User]) {
    let mut table = TableBuilder::new(&["id", "name", "email", "role"]);
    for user in users {
        let role = if user.is_admin() { "admin" } else { "user" };
        table.add_row(vec![
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            role.to_string(),
        ]);
    }
    table.print();
}

fn print_now_playing(song: Option<Song>) {
    match song {
        Some(song) => cli_style::print_success(&format!(
            "Now playing {} - {}",
            song.title,
            song.artist_name.unwrap_or_default()
        )),
        None => cli_style::print_empty_list("Nothing to play"),
    }
}

fn print_problems(problems: &[String]) {
    if problems.is_empty() {
        cli_style::print_success("All indexes are consistent");
        return;
    }
    for problem in problems {
        cli_style::print_warning(problem);
    }
}

fn run_command(
    command: InnerCommand,
    cache: &CatalogCache,
    app_config: &AppConfig,
) -> CatalogResult<CommandExecutionResult> {
    let settings = cache.settings();
    match command {
        InnerCommand::Song { song_id } => print_json(&cache.get_song(song_id)?),
        InnerCommand::Songs => print_songs(&cache.get_all_songs()?),
        InnerCommand::SongsSorted => print_songs(&cache.get_songs_sorted()?),
        InnerCommand::SongsByArtist { artist_id } => {
            print_songs(&cache.get_songs_by_artist(artist_id)?)
        }
        InnerCommand::SongsByCategory { category } => {
            print_songs(&cache.get_songs_by_category(&category)?)
        }
        InnerCommand::SongsInRange { start, end } => {
            print_songs(&cache.get_songs_in_title_range(&start, &end)?)
        }
        InnerCommand::SongsContaining { text } => {
            print_songs(&cache.search_songs_containing(&text)?)
        }
        InnerCommand::Popular { limit } => print_songs(
            &cache.get_popular(limit.unwrap_or(settings.default_popular_limit))?,
        ),
        InnerCommand::AddSong {
            title,
            song_url,
            artist_id,
            image_url,
        } => {
            let song = cache.add_song(NewSong {
                title,
                image_url,
                song_url,
                artist_id: Some(artist_id),
            })?;
            cli_style::print_success(&format!("Added song {}", song.id));
            print_json(&song);
        }
        InnerCommand::UpdateSong {
            song_id,
            title,
            song_url,
            image_url,
            artist_id,
        } => {
            let song = cache.update_song(
                song_id,
                SongUpdate {
                    title,
                    image_url,
                    song_url,
                    artist_id,
                },
            )?;
            print_json(&song);
        }
        InnerCommand::DeleteSong { song_id } => {
            let song = cache.delete_song(song_id)?;
            cli_style::print_success(&format!("Deleted song {} ({})", song.id, song.title));
        }
        InnerCommand::Artist { id_or_slug } => {
            print_json(&cache.get_artist_by_id_or_slug(&id_or_slug)?)
        }
        InnerCommand::ArtistSongs { artist_id } => {
            let resolved = cache.get_resolved_artist(artist_id)?;
            cli_style::print_section_header(&resolved.artist.name);
            cli_style::print_key_value("slug", &resolved.artist.slug);
            cli_style::print_key_value(
                "category",
                resolved.artist.category.as_deref().unwrap_or("-"),
            );
            cli_style::print_section_footer();
            print_songs(&resolved.songs);
        }
        InnerCommand::Artists => print_artists(&cache.get_all_artists()?),
        InnerCommand::ArtistsSorted => print_artists(&cache.get_artists_sorted()?),
        InnerCommand::ArtistsByCategory { category } => {
            print_artists(&cache.get_artists_by_category(&category)?)
        }
        InnerCommand::FindArtist { name } => print_json(&cache.find_artist_by_name(&name)?),
        InnerCommand::Related { artist_id, limit } => print_artists(&cache.get_related_artists(
            artist_id,
            limit.unwrap_or(settings.default_related_limit),
        )?),
        InnerCommand::AddArtist {
            name,
            category,
            image_url,
        } => {
            let artist = cache.add_artist(NewArtist {
                name,
                category,
                image_url,
            })?;
            cli_style::print_success(&format!("Added artist {}", artist.id));
            print_json(&artist);
        }
        InnerCommand::UpdateArtist {
            artist_id,
            name,
            category,
            image_url,
        } => {
            let artist = cache.update_artist(
                artist_id,
                ArtistUpdate {
                    name,
                    category,
                    image_url,
                },
            )?;
            print_json(&artist);
        }
        InnerCommand::DeleteArtist { artist_id } => {
            let artist = cache.delete_artist(artist_id)?;
            cli_style::print_success(&format!("Deleted artist {} ({})", artist.id, artist.name));
        }
        InnerCommand::Categories => {
            let categories = cache.get_all_categories()?;
            if categories.is_empty() {
                cli_style::print_empty_list("No categories");
            }
            for category in categories {
                println!("  {}", category);
            }
        }
        InnerCommand::Search { query, limit } => {
            let results = cache.search(&query, limit.unwrap_or(settings.default_search_limit))?;
            cli_style::print_section_header("Songs");
            print_songs(&results.songs);
            cli_style::print_section_header("Artists");
            print_artists(&results.artists);
        }
        InnerCommand::Suggest { query, limit } => {
            print_json(&cache.suggest(&query, limit.unwrap_or(settings.default_search_limit))?)
        }
        InnerCommand::Users => print_users(&cache.get_all_users()?),
        InnerCommand::User { user_id } => print_json(&cache.get_user(user_id)?),
        InnerCommand::AddUser { name, email, admin } => {
            let role = if admin { UserRole::Admin } else { UserRole::User };
            let user = cache.add_user(NewUser { name, email, role })?;
            cli_style::print_success(&format!("Added user {}", user.id));
        }
        InnerCommand::UpdateUser {
            user_id,
            name,
            email,
            role,
        } => print_json(&cache.update_user(user_id, UserUpdate { name, email, role })?),
        InnerCommand::DeleteUser { user_id } => {
            let user = cache.delete_user(user_id)?;
            cli_style::print_success(&format!("Deleted user {} ({})", user.id, user.name));
        }
        InnerCommand::Library { user_id } => print_songs(&cache.get_library(user_id)?),
        InnerCommand::LibraryAdd { user_id, song_id } => {
            cache.add_to_library(user_id, song_id)?;
            cli_style::print_success("Added to library");
        }
        InnerCommand::LibraryRemove { user_id, song_id } => {
            cache.remove_from_library(user_id, song_id)?;
            cli_style::print_success("Removed from library");
        }
        InnerCommand::InLibrary { user_id, song_id } => {
            println!("{}", cache.is_in_library(user_id, song_id)?)
        }
        InnerCommand::Play { user_id, song_id } => {
            let played = cache.record_play(user_id, song_id)?;
            cli_style::print_success(&format!(
                "{} played {} times",
                played.song.title, played.song.play_count
            ));
        }
        InnerCommand::History { user_id, limit } => print_played(
            &cache.get_history(user_id, limit.unwrap_or(settings.history_capacity))?,
        ),
        InnerCommand::ClearHistory { user_id } => {
            let cleared = cache.clear_history(user_id)?;
            cli_style::print_success(&format!("Cleared {} history entries", cleared));
        }
        InnerCommand::PlayArtist {
            user_id,
            artist_id,
            start,
        } => print_now_playing(cache.start_playback(
            user_id,
            PlaybackSource::Artist(artist_id),
            start,
        )?),
        InnerCommand::PlayCategory {
            user_id,
            category,
            start,
        } => print_now_playing(cache.start_playback(
            user_id,
            PlaybackSource::Category(category),
            start,
        )?),
        InnerCommand::PlayLibrary { user_id, start } => print_now_playing(cache.start_playback(
            user_id,
            PlaybackSource::Library(user_id),
            start,
        )?),
        InnerCommand::Next { user_id } => print_now_playing(cache.next_track(user_id)?),
        InnerCommand::Previous { user_id } => print_now_playing(cache.previous_track(user_id)?),
        InnerCommand::Queue { user_id, song_id } => {
            if let Some(evicted) = cache.enqueue(user_id, song_id)? {
                cli_style::print_warning(&format!("Queue full, dropped song {}", evicted));
            }
            cli_style::print_success(&format!("Queued song {}", song_id));
        }
        InnerCommand::UpNext { user_id } => print_songs(&cache.get_up_next(user_id)?),
        InnerCommand::NowPlaying { user_id } => print_now_playing(cache.now_playing(user_id)?),
        InnerCommand::Stop { user_id } => {
            if cache.stop_playback(user_id)? {
                cli_style::print_success("Playback stopped");
            } else {
                cli_style::print_empty_list("Nothing was playing");
            }
        }
        InnerCommand::Stats => {
            let stats = cache.stats()?;
            cli_style::print_section_header("Catalog");
            cli_style::print_key_value("songs", &stats.songs.to_string());
            cli_style::print_key_value("artists", &stats.artists.to_string());
            cli_style::print_key_value("users", &stats.users.to_string());
            cli_style::print_key_value("categories", &stats.categories.to_string());
            cli_style::print_key_value("library entries", &stats.library_entries.to_string());
            cli_style::print_key_value("history entries", &stats.history_entries.to_string());
            cli_style::print_section_footer();
        }
        InnerCommand::Check => print_problems(&cache.check_integrity()?),
        InnerCommand::Where => println!("{}", app_config.db_path.display()),
        InnerCommand::Exit => return Ok(CommandExecutionResult::Exit),
    }
    Ok(CommandExecutionResult::Ok)
}

fn execute_command(
    line: String,
    cache: &CatalogCache,
    app_config: &AppConfig,
) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    match cli {
        Ok(cli) => {
            println!("{} {}", PROMPT, &line);
            match run_command(cli.command, cache, app_config) {
                Ok(result) => result,
                Err(err) => CommandExecutionResult::Error(err.to_string()),
            }
        }
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
            CommandExecutionResult::Ok
        }
    }
}

#[derive(rustyline_derive::Hinter)]
struct CommandHelper {
    commands_names: Vec<String>,
}

impl CommandHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        CommandHelper { commands_names }
    }
}

impl Completer for CommandHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .cloned()
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for CommandHelper {}
impl Validator for CommandHelper {}
impl Helper for CommandHelper {}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_path: cli_args.db_path.clone(),
        history_capacity: cli_args.history_capacity,
        queue_capacity: cli_args.queue_capacity,
        search_limit: cli_args.search_limit,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening catalog db at {:?}", app_config.db_path);
    let db = SqliteCatalogDb::open(&app_config.db_path)?;
    let cache = CatalogCache::new(Arc::new(db), app_config.cache_settings());
    cache
        .initialize()
        .context("Failed to load the catalog, refusing to start")?;

    #[cfg(not(feature = "no_checks"))]
    print_problems(&cache.check_integrity()?);

    InnerCli::command().print_long_help()?;

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<CommandHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(CommandHelper::new()));

    loop {
        let readline = rl.readline(PROMPT);
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, &cache, &app_config) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => {
                        break;
                    }
                    CommandExecutionResult::Error(err) => {
                        cli_style::print_error(&err);
                        continue;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }
    cli_style::print_goodbye();
    Ok(())
}
