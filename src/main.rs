use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use flickr::error::FeedError;
use flickr::fetch::FetchOptions;
use flickr::model::{FetchStatus, MatchMode, Photo, PhotoData};
use flickr::query::{self, FeedOptions, DEFAULT_LANGUAGE, FEED_URL};
use flickr::saved::SavedQuery;
use flickr::table;

#[derive(Parser)]
#[command(
    name = "flickr",
    about = "Search Flickr's public photo feed from the terminal",
    version,
    after_help = "\
Examples:
  flickr search cats
  flickr search cats kittens --any
  flickr search sunset --json --pretty
  flickr search harbour --detail 1
  flickr search harbour --open 3
  flickr search
  flickr saved --clear"
)]
struct Cli {
    #[arg(
        short, long,
        global = true,
        action = clap::ArgAction::Count,
        help = "More log output (-v info, -vv debug; RUST_LOG overrides)"
    )]
    verbose: u8,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "File holding the saved query (defaults to the user config directory)"
    )]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(
        about = "Search the public feed by tag",
        long_about = "Search Flickr's public photo feed for photos carrying the given tags.\n\
            Without tags, the last saved search is repeated.",
        after_help = "\
Examples:
  All tags:     flickr search cats kittens
  Any tag:      flickr search cats dogs --any
  JSON output:  flickr search sunset --json --pretty
  Detail view:  flickr search harbour --detail 1
  Open photo:   flickr search harbour --open 3
  Feed URL:     flickr search cats --url
  Last search:  flickr search"
    )]
    Search(SearchArgs),

    #[command(about = "Show or clear the saved search")]
    Saved(SavedArgs),

    #[command(about = "Start MCP server (stdio transport)")]
    Mcp,
}

#[derive(clap::Args)]
struct SearchArgs {
    #[arg(
        value_name = "TAG",
        help = "Tags to search for (omit to repeat the saved search)"
    )]
    tags: Vec<String>,

    #[arg(long, help = "Match photos carrying any of the tags instead of all of them")]
    any: bool,

    #[arg(long, default_value = DEFAULT_LANGUAGE, value_name = "CODE", help = "Feed language (e.g. en-us, de-de, fr-fr)")]
    lang: String,

    #[arg(long, default_value = FEED_URL, value_name = "URL", help = "Feed endpoint")]
    base_url: String,

    #[arg(long, value_name = "N", help = "Show only the first N photos")]
    top: Option<usize>,

    #[arg(long, help = "One-line-per-photo output")]
    compact: bool,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,

    #[arg(long, value_name = "N", help = "Show the detail view of the N-th photo")]
    detail: Option<usize>,

    #[arg(long, value_name = "N", help = "Open the N-th photo's large image in the browser")]
    open: Option<usize>,

    #[arg(long, help = "Print the feed URL only")]
    url: bool,

    #[arg(long, help = "Fetch on a blocking worker thread instead of a background task")]
    blocking: bool,

    #[arg(long, help = "Do not remember these tags as the saved search")]
    no_save: bool,

    #[arg(long, value_name = "URL", help = "HTTP or SOCKS5 proxy")]
    proxy: Option<String>,

    #[arg(long, default_value = "30", value_name = "SECS", help = "Request timeout")]
    timeout: u64,
}

#[derive(clap::Args)]
struct SavedArgs {
    #[arg(long, help = "Forget the saved search")]
    clear: bool,
}

fn is_json(args: &SearchArgs) -> bool {
    args.json || args.pretty
}

fn error_code(err: &FeedError) -> i32 {
    match err {
        FeedError::Validation(_) => 2,
        FeedError::Timeout
        | FeedError::ConnectionFailed(_)
        | FeedError::DnsResolution(_)
        | FeedError::TlsError(_)
        | FeedError::ProxyError(_)
        | FeedError::Read(_) => 3,
        FeedError::HttpStatus(_) => 5,
        FeedError::Json(_) | FeedError::MissingItems | FeedError::InvalidItem { .. } => 6,
        FeedError::Storage(_) => 7,
        FeedError::NotConfigured
        | FeedError::InvalidUrl(_)
        | FeedError::WorkerGone
        | FeedError::Runtime(_) => 1,
    }
}

fn error_kind(err: &FeedError) -> &'static str {
    match err {
        FeedError::NotConfigured => "not_configured",
        FeedError::InvalidUrl(_) => "invalid_url",
        FeedError::Timeout => "timeout",
        FeedError::ConnectionFailed(_) => "connection_failed",
        FeedError::DnsResolution(_) => "dns_error",
        FeedError::TlsError(_) => "tls_error",
        FeedError::ProxyError(_) => "proxy_error",
        FeedError::HttpStatus(_) => "http_error",
        FeedError::Read(_) => "read_error",
        FeedError::Json(_) | FeedError::MissingItems | FeedError::InvalidItem { .. } => {
            "parse_error"
        }
        FeedError::Validation(_) => "validation_error",
        FeedError::Storage(_) => "storage_error",
        FeedError::WorkerGone | FeedError::Runtime(_) => "internal_error",
    }
}

fn die(err: &FeedError, status: FetchStatus, json_mode: bool) -> ! {
    if json_mode {
        let json = serde_json::json!({
            "error": {
                "kind": error_kind(err),
                "status": status,
                "message": err.to_string(),
            }
        });
        println!("{json}");
    } else {
        eprintln!("error: {err}");
    }
    process::exit(error_code(err));
}

fn invalid(msg: impl Into<String>, json_mode: bool) -> ! {
    die(
        &FeedError::Validation(msg.into()),
        FetchStatus::Idle,
        json_mode,
    )
}

fn saved_store(state_file: Option<PathBuf>) -> Result<SavedQuery, FeedError> {
    match state_file {
        Some(path) => Ok(SavedQuery::at(path)),
        None => SavedQuery::default_location(),
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool, json_mode: bool) -> String {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match output {
        Ok(s) => s,
        Err(e) => die(&FeedError::Json(e.to_string()), FetchStatus::Ok, json_mode),
    }
}

fn pick<'a>(photos: &'a [Photo], n: usize, flag: &str, json_mode: bool) -> &'a Photo {
    if n == 0 {
        invalid(format!("{flag} is 1-based, got 0"), json_mode);
    }
    match photos.get(n - 1) {
        Some(photo) => photo,
        None => invalid(
            format!(
                "{flag} {n} is out of range — the feed returned {} photos",
                photos.len()
            ),
            json_mode,
        ),
    }
}

fn print_result(data: &PhotoData, args: &SearchArgs) {
    if is_json(args) {
        println!("{}", to_json(data, args.pretty, true));
        return;
    }
    if data.photos.is_empty() {
        println!("No photos found.");
        return;
    }
    if args.compact {
        for (i, photo) in data.photos.iter().enumerate() {
            println!("{}", table::compact_line(i + 1, photo));
        }
    } else {
        println!("{}", table::render(&data.photos));
    }
}

async fn fetch(tags: String, options: FeedOptions, args: &SearchArgs) -> PhotoData {
    let json_mode = is_json(args);
    let fetch_options = FetchOptions {
        proxy: args.proxy.clone(),
        timeout: args.timeout,
    };
    let client = match flickr::client(options, &fetch_options) {
        Ok(c) => c,
        Err(e) => die(&e, FetchStatus::NotConfigured, json_mode),
    };

    if !args.blocking {
        return client.execute(tags).wait().await;
    }

    let worker = tokio::task::spawn_blocking(move || {
        let mut delivered = None;
        client.run_in_same_thread(&tags, |data| delivered = Some(data));
        delivered
    });
    match worker.await {
        Ok(Some(data)) => data,
        _ => PhotoData::failed(FetchStatus::FailedOrEmpty, FeedError::WorkerGone),
    }
}

async fn run_search(args: SearchArgs, state_file: Option<PathBuf>) {
    let json_mode = is_json(&args);

    let mut tags = query::join_tags(&args.tags);
    let from_saved = tags.is_empty();
    let store = saved_store(state_file);

    if from_saved {
        let saved = match store.as_ref() {
            Ok(store) => store.load(),
            Err(e) => Err(e.clone()),
        };
        tags = match saved {
            Ok(Some(q)) => q,
            Ok(None) => invalid(
                "no tags given and no saved search — try: flickr search cats",
                json_mode,
            ),
            Err(e) => die(&e, FetchStatus::Idle, json_mode),
        };
        info!(tags = %tags, "repeating saved search");
    }

    let options = FeedOptions {
        base_url: args.base_url.clone(),
        language: args.lang.clone(),
        match_mode: MatchMode::from_match_all(!args.any),
    };

    if args.url {
        match flickr::feed_url(&tags, &options) {
            Ok(url) => println!("{url}"),
            Err(e) => die(&e, FetchStatus::NotConfigured, json_mode),
        }
        return;
    }

    let mut data = fetch(tags.clone(), options, &args).await;
    if let Some(ref err) = data.error {
        die(err, data.status, json_mode);
    }

    if !from_saved && !args.no_save {
        match store.and_then(|store| store.save(&tags)) {
            Ok(_) => {}
            Err(e) => warn!(error = %e, "could not remember search"),
        }
    }

    if let Some(n) = args.top {
        data.photos.truncate(n);
    }

    if let Some(n) = args.open {
        let photo = pick(&data.photos, n, "--open", json_mode);
        if let Err(e) = open::that(&photo.link) {
            invalid(format!("failed to open browser: {e}"), json_mode);
        }
        if !json_mode {
            println!("Opening: {}", photo.link);
        }
    }

    if let Some(n) = args.detail {
        let photo = pick(&data.photos, n, "--detail", json_mode);
        if json_mode {
            println!("{}", to_json(photo, args.pretty, true));
        } else {
            println!("{}", table::render_detail(photo));
        }
        return;
    }

    if args.open.is_none() {
        print_result(&data, &args);
    }
}

fn run_saved(args: SavedArgs, state_file: Option<PathBuf>) {
    let store = match saved_store(state_file) {
        Ok(s) => s,
        Err(e) => die(&e, FetchStatus::Idle, false),
    };

    if args.clear {
        if let Err(e) = store.clear() {
            die(&e, FetchStatus::Idle, false);
        }
        println!("Saved search cleared.");
        return;
    }

    match store.load() {
        Ok(Some(q)) => println!("{q}"),
        Ok(None) => println!("No saved search."),
        Err(e) => die(&e, FetchStatus::Idle, false),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    flickr::logging::init(cli.verbose);

    match cli.command {
        Commands::Mcp => flickr::mcp::run().await,
        Commands::Saved(args) => run_saved(args, cli.state_file),
        Commands::Search(args) => run_search(args, cli.state_file).await,
    }
}
