/*
    spotify-profile-rs | Rust CLI to sign in to Spotify with PKCE and render your profile.
    Copyright (C) 2025  Israel Alberto Roldan Vega

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use log::debug;
use profile_core::pkce::generate_challenge;
use profile_core::storage::DEFAULT_STORAGE_FILE;
use profile_core::{
    load_dashboard, render_dashboard, resolve, AccessToken, ApiClient, ClientConfig, Dashboard,
    FileStore, FlowOutcome, HtmlRenderer, ReqwestClient, TimeRange, TopItemsQuery,
};
use std::fs;
use std::io::{self, BufRead, Write};
use std::process;
use url::Url;

#[derive(Parser)]
#[command(name = "spotify-profile")]
#[command(about = "Sign in to Spotify with PKCE and render your profile, top tracks and top artists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Loads the app once. Without a code it prints the sign-in URL; with the
    /// callback URL it redeems the code and renders the page.
    Visit {
        /// The page URL, e.g. the callback URL Spotify redirected you to
        #[arg(value_name = "URL")]
        url: Option<String>,
        #[command(flatten)]
        page: PageOptions,
    },
    /// Full sign-in: prints the URL, waits for the redirected URL on stdin, then renders
    Login {
        #[command(flatten)]
        page: PageOptions,
    },
    /// Prints the S256 code challenge of a verifier
    Challenge {
        #[arg(value_name = "VERIFIER")]
        verifier: String,
    },
}

#[derive(Args)]
struct PageOptions {
    /// Write the rendered HTML page to this file instead of stdout
    #[arg(long, short = 'o')]
    out: Option<String>,

    /// Also dump the fetched documents to a JSON file (e.g., --json=profile.json)
    #[arg(long)]
    json: Option<String>,

    /// Affinity window for top tracks and artists
    #[arg(long, value_enum)]
    time_range: Option<RangeArg>,

    /// Number of top items to request (Spotify accepts 1 to 50)
    #[arg(long)]
    limit: Option<u32>,

    /// Where the PKCE verifier is kept between the two phases
    #[arg(long, default_value = DEFAULT_STORAGE_FILE)]
    storage: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum RangeArg {
    Short,
    Medium,
    Long,
}

impl From<RangeArg> for TimeRange {
    fn from(arg: RangeArg) -> Self {
        match arg {
            RangeArg::Short => TimeRange::ShortTerm,
            RangeArg::Medium => TimeRange::MediumTerm,
            RangeArg::Long => TimeRange::LongTerm,
        }
    }
}

impl PageOptions {
    fn query(&self) -> TopItemsQuery {
        TopItemsQuery {
            time_range: self.time_range.map(TimeRange::from),
            limit: self.limit,
        }
    }
}

struct Session {
    config: ClientConfig,
    store: FileStore,
    http: ReqwestClient,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if dotenv().is_err() {
        // Silently ignore
    }

    let cli = Cli::parse();

    match &cli.command {
        Commands::Visit { url, page } => {
            handle_visit(url.as_deref(), page).await;
        }
        Commands::Login { page } => {
            handle_login(page).await;
        }
        Commands::Challenge { verifier } => {
            println!("{}", generate_challenge(verifier));
        }
    }
}

fn open_session(page: &PageOptions) -> Session {
    let config = match ClientConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            eprintln!("Set RSPOTIFY_CLIENT_ID (and optionally RSPOTIFY_REDIRECT_URI) or add them to .env");
            process::exit(1);
        }
    };
    let http = match ReqwestClient::new() {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error initializing HTTP client: {}", e);
            process::exit(1);
        }
    };
    debug!("Using verifier storage at {}", page.storage);

    Session {
        config,
        store: FileStore::new(&page.storage),
        http,
    }
}

fn parse_page_url(raw: &str) -> Url {
    match Url::parse(raw.trim()) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("[ERROR] '{}' is not a valid URL: {}", raw.trim(), e);
            process::exit(1);
        }
    }
}

async fn handle_visit(url: Option<&str>, page: &PageOptions) {
    let session = open_session(page);
    let page_url = url.map(parse_page_url);
    let mut rng = rand::thread_rng();

    match resolve(
        page_url.as_ref(),
        &session.config,
        &session.store,
        &session.http,
        &mut rng,
    )
    .await
    {
        Ok(FlowOutcome::NeedsRedirect(authorize_url)) => {
            print_redirect(&authorize_url);
            println!();
            println!("Then run: spotify-profile visit '<the URL you were redirected to>'");
        }
        Ok(FlowOutcome::Token(token)) => {
            show_dashboard(&session, token, page).await;
        }
        Err(e) => {
            eprintln!();
            eprintln!("[ERROR] Sign-in failed: {}", e);
            process::exit(1);
        }
    }
}

async fn handle_login(page: &PageOptions) {
    let session = open_session(page);
    let mut rng = rand::thread_rng();

    match resolve(None, &session.config, &session.store, &session.http, &mut rng).await {
        Ok(FlowOutcome::NeedsRedirect(authorize_url)) => print_redirect(&authorize_url),
        Ok(FlowOutcome::Token(_)) => {
            eprintln!("[ERROR] Unexpected token without a code; check the storage file");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("[ERROR] Could not start sign-in: {}", e);
            process::exit(1);
        }
    }

    println!();
    print!("Paste the URL you were redirected to: ");
    let callback = match read_line() {
        Ok(line) => parse_page_url(&line),
        Err(e) => {
            eprintln!("[ERROR] Failed to read from stdin: {}", e);
            process::exit(1);
        }
    };

    match resolve(
        Some(&callback),
        &session.config,
        &session.store,
        &session.http,
        &mut rng,
    )
    .await
    {
        Ok(FlowOutcome::Token(token)) => show_dashboard(&session, token, page).await,
        Ok(FlowOutcome::NeedsRedirect(_)) => {
            eprintln!("[ERROR] That URL has no authorization code. Run 'spotify-profile login' again.");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("[ERROR] Sign-in failed: {}", e);
            process::exit(1);
        }
    }
}

fn read_line() -> io::Result<String> {
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn print_redirect(authorize_url: &Url) {
    println!("---------------------------------------------------");
    println!("SIGN IN");
    println!("---------------------------------------------------");
    println!("Open this URL in your browser and approve access:");
    println!();
    println!("{}", authorize_url);
}

async fn show_dashboard(session: &Session, token: AccessToken, page: &PageOptions) {
    let api = ApiClient::new(&session.http, &session.config.api_base, token)
        .with_query(page.query());

    let dashboard = match load_dashboard(&api).await {
        Ok(d) => d,
        Err(e) => {
            eprintln!();
            eprintln!("[ERROR] Failed to fetch your Spotify data: {}", e);
            process::exit(1);
        }
    };

    let mut renderer = HtmlRenderer::new();
    render_dashboard(&dashboard, &mut renderer);
    let html = renderer.document();

    match page.out.as_deref() {
        Some(path) => {
            if let Err(e) = fs::write(path, &html) {
                eprintln!("[ERROR] Failed to write page to '{}': {}", path, e);
                process::exit(1);
            }
            print_summary(&dashboard);
            println!();
            println!("[SAVED] Page saved to: {}", path);
        }
        None => print!("{}", html),
    }

    if let Some(path) = page.json.as_deref() {
        match write_json(path, &dashboard) {
            Ok(()) => eprintln!("[SAVED] Raw documents saved to: {}", path),
            Err(e) => eprintln!("[ERROR] {:#}", e),
        }
    }
}

fn write_json(path: &str, dashboard: &Dashboard) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(dashboard).context("Failed to serialize documents")?;
    fs::write(path, content).with_context(|| format!("Failed to write '{}'", path))?;
    Ok(())
}

fn print_summary(dashboard: &Dashboard) {
    let profile = &dashboard.profile;
    println!();
    println!("---------------------------------------------------");
    println!(
        "Logged in as:  {}",
        profile.display_name.as_deref().unwrap_or(&profile.id)
    );
    println!("Email:         {}", profile.email.as_deref().unwrap_or("-"));
    println!("Spotify URI:   {}", profile.uri);
    println!("---------------------------------------------------");
    println!("TOP TRACKS ({})", dashboard.top_tracks.items.len());
    for (i, track) in dashboard.top_tracks.items.iter().enumerate() {
        println!("{}. {}", i + 1, track);
    }
    println!("---------------------------------------------------");
    println!("TOP ARTISTS ({})", dashboard.top_artists.items.len());
    for (i, artist) in dashboard.top_artists.items.iter().enumerate() {
        println!("{}. {}", i + 1, artist);
    }
}
