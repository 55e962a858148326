//! # File Dashboard CLI (`fdash`)
//!
//! Terminal front end for a remote file-indexing service. Every command
//! runs through the same controllers and session state a graphical front
//! end would use.
//!
//! ## Usage
//!
//! ```bash
//! fdash --config ./config/fdash.toml <command>
//! fdash --base-url http://localhost:8080 <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fdash status` | Show the service status snapshot |
//! | `fdash files` | List indexed files |
//! | `fdash uploaded` | List uploaded files |
//! | `fdash search "<query>"` | Search by filename |
//! | `fdash upload <paths...>` | Upload one or more files |
//! | `fdash download <path>` | Download a file by server path |
//! | `fdash watch` | Poll the service status until interrupted |
//! | `fdash completions <shell>` | Print shell completions |

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use file_dashboard::client::{HttpServiceClient, RemoteService};
use file_dashboard::config::{self, Config};
use file_dashboard::dashboard::{Completion, Dashboard};
use file_dashboard::download::{DirectorySink, NoticeKind};
use file_dashboard::format::{clean_path, format_bytes};
use file_dashboard::listing::{fetch_listing, ListingKind};
use file_dashboard::models::{FileEntry, StatusSnapshot};
use file_dashboard::search::SearchOutcome;
use file_dashboard::upload::UploadBatch;

/// File Dashboard CLI: browse, search, upload, and download files on a
/// remote file-indexing service.
#[derive(Parser)]
#[command(
    name = "fdash",
    about = "File Dashboard: browse, search, upload, and download files on a remote file-indexing service",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/fdash.toml")]
    config: PathBuf,

    /// Service base address. Skips the config file and uses defaults
    /// for everything else.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the service status snapshot.
    Status,

    /// List files found by the service's indexer.
    Files,

    /// List files uploaded to the service.
    Uploaded,

    /// Search files by name (at least 2 characters).
    ///
    /// Prints matching files, or the candidate paths when the service
    /// reports an ambiguous match.
    Search {
        /// The search query string.
        query: String,
    },

    /// Upload one or more local files in a single request.
    Upload {
        /// Files to upload.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Download a file by its server path.
    Download {
        /// Server-relative path, as shown by `files` or `search`.
        path: String,

        /// Directory to save into. Defaults to `[downloads].dir`.
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Start a session and print each polled status snapshot.
    Watch {
        /// Stop after this many polls (at least 1) instead of waiting for Ctrl-C.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        ticks: Option<u32>,
    },

    /// Print shell completions to stdout.
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("file_dashboard=debug,fdash=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.base_url {
        Some(url) => {
            let cfg = Config::for_base_url(url.clone());
            cfg.validate()?;
            Ok(cfg)
        }
        None => config::load_config(&cli.config),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "fdash", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = resolve_config(&cli)?;
    let client = Arc::new(
        HttpServiceClient::from_config(&cfg).context("Failed to build HTTP client")?,
    );

    match cli.command {
        Commands::Status => {
            let status = exit_on_error(client.status().await);
            print_status(&status);
        }
        Commands::Files => {
            let files = exit_on_error(fetch_listing(client.as_ref(), ListingKind::Indexed).await);
            print_files(&files);
        }
        Commands::Uploaded => {
            let files = exit_on_error(fetch_listing(client.as_ref(), ListingKind::Uploaded).await);
            print_files(&files);
        }
        Commands::Search { query } => {
            let sink = Arc::new(DirectorySink::new(&cfg.downloads.dir));
            let mut dash = Dashboard::new(client, sink);
            dash.set_query(query);
            exit_on_error(dash.search());
            dash.settle().await;
            print_search(dash.state().search_outcome.as_ref());
        }
        Commands::Upload { paths } => {
            let batch = exit_on_error(UploadBatch::from_picker(&paths).await);
            let sink = Arc::new(DirectorySink::new(&cfg.downloads.dir));
            let mut dash = Dashboard::new(client, sink);
            println!("{}", batch.label());
            dash.select_files(batch);
            exit_on_error(dash.upload());
            dash.settle().await;

            let state = dash.state();
            if let Some(err) = &state.error_message {
                eprintln!("Error: {}", err);
                std::process::exit(1);
            }
            if let Some(msg) = &state.success_message {
                println!("{}", msg);
            }
            println!("Uploaded files now on the service: {}", state.uploaded_files.len());
        }
        Commands::Download { path, dir } => {
            let dir = dir.unwrap_or_else(|| cfg.downloads.dir.clone());
            let mut dash = Dashboard::new(client, Arc::new(DirectorySink::new(dir)));
            dash.download(path);
            dash.settle().await;

            let mut failed = false;
            for notice in dash.take_notices() {
                match notice.kind {
                    NoticeKind::Saved(saved) => println!("Saved {}", saved.display()),
                    NoticeKind::Failed(message) => {
                        eprintln!("Download of {} failed: {}", notice.path, message);
                        failed = true;
                    }
                }
            }
            if failed {
                std::process::exit(1);
            }
        }
        Commands::Watch { ticks } => {
            let sink = Arc::new(DirectorySink::new(&cfg.downloads.dir));
            let mut dash = Dashboard::new(client, sink);
            run_watch(&mut dash, &cfg, ticks).await;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}

async fn run_watch(dash: &mut Dashboard, cfg: &Config, ticks: Option<u32>) {
    dash.start(cfg.poll_interval());
    dash.settle().await;

    let state = dash.state();
    if let Some(err) = &state.error_message {
        eprintln!("Error: {}", err);
    }
    println!(
        "{} indexed, {} uploaded",
        state.indexed_files.len(),
        state.uploaded_files.len()
    );
    if let Some(status) = &state.status {
        print_status(status);
    }

    let mut polls = 0u32;
    loop {
        tokio::select! {
            completion = dash.next_completion() => {
                let Some(completion) = completion else { break };
                let polled = matches!(completion, Completion::Polled(_));
                dash.apply(completion);
                if !polled {
                    continue;
                }
                polls += 1;
                if let Some(status) = &dash.state().status {
                    println!("--- poll {} ---", polls);
                    print_status(status);
                }
                if ticks.is_some_and(|n| polls >= n) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    dash.shutdown();
}

fn exit_on_error<T, E: std::fmt::Display>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_status(status: &StatusSnapshot) {
    let indexing = match status.indexing_complete {
        Some(true) => "complete",
        Some(false) => "in progress",
        None => "unknown",
    };
    println!("indexing:      {}", indexing);
    match status.total_files {
        Some(n) => println!("total_files:   {}", n),
        None => println!("total_files:   -"),
    }
    println!(
        "upload_folder: {}",
        status.upload_folder.as_deref().unwrap_or("-")
    );
    for (key, value) in &status.extra {
        println!("{:<14} {}", format!("{}:", key), value);
    }
}

fn print_files(files: &[FileEntry]) {
    if files.is_empty() {
        println!("No files.");
        return;
    }

    println!("{:<32} {:>10}  {:<20} PATH", "NAME", "SIZE", "MODIFIED");
    for f in files {
        println!(
            "{:<32} {:>10}  {:<20} {}",
            f.name,
            format_bytes(i64::try_from(f.size).unwrap_or(i64::MAX)),
            f.modified.as_deref().unwrap_or("-"),
            clean_path(&f.path)
        );
    }
}

fn print_search(outcome: Option<&SearchOutcome>) {
    match outcome {
        Some(SearchOutcome::Results(results)) if results.is_empty() => println!("No results."),
        Some(SearchOutcome::Results(results)) => {
            println!("Search results ({})", results.len());
            print_files(results);
        }
        Some(SearchOutcome::Disambiguation(choices)) => {
            println!("Multiple files matched. Download one with `fdash download <path>`:");
            for choice in choices {
                println!("  {}", choice);
            }
        }
        Some(SearchOutcome::Failure(message)) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
        None => println!("No results."),
    }
}
