//! SubDB - Subtitle Downloader Tool
//!
//! Command-line front end for the SubDB API: hash movies, list languages,
//! search, batch-download subtitles for a folder and upload subtitles.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};

use subdb::config::{APP_NAME, APP_VERSION};
use subdb::encoding::available_encodings;
use subdb::logging::{default_log_path, setup_logging, shutdown_logging, LogTarget};
use subdb::{
    collect_media, language_name, movie_hash, BatchDownloader, BatchEvent, ClientConfig,
    DownloadOptions, JobStatus, OutputEncoding, ProductInfo, Settings, SubDbClient, UploadOutcome,
    Utils, Validation,
};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "subdb", version, about = "Download and upload subtitles through the SubDB API")]
struct Cli {
    /// Use the sandbox API instead of production
    #[arg(long, global = true)]
    sandbox: bool,

    /// API root address (overrides --sandbox, SUBDB_API_URL and saved settings)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Write logs to the log file instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the SubDB hash of movie files
    Hash {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the languages the API serves
    Languages,
    /// List the subtitle languages available for a movie
    Search {
        file: PathBuf,
        /// Ask for version counts
        #[arg(long)]
        version: Option<String>,
    },
    /// Download subtitles for every media file in a folder
    Download {
        dir: PathBuf,
        /// Two-letter language code
        #[arg(short, long)]
        language: Option<String>,
        /// Encoding the .srt files are written in
        #[arg(short, long)]
        encoding: Option<String>,
        /// Start written files with a byte-order mark
        #[arg(long)]
        bom: bool,
        /// Number of parallel downloads
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Keep existing .srt files
        #[arg(long)]
        no_overwrite: bool,
        /// Remember language, encoding and jobs for next time
        #[arg(long)]
        save: bool,
    },
    /// Upload a subtitle for a movie
    Upload { movie: PathBuf, subtitle: PathBuf },
    /// List the encodings subtitles can be written in
    Encodings,
}

/// Initialize logging before anything else talks to `log`
fn initialize_app(cli: &Cli) -> AppResult<()> {
    let target = if cli.log_file {
        LogTarget::File(default_log_path()?)
    } else {
        LogTarget::Console
    };
    setup_logging(target, cli.verbose)?;
    info!("Starting {} {}", APP_NAME, APP_VERSION);
    Ok(())
}

fn build_client(cli: &Cli, settings: &Settings) -> AppResult<SubDbClient> {
    let product = ProductInfo::subdb_cli();
    let base_url = settings.resolve_base_url(cli.base_url.as_deref(), cli.sandbox);
    Ok(SubDbClient::new(ClientConfig::new(base_url, &product))?)
}

fn run(cli: &Cli) -> AppResult<()> {
    let mut settings = Settings::load();

    match &cli.command {
        Command::Hash { files } => {
            let mut failed = 0;
            for file in files {
                match movie_hash(file) {
                    Ok(hash) => println!("{}  {}", hash, file.display()),
                    Err(e) => {
                        eprintln!("{}: {}", file.display(), e);
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                return Err(format!("{} file(s) could not be hashed", failed).into());
            }
        }
        Command::Languages => {
            let client = build_client(cli, &settings)?;
            for language in client.list_languages()? {
                println!("{}\t{}", language, language_name(&language));
            }
        }
        Command::Search { file, version } => {
            let client = build_client(cli, &settings)?;
            let hash = movie_hash(file)?;
            let hits = client.search_languages(&hash, version.as_deref())?;
            if hits.is_empty() {
                println!("No subtitles for {}", hash);
            }
            for hit in hits {
                match hit.versions {
                    Some(count) => println!("{} ({} versions)", hit.language, count),
                    None => println!("{}", hit.language),
                }
            }
        }
        Command::Download {
            dir,
            language,
            encoding,
            bom,
            jobs,
            no_overwrite,
            save,
        } => {
            let mut stored = settings.clone();
            if let Some(language) = language {
                settings.language = language.clone();
            }
            if let Some(encoding) = encoding {
                settings.output_encoding = encoding.clone();
            }
            if let Some(jobs) = jobs {
                settings.concurrent_downloads = *jobs;
            }
            if *save {
                stored.remember_download_defaults(&settings);
                let path = stored.save()?;
                info!("Settings saved to {}", path.display());
            }
            if *bom {
                settings.write_bom = true;
            }
            if *no_overwrite {
                settings.overwrite_existing = false;
            }
            let client = build_client(cli, &settings)?;
            download_folder(&client, dir, &settings)?;
        }
        Command::Upload { movie, subtitle } => {
            let client = build_client(cli, &settings)?;
            match client.upload_file(movie, subtitle)? {
                UploadOutcome::Created => println!("Subtitle uploaded"),
                UploadOutcome::Duplicate => println!("The API already has this subtitle"),
                UploadOutcome::Rejected(status) => {
                    return Err(format!("Upload rejected: {}", status).into())
                }
            }
        }
        Command::Encodings => {
            for name in available_encodings() {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

fn download_folder(client: &SubDbClient, dir: &Path, settings: &Settings) -> AppResult<()> {
    if !Validation::is_valid_folder(dir) {
        return Err(format!("Selected directory doesn't exist: {}", dir.display()).into());
    }
    if !Validation::is_valid_concurrent_downloads(settings.concurrent_downloads) {
        return Err(format!("Invalid number of jobs: {}", settings.concurrent_downloads).into());
    }
    let output_encoding =
        OutputEncoding::from_label(&settings.output_encoding)?.with_bom(settings.write_bom);

    // Language list is fetched up front, before any download starts
    match client.list_languages() {
        Ok(languages) if !languages.is_empty() && !languages.contains(&settings.language) => {
            return Err(format!(
                "Language '{}' is not offered by the API (available: {})",
                settings.language,
                languages.join(",")
            )
            .into());
        }
        Ok(_) => {}
        Err(e) => warn!("Could not fetch language list: {}", e),
    }

    let media = collect_media(dir)?;
    if media.is_empty() {
        return Err("Media files not loaded!".into());
    }

    let options = DownloadOptions {
        language: settings.language.clone(),
        output_encoding,
        concurrent_downloads: settings.concurrent_downloads,
        overwrite_existing: settings.overwrite_existing,
    };

    let bar = ProgressBar::new(media.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let downloader = BatchDownloader::new(client, options);
    let summary = downloader.run(&media, |event| match event {
        BatchEvent::Processed { done, total, job } => {
            let name = Utils::truncate_string(&Utils::get_file_name(&job.video_path), 40);
            match &job.status {
                JobStatus::Failed(reason) => bar.println(format!("{}: {}", name, reason)),
                JobStatus::Saved(path) => bar.println(format!("{} -> {}", name, path.display())),
                _ => {}
            }
            bar.set_message(format!("{} {}", Utils::format_progress(done, total), name));
            bar.inc(1);
        }
        BatchEvent::Completed(_) => bar.finish_with_message("Download completed!"),
    });

    println!(
        "{} saved, {} without subtitles, {} skipped, {} failed, {} cancelled",
        summary.saved, summary.not_found, summary.skipped, summary.failed, summary.cancelled
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = initialize_app(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let code = match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    };

    shutdown_logging();
    code
}
