// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{error, warn, info, debug, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use subsedit::app_config::{self, Config, PlayerConfig};
use subsedit::console::{self, CommandOutcome, EditorCommand};
use subsedit::cue_collection::CueCollection;
use subsedit::editor::{format_clock, EditorSession};
use subsedit::errors::{AppError, CommandError};
use subsedit::file_utils::{FileManager, FileType};
use subsedit::player::mpv::MpvProcess;
use subsedit::player::{Player, PlayerEvent};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Edit a subtitle file interactively while a video plays in mpv
    Edit {
        /// Subtitle file to open (created on first save if missing)
        #[arg(value_name = "SUBTITLE")]
        subtitle: Option<PathBuf>,

        /// Video to open in the player
        #[arg(short, long)]
        video: Option<PathBuf>,

        /// mpv executable to use
        #[arg(long)]
        mpv: Option<String>,
    },

    /// Parse a subtitle file and report its timing
    Check {
        /// Subtitle file to inspect
        #[arg(value_name = "SUBTITLE")]
        subtitle: PathBuf,

        /// Print the parsed cues as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a subtitle file sorted by start time and renumbered
    Normalize {
        /// Subtitle file to rewrite
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (defaults to INPUT_STEM.normalized.srt next to INPUT)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,

        /// Print the normalized document instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Generate shell completions for subsedit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// SubsEdit - subtitle timing editor
///
/// Edits SRT subtitles against a video playing in mpv.
#[derive(Parser, Debug)]
#[command(name = "subsedit")]
#[command(version)]
#[command(about = "Subtitle timing editor driven by mpv")]
#[command(long_about = "SubsEdit edits SRT subtitles while a video plays in mpv.

EXAMPLES:
    subsedit edit movie.srt --video movie.mkv   # Edit with playback
    subsedit edit                               # Start an empty document
    subsedit check movie.srt                    # Report cue timing
    subsedit check --json movie.srt             # Dump cues as JSON
    subsedit normalize movie.srt                # Write movie.normalized.srt
    subsedit normalize movie.srt -o fixed.srt   # Sort and renumber into fixed.srt
    subsedit completions bash > subsedit.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in subsedit.json by default. You can specify a
    different file with --config-path. If the file doesn't exist, a default one
    is created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "subsedit.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "subsedit", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;

    match cli.command {
        Commands::Edit { subtitle, video, mpv } => {
            let mut config = config;
            if let Some(binary) = mpv {
                config.player.binary_path = binary;
            }
            config.validate().context("Configuration validation failed")?;
            run_edit(config, subtitle, video).await
        }
        Commands::Check { subtitle, json } => run_check(&subtitle, json),
        Commands::Normalize { input, output, force, stdout } => {
            run_normalize(&input, output, force, stdout)
        }
        Commands::Completions { .. } => Ok(()),
    }
}

// @loads: Config file, then applies the CLI log level over it
fn load_config(config_path: &str, cli_level: Option<CliLogLevel>) -> Result<Config> {
    if let Some(level) = &cli_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(config_path)?;

    match cli_level {
        Some(level) => config.log_level = level.into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn read_subtitle(path: &Path) -> Result<CueCollection> {
    if !FileManager::file_exists(path) {
        return Err(anyhow!("Subtitle file does not exist: {:?}", path));
    }

    if FileManager::detect_file_type(path)? != FileType::Subtitle {
        warn!("{:?} does not look like an SRT file, parsing anyway", path);
    }

    let content = FileManager::read_to_string(path)?;
    Ok(CueCollection::from_srt(&content))
}

fn run_check(path: &Path, json: bool) -> Result<()> {
    let cues = read_subtitle(path)?;

    if json {
        let values: Vec<_> = cues.sorted_view().into_iter().map(|record| &record.cue).collect();
        let output = serde_json::to_string_pretty(&values)
            .context("Failed to serialize cues to JSON")?;
        println!("{}", output);
        return Ok(());
    }

    let summary = cues.summary();
    println!("{}", path.display());
    println!("  cues:        {}", summary.cue_count);
    if let (Some(first), Some(last)) = (summary.first_start_ms, summary.last_end_ms) {
        println!("  span:        {} - {}", format_clock(first), format_clock(last));
    }
    println!("  overlapping: {}", summary.overlapping);
    println!("  zero-length: {}", summary.zero_length);
    println!("  reversed:    {}", summary.reversed);

    if summary.reversed > 0 {
        warn!("{} cue(s) end before they start", summary.reversed);
    }

    Ok(())
}

fn run_normalize(input: &Path, output: Option<PathBuf>, force: bool, stdout: bool) -> Result<()> {
    let cues = read_subtitle(input)?;
    let document = cues.to_srt();

    if stdout {
        print!("{}", document);
        return Ok(());
    }

    let output = output.unwrap_or_else(|| FileManager::default_output_path(input));
    if output.exists() && !force {
        return Err(AppError::File(format!(
            "Output file already exists: {:?}. Use -f to force overwrite.",
            output
        ))
        .into());
    }

    FileManager::write_to_file(&output, &document)?;
    info!("Wrote {} cues to {:?}", cues.len(), output);
    Ok(())
}

// @waits: Next player event, or forever when no player is running
async fn next_player_event(events: &mut Option<UnboundedReceiver<PlayerEvent>>) -> Option<PlayerEvent> {
    match events {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

async fn open_video(
    player: &mut Option<MpvProcess>,
    events: &mut Option<UnboundedReceiver<PlayerEvent>>,
    video: &Path,
    config: &PlayerConfig,
) -> Result<()> {
    if !FileManager::file_exists(video) {
        return Err(anyhow!("Video file does not exist: {:?}", video));
    }

    if FileManager::detect_file_type(video)? != FileType::Video {
        warn!("{:?} has no known video extension, handing it to the player anyway", video);
    }

    if let Some(running) = player.as_ref() {
        running.load_file(video).await?;
        info!("Player switched to {}", video.display());
        return Ok(());
    }

    let (process, receiver) = MpvProcess::launch(video, config).await?;
    *player = Some(process);
    *events = Some(receiver);
    Ok(())
}

fn print_prompt(session: &EditorSession) {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "[{}] > ", format_clock(session.position_ms()));
    let _ = stdout.flush();
}

async fn run_edit(config: Config, subtitle: Option<PathBuf>, video: Option<PathBuf>) -> Result<()> {
    let mut session = EditorSession::new(config.editor.clone());

    if let Some(path) = &subtitle {
        if path.exists() {
            session.open_document(path)?;
        } else {
            info!("{:?} does not exist yet, starting an empty document", path);
            session.set_document_path(path);
        }
    }

    let mut player: Option<MpvProcess> = None;
    let mut events: Option<UnboundedReceiver<PlayerEvent>> = None;

    if let Some(video) = &video {
        if let Err(e) = open_video(&mut player, &mut events, video, &config.player).await {
            error!("Could not open video: {:#}", e);
        }
    }

    println!("{}", session.title());
    println!("Type 'help' for commands.");
    print_prompt(&session);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                let line = match line.context("Failed to read from stdin")? {
                    Some(line) => line,
                    None => break,
                };

                let command = match line.parse::<EditorCommand>() {
                    Ok(command) => command,
                    Err(CommandError::Empty) => {
                        print_prompt(&session);
                        continue;
                    }
                    Err(e) => {
                        error!("{}", e);
                        print_prompt(&session);
                        continue;
                    }
                };

                let active_player = player.as_ref().map(|process| process as &dyn Player);
                match console::run_command(&mut session, active_player, command).await {
                    Ok(CommandOutcome::Output(text)) => {
                        if !text.is_empty() {
                            println!("{}", text);
                        }
                    }
                    Ok(CommandOutcome::OpenVideo(path)) => {
                        if let Err(e) = open_video(&mut player, &mut events, &path, &config.player).await {
                            error!("Could not open video: {:#}", e);
                        }
                    }
                    Ok(CommandOutcome::Quit) => break,
                    Err(e) => error!("{:#}", e),
                }

                print_prompt(&session);
            }
            event = next_player_event(&mut events) => {
                match event {
                    Some(PlayerEvent::Position(seconds)) => session.update_position(seconds),
                    Some(PlayerEvent::Duration(seconds)) => session.update_duration(seconds),
                    Some(PlayerEvent::Exited) | None => {
                        info!("Player closed");
                        player = None;
                        events = None;
                    }
                }
            }
        }
    }

    if let Some(process) = player {
        debug!("Shutting down player");
        process.shutdown().await?;
    }

    Ok(())
}
