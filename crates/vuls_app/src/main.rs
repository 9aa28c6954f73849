mod platform;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use vuls_engine::{EngineHandle, ExportFormat, ExportMode, FeedCrawler, PageNumber};
use vuls_logging::{vuls_error, vuls_info};

use platform::app::{run_tui, TuiSession};
use platform::config::{self, AppConfig, ConfigLayer};
use platform::effects::ExportTarget;
use platform::headless::{run_once, HeadlessOptions};
use platform::logging::{self as app_logging, LogDestination};
use platform::ui::render::RenderOptions;
use platform::ui::theme::Theme;

#[derive(Debug, Parser)]
#[command(
    name = "hitcon-vuls",
    version,
    about = "Browse the HITCON ZeroDay disclosed-vulnerability listing"
)]
struct Cli {
    /// Extra configuration file merged over the defaults and user file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keybinding mode to use instead of the configured default.
    #[arg(long, value_name = "NAME")]
    mode: Option<String>,

    /// Page to open first.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: PageNumber,

    /// Print one page and exit instead of starting the interactive browser.
    #[arg(long)]
    once: bool,

    /// Export file for `--once` and for the export key.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Append exports instead of replacing the file.
    #[arg(long)]
    append: bool,

    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,

    /// Also save the raw markup of the page (with `--once`).
    #[arg(long, value_name = "FILE")]
    save_html: Option<PathBuf>,

    /// Serve demo data without touching the network.
    #[arg(long)]
    demo: bool,

    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    /// Write the effective configuration to the user config file and exit.
    #[arg(long)]
    write_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check proxy settings and whether the listing can be fetched.
    Diagnose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => ExportFormat::Text,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

impl Cli {
    fn log_destination(&self) -> LogDestination {
        let headless = self.once || self.command.is_some();
        if headless && self.verbose {
            LogDestination::Both
        } else {
            LogDestination::File
        }
    }

    fn export_target(&self) -> ExportTarget {
        ExportTarget {
            path: self
                .output
                .clone()
                .unwrap_or_else(|| ExportTarget::default().path),
            mode: if self.append {
                ExportMode::Append
            } else {
                ExportMode::Overwrite
            },
            format: self.format.into(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    app_logging::initialize(
        cli.log_destination(),
        vuls_logging::level_for(cli.verbose),
        cli.log_file.as_deref(),
    );

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            vuls_error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = config::load(&ConfigLayer::standard(cli.config.as_deref()))?;
    let router = config
        .router(cli.mode.as_deref())
        .context("invalid keybinding configuration")?;

    if cli.write_config {
        return write_user_config(&config);
    }

    if let Some(Command::Diagnose) = cli.command {
        let reachable = platform::diagnose::run_diagnose(&config)?;
        return Ok(if reachable {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let crawler = Arc::new(
        FeedCrawler::with_settings(config.fetch_settings(), config.page_settings())
            .context("building HTTP client")?,
    );
    if cli.demo {
        crawler.enter_demo_mode();
    }

    if cli.once {
        let options = HeadlessOptions {
            page: cli.page,
            export: cli.output.is_some().then(|| cli.export_target()),
            save_html: cli.save_html.clone(),
        };
        run_once(&crawler, &options)?;
        return Ok(ExitCode::SUCCESS);
    }

    let engine = EngineHandle::new(crawler).context("starting page loader")?;
    let session = TuiSession {
        render: RenderOptions {
            theme: Theme::from_config(&config.theme),
            show_page_numbers: config.display.show_page_numbers,
            show_help_bar: config.display.show_help_bar,
            key_hints: RenderOptions::key_hints_for(router.keymap()),
        },
        router,
        start_page: cli.page,
        last_page: config.last_page_placeholder,
        export: cli.export_target(),
    };
    run_tui(session, engine).context("terminal UI failed")?;
    vuls_info!("Session ended");
    Ok(ExitCode::SUCCESS)
}

fn write_user_config(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let path = config::user_config_path().context("no home directory to write into")?;
    if config.write_template(&path)? {
        println!("Wrote configuration to {}", path.display());
    } else {
        println!("{} already exists; left untouched", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
