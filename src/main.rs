use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use spendwatch::{
    CommandProvider, Dashboard, DashboardConfig, ThemeName, UsageSource,
};

#[derive(Parser, Debug)]
#[command(name = "spendwatch")]
#[command(about = "Live terminal dashboard for AI API usage and spend metrics")]
#[command(version)]
struct Args {
    /// Configuration file (JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dashboard theme: monokai, dracula, or nord
    #[arg(short, long)]
    theme: Option<String>,

    /// Refresh rate in seconds (clamped to 1-60)
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Compact mode for small terminals
    #[arg(long)]
    compact: bool,

    /// Provider command, e.g. "ccusage --json"
    #[arg(long)]
    command: Option<String>,

    /// Export the layout to a file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Print a one-shot usage summary and exit
    #[arg(long)]
    stats: bool,
}

/// Route tracing to a log file; logs written to a live TUI would corrupt
/// the display. `SPENDWATCH_LOG` overrides the path, or selects `stderr`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let target =
        std::env::var("SPENDWATCH_LOG").unwrap_or_else(|_| "spendwatch.log".to_string());

    if target == "stderr" {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
        return;
    }

    match std::fs::OpenOptions::new().create(true).append(true).open(&target) {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Arc::new(file))
                .try_init();
        }
        // An unwritable log path must not keep the dashboard from starting
        Err(_) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
}

fn parse_theme(name: &str) -> Result<ThemeName> {
    match name.to_lowercase().as_str() {
        "monokai" => Ok(ThemeName::Monokai),
        "dracula" => Ok(ThemeName::Dracula),
        "nord" => Ok(ThemeName::Nord),
        other => anyhow::bail!("unknown theme '{}' (monokai, dracula, nord)", other),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    // File config first, CLI flags override
    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(ref theme) = args.theme {
        config.theme = parse_theme(theme)?;
    }
    if let Some(refresh) = args.refresh {
        config.refresh_rate = refresh;
    }
    if args.compact {
        config.compact_mode = true;
    }
    if let Some(ref command) = args.command {
        config.command = command.split_whitespace().map(str::to_string).collect();
    }

    let provider =
        CommandProvider::new(config.command.clone(), spendwatch::source::DEFAULT_TIMEOUT)?;
    // The source rate-limits provider invocations independently of the
    // display refresh rate
    let mut source = UsageSource::with_default_interval(Box::new(provider));

    // Stats mode: fetch once, print the summary, exit without going live
    if args.stats {
        let metrics = source.fetch();
        print!("{}", spendwatch::stats_report(&metrics));
        return Ok(());
    }

    let mut dashboard = Dashboard::new(source);
    dashboard.initialize(&config);

    // Export mode: write the layout snapshot and exit without going live
    if let Some(ref path) = args.export {
        dashboard.write_export(path)?;
        println!("Exported layout to: {}", path.display());
        return Ok(());
    }

    run_tui(&mut dashboard)
}

/// Enter the alternate screen, run live mode, and restore the terminal.
///
/// Raw mode is owned by the keyboard listener; the panic hook still clears
/// it so an abnormal exit never leaves the terminal unusable.
fn run_tui(dashboard: &mut Dashboard) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = dashboard.run_live(&mut terminal);

    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
