use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use es_doctor::ui::Theme;
use es_doctor::{
    events, render_markdown, ui, App, ClusterData, ClusterSource, FetchPlan, FileSource,
    LiveSource, Settings, SnapshotArchive,
};

#[derive(Parser, Debug)]
#[command(name = "es-doctor")]
#[command(about = "Diagnostic TUI for Elasticsearch cluster health")]
struct Args {
    /// Print a Markdown health report to stdout and exit
    #[arg(long)]
    report: bool,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay an archived snapshot file or directory instead of connecting
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Refresh interval in seconds for live views
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Log file (the terminal is reserved for the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    if let Some(refresh) = args.refresh {
        settings.refresh_secs = refresh;
    }
    if let Some(log_file) = args.log_file {
        settings.logging.file = log_file;
    }

    let _guard = init_logging(&settings)?;

    let replaying = args.replay.is_some();
    let source: Box<dyn ClusterSource> = match args.replay {
        Some(path) => {
            info!(path = %path.display(), "replaying snapshots");
            Box::new(FileSource::new(path))
        }
        None => {
            let live = LiveSource::connect(&settings.elasticsearch).with_context(|| {
                format!(
                    "Cannot connect to Elasticsearch at '{}'",
                    settings.elasticsearch.host
                )
            })?;
            Box::new(live)
        }
    };

    if args.report {
        return run_report(source, &settings, replaying);
    }

    let archive = if replaying {
        None
    } else {
        SnapshotArchive::from_settings(&settings.snapshots)
    };
    let refresh_interval = settings.refresh_interval();
    let app = App::new(source, settings)
        .with_archive(archive)
        .with_theme(Theme::auto_detect());
    run_tui(app, refresh_interval)
}

/// Send tracing output to the configured log file.
///
/// The returned guard flushes the writer when dropped, so it must live until
/// `main` returns.
fn init_logging(settings: &Settings) -> Result<WorkerGuard> {
    let path = &settings.logging.file;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "es-doctor.log".into());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Cannot create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&dir, &file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(guard)
}

/// Take two overview samples, render the Markdown report and print it.
fn run_report(
    mut source: Box<dyn ClusterSource>,
    settings: &Settings,
    replaying: bool,
) -> Result<()> {
    let plan = FetchPlan::overview();

    let Some(first) = source.poll(plan) else {
        let reason = source.error().unwrap_or("no data");
        bail!("Failed to collect cluster data: {}", reason);
    };

    if !replaying {
        std::thread::sleep(Duration::from_secs(settings.report.sample_secs));
    }
    let data = match source.poll(plan) {
        Some(second) => ClusterData::from_snapshots(second, Some(first)),
        None => {
            warn!(
                error = source.error().unwrap_or("no new data"),
                "second sample missing, report has no rates"
            );
            ClusterData::from_snapshots(first, None)
        }
    };

    eprintln!("Generating report for {} ...", data.current.cluster_name());
    println!("{}", render_markdown(&data, settings, Utc::now()));
    info!(cluster = data.current.cluster_name(), "report written");
    Ok(())
}

/// Run the TUI until the user quits.
fn run_tui(mut app: App, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    info!(source = app.source_description(), "starting UI");
    let result = run_app(&mut terminal, &mut app, refresh_interval);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= refresh_interval {
            app.tick();
            last_tick = Instant::now();
        }
    }

    info!("UI closed");
    Ok(())
}
