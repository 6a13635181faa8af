pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod input;
pub mod log;
pub mod logging;
pub mod notification;
pub mod projector;
pub mod replay;
pub mod session;
pub mod storage;
pub mod surface;
pub use error::{AppError, AppResult};

use std::path::Path;
use std::time::Duration;

use cli::{Cli, Command};
use config::AppConfig;
use export::{
    spawn_publish, Archiver, EthLedger, IpfsClient, Ledger, PublishPipeline, PublishReport,
    Snapshot, ZipArchiver,
};
use geometry::Dimensions;
use notification::{report_publish, DesktopNotifier};
use replay::{drive_replay_until, IntervalTicks};
use session::{Session, ToolSettings};
use storage::StorageService;

/// Entrypoint used by the binary.
pub fn run(cli: Cli) -> AppResult<()> {
    logging::init(cli.verbose);
    let config = config::load_app_config();
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Command::Render {
            log,
            output,
            width,
            height,
        } => {
            let canvas = config.canvas.dimensions();
            let dims = Dimensions::new(
                width.unwrap_or(canvas.width()),
                height.unwrap_or(canvas.height()),
            );
            render(&config, &log, &output, dims)
        }
        Command::Replay {
            log,
            interval_ms,
            stop_after,
            output,
        } => {
            let interval = interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.replay.interval());
            replay(&config, &log, interval, stop_after, output.as_deref())
        }
        Command::Export { log, publish } => export(&config, &log, publish),
        Command::LedgerHash => {
            let ledger = EthLedger::new(&config.ledger)?;
            match ledger.last_hash()? {
                Some(hash) => println!("{hash}"),
                None => println!("no hash recorded"),
            }
            Ok(())
        }
    }
}

fn render(config: &AppConfig, log: &Path, output: &Path, dims: Dimensions) -> AppResult<()> {
    let storage = StorageService::from_config(config)?;
    let log = storage.load_log(log)?;
    let surface = projector::project(log.actions(), dims);
    std::fs::write(output, surface.encode_png()?)?;
    tracing::info!(
        actions = log.len(),
        strokes = log.group_count(),
        output = %output.display(),
        "rendered drawing"
    );
    Ok(())
}

fn replay(
    config: &AppConfig,
    log: &Path,
    interval: Duration,
    stop_after: Option<usize>,
    output: Option<&Path>,
) -> AppResult<()> {
    let storage = StorageService::from_config(config)?;
    let log = storage.load_log(log)?;
    let mut session = Session::with_log(
        log,
        config.canvas.dimensions(),
        ToolSettings::from_config(&config.tools),
        interval,
    );

    let mut ticks = IntervalTicks::spawn(session.replay_interval());
    let state = drive_replay_until(&mut session, &mut ticks, stop_after)?;
    let (applied, total) = session.replay_progress();
    println!("replay {state:?} after {applied}/{total} actions");

    if let Some(output) = output {
        std::fs::write(output, session.surface().encode_png()?)?;
    }
    Ok(())
}

fn export(config: &AppConfig, log_path: &Path, publish: bool) -> AppResult<()> {
    let storage = StorageService::from_config(config)?;
    let log = storage.load_log(log_path)?;
    let name = log_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("drawing");

    let snapshot = Snapshot::capture(&log, config.canvas.dimensions())?;
    let archive = ZipArchiver.archive(&snapshot)?;
    let paths = storage.save_export(name, &snapshot, &archive)?;
    tracing::info!(archive = %paths.archive.display(), "export written");
    println!("{}", paths.image.display());
    println!("{}", paths.log.display());
    println!("{}", paths.archive.display());

    if !publish {
        return Ok(());
    }

    let pipeline = PublishPipeline::new(
        ZipArchiver,
        IpfsClient::new(&config.ipfs)?,
        EthLedger::new(&config.ledger)?,
    );
    let report = spawn_publish(pipeline, snapshot).wait();
    report_publish(&DesktopNotifier, &report);
    match report {
        PublishReport::Published { hash, transaction } => {
            println!("{hash} {transaction}");
            Ok(())
        }
        PublishReport::Failed { stage, message } => Err(AppError::Publish { stage, message }),
    }
}
