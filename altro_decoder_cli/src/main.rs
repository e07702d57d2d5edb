//! # altro_decoder_cli
//!
//! Part of the altro_decoder crate family.
//!
//! Decodes every DDL file of a range of events and writes a YAML summary per event.
//!
//! ## Use
//!
//! Make a template configuration with
//!
//! ```bash
//! altro_decoder_cli -p config.yml new
//! ```
//!
//! fill it out, and then run with
//!
//! ```bash
//! altro_decoder_cli -p config.yml
//! ```
use clap::{Arg, Command};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;

use libaltro_decoder::config::Config;
use libaltro_decoder::process::{create_subsets, process_subset};
use libaltro_decoder::worker_status::WorkerStatus;

fn make_template_config(path: &Path) {
    let config = Config::default();
    match config.write_config_file(path) {
        Ok(()) => log::info!("Done."),
        Err(e) => log::error!("Could not write template config: {e}"),
    }
}

fn main() {
    // Create a cli
    let matches = Command::new("altro_decoder_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .required(true)
                .help("Path to the configuration file"),
        )
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    LogWrapper::new(pb_manager.clone(), logger)
        .try_init()
        .expect("Could not create logging/progress!");
    log::set_max_level(log::LevelFilter::Info);

    // Parse the cli
    let config_path = PathBuf::from(matches.get_one::<String>("path").expect("We require args"));

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        make_template_config(&config_path);
        return;
    }

    // Load our config
    log::info!("Loading config from {}...", config_path.to_string_lossy());
    let config = match Config::read_config_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    log::info!("Config successfully loaded.");
    log::info!("Raw Path: {}", config.raw_path.to_string_lossy());
    log::info!("Summary Path: {}", config.summary_path.to_string_lossy());
    log::info!("Detector: {}", config.detector);
    log::info!(
        "First Event: {} Last Event: {}",
        config.first_event,
        config.last_event
    );
    log::info!("Strict Trailer Validation: {}", config.strict_trailer_validation);

    if !config.is_n_threads_valid() {
        log::error!("Number of threads must be at least 1, got {}", config.n_threads);
        return;
    }
    if !config.is_event_range_valid() {
        log::error!("First event must not be after the last event");
        return;
    }

    // Setup the progress bars and spawn the workers!
    let style = ProgressStyle::with_template("{prefix} [{bar:40.cyan/blue}] {pos}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let (tx, rx) = channel::<WorkerStatus>();
    let mut bars: Vec<ProgressBar> = Vec::new();
    let mut handles = Vec::new();
    for (worker_id, subset) in create_subsets(&config).into_iter().enumerate() {
        let pb = pb_manager.add(ProgressBar::new(100));
        pb.set_style(style.clone());
        pb.set_prefix(format!("Worker {worker_id}"));
        bars.push(pb);

        let worker_config = config.clone();
        let worker_tx = tx.clone();
        handles.push(std::thread::spawn(move || {
            process_subset(worker_config, worker_tx, worker_id, subset)
        }));
    }
    // Only the workers hold senders now, so the loop ends when they are all done
    drop(tx);

    for status in rx.iter() {
        if let Some(pb) = bars.get(status.worker_id) {
            pb.set_position((status.progress * 100.0) as u64);
            pb.set_message(format!("event {}", status.event_number));
        }
    }

    for (worker_id, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(Ok(())) => log::info!("Worker {worker_id} successfully decoded its events!"),
            Ok(Err(e)) => log::error!("Worker {worker_id} failed with error: {e}"),
            Err(_) => log::error!("Failed to join worker {worker_id}!"),
        }
    }

    for pb in bars {
        pb.finish();
    }

    log::info!("Done.");
}
