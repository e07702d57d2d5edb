use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use super::bit_word_buffer::BitWordBuffer;
use super::config::Config;
use super::decoder::AltroDecoder;
use super::error::ProcessorError;
use super::summary::{DdlSummary, EventSummary};
use super::worker_status::WorkerStatus;

const DDL_EXTENSION: &str = "ddl";

/// A DDL file in an event directory, with the DDL id parsed from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlFile {
    pub path: PathBuf,
    pub ddl_id: Option<u32>,
}

/// Get all of this detector's .ddl files in an event directory, sorted by DDL id
pub fn get_ddl_files(event_dir: &Path, prefix: &str) -> Result<Vec<DdlFile>, ProcessorError> {
    let mut files: Vec<DdlFile> = Vec::new();
    for item in event_dir.read_dir()? {
        let path = item?.path();
        let is_ddl = path.extension().is_some_and(|ext| ext == DDL_EXTENSION);
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(s) => s.to_string(),
            None => continue,
        };
        if is_ddl && stem.starts_with(prefix) {
            let ddl_id = stem[prefix.len()..].parse().ok();
            files.push(DdlFile { path, ddl_id });
        }
    }
    files.sort_by(|a, b| a.ddl_id.cmp(&b.ddl_id).then_with(|| a.path.cmp(&b.path)));
    Ok(files)
}

/// Decode every DDL of one event and write the event summary.
///
/// A payload that fails to decode is logged and recorded in the summary; only IO and
/// writing problems stop the processing. The sample buffer is reused across payloads.
pub fn process_event(
    config: &Config,
    event_number: i32,
    words: &mut BitWordBuffer,
) -> Result<EventSummary, ProcessorError> {
    let event_dir = config.get_event_directory(event_number)?;
    let summary_path = config.get_summary_file_name(event_number)?;
    let files = get_ddl_files(&event_dir, &config.get_ddl_prefix())?;
    if files.is_empty() {
        log::warn!(
            "No {} DDL files found in {}",
            config.detector,
            event_dir.to_string_lossy()
        );
    }

    let mut summary = EventSummary::new(event_number);
    for file in files {
        let bytes = std::fs::read(&file.path)?;
        let file_name = file
            .path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        log::debug!(
            "Decoding {} ({})",
            file_name,
            human_bytes::human_bytes(bytes.len() as f64)
        );

        let mut decoder = AltroDecoder::with_buffer(config.decoder_config(), std::mem::take(words));
        let ddl = DdlSummary::from_payload(&mut decoder, &file_name, file.ddl_id, &bytes);
        *words = decoder.into_buffer();

        if ddl.incomplete_channels > 0 {
            log::info!(
                "{} had {} incomplete channels (failure rate {:.1}%)",
                file_name,
                ddl.incomplete_channels,
                ddl.failure_rate
            );
        }
        summary.ddls.push(ddl);
    }

    summary.write(&summary_path)?;
    Ok(summary)
}

/// The function to be called by a separate thread (typically the UI).
/// Allows multiple events to be processed
pub fn process(
    config: Config,
    tx: Sender<WorkerStatus>,
    worker_id: usize,
) -> Result<(), ProcessorError> {
    let events: Vec<i32> = (config.first_event..(config.last_event + 1)).collect();
    process_subset(config, tx, worker_id, events)
}

/// Process a subset of events
pub fn process_subset(
    config: Config,
    tx: Sender<WorkerStatus>,
    worker_id: usize,
    subset: Vec<i32>,
) -> Result<(), ProcessorError> {
    let mut words = BitWordBuffer::default();
    let n_events = subset.len();
    for (idx, event) in subset.into_iter().enumerate() {
        if config.does_event_exist(event) {
            log::info!("Processing event {}...", event);
            let summary = process_event(&config, event, &mut words)?;
            log::info!(
                "Finished processing event {}: {} channels in {} DDLs, {} failed.",
                event,
                summary.channel_count(),
                summary.ddls.len(),
                summary.failed_ddl_count()
            );
        } else {
            log::info!("Event {} does not exist, skipping...", event);
        }
        tx.send(WorkerStatus::new(
            (idx + 1) as f32 / n_events as f32,
            event,
            worker_id,
        ))?;
    }
    Ok(())
}

/// Divide an event range in to a set of subranges (per thread/worker)
pub fn create_subsets(config: &Config) -> Vec<Vec<i32>> {
    let mut subsets: Vec<Vec<i32>> = vec![Vec::new(); config.n_threads.max(1) as usize];
    let n_subsets = subsets.len();

    for (idx, event) in (config.first_event..(config.last_event + 1)).enumerate() {
        subsets[idx % n_subsets].push(event)
    }

    subsets.retain(|subset| !subset.is_empty());
    subsets
}
