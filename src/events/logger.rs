//! Run log writer
//!
//! Drains the event bus to a plain-text log file, one line per event:
//! `<time_ms> <code> <json payload>`. Used for post-run inspection of
//! encounter and combat sequences.

use bevy::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use uuid::Uuid;

use super::bus::EventBus;
use super::types::GameEvent;

/// Configuration for run logging
#[derive(Resource, Clone)]
pub struct RunLogConfig {
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Whether logging is enabled
    pub enabled: bool,
}

impl Default for RunLogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            enabled: true,
        }
    }
}

/// Active run logger with file handle
#[derive(Resource, Default)]
pub struct RunLogger {
    writer: Option<BufWriter<File>>,
    run_id: String,
}

impl RunLogger {
    /// Open a log file for a new run. Failure disables logging, never the run.
    pub fn start_run(&mut self, config: &RunLogConfig) -> String {
        self.run_id = Uuid::new_v4().to_string();
        if !config.enabled {
            return self.run_id.clone();
        }

        if let Err(e) = std::fs::create_dir_all(&config.log_dir) {
            warn!("Failed to create log directory: {}", e);
            return self.run_id.clone();
        }

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("run_{}_{}.log", stamp, &self.run_id[..8]);
        let path = config.log_dir.join(filename);

        match OpenOptions::new().create(true).write(true).truncate(true).open(&path) {
            Ok(file) => {
                self.writer = Some(BufWriter::new(file));
                info!("Run logging started: {} (run: {})", path.display(), &self.run_id[..8]);
            }
            Err(e) => {
                warn!("Failed to open run log: {}", e);
            }
        }
        self.run_id.clone()
    }

    /// Write one event line.
    pub fn log(&mut self, time_ms: u32, event: &GameEvent) {
        let Some(writer) = &mut self.writer else {
            return;
        };
        let payload = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
        if let Err(e) = writeln!(writer, "{} {} {}", time_ms, event.type_code(), payload) {
            warn!("Failed to write event: {}", e);
        }
    }

    /// Flush and close the log file.
    pub fn end_run(&mut self) {
        if let Some(mut writer) = self.writer.take()
            && let Err(e) = writer.flush()
        {
            warn!("Failed to flush run log: {}", e);
        }
    }
}

/// System draining the bus into the run log each frame.
pub fn flush_event_bus(mut bus: ResMut<EventBus>, mut logger: ResMut<RunLogger>) {
    if bus.is_empty() {
        return;
    }
    for bus_event in bus.drain() {
        logger.log(bus_event.time_ms, &bus_event.event);
    }
}
