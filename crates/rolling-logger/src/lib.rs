//! Rolling Logger
//!
//! Installs a `tracing` subscriber (which also receives `log` records) that
//! writes to a size-rotated file and keeps the most recent lines in memory.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Size at which the active log file is rotated
const MAX_FILE_BYTES: u64 = 1024 * 1024;
/// Rotated files kept next to the active one (`.1` is the newest)
const MAX_GENERATIONS: usize = 3;
/// Lines kept in the in-memory ring buffer
const RING_CAPACITY: usize = 256;

static SINK: OnceLock<Arc<Mutex<RollingSink>>> = OnceLock::new();

struct RollingSink {
    path: PathBuf,
    file: File,
    max_bytes: u64,
    written: u64,
    recent: VecDeque<String>,
    partial: String,
}

impl RollingSink {
    fn open(path: PathBuf, max_bytes: u64) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            file,
            max_bytes,
            written,
            recent: VecDeque::with_capacity(RING_CAPACITY),
            partial: String::new(),
        })
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        for generation in (1..MAX_GENERATIONS).rev() {
            let from = rotated_path(&self.path, generation);
            if from.exists() {
                let to = rotated_path(&self.path, generation + 1);
                let _ = fs::remove_file(&to);
                fs::rename(&from, &to)?;
            }
        }
        let first = rotated_path(&self.path, 1);
        let _ = fs::remove_file(&first);
        fs::rename(&self.path, &first)?;

        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        Ok(())
    }

    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        self.remember(buf);
        Ok(())
    }

    fn remember(&mut self, buf: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(end) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=end).collect();
            if self.recent.len() == RING_CAPACITY {
                self.recent.pop_front();
            }
            self.recent.push_back(line.trim_end().to_string());
        }
    }
}

fn rotated_path(path: &Path, generation: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}", generation));
    PathBuf::from(name)
}

/// Per-event writer handed to the fmt layer
struct SinkWriter(Arc<Mutex<RollingSink>>);

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut sink = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log sink poisoned"))?;
        sink.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut sink = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log sink poisoned"))?;
        sink.file.flush()
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Initialize logging into `<log_dir>/<app_name>.log`
///
/// Can only succeed once per process.
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), String> {
    #[cfg(target_os = "android")]
    {
        let _ = &log_dir;
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag(app_name),
        );
        return Ok(());
    }

    let dir = log_dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| format!("Failed to create log dir: {}", e))?;

    let sink = RollingSink::open(dir.join(format!("{}.log", app_name)), MAX_FILE_BYTES)
        .map_err(|e| format!("Failed to open log file: {}", e))?;
    let sink = Arc::new(Mutex::new(sink));
    SINK.set(sink.clone())
        .map_err(|_| "Logger already initialized".to_string())?;

    tracing_subscriber::fmt()
        .with_timer(LocalTime)
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || SinkWriter(sink.clone()))
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))
}

/// Most recent log lines, oldest first
pub fn recent_lines() -> Vec<String> {
    SINK.get()
        .and_then(|sink| sink.lock().ok().map(|s| s.recent.iter().cloned().collect()))
        .unwrap_or_default()
}

pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

fn ensure_initialized() -> Result<(), String> {
    if SINK.get().is_some() {
        Ok(())
    } else {
        Err("Logger not initialized".to_string())
    }
}
