//! Routes the storage SDK's diagnostics into the host logging pipeline.
//!
//! The SDK side speaks [`SdkLogLevel`]; the host side speaks [`HostSeverity`]. An SDK fatal
//! is reported as a host error: the SDK does not get to end the host process.
//!
//! [`SdkLogLayer`] is the hook the SDK logs through. It captures `tracing` events emitted by
//! the SDK crates, gates them on the shared [`LogThreshold`] and hands them to a
//! [`SdkLogBridge`], which prefixes the component tag and forwards them to a [`HostSink`].
//!
//! Sinks write to the host's output directly. Re-emitting through `tracing` from inside a
//! layer callback is dropped by the dispatcher whenever a scoped default is active.

use std::fmt::{self, Write as _};
use std::io::Write as _;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Layer};

/// Environment variable holding the SDK log threshold.
pub const LOG_LEVEL_ENV: &str = "OBJ_ACCEL_LOG_LEVEL";

/// Rendered messages are cut at this many bytes.
pub const MAX_MESSAGE_BYTES: usize = 4096;

/// Target prefixes treated as SDK output.
pub const SDK_TARGET_PREFIXES: &[&str] = &["aws_", "hyper"];

/// Target host messages are emitted under.
pub const HOST_TARGET: &str = "obj_accel::sdk";

/// SDK severity, most severe first. A message is enabled when it is at or below the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SdkLogLevel {
    Fatal = 1,
    Error = 2,
    Warn = 3,
    Info = 4,
    Debug = 5,
    Trace = 6,
}

impl SdkLogLevel {
    /// Case-insensitive match against TRACE, DEBUG, INFO, WARN, ERROR and FATAL.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Some(SdkLogLevel::Trace),
            "DEBUG" => Some(SdkLogLevel::Debug),
            "INFO" => Some(SdkLogLevel::Info),
            "WARN" => Some(SdkLogLevel::Warn),
            "ERROR" => Some(SdkLogLevel::Error),
            "FATAL" => Some(SdkLogLevel::Fatal),
            _ => None,
        }
    }

    /// Threshold for a configuration value; absent or unrecognized values give `Warn`.
    pub fn resolve(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or(SdkLogLevel::Warn)
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => SdkLogLevel::Fatal,
            2 => SdkLogLevel::Error,
            3 => SdkLogLevel::Warn,
            4 => SdkLogLevel::Info,
            5 => SdkLogLevel::Debug,
            _ => SdkLogLevel::Trace,
        }
    }
}

impl FromStr for SdkLogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown log level: {}", s))
    }
}

impl From<tracing::Level> for SdkLogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => SdkLogLevel::Error,
            tracing::Level::WARN => SdkLogLevel::Warn,
            tracing::Level::INFO => SdkLogLevel::Info,
            tracing::Level::DEBUG => SdkLogLevel::Debug,
            _ => SdkLogLevel::Trace,
        }
    }
}

/// Host severity, least severe first. `Fatal` is reserved for conditions that end the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl HostSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostSeverity::Trace => "TRACE",
            HostSeverity::Debug => "DEBUG",
            HostSeverity::Info => "INFO",
            HostSeverity::Warn => "WARN",
            HostSeverity::Error => "ERROR",
            HostSeverity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for HostSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Fixed SDK-to-host translation. Fatal maps to Error; everything else maps to its namesake.
pub fn map_severity(level: SdkLogLevel) -> HostSeverity {
    match level {
        SdkLogLevel::Fatal => HostSeverity::Error,
        SdkLogLevel::Error => HostSeverity::Error,
        SdkLogLevel::Warn => HostSeverity::Warn,
        SdkLogLevel::Info => HostSeverity::Info,
        SdkLogLevel::Debug => HostSeverity::Debug,
        SdkLogLevel::Trace => HostSeverity::Trace,
    }
}

/// Shared, atomically updated SDK threshold.
///
/// Clones share one cell. Readers may observe a concurrent update late.
#[derive(Debug, Clone)]
pub struct LogThreshold {
    level: Arc<AtomicU8>,
    initial: SdkLogLevel,
}

impl LogThreshold {
    pub fn new(level: SdkLogLevel) -> Self {
        Self {
            level: Arc::new(AtomicU8::new(level as u8)),
            initial: level,
        }
    }

    pub fn from_env() -> Self {
        Self::from_env_var(LOG_LEVEL_ENV)
    }

    pub fn from_env_var(name: &str) -> Self {
        let value = std::env::var(name).ok();
        Self::new(SdkLogLevel::resolve(value.as_deref()))
    }

    /// Process-wide threshold, resolved from [`LOG_LEVEL_ENV`] on first use.
    pub fn global() -> &'static LogThreshold {
        static GLOBAL: OnceLock<LogThreshold> = OnceLock::new();
        GLOBAL.get_or_init(LogThreshold::from_env)
    }

    pub fn get(&self) -> SdkLogLevel {
        SdkLogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    pub fn set(&self, level: SdkLogLevel) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Restores the level resolved at construction.
    pub fn reset(&self) {
        self.set(self.initial);
    }

    pub fn enabled(&self, level: SdkLogLevel) -> bool {
        level <= self.get()
    }
}

/// Destination for translated messages.
pub trait HostSink: Send + Sync + fmt::Debug {
    fn log(&self, severity: HostSeverity, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkFormat {
    /// `<timestamp> <LEVEL> obj_accel::sdk: <message>`, like the compact fmt layer.
    #[default]
    Text,
    /// One JSON object per line, shaped like the json fmt layer's output.
    Json,
}

/// Host sink writing lines straight to a `tracing-subscriber` writer.
pub struct WriterSink<W> {
    make_writer: W,
    format: SinkFormat,
}

impl<W> WriterSink<W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    pub fn new(make_writer: W, format: SinkFormat) -> Self {
        Self {
            make_writer,
            format,
        }
    }

    fn render(&self, severity: HostSeverity, message: &str) -> String {
        let mut timestamp = String::new();
        // Only the timestamp is lost if the clock cannot be formatted.
        let _ = SystemTime.format_time(&mut Writer::new(&mut timestamp));
        match self.format {
            SinkFormat::Text => {
                format!("{} {:>5} {}: {}\n", timestamp, severity, HOST_TARGET, message)
            }
            SinkFormat::Json => {
                let mut line = serde_json::json!({
                    "timestamp": timestamp,
                    "level": severity.as_str(),
                    "fields": { "message": message },
                    "target": HOST_TARGET,
                })
                .to_string();
                line.push('\n');
                line
            }
        }
    }
}

impl<W> fmt::Debug for WriterSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterSink")
            .field("format", &self.format)
            .finish()
    }
}

impl<W> HostSink for WriterSink<W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    fn log(&self, severity: HostSeverity, message: &str) {
        let line = self.render(severity, message);
        let mut writer = self.make_writer.make_writer();
        // Nowhere left to report a failed log write.
        let _ = writer.write_all(line.as_bytes());
    }
}

/// Fixed-capacity text buffer; writes past capacity are dropped at a char boundary.
#[derive(Debug)]
struct BoundedBuffer {
    text: String,
    capacity: usize,
}

impl BoundedBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            capacity,
        }
    }
}

impl fmt::Write for BoundedBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.capacity - self.text.len();
        if s.len() <= room {
            self.text.push_str(s);
            return Ok(());
        }
        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.text.push_str(&s[..cut]);
        Err(fmt::Error)
    }
}

/// Host-side adapter the SDK's log output is delivered to.
#[derive(Debug, Clone)]
pub struct SdkLogBridge {
    threshold: LogThreshold,
    sink: Arc<dyn HostSink>,
}

impl SdkLogBridge {
    pub fn new(threshold: LogThreshold, sink: Arc<dyn HostSink>) -> Self {
        Self { threshold, sink }
    }

    /// Bridge writing to `make_writer`, typically the writer of the host's fmt layer.
    pub fn with_writer<W>(threshold: LogThreshold, make_writer: W, format: SinkFormat) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        Self::new(threshold, Arc::new(WriterSink::new(make_writer, format)))
    }

    pub fn threshold(&self) -> &LogThreshold {
        &self.threshold
    }

    /// The SDK consults this before formatting; the bridge itself does not filter.
    pub fn current_threshold(&self) -> SdkLogLevel {
        self.threshold.get()
    }

    pub fn emit(&self, level: SdkLogLevel, tag: &str, message: &str) {
        self.sink
            .log(map_severity(level), &format!("[AWS:{}] {}", tag, message));
    }

    /// Renders into a buffer of [`MAX_MESSAGE_BYTES`], truncating overflow, then emits.
    pub fn emit_formatted(&self, level: SdkLogLevel, tag: &str, args: fmt::Arguments<'_>) {
        let mut buffer = BoundedBuffer::new(MAX_MESSAGE_BYTES);
        // Err only signals truncation.
        let _ = buffer.write_fmt(args);
        self.emit(level, tag, &buffer.text);
    }

    pub fn flush(&self) {}
}

pub fn is_sdk_target(target: &str) -> bool {
    SDK_TARGET_PREFIXES
        .iter()
        .any(|prefix| target.starts_with(prefix))
}

/// Component tag for a target: its crate name.
pub fn sdk_tag(target: &str) -> &str {
    target.split("::").next().unwrap_or(target)
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// `tracing` layer capturing SDK events and delivering them to a bridge.
#[derive(Debug, Clone)]
pub struct SdkLogLayer {
    bridge: SdkLogBridge,
}

impl SdkLogLayer {
    pub fn new(bridge: SdkLogBridge) -> Self {
        Self { bridge }
    }
}

impl<S: Subscriber> Layer<S> for SdkLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !is_sdk_target(metadata.target()) {
            return;
        }
        let level = SdkLogLevel::from(*metadata.level());
        if !self.bridge.threshold().enabled(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.bridge.emit_formatted(
            level,
            sdk_tag(metadata.target()),
            format_args!("{}{}", visitor.message, visitor.fields),
        );
    }
}
