//! Engine log events and the sink they are delivered to.

/// Severity of an engine log event.
///
/// `Lifecycle` and `Progress` sit between `Warn` and `Info`: lifecycle
/// events mark build phases the user always wants to see, progress events
/// are high-frequency updates a sink may throttle or drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Error,
    Warn,
    Lifecycle,
    Progress,
    Info,
    Debug,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Lifecycle => "lifecycle",
            Self::Progress => "progress",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// A single engine log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Lifecycle, message)
    }

    pub fn progress(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Progress, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, message)
    }
}

/// Receiver for engine log events.
///
/// The engine may call `accept` from several of its internal threads at
/// once; implementations must tolerate that without blocking the caller for
/// longer than a channel send.
pub trait LogSink: Send + Sync {
    fn accept(&self, event: LogEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn accept(&self, _event: LogEvent) {}
}
