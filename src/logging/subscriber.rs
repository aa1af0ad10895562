//! Tracing wiring: one event classification rendered two ways, to the
//! terminal and to the run log.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::{Level, Metadata};

use super::utils::{HEADER_STAMP, LINE_STAMP, log_file_path, strip_ansi, utc_now};

/// Tracing target of stage header events.
pub(super) const STAGE_TARGET: &str = "homestead::stage";

/// Shape of an output line, decided once per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Stage,
    Error,
    Warn,
    Info,
    Detail,
}

impl LineKind {
    fn of(metadata: &Metadata<'_>) -> Self {
        match *metadata.level() {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO if metadata.target() == STAGE_TARGET => Self::Stage,
            Level::INFO => Self::Info,
            _ => Self::Detail,
        }
    }

    fn console(self, msg: &str) -> String {
        match self {
            Self::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Self::Error => format!("\x1b[31mERROR\x1b[0m {msg}"),
            Self::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}"),
            Self::Info => format!("  {msg}"),
            Self::Detail => format!("  \x1b[2m{msg}\x1b[0m"),
        }
    }

    fn file(self, stamp: &str, msg: &str) -> String {
        let msg = strip_ansi(msg);
        match self {
            Self::Stage => format!("[{stamp}] ==> {msg}"),
            Self::Error => format!("[{stamp}]     [error] {msg}"),
            Self::Warn => format!("[{stamp}]     [warn] {msg}"),
            Self::Info => format!("[{stamp}]     {msg}"),
            Self::Detail => format!("[{stamp}]     [debug] {msg}"),
        }
    }
}

/// Pulls the formatted `message` field out of an event.
fn message_of(event: &tracing::Event<'_>) -> String {
    #[derive(Default)]
    struct Message(String);

    impl tracing::field::Visit for Message {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }

        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "message" {
                self.0 = value.to_string();
            }
        }
    }

    let mut message = Message::default();
    event.record(&mut message);
    message.0
}

/// First lines of a run log: version, command, start time and, when the run
/// was elevated with `sudo`, who asked for it.
fn run_header(command: &str, started: &str, sudo_user: Option<&str>) -> String {
    let rule = "=".repeat(42);
    let invoker = sudo_user.map_or_else(String::new, |user| format!("via sudo by {user}\n"));
    format!(
        "{rule}\nhomestead {} {command} {started}\n{invoker}{rule}\n",
        crate::VERSION
    )
}

/// Appends every event, timestamped and without escapes, to the run log.
///
/// The file is truncated when the layer is created, so it always holds the
/// latest run only.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open the default log file for `command`.
    ///
    /// Returns `None` when no cache directory can be resolved or created.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::open(&log_file_path(command)?, command)
    }

    /// Truncate `path`, write the run header and keep it open for appending.
    pub(super) fn open(path: &Path, command: &str) -> Option<Self> {
        let sudo_user = std::env::var("SUDO_USER").ok();
        let header = run_header(command, &utc_now(HEADER_STAMP), sudo_user.as_deref());
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let line = LineKind::of(event.metadata()).file(&utc_now(LINE_STAMP), &message_of(event));
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "{line}").ok();
        }
    }
}

/// Terminal rendering of [`LineKind`].
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let line = LineKind::of(event.metadata()).console(&message_of(event));
        writeln!(writer, "{line}")
    }
}

/// Install the global subscriber.
///
/// Warnings and errors go to stderr, everything else to stdout; `--verbose`
/// lowers the console threshold to debug. The run log always records debug
/// and above. Call once, before anything logs.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));
    let console = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(writer)
        .with_filter(console_level);
    let run_log = FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console)
        .with(run_log)
        .init();
}
