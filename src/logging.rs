use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

fn filter(debug: bool) -> EnvFilter {
    // With debug logging off the level is forced to `info` even when `RUST_LOG`
    // is set in the user's environment.
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    }
}

fn file_appender(path: &Path) -> Option<RollingFileAppender> {
    let file_name = path.file_name()?.to_string_lossy().into_owned();
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(&dir)
    {
        Ok(appender) => Some(appender),
        Err(err) => {
            eprintln!("could not open log file {}: {err}", path.display());
            None
        }
    }
}

/// Builds the subscriber without installing it. Output goes to `log_file`
/// when one is given and can be opened, otherwise to stderr.
pub fn subscriber(
    debug: bool,
    log_file: Option<&Path>,
) -> Box<dyn tracing::Subscriber + Send + Sync> {
    let registry = Registry::default().with(filter(debug));
    match log_file.and_then(file_appender) {
        Some(appender) => Box::new(
            registry.with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(appender),
            ),
        ),
        None => Box::new(registry.with(fmt::layer().with_writer(std::io::stderr))),
    }
}

/// Installs the global subscriber. `debug` enables the `debug` level, which
/// `RUST_LOG` may then override. Returns `false` if a subscriber was already
/// installed.
pub fn init(debug: bool, log_file: Option<PathBuf>) -> bool {
    tracing::subscriber::set_global_default(subscriber(debug, log_file.as_deref())).is_ok()
}
