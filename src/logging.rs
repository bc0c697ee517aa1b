use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Initialise logging. The default level is `info`; `debug` can be enabled via
/// the settings file or `--debug`, in which case `RUST_LOG` may override it.
/// When `file` is given, output goes to that file instead of stderr.
pub fn init(debug: bool, file: Option<PathBuf>) {
    // With debug logging disabled we force `info` regardless of `RUST_LOG`, so
    // a stray variable in the user's environment cannot make the hook noisy.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let file_parts = file.as_deref().and_then(log_file_parts);

    let _ = match file_parts {
        Some((dir, name)) => {
            let appender = tracing_appender::rolling::never(dir, name);
            builder.with_ansi(false).with_writer(appender).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
}

/// Directory and file name for the rolling appender. A bare file name is
/// placed in the working directory; a path without a file name is rejected.
pub fn log_file_parts(path: &Path) -> Option<(PathBuf, OsString)> {
    let name = path.file_name()?.to_owned();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    Some((dir, name))
}
