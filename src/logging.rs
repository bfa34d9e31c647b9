use std::fs::{File, OpenOptions};
use std::path::Path;

/// Open (or create) a log file in append mode, creating parent directories.
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize env_logger with `rust_log` as the default filter.
///
/// Logs go to stderr unless `log_file` is set, in which case they are
/// appended to that file.
pub fn init_logging(rust_log: &str, log_file: Option<&Path>) -> std::io::Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(rust_log));

    match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }

    builder.init();
    Ok(())
}
