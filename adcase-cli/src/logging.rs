//! Logger setup.
//!
//! Everything the CLI prints goes through the `log` facade. Info lines are
//! printed bare; warnings and errors get a colored level tag. With
//! `--logfile` every line is mirrored to a file with ANSI codes stripped.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use log::{Level, LevelFilter};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

/// Level from the global flags. `RUST_LOG` can still override per module.
pub(crate) fn level_for(quiet: bool, verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    }
}

/// Writes to the console and, when set, to a log file without ANSI codes.
pub(crate) struct Tee<W: Write> {
    console: W,
    file: Option<File>,
}

impl<W: Write> Tee<W> {
    pub(crate) fn new(console: W, file: Option<File>) -> Self {
        Self { console, file }
    }
}

impl<W: Write> Write for Tee<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(&strip_ansi_escapes::strip(buf))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Install the global logger.
pub(crate) fn init(quiet: bool, verbose: bool, logfile: Option<&Path>) -> Result<(), CliError> {
    let file = match logfile {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Some(File::create(path)?)
        }
        None => None,
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for(quiet, verbose))
        // Chatty HTTP internals stay quiet unless RUST_LOG asks for them
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper_util", LevelFilter::Warn)
        .filter_module("rustls", LevelFilter::Warn)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(Tee::new(io::stdout(), file))))
        .format(move |buf, record| {
            if verbose {
                write!(
                    buf,
                    "{} ",
                    chrono::Local::now()
                        .format("%H:%M:%S%.3f")
                        .if_supports_color(Stdout, |t| t.dimmed())
                )?;
            }
            match record.level() {
                Level::Error => write!(buf, "{} ", "error:".if_supports_color(Stdout, |t| t.red()))?,
                Level::Warn => write!(buf, "{} ", "warning:".if_supports_color(Stdout, |t| t.yellow()))?,
                Level::Debug | Level::Trace if verbose => {
                    write!(buf, "{} ", record.target().if_supports_color(Stdout, |t| t.dimmed()))?
                }
                _ => {}
            }
            writeln!(buf, "{}", record.args())
        });
    builder
        .try_init()
        .map_err(|e| CliError::logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_pick_level() {
        assert_eq!(level_for(false, false), LevelFilter::Info);
        assert_eq!(level_for(true, false), LevelFilter::Warn);
        // Verbose wins
        assert_eq!(level_for(true, true), LevelFilter::Debug);
    }

    #[test]
    fn log_file_gets_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let mut console = Vec::new();
        {
            let file = File::create(&path).unwrap();
            let mut tee = Tee::new(&mut console, Some(file));
            tee.write_all(b"\x1b[32mreplaced\x1b[0m 3 links\n").unwrap();
            tee.flush().unwrap();
        }
        assert_eq!(console, b"\x1b[32mreplaced\x1b[0m 3 links\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "replaced 3 links\n");
    }
}
