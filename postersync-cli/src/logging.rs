//! Logger setup: env_logger to stderr, with an optional ANSI-stripped
//! copy into a logfile.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use env_logger::Builder;
use log::LevelFilter;

use crate::error::CliError;

/// Writes to stderr and mirrors everything, colors removed, into a file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(&strip_ansi_escapes::strip(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

pub(crate) fn init(quiet: bool, verbose: bool, logfile: Option<&Path>) -> Result<(), CliError> {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::new();
    builder.filter_level(level).format_timestamp(None);
    if let Some(path) = logfile {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(Tee { file })));
    }
    builder
        .try_init()
        .map_err(|err| CliError::other(format!("logger already initialized: {err}")))
}
