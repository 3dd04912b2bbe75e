// Progress output of the `decompile` command.
use std::io::{self, Write};

use crate::modules::decompiler::Decompilation;

const PHASE_LINE_WIDTH: usize = 51;
const BAR_WIDTH: usize = 40;

pub trait ProgressDisplayer {
    /// Called from the wait callback with the latest (cached) status.
    fn display_decompilation_progress(
        &mut self,
        out: &mut dyn Write,
        dec: &Decompilation,
    ) -> io::Result<()>;

    /// Called once per saved output file.
    fn display_download_progress(&mut self, out: &mut dyn Write, file_name: &str) -> io::Result<()>;
}

/// Picks the displayer for the `--quiet` and `--brief` flags (quiet wins).
pub fn progress_displayer(quiet: bool, brief: bool) -> Box<dyn ProgressDisplayer> {
    if quiet {
        Box::new(NoProgressDisplayer)
    } else if brief {
        Box::new(ProgressBarDisplayer)
    } else {
        Box::new(ProgressLogDisplayer::default())
    }
}

/// One line per phase, grouped by part.
#[derive(Debug, Default)]
pub struct ProgressLogDisplayer {
    header_printed: bool,
    printed_phases: usize,
    last_part: Option<String>,
    download_header_printed: bool,
}

impl ProgressDisplayer for ProgressLogDisplayer {
    fn display_decompilation_progress(
        &mut self,
        out: &mut dyn Write,
        dec: &Decompilation,
    ) -> io::Result<()> {
        if !self.header_printed {
            write!(out, "{}\n{}\n\n", dec.id(), "-".repeat(dec.id().len()))?;
            self.header_printed = true;
        }
        let Some(status) = dec.snapshot() else {
            return out.flush();
        };

        for phase in status.phases.iter().skip(self.printed_phases) {
            // a new phase closes the line of the previous one
            if self.printed_phases > 0 {
                writeln!(out, "[OK]")?;
            }
            if let Some(part) = &phase.part
                && self.last_part.as_ref() != Some(part)
            {
                writeln!(out, "{}:", part)?;
            }
            self.last_part = phase.part.clone();

            let indent = if phase.part.is_some() { "    " } else { "" };
            let line = format!("{}{} ({}%)...", indent, phase.description, phase.completion);
            write!(out, "{:<width$}", line, width = PHASE_LINE_WIDTH)?;
            self.printed_phases += 1;
        }

        if status.state.finished {
            if status.state.failed {
                writeln!(out, "[FAIL]")?;
            } else {
                writeln!(out)?;
            }
        }
        out.flush()
    }

    fn display_download_progress(
        &mut self,
        out: &mut dyn Write,
        file_name: &str,
    ) -> io::Result<()> {
        if !self.download_header_printed {
            write!(out, "\nDownloading:\n")?;
            self.download_header_printed = true;
        }
        writeln!(out, " - {}", file_name)?;
        out.flush()
    }
}

/// A single self-overwriting progress bar.
#[derive(Debug, Default)]
pub struct ProgressBarDisplayer;

impl ProgressDisplayer for ProgressBarDisplayer {
    fn display_decompilation_progress(
        &mut self,
        out: &mut dyn Write,
        dec: &Decompilation,
    ) -> io::Result<()> {
        let Some(status) = dec.snapshot() else {
            return Ok(());
        };
        let completion = status.completion.min(100);
        let filled = usize::from(completion) * BAR_WIDTH / 100;
        write!(
            out,
            "\r{}: [{:<width$}] {}%",
            dec.id(),
            "#".repeat(filled),
            completion,
            width = BAR_WIDTH
        )?;
        if status.state.finished {
            let verdict = if status.state.has_succeeded() { "OK" } else { "FAIL" };
            writeln!(out, " {}", verdict)?;
        }
        out.flush()
    }

    fn display_download_progress(
        &mut self,
        _out: &mut dyn Write,
        _file_name: &str,
    ) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NoProgressDisplayer;

impl ProgressDisplayer for NoProgressDisplayer {
    fn display_decompilation_progress(
        &mut self,
        _out: &mut dyn Write,
        _dec: &Decompilation,
    ) -> io::Result<()> {
        Ok(())
    }

    fn display_download_progress(
        &mut self,
        _out: &mut dyn Write,
        _file_name: &str,
    ) -> io::Result<()> {
        Ok(())
    }
}
