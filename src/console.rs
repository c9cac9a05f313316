//! Console input/output handles
//!
//! Commands write through a `Console` they are handed instead of touching
//! stdout directly, so tests can capture what a command prints.

use crate::error::Result;
use serde::Serialize;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

pub struct Console<R = BufReader<Stdin>, W = Stdout> {
    input: R,
    output: W,
}

impl Console {
    /// Console bound to the process stdin/stdout
    pub fn stdio() -> Self {
        Console::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    /// Print a line of text
    pub fn println(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    /// Print a value as indented JSON followed by a newline
    pub fn print_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.output, value)?;
        writeln!(self.output)?;
        self.output.flush()?;
        Ok(())
    }

    /// Read all remaining input
    pub fn read_all(&mut self) -> Result<String> {
        let mut content = String::new();
        self.input.read_to_string(&mut content)?;
        Ok(content)
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &W {
        &self.output
    }
}
