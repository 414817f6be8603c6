//! Interpreter session
//!
//! Owns an engine and turns each command into exactly one engine call.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::engine::StorageEngine;
use crate::error::Result;

use super::{Command, Reply};

/// Result of handling one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to show the user (a reply or a rendered error)
    Output(String),

    /// Nothing to show (blank line)
    Silent,

    /// The user asked to leave
    Exit,
}

/// A command-line session over one engine
pub struct Session {
    engine: StorageEngine,
    prompt: bool,
}

impl Session {
    pub fn new(engine: StorageEngine) -> Self {
        Self {
            engine,
            prompt: true,
        }
    }

    /// Enable or disable the `> ` prompt
    pub fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    /// Execute a command
    ///
    /// Routes commands to the matching engine operation.
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        tracing::debug!(command = ?command.command_type(), "execute");

        match command {
            Command::Create { name, size } => {
                self.engine.create(&name, size)?;
                let blocks = self.engine.config().blocks_for(size);
                Ok(Reply::Created { name, size, blocks })
            }
            Command::Write { name, offset, data } => {
                self.engine.write(&name, offset, &data)?;
                Ok(Reply::Wrote {
                    name,
                    len: data.len(),
                })
            }
            Command::Read { name, offset, len } => {
                let data = self.engine.read(&name, offset, len)?;
                Ok(Reply::Data(data.to_vec()))
            }
            Command::Delete { name } => {
                self.engine.delete(&name)?;
                Ok(Reply::Deleted { name })
            }
            Command::List => Ok(Reply::Listing(self.engine.list())),
            Command::Stat { name } => Ok(Reply::Stat(self.engine.stat(&name)?)),
            Command::Save { path } => {
                let path = self.resolve(path);
                self.engine.save_to_path(&path)?;
                tracing::info!(path = %path.display(), files = self.engine.file_count(), "saved image");
                Ok(Reply::Saved { path })
            }
            Command::Load { path } => {
                let path = self.resolve(path);
                self.engine.restore_from_path(&path)?;
                let files = self.engine.file_count();
                tracing::info!(path = %path.display(), files, "loaded image");
                Ok(Reply::Loaded { path, files })
            }
            Command::Help => Ok(Reply::Help),
            Command::Exit => Ok(Reply::Exit),
        }
    }

    /// Parse and execute one line, rendering errors as text
    pub fn handle_line(&mut self, line: &str) -> Outcome {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Outcome::Silent,
            Err(e) => return Outcome::Output(format!("error: {}", e)),
        };

        match self.execute(command) {
            Ok(Reply::Exit) => Outcome::Exit,
            Ok(reply) => Outcome::Output(reply.to_string()),
            Err(e) => {
                tracing::debug!(error = %e, "command failed");
                Outcome::Output(format!("error: {}", e))
            }
        }
    }

    /// Read lines from `input` until EOF or `EXIT`, writing replies to `output`
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<()> {
        let mut line = String::new();

        loop {
            if self.prompt {
                output.write_all(b"> ")?;
                output.flush()?;
            }

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }

            match self.handle_line(&line) {
                Outcome::Output(text) => writeln!(output, "{}", text)?,
                Outcome::Silent => {}
                Outcome::Exit => break,
            }
        }

        output.flush()?;
        Ok(())
    }

    fn resolve(&self, path: Option<PathBuf>) -> PathBuf {
        path.unwrap_or_else(|| self.engine.config().image_path.clone())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn engine(&self) -> &StorageEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut StorageEngine {
        &mut self.engine
    }

    pub fn into_engine(self) -> StorageEngine {
        self.engine
    }
}
