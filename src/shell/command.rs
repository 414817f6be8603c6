//! Command definitions
//!
//! Parses interpreter lines into commands.

use std::path::PathBuf;

use crate::error::{FsError, Result};

/// Command keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Create,
    Write,
    Read,
    Delete,
    List,
    Stat,
    Save,
    Load,
    Help,
    Exit,
}

impl CommandType {
    /// Match a keyword, ignoring case
    pub fn from_keyword(word: &str) -> Option<Self> {
        let kind = match word.to_ascii_uppercase().as_str() {
            "CREATE" => CommandType::Create,
            "WRITE" => CommandType::Write,
            "READ" => CommandType::Read,
            "DELETE" => CommandType::Delete,
            "LIST" => CommandType::List,
            "STAT" => CommandType::Stat,
            "SAVE" => CommandType::Save,
            "LOAD" => CommandType::Load,
            "HELP" => CommandType::Help,
            "EXIT" | "QUIT" => CommandType::Exit,
            _ => return None,
        };
        Some(kind)
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a file of `size` bytes
    Create { name: String, size: usize },

    /// Overwrite bytes at `offset`
    Write {
        name: String,
        offset: usize,
        data: Vec<u8>,
    },

    /// Read `len` bytes at `offset`
    Read {
        name: String,
        offset: usize,
        len: usize,
    },

    /// Delete a file
    Delete { name: String },

    /// List every file
    List,

    /// Show one file
    Stat { name: String },

    /// Save an image (default path when `None`)
    Save { path: Option<PathBuf> },

    /// Load an image (default path when `None`)
    Load { path: Option<PathBuf> },

    /// Print the command summary
    Help,

    /// End the session
    Exit,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Create { .. } => CommandType::Create,
            Command::Write { .. } => CommandType::Write,
            Command::Read { .. } => CommandType::Read,
            Command::Delete { .. } => CommandType::Delete,
            Command::List => CommandType::List,
            Command::Stat { .. } => CommandType::Stat,
            Command::Save { .. } => CommandType::Save,
            Command::Load { .. } => CommandType::Load,
            Command::Help => CommandType::Help,
            Command::Exit => CommandType::Exit,
        }
    }

    /// Parse one line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let Some((keyword, rest)) = next_token(line) else {
            return Ok(None);
        };

        let kind = CommandType::from_keyword(keyword)
            .ok_or_else(|| FsError::InvalidCommand(format!("unknown command '{}'", keyword)))?;

        let mut args = Args::new(keyword, rest);
        let command = match kind {
            CommandType::Create => Command::Create {
                name: args.word("name")?,
                size: args.number("size")?,
            },
            CommandType::Write => Command::Write {
                name: args.word("name")?,
                offset: args.number("offset")?,
                data: args.quoted("content")?,
            },
            CommandType::Read => Command::Read {
                name: args.word("name")?,
                offset: args.number("offset")?,
                len: args.number("length")?,
            },
            CommandType::Delete => Command::Delete {
                name: args.word("name")?,
            },
            CommandType::Stat => Command::Stat {
                name: args.word("name")?,
            },
            CommandType::Save => Command::Save {
                path: args.optional_word().map(PathBuf::from),
            },
            CommandType::Load => Command::Load {
                path: args.optional_word().map(PathBuf::from),
            },
            CommandType::List => Command::List,
            CommandType::Help => Command::Help,
            CommandType::Exit => Command::Exit,
        };

        args.finish()?;
        Ok(Some(command))
    }
}

/// Split off the next whitespace-delimited token
fn next_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    Some((&input[..end], &input[end..]))
}

/// Cursor over a command's arguments
struct Args<'a> {
    keyword: &'a str,
    rest: &'a str,
}

impl<'a> Args<'a> {
    fn new(keyword: &'a str, rest: &'a str) -> Self {
        Self { keyword, rest }
    }

    fn missing(&self, what: &str) -> FsError {
        FsError::InvalidCommand(format!("{}: missing {}", self.keyword.to_uppercase(), what))
    }

    fn word(&mut self, what: &str) -> Result<String> {
        self.optional_word().ok_or_else(|| self.missing(what))
    }

    fn optional_word(&mut self) -> Option<String> {
        let (token, rest) = next_token(self.rest)?;
        self.rest = rest;
        Some(token.to_string())
    }

    fn number(&mut self, what: &str) -> Result<usize> {
        let token = self.word(what)?;
        token.parse().map_err(|_| {
            FsError::InvalidCommand(format!(
                "{}: {} must be a non-negative integer, got '{}'",
                self.keyword.to_uppercase(),
                what,
                token
            ))
        })
    }

    /// A double-quoted string with `\"`, `\\`, `\n`, `\t` and `\0` escapes
    fn quoted(&mut self, what: &str) -> Result<Vec<u8>> {
        let input = self.rest.trim_start();
        let Some(body) = input.strip_prefix('"') else {
            return Err(if input.is_empty() {
                self.missing(what)
            } else {
                FsError::InvalidCommand(format!(
                    "{}: {} must be double-quoted",
                    self.keyword.to_uppercase(),
                    what
                ))
            });
        };

        let mut out = String::new();
        let mut chars = body.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.rest = &body[i + 1..];
                    return Ok(out.into_bytes());
                }
                '\\' => {
                    let escaped = match chars.next().map(|(_, e)| e) {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('0') => '\0',
                        Some(other) => {
                            return Err(FsError::InvalidCommand(format!(
                                "unknown escape '\\{}'",
                                other
                            )))
                        }
                        None => break,
                    };
                    out.push(escaped);
                }
                _ => out.push(c),
            }
        }

        Err(FsError::InvalidCommand(format!(
            "{}: unterminated {}",
            self.keyword.to_uppercase(),
            what
        )))
    }

    fn finish(self) -> Result<()> {
        match next_token(self.rest) {
            None => Ok(()),
            Some((extra, _)) => Err(FsError::InvalidCommand(format!(
                "{}: unexpected argument '{}'",
                self.keyword.to_uppercase(),
                extra
            ))),
        }
    }
}
