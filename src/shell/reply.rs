//! Reply definitions
//!
//! Results of interpreter commands and their text rendering.

use std::fmt;
use std::path::PathBuf;

use crate::engine::FileInfo;

/// Summary printed by `HELP`
pub const HELP_TEXT: &str = "\
commands:
  CREATE <name> <size>            create a file of <size> bytes
  WRITE <name> <offset> \"text\"    overwrite bytes at <offset>
  READ <name> <offset> <length>   print <length> bytes at <offset>
  DELETE <name>                   delete a file
  LIST                            list all files
  STAT <name>                     show one file
  SAVE [path]                     write an image
  LOAD [path]                     replace state with an image
  EXIT                            leave";

/// A successful command result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Created {
        name: String,
        size: usize,
        blocks: usize,
    },
    Wrote {
        name: String,
        len: usize,
    },
    Data(Vec<u8>),
    Deleted {
        name: String,
    },
    Listing(Vec<FileInfo>),
    Stat(FileInfo),
    Saved {
        path: PathBuf,
    },
    Loaded {
        path: PathBuf,
        files: usize,
    },
    Help,
    Exit,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Created { name, size, blocks } => {
                write!(f, "created '{}' ({} bytes, {} blocks)", name, size, blocks)
            }
            Reply::Wrote { name, len } => write!(f, "wrote {} bytes to '{}'", len, name),
            Reply::Data(data) => write!(f, "\"{}\"", escape(data)),
            Reply::Deleted { name } => write!(f, "deleted '{}'", name),
            Reply::Listing(files) if files.is_empty() => f.write_str("(no files)"),
            Reply::Listing(files) => {
                for (i, info) in files.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write_info(f, info)?;
                }
                Ok(())
            }
            Reply::Stat(info) => write_info(f, info),
            Reply::Saved { path } => write!(f, "saved image to {}", path.display()),
            Reply::Loaded { path, files } => {
                write!(f, "loaded image from {} ({} files)", path.display(), files)
            }
            Reply::Help => f.write_str(HELP_TEXT),
            Reply::Exit => f.write_str("bye"),
        }
    }
}

fn write_info(f: &mut fmt::Formatter<'_>, info: &FileInfo) -> fmt::Result {
    write!(
        f,
        "{} - {} bytes - {} blocks {:?}",
        info.name, info.size, info.block_count, info.blocks
    )
}

/// Render bytes the way `WRITE` accepts them back
fn escape(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.extend(c.escape_default()),
            c => out.push(c),
        }
    }
    out
}
