// Compile-command records
//
// Traced compiler invocations arrive as `HASH:WORKDIR:ARGS:MODE`, where ARGS
// is the argv joined by BEL (0x07). Only MODE "cc" denotes a compile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Separator between argv entries inside a record
pub const ARG_SEPARATOR: char = '\u{7}';

/// Record mode for compiler invocations
pub const COMPILE_MODE: &str = "cc";

/// One entry of a compile_commands.json database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
    pub arguments: Vec<String>,
    pub directory: String,
    pub file: String,
    pub output: Option<String>,
}

/// A decoded trace record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub hash: String,
    pub directory: String,
    pub arguments: Vec<String>,
    pub mode: String,
}

impl TraceRecord {
    /// Split a raw record; `None` if any field is missing
    ///
    /// Hash and mode are taken from the outer colons; the working directory
    /// ends at the first colon after the hash, so arguments may contain ':'.
    pub fn parse(raw: &str) -> Option<Self> {
        let (hash, rest) = raw.split_once(':')?;
        let (rest, mode) = rest.rsplit_once(':')?;
        let (directory, args) = rest.split_once(':')?;

        if hash.is_empty() || args.is_empty() {
            return None;
        }

        Some(Self {
            hash: hash.to_string(),
            directory: directory.to_string(),
            arguments: args.split(ARG_SEPARATOR).map(str::to_string).collect(),
            mode: mode.to_string(),
        })
    }

    pub fn is_compile(&self) -> bool {
        self.mode == COMPILE_MODE
    }

    /// Build the compile_commands.json entry (source = last argument)
    pub fn to_compile_command(&self) -> Option<CompileCommand> {
        let file = self.arguments.last()?.clone();
        let output = self
            .arguments
            .iter()
            .position(|arg| arg == "-o")
            .and_then(|idx| self.arguments.get(idx + 1))
            .cloned();

        Some(CompileCommand {
            arguments: self.arguments.clone(),
            directory: self.directory.clone(),
            file,
            output,
        })
    }
}

/// Decode raw records into compile commands grouped by hash
///
/// Malformed records are skipped with a warning; non-"cc" records are
/// silently ignored.
pub fn group_by_hash<'a, I>(records: I) -> BTreeMap<String, Vec<CompileCommand>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut grouped: BTreeMap<String, Vec<CompileCommand>> = BTreeMap::new();

    for raw in records {
        let Some(record) = TraceRecord::parse(raw) else {
            warn!(record = %raw, "Skipping malformed trace record");
            continue;
        };
        if !record.is_compile() {
            continue;
        }
        if let Some(command) = record.to_compile_command() {
            grouped.entry(record.hash).or_default().push(command);
        }
    }

    grouped
}

#[cfg(test)]
#[path = "compile_commands_test.rs"]
mod compile_commands_test;
