//! Mapping collaborator backed by an external program.

use super::{MappingRequest, SemanticMapper};
use crate::error::{Error, Result};
use crate::process::run_with_timeout;
use serde::Serialize;
use std::process::Command;
use std::time::Duration;

/// Runs a program once per chunk.
///
/// The program receives a JSON request on stdin:
///
/// ```json
/// {"chunk_index":0,"chunk_count":2,"instruction":"...","content":"[HEADING] ...","blocks":[...]}
/// ```
///
/// and must print its mapping response on stdout. A non-zero exit status or
/// exceeding the timeout counts as a (retryable) mapper failure.
#[derive(Debug, Clone)]
pub struct CommandMapper {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    #[serde(flatten)]
    request: &'a MappingRequest<'a>,
    content: String,
}

impl CommandMapper {
    /// Create a mapper for a program with the default 60 s timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Parse a shell-like command line (whitespace separated).
    pub fn from_command_line(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::Config("empty mapper command".to_string()))?;
        Ok(Self::new(program).with_args(parts.map(str::to_string).collect()))
    }

    /// Set the program arguments.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl SemanticMapper for CommandMapper {
    fn name(&self) -> &str {
        &self.program
    }

    fn map_chunk(&self, request: &MappingRequest<'_>) -> Result<String> {
        let payload = serde_json::to_vec(&WireRequest {
            request,
            content: request.content_summary(),
        })?;

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        let output = run_with_timeout(command, Some(payload), self.timeout, Error::Mapper)?
            .check(&self.program, Error::Mapper)?;
        Ok(output.stdout)
    }
}
