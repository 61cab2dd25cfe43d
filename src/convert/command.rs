//! Conversion through an external program.

use super::FormatConverter;
use crate::error::{Error, Result};
use crate::process::run_with_timeout;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Runs a program to convert a file.
///
/// Arguments may contain `{input}`, `{output}` and `{outdir}` placeholders.
/// Programs that name their output themselves (writing `<stem>.<target>`
/// into `{outdir}`) are supported: that file is moved to the requested
/// output path.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
    source: String,
    target: String,
    timeout: Duration,
}

impl CommandConverter {
    /// Create a converter from `source` to `target` files with a 120 s
    /// timeout and the default `{input} {output}` arguments.
    pub fn new(program: impl Into<String>, source: &str, target: &str) -> Self {
        Self {
            program: program.into(),
            args: vec!["{input}".to_string(), "{output}".to_string()],
            source: source.trim_start_matches('.').to_lowercase(),
            target: target.trim_start_matches('.').to_lowercase(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Set the argument template.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the conversion timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn expand_args(&self, input: &Path, output: &Path, outdir: &Path) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
                    .replace("{outdir}", &outdir.to_string_lossy())
            })
            .collect()
    }

    /// Where a self-naming program leaves its result.
    fn implied_output(&self, input: &Path, outdir: &Path) -> Option<PathBuf> {
        let stem = input.file_stem()?;
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(&self.target);
        Some(outdir.join(name))
    }
}

impl FormatConverter for CommandConverter {
    fn source_extension(&self) -> &str {
        &self.source
    }

    fn target_extension(&self) -> &str {
        &self.target
    }

    fn name(&self) -> &str {
        &self.program
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        if !input.is_file() {
            return Err(Error::Conversion(format!(
                "{} does not exist",
                input.display()
            )));
        }
        let outdir = match output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&outdir)?;

        let mut command = Command::new(&self.program);
        command.args(self.expand_args(input, output, &outdir));
        run_with_timeout(command, None, self.timeout, Error::Conversion)?
            .check(&self.program, Error::Conversion)?;

        if output.is_file() {
            return Ok(());
        }
        match self.implied_output(input, &outdir) {
            Some(produced) if produced.is_file() => {
                fs::rename(&produced, output)?;
                Ok(())
            }
            _ => Err(Error::Conversion(format!(
                "{} finished without producing {}",
                self.program,
                output.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_placeholders() {
        let converter = CommandConverter::new("tool", ".DOCX", "pdf")
            .with_args(["--in={input}", "-o", "{output}", "--dir", "{outdir}"]);
        let args = converter.expand_args(
            Path::new("/tmp/a.docx"),
            Path::new("/out/a.pdf"),
            Path::new("/out"),
        );
        assert_eq!(args, vec!["--in=/tmp/a.docx", "-o", "/out/a.pdf", "--dir", "/out"]);
        assert_eq!(converter.source_extension(), "docx");
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = CommandConverter::new("cp", "docx", "pdf")
            .convert(&dir.path().join("none.docx"), &dir.path().join("none.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_program_produces_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.docx");
        fs::write(&input, b"content").unwrap();
        let output = dir.path().join("out").join("report.pdf");

        CommandConverter::new("cp", "docx", "pdf")
            .convert(&input, &output)
            .unwrap();
        assert_eq!(fs::read(&output).unwrap(), b"content");
    }

    #[cfg(unix)]
    #[test]
    fn test_self_naming_program() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.docx");
        fs::write(&input, b"content").unwrap();
        let output = dir.path().join("final.pdf");

        // writes <outdir>/report.pdf, not the requested name
        CommandConverter::new("cp", "docx", "pdf")
            .with_args(["{input}", "{outdir}/report.pdf"])
            .convert(&input, &output)
            .unwrap();
        assert!(output.is_file());
        assert!(!dir.path().join("report.pdf").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_program_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.docx");
        fs::write(&input, b"content").unwrap();

        let err = CommandConverter::new("false", "docx", "pdf")
            .convert(&input, &dir.path().join("report.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }
}
