use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// The inbound "fetch document HTML" collaborator. Every failure is handled
/// the same way by the session, so implementations only need to describe it.
pub trait DocumentSource {
    fn fetch(&self) -> Result<String>;

    /// Human-readable origin for logs and manifests.
    fn describe(&self) -> String;
}

/// Reads a document from disk, or from stdin when the path is `-`.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        if self.is_stdin() {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read document from stdin")?;
            return Ok(bytes);
        }
        fs::read(&self.path).with_context(|| format!("failed to read {}", self.path.display()))
    }
}

impl DocumentSource for FileSource {
    fn fetch(&self) -> Result<String> {
        let bytes = self.read_bytes()?;
        let html = String::from_utf8(bytes)
            .with_context(|| format!("{} is not valid UTF-8", self.describe()))?;
        if html.trim().is_empty() {
            bail!("{} is empty", self.describe());
        }
        Ok(html)
    }

    fn describe(&self) -> String {
        if self.is_stdin() {
            "<stdin>".to_string()
        } else {
            self.path.display().to_string()
        }
    }
}

/// An in-memory payload, or a canned failure.
#[derive(Debug, Clone)]
pub struct StaticSource {
    payload: std::result::Result<String, String>,
}

impl StaticSource {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            payload: Ok(html.into()),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            payload: Err(reason.into()),
        }
    }
}

impl DocumentSource for StaticSource {
    fn fetch(&self) -> Result<String> {
        match &self.payload {
            Ok(html) => Ok(html.clone()),
            Err(reason) => bail!("fetch failed: {reason}"),
        }
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
