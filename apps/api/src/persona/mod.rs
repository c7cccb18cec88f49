//! Persona corpus: the named writing-style samples a post can be modelled on.
//!
//! Samples are plain-text files under `PERSONA_DIR`. They are read fresh on
//! every request so edits to a sample take effect without a restart.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::errors::{AppError, ConfigError};

/// A selectable persona. `id` is what clients send back on generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub file_name: String,
    pub source_url: Option<String>,
}

impl Persona {
    pub fn new(id: &str, name: &str, file_name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            file_name: file_name.to_string(),
            source_url: None,
        }
    }

    pub fn with_source_url(mut self, url: &str) -> Self {
        self.source_url = Some(url.to_string());
        self
    }
}

/// A loaded style sample. Never cached across requests.
#[derive(Debug, Clone)]
pub struct StyleSample {
    pub persona: Persona,
    pub text: String,
}

const SAMPLE_BASE_URL: &str = "https://raw.githubusercontent.com/benjpy/113_Social_Posts/main";

/// The personas shipped with the app.
pub fn default_personas() -> Vec<Persona> {
    [
        ("sosv", "SOSV", "sosv.txt"),
        ("sean", "Sean O'Sullivan", "sean.txt"),
        ("po", "Po Bronson", "po.txt"),
    ]
    .into_iter()
    .map(|(id, name, file)| {
        Persona::new(id, name, file).with_source_url(&format!("{SAMPLE_BASE_URL}/{file}"))
    })
    .collect()
}

#[derive(Debug, Clone)]
pub struct PersonaCorpus {
    dir: PathBuf,
    personas: Vec<Persona>,
}

impl PersonaCorpus {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_personas(dir, default_personas())
    }

    pub fn with_personas(dir: impl Into<PathBuf>, personas: Vec<Persona>) -> Self {
        Self {
            dir: dir.into(),
            personas,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn list(&self) -> &[Persona] {
        &self.personas
    }

    /// Looks up a persona by id. An unknown id is a bad request, not a config problem.
    pub fn find(&self, id: &str) -> Result<&Persona, AppError> {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::Validation(format!("Unknown persona '{id}'")))
    }

    /// Reads the persona's sample file.
    ///
    /// A missing, unreadable, or blank file is a `ConfigError::MissingPersonaFile`.
    pub async fn load(&self, id: &str) -> Result<StyleSample, AppError> {
        let persona = self.find(id)?;
        let path = self.dir.join(&persona.file_name);

        let missing = |reason: String| ConfigError::MissingPersonaFile {
            persona: persona.name.clone(),
            path: path.clone(),
            reason,
        };

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| missing(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(missing("file is empty".to_string()).into());
        }

        debug!(
            "Loaded style sample for {} ({} chars) from {}",
            persona.name,
            text.chars().count(),
            path.display()
        );

        Ok(StyleSample {
            persona: persona.clone(),
            text,
        })
    }
}
