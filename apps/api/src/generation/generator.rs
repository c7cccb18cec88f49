//! Post Generation: orchestrates the full generate and refine pipelines.
//!
//! Generate: validate → credential → load persona → resolve source →
//!           build prompt → LLM generate → session transition.
//! Refine:   validate feedback/draft → credential → build refine prompt →
//!           LLM generate → session transition.
//!
//! The session is only mutated after the backend call succeeds. Every early
//! return leaves it exactly as it was.

use tracing::{debug, info};

use crate::content::fetcher::ContentFetcher;
use crate::content::SourceContent;
use crate::errors::AppError;
use crate::generation::client::{GenerationClient, GenerationOutput};
use crate::generation::prompts::{build_generate_prompt, build_refine_prompt};
use crate::persona::{Persona, PersonaCorpus};
use crate::session::Session;

pub struct Ghostwriter {
    corpus: PersonaCorpus,
    fetcher: ContentFetcher,
    client: GenerationClient,
}

impl Ghostwriter {
    pub fn new(corpus: PersonaCorpus, fetcher: ContentFetcher, client: GenerationClient) -> Self {
        Self {
            corpus,
            fetcher,
            client,
        }
    }

    pub fn personas(&self) -> &[Persona] {
        self.corpus.list()
    }

    /// Writes a fresh post for `persona_id` from `source`.
    ///
    /// Validation and configuration failures are raised before any network I/O.
    pub async fn generate(
        &self,
        session: &mut Session,
        persona_id: &str,
        source: &SourceContent,
    ) -> Result<GenerationOutput, AppError> {
        self.corpus.find(persona_id)?;
        self.client.ensure_configured()?;

        let sample = self.corpus.load(persona_id).await?;
        let source_text = source.resolve(&self.fetcher).await?;

        info!(
            "Generating post as {} from {} chars of source",
            sample.persona.name,
            source_text.chars().count()
        );

        let prompt = build_generate_prompt(&sample.persona.name, &sample.text, &source_text);
        let output = self.client.generate(&prompt).await?;

        session.record_generation(sample.persona, output.clone());
        log_session_totals(session);
        Ok(output)
    }

    /// Rewrites the current draft to address `feedback`.
    pub async fn refine(
        &self,
        session: &mut Session,
        feedback: &str,
    ) -> Result<GenerationOutput, AppError> {
        let prompt = {
            let target = session.refine_target(feedback)?;
            self.client.ensure_configured()?;
            info!("Refining draft for {}", target.persona.name);
            build_refine_prompt(&target.persona.name, target.draft, target.feedback)
        };

        let output = self.client.generate(&prompt).await?;

        session.record_refinement(feedback, output.clone());
        log_session_totals(session);
        Ok(output)
    }
}

fn log_session_totals(session: &Session) {
    debug!(
        "Session total ${:.6} over {} calls",
        session.cumulative_cost_usd(),
        session.history().len()
    );
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
