//! Session state: the draft, persona, spend, and history of one user session.
//!
//! States: `Empty` → `HasDraft` → `HasDraft` (refine loops). There is no way
//! back to `Empty`. Only successful calls transition; a failed generate or
//! refine never touches the session, so the last good draft stays visible.

pub mod handlers;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::client::GenerationOutput;
use crate::persona::Persona;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Empty,
    HasDraft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Generate,
    Refine,
}

/// One successful transition, in order.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub mode: GenerationMode,
    pub persona_id: String,
    pub feedback: Option<String>,
    pub latency_seconds: f64,
    pub cost_usd: f64,
    pub at: DateTime<Utc>,
}

/// What a refine call needs from the session, borrowed for prompt building.
#[derive(Debug)]
pub struct RefineTarget<'a> {
    pub persona: &'a Persona,
    pub draft: &'a str,
    pub feedback: &'a str,
}

#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    current_draft: Option<GenerationOutput>,
    active_persona: Option<Persona>,
    cumulative_cost_usd: f64,
    history: Vec<HistoryEntry>,
}

/// Read-only view handed to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub phase: SessionPhase,
    pub current_draft: Option<GenerationOutput>,
    pub active_persona: Option<Persona>,
    pub cumulative_cost_usd: f64,
    pub history: Vec<HistoryEntry>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            current_draft: None,
            active_persona: None,
            cumulative_cost_usd: 0.0,
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.current_draft.is_some() {
            SessionPhase::HasDraft
        } else {
            SessionPhase::Empty
        }
    }

    pub fn current_draft(&self) -> Option<&GenerationOutput> {
        self.current_draft.as_ref()
    }

    pub fn active_persona(&self) -> Option<&Persona> {
        self.active_persona.as_ref()
    }

    pub fn cumulative_cost_usd(&self) -> f64 {
        self.cumulative_cost_usd
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            created_at: self.created_at,
            phase: self.phase(),
            current_draft: self.current_draft.clone(),
            active_persona: self.active_persona.clone(),
            cumulative_cost_usd: self.cumulative_cost_usd,
            history: self.history.clone(),
        }
    }

    /// Checks a refine request before any backend work.
    ///
    /// Blank feedback and a session without a draft are both validation errors.
    pub fn refine_target<'a>(&'a self, feedback: &'a str) -> Result<RefineTarget<'a>, AppError> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(AppError::Validation("Feedback cannot be empty".to_string()));
        }

        match (&self.current_draft, &self.active_persona) {
            (Some(draft), Some(persona)) => Ok(RefineTarget {
                persona,
                draft: &draft.text,
                feedback,
            }),
            _ => Err(AppError::Validation(
                "Nothing to refine yet: generate a post first".to_string(),
            )),
        }
    }

    /// `generate` succeeded: the output becomes the draft and `persona` the active persona.
    pub fn record_generation(&mut self, persona: Persona, output: GenerationOutput) {
        self.push_history(GenerationMode::Generate, &persona.id, None, &output);
        self.active_persona = Some(persona);
        self.current_draft = Some(output);
    }

    /// `refine` succeeded: the draft is replaced, the persona stays.
    pub fn record_refinement(&mut self, feedback: &str, output: GenerationOutput) {
        let persona_id = self
            .active_persona
            .as_ref()
            .map(|p| p.id.clone())
            .unwrap_or_default();
        self.push_history(
            GenerationMode::Refine,
            &persona_id,
            Some(feedback.trim().to_string()),
            &output,
        );
        self.current_draft = Some(output);
    }

    fn push_history(
        &mut self,
        mode: GenerationMode,
        persona_id: &str,
        feedback: Option<String>,
        output: &GenerationOutput,
    ) {
        // Costs come from unsigned token counts; clamp so the total can only grow.
        let cost = output.estimated_cost_usd.max(0.0);
        self.cumulative_cost_usd += cost;
        self.history.push(HistoryEntry {
            mode,
            persona_id: persona_id.to_string(),
            feedback,
            latency_seconds: output.latency_seconds,
            cost_usd: cost,
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn output(text: &str, cost: f64) -> GenerationOutput {
        GenerationOutput {
            text: text.to_string(),
            latency_seconds: 0.5,
            estimated_cost_usd: cost,
        }
    }

    fn po() -> Persona {
        Persona::new("po", "Po Bronson", "po.txt")
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(session.current_draft().is_none());
        assert!(session.active_persona().is_none());
        assert_eq!(session.cumulative_cost_usd(), 0.0);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_generation_moves_to_has_draft() {
        let mut session = Session::new();
        session.record_generation(po(), output("draft one", 0.001));

        assert_eq!(session.phase(), SessionPhase::HasDraft);
        assert_eq!(session.current_draft().unwrap().text, "draft one");
        assert_eq!(session.active_persona().unwrap().id, "po");
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].mode, GenerationMode::Generate);
    }

    #[test]
    fn test_cost_accumulates_across_generations() {
        let mut session = Session::new();
        session.record_generation(po(), output("a", 0.001));
        session.record_generation(po(), output("b", 0.002));
        assert!((session.cumulative_cost_usd() - 0.003).abs() < 1e-9);

        let history_total: f64 = session.history().iter().map(|h| h.cost_usd).sum();
        assert!((history_total - session.cumulative_cost_usd()).abs() < 1e-12);
    }

    #[test]
    fn test_refinement_replaces_draft_and_keeps_persona() {
        let mut session = Session::new();
        session.record_generation(po(), output("original", 0.001));
        session.record_refinement("  shorter please ", output("refined", 0.0005));

        assert_eq!(session.current_draft().unwrap().text, "refined");
        assert_eq!(session.active_persona().unwrap().id, "po");
        assert!((session.cumulative_cost_usd() - 0.0015).abs() < 1e-9);

        let last = session.history().last().unwrap();
        assert_eq!(last.mode, GenerationMode::Refine);
        assert_eq!(last.feedback.as_deref(), Some("shorter please"));
        assert_eq!(last.persona_id, "po");
    }

    #[test]
    fn test_refine_target_rejects_blank_feedback() {
        let mut session = Session::new();
        session.record_generation(po(), output("keep me", 0.001));

        for feedback in ["", "   ", "\n\t"] {
            let err = session.refine_target(feedback).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert_eq!(session.current_draft().unwrap().text, "keep me");
    }

    #[test]
    fn test_refine_target_requires_a_draft() {
        let session = Session::new();
        let err = session.refine_target("make it punchier").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("generate a post first"));
    }

    #[test]
    fn test_refine_target_borrows_draft_and_persona() {
        let mut session = Session::new();
        session.record_generation(po(), output("the draft", 0.0));

        let target = session.refine_target("  add emojis ").unwrap();
        assert_eq!(target.persona.name, "Po Bronson");
        assert_eq!(target.draft, "the draft");
        assert_eq!(target.feedback, "add emojis");
    }

    #[test]
    fn test_snapshot_serializes_phase() {
        let mut session = Session::new();
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["phase"], "empty");
        assert!(json["current_draft"].is_null());

        session.record_generation(po(), output("x", 0.25));
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["phase"], "has_draft");
        assert_eq!(json["current_draft"]["text"], "x");
        assert_eq!(json["cumulative_cost_usd"], 0.25);
        assert_eq!(json["history"][0]["mode"], "generate");
    }
}
