//! The chat agent: a deterministic path for "which club does X play for"
//! and a history-aware free-form path for everything else.

use serde::{Deserialize, Serialize};

use crate::{
  NOT_FOUND_REPLY, Rag, Result,
  index::{Embedder, TextGenerator, VectorIndex},
};

/// One earlier turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
  /// `"user"` for the person asking; anything else is the agent.
  pub from_role: String,
  pub text:      String,
}

const CURRENT_CLUB_TRIGGERS: [&str; 3] = ["en que club juega", "en qué club juega", "club actual"];

/// The player named in a current-club question, if `question` is one.
///
/// The name is whatever follows the last "juega", or the whole question
/// when it only mentions "club actual".
pub fn current_club_subject(question: &str) -> Option<String> {
  let question = question.trim();
  let lower = question.to_lowercase();
  if !CURRENT_CLUB_TRIGGERS.iter().any(|t| lower.contains(t)) {
    return None;
  }
  let strip = |s: &str| s.trim_matches([' ', '?', '¿', '.', ',']).to_string();

  let Some(idx) = lower.rfind("juega") else {
    return Some(strip(question));
  };
  let start = idx + "juega".len();
  let tail = if lower.len() == question.len() {
    question.get(start..).unwrap_or(&lower[start..])
  } else {
    &lower[start..]
  };
  Some(strip(tail))
}

/// Fold earlier turns into the question so retrieval and generation see
/// the conversation.
pub fn fold_history(history: &[AgentMessage], question: &str) -> String {
  if history.is_empty() {
    return question.to_string();
  }
  let lines = history
    .iter()
    .map(|m| {
      let who = if m.from_role == "user" { "Usuario" } else { "Agente" };
      format!("{who}: {}", m.text)
    })
    .collect::<Vec<_>>()
    .join("\n");
  format!("Historial de conversación:\n{lines}\n\nPregunta actual: {question}")
}

impl<I, E, G> Rag<I, E, G>
where
  I: VectorIndex,
  E: Embedder,
  G: TextGenerator,
{
  pub async fn agent_reply(&self, question: &str, history: &[AgentMessage]) -> Result<String> {
    let question = question.trim();
    if let Some(player) = current_club_subject(question) {
      let club = self.player_current_club(&player).await?;
      if club == NOT_FOUND_REPLY {
        return Ok(club);
      }
      return Ok(format!("{player} juega actualmente en {club}."));
    }
    self.answer_question(&fold_history(history, question)).await
  }
}
