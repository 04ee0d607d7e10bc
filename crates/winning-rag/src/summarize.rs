//! Prompted answers over retrieved context.

use winning_core::TableKind;

use crate::{
  NOT_FOUND_REPLY, Rag, Result,
  index::{Embedder, MetadataFilter, TextGenerator, VectorIndex},
  retrieve::dedup_texts,
};

const SEASON_SUMMARY_SYSTEM: &str = "\
Eres un analista financiero de un club de fútbol. Cada línea del CONTEXTO es \
una fila de datos que comienza con metadatos [tipo=... club=... season=...]. \
Las filas tipo=altas son compras y su campo amount es lo que el club pagó; \
las filas tipo=bajas son ventas y su campo amount es lo que el club cobró. \
Un amount no numérico (por ejemplo 'Libre / Cesión') cuenta como 0. \
Informa: gasto total (suma de amount de altas), ingreso total (suma de amount \
de bajas) y balance neto (ingreso total menos gasto total), calculados \
EXCLUSIVAMENTE con el CONTEXTO. Luego comenta brevemente las operaciones más \
relevantes. No inventes cifras ni jugadores. Si el contexto no alcanza, \
responde exactamente: 'No encuentro esa información en los datos disponibles.'";

const SQUAD_ANALYSIS_SYSTEM: &str = "\
Eres un analista deportivo. Cada línea del CONTEXTO es una fila de la \
plantilla o de las valoraciones de mercado de un club, precedida por \
metadatos [tipo=... club=... season=...]. Analiza la profundidad del plantel: \
distribución de edades, equilibrio por posición, puestos con poca cobertura y \
jugadores de mayor valor. No hagas cálculos financieros. Usa EXCLUSIVAMENTE el \
CONTEXTO; si no alcanza, responde exactamente: 'No encuentro esa información \
en los datos disponibles.'";

const QUESTION_SYSTEM: &str = "\
Eres un asistente experto en finanzas y mercado de pases. Cada línea de \
CONTEXTO puede comenzar con metadatos del tipo [tipo=... club=... season=...]. \
Cuando te pregunten en qué club juega un jugador, toma el valor de 'club=' de \
esos metadatos como club actual de referencia, incluso si en el texto aparecen \
otros clubes históricos. No inventes datos y responde usando EXCLUSIVAMENTE la \
información del CONTEXTO. Si la respuesta no está claramente en el contexto, \
responde exactamente: 'No encuentro esa información en los datos disponibles.'";

/// The user turn sent with every prompt.
pub(crate) fn user_prompt(context: &str, question: &str) -> String {
  format!("CONTEXTO:\n{context}\n\nPREGUNTA: {question}")
}

impl<I, E, G> Rag<I, E, G>
where
  I: VectorIndex,
  E: Embedder,
  G: TextGenerator,
{
  /// Answer from `context`, or the not-found reply without calling the
  /// generator when there is none.
  async fn answer_from(&self, system: &str, context: &str, question: &str) -> Result<String> {
    if context.trim().is_empty() {
      tracing::debug!(question, "empty context");
      return Ok(NOT_FOUND_REPLY.to_string());
    }
    self.generate(system, &user_prompt(context, question)).await
  }

  /// Spending, income and net balance of `club`'s transfer activity in
  /// `season`, as computed by the generator from the ledger rows.
  pub async fn season_summary(&self, club: &str, season: &str) -> Result<String> {
    let mut texts = Vec::new();
    for kinds in [
      &[TableKind::Bajas][..],
      &[TableKind::Altas][..],
      &[TableKind::Players, TableKind::Valuations][..],
    ] {
      texts.extend(self.scoped_texts(club, season, kinds).await?);
    }
    let context = dedup_texts(texts).join("\n");

    let question = format!(
      "Resume la temporada {season} del club {club}: gasto total, ingreso total y balance neto."
    );
    let summary = self
      .answer_from(SEASON_SUMMARY_SYSTEM, &context, &question)
      .await?;
    tracing::info!(club, season, "season summary generated");
    Ok(summary)
  }

  /// Qualitative squad-depth analysis from roster and valuation rows.
  pub async fn squad_analysis(&self, club: &str, season: &str) -> Result<String> {
    let context = self
      .get_context(club, season, &[TableKind::Players, TableKind::Valuations])
      .await?;
    let question = format!("Analiza la profundidad del plantel del club {club} en la temporada {season}.");
    let analysis = self
      .answer_from(SQUAD_ANALYSIS_SYSTEM, &context, &question)
      .await?;
    tracing::info!(club, season, "squad analysis generated");
    Ok(analysis)
  }

  /// Free-form question over the whole index.
  pub async fn answer_question(&self, question: &str) -> Result<String> {
    let hits = self
      .search(question, self.config.question_top_k, &MetadataFilter::new())
      .await?;
    let context = hits.into_iter().map(|h| h.text).collect::<Vec<_>>().join("\n");
    self.answer_from(QUESTION_SYSTEM, &context, question).await
  }
}
