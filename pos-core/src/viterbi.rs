//! # Algoritmo de Viterbi — Decodificação do HMM
//!
//! O Viterbi é um método de **programação dinâmica** que encontra a sequência
//! de tags mais provável sem enumerar as `T^N` sequências possíveis: o melhor
//! caminho até o token `i` com tag `t` depende apenas dos melhores caminhos
//! até o token `i-1` → `O(N × T²)`.
//!
//! ## Algoritmo
//!
//! ```text
//! Inicialização: v[0][t]   = P(t | START) · e(x_0, t)
//!
//! Recursão:      v[i][t]   = max_{t'} [ v[i-1][t'] · P(t | t') ] · e(x_i, t)
//!                bp[i-1][t] = argmax_{t'} ...
//!
//! Finalização:   último     = argmax_t v[N-1][t] · P(END | t)
//!
//! Backtracking:  segue bp de END até a posição 0
//! ```
//!
//! `e(x, t)` vem da tabela de emissão quando o par foi observado e do
//! [`Smoother`] caso contrário. Transições ausentes valem 0 e não são suavizadas.
//!
//! ## Desempate
//!
//! As tags são percorridas em ordem lexicográfica e só um score
//! **estritamente** maior substitui o atual: em caso de empate vence a
//! primeira tag em ordem alfabética.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::lattice::{BackpointerStore, ScoreSpace, ViterbiLattice};
use crate::smoothing::Smoother;
use crate::tables::HmmTables;
use crate::tagger::TaggedToken;
use crate::vocab::{TagVocabulary, END_TAG, START_TAG};

/// Resultado completo do Viterbi.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViterbiResult {
    /// Um par `(token, tag)` por token de entrada.
    pub tagged: Vec<TaggedToken>,
    /// Tabela completa de scores (para visualização e inspeção).
    pub lattice: ViterbiLattice,
    pub backpointers: BackpointerStore,
    /// Score do melhor caminho, incluindo a transição para `END`.
    #[serde(with = "crate::lattice::score")]
    pub best_score: f64,
}

impl ViterbiResult {
    /// Probabilidade linear do melhor caminho, qualquer que seja o espaço de score.
    pub fn best_probability(&self) -> f64 {
        self.lattice.space().to_probability(self.best_score)
    }
}

/// Executa o Viterbi sobre uma sequência de tokens.
///
/// # Parâmetros
/// - `tags`: vocabulário ordenado (sem sentinelas)
/// - `tables`: emissões e transições treinadas
/// - `smoother`: fallback para emissões não observadas
/// - `tokens`: sequência já tokenizada
/// - `space`: produto linear ou soma de logs
pub fn viterbi_decode<S: AsRef<str>>(
    tags: &TagVocabulary,
    tables: &HmmTables,
    smoother: &dyn Smoother,
    tokens: &[S],
    space: ScoreSpace,
) -> ViterbiResult {
    let labels = tags.labels();
    let n_tokens = tokens.len();
    let n_tags = labels.len();

    let mut lattice = ViterbiLattice::new(
        labels.to_vec(),
        tokens.iter().map(|t| t.as_ref().to_string()).collect(),
        space,
    );
    let mut backpointers = BackpointerStore::new(n_tokens, n_tags);

    if n_tokens == 0 || n_tags == 0 {
        if n_tokens > 0 {
            warn!(tokens = n_tokens, "decodificação com modelo sem tags (não treinado)");
        }
        return ViterbiResult {
            tagged: Vec::new(),
            lattice,
            backpointers,
            best_score: space.zero(),
        };
    }

    // Transições pré-computadas por id: evita hashing de strings no laço O(N × T²).
    let start: Vec<f64> = labels
        .iter()
        .map(|t| space.lift(tables.transition(START_TAG, t)))
        .collect();
    let end: Vec<f64> = labels
        .iter()
        .map(|t| space.lift(tables.transition(t, END_TAG)))
        .collect();
    let transition: Vec<Vec<f64>> = labels
        .iter()
        .map(|prev| {
            labels
                .iter()
                .map(|curr| space.lift(tables.transition(prev, curr)))
                .collect()
        })
        .collect();

    let emission = |token: &str, tag: &str| -> f64 {
        let prob = tables
            .emission(token, tag)
            .unwrap_or_else(|| smoother.resolve(tag, token));
        space.lift(prob)
    };

    // === Inicialização (posição 0) ===
    let first = tokens[0].as_ref();
    let mut prev_column: Vec<f64> = labels
        .iter()
        .enumerate()
        .map(|(t, tag)| space.combine(start[t], emission(first, tag.as_str())))
        .collect();
    for (t, &score) in prev_column.iter().enumerate() {
        lattice.set(0, t, score);
    }

    // === Recursão (posições 1..N-1) ===
    for pos in 1..n_tokens {
        let token = tokens[pos].as_ref();
        let mut column = Vec::with_capacity(n_tags);

        for (t, tag) in labels.iter().enumerate() {
            let (best_prev, best_score) = first_max(
                prev_column
                    .iter()
                    .enumerate()
                    .map(|(p, &score)| space.combine(score, transition[p][t])),
            );
            let score = space.combine(best_score, emission(token, tag.as_str()));

            backpointers.set(pos - 1, t, best_prev);
            lattice.set(pos, t, score);
            column.push(score);
        }

        trace!(pos, token, "coluna do reticulado preenchida");
        prev_column = column;
    }

    // === Finalização (transição para END) ===
    let (best_last, best_score) = first_max(
        prev_column
            .iter()
            .enumerate()
            .map(|(t, &score)| space.combine(score, end[t])),
    );
    backpointers.set_end(best_last);

    // === Backtracking ===
    let tagged = backpointers
        .path()
        .into_iter()
        .zip(tokens)
        .map(|(tag_id, token)| TaggedToken::new(token.as_ref(), &labels[tag_id]))
        .collect();

    ViterbiResult {
        tagged,
        lattice,
        backpointers,
        best_score,
    }
}

/// Retorna (índice, valor) do **primeiro** máximo.
///
/// Só um valor estritamente maior substitui o atual, então empates (inclusive
/// colunas inteiras de zeros ou `-inf`) resolvem para o menor índice.
fn first_max(scores: impl Iterator<Item = f64>) -> (usize, f64) {
    let mut best = (0usize, f64::NEG_INFINITY);
    for (i, score) in scores.enumerate() {
        if i == 0 || score > best.1 {
            best = (i, score);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::TaggedSentence;
    use crate::smoothing::{ConstantSmoother, FixedTagSmoother};
    use crate::trainer::HmmTrainer;

    fn dog_model() -> (TagVocabulary, HmmTables) {
        let corpus = vec![TaggedSentence::from_pairs(&[
            ("the", "DET"),
            ("dog", "NOUN"),
            ("runs", "VERB"),
        ])];
        let trained = HmmTrainer::default().fit(&corpus).unwrap();
        (trained.tags, trained.tables)
    }

    fn tags_of(result: &ViterbiResult) -> Vec<&str> {
        result.tagged.iter().map(|t| t.tag.as_str()).collect()
    }

    #[test]
    fn test_decodes_training_sentence() {
        let (tags, tables) = dog_model();
        let result = viterbi_decode(
            &tags,
            &tables,
            &ConstantSmoother::default(),
            &["the", "dog", "runs"],
            ScoreSpace::Probability,
        );
        assert_eq!(tags_of(&result), vec!["DET", "NOUN", "VERB"]);
        assert_eq!(result.lattice.get(0, "DET"), Some(1.0));
        assert_eq!(result.lattice.get(1, "NOUN"), Some(1.0));
        assert_eq!(result.lattice.get(2, "VERB"), Some(1.0));
        assert_eq!(result.best_probability(), 1.0);
        assert_eq!(result.backpointers.end(), tags.id("VERB"));
        assert_eq!(result.backpointers.get(1, 2), tags.id("NOUN"));
    }

    #[test]
    fn test_empty_input() {
        let (tags, tables) = dog_model();
        let tokens: [&str; 0] = [];
        let result = viterbi_decode(
            &tags,
            &tables,
            &ConstantSmoother::default(),
            &tokens,
            ScoreSpace::Probability,
        );
        assert!(result.tagged.is_empty());
        assert!(result.lattice.is_empty());
    }

    #[test]
    fn test_untrained_model_returns_empty() {
        let result = viterbi_decode(
            &TagVocabulary::default(),
            &HmmTables::default(),
            &ConstantSmoother::default(),
            &["anything"],
            ScoreSpace::Probability,
        );
        assert!(result.tagged.is_empty());
    }

    #[test]
    fn test_missing_transitions_are_not_smoothed() {
        let (tags, tables) = dog_model();
        // Suavização generosa: mesmo assim START->NOUN não existe, logo a célula é 0
        let result = viterbi_decode(
            &tags,
            &tables,
            &FixedTagSmoother::new("NOUN"),
            &["cat"],
            ScoreSpace::Probability,
        );
        assert_eq!(result.lattice.get(0, "NOUN"), Some(0.0));
        assert_eq!(result.tagged.len(), 1);
    }

    #[test]
    fn test_all_zero_row_breaks_ties_alphabetically() {
        let (tags, tables) = dog_model();
        let result = viterbi_decode(
            &tags,
            &tables,
            &FixedTagSmoother::new("ADJ"),
            &["zzz", "yyy"],
            ScoreSpace::Probability,
        );
        assert!(result.lattice.cells().all(|(_, _, score)| score == 0.0));
        assert_eq!(tags_of(&result), vec!["DET", "DET"]);
    }

    #[test]
    fn test_log_space_agrees_with_linear() {
        let (tags, tables) = dog_model();
        let smoother = ConstantSmoother::default();
        let tokens = ["the", "dog", "sleeps"];

        let linear = viterbi_decode(&tags, &tables, &smoother, &tokens, ScoreSpace::Probability);
        let log = viterbi_decode(&tags, &tables, &smoother, &tokens, ScoreSpace::LogProbability);

        assert_eq!(linear.tagged, log.tagged);
        let expected = linear.best_probability();
        assert!((log.best_probability() - expected).abs() <= expected * 1e-9);
    }

    #[test]
    fn test_impossible_log_result_survives_json() {
        let (tags, tables) = dog_model();
        // START -> VERB nunca foi visto: em log o único caminho vale -inf
        let result = viterbi_decode(
            &tags,
            &tables,
            &FixedTagSmoother::new("ADJ"),
            &["runs"],
            ScoreSpace::LogProbability,
        );
        assert_eq!(result.best_score, f64::NEG_INFINITY);

        let json = serde_json::to_string(&result).unwrap();
        let back: ViterbiResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.best_probability(), 0.0);
    }

    #[test]
    fn test_first_max_keeps_first_on_tie() {
        assert_eq!(first_max([0.5, 0.9, 0.9, 0.1].into_iter()), (1, 0.9));
        assert_eq!(first_max([0.0, 0.0].into_iter()), (0, 0.0));
        let (i, v) = first_max([f64::NEG_INFINITY, f64::NEG_INFINITY].into_iter());
        assert_eq!(i, 0);
        assert_eq!(v, f64::NEG_INFINITY);
    }
}
