//! # Treinamento do HMM (Estimação por Contagem)
//!
//! O treino é supervisionado e tem duas passadas:
//!
//! 1. **Contagem**: para cada sentença, conta as ocorrências de cada tag, os
//!    pares `(token, tag)` e as transições entre tags. As sentinelas `START` e
//!    `END` são contadas **uma vez por sentença**, independente do tamanho.
//! 2. **Normalização**: converte as contagens em probabilidades.
//!
//! ## Transições com sentinelas
//!
//! ```text
//! anteriores: [START, t1, t2, ..., tn]
//! atuais:     [t1,    t2, ..., tn, END]
//! ```
//!
//! Uma sentença de `n` tokens gera exatamente `n + 1` transições.
//!
//! ## Direção da normalização
//!
//! O modo padrão divide **as duas** tabelas pelo total da tag de
//! *destino*:
//!
//! ```text
//! P(token | tag)  = count(token, tag) / count(tag)
//! P(curr | prev)  = count(prev, curr) / count(curr)     (TargetTag)
//! ```
//!
//! A literatura clássica de HMM divide as transições pelo total da tag de
//! *origem*, `count(prev, curr) / count(prev)`. Esse modo corrigido existe como
//! [`Normalization::SourceTag`] e precisa ser escolhido explicitamente.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::InvalidSequencePolicy;
use crate::corpus::TaggedSentence;
use crate::error::Result;
use crate::tables::HmmTables;
use crate::vocab::{TagVocabulary, END_TAG, START_TAG};

/// Denominador usado na probabilidade de transição.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `count(prev, curr) / count(curr)`, o modo padrão.
    #[default]
    TargetTag,
    /// `count(prev, curr) / count(prev)`, normalização clássica por origem.
    SourceTag,
}

/// Contagens brutas acumuladas no treino.
///
/// Mantidas como valor próprio para que os invariantes de contabilidade
/// possam ser inspecionados antes da normalização.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmmCounts {
    /// Ocorrências de cada tag, incluindo `START` e `END`.
    tag_totals: HashMap<String, u64>,
    /// `token -> tag -> n`
    emissions: HashMap<String, HashMap<String, u64>>,
    /// `prev -> curr -> n`
    transitions: HashMap<String, HashMap<String, u64>>,
    sentences: usize,
}

impl HmmCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acumula uma sentença já validada.
    pub fn observe(&mut self, sentence: &TaggedSentence) {
        for (token, tag) in sentence.pairs() {
            *self
                .emissions
                .entry(token.to_string())
                .or_default()
                .entry(tag.to_string())
                .or_insert(0) += 1;
            *self.tag_totals.entry(tag.to_string()).or_insert(0) += 1;
        }

        // Uma vez por sentença
        *self.tag_totals.entry(START_TAG.to_string()).or_insert(0) += 1;
        *self.tag_totals.entry(END_TAG.to_string()).or_insert(0) += 1;

        let prev_tags = std::iter::once(START_TAG).chain(sentence.tags.iter().map(String::as_str));
        let curr_tags = sentence.tags.iter().map(String::as_str).chain(std::iter::once(END_TAG));
        for (prev, curr) in prev_tags.zip(curr_tags) {
            *self
                .transitions
                .entry(prev.to_string())
                .or_default()
                .entry(curr.to_string())
                .or_insert(0) += 1;
        }

        self.sentences += 1;
    }

    pub fn tag_total(&self, tag: &str) -> u64 {
        self.tag_totals.get(tag).copied().unwrap_or(0)
    }

    pub fn emission_count(&self, token: &str, tag: &str) -> u64 {
        self.emissions
            .get(token)
            .and_then(|row| row.get(tag))
            .copied()
            .unwrap_or(0)
    }

    pub fn transition_count(&self, prev: &str, curr: &str) -> u64 {
        self.transitions
            .get(prev)
            .and_then(|row| row.get(curr))
            .copied()
            .unwrap_or(0)
    }

    /// Soma de todas as contagens de emissão (= número de tokens vistos).
    pub fn total_emissions(&self) -> u64 {
        self.emissions.values().flat_map(|row| row.values()).sum()
    }

    /// Soma de todas as contagens de transição (= tokens + sentenças).
    pub fn total_transitions(&self) -> u64 {
        self.transitions.values().flat_map(|row| row.values()).sum()
    }

    /// Número de sentenças observadas.
    pub fn sentences(&self) -> usize {
        self.sentences
    }

    /// Tokens distintos vistos no treino.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.emissions.keys().map(String::as_str)
    }

    /// Vocabulário de tags ordenado, sem as sentinelas.
    pub fn vocabulary(&self) -> TagVocabulary {
        TagVocabulary::from_tags(self.tag_totals.keys().cloned())
    }

    /// Converte as contagens em probabilidades.
    pub fn normalize(&self, normalization: Normalization) -> HmmTables {
        let mut tables = HmmTables {
            normalization,
            ..HmmTables::default()
        };

        for (token, row) in &self.emissions {
            for (tag, &count) in row {
                let prob = count as f64 / self.tag_total(tag) as f64;
                tables.emission.insert(token, tag, prob);
            }
        }

        for (prev, row) in &self.transitions {
            for (curr, &count) in row {
                let denominator = match normalization {
                    Normalization::TargetTag => self.tag_total(curr),
                    Normalization::SourceTag => self.tag_total(prev),
                };
                tables
                    .transition
                    .insert(prev, curr, count as f64 / denominator as f64);
            }
        }

        tables
    }
}

/// Resultado do treino: tabelas normalizadas e o vocabulário de tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainedHmm {
    pub tables: HmmTables,
    pub tags: TagVocabulary,
}

/// Estimador de máxima verossimilhança para o HMM.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmmTrainer {
    pub normalization: Normalization,
    pub on_invalid: InvalidSequencePolicy,
}

impl HmmTrainer {
    pub fn new(normalization: Normalization, on_invalid: InvalidSequencePolicy) -> Self {
        Self {
            normalization,
            on_invalid,
        }
    }

    /// Acumula as contagens de todo o lote.
    ///
    /// O lote é validado antes de qualquer contagem: com
    /// [`InvalidSequencePolicy::Reject`] a primeira sentença inválida aborta o
    /// treino; com [`InvalidSequencePolicy::SkipAndWarn`] ela é descartada.
    pub fn count(&self, sentences: &[TaggedSentence]) -> Result<HmmCounts> {
        let mut accepted = Vec::with_capacity(sentences.len());
        for (index, sentence) in sentences.iter().enumerate() {
            match sentence.validate(index) {
                Ok(()) => accepted.push(sentence),
                Err(err) => match self.on_invalid {
                    InvalidSequencePolicy::Reject => return Err(err),
                    InvalidSequencePolicy::SkipAndWarn => {
                        warn!(%err, "sentença de treino descartada");
                    }
                },
            }
        }

        let mut counts = HmmCounts::new();
        for sentence in accepted {
            counts.observe(sentence);
        }
        Ok(counts)
    }

    /// Treina: contagem + normalização. Entrada vazia gera tabelas vazias.
    pub fn fit(&self, sentences: &[TaggedSentence]) -> Result<TrainedHmm> {
        let counts = self.count(sentences)?;
        let tags = counts.vocabulary();
        let tables = counts.normalize(self.normalization);

        debug!(
            sentences = counts.sentences(),
            tags = tags.len(),
            tokens = tables.emission.len(),
            normalization = ?self.normalization,
            "HMM treinado"
        );

        Ok(TrainedHmm { tables, tags })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::demo_corpus;
    use crate::error::PosError;

    fn dog_sentence() -> TaggedSentence {
        TaggedSentence::from_pairs(&[("the", "DET"), ("dog", "NOUN"), ("runs", "VERB")])
    }

    #[test]
    fn test_single_sentence_probabilities() {
        let trained = HmmTrainer::default().fit(&[dog_sentence()]).unwrap();
        assert_eq!(trained.tables.emission("dog", "NOUN"), Some(1.0));
        assert_eq!(trained.tables.transition("DET", "NOUN"), 1.0);
        assert_eq!(trained.tables.transition(START_TAG, "DET"), 1.0);
        assert_eq!(trained.tables.transition("VERB", END_TAG), 1.0);
        assert_eq!(trained.tags.labels(), &["DET", "NOUN", "VERB"]);
    }

    #[test]
    fn test_emission_counts_sum_to_tag_totals() {
        let corpus = demo_corpus();
        let counts = HmmTrainer::default().count(&corpus).unwrap();

        for tag in counts.vocabulary().labels() {
            let sum: u64 = counts.tokens().map(|w| counts.emission_count(w, tag)).sum();
            assert_eq!(sum, counts.tag_total(tag), "tag {tag}");
        }
    }

    #[test]
    fn test_transition_events_per_sentence() {
        let corpus = demo_corpus();
        let counts = HmmTrainer::default().count(&corpus).unwrap();

        let tokens: usize = corpus.iter().map(TaggedSentence::len).sum();
        assert_eq!(counts.total_emissions(), tokens as u64);
        assert_eq!(counts.total_transitions(), (tokens + corpus.len()) as u64);
        assert_eq!(counts.tag_total(START_TAG), corpus.len() as u64);
        assert_eq!(counts.tag_total(END_TAG), corpus.len() as u64);
    }

    #[test]
    fn test_target_tag_normalization() {
        // DET aparece 2x, NOUN 2x; DET->NOUN 2x, START->DET 2x
        let corpus = vec![
            TaggedSentence::from_pairs(&[("the", "DET"), ("dog", "NOUN")]),
            TaggedSentence::from_pairs(&[("a", "DET"), ("cat", "NOUN"), ("runs", "VERB")]),
        ];
        let trained = HmmTrainer::default().fit(&corpus).unwrap();
        // count(NOUN, END) = 1, count(END) = 2
        assert_eq!(trained.tables.transition("NOUN", END_TAG), 0.5);
        // count(NOUN, VERB) = 1, count(VERB) = 1
        assert_eq!(trained.tables.transition("NOUN", "VERB"), 1.0);
        assert_eq!(trained.tables.emission("dog", "NOUN"), Some(0.5));
    }

    #[test]
    fn test_source_tag_normalization() {
        let corpus = vec![
            TaggedSentence::from_pairs(&[("the", "DET"), ("dog", "NOUN")]),
            TaggedSentence::from_pairs(&[("a", "DET"), ("cat", "NOUN"), ("runs", "VERB")]),
        ];
        let trainer = HmmTrainer::new(Normalization::SourceTag, InvalidSequencePolicy::Reject);
        let trained = trainer.fit(&corpus).unwrap();
        assert_eq!(trained.tables.normalization, Normalization::SourceTag);
        // count(NOUN, VERB) = 1, count(NOUN) = 2
        assert_eq!(trained.tables.transition("NOUN", "VERB"), 0.5);
        assert_eq!(trained.tables.transition("NOUN", END_TAG), 0.5);

        // Com normalização por origem, cada linha soma 1.
        for prev in ["DET", "NOUN", "VERB", START_TAG] {
            let row_sum: f64 = trained.tables.transition.row(prev).unwrap().values().sum();
            assert!((row_sum - 1.0).abs() < 1e-12, "linha {prev}");
        }
    }

    #[test]
    fn test_empty_input_gives_empty_tables() {
        let trained = HmmTrainer::default().fit(&[]).unwrap();
        assert!(trained.tables.is_empty());
        assert!(trained.tags.is_empty());
    }

    #[test]
    fn test_reject_policy() {
        let corpus = vec![dog_sentence(), TaggedSentence::new(["a", "b"], ["DET"])];
        let err = HmmTrainer::default().fit(&corpus).unwrap_err();
        assert!(matches!(err, PosError::InvalidInput { index: 1, .. }));
    }

    #[test]
    fn test_skip_policy() {
        let corpus = vec![TaggedSentence::new(["a", "b"], ["DET"]), dog_sentence()];
        let trainer = HmmTrainer::new(Normalization::TargetTag, InvalidSequencePolicy::SkipAndWarn);
        let counts = trainer.count(&corpus).unwrap();
        assert_eq!(counts.sentences(), 1);
        assert_eq!(counts.emission_count("a", "DET"), 0);
    }
}
