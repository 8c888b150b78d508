//! # Vocabulário de Tags
//!
//! O decodificador trabalha com índices densos (`usize`) em vez de strings:
//! o reticulado e os backpointers são vetores indexados pelo id da tag.
//! O vocabulário guarda a lista **ordenada** das tags, e essa ordem é o
//! contrato de desempate do Viterbi (o primeiro máximo em ordem lexicográfica vence).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PosError, Result};

/// Tag sentinela de início de sentença (nunca emitida na saída).
pub const START_TAG: &str = "START";
/// Tag sentinela de fim de sentença (nunca emitida na saída).
pub const END_TAG: &str = "END";

/// Retorna `true` para as tags reservadas `START` e `END`.
pub fn is_sentinel(tag: &str) -> bool {
    tag == START_TAG || tag == END_TAG
}

/// Conjunto fechado de tags observadas no treino, sem as sentinelas.
///
/// Serializado como a lista de tags; o índice reverso é reconstruído na leitura.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagVocabulary {
    /// Tags em ordem lexicográfica; o índice é o id.
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl TagVocabulary {
    /// Constrói o vocabulário a partir de qualquer coleção de tags.
    ///
    /// Duplicatas e sentinelas são descartadas; o resultado é ordenado.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = tags
            .into_iter()
            .map(Into::into)
            .filter(|t| !is_sentinel(t))
            .collect();
        labels.sort();
        labels.dedup();

        let index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();

        Self { labels, index }
    }

    /// Id de uma tag, se registrada.
    pub fn id(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Forma textual de um id. Ids fora do vocabulário são um erro, nunca "dão a volta".
    pub fn label(&self, id: usize) -> Result<&str> {
        self.labels
            .get(id)
            .map(String::as_str)
            .ok_or(PosError::UnknownIdentifier(id))
    }

    /// Todas as tags, em ordem.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl From<Vec<String>> for TagVocabulary {
    fn from(tags: Vec<String>) -> Self {
        Self::from_tags(tags)
    }
}

impl From<TagVocabulary> for Vec<String> {
    fn from(vocab: TagVocabulary) -> Self {
        vocab.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_sorted_and_deduplicated() {
        let vocab = TagVocabulary::from_tags(["VERB", "DET", "NOUN", "DET", START_TAG, END_TAG]);
        assert_eq!(vocab.labels(), &["DET", "NOUN", "VERB"]);
        assert_eq!(vocab.id("NOUN"), Some(1));
        assert_eq!(vocab.id(START_TAG), None);
    }

    #[test]
    fn test_unknown_identifier() {
        let vocab = TagVocabulary::from_tags(["DET"]);
        assert_eq!(vocab.label(0).unwrap(), "DET");
        assert!(matches!(vocab.label(1), Err(PosError::UnknownIdentifier(1))));
    }

    #[test]
    fn test_serde_roundtrip_rebuilds_index() {
        let vocab = TagVocabulary::from_tags(["NOUN", "DET"]);
        let json = serde_json::to_string(&vocab).unwrap();
        assert_eq!(json, r#"["DET","NOUN"]"#);
        let back: TagVocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id("NOUN"), Some(1));
        assert_eq!(back, vocab);
    }

    #[test]
    fn test_empty_vocabulary() {
        let vocab = TagVocabulary::default();
        assert!(vocab.is_empty());
        assert!(vocab.label(0).is_err());
    }
}
