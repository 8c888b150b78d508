//! # Sentenças Anotadas para Treino
//!
//! O carregamento e o parsing de corpora (CoNLL-U, treebanks etc.) ficam fora
//! do núcleo. Aqui só existe a forma já estruturada: uma sequência de tokens e
//! a sequência de tags correspondente, de mesmo tamanho.
//!
//! Há também um pequeno corpus de demonstração em inglês com tags UPOS, usado
//! nos testes e nos exemplos da documentação.

use serde::{Deserialize, Serialize};

use crate::error::{PosError, Result};

/// Uma sentença de treino: tokens e tags alinhados posição a posição.
///
/// O construtor não valida o alinhamento; a validação acontece no treino,
/// onde a política de sentenças inválidas é aplicada
/// (ver [`crate::config::InvalidSequencePolicy`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSentence {
    pub tokens: Vec<String>,
    pub tags: Vec<String>,
}

impl TaggedSentence {
    pub fn new<T, G>(tokens: T, tags: G) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Constrói a partir de pares `(token, tag)`. Sempre alinhada por construção.
    ///
    /// # Exemplo
    /// ```rust
    /// use pos_core::corpus::TaggedSentence;
    ///
    /// let s = TaggedSentence::from_pairs(&[("the", "DET"), ("dog", "NOUN")]);
    /// assert_eq!(s.len(), 2);
    /// ```
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let (tokens, tags): (Vec<String>, Vec<String>) = pairs
            .iter()
            .map(|(w, t)| (w.to_string(), t.to_string()))
            .unzip();
        Self { tokens, tags }
    }

    /// Verifica a pré-condição de treino: mesmo tamanho e pelo menos um token.
    pub fn validate(&self, index: usize) -> Result<()> {
        if self.tokens.len() != self.tags.len() || self.tokens.is_empty() {
            return Err(PosError::InvalidInput {
                index,
                tokens: self.tokens.len(),
                tags: self.tags.len(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Itera sobre os pares `(token, tag)`.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens
            .iter()
            .zip(self.tags.iter())
            .map(|(w, t)| (w.as_str(), t.as_str()))
    }
}

/// Junta listas paralelas de sentenças (uma lista de tokens e uma de tags por
/// sentença), o formato entregue pelos leitores de corpus externos.
///
/// As duas listas precisam ter o mesmo número de sentenças. Caso contrário o
/// erro aponta a primeira sentença sem par, com as contagens de cada lista.
/// O alinhamento interno de cada sentença é verificado no treino.
pub fn from_columns(
    tokens: Vec<Vec<String>>,
    tags: Vec<Vec<String>>,
) -> Result<Vec<TaggedSentence>> {
    if tokens.len() != tags.len() {
        return Err(PosError::InvalidInput {
            index: tokens.len().min(tags.len()),
            tokens: tokens.len(),
            tags: tags.len(),
        });
    }

    Ok(tokens
        .into_iter()
        .zip(tags)
        .map(|(tokens, tags)| TaggedSentence { tokens, tags })
        .collect())
}

/// Corpus de demonstração (inglês, tags UPOS).
pub fn demo_corpus() -> Vec<TaggedSentence> {
    let sentences: &[&[(&str, &str)]] = &[
        &[("the", "DET"), ("dog", "NOUN"), ("runs", "VERB"), (".", "PUNCT")],
        &[("a", "DET"), ("cat", "NOUN"), ("sleeps", "VERB"), (".", "PUNCT")],
        &[
            ("the", "DET"), ("old", "ADJ"), ("man", "NOUN"), ("reads", "VERB"),
            ("a", "DET"), ("book", "NOUN"), (".", "PUNCT"),
        ],
        &[
            ("she", "PRON"), ("quickly", "ADV"), ("reads", "VERB"), ("the", "DET"),
            ("letter", "NOUN"), (".", "PUNCT"),
        ],
        &[
            ("dogs", "NOUN"), ("chase", "VERB"), ("the", "DET"), ("small", "ADJ"),
            ("cat", "NOUN"), (".", "PUNCT"),
        ],
        &[("he", "PRON"), ("runs", "VERB"), ("quickly", "ADV"), (".", "PUNCT")],
        &[
            ("the", "DET"), ("book", "NOUN"), ("is", "AUX"), ("old", "ADJ"), (".", "PUNCT"),
        ],
    ];

    sentences.iter().map(|s| TaggedSentence::from_pairs(s)).collect()
}
