//! # Tipos de Saída e Interface Comum dos Etiquetadores
//!
//! O HMM e o baseline de classe majoritária expõem a mesma interface
//! ([`PosTagger`]), para que um harness externo de avaliação possa treinar e
//! comparar os dois sem saber qual está usando.

use serde::{Deserialize, Serialize};

use crate::corpus::TaggedSentence;
use crate::error::Result;

/// Um token com a tag prevista.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedToken {
    pub token: String,
    pub tag: String,
}

impl TaggedToken {
    pub fn new(token: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            tag: tag.into(),
        }
    }

    /// Visão `(token, tag)` emprestada.
    pub fn as_pair(&self) -> (&str, &str) {
        (&self.token, &self.tag)
    }
}

impl std::fmt::Display for TaggedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.token, self.tag)
    }
}

/// Interface mínima de um etiquetador treinável.
pub trait PosTagger {
    /// Treina a partir de sentenças anotadas, substituindo qualquer treino anterior.
    fn fit(&mut self, sentences: &[TaggedSentence]) -> Result<()>;

    /// Uma tag por token; entrada vazia produz saída vazia.
    fn predict(&self, tokens: &[&str]) -> Vec<TaggedToken>;

    /// Nome curto para relatórios.
    fn name(&self) -> &'static str;
}
