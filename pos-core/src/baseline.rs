//! # Baseline de Classe Majoritária
//!
//! Referência trivial para comparar com o HMM: cada token recebe a tag mais
//! frequente com que apareceu no treino; tokens nunca vistos recebem a tag
//! padrão (`NOUN`). Sem contexto, sem suavização, sem programação dinâmica.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{InvalidSequencePolicy, TaggerConfig, DEFAULT_TAG};
use crate::corpus::TaggedSentence;
use crate::error::Result;
use crate::tagger::{PosTagger, TaggedToken};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorityTagger {
    /// `token -> [(tag, n)]` na ordem em que cada tag apareceu para o token.
    counts: HashMap<String, Vec<(String, u64)>>,
    default_tag: String,
    on_invalid: InvalidSequencePolicy,
}

impl MajorityTagger {
    pub fn new(default_tag: impl Into<String>) -> Self {
        Self {
            counts: HashMap::new(),
            default_tag: default_tag.into(),
            on_invalid: InvalidSequencePolicy::default(),
        }
    }

    /// Usa `default_tag` e `on_invalid` da configuração compartilhada com o HMM.
    pub fn from_config(config: &TaggerConfig) -> Self {
        Self::new(config.default_tag.clone()).with_policy(config.on_invalid)
    }

    pub fn with_policy(mut self, on_invalid: InvalidSequencePolicy) -> Self {
        self.on_invalid = on_invalid;
        self
    }

    pub fn fit(&mut self, sentences: &[TaggedSentence]) -> Result<()> {
        let mut counts: HashMap<String, Vec<(String, u64)>> = HashMap::new();

        for (index, sentence) in sentences.iter().enumerate() {
            if let Err(err) = sentence.validate(index) {
                match self.on_invalid {
                    InvalidSequencePolicy::Reject => return Err(err),
                    InvalidSequencePolicy::SkipAndWarn => {
                        warn!(%err, "sentença de treino descartada");
                        continue;
                    }
                }
            }

            for (token, tag) in sentence.pairs() {
                let row = counts.entry(token.to_string()).or_default();
                match row.iter_mut().find(|(t, _)| t == tag) {
                    Some((_, n)) => *n += 1,
                    None => row.push((tag.to_string(), 1)),
                }
            }
        }

        debug!(tokens = counts.len(), "baseline majoritário treinado");
        self.counts = counts;
        Ok(())
    }

    /// Tag mais frequente do token; empate resolve para a tag vista primeiro.
    pub fn most_frequent(&self, token: &str) -> Option<&str> {
        let row = self.counts.get(token)?;
        let mut best: Option<&(String, u64)> = None;
        for entry in row {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(tag, _)| tag.as_str())
    }

    pub fn predict<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<TaggedToken> {
        tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                let tag = self.most_frequent(token).unwrap_or(self.default_tag.as_str());
                TaggedToken::new(token, tag)
            })
            .collect()
    }
}

impl Default for MajorityTagger {
    fn default() -> Self {
        Self::new(DEFAULT_TAG)
    }
}

impl PosTagger for MajorityTagger {
    fn fit(&mut self, sentences: &[TaggedSentence]) -> Result<()> {
        MajorityTagger::fit(self, sentences)
    }

    fn predict(&self, tokens: &[&str]) -> Vec<TaggedToken> {
        MajorityTagger::predict(self, tokens)
    }

    fn name(&self) -> &'static str {
        "majority"
    }
}
