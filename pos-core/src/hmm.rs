//! # Hidden Markov Model (HMM) para POS Tagging
//!
//! Implementação clássica de HMM de primeira ordem onde:
//! - **Estados Ocultos**: Tags morfossintáticas (DET, NOUN, VERB, ...)
//! - **Observações**: Tokens (palavras)
//!
//! O etiquetador junta as peças do crate:
//!
//! ```text
//! sentenças anotadas ──► HmmTrainer ──► HmmTables + TagVocabulary
//!                                             │
//!                         SmootherConfig ─────┤
//!                                             ▼
//!             tokens ──────────────► viterbi_decode ──► [(token, tag)]
//! ```
//!
//! Depois do treino o modelo é somente leitura: cada chamada de `predict` cria
//! seu próprio reticulado, então decodificações independentes podem rodar em
//! paralelo (ver [`HmmPosTagger::predict_batch`]).

use rayon::prelude::*;

use crate::config::TaggerConfig;
use crate::corpus::TaggedSentence;
use crate::error::Result;
use crate::smoothing::{ConstantSmoother, Smoother};
use crate::tables::HmmTables;
use crate::tagger::{PosTagger, TaggedToken};
use crate::trainer::{HmmTrainer, TrainedHmm};
use crate::viterbi::{viterbi_decode, ViterbiResult};
use crate::vocab::TagVocabulary;

/// Etiquetador HMM com decodificação Viterbi e suavização plugável.
///
/// # Exemplo
/// ```rust
/// use pos_core::{HmmPosTagger, TaggedSentence, TaggerConfig};
///
/// let corpus = vec![TaggedSentence::from_pairs(&[
///     ("the", "DET"), ("dog", "NOUN"), ("runs", "VERB"),
/// ])];
/// let tagger = HmmPosTagger::train(TaggerConfig::default(), &corpus).unwrap();
///
/// let tagged = tagger.predict(&["the", "dog", "runs"]);
/// let tags: Vec<&str> = tagged.iter().map(|t| t.tag.as_str()).collect();
/// assert_eq!(tags, ["DET", "NOUN", "VERB"]);
/// ```
#[derive(Debug)]
pub struct HmmPosTagger {
    config: TaggerConfig,
    model: TrainedHmm,
    smoother: Box<dyn Smoother>,
}

impl HmmPosTagger {
    /// Etiquetador ainda não treinado. `predict` devolve vazio até o `fit`.
    pub fn new(config: TaggerConfig) -> Self {
        Self {
            config,
            model: TrainedHmm::default(),
            smoother: Box::new(ConstantSmoother::default()),
        }
    }

    /// Atalho para `new` + `fit`.
    pub fn train(config: TaggerConfig, sentences: &[TaggedSentence]) -> Result<Self> {
        let mut tagger = Self::new(config);
        tagger.fit(sentences)?;
        Ok(tagger)
    }

    /// Treina o modelo e instancia a estratégia de suavização configurada.
    ///
    /// Em caso de erro o estado anterior é preservado. Um smoother injetado
    /// com [`Self::set_smoother`] é substituído pelo da configuração.
    pub fn fit(&mut self, sentences: &[TaggedSentence]) -> Result<()> {
        let trainer = HmmTrainer::new(self.config.normalization, self.config.on_invalid);
        let model = trainer.fit(sentences)?;
        let smoother = self.config.smoothing.build(&model.tables, &model.tags)?;

        self.model = model;
        self.smoother = smoother;
        Ok(())
    }

    /// Injeta uma estratégia de suavização própria (após o treino).
    pub fn set_smoother(&mut self, smoother: Box<dyn Smoother>) {
        self.smoother = smoother;
    }

    /// Tag mais provável para cada token.
    pub fn predict<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<TaggedToken> {
        self.predict_with_lattice(tokens).tagged
    }

    /// Como [`Self::predict`], devolvendo também o reticulado e os backpointers.
    pub fn predict_with_lattice<S: AsRef<str>>(&self, tokens: &[S]) -> ViterbiResult {
        viterbi_decode(
            &self.model.tags,
            &self.model.tables,
            self.smoother.as_ref(),
            tokens,
            self.config.score_space,
        )
    }

    /// Decodifica sentenças independentes em paralelo (Rayon).
    ///
    /// A ordem da saída acompanha a ordem da entrada.
    pub fn predict_batch<S: AsRef<str> + Sync>(&self, batch: &[Vec<S>]) -> Vec<Vec<TaggedToken>> {
        batch.par_iter().map(|tokens| self.predict(tokens)).collect()
    }

    /// P(token | tag) como o decodificador a enxerga: tabela ou suavização.
    pub fn emission_prob(&self, token: &str, tag: &str) -> f64 {
        self.model
            .tables
            .emission(token, tag)
            .unwrap_or_else(|| self.smoother.resolve(tag, token))
    }

    /// P(to | from), sem suavização.
    pub fn transition_prob(&self, from: &str, to: &str) -> f64 {
        self.model.tables.transition(from, to)
    }

    pub fn tags(&self) -> &TagVocabulary {
        &self.model.tags
    }

    pub fn tables(&self) -> &HmmTables {
        &self.model.tables
    }

    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        !self.model.tags.is_empty()
    }
}

impl Default for HmmPosTagger {
    fn default() -> Self {
        Self::new(TaggerConfig::default())
    }
}

impl PosTagger for HmmPosTagger {
    fn fit(&mut self, sentences: &[TaggedSentence]) -> Result<()> {
        HmmPosTagger::fit(self, sentences)
    }

    fn predict(&self, tokens: &[&str]) -> Vec<TaggedToken> {
        HmmPosTagger::predict(self, tokens)
    }

    fn name(&self) -> &'static str {
        "hmm"
    }
}
