//! # Configuração do Etiquetador
//!
//! Tudo o que o etiquetador precisa saber é passado explicitamente aqui:
//! nenhum recurso (listas de regras, tag padrão) é carregado implicitamente.
//! Arquivos de regras são lidos por quem chama e chegam já estruturados.
//!
//! ```rust
//! use pos_core::config::{SmootherKind, TaggerConfig};
//!
//! let json = r#"{
//!     "smoothing": { "strategy": { "kind": "fixed_tag", "tag": "NOUN" }, "known_token_gate": true },
//!     "normalization": "target_tag"
//! }"#;
//! let config = TaggerConfig::from_json(json).unwrap();
//! assert_eq!(config.smoothing.strategy, SmootherKind::FixedTag { tag: "NOUN".into() });
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lattice::ScoreSpace;
use crate::smoothing::{
    ConstantSmoother, FixedTagSmoother, KnownTokenGate, RuleBasedSmoother, RuleSet, RuleSpec,
    Smoother, TwoTagSmoother, UniformSmoother, DEFAULT_UNKNOWN_PROB,
};
use crate::tables::HmmTables;
use crate::trainer::Normalization;
use crate::vocab::TagVocabulary;

/// Tag usada pelo baseline (e pelas configurações de exemplo) para tokens desconhecidos.
pub const DEFAULT_TAG: &str = "NOUN";

/// O que fazer com uma sentença de treino cujos tokens e tags não se alinham.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidSequencePolicy {
    /// Aborta o treino com [`crate::PosError::InvalidInput`].
    #[default]
    Reject,
    /// Descarta a sentença e registra um `warn!`.
    SkipAndWarn,
}

/// Estratégia de suavização escolhida em tempo de configuração.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SmootherKind {
    Constant {
        #[serde(default = "default_unknown_prob")]
        prob: f64,
    },
    Uniform,
    FixedTag { tag: String },
    TwoTag { tags: [String; 2] },
    RuleBased { rules: Vec<RuleSpec> },
}

fn default_unknown_prob() -> f64 {
    DEFAULT_UNKNOWN_PROB
}

impl Default for SmootherKind {
    fn default() -> Self {
        SmootherKind::Constant {
            prob: DEFAULT_UNKNOWN_PROB,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    pub strategy: SmootherKind,
    /// Envolve a estratégia em [`KnownTokenGate`].
    pub known_token_gate: bool,
}

impl SmootherConfig {
    pub fn new(strategy: SmootherKind) -> Self {
        Self {
            strategy,
            known_token_gate: false,
        }
    }

    pub fn gated(mut self) -> Self {
        self.known_token_gate = true;
        self
    }

    /// Instancia a estratégia. Precisa das tabelas treinadas (conjunto de
    /// tokens conhecidos) e do vocabulário (estratégia uniforme).
    pub fn build(&self, tables: &HmmTables, tags: &TagVocabulary) -> Result<Box<dyn Smoother>> {
        let inner: Box<dyn Smoother> = match &self.strategy {
            SmootherKind::Constant { prob } => Box::new(ConstantSmoother::try_new(*prob)?),
            SmootherKind::Uniform => Box::new(UniformSmoother::new(tags.len())),
            SmootherKind::FixedTag { tag } => Box::new(FixedTagSmoother::new(tag.clone())),
            SmootherKind::TwoTag { tags: [a, b] } => {
                Box::new(TwoTagSmoother::new(a.clone(), b.clone()))
            }
            SmootherKind::RuleBased { rules } => {
                Box::new(RuleBasedSmoother::new(RuleSet::from_specs(rules)?))
            }
        };

        if self.known_token_gate {
            Ok(Box::new(KnownTokenGate::from_tables(inner, tables)))
        } else {
            Ok(inner)
        }
    }
}

/// Configuração completa do etiquetador HMM e do baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    pub smoothing: SmootherConfig,
    pub normalization: Normalization,
    pub score_space: ScoreSpace,
    pub on_invalid: InvalidSequencePolicy,
    /// Tag do baseline para tokens nunca vistos.
    pub default_tag: String,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            smoothing: SmootherConfig::default(),
            normalization: Normalization::default(),
            score_space: ScoreSpace::default(),
            on_invalid: InvalidSequencePolicy::default(),
            default_tag: DEFAULT_TAG.to_string(),
        }
    }
}

impl TaggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_smoothing(mut self, smoothing: SmootherConfig) -> Self {
        self.smoothing = smoothing;
        self
    }
}
