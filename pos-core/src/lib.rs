//! # pos-core — Etiquetador Morfossintático (POS) com HMM
//!
//! Este crate implementa um etiquetador de classes gramaticais baseado em um
//! Hidden Markov Model de primeira ordem, decodificado com o algoritmo de
//! Viterbi, e uma camada de suavização plugável para tokens nunca vistos.
//!
//! ## Arquitetura
//!
//! 1.  **Entrada**: sentenças já tokenizadas e anotadas ([`corpus`]).
//! 2.  **Treino** ([`trainer`]): contagens com sentinelas `START`/`END` e
//!     normalização em probabilidades ([`tables`]).
//! 3.  **Suavização** ([`smoothing`]): estratégia consultada quando o par
//!     `(token, tag)` não existe na tabela de emissão.
//! 4.  **Decodificação** ([`viterbi`]): reticulado `posição × tag` e
//!     backpointers ([`lattice`]), com reconstrução do caminho a partir de `END`.
//! 5.  **Saída**: lista de [`TaggedToken`] e, opcionalmente, o reticulado.
//!
//! O baseline de classe majoritária ([`baseline`]) serve de comparação.
//! Tokenização, leitura de corpora, métricas e persistência ficam fora do crate.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use pos_core::{HmmPosTagger, TaggerConfig};
//! use pos_core::config::{SmootherConfig, SmootherKind};
//! use pos_core::corpus::demo_corpus;
//!
//! // 1. Escolhe a suavização: tokens desconhecidos viram NOUN
//! let config = TaggerConfig::default().with_smoothing(
//!     SmootherConfig::new(SmootherKind::FixedTag { tag: "NOUN".into() }).gated(),
//! );
//!
//! // 2. Treina
//! let tagger = HmmPosTagger::train(config, &demo_corpus()).unwrap();
//!
//! // 3. Etiqueta, inspecionando o reticulado
//! let result = tagger.predict_with_lattice(&["the", "old", "dog", "sleeps", "."]);
//! for tagged in &result.tagged {
//!     println!("{tagged}");
//! }
//! assert_eq!(result.lattice.len(), 5);
//! ```

pub mod baseline;
pub mod config;
pub mod corpus;
pub mod error;
pub mod hmm;
pub mod lattice;
pub mod smoothing;
pub mod tables;
pub mod tagger;
pub mod trainer;
pub mod viterbi;
pub mod vocab;

pub use baseline::MajorityTagger;
pub use config::TaggerConfig;
pub use corpus::TaggedSentence;
pub use error::{PosError, Result};
pub use hmm::HmmPosTagger;
pub use smoothing::Smoother;
pub use tagger::{PosTagger, TaggedToken};
pub use viterbi::{viterbi_decode, ViterbiResult};
