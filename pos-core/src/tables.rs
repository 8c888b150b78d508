//! # Tabelas de Probabilidade
//!
//! Duas tabelas aninhadas, construídas uma única vez no fim do treino e
//! somente lidas durante a decodificação:
//!
//! - **Emissão**: `token -> (tag -> P(token | tag))`
//! - **Transição**: `tag_anterior -> (tag_atual -> P(tag_atual | tag_anterior))`
//!
//! Como as tabelas nunca são mutadas após o treino, várias decodificações
//! podem consultá-las em paralelo sem nenhum lock.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::trainer::Normalization;

/// Tabela esparsa `chave_externa -> (chave_interna -> probabilidade)`.
///
/// Entradas ausentes significam "evento nunca observado"; quem consulta decide
/// o que fazer (zero para transições, suavização para emissões).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTable {
    rows: HashMap<String, HashMap<String, f64>>,
}

impl ProbabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, outer: &str, inner: &str, prob: f64) {
        self.rows
            .entry(outer.to_string())
            .or_default()
            .insert(inner.to_string(), prob);
    }

    /// Probabilidade observada, ou `None` se o par nunca apareceu no treino.
    pub fn get(&self, outer: &str, inner: &str) -> Option<f64> {
        self.rows.get(outer).and_then(|row| row.get(inner)).copied()
    }

    /// Linha completa de uma chave externa.
    pub fn row(&self, outer: &str) -> Option<&HashMap<String, f64>> {
        self.rows.get(outer)
    }

    pub fn contains_key(&self, outer: &str) -> bool {
        self.rows.contains_key(outer)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Número de chaves externas.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Par de tabelas treinadas de um HMM, mais a convenção de normalização usada.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HmmTables {
    /// `token -> tag -> P(token | tag)`
    pub emission: ProbabilityTable,
    /// `tag -> tag -> P`, incluindo `START` como origem e `END` como destino.
    pub transition: ProbabilityTable,
    /// Direção de normalização das transições com que estas tabelas foram geradas.
    pub normalization: Normalization,
}

impl HmmTables {
    /// P(token | tag), se observada.
    pub fn emission(&self, token: &str, tag: &str) -> Option<f64> {
        self.emission.get(token, tag)
    }

    /// P(to | from). Transições nunca vistas valem 0 e **não** são suavizadas.
    pub fn transition(&self, from: &str, to: &str) -> f64 {
        self.transition.get(from, to).unwrap_or(0.0)
    }

    /// O token apareceu em alguma sentença de treino?
    pub fn is_known_token(&self, token: &str) -> bool {
        self.emission.contains_key(token)
    }

    pub fn is_empty(&self) -> bool {
        self.emission.is_empty() && self.transition.is_empty()
    }
}
