//! # Reticulado de Viterbi e Backpointers
//!
//! ```text
//!            pos 0      pos 1      pos 2
//!   DET   [ 1.0      ][ 0.0      ][ 0.0      ]
//!   NOUN  [ 0.0      ][ 1.0      ][ 0.0      ]
//!   VERB  [ 0.0      ][ 0.0      ][ 1.0      ]
//! ```
//!
//! Cada célula `(pos, tag)` guarda a probabilidade do melhor caminho que termina
//! em `tag` na posição `pos`. Os backpointers têm formato fixo: para cada
//! posição `pos >= 1`, um vetor `tag -> melhor tag anterior`, guardado sob a
//! chave `pos - 1`, e um último ponteiro para a sentinela `END`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Espaço numérico em que o reticulado é acumulado.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSpace {
    /// Produto de probabilidades lineares.
    #[default]
    Probability,
    /// Soma de log-probabilidades; evita underflow em sentenças longas.
    LogProbability,
}

impl ScoreSpace {
    /// Converte uma probabilidade para este espaço. `0` vira `-inf` em log.
    pub fn lift(self, prob: f64) -> f64 {
        match self {
            ScoreSpace::Probability => prob,
            ScoreSpace::LogProbability => prob.ln(),
        }
    }

    /// Composição de dois scores (produto ou soma de logs).
    pub fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            ScoreSpace::Probability => a * b,
            ScoreSpace::LogProbability => a + b,
        }
    }

    /// Volta para probabilidade linear.
    pub fn to_probability(self, score: f64) -> f64 {
        match self {
            ScoreSpace::Probability => score,
            ScoreSpace::LogProbability => score.exp(),
        }
    }

    /// Score de um evento impossível.
    pub fn zero(self) -> f64 {
        self.lift(0.0)
    }
}

/// Scores em JSON: o JSON não representa `-inf` (células impossíveis em log),
/// então `-inf` é gravado como `null` e `null` volta como `-inf`.
pub(crate) mod score {
    use super::*;

    pub fn serialize<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        encode(*score).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Option::<f64>::deserialize(deserializer).map(decode)
    }

    pub(super) fn encode(score: f64) -> Option<f64> {
        (score != f64::NEG_INFINITY).then_some(score)
    }

    pub(super) fn decode(score: Option<f64>) -> f64 {
        score.unwrap_or(f64::NEG_INFINITY)
    }
}

/// Mesma codificação de [`score`], aplicada à grade `posição × tag`.
mod score_grid {
    use super::*;

    pub fn serialize<S: Serializer>(cells: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded: Vec<Vec<Option<f64>>> = cells
            .iter()
            .map(|column| column.iter().copied().map(score::encode).collect())
            .collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = Vec::<Vec<Option<f64>>>::deserialize(deserializer)?;
        Ok(encoded
            .into_iter()
            .map(|column| column.into_iter().map(score::decode).collect())
            .collect())
    }
}

/// Tabela `posição × tag` de melhores scores de caminho.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViterbiLattice {
    tags: Vec<String>,
    tokens: Vec<String>,
    space: ScoreSpace,
    /// `cells[pos][tag_id]`
    #[serde(with = "score_grid")]
    cells: Vec<Vec<f64>>,
}

impl ViterbiLattice {
    pub fn new(tags: Vec<String>, tokens: Vec<String>, space: ScoreSpace) -> Self {
        let cells = vec![vec![space.zero(); tags.len()]; tokens.len()];
        Self {
            tags,
            tokens,
            space,
            cells,
        }
    }

    pub(crate) fn set(&mut self, pos: usize, tag_id: usize, score: f64) {
        self.cells[pos][tag_id] = score;
    }

    /// Score de uma célula pelo nome da tag.
    pub fn get(&self, pos: usize, tag: &str) -> Option<f64> {
        let id = self.tags.iter().position(|t| t == tag)?;
        self.cells.get(pos).map(|column| column[id])
    }

    /// Coluna completa de uma posição, indexada pelo id da tag.
    pub fn column(&self, pos: usize) -> Option<&[f64]> {
        self.cells.get(pos).map(Vec::as_slice)
    }

    /// Coluna como mapa `tag -> score`, ordenado pela tag.
    pub fn position(&self, pos: usize) -> Option<BTreeMap<&str, f64>> {
        let column = self.cells.get(pos)?;
        Some(
            self.tags
                .iter()
                .map(String::as_str)
                .zip(column.iter().copied())
                .collect(),
        )
    }

    /// Itera sobre todas as células `(pos, tag, score)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, &str, f64)> + '_ {
        self.cells.iter().enumerate().flat_map(move |(pos, column)| {
            self.tags
                .iter()
                .zip(column.iter())
                .map(move |(tag, &score)| (pos, tag.as_str(), score))
        })
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn space(&self) -> ScoreSpace {
        self.space
    }

    /// Número de posições (= tamanho da entrada).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Backpointers de formato fixo, por id de tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackpointerStore {
    /// `steps[pos - 1][tag] = melhor tag anterior` para a tag em `pos`.
    steps: Vec<Vec<usize>>,
    /// Melhor última tag (transição para `END`), registrada na posição final.
    end: Option<usize>,
}

impl BackpointerStore {
    /// Reserva espaço para `positions` posições e `n_tags` tags.
    pub fn new(positions: usize, n_tags: usize) -> Self {
        Self {
            steps: vec![vec![0; n_tags]; positions.saturating_sub(1)],
            end: None,
        }
    }

    pub(crate) fn set(&mut self, key: usize, tag_id: usize, prev_id: usize) {
        self.steps[key][tag_id] = prev_id;
    }

    pub(crate) fn set_end(&mut self, last_id: usize) {
        self.end = Some(last_id);
    }

    /// Melhor tag anterior para `tag_id` na posição `key + 1`.
    pub fn get(&self, key: usize, tag_id: usize) -> Option<usize> {
        self.steps.get(key).and_then(|row| row.get(tag_id)).copied()
    }

    /// Ponteiro da sentinela `END`.
    pub fn end(&self) -> Option<usize> {
        self.end
    }

    /// Reconstrói o caminho (ids de tags) de trás para frente, a partir de `END`.
    ///
    /// Sem ponteiro de `END` (entrada vazia ou vocabulário vazio) o caminho é vazio.
    /// Um ponteiro fora do formato (ex: store desserializado de fonte externa)
    /// também resulta em caminho vazio.
    pub fn path(&self) -> Vec<usize> {
        let Some(last) = self.end else {
            return Vec::new();
        };

        let mut path = Vec::with_capacity(self.steps.len() + 1);
        path.push(last);
        for key in (0..self.steps.len()).rev() {
            let Some(prev) = path.last().and_then(|&curr| self.get(key, curr)) else {
                return Vec::new();
            };
            path.push(prev);
        }
        path.reverse();
        path
    }
}
