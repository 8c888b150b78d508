//! # Suavização de Emissões — Estratégias Plugáveis
//!
//! Quando o par `(token, tag)` nunca apareceu no treino, a tabela de emissão
//! não tem resposta. O decodificador então pergunta a um [`Smoother`]:
//! "qual a probabilidade de `tag` emitir `token`?".
//!
//! ## Variantes
//!
//! | Estratégia            | Probabilidade de fallback                              |
//! |-----------------------|--------------------------------------------------------|
//! | [`ConstantSmoother`]  | constante pequena (padrão `1e-16`)                     |
//! | [`UniformSmoother`]   | `1 / |tags|`                                           |
//! | [`FixedTagSmoother`]  | `1.0` para uma tag distinta (ex: `NOUN`), `0.0` demais |
//! | [`TwoTagSmoother`]    | `0.5` para duas tags distintas, `0.0` demais           |
//! | [`RuleBasedSmoother`] | `1.0` para a tag prevista pela primeira regex que casa |
//!
//! O decorador [`KnownTokenGate`] envolve qualquer uma delas: se o token já foi
//! visto no treino (com outra tag), usa a constante base e só aplica a
//! heurística a tokens realmente desconhecidos.
//!
//! Transições **nunca** são suavizadas; apenas emissões.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PosError, Result};
use crate::tables::HmmTables;

/// Probabilidade de fallback padrão (praticamente zero, mas não zero).
pub const DEFAULT_UNKNOWN_PROB: f64 = 1e-16;

/// Estratégia de suavização consultada pelo decodificador.
///
/// `from_tag` é a tag candidata; `to_key` é o token sem entrada na tabela.
pub trait Smoother: Send + Sync + fmt::Debug {
    fn resolve(&self, from_tag: &str, to_key: &str) -> f64;
}

impl<S: Smoother + ?Sized> Smoother for Box<S> {
    fn resolve(&self, from_tag: &str, to_key: &str) -> f64 {
        (**self).resolve(from_tag, to_key)
    }
}

/// Estratégia base: constante fixa para qualquer evento não visto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSmoother {
    pub prob: f64,
}

impl ConstantSmoother {
    pub fn new(prob: f64) -> Self {
        Self { prob }
    }

    /// Como [`ConstantSmoother::new`], mas rejeita valores que não são
    /// probabilidades: negativos, maiores que 1, `NaN` ou infinitos.
    pub fn try_new(prob: f64) -> Result<Self> {
        if prob.is_finite() && (0.0..=1.0).contains(&prob) {
            Ok(Self::new(prob))
        } else {
            Err(PosError::InvalidProbability(prob))
        }
    }
}

impl Default for ConstantSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_UNKNOWN_PROB)
    }
}

impl Smoother for ConstantSmoother {
    fn resolve(&self, _from_tag: &str, _to_key: &str) -> f64 {
        self.prob
    }
}

/// Distribui a massa igualmente entre todas as tags do vocabulário.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformSmoother {
    prob: f64,
}

impl UniformSmoother {
    /// Com vocabulário vazio a probabilidade é 0.
    pub fn new(tag_count: usize) -> Self {
        let prob = if tag_count == 0 { 0.0 } else { 1.0 / tag_count as f64 };
        Self { prob }
    }
}

impl Smoother for UniformSmoother {
    fn resolve(&self, _from_tag: &str, _to_key: &str) -> f64 {
        self.prob
    }
}

/// Todo token desconhecido pertence a uma tag fixa (ex: a classe majoritária `NOUN`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedTagSmoother {
    tag: String,
}

impl FixedTagSmoother {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Smoother for FixedTagSmoother {
    fn resolve(&self, from_tag: &str, _to_key: &str) -> f64 {
        if from_tag == self.tag {
            1.0
        } else {
            0.0
        }
    }
}

/// Divide a massa igualmente entre duas tags (ex: `NOUN` e `VERB`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoTagSmoother {
    tags: [String; 2],
}

impl TwoTagSmoother {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            tags: [first.into(), second.into()],
        }
    }
}

impl Smoother for TwoTagSmoother {
    fn resolve(&self, from_tag: &str, _to_key: &str) -> f64 {
        if self.tags.iter().any(|t| t == from_tag) {
            0.5
        } else {
            0.0
        }
    }
}

/// Par `(padrão, tag)` como vem da configuração.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    pub tag: String,
}

/// Lista ordenada de regras compiladas. A primeira que casar vence.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<(Regex, String)>,
}

impl RuleSet {
    /// Compila regras já estruturadas.
    ///
    /// Cada padrão é ancorado no início do token: `ab` casa com `abc`, mas não com `cab`.
    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self> {
        let rules = specs
            .iter()
            .map(|spec| Ok((anchored(&spec.pattern)?, spec.tag.clone())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Lê o formato de linhas `padrão,TAG` produzido pelo gerador de regras.
    ///
    /// A separação é feita na **última** vírgula (o padrão pode conter vírgulas).
    /// Linhas vazias e comentários iniciados por `#` são ignorados.
    ///
    /// # Exemplo
    /// ```rust
    /// use pos_core::smoothing::RuleSet;
    ///
    /// let rules = RuleSet::parse(".*tion$,NOUN\n.*ly$,ADV").unwrap();
    /// assert_eq!(rules.predict("nation"), Some("NOUN"));
    /// assert_eq!(rules.predict("quickly"), Some("ADV"));
    /// assert_eq!(rules.predict("run"), None);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_specs(&parse_rule_lines(text)?)
    }

    /// Tag prevista pela primeira regra que casar com o token.
    pub fn predict(&self, token: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(token))
            .map(|(_, tag)| tag.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Separa as linhas `padrão,TAG` em [`RuleSpec`], sem compilar.
pub fn parse_rule_lines(text: &str) -> Result<Vec<RuleSpec>> {
    let mut specs = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (pattern, tag) = line.rsplit_once(',').ok_or_else(|| PosError::InvalidRule {
            line: i + 1,
            reason: format!("separador ',' ausente em {line:?}"),
        })?;
        let (pattern, tag) = (pattern.trim(), tag.trim());
        if pattern.is_empty() || tag.is_empty() {
            return Err(PosError::InvalidRule {
                line: i + 1,
                reason: "padrão ou tag vazio".to_string(),
            });
        }
        specs.push(RuleSpec {
            pattern: pattern.to_string(),
            tag: tag.to_string(),
        });
    }
    Ok(specs)
}

fn anchored(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("^(?:{pattern})"))?)
}

/// Prevê a tag pela "forma" do token usando regras regex ordenadas.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedSmoother {
    rules: RuleSet,
}

impl RuleBasedSmoother {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }
}

impl Smoother for RuleBasedSmoother {
    fn resolve(&self, from_tag: &str, to_key: &str) -> f64 {
        match self.rules.predict(to_key) {
            Some(tag) if tag == from_tag => 1.0,
            _ => 0.0,
        }
    }
}

/// Decorador: só aplica a estratégia interna a tokens nunca vistos no treino.
///
/// Um token conhecido sem entrada para `from_tag` recebe a constante base,
/// em vez da heurística (que poderia contradizer o que o treino já mostrou).
#[derive(Debug, Clone)]
pub struct KnownTokenGate<S> {
    inner: S,
    known: HashSet<String>,
    base: ConstantSmoother,
}

impl<S: Smoother> KnownTokenGate<S> {
    pub fn new(inner: S, known: HashSet<String>) -> Self {
        Self {
            inner,
            known,
            base: ConstantSmoother::default(),
        }
    }

    /// Usa os tokens da tabela de emissão treinada como conjunto de conhecidos.
    pub fn from_tables(inner: S, tables: &HmmTables) -> Self {
        let known = tables.emission.keys().map(str::to_string).collect();
        Self::new(inner, known)
    }

    pub fn with_base(mut self, base: ConstantSmoother) -> Self {
        self.base = base;
        self
    }
}

impl<S: Smoother> Smoother for KnownTokenGate<S> {
    fn resolve(&self, from_tag: &str, to_key: &str) -> f64 {
        if self.known.contains(to_key) {
            self.base.resolve(from_tag, to_key)
        } else {
            self.inner.resolve(from_tag, to_key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::TaggedSentence;
    use crate::trainer::HmmTrainer;

    #[test]
    fn test_constant_smoother() {
        let s = ConstantSmoother::default();
        assert_eq!(s.resolve("NOUN", "xyz"), 1e-16);
        assert_eq!(ConstantSmoother::new(0.25).resolve("VERB", "xyz"), 0.25);
        assert_eq!(ConstantSmoother::try_new(0.0).unwrap().prob, 0.0);
        assert_eq!(ConstantSmoother::try_new(1.0).unwrap().prob, 1.0);
    }

    #[test]
    fn test_uniform_smoother() {
        assert_eq!(UniformSmoother::new(4).resolve("NOUN", "x"), 0.25);
        assert_eq!(UniformSmoother::new(0).resolve("NOUN", "x"), 0.0);
    }

    #[test]
    fn test_fixed_and_two_tag_smoothers() {
        let noun = FixedTagSmoother::new("NOUN");
        assert_eq!(noun.resolve("NOUN", "cat"), 1.0);
        assert_eq!(noun.resolve("VERB", "cat"), 0.0);

        let nv = TwoTagSmoother::new("NOUN", "VERB");
        assert_eq!(nv.resolve("NOUN", "cat"), 0.5);
        assert_eq!(nv.resolve("VERB", "cat"), 0.5);
        assert_eq!(nv.resolve("DET", "cat"), 0.0);
    }

    #[test]
    fn test_rules_first_match_wins() {
        let rules = RuleSet::from_specs(&[
            RuleSpec { pattern: r".*mente$".into(), tag: "ADV".into() },
            RuleSpec { pattern: r".*e$".into(), tag: "NOUN".into() },
        ])
        .unwrap();
        let s = RuleBasedSmoother::new(rules);

        assert_eq!(s.resolve("ADV", "lentamente"), 1.0);
        assert_eq!(s.resolve("NOUN", "lentamente"), 0.0);
        assert_eq!(s.resolve("NOUN", "casse"), 1.0);
        // sem regra: 0
        assert_eq!(s.resolve("NOUN", "xyz"), 0.0);
    }

    #[test]
    fn test_rules_are_anchored_at_start() {
        let rules = RuleSet::parse("ab,NOUN").unwrap();
        assert_eq!(rules.predict("abc"), Some("NOUN"));
        assert_eq!(rules.predict("cab"), None);
    }

    #[test]
    fn test_parse_rule_lines() {
        let text = "# sufixos latinos\n.*tor$,NOUN\n\n.*(a,b)$,ADJ\n";
        let specs = parse_rule_lines(text).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[1].pattern, ".*(a,b)$");
        assert_eq!(specs[1].tag, "ADJ");
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(matches!(
            RuleSet::parse(".*tor$ NOUN"),
            Err(PosError::InvalidRule { line: 1, .. })
        ));
        assert!(matches!(RuleSet::parse(",NOUN"), Err(PosError::InvalidRule { .. })));
        assert!(matches!(RuleSet::parse("(unclosed,NOUN"), Err(PosError::Regex(_))));
    }

    #[test]
    fn test_known_token_gate() {
        let corpus = vec![TaggedSentence::from_pairs(&[("the", "DET"), ("dog", "NOUN")])];
        let trained = HmmTrainer::default().fit(&corpus).unwrap();
        let gate = KnownTokenGate::from_tables(FixedTagSmoother::new("VERB"), &trained.tables);

        // "dog" é conhecido: VERB não recebe 1.0, e sim a constante base
        assert_eq!(gate.resolve("VERB", "dog"), DEFAULT_UNKNOWN_PROB);
        // "barks" nunca foi visto: a heurística se aplica
        assert_eq!(gate.resolve("VERB", "barks"), 1.0);
        assert_eq!(gate.resolve("NOUN", "barks"), 0.0);
    }

    #[test]
    fn test_boxed_smoother_delegates() {
        let boxed: Box<dyn Smoother> = Box::new(FixedTagSmoother::new("NOUN"));
        let gate = KnownTokenGate::new(boxed, HashSet::new());
        assert_eq!(gate.resolve("NOUN", "anything"), 1.0);
    }
}
