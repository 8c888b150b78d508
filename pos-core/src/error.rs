//! # Erros do etiquetador POS
//!
//! Todas as falhas são locais e síncronas: não há I/O nem recursos externos
//! no núcleo, portanto nenhuma operação é repetida. Tokens e transições
//! nunca vistos **não** são erros, seguem pelo caminho da suavização.

use thiserror::Error;

/// Erros que podem ocorrer no treino, na configuração ou em consultas ao vocabulário.
#[derive(Debug, Error)]
pub enum PosError {
    /// Sentença de treino com número diferente de tokens e tags (ou vazia).
    #[error("sentença de treino inválida (índice {index}): {tokens} tokens para {tags} tags")]
    InvalidInput {
        /// Posição da sentença no lote de treino.
        index: usize,
        tokens: usize,
        tags: usize,
    },

    /// Id de tag que nunca foi registrado no vocabulário.
    #[error("identificador desconhecido: {0}")]
    UnknownIdentifier(usize),

    /// Probabilidade configurada fora de `[0, 1]` ou não finita.
    #[error("probabilidade inválida: {0} (esperado valor finito em [0, 1])")]
    InvalidProbability(f64),

    /// Linha de regra malformada (esperado `padrão,TAG`).
    #[error("regra inválida na linha {line}: {reason}")]
    InvalidRule { line: usize, reason: String },

    /// Expressão regular de uma regra não compila.
    #[error("erro de compilação de regex: {0}")]
    Regex(#[from] regex::Error),

    /// Configuração JSON que não pôde ser desserializada.
    #[error("configuração inválida: {0}")]
    Config(#[from] serde_json::Error),
}

/// Alias de `Result` usado em todo o crate.
pub type Result<T> = std::result::Result<T, PosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PosError::InvalidInput { index: 3, tokens: 2, tags: 1 };
        let msg = err.to_string();
        assert!(msg.contains("índice 3"));
        assert!(msg.contains("2 tokens para 1 tags"));

        let err = PosError::UnknownIdentifier(42);
        assert_eq!(err.to_string(), "identificador desconhecido: 42");

        let err = PosError::InvalidProbability(7.0);
        assert!(err.to_string().contains("probabilidade inválida: 7"));
    }

    #[test]
    fn test_regex_error_converts() {
        let regex_err = regex::Regex::new("(").unwrap_err();
        let err: PosError = regex_err.into();
        assert!(matches!(err, PosError::Regex(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PosError>();
    }
}
