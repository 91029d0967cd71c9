//! # Tipos de Erro
//!
//! Problemas de configuração aparecem na construção de um reconhecedor,
//! tokenizador ou conjunto de rótulos. Na detecção só a fonte baseada em
//! modelo pode falhar; os demais reconhecedores são funções puras do texto.

use thiserror::Error;

/// Configuração inválida ou vazia, detectada na construção.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rule `{rule}` has an invalid regular expression: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("{0} rule group is empty")]
    EmptyRuleGroup(&'static str),

    #[error("rule `{rule}` has confidence {value} outside 0.0..=1.0")]
    InvalidConfidence { rule: String, value: f64 },

    #[error("dictionary and phonetic confidences must differ (both {0})")]
    IndistinctConfidence(f64),

    #[error("malformed configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("vocabulary: {0}")]
    Vocabulary(String),

    #[error("unknown classifier label `{0}`")]
    UnknownLabel(String),

    #[error("token budget must be at least 2, got {0}")]
    TokenBudget(usize),
}

/// Falha reportada por um classificador de tokens externo.
#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier returned malformed output: {0}")]
    Malformed(String),
}

/// Falha ao transformar a saída do classificador em spans.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("expected {expected} per-token entries, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("score row {index} is empty or not finite")]
    InvalidScores { index: usize },

    #[error("token {index} has label id {label} outside the label set")]
    UnknownLabel { index: usize, label: usize },

    #[error("token {index} offsets {start}..{end} fall outside the text")]
    OffsetOutOfBounds {
        index: usize,
        start: usize,
        end: usize,
    },
}
