//! Registro fechado das fontes de detecção.

use crate::error::DecodeError;
use crate::model::ModelSession;
use crate::rule_based::{
    ContextualRecognizer, DictionaryRecognizer, PatternRecognizer, PhoneticRecognizer,
};
use crate::span::Span;

/// Uma fonte de candidatos. Reconhecedores de texto nunca falham na detecção;
/// só a sessão de modelo pode falhar.
#[derive(Debug, Clone)]
pub enum Recognizer {
    Pattern(PatternRecognizer),
    Dictionary(DictionaryRecognizer),
    Phonetic(PhoneticRecognizer),
    Contextual(ContextualRecognizer),
    Model(ModelSession),
}

impl Recognizer {
    pub fn name(&self) -> &str {
        match self {
            Recognizer::Pattern(_) => "pattern",
            Recognizer::Dictionary(_) => DictionaryRecognizer::SOURCE,
            Recognizer::Phonetic(_) => PhoneticRecognizer::SOURCE,
            Recognizer::Contextual(_) => ContextualRecognizer::SOURCE,
            Recognizer::Model(session) => session.source(),
        }
    }

    pub fn detect(&self, text: &str) -> Result<Vec<Span>, DecodeError> {
        match self {
            Recognizer::Pattern(r) => Ok(r.detect(text)),
            Recognizer::Dictionary(r) => Ok(r.detect(text)),
            Recognizer::Phonetic(r) => Ok(r.detect(text)),
            Recognizer::Contextual(r) => Ok(r.detect(text)),
            Recognizer::Model(session) => session.detect(text),
        }
    }
}

impl From<PatternRecognizer> for Recognizer {
    fn from(r: PatternRecognizer) -> Self {
        Recognizer::Pattern(r)
    }
}

impl From<DictionaryRecognizer> for Recognizer {
    fn from(r: DictionaryRecognizer) -> Self {
        Recognizer::Dictionary(r)
    }
}

impl From<PhoneticRecognizer> for Recognizer {
    fn from(r: PhoneticRecognizer) -> Self {
        Recognizer::Phonetic(r)
    }
}

impl From<ContextualRecognizer> for Recognizer {
    fn from(r: ContextualRecognizer) -> Self {
        Recognizer::Contextual(r)
    }
}

impl From<ModelSession> for Recognizer {
    fn from(session: ModelSession) -> Self {
        Recognizer::Model(session)
    }
}
