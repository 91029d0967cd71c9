//! # Tags BIO e o Decodificador de Tags
//!
//! Um modelo de classificação de tokens rotula cada token com uma tag do
//! esquema **BIO** (Beginning-Inside-Outside):
//!
//! - `B-TIPO`: Begin, primeiro token de uma entidade
//! - `I-TIPO`: Inside, tokens seguintes da mesma entidade
//! - `O`: Outside, não é parte de nenhuma entidade
//!
//! O [`TagDecoder`] percorre essas tags junto com os offsets produzidos pelo
//! [tokenizador](crate::tokenizer) e reconstrói [`Span`]s exatos no texto.
//!
//! ## Regras de decodificação
//!
//! | Tag   | Span aberto? | Efeito                                              |
//! |-------|--------------|-----------------------------------------------------|
//! | `B-X` | qualquer     | emite o span aberto (se houver), abre um novo `X`   |
//! | `I-X` | sim          | estende o span aberto até o fim deste token         |
//! | `I-X` | não          | ignorada, equivale a `O`                            |
//! | `O`   | qualquer     | emite o span aberto (se houver)                     |
//!
//! O tipo de uma tag `I-` não é conferido contra o span aberto: o span mantém
//! o tipo do `B-`. Tokens estruturais (sem offsets) nunca movem as bordas de um
//! span, e um `B-` sobre token estrutural ou de largura zero não abre nada. A
//! decodificação para no primeiro token mascarado; um span ainda aberto no fim
//! é emitido.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DecodeError};
use crate::span::{EntityType, Span};
use crate::tokenizer::Token;

/// Tag BIO de um token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// **Begin**: primeiro token de uma entidade. Ex: **Aroha** (B-PER) Ngata.
    Begin(EntityType),
    /// **Inside**: continuação de uma entidade. Ex: Aroha **Ngata** (I-PER).
    Inside(EntityType),
    /// **Outside**: fora de qualquer entidade.
    Outside,
}

impl Tag {
    /// Rótulo textual (`"B-PERSON"`, `"I-LOCATION"`, `"O"`).
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(t) => format!("B-{}", t.name()),
            Tag::Inside(t) => format!("I-{}", t.name()),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Interpreta `"O"`, `"B-PER"`, `"I-LOC"`, `"B-PERSON_OTHER"`, ...
    pub fn from_label(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Tag::Outside);
        }
        let (prefix, kind) = s.split_once('-')?;
        let kind = EntityType::from_label(kind)?;
        match prefix {
            "B" => Some(Tag::Begin(kind)),
            "I" => Some(Tag::Inside(kind)),
            _ => None,
        }
    }

    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            Tag::Begin(t) | Tag::Inside(t) => Some(*t),
            Tag::Outside => None,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Mapeia ids de rótulo do classificador (posição na linha de scores) para tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    tags: Vec<Tag>,
}

impl LabelSet {
    /// Constrói o conjunto a partir dos rótulos, na ordem dos ids.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self, ConfigError> {
        let tags = labels
            .iter()
            .map(|l| Tag::from_label(l.as_ref()).ok_or_else(|| ConfigError::UnknownLabel(l.as_ref().to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        if tags.is_empty() {
            return Err(ConfigError::EmptyRuleGroup("label"));
        }
        Ok(Self { tags })
    }

    pub fn get(&self, id: usize) -> Option<Tag> {
        self.tags.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for LabelSet {
    /// Ordem de rótulos do modelo NER XLM-RoBERTa.
    fn default() -> Self {
        use EntityType::*;
        Self {
            tags: vec![
                Tag::Outside,
                Tag::Begin(Date),
                Tag::Inside(Date),
                Tag::Begin(Person),
                Tag::Inside(Person),
                Tag::Begin(Organization),
                Tag::Inside(Organization),
                Tag::Begin(Location),
                Tag::Inside(Location),
            ],
        }
    }
}

/// Id do rótulo de maior score em cada linha. Empates ficam com o menor id.
pub fn argmax_labels(scores: &[Vec<f32>]) -> Result<Vec<usize>, DecodeError> {
    scores
        .iter()
        .enumerate()
        .map(|(index, row)| {
            if row.is_empty() || row.iter().any(|s| !s.is_finite()) {
                return Err(DecodeError::InvalidScores { index });
            }
            let mut best = 0;
            for (id, score) in row.iter().enumerate().skip(1) {
                if *score > row[best] {
                    best = id;
                }
            }
            Ok(best)
        })
        .collect()
}

/// Span em construção.
struct OpenSpan {
    entity_type: EntityType,
    start: usize,
    end: usize,
}

/// Reconstrói spans a partir das tags BIO de cada token.
#[derive(Debug, Clone)]
pub struct TagDecoder {
    labels: LabelSet,
    /// Confiança constante atribuída a todo span decodificado.
    confidence: f64,
    source: String,
}

impl TagDecoder {
    pub const DEFAULT_CONFIDENCE: f64 = 0.85;

    pub fn new(labels: LabelSet) -> Self {
        Self {
            labels,
            confidence: Self::DEFAULT_CONFIDENCE,
            source: "token_classifier".to_string(),
        }
    }

    /// Troca a confiança atribuída aos spans. Valores fora de `0.0..=1.0`
    /// são erro de configuração.
    pub fn with_confidence(mut self, confidence: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ConfigError::InvalidConfidence {
                rule: self.source,
                value: confidence,
            });
        }
        self.confidence = confidence;
        Ok(self)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Decodifica `label_ids` (um por token) em spans sobre `text`.
    ///
    /// Os tokens são lidos até a primeira posição com `attention_mask` 0.
    /// `label_ids` precisa cobrir todos os tokens atendidos.
    pub fn decode(
        &self,
        text: &str,
        tokens: &[Token],
        attention_mask: &[u8],
        label_ids: &[usize],
    ) -> Result<Vec<Span>, DecodeError> {
        let active = tokens
            .iter()
            .zip(attention_mask)
            .take_while(|(_, m)| **m != 0)
            .count();
        if label_ids.len() < active {
            return Err(DecodeError::LengthMismatch {
                expected: active,
                actual: label_ids.len(),
            });
        }

        let mut spans = Vec::new();
        let mut open: Option<OpenSpan> = None;

        for (index, token) in tokens[..active].iter().enumerate() {
            let label = label_ids[index];
            let tag = self
                .labels
                .get(label)
                .ok_or(DecodeError::UnknownLabel { index, label })?;

            match tag {
                Tag::Begin(entity_type) => {
                    if let Some(done) = open.take() {
                        spans.push(self.emit(text, done, index)?);
                    }
                    open = token
                        .offsets
                        .filter(|(start, end)| start < end)
                        .map(|(start, end)| OpenSpan {
                            entity_type,
                            start,
                            end,
                        });
                }
                Tag::Inside(_) => {
                    if let (Some(current), Some((_, end))) = (open.as_mut(), token.offsets) {
                        current.end = current.end.max(end);
                    }
                }
                Tag::Outside => {
                    if let Some(done) = open.take() {
                        spans.push(self.emit(text, done, index)?);
                    }
                }
            }
        }

        if let Some(done) = open.take() {
            spans.push(self.emit(text, done, active)?);
        }

        Ok(spans)
    }

    fn emit(&self, text: &str, span: OpenSpan, index: usize) -> Result<Span, DecodeError> {
        Span::from_range(
            text,
            span.start,
            span.end,
            span.entity_type,
            self.confidence,
            self.source.as_str(),
        )
        .ok_or(DecodeError::OffsetOutOfBounds {
            index,
            start: span.start,
            end: span.end,
        })
    }
}

impl Default for TagDecoder {
    fn default() -> Self {
        Self::new(LabelSet::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(offsets: Option<(usize, usize)>) -> Token {
        Token { id: 0, offsets }
    }

    fn labels(names: &[&str]) -> Vec<usize> {
        let set = LabelSet::default();
        names
            .iter()
            .map(|n| {
                let tag = Tag::from_label(n).unwrap();
                (0..set.len()).find(|&i| set.get(i) == Some(tag)).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_tag_labels() {
        assert_eq!(Tag::Outside.label(), "O");
        assert_eq!(Tag::Begin(EntityType::Person).label(), "B-PERSON");
        assert_eq!(Tag::from_label("I-LOC"), Some(Tag::Inside(EntityType::Location)));
        assert_eq!(Tag::from_label("B-PERSON_OTHER"), Some(Tag::Begin(EntityType::PersonOther)));
        assert_eq!(Tag::from_label("X-PER"), None);
        assert_eq!(Tag::from_label("B-MISC"), None);
    }

    #[test]
    fn test_label_set_from_labels() {
        let set = LabelSet::from_labels(&["O", "B-PER", "I-PER"]).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(1), Some(Tag::Begin(EntityType::Person)));
        assert!(LabelSet::from_labels(&["O", "B-MISC"]).is_err());
    }

    #[test]
    fn test_decode_person_and_location() {
        let text = "Kiri Moana  Takapuna";
        let tokens = vec![
            tok(None),
            tok(Some((0, 4))),
            tok(Some((5, 10))),
            tok(Some((11, 11))),
            tok(Some((12, 20))),
        ];
        let mask = vec![1; 5];
        let ids = labels(&["O", "B-PER", "I-PER", "O", "B-LOC"]);

        let spans = TagDecoder::default().decode(text, &tokens, &mask, &ids).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].end), (0, 10));
        assert_eq!(spans[0].entity_type, EntityType::Person);
        assert_eq!((spans[1].start, spans[1].end), (12, 20));
        assert_eq!(spans[1].entity_type, EntityType::Location);
        assert_eq!(spans[0].confidence, TagDecoder::DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_inside_without_open_span_is_outside() {
        let text = "Kia ora Mere";
        let tokens = vec![tok(Some((0, 3))), tok(Some((4, 7))), tok(Some((8, 12)))];
        let ids = labels(&["I-PER", "O", "I-PER"]);
        let spans = TagDecoder::default().decode(text, &tokens, &[1, 1, 1], &ids).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_inside_type_is_not_cross_checked() {
        let text = "Mere Auckland";
        let tokens = vec![tok(Some((0, 4))), tok(Some((5, 13)))];
        let ids = labels(&["B-PER", "I-LOC"]);
        let spans = TagDecoder::default().decode(text, &tokens, &[1, 1], &ids).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Mere Auckland");
        assert_eq!(spans[0].entity_type, EntityType::Person);
    }

    #[test]
    fn test_begin_closes_open_span_and_mask_stops_walk() {
        let text = "Hana Kiri Mere";
        let tokens = vec![tok(Some((0, 4))), tok(Some((5, 9))), tok(Some((10, 14)))];
        let ids = labels(&["B-PER", "B-PER", "B-PER"]);
        let spans = TagDecoder::default().decode(text, &tokens, &[1, 1, 0], &ids).unwrap();
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Hana", "Kiri"]);
    }

    #[test]
    fn test_structural_tokens_never_move_boundaries() {
        let text = "Rangi";
        let tokens = vec![tok(Some((0, 5))), tok(None)];
        let ids = labels(&["B-PER", "I-PER"]);
        let spans = TagDecoder::default().decode(text, &tokens, &[1, 1], &ids).unwrap();
        assert_eq!((spans[0].start, spans[0].end), (0, 5));

        let ids = labels(&["O", "B-PER"]);
        let spans = TagDecoder::default()
            .decode(text, &[tok(Some((0, 5))), tok(None)], &[1, 1], &ids)
            .unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_begin_on_zero_width_token_opens_nothing() {
        let text = "Kiri Moana  Takapuna";
        let tokens = vec![
            tok(None),
            tok(Some((0, 4))),
            tok(Some((5, 10))),
            tok(Some((11, 11))),
            tok(Some((12, 20))),
        ];
        let ids = labels(&["O", "B-PER", "I-PER", "B-LOC", "O"]);
        let spans = TagDecoder::default().decode(text, &tokens, &[1; 5], &ids).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Kiri Moana");

        // I- num token de largura zero não encolhe nem quebra o span
        let ids = labels(&["O", "B-PER", "I-PER", "I-PER", "B-LOC"]);
        let spans = TagDecoder::default().decode(text, &tokens, &[1; 5], &ids).unwrap();
        let found: Vec<_> = spans.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(found, vec![(0, 11), (12, 20)]);
    }

    #[test]
    fn test_with_confidence_is_validated() {
        let decoder = TagDecoder::default().with_confidence(0.7).unwrap();
        let spans = decoder
            .decode("Tane", &[tok(Some((0, 4)))], &[1], &labels(&["B-PER"]))
            .unwrap();
        assert_eq!(spans[0].confidence, 0.7);

        assert!(matches!(
            TagDecoder::default().with_confidence(7.0),
            Err(ConfigError::InvalidConfidence { value, .. }) if value == 7.0
        ));
        assert!(TagDecoder::default().with_confidence(-0.1).is_err());
        assert!(TagDecoder::default().with_confidence(f64::NAN).is_err());
    }

    #[test]
    fn test_decode_errors() {
        let text = "Tane";
        let tokens = vec![tok(Some((0, 4)))];
        let decoder = TagDecoder::default();

        assert!(matches!(
            decoder.decode(text, &tokens, &[1], &[]),
            Err(DecodeError::LengthMismatch { expected: 1, actual: 0 })
        ));
        assert!(matches!(
            decoder.decode(text, &tokens, &[1], &[42]),
            Err(DecodeError::UnknownLabel { index: 0, label: 42 })
        ));
        let far = vec![tok(Some((0, 40)))];
        assert!(matches!(
            decoder.decode(text, &far, &[1], &labels(&["B-PER"])),
            Err(DecodeError::OffsetOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_argmax_labels() {
        let scores = vec![vec![0.1, 2.0, 0.3], vec![1.0, 1.0, 0.5]];
        assert_eq!(argmax_labels(&scores).unwrap(), vec![1, 0]);
        assert!(matches!(
            argmax_labels(&[vec![]]),
            Err(DecodeError::InvalidScores { index: 0 })
        ));
        assert!(argmax_labels(&[vec![f32::NAN, 1.0]]).is_err());
    }
}
