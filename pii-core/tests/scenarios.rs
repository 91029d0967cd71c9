//! Cenários de detecção de ponta a ponta pela API pública.

use std::sync::Arc;

use pii_core::{
    ClassifierError, DecodeError, EntityType, LabelSet, ModelSession, PiiPipeline, RuleSet,
    SubwordTokenizer, TagDecoder, Token, TokenClassifier, TokenizerConfig, Vocabulary,
};

fn default_pipeline() -> PiiPipeline {
    PiiPipeline::from_rules(&RuleSet::default()).unwrap()
}

/// B-PER em `▁John`, I-PER em `▁Smith`, O no resto.
struct NamesOnly;

const JOHN: u32 = 4;
const SMITH: u32 = 5;

impl TokenClassifier for NamesOnly {
    fn classify(&self, ids: &[u32], _mask: &[u8]) -> Result<Vec<Vec<f32>>, ClassifierError> {
        let width = LabelSet::default().len();
        Ok(ids
            .iter()
            .map(|&id| {
                let mut row = vec![0.1; width];
                let label = match id {
                    JOHN => 3,
                    SMITH => 4,
                    _ => 0,
                };
                row[label] = 0.9;
                row
            })
            .collect())
    }
}

struct Unreachable;

impl TokenClassifier for Unreachable {
    fn classify(&self, _: &[u32], _: &[u8]) -> Result<Vec<Vec<f32>>, ClassifierError> {
        Err(ClassifierError::Unavailable("timed out".into()))
    }
}

fn session(classifier: Arc<dyn TokenClassifier>) -> ModelSession {
    let vocab = Vocabulary::from_pieces([
        ("<s>", 0),
        ("<pad>", 1),
        ("</s>", 2),
        ("<unk>", 3),
        ("\u{2581}John", JOHN),
        ("\u{2581}Smith", SMITH),
    ])
    .unwrap();
    let tokenizer = SubwordTokenizer::new(vocab, TokenizerConfig::default()).unwrap();
    ModelSession::new(tokenizer, classifier, TagDecoder::default())
}

#[test]
fn phone_number_without_generic_person_recognizer() {
    let text = "John Smith called from 021-555-1234";
    let detection = default_pipeline().detect(text);

    assert_eq!(detection.entities.len(), 1);
    let phone = &detection.entities[0];
    assert_eq!(phone.text, "021-555-1234");
    assert_eq!(phone.entity_type, EntityType::Contact);
    assert_eq!(phone.confidence, 0.95);
    assert_eq!(&text[phone.start..phone.end], phone.text);
}

#[test]
fn dictionary_names_outrank_relationship_span() {
    let text = "My mother Aroha Ngata called";
    let detection = default_pipeline().detect(text);

    let found: Vec<_> = detection
        .entities
        .iter()
        .map(|s| (s.text.as_str(), s.start, s.end, s.confidence))
        .collect();
    assert_eq!(found, vec![("Aroha", 10, 15, 0.95), ("Ngata", 16, 21, 0.95)]);
    assert!(detection.entities.iter().all(|s| s.entity_type.is_person()));
}

#[test]
fn bio_labels_decode_to_two_spans() {
    let text = "Kiri Moana  Takapuna";
    let tokens = [
        Token { id: 0, offsets: None },
        Token { id: 10, offsets: Some((0, 4)) },
        Token { id: 11, offsets: Some((5, 10)) },
        Token { id: 12, offsets: Some((11, 11)) },
        Token { id: 13, offsets: Some((12, 20)) },
    ];
    let labels = LabelSet::from_labels(&["O", "B-PER", "I-PER", "B-LOC"]).unwrap();
    let decoder = TagDecoder::new(labels);
    // O, B-PER, I-PER, O, B-LOC
    let spans = decoder.decode(text, &tokens, &[1; 5], &[0, 1, 2, 0, 3]).unwrap();

    assert_eq!(spans.len(), 2);
    assert_eq!((spans[0].start, spans[0].end, spans[0].entity_type), (0, 10, EntityType::Person));
    assert_eq!((spans[1].start, spans[1].end, spans[1].entity_type), (12, 20, EntityType::Location));
    assert_eq!(spans[1].text, "Takapuna");
}

#[test]
fn model_spans_merge_with_rule_spans() {
    let pipeline = default_pipeline().with_model(session(Arc::new(NamesOnly)));
    let detection = pipeline.detect("John Smith called from 021-555-1234");

    assert!(detection.is_complete());
    let found: Vec<_> = detection
        .entities
        .iter()
        .map(|s| (s.text.as_str(), s.entity_type))
        .collect();
    assert_eq!(
        found,
        vec![("John Smith", EntityType::Person), ("021-555-1234", EntityType::Contact)]
    );
    assert_eq!(detection.entities[0].confidence, TagDecoder::DEFAULT_CONFIDENCE);
}

#[test]
fn unreachable_classifier_degrades_to_rule_spans() {
    let pipeline = default_pipeline().with_model(session(Arc::new(Unreachable)));
    let detection = pipeline.detect("NHI ABC1234, phone 09 555 1234, seen 3 March 2021");

    assert!(!detection.is_complete());
    assert!(matches!(
        detection.failures[0].error,
        DecodeError::Classifier(ClassifierError::Unavailable(_))
    ));
    let found: Vec<_> = detection.entities.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(found, vec!["ABC1234", "09 555 1234", "3 March 2021"]);
}

#[test]
fn rule_override_from_json() {
    let rules = RuleSet::from_json(
        r#"{
            "version": 2,
            "patterns": [
                { "name": "staff_code", "pattern": "\\bSTF-\\d{3}\\b", "confidence": 0.8, "entity_type": "IDENTIFIER" }
            ],
            "context": { "triggers": ["nurse"], "entity_type": "PERSON_PROVIDER" }
        }"#,
    )
    .unwrap();
    let pipeline = PiiPipeline::from_rules(&rules).unwrap();
    let detection = pipeline.detect("Reviewed by nurse Hemi Parata, badge STF-042.");

    let found: Vec<_> = detection
        .entities
        .iter()
        .map(|s| (s.text.as_str(), s.entity_type, s.source.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("Hemi", EntityType::PersonOther, "dictionary"),
            ("Parata", EntityType::PersonOther, "dictionary"),
            ("STF-042", EntityType::Identifier, "staff_code"),
        ]
    );
}

#[test]
fn invalid_rule_fails_at_construction() {
    let rules = RuleSet::from_json(
        r#"{ "patterns": [ { "name": "bad", "pattern": "[0-9", "confidence": 0.8, "entity_type": "DATE" } ] }"#,
    )
    .unwrap();
    let err = PiiPipeline::from_rules(&rules).unwrap_err();
    assert!(err.to_string().contains("bad"));
}
