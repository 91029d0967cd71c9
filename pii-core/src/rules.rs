//! # Conjuntos de Regras — Configuração Estática dos Reconhecedores
//!
//! Os reconhecedores de texto são dirigidos por dados: expressões regulares
//! com confiança fixa, léxicos de nomes, palavras-gatilho e listas de
//! exclusão. Um [`RuleSet`] reúne tudo isso. Ele é construído uma vez (com os
//! padrões embutidos da Nova Zelândia ou a partir de um JSON), entregue aos
//! construtores dos reconhecedores e nunca mais alterado.
//!
//! ## Formato JSON
//!
//! ```json
//! {
//!   "version": 1,
//!   "patterns": [
//!     { "name": "nz_mobile", "pattern": "\\b0(21|22|27|29)[\\s-]?\\d{3}[\\s-]?\\d{4}\\b",
//!       "confidence": 0.95, "entity_type": "CONTACT" }
//!   ],
//!   "lexicon": { "first_names": ["Aroha"], "last_names": ["Ngata"] },
//!   "context": { "triggers": ["mother"] }
//! }
//! ```
//!
//! Seções e campos ausentes assumem os valores padrão.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::span::EntityType;

/// Uma regra de expressão regular.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Nome da regra, reportado como `source` do span.
    pub name: String,
    pub pattern: String,
    pub confidence: f64,
    pub entity_type: EntityType,
}

impl PatternRule {
    pub fn new(name: &str, pattern: &str, confidence: f64, entity_type: EntityType) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            confidence,
            entity_type,
        }
    }
}

/// Léxicos de nomes compartilhados pelos reconhecedores de dicionário e fonético.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
    /// Palavras que casam com o padrão fonético mas nunca são nomes.
    pub false_positives: Vec<String>,
    /// Caracteres removidos das pontas de cada palavra antes da busca.
    pub strip_chars: String,
    /// Padrão estrutural para nomes fora do léxico.
    pub phonetic_pattern: String,
    pub dictionary_confidence: f64,
    pub phonetic_confidence: f64,
    pub entity_type: EntityType,
}

/// Palavras-gatilho do reconhecedor contextual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub triggers: Vec<String>,
    /// Palavras minúsculas nunca aceitas como nome.
    pub common_words: Vec<String>,
    pub confidence: f64,
    pub entity_type: EntityType,
}

/// Configuração completa e versionada dos reconhecedores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub version: u32,
    pub patterns: Vec<PatternRule>,
    pub lexicon: LexiconConfig,
    pub context: ContextConfig,
}

impl RuleSet {
    /// Lê um conjunto de regras de JSON. Campos ausentes assumem o padrão.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Lê e interpreta um arquivo de regras.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            version: 1,
            patterns: default_patterns(),
            lexicon: LexiconConfig::default(),
            context: ContextConfig::default(),
        }
    }
}

const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";

/// Regras de padrão embutidas: telefones da NZ, identificadores de saúde,
/// endereços e lugares, conselhos de saúde e datas.
pub fn default_patterns() -> Vec<PatternRule> {
    use EntityType::*;

    vec![
        // Telefones
        PatternRule::new("nz_mobile", r"\b0(21|22|27|29)[\s-]?\d{3}[\s-]?\d{4}\b", 0.95, Contact),
        PatternRule::new("nz_landline", r"\b0[3-9][\s-]?\d{3}[\s-]?\d{4}\b", 0.9, Contact),
        PatternRule::new("nz_international", r"\+64[\s-]?\d{1,2}[\s-]?\d{3}[\s-]?\d{4}\b", 0.95, Contact),
        PatternRule::new("nz_freephone", r"\b0800[\s-]?\d{3}[\s-]?\d{3}\b", 0.9, Contact),
        // Identificadores de saúde
        PatternRule::new("nhi", r"\b[A-Z]{3}\d{4}\b", 0.85, Identifier),
        PatternRule::new("acc_case", r"\bACC\s?\d{5,}\b", 0.9, Identifier),
        PatternRule::new("record_id", r"\b(?:MRN|Case|ID)\s*[:#]?\s*[A-Z0-9-]{4,}\b", 0.8, Identifier),
        PatternRule::new("record_prefixed", r"\b(?:MR|CR|UR)-\d{5,}\b", 0.85, Identifier),
        // Lugares
        PatternRule::new(
            "street_address",
            r"\d+\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s+(?:Road|Street|Terrace|Avenue|Drive|Lane|Place|Crescent|Way|Grove|Close|Court)\b",
            0.9,
            Location,
        ),
        PatternRule::new(
            "auckland_suburb",
            r"\b(?:Otahuhu|Manukau|Papatoetoe|Mangere|Mt Eden|Ponsonby|Parnell|Remuera|Epsom|Newmarket|Grey Lynn|Avondale|New Lynn|Henderson|Albany|Takapuna|Devonport|Ellerslie|Panmure|Howick|Pakuranga|Botany|Flat Bush)\b",
            0.95,
            Location,
        ),
        PatternRule::new(
            "nz_city",
            r"\b(?:Wellington|Christchurch|Dunedin|Hamilton|Tauranga|Napier|Hastings|Palmerston North|Rotorua|Nelson|Queenstown|Invercargill|Whangarei)\b",
            0.95,
            Location,
        ),
        PatternRule::new(
            "nz_hospital",
            r"\b(?:Auckland|Middlemore|North Shore|Waitakere|Starship|Greenlane|Wellington|Hutt|Christchurch|Dunedin)\s+Hospital\b",
            0.95,
            Location,
        ),
        PatternRule::new(
            "health_board",
            r"\b(?:Auckland|Waitemata|Counties Manukau|Canterbury|Southern|Capital & Coast|Hutt Valley)\s+(?:DHB|District Health Board|Clinic)\b",
            0.9,
            Organization,
        ),
        // Datas
        PatternRule::new("date_dmy_slash", r"\b\d{1,2}/\d{1,2}/\d{4}\b", 0.95, Date),
        PatternRule::new("date_dmy_dash", r"\b\d{1,2}-\d{1,2}-\d{4}\b", 0.95, Date),
        PatternRule::new("date_iso", r"\b\d{4}-\d{1,2}-\d{1,2}\b", 0.95, Date),
        PatternRule::new(
            "date_month_day_year",
            &format!(r"\b(?:{MONTHS})\s+\d{{1,2}},?\s+\d{{4}}\b"),
            0.95,
            Date,
        ),
        PatternRule::new(
            "date_day_month_year",
            &format!(r"\b\d{{1,2}}\s+(?:{MONTHS})\s+\d{{4}}\b"),
            0.95,
            Date,
        ),
        PatternRule::new(
            "date_day_mon_year",
            r"\b\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{4}\b",
            0.9,
            Date,
        ),
    ]
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|s| s.to_string()).collect()
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            first_names: strings(&[
                // Masculinos
                "Wiremu", "Hemi", "Pita", "Rawiri", "Mikaere", "Tane", "Rangi",
                "Tamati", "Hohepa", "Aperahama", "Timoti", "Hone", "Paora",
                // Femininos
                "Aroha", "Kiri", "Mere", "Hana", "Anahera", "Moana", "Ngaire",
                "Whetu", "Kahu", "Ataahua", "Hinewai", "Hine", "Marama", "Ariana",
            ]),
            last_names: strings(&[
                "Ngata", "Te Ao", "Tawhiri", "Wairua", "Takiri",
                "Parata", "Ngati", "Whaanga", "Eruera",
            ]),
            false_positives: strings(&[
                "Where", "When", "What", "Thing", "Something", "Anything",
                "Whither", "Whether", "Whence",
            ]),
            strip_chars: ".,;:!?\"'()".to_string(),
            phonetic_pattern: r"\b[A-Z][a-z]*(?:wh|ng)[a-z]+|\b[A-Z][aeiouAEIOU]{2,}[a-z]*\b"
                .to_string(),
            dictionary_confidence: 0.95,
            phonetic_confidence: 0.6,
            entity_type: EntityType::PersonOther,
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            triggers: strings(&[
                // Família
                "mother", "father", "sister", "brother", "son", "daughter",
                "grandmother", "grandfather", "grandma", "grandpa",
                "aunt", "uncle", "cousin", "niece", "nephew",
                "stepmother", "stepfather", "stepsister", "stepbrother",
                "whanau", "whangai",
                // Parceiros
                "wife", "husband", "partner", "spouse", "fiance", "fiancee",
                "boyfriend", "girlfriend", "ex-wife", "ex-husband",
                // Social
                "friend", "flatmate", "roommate", "colleague", "coworker",
                "neighbor", "neighbour", "mate", "buddy",
            ]),
            common_words: strings(&[
                "the", "a", "an",
                "and", "but", "or", "nor", "for", "yet", "so",
                "in", "on", "at", "to", "from", "with", "by", "of", "about",
                "he", "she", "it", "they", "we", "you", "i",
                "him", "her", "them", "us", "me",
                "his", "its", "their", "our", "your", "my",
                "is", "was", "are", "were", "be", "been", "being",
                "have", "has", "had", "do", "does", "did",
                "this", "that", "these", "those",
                "when", "where", "what", "which", "who", "why", "how",
                "patient", "treatment", "therapy", "care", "health",
                "medical", "clinical", "hospital", "clinic", "doctor",
                "mother", "father", "sister", "brother", "son", "daughter",
                "wife", "husband", "partner", "friend", "family", "whanau",
            ]),
            confidence: 0.9,
            entity_type: EntityType::PersonOther,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_compile() {
        for rule in default_patterns() {
            assert!(
                regex::Regex::new(&rule.pattern).is_ok(),
                "rule {} failed to compile",
                rule.name
            );
        }
        assert!(regex::Regex::new(&LexiconConfig::default().phonetic_pattern).is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let rules = RuleSet::from_json(r#"{ "context": { "triggers": ["aunty"] } }"#).unwrap();
        assert_eq!(rules.context.triggers, vec!["aunty".to_string()]);
        assert_eq!(rules.context.confidence, 0.9);
        assert_eq!(rules.patterns.len(), default_patterns().len());
        assert!(rules.lexicon.first_names.contains(&"Aroha".to_string()));
    }

    #[test]
    fn test_json_round_trip_of_pattern_rule() {
        let json = r#"{
            "patterns": [
                { "name": "nhi", "pattern": "\\b[A-Z]{3}\\d{4}\\b", "confidence": 0.85, "entity_type": "IDENTIFIER" }
            ]
        }"#;
        let rules = RuleSet::from_json(json).unwrap();
        assert_eq!(rules.patterns.len(), 1);
        assert_eq!(rules.patterns[0].entity_type, EntityType::Identifier);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = RuleSet::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
