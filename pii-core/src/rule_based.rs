//! # Reconhecedores Baseados em Regras — Padrões, Léxicos e Contexto
//!
//! Quatro reconhecedores independentes, cada um função pura do texto e da sua
//! configuração imutável:
//!
//! - [`PatternRecognizer`]: expressões regulares com confiança fixa por regra
//!   (telefones, números NHI e ACC, endereços, datas).
//! - [`DictionaryRecognizer`]: busca de palavras inteiras nos léxicos de
//!   nomes e sobrenomes.
//! - [`PhoneticRecognizer`]: um padrão sonoro estrutural (grupos `wh`/`ng`,
//!   sequências de vogais) para nomes fora do léxico, com confiança menor.
//! - [`ContextualRecognizer`]: uma palavra de parentesco seguida de uma ou
//!   duas palavras capitalizadas ("my mother Aroha Ngata"); só o nome fica.
//!
//! Os reconhecedores podem devolver spans sobrepostos, tanto na própria saída
//! (entre regras ou gatilhos) quanto entre si. O
//! [consolidador](crate::consolidate) resolve isso depois.
//!
//! Todas as expressões regulares são compiladas na construção; um padrão
//! inválido ou um grupo de regras vazio é [`ConfigError`] ali, nunca um
//! resultado vazio depois.

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;

use crate::error::ConfigError;
use crate::rules::{ContextConfig, LexiconConfig, PatternRule};
use crate::span::{EntityType, Span};
use crate::tokenizer::split_words;

fn check_confidence(rule: &str, value: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidConfidence {
            rule: rule.to_string(),
            value,
        })
    }
}

fn compile(rule: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        rule: rule.to_string(),
        source,
    })
}

// ============================================================================
// Reconhecedor de padrões
// ============================================================================

#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    regex: Regex,
    confidence: f64,
    entity_type: EntityType,
}

/// Lista ordenada de regras regex.
#[derive(Debug, Clone)]
pub struct PatternRecognizer {
    rules: Vec<CompiledRule>,
}

impl PatternRecognizer {
    pub fn new(rules: &[PatternRule]) -> Result<Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::EmptyRuleGroup("pattern"));
        }
        let rules = rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    name: rule.name.clone(),
                    regex: compile(&rule.name, &rule.pattern)?,
                    confidence: check_confidence(&rule.name, rule.confidence)?,
                    entity_type: rule.entity_type,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { rules })
    }

    /// Todos os casamentos sem sobreposição de cada regra, na ordem das regras.
    pub fn detect(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        for rule in &self.rules {
            for m in rule.regex.find_iter(text) {
                spans.extend(Span::from_range(
                    text,
                    m.start(),
                    m.end(),
                    rule.entity_type,
                    rule.confidence,
                    rule.name.as_str(),
                ));
            }
        }
        spans
    }
}

// ============================================================================
// Léxico: dicionário + fonético
// ============================================================================

/// Conjuntos de nomes e sobrenomes, compartilhados só para leitura entre os
/// reconhecedores de dicionário e fonético.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    first_names: HashSet<String>,
    last_names: HashSet<String>,
}

impl Lexicon {
    pub fn new(config: &LexiconConfig) -> Result<Self, ConfigError> {
        if config.first_names.is_empty() && config.last_names.is_empty() {
            return Err(ConfigError::EmptyRuleGroup("lexicon"));
        }
        Ok(Self {
            first_names: config.first_names.iter().cloned().collect(),
            last_names: config.last_names.iter().cloned().collect(),
        })
    }

    /// Pertinência exata, sensível à caixa, em qualquer um dos conjuntos.
    pub fn contains(&self, word: &str) -> bool {
        self.first_names.contains(word) || self.last_names.contains(word)
    }
}

fn check_distinct(config: &LexiconConfig) -> Result<(), ConfigError> {
    if config.dictionary_confidence == config.phonetic_confidence {
        return Err(ConfigError::IndistinctConfidence(config.dictionary_confidence));
    }
    Ok(())
}

/// Busca de palavras inteiras no léxico.
#[derive(Debug, Clone)]
pub struct DictionaryRecognizer {
    lexicon: Arc<Lexicon>,
    strip_chars: Vec<char>,
    confidence: f64,
    entity_type: EntityType,
}

impl DictionaryRecognizer {
    pub const SOURCE: &'static str = "dictionary";

    pub fn new(lexicon: Arc<Lexicon>, config: &LexiconConfig) -> Result<Self, ConfigError> {
        check_distinct(config)?;
        Ok(Self {
            lexicon,
            strip_chars: config.strip_chars.chars().collect(),
            confidence: check_confidence(Self::SOURCE, config.dictionary_confidence)?,
            entity_type: config.entity_type,
        })
    }

    pub fn detect(&self, text: &str) -> Vec<Span> {
        let is_strip = |c: char| self.strip_chars.contains(&c);
        let mut spans = Vec::new();

        for (word_start, word) in split_words(text) {
            let front_trimmed = word.trim_start_matches(is_strip);
            let clean = front_trimmed.trim_end_matches(is_strip);
            if clean.is_empty() || !self.lexicon.contains(clean) {
                continue;
            }
            let start = word_start + (word.len() - front_trimmed.len());
            spans.extend(Span::from_range(
                text,
                start,
                start + clean.len(),
                self.entity_type,
                self.confidence,
                Self::SOURCE,
            ));
        }
        spans
    }
}

/// Padrão estrutural para nomes fora do léxico.
#[derive(Debug, Clone)]
pub struct PhoneticRecognizer {
    lexicon: Arc<Lexicon>,
    pattern: Regex,
    false_positives: HashSet<String>,
    confidence: f64,
    entity_type: EntityType,
}

impl PhoneticRecognizer {
    pub const SOURCE: &'static str = "phonetic";

    pub fn new(lexicon: Arc<Lexicon>, config: &LexiconConfig) -> Result<Self, ConfigError> {
        check_distinct(config)?;
        Ok(Self {
            lexicon,
            pattern: compile(Self::SOURCE, &config.phonetic_pattern)?,
            false_positives: config.false_positives.iter().cloned().collect(),
            confidence: check_confidence(Self::SOURCE, config.phonetic_confidence)?,
            entity_type: config.entity_type,
        })
    }

    /// Casamentos do padrão fonético, menos falsos positivos conhecidos e
    /// palavras que o dicionário já cobre. As duas checagens comparam
    /// strings, não posições.
    pub fn detect(&self, text: &str) -> Vec<Span> {
        self.pattern
            .find_iter(text)
            .filter(|m| {
                let word = m.as_str();
                !self.false_positives.contains(word) && !self.lexicon.contains(word)
            })
            .filter_map(|m| {
                Span::from_range(
                    text,
                    m.start(),
                    m.end(),
                    self.entity_type,
                    self.confidence,
                    Self::SOURCE,
                )
            })
            .collect()
    }
}

// ============================================================================
// Reconhecedor contextual (parentesco)
// ============================================================================

/// Palavra-gatilho seguida de um nome capitalizado.
#[derive(Debug, Clone)]
pub struct ContextualRecognizer {
    triggers: Vec<Regex>,
    common_words: HashSet<String>,
    confidence: f64,
    entity_type: EntityType,
}

impl ContextualRecognizer {
    pub const SOURCE: &'static str = "relationship";

    pub fn new(config: &ContextConfig) -> Result<Self, ConfigError> {
        if config.triggers.is_empty() {
            return Err(ConfigError::EmptyRuleGroup("trigger"));
        }
        let triggers = config
            .triggers
            .iter()
            .map(|trigger| {
                // O gatilho ignora a caixa, as palavras do nome não.
                let pattern = format!(
                    r"(?i:\b{})\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)",
                    regex::escape(trigger)
                );
                compile(trigger, &pattern)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            triggers,
            common_words: config.common_words.iter().map(|w| w.to_lowercase()).collect(),
            confidence: check_confidence(Self::SOURCE, config.confidence)?,
            entity_type: config.entity_type,
        })
    }

    /// Spans de nome após cada gatilho. Dois gatilhos no mesmo nome geram
    /// dois spans.
    pub fn detect(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        for regex in &self.triggers {
            for caps in regex.captures_iter(text) {
                let Some(name) = caps.get(1) else { continue };
                if self.common_words.contains(&name.as_str().to_lowercase()) {
                    continue;
                }
                spans.extend(Span::from_range(
                    text,
                    name.start(),
                    name.end(),
                    self.entity_type,
                    self.confidence,
                    Self::SOURCE,
                ));
            }
        }
        spans
    }
}
