//! # pii-core — Detecção e Consolidação de Spans de PII
//!
//! Encontra trechos que identificam pessoas (nomes, datas, lugares,
//! identificadores, contatos) em texto livre e junta os candidatos de vários
//! reconhecedores independentes numa lista limpa e sem sobreposições, pronta
//! para a etapa de redação.
//!
//! ## Arquitetura
//!
//! 1.  **Entrada**: texto bruto (`&str`). Posições são offsets UTF-8 em bytes.
//! 2.  **Reconhecedores** ([`rule_based`]), cada um função pura do texto e da
//!     sua seção do [`rules::RuleSet`]:
//!     *   regras de padrão (telefones, NHI, endereços, datas),
//!     *   dicionário de nomes e padrão fonético de nomes,
//!     *   contexto de parentesco ("my mother Aroha").
//! 3.  **Caminho do modelo** ([`model`]): o [`tokenizer`] transforma o texto
//!     em ids de subpalavras de tamanho fixo, um [`model::TokenClassifier`]
//!     externo os rotula e o [`tagger`] decodifica os rótulos BIO em spans.
//! 4.  **Consolidação** ([`consolidate`]): resolução de sobreposições por
//!     confiança e depois tamanho, seguida de deduplicação.
//! 5.  **Saída**: lista de [`Span`]s ordenada pelo offset de início.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use pii_core::{PiiPipeline, RuleSet};
//!
//! let pipeline = PiiPipeline::from_rules(&RuleSet::default()).unwrap();
//! let detection = pipeline.detect("My mother Aroha Ngata called from 021-555-1234");
//!
//! for span in &detection.entities {
//!     println!("{} {} [{}..{}] {:.2}", span.entity_type, span.text, span.start, span.end, span.confidence);
//! }
//! assert_eq!(detection.entities.len(), 3);
//! ```

pub mod consolidate;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod recognizer;
pub mod rule_based;
pub mod rules;
pub mod span;
pub mod tagger;
pub mod tokenizer;

pub use error::{ClassifierError, ConfigError, DecodeError};
pub use model::{ModelSession, TokenClassifier};
pub use pipeline::{Detection, PiiPipeline, PipelineEvent, SourceFailure};
pub use recognizer::Recognizer;
pub use rules::RuleSet;
pub use span::{EntityType, Span};
pub use tagger::{LabelSet, Tag, TagDecoder};
pub use tokenizer::{Encoding, SubwordTokenizer, Token, TokenizerConfig, Vocabulary};
