//! # Tokenizador de Subpalavras
//!
//! Transforma o texto bruto na sequência de ids de tamanho fixo que um modelo
//! de classificação de tokens espera, lembrando exatamente de quais bytes do
//! texto original cada token veio. São esses offsets que permitem ao
//! [decodificador de tags](crate::tagger) transformar rótulos por token de
//! volta em spans exatos.
//!
//! ## Algoritmo
//!
//! 1. Divide o texto em espaços em branco, guardando o offset de cada palavra.
//! 2. Em cada palavra, pega o **maior prefixo** do resto ainda não consumido
//!    que exista no vocabulário. Na primeira subpalavra a busca é feita com o
//!    marcador de início de palavra (`▁`) na frente, então `"New"` no início
//!    de uma palavra vira `"▁New"` e não `"New"`.
//! 3. Se nenhum prefixo casa, consome exatamente um caractere: peça marcada,
//!    peça sem marcador ou o id desconhecido, nesta ordem.
//! 4. Para quando existem `max_len - 1` tokens (token inicial incluído), mesmo
//!    no meio de uma palavra, e fecha com o separador. Completa com padding
//!    até `max_len`.
//!
//! Cada passo consome ao menos um caractere: o laço sempre termina e os
//! offsets só andam para frente.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use pii_core::tokenizer::{SubwordTokenizer, TokenizerConfig, Vocabulary};
//!
//! let vocab = Vocabulary::from_json(r#"{"<s>":0,"<pad>":1,"</s>":2,"<unk>":3,"▁New":4,"▁York":5}"#).unwrap();
//! let tokenizer = SubwordTokenizer::new(vocab, TokenizerConfig { max_len: 8, ..Default::default() }).unwrap();
//!
//! let encoding = tokenizer.encode("New York");
//! assert_eq!(encoding.input_ids(), vec![0, 4, 5, 2, 1, 1, 1, 1]);
//! assert_eq!(encoding.tokens[2].offsets, Some((4, 8)));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Marcador de início de palavra dos vocabulários SentencePiece (U+2581).
pub const WORD_PREFIX: char = '\u{2581}';

/// Mapeamento bidirecional peça ↔ id. Carregado uma vez e compartilhado só para leitura.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    ids: HashMap<String, u32>,
    pieces: HashMap<u32, String>,
    /// Maior peça, em caracteres. Limita a busca de prefixos.
    max_piece_chars: usize,
}

impl Vocabulary {
    /// Constrói o vocabulário a partir de pares `(peça, id)`. Peças e ids
    /// precisam ser únicos.
    pub fn from_pieces<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut ids = HashMap::new();
        let mut pieces = HashMap::new();
        let mut max_piece_chars = 0;

        for (piece, id) in entries {
            let piece = piece.into();
            if let Some(existing) = ids.get(&piece) {
                return Err(ConfigError::Vocabulary(format!(
                    "piece `{piece}` is assigned to both {existing} and {id}"
                )));
            }
            if let Some(existing) = pieces.get(&id) {
                return Err(ConfigError::Vocabulary(format!(
                    "id {id} is assigned to both `{existing}` and `{piece}`"
                )));
            }
            max_piece_chars = max_piece_chars.max(piece.chars().count());
            pieces.insert(id, piece.clone());
            ids.insert(piece, id);
        }

        if ids.is_empty() {
            return Err(ConfigError::Vocabulary("vocabulary is empty".to_string()));
        }

        Ok(Self {
            ids,
            pieces,
            max_piece_chars,
        })
    }

    /// Lê o objeto JSON exportado `{ "peça": id, ... }`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let map: HashMap<String, u32> = serde_json::from_str(json)?;
        Self::from_pieces(map)
    }

    /// Lê um arquivo de vocabulário.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn id(&self, piece: &str) -> Option<u32> {
        self.ids.get(piece).copied()
    }

    pub fn piece(&self, id: u32) -> Option<&str> {
        self.pieces.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Tamanho da sequência e ids reservados. Os padrões seguem o XLM-RoBERTa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Tamanho fixo `L` da saída, padding incluído.
    pub max_len: usize,
    pub start_id: u32,
    pub pad_id: u32,
    pub sep_id: u32,
    /// Substituído pelo id de `<unk>` quando o vocabulário o tiver.
    pub unk_id: u32,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            max_len: 512,
            start_id: 0,
            pad_id: 1,
            sep_id: 2,
            unk_id: 3,
        }
    }
}

/// Um token de um [`Encoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Id no vocabulário.
    pub id: u32,
    /// Faixa de bytes no texto original. `None` para tokens estruturais
    /// (início, separador, padding).
    pub offsets: Option<(usize, usize)>,
}

impl Token {
    fn structural(id: u32) -> Self {
        Self { id, offsets: None }
    }

    pub fn is_structural(&self) -> bool {
        self.offsets.is_none()
    }
}

/// Saída de [`SubwordTokenizer::encode`]: exatamente `max_len` tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encoding {
    pub tokens: Vec<Token>,
    /// 1 para início, texto e separador; 0 para padding.
    pub attention_mask: Vec<u8>,
    /// Verdadeiro quando o orçamento de tokens acabou antes do texto.
    pub truncated: bool,
}

impl Encoding {
    pub fn input_ids(&self) -> Vec<u32> {
        self.tokens.iter().map(|t| t.id).collect()
    }

    /// Quantidade de tokens fora do padding.
    pub fn active_len(&self) -> usize {
        self.attention_mask.iter().take_while(|&&m| m == 1).count()
    }
}

/// Tokenizador guloso de subpalavras, maior casamento primeiro.
#[derive(Debug, Clone)]
pub struct SubwordTokenizer {
    vocab: Arc<Vocabulary>,
    config: TokenizerConfig,
}

impl SubwordTokenizer {
    pub fn new(vocab: impl Into<Arc<Vocabulary>>, config: TokenizerConfig) -> Result<Self, ConfigError> {
        if config.max_len < 2 {
            return Err(ConfigError::TokenBudget(config.max_len));
        }
        let vocab = vocab.into();
        let config = TokenizerConfig {
            unk_id: vocab.id("<unk>").unwrap_or(config.unk_id),
            ..config
        };
        Ok(Self { vocab, config })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Tokeniza `text` em exatamente `max_len` tokens. Nunca falha: caracteres
    /// fora do vocabulário viram o id desconhecido.
    pub fn encode(&self, text: &str) -> Encoding {
        let max_len = self.config.max_len;
        let budget = max_len - 1;
        let mut tokens = Vec::with_capacity(max_len);
        let mut truncated = false;
        tokens.push(Token::structural(self.config.start_id));

        'words: for (word_start, word) in split_words(text) {
            let mut consumed = 0;
            let mut is_first = true;

            while consumed < word.len() {
                if tokens.len() >= budget {
                    truncated = true;
                    break 'words;
                }
                let rest = &word[consumed..];
                let Some((id, len)) = self
                    .longest_match(rest, is_first)
                    .or_else(|| self.single_char(rest, is_first))
                else {
                    break;
                };
                let start = word_start + consumed;
                tokens.push(Token {
                    id,
                    offsets: Some((start, start + len)),
                });
                consumed += len;
                is_first = false;
            }
        }

        if truncated {
            debug!(max_len, text_len = text.len(), "input truncated at token budget");
        }

        tokens.push(Token::structural(self.config.sep_id));
        let mut attention_mask = vec![1u8; tokens.len()];
        tokens.resize(max_len, Token::structural(self.config.pad_id));
        attention_mask.resize(max_len, 0);

        Encoding {
            tokens,
            attention_mask,
            truncated,
        }
    }

    /// Maior prefixo de `rest` presente no vocabulário, como `(id, bytes consumidos)`.
    /// O marcador sozinho nunca casa: não consumiria nada.
    fn longest_match(&self, rest: &str, is_first: bool) -> Option<(u32, usize)> {
        let mut candidate = String::with_capacity(rest.len() + WORD_PREFIX.len_utf8());
        if is_first {
            candidate.push(WORD_PREFIX);
        }
        let base = candidate.len();

        let ends: Vec<usize> = rest
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .take(self.vocab.max_piece_chars)
            .collect();

        for &end in ends.iter().rev() {
            candidate.truncate(base);
            candidate.push_str(&rest[..end]);
            if let Some(id) = self.vocab.id(&candidate) {
                return Some((id, end));
            }
        }
        None
    }

    /// Fallback de um caractere: peça marcada, peça sem marcador, depois desconhecido.
    fn single_char(&self, rest: &str, is_first: bool) -> Option<(u32, usize)> {
        let c = rest.chars().next()?;
        let bare = c.to_string();
        let marked = is_first
            .then(|| format!("{WORD_PREFIX}{c}"))
            .and_then(|piece| self.vocab.id(&piece));
        let id = marked
            .or_else(|| self.vocab.id(&bare))
            .unwrap_or(self.config.unk_id);
        Some((id, c.len_utf8()))
    }
}

/// Divide em espaços em branco, devolvendo pares `(offset em bytes, palavra)`.
pub fn split_words(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut current_start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(start) = current_start.take() {
                words.push((start, &text[start..i]));
            }
        } else if current_start.is_none() {
            current_start = Some(i);
        }
    }
    if let Some(start) = current_start {
        words.push((start, &text[start..]));
    }
    words
}
