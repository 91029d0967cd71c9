//! # Sessão de Modelo — Tokenizador, Classificador e Decodificador
//!
//! O classificador de tokens vive fora deste crate (um runtime ONNX, um
//! serviço remoto, um stub de teste). [`TokenClassifier`] é a fronteira: recebe
//! o vetor de ids de tamanho fixo e a máscara de atenção produzidos pelo
//! [`SubwordTokenizer`] e devolve uma linha de scores por token.
//!
//! Uma [`ModelSession`] é dona de um tokenizador, um classificador e um
//! [`TagDecoder`]. Ela é construída explicitamente por quem chama e entregue ao
//! pipeline; não existe cache global de modelo.

use std::sync::Arc;

use tracing::debug;

use crate::error::{ClassifierError, DecodeError};
use crate::span::Span;
use crate::tagger::{argmax_labels, TagDecoder};
use crate::tokenizer::SubwordTokenizer;

/// Classificador externo, um vetor de scores por token.
///
/// Implementações devolvem exatamente uma linha por id de entrada, cada linha
/// cobrindo o conjunto de rótulos do decodificador. Linhas de padding
/// (máscara 0) nunca são lidas.
pub trait TokenClassifier: Send + Sync {
    fn classify(
        &self,
        input_ids: &[u32],
        attention_mask: &[u8],
    ) -> Result<Vec<Vec<f32>>, ClassifierError>;
}

/// Tudo o que é preciso para transformar texto em spans do modelo.
#[derive(Clone)]
pub struct ModelSession {
    tokenizer: SubwordTokenizer,
    classifier: Arc<dyn TokenClassifier>,
    decoder: TagDecoder,
}

impl ModelSession {
    pub fn new(
        tokenizer: SubwordTokenizer,
        classifier: Arc<dyn TokenClassifier>,
        decoder: TagDecoder,
    ) -> Self {
        Self {
            tokenizer,
            classifier,
            decoder,
        }
    }

    /// Nome da fonte reportado em cada span desta sessão.
    pub fn source(&self) -> &str {
        self.decoder.source()
    }

    /// Tokeniza `text`, roda o classificador e decodifica o arg-max dos tokens
    /// atendidos.
    ///
    /// Falhas do classificador e saídas malformadas viram [`DecodeError`];
    /// nenhuma sequência de rótulos padrão é inventada.
    pub fn detect(&self, text: &str) -> Result<Vec<Span>, DecodeError> {
        let encoding = self.tokenizer.encode(text);
        let input_ids = encoding.input_ids();

        let scores = self.classifier.classify(&input_ids, &encoding.attention_mask)?;
        if scores.len() != encoding.tokens.len() {
            return Err(DecodeError::LengthMismatch {
                expected: encoding.tokens.len(),
                actual: scores.len(),
            });
        }

        let label_ids = argmax_labels(&scores[..encoding.active_len()])?;
        let spans = self.decoder.decode(
            text,
            &encoding.tokens,
            &encoding.attention_mask,
            &label_ids,
        )?;
        debug!(
            tokens = encoding.active_len(),
            truncated = encoding.truncated,
            spans = spans.len(),
            "model session decoded"
        );
        Ok(spans)
    }
}

impl std::fmt::Debug for ModelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSession")
            .field("tokenizer", &self.tokenizer)
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}
