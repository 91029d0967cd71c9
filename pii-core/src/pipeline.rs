//! # Pipeline de Detecção — Reconhecedores em Paralelo, Consolidação Sequencial
//!
//! O pipeline é dono do registro de reconhecedores. Uma passada de detecção:
//!
//! 1. Cada reconhecedor varre o texto de forma independente, em paralelo (rayon).
//! 2. Os candidatos são concatenados na ordem do registro.
//! 3. O [consolidador](crate::consolidate) resolve sobreposições e duplicatas.
//!
//! Uma fonte que falha (só a sessão de modelo pode falhar) é registrada no log
//! e reportada em [`Detection::failures`]; os candidatos das outras fontes
//! continuam sendo consolidados e devolvidos, então PII encontrada por padrões
//! é redigida mesmo com o classificador fora do ar.
//!
//! [`PiiPipeline::detect_streaming`] também envia [`PipelineEvent`]s por um
//! canal `mpsc`: um por reconhecedor assim que ele termina (a ordem entre
//! fontes depende do agendamento), depois `Consolidated` e por fim `Done`.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::consolidate::consolidate;
use crate::error::{ConfigError, DecodeError};
use crate::model::ModelSession;
use crate::recognizer::Recognizer;
use crate::rule_based::{
    ContextualRecognizer, DictionaryRecognizer, Lexicon, PatternRecognizer, PhoneticRecognizer,
};
use crate::rules::RuleSet;
use crate::span::Span;

/// Eventos de progresso de uma passada de detecção.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// Uma fonte terminou a varredura.
    RecognizerFinished { source: String, candidates: usize },
    /// Uma fonte falhou; a passada continua sem ela.
    RecognizerFailed { source: String, message: String },
    /// Sobreposições e duplicatas resolvidas.
    Consolidated { before: usize, after: usize },
    /// Spans finais, ordenados pelo offset de início.
    Done {
        entities: Vec<Span>,
        processing_ms: u64,
    },
}

/// Uma fonte que falhou durante a passada.
#[derive(Debug)]
pub struct SourceFailure {
    pub source: String,
    pub error: DecodeError,
}

/// Resultado de [`PiiPipeline::detect`].
#[derive(Debug, Default)]
pub struct Detection {
    /// Spans consolidados, ordenados pelo offset de início.
    pub entities: Vec<Span>,
    pub failures: Vec<SourceFailure>,
    /// Candidatos reunidos antes da consolidação.
    pub candidate_count: usize,
}

impl Detection {
    /// Verdadeiro quando todas as fontes completaram.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Registro de reconhecedores mais o passo de consolidação.
#[derive(Debug, Clone, Default)]
pub struct PiiPipeline {
    recognizers: Vec<Recognizer>,
}

impl PiiPipeline {
    pub fn new(recognizers: Vec<Recognizer>) -> Self {
        Self { recognizers }
    }

    /// Constrói os quatro reconhecedores de texto a partir de um conjunto de
    /// regras. Dicionário e fonético compartilham o mesmo léxico.
    pub fn from_rules(rules: &RuleSet) -> Result<Self, ConfigError> {
        let lexicon = Arc::new(Lexicon::new(&rules.lexicon)?);
        Ok(Self::new(vec![
            PatternRecognizer::new(&rules.patterns)?.into(),
            DictionaryRecognizer::new(Arc::clone(&lexicon), &rules.lexicon)?.into(),
            PhoneticRecognizer::new(lexicon, &rules.lexicon)?.into(),
            ContextualRecognizer::new(&rules.context)?.into(),
        ]))
    }

    /// Adiciona uma fonte baseada em modelo.
    pub fn with_model(mut self, session: ModelSession) -> Self {
        self.recognizers.push(session.into());
        self
    }

    pub fn recognizers(&self) -> &[Recognizer] {
        &self.recognizers
    }

    /// Roda todos os reconhecedores e consolida os candidatos.
    pub fn detect(&self, text: &str) -> Detection {
        self.run(text, None)
    }

    /// Como [`detect`](Self::detect), reportando cada etapa em `tx`. O último
    /// evento é sempre [`PipelineEvent::Done`]. Erros de envio (receptor
    /// descartado) são ignorados.
    pub fn detect_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        self.run(text, Some(&tx));
    }

    fn run(&self, text: &str, tx: Option<&mpsc::Sender<PipelineEvent>>) -> Detection {
        let start = Instant::now();
        let emit = |event: PipelineEvent| {
            if let Some(tx) = tx {
                let _ = tx.send(event);
            }
        };

        // Cada worker envia o evento da sua fonte assim que ela termina.
        let results: Vec<(&Recognizer, Result<Vec<Span>, DecodeError>)> = self
            .recognizers
            .par_iter()
            .map_with(tx.cloned(), |tx, recognizer| {
                let result = recognizer.detect(text);
                let source = recognizer.name().to_string();
                let event = match &result {
                    Ok(spans) => {
                        debug!(source = %source, candidates = spans.len(), "recognizer finished");
                        PipelineEvent::RecognizerFinished {
                            source,
                            candidates: spans.len(),
                        }
                    }
                    Err(error) => {
                        warn!(source = %source, error = %error, "recognizer failed, continuing without it");
                        PipelineEvent::RecognizerFailed {
                            source,
                            message: error.to_string(),
                        }
                    }
                };
                if let Some(tx) = tx {
                    let _ = tx.send(event);
                }
                (recognizer, result)
            })
            .collect();

        let mut candidates = Vec::new();
        let mut failures = Vec::new();
        for (recognizer, result) in results {
            match result {
                Ok(spans) => candidates.extend(spans),
                Err(error) => failures.push(SourceFailure {
                    source: recognizer.name().to_string(),
                    error,
                }),
            }
        }

        let candidate_count = candidates.len();
        let entities = consolidate(candidates);
        emit(PipelineEvent::Consolidated {
            before: candidate_count,
            after: entities.len(),
        });

        let processing_ms = start.elapsed().as_millis() as u64;
        info!(
            candidates = candidate_count,
            entities = entities.len(),
            failures = failures.len(),
            processing_ms,
            "detection pass complete"
        );
        emit(PipelineEvent::Done {
            entities: entities.clone(),
            processing_ms,
        });

        Detection {
            entities,
            failures,
            candidate_count,
        }
    }
}
