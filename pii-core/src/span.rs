//! # Spans e Tipos de Entidade
//!
//! Um [`Span`] é uma ocorrência candidata de PII: uma faixa de bytes do texto
//! original com rótulo e confiança. Todos os reconhecedores, e também o
//! decodificador de tags, produzem spans; a etapa de
//! [`consolidate`](crate::consolidate) os combina.
//!
//! ## Tipos de Entidade
//!
//! | Rótulo            | Significado                              | Exemplos                    |
//! |-------------------|------------------------------------------|-----------------------------|
//! | `PERSON`          | Pessoa, papel desconhecido               | John Smith                  |
//! | `PERSON_CLIENT`   | O cliente / paciente                     |                             |
//! | `PERSON_PROVIDER` | Clínico ou prestador                     |                             |
//! | `PERSON_OTHER`    | Família, amigos, terceiros               | Aroha, Ngata                |
//! | `DATE`            | Datas de calendário                      | 12/03/2021, 4 March 2020    |
//! | `LOCATION`        | Endereços, bairros, cidades, hospitais   | 12 Queen Street, Otahuhu    |
//! | `ORGANIZATION`    | Conselhos de saúde, clínicas             | Waitemata DHB               |
//! | `IDENTIFIER`      | Números NHI, ACC, MRN                    | ABC1234, ACC 123456         |
//! | `CONTACT`         | Telefones                                | 021-555-1234                |

use serde::{Deserialize, Serialize};

/// Conjunto fechado de rótulos que um span pode ter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Person,
    PersonClient,
    PersonProvider,
    PersonOther,
    Date,
    Location,
    Organization,
    Identifier,
    Contact,
}

impl EntityType {
    /// Rótulo como aparece nos arquivos de configuração e na saída.
    pub fn name(&self) -> &'static str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::PersonClient => "PERSON_CLIENT",
            EntityType::PersonProvider => "PERSON_PROVIDER",
            EntityType::PersonOther => "PERSON_OTHER",
            EntityType::Date => "DATE",
            EntityType::Location => "LOCATION",
            EntityType::Organization => "ORGANIZATION",
            EntityType::Identifier => "IDENTIFIER",
            EntityType::Contact => "CONTACT",
        }
    }

    /// Aceita o rótulo completo (`"LOCATION"`) ou a forma abreviada usada
    /// pelos classificadores de tokens (`"LOC"`, `"PER"`, `"ORG"`).
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "PERSON" | "PER" => Some(EntityType::Person),
            "PERSON_CLIENT" => Some(EntityType::PersonClient),
            "PERSON_PROVIDER" => Some(EntityType::PersonProvider),
            "PERSON_OTHER" => Some(EntityType::PersonOther),
            "DATE" => Some(EntityType::Date),
            "LOCATION" | "LOC" => Some(EntityType::Location),
            "ORGANIZATION" | "ORG" => Some(EntityType::Organization),
            "IDENTIFIER" | "ID" => Some(EntityType::Identifier),
            "CONTACT" => Some(EntityType::Contact),
            _ => None,
        }
    }

    /// Verdadeiro para as quatro variantes de pessoa.
    pub fn is_person(&self) -> bool {
        matches!(
            self,
            EntityType::Person
                | EntityType::PersonClient
                | EntityType::PersonProvider
                | EntityType::PersonOther
        )
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Uma ocorrência candidata de PII.
///
/// `start`/`end` são offsets UTF-8 em bytes, intervalo semiaberto, e são a
/// única posição confiável. `text` é uma cópia de `original[start..end]`
/// feita na criação do span; nunca é recalculada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub entity_type: EntityType,
    pub start: usize,
    pub end: usize,
    /// Confiança em 0.0..=1.0
    pub confidence: f64,
    /// Qual reconhecedor produziu o span. Só diagnóstico, nunca usado no desempate.
    pub source: String,
}

impl Span {
    /// Recorta um span de `original`.
    ///
    /// Devolve `None` quando a faixa é vazia ou invertida, passa do fim do
    /// texto ou não cai em fronteira de caractere.
    pub fn from_range(
        original: &str,
        start: usize,
        end: usize,
        entity_type: EntityType,
        confidence: f64,
        source: impl Into<String>,
    ) -> Option<Self> {
        if start >= end {
            return None;
        }
        let text = original.get(start..end)?;
        Some(Self {
            text: text.to_string(),
            entity_type,
            start,
            end,
            confidence,
            source: source.into(),
        })
    }

    /// Interseção de intervalos semiabertos.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.end > other.start && other.end > self.start
    }

    /// Tamanho da cópia do texto, em caracteres.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
