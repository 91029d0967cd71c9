//! # Consolidação — Resolução de Sobreposições e Deduplicação
//!
//! Os candidatos de todos os reconhecedores viram uma única lista, ordenada
//! pelo offset de início, sem dois spans sobrepostos e sem dois com a mesma
//! chave `(texto minúsculo, start, end)`.
//!
//! As duas etapas rodam sempre nesta ordem. Deduplicar antes poderia manter
//! dois spans sobrepostos cujos textos diferem só na caixa.

use std::collections::HashSet;

use crate::span::Span;

/// Resolve sobreposições e depois descarta duplicatas exatas.
///
/// ```
/// use pii_core::consolidate::consolidate;
/// use pii_core::span::{EntityType, Span};
///
/// let text = "My mother Aroha Ngata called";
/// let person = |s, e, c| Span::from_range(text, s, e, EntityType::PersonOther, c, "test").unwrap();
///
/// let merged = consolidate(vec![person(10, 21, 0.9), person(10, 15, 0.95), person(16, 21, 0.95)]);
/// let texts: Vec<_> = merged.iter().map(|s| s.text.as_str()).collect();
/// assert_eq!(texts, ["Aroha", "Ngata"]);
/// ```
pub fn consolidate(candidates: Vec<Span>) -> Vec<Span> {
    deduplicate(remove_overlaps(candidates))
}

/// `true` quando `challenger` vence `current`: confiança estritamente maior,
/// ou confiança igual e mais caracteres. Empate total mantém `current`.
fn wins(challenger: &Span, current: &Span) -> bool {
    challenger.confidence > current.confidence
        || (challenger.confidence == current.confidence
            && challenger.char_len() > current.char_len())
}

/// Ordena por `(start asc, end desc)` e varre, mantendo um vencedor por
/// grupo de sobreposição. Perdedores são descartados e nunca reconsiderados.
pub fn remove_overlaps(mut candidates: Vec<Span>) -> Vec<Span> {
    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut consumed = vec![false; candidates.len()];
    let mut kept = Vec::with_capacity(candidates.len());

    for i in 0..candidates.len() {
        if consumed[i] {
            continue;
        }
        consumed[i] = true;
        let mut current = i;

        for j in (i + 1)..candidates.len() {
            if consumed[j] || !candidates[current].overlaps(&candidates[j]) {
                continue;
            }
            consumed[j] = true;
            if wins(&candidates[j], &candidates[current]) {
                current = j;
            }
        }
        kept.push(current);
    }

    // Vencedores saem na ordem da varredura, que é a ordem de início.
    let mut slots: Vec<Option<Span>> = candidates.into_iter().map(Some).collect();
    kept.into_iter().filter_map(|i| slots[i].take()).collect()
}

/// Mantém o primeiro span de cada chave `(texto minúsculo, start, end)`.
pub fn deduplicate(spans: Vec<Span>) -> Vec<Span> {
    let mut seen = HashSet::new();
    spans
        .into_iter()
        .filter(|s| seen.insert((s.text.to_lowercase(), s.start, s.end)))
        .collect()
}
