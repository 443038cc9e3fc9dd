//! "Did you mean" suggestions for mistyped commands and flags.

use crate::registry::{CommandRegistry, KeyKind};
use std::cmp::Ordering;
use strsim::{jaro_winkler, levenshtein};

pub const MAX_SUGGESTIONS: usize = 5;
const MAX_DISTANCE: usize = 2;
const MIN_SIMILARITY: f64 = 0.95;

struct Candidate<'a> {
    text: &'a str,
    order: usize,
    distance: usize,
    similarity: f64,
}

/// Rank `candidates` by closeness to `input`.
///
/// A candidate is kept when its edit distance is at most 2 or its
/// Jaro-Winkler similarity is at least 0.95. Results are ordered by distance,
/// then similarity, then input order, and capped at [`MAX_SUGGESTIONS`].
pub fn closest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let input = input.to_lowercase();
    let mut ranked: Vec<Candidate<'a>> = candidates
        .into_iter()
        .enumerate()
        .filter_map(|(order, text)| {
            let lowered = text.to_lowercase();
            let distance = levenshtein(&input, &lowered);
            let similarity = jaro_winkler(&input, &lowered);
            (distance <= MAX_DISTANCE || similarity >= MIN_SIMILARITY).then_some(Candidate {
                text,
                order,
                distance,
                similarity,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.distance
            .cmp(&b.distance)
            .then_with(|| b.similarity.partial_cmp(&a.similarity).unwrap_or(Ordering::Equal))
            .then_with(|| a.order.cmp(&b.order))
    });
    ranked.dedup_by(|a, b| a.text == b.text);
    ranked
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|c| c.text)
        .collect()
}

/// Suggestions for an unknown command string, formatted for display.
///
/// Keys that name a command directly are shown as-is; alias keys are shown
/// as `"kvs (alias for key-value-stores)"`. Hidden commands and hidden
/// aliases are never suggested.
pub fn suggest_commands(registry: &CommandRegistry, input: &str) -> Vec<String> {
    let listed: Vec<(&str, &str, KeyKind, &str)> = registry
        .entries()
        .filter(|(_, entry)| entry.is_listed())
        .map(|(key, entry)| {
            (
                key,
                entry.path(),
                entry.kind(),
                entry.command().descriptor().name(),
            )
        })
        .collect();

    closest(input, listed.iter().map(|(key, ..)| *key))
        .into_iter()
        .filter_map(|key| listed.iter().find(|(k, ..)| *k == key))
        .map(|(key, path, kind, own_name)| {
            let names_command = *kind == KeyKind::Canonical
                || key.rsplit(' ').next() == Some(*own_name);
            if names_command {
                key.to_string()
            } else {
                format!("{key} (alias for {path})")
            }
        })
        .collect()
}
