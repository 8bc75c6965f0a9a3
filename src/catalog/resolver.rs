//! Fuzzy resolution of spoken fragments to catalog entries
//!
//! Tiers, best first: exact normalized match, word-aligned containment,
//! raw substring, bounded edit distance. Ties break on edit distance, the
//! configured alias policy, then the shorter canonical name and the id, so
//! the result is deterministic for a given catalog.

use std::sync::Arc;

use serde::Deserialize;

use super::normalize::{bounded_levenshtein, normalize};
use super::{Catalog, CatalogEntry, Category};

/// Shortest fragment eligible for raw substring matching
const MIN_SUBSTRING_LEN: usize = 3;

/// How alias hits rank against canonical-name hits of the same tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasPolicy {
    /// Aliases and canonical names weigh the same
    #[default]
    Equal,
    /// An alias hit beats a canonical hit of the same tier
    PreferAlias,
    /// A canonical hit beats an alias hit of the same tier
    PreferCanonical,
}

impl AliasPolicy {
    const fn rank(self, via_alias: bool) -> u8 {
        match (self, via_alias) {
            (Self::Equal, _) | (Self::PreferAlias, true) | (Self::PreferCanonical, false) => 0,
            _ => 1,
        }
    }
}

/// Resolver tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    pub alias_policy: AliasPolicy,
    /// Upper bound on the edit distance accepted for any fragment
    pub max_edit_distance: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            alias_policy: AliasPolicy::Equal,
            max_edit_distance: 2,
        }
    }
}

/// How a fragment matched, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    /// Normalized fragment equals the name
    Exact,
    /// The fragment's words appear inside the name
    Contains,
    /// The name's words appear inside the fragment
    Contained,
    /// The fragment is a substring of the name
    Substring,
    /// Within the edit distance budget
    Fuzzy,
}

/// A resolved catalog entry
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub entry: &'a CatalogEntry,
    pub kind: MatchKind,
    pub distance: usize,
    pub via_alias: bool,
}

/// Entry names, normalized once at construction
struct IndexedEntry {
    entry_idx: usize,
    category: Category,
    names: Vec<(String, bool)>,
}

type RankKey<'a> = (MatchKind, usize, u8, usize, &'a str);

/// Resolves spoken fragments against an immutable catalog
pub struct Resolver {
    catalog: Arc<Catalog>,
    entries: Vec<IndexedEntry>,
    config: ResolverConfig,
}

impl Resolver {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, config: ResolverConfig) -> Self {
        let entries = catalog
            .entries
            .iter()
            .enumerate()
            .map(|(entry_idx, entry)| IndexedEntry {
                entry_idx,
                category: entry.category,
                names: entry
                    .names()
                    .map(|(name, via_alias)| (normalize(name), via_alias))
                    .filter(|(name, _)| !name.is_empty())
                    .collect(),
            })
            .collect();

        Self {
            catalog,
            entries,
            config,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Best entry of `category` for `fragment`, or `None` (no match)
    #[must_use]
    pub fn resolve(&self, category: Category, fragment: &str) -> Option<Match<'_>> {
        self.resolve_scoped(category, fragment, None)
    }

    /// Like [`Resolver::resolve`], limited to entries usable with `line_id`
    #[must_use]
    pub fn resolve_scoped(
        &self,
        category: Category,
        fragment: &str,
        line_id: Option<&str>,
    ) -> Option<Match<'_>> {
        let query = normalize(fragment);
        if query.is_empty() {
            return None;
        }

        let budget = self.edit_budget(&query);
        let mut best: Option<(RankKey<'_>, Match<'_>)> = None;

        for indexed in self.entries.iter().filter(|e| e.category == category) {
            let entry = &self.catalog.entries[indexed.entry_idx];
            if line_id.is_some_and(|line| !entry.serves_line(line)) {
                continue;
            }

            for (name, via_alias) in &indexed.names {
                let Some((kind, distance)) = score(&query, name, budget) else {
                    continue;
                };
                let key = (
                    kind,
                    distance,
                    self.config.alias_policy.rank(*via_alias),
                    entry.canonical_name.chars().count(),
                    entry.id.as_str(),
                );
                if best.as_ref().is_none_or(|(best_key, _)| key < *best_key) {
                    best = Some((
                        key,
                        Match {
                            entry,
                            kind,
                            distance,
                            via_alias: *via_alias,
                        },
                    ));
                }
            }
        }

        let found = best.map(|(_, m)| m);
        match &found {
            Some(m) => tracing::debug!(
                %category,
                fragment,
                id = %m.entry.id,
                name = %m.entry.canonical_name,
                kind = ?m.kind,
                distance = m.distance,
                "resolved fragment"
            ),
            None => tracing::debug!(%category, fragment, "no catalog match"),
        }
        found
    }

    /// Edit distance accepted for a normalized query
    fn edit_budget(&self, query: &str) -> usize {
        let budget = match query.chars().count() {
            0..=3 => 0,
            4..=7 => 1,
            _ => 2,
        };
        budget.min(self.config.max_edit_distance)
    }
}

/// Score a normalized query against a normalized name
fn score(query: &str, name: &str, budget: usize) -> Option<(MatchKind, usize)> {
    if query == name {
        return Some((MatchKind::Exact, 0));
    }

    let padded_query = format!(" {query} ");
    let padded_name = format!(" {name} ");
    if padded_name.contains(&padded_query) {
        return Some((MatchKind::Contains, 0));
    }
    if padded_query.contains(&padded_name) {
        return Some((MatchKind::Contained, 0));
    }
    if query.chars().count() >= MIN_SUBSTRING_LEN && name.contains(query) {
        return Some((MatchKind::Substring, 0));
    }

    bounded_levenshtein(query, name, budget).map(|d| (MatchKind::Fuzzy, d))
}
