//! Reference catalog of known lines, stops and directions
//!
//! Loaded once at startup (embedded default or a TOML file written by
//! `tbm-horaires sync-catalog`) and never mutated afterwards.

pub mod normalize;
pub mod resolver;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub use resolver::{AliasPolicy, Match, MatchKind, Resolver, ResolverConfig};

/// Catalog shipped with the binary
const EMBEDDED_CATALOG: &str = include_str!("default.toml");

/// What a catalog entry names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Line,
    Stop,
    Direction,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Stop => "stop",
            Self::Direction => "direction",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "line" | "ligne" => Ok(Self::Line),
            "stop" | "arret" | "arrêt" => Ok(Self::Stop),
            "direction" | "destination" => Ok(Self::Direction),
            other => Err(Error::Catalog(format!("unknown category: {other}"))),
        }
    }
}

/// A known line, stop or direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub category: Category,
    /// Upstream identifier (`LineRef`, `StopPointRef`, or `<LineRef>-<DirectionRef>`)
    pub id: String,
    pub canonical_name: String,
    pub aliases: BTreeSet<String>,
    /// Lines serving a stop, or the line a direction belongs to. Empty means unrestricted.
    pub lines: Vec<String>,
    /// How a line is said inside a sentence, e.g. "le tram C"
    pub spoken_name: Option<String>,
}

impl CatalogEntry {
    /// Canonical name followed by every alias
    pub fn names(&self) -> impl Iterator<Item = (&str, bool)> {
        std::iter::once((self.canonical_name.as_str(), false))
            .chain(self.aliases.iter().map(|a| (a.as_str(), true)))
    }

    /// Whether this entry can be used together with `line_id`
    #[must_use]
    pub fn serves_line(&self, line_id: &str) -> bool {
        self.lines.is_empty() || self.lines.iter().any(|l| l == line_id)
    }

    /// SIRI `DirectionRef` encoded in a direction id
    #[must_use]
    pub fn direction_ref(&self) -> Option<i64> {
        if self.category != Category::Direction {
            return None;
        }
        let (_, raw) = self.id.rsplit_once('-')?;
        raw.parse().ok()
    }

    /// Name to use inside a sentence
    #[must_use]
    pub fn spoken(&self) -> String {
        match (&self.spoken_name, self.category) {
            (Some(spoken), _) => spoken.clone(),
            (None, Category::Line) => format!("la ligne {}", self.canonical_name),
            (None, _) => self.canonical_name.clone(),
        }
    }
}

/// On-disk catalog layout
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub lines: Vec<EntryFile>,
    #[serde(default)]
    pub stops: Vec<EntryFile>,
    #[serde(default)]
    pub directions: Vec<EntryFile>,
}

/// One entry as written in the catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryFile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spoken_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
}

/// Immutable reference catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<(Category, String), usize>,
}

impl Catalog {
    /// Catalog compiled into the binary
    ///
    /// # Errors
    ///
    /// Returns error if the embedded file is malformed
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_CATALOG)
    }

    /// Load a catalog file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or fails validation
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Catalog(format!("failed to read {}: {e}", path.display()))
        })?;
        let catalog = Self::from_toml_str(&contents)?;
        tracing::info!(
            path = %path.display(),
            entries = catalog.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// Parse a catalog from TOML
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is invalid or the catalog fails validation
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::from_file(file)
    }

    /// Build and validate a catalog
    ///
    /// # Errors
    ///
    /// Returns error on duplicate ids, empty names, malformed direction ids
    /// or references to unknown lines
    pub fn from_file(file: CatalogFile) -> Result<Self> {
        let sections = [
            (Category::Line, file.lines),
            (Category::Stop, file.stops),
            (Category::Direction, file.directions),
        ];

        let mut entries = Vec::new();
        let mut index = HashMap::new();

        for (category, raw_entries) in sections {
            for raw in raw_entries {
                if raw.id.trim().is_empty() || raw.name.trim().is_empty() {
                    return Err(Error::Catalog(format!(
                        "{category} entry with empty id or name: {raw:?}"
                    )));
                }
                let key = (category, raw.id.clone());
                if index.contains_key(&key) {
                    return Err(Error::Catalog(format!("duplicate {category} id: {}", raw.id)));
                }
                index.insert(key, entries.len());
                entries.push(CatalogEntry {
                    category,
                    id: raw.id,
                    canonical_name: raw.name,
                    aliases: raw
                        .aliases
                        .into_iter()
                        .filter(|a| !a.trim().is_empty())
                        .collect(),
                    lines: raw.lines,
                    spoken_name: raw.spoken_name,
                });
            }
        }

        let catalog = Self { entries, index };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let line_ids: HashSet<&str> = self
            .entries(Category::Line)
            .map(|e| e.id.as_str())
            .collect();

        for entry in &self.entries {
            if let Some(unknown) = entry.lines.iter().find(|l| !line_ids.contains(l.as_str())) {
                return Err(Error::Catalog(format!(
                    "{} {} references unknown line {unknown}",
                    entry.category, entry.id
                )));
            }
            if entry.category == Category::Direction && entry.direction_ref().is_none() {
                return Err(Error::Catalog(format!(
                    "direction id must look like <line>-<ref>: {}",
                    entry.id
                )));
            }
        }

        Ok(())
    }

    /// Look up an entry by id
    #[must_use]
    pub fn get(&self, category: Category, id: &str) -> Option<&CatalogEntry> {
        self.index
            .get(&(category, id.to_string()))
            .map(|&i| &self.entries[i])
    }

    /// Entries of one category, in file order
    pub fn entries(&self, category: Category) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert back to the on-disk layout
    #[must_use]
    pub fn to_file(&self) -> CatalogFile {
        let mut file = CatalogFile::default();
        for entry in &self.entries {
            let raw = EntryFile {
                id: entry.id.clone(),
                name: entry.canonical_name.clone(),
                spoken_name: entry.spoken_name.clone(),
                aliases: entry.aliases.iter().cloned().collect(),
                lines: entry.lines.clone(),
            };
            match entry.category {
                Category::Line => file.lines.push(raw),
                Category::Stop => file.stops.push(raw),
                Category::Direction => file.directions.push(raw),
            }
        }
        file
    }

    /// Serialize to TOML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.to_file())?)
    }
}
