//! Keyword matching of free-text queries against notes.
//!
//! A query is split on whitespace into lowercase terms. A note matches a term
//! when the term is a substring of the lowercased value of one of its indexed
//! fields (see [`Note::indexed_fields`]). How per-term results combine is set
//! by [`MatchPolicy`]; the default accepts a note as soon as any term hits.
//!
//! Filtering never reorders: the result is a sub-sequence of the input, so
//! whatever order the document store returned (newest first) is preserved.

use std::str::FromStr;

use serde::Serialize;

use crate::types::Note;

/// How the per-term results of a multi-term query are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MatchPolicy {
    /// Include a note if at least one term matches at least one field.
    #[default]
    #[serde(rename = "any")]
    AnyTerm,
    /// Include a note only if every term matches at least one field.
    #[serde(rename = "all")]
    AllTerms,
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "or" => Ok(Self::AnyTerm),
            "all" | "and" => Ok(Self::AllTerms),
            other => Err(format!("unknown match policy: {other}")),
        }
    }
}

/// A parsed query, ready to test notes against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteMatcher {
    terms: Vec<String>,
    policy: MatchPolicy,
}

impl NoteMatcher {
    pub fn new(query: &str) -> Self {
        Self::with_policy(query, MatchPolicy::default())
    }

    pub fn with_policy(query: &str, policy: MatchPolicy) -> Self {
        Self {
            terms: tokenize(query),
            policy,
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// True when the query had no terms, in which case everything matches.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches(&self, note: &Note) -> bool {
        if self.terms.is_empty() {
            return true;
        }

        let fields: Vec<String> = note
            .indexed_fields()
            .iter()
            .map(|f| f.to_lowercase())
            .collect();
        let hit = |term: &String| fields.iter().any(|f| f.contains(term.as_str()));

        match self.policy {
            MatchPolicy::AnyTerm => self.terms.iter().any(hit),
            MatchPolicy::AllTerms => self.terms.iter().all(hit),
        }
    }

    /// Keep the notes that match, in their original order.
    pub fn filter<'a, I>(&self, notes: I) -> Vec<Note>
    where
        I: IntoIterator<Item = &'a Note>,
    {
        notes
            .into_iter()
            .filter(|note| self.matches(note))
            .cloned()
            .collect()
    }
}

/// Convenience wrapper for the default policy.
pub fn filter_notes(query: &str, notes: &[Note]) -> Vec<Note> {
    NoteMatcher::new(query).filter(notes)
}

fn tokenize(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in query.split_whitespace().map(str::to_lowercase) {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}
