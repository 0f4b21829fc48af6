//! Candidate retrieval, comparison, and ranking.
//!
//! [`CandidateSelector::select`] drives the whole matching pipeline for one
//! interpretation: retrieve candidate records from the backend, compare each
//! against the query field by field under the country's policies, keep the
//! candidates that clear the potential-match threshold, and rank them. An
//! empty selection is the no-match outcome, not an error.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use tracing::debug;

use crate::address::Address;
use crate::analysis::normalizer::normalize;
use crate::analysis::sequence::Sequence;
use crate::backend::{CandidateQuery, CandidateRecord, SearchBackend, sequence_from_analyzed};
use crate::compare::sequence::{
    POTENTIAL_MATCH_THRESHOLD, SequenceComparator, SequenceComparison,
};
use crate::config::CountryRegistry;
use crate::error::{PostalignError, Result};
use crate::parser::Interpretation;

/// Selector tuning. The defaults are production values.
#[derive(Clone, Debug)]
pub struct SelectorConfig {
    /// Maximum in-flight candidate comparisons.
    pub concurrency: usize,
    /// Potential-match threshold applied to each merged comparison.
    pub threshold: f64,
    /// Backend analyzer used for query fields.
    pub analyzer: String,
    /// Retrieval limit passed to the backend.
    pub max_candidates: usize,
    /// Per-field character cap; longer fields abort matching.
    pub max_field_chars: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            concurrency: 8,
            threshold: POTENTIAL_MATCH_THRESHOLD,
            analyzer: "address".to_string(),
            max_candidates: 100,
            max_field_chars: 512,
        }
    }
}

/// One ranked candidate: the record, its merged comparison, and its original
/// backend retrieval position.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub record: CandidateRecord,
    pub comparison: SequenceComparison,
    pub position: usize,
}

impl Candidate {
    /// Whether the merged comparison is an exact match.
    pub fn is_match(&self) -> bool {
        self.comparison.is_match()
    }
}

/// Candidates that cleared the threshold, best first. Ties on every ranking
/// criterion fall back to backend retrieval order.
#[derive(Clone, Debug, Default)]
pub struct SelectionResult {
    candidates: Vec<Candidate>,
}

impl SelectionResult {
    /// The no-match result.
    pub fn empty() -> Self {
        SelectionResult::default()
    }

    /// Ranked candidates, best first.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// The best-ranked candidate, if any cleared the threshold.
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Whether nothing cleared the threshold.
    pub fn is_no_match(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Consume into the ranked candidate list.
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }
}

enum Outcome {
    Compared {
        position: usize,
        record: CandidateRecord,
        comparison: SequenceComparison,
    },
    Rejected,
}

/// Retrieves, compares, and ranks candidates for one interpretation.
pub struct CandidateSelector {
    backend: Arc<dyn SearchBackend>,
    registry: Arc<CountryRegistry>,
    config: SelectorConfig,
}

impl CandidateSelector {
    /// Create a selector with default tuning.
    pub fn new(backend: Arc<dyn SearchBackend>, registry: Arc<CountryRegistry>) -> Self {
        CandidateSelector {
            backend,
            registry,
            config: SelectorConfig::default(),
        }
    }

    /// Replace the tuning configuration.
    pub fn with_config(mut self, config: SelectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full selection pipeline for one parsed interpretation.
    pub async fn select(
        &self,
        address: &Address,
        interpretation: &Interpretation,
    ) -> Result<SelectionResult> {
        let rules = self.registry.get(address.country_code())?;
        let query_fields = query_fields(address, interpretation);
        if query_fields.is_empty() {
            return Ok(SelectionResult::empty());
        }

        // Degenerate input aborts before any retrieval is issued.
        for (field, text) in &query_fields {
            if !field_is_comparable(text, self.config.max_field_chars) {
                debug!(field = field.as_str(), "query field not comparable, no match");
                return Ok(SelectionResult::empty());
            }
        }

        let records = self
            .backend
            .search(CandidateQuery {
                country_code: rules.code.to_string(),
                fields: query_fields.iter().cloned().collect(),
                limit: self.config.max_candidates,
            })
            .await?;
        if records.is_empty() {
            return Ok(SelectionResult::empty());
        }

        // Query fields are analyzed once, through the same bounded pool the
        // candidate comparisons use, and shared across all of them. `buffered`
        // keeps the field merge order.
        let analyze_jobs = query_fields.iter().cloned().map(|(field, text)| {
            let backend = Arc::clone(&self.backend);
            let analyzer = self.config.analyzer.clone();
            async move {
                let tokens = backend.analyze(analyzer, text.clone()).await?;
                Ok::<(String, Sequence), PostalignError>((
                    field,
                    sequence_from_analyzed(&text, tokens),
                ))
            }
        });
        let mut analyses = stream::iter(analyze_jobs).buffered(self.config.concurrency.max(1));
        let mut query_sequences: Vec<(String, Sequence)> = Vec::with_capacity(query_fields.len());
        while let Some(result) = analyses.next().await {
            match result {
                Ok(pair) => query_sequences.push(pair),
                Err(error) => {
                    while analyses.next().await.is_some() {}
                    return Err(error);
                }
            }
        }
        let query_sequences = Arc::new(query_sequences);
        let field_names: Vec<String> = query_fields.iter().map(|(f, _)| f.clone()).collect();

        let jobs = records.into_iter().enumerate().map(|(position, record)| {
            let backend = Arc::clone(&self.backend);
            let query_sequences = Arc::clone(&query_sequences);
            let policies = rules.policies.clone();
            let field_names = field_names.clone();
            let max_field_chars = self.config.max_field_chars;

            async move {
                for text in record.fields.values() {
                    if !field_is_comparable(text, max_field_chars) {
                        return Ok::<Outcome, PostalignError>(Outcome::Rejected);
                    }
                }

                let vectors = backend
                    .term_vectors(vec![record.id.clone()], field_names)
                    .await?;
                let doc = vectors.into_iter().next();

                // Each candidate gets a fresh comparator; the memo cache is
                // never shared across tasks.
                let mut comparator = SequenceComparator::new();
                let mut merged: Option<SequenceComparison> = None;
                for (field, query_sequence) in query_sequences.iter() {
                    let source = record.fields.get(field).map(String::as_str).unwrap_or("");
                    let candidate_sequence =
                        match doc.as_ref().and_then(|d| d.fields.get(field)) {
                            Some(tokens) => sequence_from_analyzed(source, tokens.clone()),
                            None => Sequence::from_string(source),
                        };
                    let comparison = comparator.compare(query_sequence, &candidate_sequence);
                    let comparison = policies.get(field).apply(&comparison);
                    merged = Some(match merged {
                        Some(m) => m.merge(&comparison),
                        None => comparison,
                    });
                }

                Ok(Outcome::Compared {
                    position,
                    record,
                    comparison: merged.unwrap_or_default(),
                })
            }
        });

        let mut in_flight = stream::iter(jobs).buffer_unordered(self.config.concurrency.max(1));
        let mut selected: Vec<Candidate> = Vec::new();
        let mut rejected = false;
        let mut failure: Option<PostalignError> = None;
        while let Some(result) = in_flight.next().await {
            match result {
                Err(error) => {
                    failure = Some(error);
                    break;
                }
                Ok(Outcome::Rejected) => {
                    rejected = true;
                    break;
                }
                Ok(Outcome::Compared {
                    position,
                    record,
                    comparison,
                }) => {
                    if comparison.is_potential_match(self.config.threshold) {
                        selected.push(Candidate {
                            record,
                            comparison,
                            position,
                        });
                    }
                }
            }
        }
        if failure.is_some() || rejected {
            // The backend has no cancellation protocol, so already-issued
            // work is always awaited before reporting the outcome.
            while in_flight.next().await.is_some() {}
        }
        if let Some(error) = failure {
            return Err(error);
        }
        if rejected {
            debug!("candidate field not comparable, selection aborted");
            return Ok(SelectionResult::empty());
        }

        selected.sort_by(|a, b| {
            a.comparison
                .cmp(&b.comparison)
                .then(a.position.cmp(&b.position))
        });
        debug!(count = selected.len(), "candidates ranked");
        Ok(SelectionResult {
            candidates: selected,
        })
    }
}

/// The query fields compared for one interpretation, in merge order.
fn query_fields(address: &Address, interpretation: &Interpretation) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut push = |name: &str, value: Option<&str>| {
        if let Some(v) = value {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                fields.push((name.to_string(), trimmed.to_string()));
            }
        }
    };

    push("building_num", interpretation.building_num.as_deref());
    push("street", interpretation.street.as_deref());
    push("unit_num", interpretation.unit_num.as_deref());
    push("po_box", interpretation.po_box.as_deref());
    push(
        "city",
        interpretation.post_town.as_deref().or_else(|| address.city()),
    );
    push("zip", address.zip());
    fields
}

/// Whether a field can meaningfully enter comparison: bounded length and a
/// script the grammars and normalizer cover.
fn field_is_comparable(text: &str, max_chars: usize) -> bool {
    if text.chars().count() > max_chars {
        return false;
    }
    normalize(text)
        .chars()
        .all(|c| !c.is_alphabetic() || c.is_ascii_alphabetic())
}
