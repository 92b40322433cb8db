//! Weighted multi-field fuzzy index.

use super::scoring::{WindowMatch, best_window, combine};
use super::tokenize::{fold, is_blank, tokenize};
use crate::catalog::{Business, Review};
use crate::config::{BusinessWeights, ReviewWeights};
use serde::Serialize;

/// A searchable field of a catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Description,
    Category,
    Location,
    Tags,
    Title,
    Content,
}

/// Records that expose text fields to the index.
pub trait Searchable {
    /// All text values of `field`. Single-valued fields return one element.
    fn field_values(&self, field: Field) -> Vec<&str>;
}

impl Searchable for Business {
    fn field_values(&self, field: Field) -> Vec<&str> {
        match field {
            Field::Name => vec![self.name.as_str()],
            Field::Description => vec![self.description.as_str()],
            Field::Category => vec![self.category.as_str()],
            Field::Location => vec![self.location.as_str()],
            Field::Tags => self.tags.iter().map(String::as_str).collect(),
            Field::Title | Field::Content => vec![],
        }
    }
}

impl Searchable for Review {
    fn field_values(&self, field: Field) -> Vec<&str> {
        match field {
            Field::Title => vec![self.title.as_str()],
            Field::Content => vec![self.content.as_str()],
            Field::Tags => self.tags.iter().map(String::as_str).collect(),
            _ => vec![],
        }
    }
}

/// Field weights for one record type. Fields with weight 0 are not indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldWeights(Vec<(Field, f64)>);

impl FieldWeights {
    pub fn new(weights: impl IntoIterator<Item = (Field, f64)>) -> Self {
        Self(weights.into_iter().filter(|(_, w)| *w > 0.0).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        self.0.iter().copied()
    }
}

impl From<&BusinessWeights> for FieldWeights {
    fn from(w: &BusinessWeights) -> Self {
        Self::new([
            (Field::Name, w.name),
            (Field::Description, w.description),
            (Field::Category, w.category),
            (Field::Location, w.location),
            (Field::Tags, w.tags),
        ])
    }
}

impl From<&ReviewWeights> for FieldWeights {
    fn from(w: &ReviewWeights) -> Self {
        Self::new([
            (Field::Title, w.title),
            (Field::Content, w.content),
            (Field::Tags, w.tags),
        ])
    }
}

/// A matched region of one field value, in character offsets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSpan {
    pub field: Field,
    /// Which value of a multi-valued field (tags) matched; 0 otherwise.
    pub value_index: usize,
    pub start: usize,
    pub end: usize,
    /// The matched characters as they appear in the record.
    pub text: String,
}

/// One record returned by [`FuzzyIndex::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    /// Position of the record in the indexed corpus.
    pub doc: usize,
    pub score: f64,
    pub matches: Vec<MatchSpan>,
}

#[derive(Debug, Clone)]
struct IndexedValue {
    original: Vec<char>,
    folded: Vec<char>,
}

#[derive(Debug, Clone)]
struct IndexedField {
    field: Field,
    weight: f64,
    values: Vec<IndexedValue>,
}

/// Pre-folded field text for a corpus, searched with bounded edit distance.
#[derive(Debug, Clone)]
pub struct FuzzyIndex {
    docs: Vec<Vec<IndexedField>>,
    threshold: f64,
}

impl FuzzyIndex {
    /// Index `records` under `weights`. Records keep their corpus positions.
    pub fn build<T: Searchable>(records: &[T], weights: &FieldWeights, threshold: f64) -> Self {
        let start = std::time::Instant::now();

        let docs: Vec<Vec<IndexedField>> = records
            .iter()
            .map(|record| {
                weights
                    .iter()
                    .map(|(field, weight)| IndexedField {
                        field,
                        weight,
                        values: record
                            .field_values(field)
                            .into_iter()
                            .map(|value| IndexedValue {
                                original: value.chars().collect(),
                                folded: fold(value),
                            })
                            .collect(),
                    })
                    .collect()
            })
            .collect();

        tracing::debug!(
            "Built fuzzy index: {} documents, {} fields, threshold {} in {:?}",
            docs.len(),
            weights.0.len(),
            threshold,
            start.elapsed()
        );

        Self { docs, threshold }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scores every record against `query`, best (lowest) score first.
    ///
    /// A blank query returns the whole corpus in order with score 0 and no
    /// spans. A query with no token of usable length returns nothing. Equal
    /// scores keep corpus order.
    pub fn search(&self, query: &str) -> Vec<IndexHit> {
        if is_blank(query) {
            return (0..self.docs.len())
                .map(|doc| IndexHit {
                    doc,
                    score: 0.0,
                    matches: Vec::new(),
                })
                .collect();
        }

        let tokens = tokenize(query);
        if tokens.is_empty() {
            tracing::debug!("Query '{}' has no token long enough to match", query);
            return Vec::new();
        }

        let mut hits: Vec<IndexHit> = self
            .docs
            .iter()
            .enumerate()
            .filter_map(|(doc, fields)| self.score_doc(doc, fields, &tokens))
            .collect();

        // Stable: ties stay in corpus order
        hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        hits
    }

    /// Every token must match some field; the record score is the mean token score.
    fn score_doc(&self, doc: usize, fields: &[IndexedField], tokens: &[Vec<char>]) -> Option<IndexHit> {
        let mut total = 0.0;
        let mut matches = Vec::new();

        for token in tokens {
            let (score, spans) = self.score_token(fields, token)?;
            total += score;
            matches.extend(spans);
        }

        Some(IndexHit {
            doc,
            score: total / tokens.len() as f64,
            matches,
        })
    }

    /// Best window of `token` in each field, combined across the matched fields.
    ///
    /// `None` when no field holds an acceptable window for the token.
    fn score_token(&self, fields: &[IndexedField], token: &[char]) -> Option<(f64, Vec<MatchSpan>)> {
        let mut field_scores = Vec::new();
        let mut spans = Vec::new();

        for field in fields {
            let best = field
                .values
                .iter()
                .enumerate()
                .filter_map(|(i, value)| {
                    best_window(token, &value.folded, self.threshold).map(|m| (i, m))
                })
                .min_by(|(_, a), (_, b)| a.score.total_cmp(&b.score));

            if let Some((value_index, window)) = best {
                field_scores.push((window.score, field.weight));
                spans.push(span(field, value_index, window));
            }
        }

        if field_scores.is_empty() {
            return None;
        }
        Some((combine(field_scores), spans))
    }
}

fn span(field: &IndexedField, value_index: usize, window: WindowMatch) -> MatchSpan {
    let value = &field.values[value_index];
    MatchSpan {
        field: field.field,
        value_index,
        start: window.start,
        end: window.end,
        text: value.original[window.start..window.end].iter().collect(),
    }
}
