use crate::model::{compare_labels, SearchResult};

pub const LABEL_WEIGHT: f64 = 10.0;
pub const ALIAS_WEIGHT: f64 = 5.0;
pub const DETAILS_WEIGHT: f64 = 1.0;
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.4;

/// Characters from the start of a field after which a match costs its full
/// weight in position penalty.
pub const MATCH_DISTANCE: f64 = 100.0;

/// Stand-in for a perfect field score so it still contributes to the
/// weighted product.
const PERFECT_SCORE_FLOOR: f64 = f64::EPSILON;

/// Approximate ranking over the candidate pool of one round.
///
/// Each field gets a dissimilarity in `0.0..=1.0` (lower is closer): the
/// edit errors of the best approximate occurrence of the query divided by
/// the query length, plus that occurrence's distance from the start of the
/// field divided by [`MATCH_DISTANCE`]. A candidate survives when at least
/// one field scores at or under the threshold; survivors are ordered by
/// their weighted score to pick the top `max_displayed`, which are then
/// re-ordered by label for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingEngine {
    threshold: f64,
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl RankingEngine {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn rank(&self, candidates: Vec<SearchResult>, query: &str, max_displayed: usize) -> Vec<SearchResult> {
        if max_displayed == 0 || candidates.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, usize, SearchResult)> = if query.trim().is_empty() {
            candidates
                .into_iter()
                .enumerate()
                .map(|(index, candidate)| (self.threshold, index, candidate))
                .collect()
        } else {
            let mut scorer = FieldScorer::new(query, self.threshold);
            candidates
                .into_iter()
                .enumerate()
                .filter_map(|(index, candidate)| {
                    self.score_candidate(&mut scorer, &candidate)
                        .map(|score| (score, index, candidate))
                })
                .collect()
        };

        // Equal scores keep pool order.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        scored.truncate(max_displayed);

        let mut ranked: Vec<SearchResult> = scored.into_iter().map(|(_, _, candidate)| candidate).collect();
        ranked.sort_by(|a, b| compare_labels(a.label(), b.label()));
        ranked
    }

    fn score_candidate(&self, scorer: &mut FieldScorer, candidate: &SearchResult) -> Option<f64> {
        let mut matched = Vec::new();
        let mut record = |text: &str, weight: f64, scorer: &mut FieldScorer| {
            if let Some(score) = scorer.dissimilarity(text).filter(|score| *score <= self.threshold) {
                matched.push((score, weight * field_norm(text)));
            }
        };

        record(candidate.label(), LABEL_WEIGHT, scorer);
        for alias in candidate.alias_terms() {
            record(alias, ALIAS_WEIGHT, scorer);
        }
        record(candidate.details(), DETAILS_WEIGHT, scorer);

        if matched.is_empty() {
            return None;
        }

        let total_weight = LABEL_WEIGHT + ALIAS_WEIGHT + DETAILS_WEIGHT;
        Some(
            matched
                .into_iter()
                .map(|(score, weight)| score.max(PERFECT_SCORE_FLOOR).powf(weight / total_weight))
                .product(),
        )
    }
}

/// Longer fields weigh less: `1 / sqrt(tokens)`, rounded to three places.
fn field_norm(text: &str) -> f64 {
    let tokens = text.split(' ').filter(|token| !token.is_empty()).count().max(1);
    (1000.0 / (tokens as f64).sqrt()).round() / 1000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Cell {
    errors: usize,
    start: usize,
}

/// Scores fields against one lowercased query, reusing its buffers across
/// fields.
struct FieldScorer {
    query: Vec<char>,
    threshold: f64,
    text: Vec<char>,
    previous: Vec<Cell>,
    current: Vec<Cell>,
}

impl FieldScorer {
    fn new(query: &str, threshold: f64) -> Self {
        let query: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
        let rows = query.len() + 1;
        Self {
            query,
            threshold,
            text: Vec::with_capacity(64),
            previous: Vec::with_capacity(rows),
            current: Vec::with_capacity(rows),
        }
    }

    /// Best `errors / query_len + start / MATCH_DISTANCE` over every
    /// approximate occurrence of the query in `text`, or `None` for an
    /// empty field.
    ///
    /// Column-wise edit distance where an occurrence may begin at any
    /// character; each cell carries the start of the occurrence it extends.
    fn dissimilarity(&mut self, text: &str) -> Option<f64> {
        if text.is_empty() || self.query.is_empty() {
            return None;
        }
        self.text.clear();
        self.text.extend(text.chars().flat_map(char::to_lowercase));

        let len = self.query.len();
        let max_errors = (self.threshold * len as f64).floor() as usize;
        // Occurrences starting past this offset cannot pass the threshold.
        let last_start = (self.threshold * MATCH_DISTANCE).floor() as usize;

        self.previous.clear();
        self.previous
            .extend((0..=len).map(|errors| Cell { errors, start: 0 }));

        let mut best = 1.0_f64;
        for (column, &ch) in self.text.iter().enumerate() {
            if column + 1 > last_start + len + max_errors {
                break;
            }

            self.current.clear();
            self.current.push(Cell {
                errors: 0,
                start: column + 1,
            });
            for row in 1..=len {
                let diagonal = self.previous[row - 1];
                let substitute = Cell {
                    errors: diagonal.errors + usize::from(self.query[row - 1] != ch),
                    start: diagonal.start,
                };
                let skip_text = Cell {
                    errors: self.previous[row].errors + 1,
                    start: self.previous[row].start,
                };
                let skip_query = Cell {
                    errors: self.current[row - 1].errors + 1,
                    start: self.current[row - 1].start,
                };
                self.current.push(substitute.min(skip_text).min(skip_query));
            }

            let found = self.current[len];
            let score = found.errors as f64 / len as f64 + found.start as f64 / MATCH_DISTANCE;
            best = best.min(score);
            std::mem::swap(&mut self.previous, &mut self.current);
            if best == 0.0 {
                break;
            }
        }
        Some(best.min(1.0))
    }
}
