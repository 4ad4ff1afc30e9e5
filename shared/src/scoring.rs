//! Article search relevance and related-article recommendation
//!
//! Both scorers are pure functions over data the caller has already
//! fetched. Neither touches the database or any shared state.
//!
//! Relevance is an additive point score over case-insensitive substring
//! containment. Related-article scores are fixed weights summed and then
//! clamped into `[0, 1]`.

use crate::models::ProgressStatus;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

// ============================================================================
// Weights
// ============================================================================

pub const TITLE_MATCH_POINTS: u32 = 10;
pub const TITLE_EXACT_POINTS: u32 = 20;
pub const TITLE_PREFIX_POINTS: u32 = 5;
pub const CONTENT_MATCH_POINTS: u32 = 3;
pub const TAG_MATCH_POINTS: u32 = 7;
pub const CATEGORY_MATCH_POINTS: u32 = 5;

pub const SAME_CATEGORY_WEIGHT: f64 = 0.5;
pub const SAME_PHASE_WEIGHT: f64 = 0.3;
pub const NEXT_PHASE_WEIGHT: f64 = 0.4;
pub const SHARED_TAG_WEIGHT: f64 = 0.1;
pub const COMPLETED_PENALTY: f64 = 0.8;
pub const NOT_STARTED_BONUS: f64 = 0.2;

/// Default number of related articles returned
pub const DEFAULT_RELATED_LIMIT: usize = 3;
/// Upper bound on related articles returned
pub const MAX_RELATED_LIMIT: usize = 10;

// ============================================================================
// Documents
// ============================================================================

/// The fields of an article the scorers look at
pub trait ArticleDocument {
    fn id(&self) -> Uuid;
    fn title(&self) -> &str;
    fn content(&self) -> &str;
    fn tags(&self) -> &[String];
    fn category_id(&self) -> Option<Uuid>;
    fn category_name(&self) -> Option<&str>;
    fn phase(&self) -> i32;
}

/// Plain owned article data, used where no database record is at hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSnapshot {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default = "default_phase")]
    pub phase: i32,
}

fn default_phase() -> i32 {
    1
}

impl ArticleDocument for ArticleSnapshot {
    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn category_id(&self) -> Option<Uuid> {
        self.category_id
    }

    fn category_name(&self) -> Option<&str> {
        self.category_name.as_deref()
    }

    fn phase(&self) -> i32 {
        self.phase
    }
}

/// An item paired with the score it was ranked by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scored<T, S = u32> {
    pub item: T,
    pub score: S,
}

// ============================================================================
// Relevance
// ============================================================================

/// Score a single article against a search query
///
/// Returns 0 for an empty query.
pub fn relevance_score<A: ArticleDocument + ?Sized>(query: &str, article: &A) -> u32 {
    let query = normalize(query);
    if query.is_empty() {
        return 0;
    }
    score_normalized(&query, article)
}

fn score_normalized<A: ArticleDocument + ?Sized>(query: &str, article: &A) -> u32 {
    let mut score = 0;

    let title = normalize(article.title());
    if title.contains(query) {
        score += TITLE_MATCH_POINTS;
        if title == query {
            score += TITLE_EXACT_POINTS;
        }
        if title.starts_with(query) {
            score += TITLE_PREFIX_POINTS;
        }
    }

    if article.content().to_lowercase().contains(query) {
        score += CONTENT_MATCH_POINTS;
    }

    let matching_tags = article
        .tags()
        .iter()
        .filter(|tag| tag.to_lowercase().contains(query))
        .count() as u32;
    score += matching_tags * TAG_MATCH_POINTS;

    if article
        .category_name()
        .is_some_and(|name| name.to_lowercase().contains(query))
    {
        score += CATEGORY_MATCH_POINTS;
    }

    score
}

/// Rank articles by relevance, highest first
///
/// Articles that score zero are dropped. Ties keep their input order.
pub fn rank_by_relevance<A: ArticleDocument>(query: &str, articles: Vec<A>) -> Vec<Scored<A>> {
    let query = normalize(query);
    if query.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<Scored<A>> = articles
        .into_iter()
        .filter_map(|item| {
            let score = score_normalized(&query, &item);
            (score > 0).then_some(Scored { item, score })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

// ============================================================================
// Related articles
// ============================================================================

/// Whether `candidate` belongs in the related pool of `source`
///
/// The pool is: same category, same phase, or the next phase.
pub fn is_related_candidate<A: ArticleDocument + ?Sized, B: ArticleDocument + ?Sized>(
    source: &A,
    candidate: &B,
) -> bool {
    if candidate.id() == source.id() {
        return false;
    }
    same_category(source, candidate)
        || candidate.phase() == source.phase()
        || is_next_phase(source, candidate)
}

fn is_next_phase<A: ArticleDocument + ?Sized, B: ArticleDocument + ?Sized>(
    source: &A,
    candidate: &B,
) -> bool {
    source.phase().checked_add(1) == Some(candidate.phase())
}

fn same_category<A: ArticleDocument + ?Sized, B: ArticleDocument + ?Sized>(
    source: &A,
    candidate: &B,
) -> bool {
    matches!(
        (source.category_id(), candidate.category_id()),
        (Some(a), Some(b)) if a == b
    )
}

/// Score a candidate's relatedness to `source`, clamped into `[0, 1]`
///
/// `progress` is the requesting user's progress on the candidate, `None`
/// when they never started it.
pub fn related_score<A: ArticleDocument + ?Sized, B: ArticleDocument + ?Sized>(
    source: &A,
    candidate: &B,
    progress: Option<ProgressStatus>,
) -> f64 {
    let mut score = 0.0;

    if same_category(source, candidate) {
        score += SAME_CATEGORY_WEIGHT;
    }
    if candidate.phase() == source.phase() {
        score += SAME_PHASE_WEIGHT;
    }
    if is_next_phase(source, candidate) {
        score += NEXT_PHASE_WEIGHT;
    }

    let source_tags: HashSet<String> = source.tags().iter().map(|t| normalize(t)).collect();
    let shared_tags = candidate
        .tags()
        .iter()
        .map(|t| normalize(t))
        .collect::<HashSet<_>>()
        .intersection(&source_tags)
        .count();
    score += shared_tags as f64 * SHARED_TAG_WEIGHT;

    match progress {
        Some(ProgressStatus::Completed) => score -= COMPLETED_PENALTY,
        Some(ProgressStatus::InProgress) => {}
        None => score += NOT_STARTED_BONUS,
    }

    score.clamp(0.0, 1.0)
}

/// Pick the top `limit` related articles for `source`
///
/// Candidates outside the related pool (and the source itself) are skipped.
/// Ties keep their input order.
pub fn recommend_related<A, B>(
    source: &A,
    candidates: Vec<B>,
    progress: &HashMap<Uuid, ProgressStatus>,
    limit: usize,
) -> Vec<Scored<B, f64>>
where
    A: ArticleDocument + ?Sized,
    B: ArticleDocument,
{
    let mut scored: Vec<Scored<B, f64>> = candidates
        .into_iter()
        .filter(|candidate| is_related_candidate(source, candidate))
        .map(|item| {
            let score = related_score(source, &item, progress.get(&item.id()).copied());
            Scored { item, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit.min(MAX_RELATED_LIMIT));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn article(title: &str, content: &str, tags: &[&str], category: Option<&str>) -> ArticleSnapshot {
        ArticleSnapshot {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category_id: None,
            category_name: category.map(str::to_string),
            phase: 1,
        }
    }

    fn positioned(category_id: Option<Uuid>, phase: i32, tags: &[&str]) -> ArticleSnapshot {
        ArticleSnapshot {
            id: Uuid::new_v4(),
            title: "Article".to_string(),
            content: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category_id,
            category_name: None,
            phase,
        }
    }

    #[rstest]
    #[case::exact_title("protein", "Protein", "", &[], None, 35)]
    #[case::prefix_title("protein", "Protein timing", "", &[], None, 15)]
    #[case::inner_title("timing", "Protein timing", "", &[], None, 10)]
    #[case::content_only("sleep", "Recovery", "Good sleep matters", &[], None, 3)]
    #[case::two_tags("fat", "Macros", "", &["fat loss", "healthy fats", "carbs"], None, 14)]
    #[case::category_only("mind", "Habits", "", &[], Some("Mindset"), 5)]
    #[case::everything("sleep", "Sleep", "sleep well", &["sleep"], Some("Sleep"), 35 + 3 + 7 + 5)]
    #[case::no_match("zinc", "Protein", "meat", &["iron"], Some("Minerals"), 0)]
    fn test_relevance_points(
        #[case] query: &str,
        #[case] title: &str,
        #[case] content: &str,
        #[case] tags: &[&str],
        #[case] category: Option<&str>,
        #[case] expected: u32,
    ) {
        let candidate = article(title, content, tags, category);
        assert_eq!(relevance_score(query, &candidate), expected);
    }

    #[test]
    fn test_relevance_is_case_insensitive_and_trims_query() {
        let candidate = article("Meal Prep Basics", "", &[], None);
        assert_eq!(relevance_score("  MEAL prep ", &candidate), 15);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let candidate = article("Anything", "anything", &["anything"], Some("anything"));
        assert_eq!(relevance_score("", &candidate), 0);
        assert_eq!(relevance_score("   ", &candidate), 0);
    }

    #[test]
    fn test_exact_title_outranks_content_match() {
        let exact = article("Hydration", "", &[], None);
        let content_only = article("Daily habits", "hydration is key", &[], None);
        let ranked = rank_by_relevance("hydration", vec![content_only.clone(), exact.clone()]);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item.id, exact.id);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_rank_drops_non_matches_and_handles_empty_input() {
        let ranked = rank_by_relevance("zinc", vec![article("Protein", "", &[], None)]);
        assert!(ranked.is_empty());

        let ranked = rank_by_relevance::<ArticleSnapshot>("protein", vec![]);
        assert!(ranked.is_empty());

        let ranked = rank_by_relevance("", vec![article("Protein", "", &[], None)]);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let first = article("Carb cycling", "", &[], None);
        let second = article("Low carb days", "", &[], None);
        let ranked = rank_by_relevance("carb", vec![second.clone(), first.clone()]);
        // "carb cycling" has the prefix bonus
        assert_eq!(ranked[0].item.id, first.id);

        let a = article("A about carb", "", &[], None);
        let b = article("B about carb", "", &[], None);
        let ranked = rank_by_relevance("carb", vec![a.clone(), b.clone()]);
        assert_eq!(ranked[0].item.id, a.id);
        assert_eq!(ranked[1].item.id, b.id);
    }

    #[test]
    fn test_related_weights() {
        let category = Some(Uuid::new_v4());
        let source = positioned(category, 2, &["sleep", "recovery"]);

        // same category + same phase + one shared tag + never started
        let candidate = positioned(category, 2, &["Sleep"]);
        let score = related_score(&source, &candidate, None);
        assert!((score - 1.0).abs() < 1e-9, "clamped to 1, got {score}");

        // next phase only, in progress
        let candidate = positioned(None, 3, &[]);
        let score = related_score(&source, &candidate, Some(ProgressStatus::InProgress));
        assert!((score - 0.4).abs() < 1e-9);

        // same phase, completed: 0.3 - 0.8 clamps to 0
        let candidate = positioned(None, 2, &[]);
        let score = related_score(&source, &candidate, Some(ProgressStatus::Completed));
        assert_eq!(score, 0.0);

        // same phase, two shared tags, in progress
        let candidate = positioned(None, 2, &["sleep", "recovery", "stress"]);
        let score = related_score(&source, &candidate, Some(ProgressStatus::InProgress));
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_related_pool_membership() {
        let category = Some(Uuid::new_v4());
        let source = positioned(category, 2, &[]);

        assert!(is_related_candidate(&source, &positioned(category, 5, &[])));
        assert!(is_related_candidate(&source, &positioned(None, 2, &[])));
        assert!(is_related_candidate(&source, &positioned(None, 3, &[])));
        assert!(!is_related_candidate(&source, &positioned(None, 1, &[])));
        assert!(!is_related_candidate(&source, &positioned(None, 4, &[])));
        assert!(!is_related_candidate(&source, &source.clone()));
    }

    #[test]
    fn test_last_phase_has_no_next_phase() {
        let source = positioned(None, i32::MAX, &[]);
        let same = positioned(None, i32::MAX, &[]);
        let below = positioned(None, i32::MIN, &[]);

        assert!(is_related_candidate(&source, &same));
        assert!(!is_related_candidate(&source, &below));

        let result = recommend_related(&source, vec![same.clone(), below], &HashMap::new(), 3);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].item.id, same.id);
        assert!((result[0].score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_recommend_related_orders_and_limits() {
        let category = Some(Uuid::new_v4());
        let source = positioned(category, 1, &["habits"]);

        let best = positioned(category, 1, &["habits"]);
        let next_phase = positioned(None, 2, &[]);
        let completed = positioned(category, 1, &[]);
        let unrelated = positioned(None, 7, &["habits"]);

        let mut progress = HashMap::new();
        progress.insert(completed.id, ProgressStatus::Completed);

        let result = recommend_related(
            &source,
            vec![
                unrelated.clone(),
                completed.clone(),
                next_phase.clone(),
                best.clone(),
                source.clone(),
            ],
            &progress,
            2,
        );

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].item.id, best.id);
        assert_eq!(result[1].item.id, next_phase.id);
        assert!(result.iter().all(|r| r.item.id != source.id));
        assert!(result.iter().all(|r| r.item.id != unrelated.id));
    }

    #[test]
    fn test_recommend_related_caps_limit() {
        let source = positioned(None, 1, &[]);
        let candidates: Vec<_> = (0..20).map(|_| positioned(None, 1, &[])).collect();
        let result = recommend_related(&source, candidates, &HashMap::new(), 50);
        assert_eq!(result.len(), MAX_RELATED_LIMIT);
    }

    fn progress_strategy() -> impl Strategy<Value = Option<ProgressStatus>> {
        prop_oneof![
            Just(None),
            Just(Some(ProgressStatus::InProgress)),
            Just(Some(ProgressStatus::Completed)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_related_score_is_clamped(
            same_category in any::<bool>(),
            source_phase in 0i32..10,
            candidate_phase in 0i32..10,
            source_tags in proptest::collection::vec("[a-d]{1,2}", 0..8),
            candidate_tags in proptest::collection::vec("[a-d]{1,2}", 0..8),
            progress in progress_strategy(),
        ) {
            let category = Uuid::new_v4();
            let mut source = positioned(Some(category), source_phase, &[]);
            source.tags = source_tags;
            let mut candidate = positioned(
                if same_category { Some(category) } else { Some(Uuid::new_v4()) },
                candidate_phase,
                &[],
            );
            candidate.tags = candidate_tags;

            let score = related_score(&source, &candidate, progress);
            prop_assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }

        #[test]
        fn prop_ranked_scores_are_descending(
            titles in proptest::collection::vec("[a-c ]{0,12}", 0..20),
            query in "[a-c]{1,2}",
        ) {
            let articles: Vec<_> = titles
                .iter()
                .map(|t| article(t, t, &[], None))
                .collect();
            let ranked = rank_by_relevance(&query, articles);
            prop_assert!(ranked.iter().all(|r| r.score > 0));
            prop_assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }
}
