//! Coaching Platform WASM Module
//!
//! WebAssembly bindings over the shared scoring so the client dashboard can
//! re-rank cached articles and show lock state without a round trip.
//!
//! Inputs and outputs are JSON strings. Malformed input yields an empty
//! result rather than a thrown exception, except for lock checks, which
//! report the item as locked.

use coaching_platform_shared::{
    prerequisites, rank_by_relevance, recommend_related, ArticleSnapshot, LockState,
    ProgressStatus,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

/// Rank a JSON array of articles against a query
///
/// Returns a JSON array of `{ "item": article, "score": n }`, best first.
#[wasm_bindgen]
pub fn rank_articles(query: &str, articles_json: &str) -> String {
    let articles: Vec<ArticleSnapshot> = serde_json::from_str(articles_json).unwrap_or_default();
    to_json(&rank_by_relevance(query, articles))
}

/// Pick related articles for `source_json` out of `candidates_json`
///
/// `progress_json` maps article id to `"in_progress"` / `"completed"`.
#[wasm_bindgen]
pub fn related_articles(
    source_json: &str,
    candidates_json: &str,
    progress_json: &str,
    limit: usize,
) -> String {
    let Ok(source) = serde_json::from_str::<ArticleSnapshot>(source_json) else {
        return "[]".to_string();
    };
    let candidates: Vec<ArticleSnapshot> =
        serde_json::from_str(candidates_json).unwrap_or_default();
    let progress: HashMap<Uuid, ProgressStatus> =
        serde_json::from_str(progress_json).unwrap_or_default();

    to_json(&recommend_related(&source, candidates, &progress, limit))
}

/// Evaluate whether an item is locked
///
/// Both arguments are JSON arrays of ids. Returns `{ "locked", "missing" }`.
/// Input that does not parse reports the item as locked.
#[wasm_bindgen]
pub fn lock_state(prerequisites_json: &str, completed_json: &str) -> String {
    let (Some(required), Some(completed)) = (parse_ids(prerequisites_json), parse_ids(completed_json))
    else {
        return to_json(&LockState {
            locked: true,
            missing: Vec::new(),
        });
    };
    let completed: HashSet<_> = completed.into_iter().collect();
    to_json(&prerequisites::evaluate_lock(&required, &completed))
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn parse_ids(json: &str) -> Option<Vec<Uuid>> {
    serde_json::from_str(json).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_articles_from_json() {
        let articles = r#"[
            {"id": "00000000-0000-0000-0000-000000000001", "title": "Daily habits", "content": "protein first"},
            {"id": "00000000-0000-0000-0000-000000000002", "title": "Protein"}
        ]"#;
        let ranked: serde_json::Value = serde_json::from_str(&rank_articles("protein", articles)).unwrap();
        let ranked = ranked.as_array().unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0]["item"]["title"], "Protein");
        assert_eq!(ranked[0]["score"], 35);
        assert_eq!(ranked[1]["score"], 3);
    }

    #[test]
    fn test_malformed_input_yields_empty_array() {
        assert_eq!(rank_articles("protein", "not json"), "[]");
        assert_eq!(related_articles("{", "[]", "{}", 3), "[]");
    }

    #[test]
    fn test_related_articles_from_json() {
        let source = r#"{"id": "00000000-0000-0000-0000-000000000001", "title": "Sleep", "phase": 1}"#;
        let candidates = r#"[
            {"id": "00000000-0000-0000-0000-000000000002", "title": "Naps", "phase": 2},
            {"id": "00000000-0000-0000-0000-000000000003", "title": "Far away", "phase": 9}
        ]"#;
        let progress = r#"{"00000000-0000-0000-0000-000000000002": "in_progress"}"#;
        let related: serde_json::Value =
            serde_json::from_str(&related_articles(source, candidates, progress, 3)).unwrap();
        let related = related.as_array().unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0]["item"]["title"], "Naps");
        assert!((related[0]["score"].as_f64().unwrap() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_lock_state_from_json() {
        let prereqs = r#"["00000000-0000-0000-0000-000000000001", "00000000-0000-0000-0000-000000000002"]"#;
        let completed = r#"["00000000-0000-0000-0000-000000000001"]"#;
        let state: serde_json::Value = serde_json::from_str(&lock_state(prereqs, completed)).unwrap();
        assert_eq!(state["locked"], true);
        assert_eq!(state["missing"][0], "00000000-0000-0000-0000-000000000002");

        let state: serde_json::Value = serde_json::from_str(&lock_state("[]", "[]")).unwrap();
        assert_eq!(state["locked"], false);
    }

    #[test]
    fn test_unparseable_lock_input_stays_locked() {
        for (prereqs, completed) in [
            (r#"["not-a-uuid"]"#, "[]"),
            ("{", "[]"),
            ("[]", r#"["00000000-0000-0000-0000-00000000000z"]"#),
        ] {
            let state: serde_json::Value =
                serde_json::from_str(&lock_state(prereqs, completed)).unwrap();
            assert_eq!(state["locked"], true, "input {prereqs} / {completed}");
        }
    }
}
