//! Learning path service - ordered article sequences, completion and locks

use super::article::{completed_set, dedupe_ids, ensure_articles_exist, progress_map, summarize};
use super::round2;
use crate::auth::access::{ensure_owner, require_coach};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::repositories::{
    ArticleProgressRepository, CreateLearningPath, LearningPathRecord, LearningPathRepository,
    PathArticleRecord, PathMembership, PathProgressRepository, UpdateLearningPath,
};
use coaching_platform_shared::types::{
    CreateLearningPathRequest, LearningPathDetailResponse, LearningPathListQuery,
    LearningPathResponse, PathArticleEntry, UpdateLearningPathRequest,
};
use coaching_platform_shared::validation::{validate_phase, validate_required_text, ValidationError};
use coaching_platform_shared::{evaluate_lock, is_locked, LockState, ProgressStatus};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A user's completed articles and path progress
struct LearnerProgress {
    completed_articles: HashSet<Uuid>,
    paths: HashMap<Uuid, ProgressStatus>,
}

impl LearnerProgress {
    async fn load(pool: &PgPool, user_id: Uuid) -> Result<Self, ApiError> {
        let (articles, paths) = tokio::try_join!(
            ArticleProgressRepository::list_for_user(pool, user_id),
            PathProgressRepository::list_for_user(pool, user_id),
        )
        .map_err(ApiError::Internal)?;

        Ok(Self {
            completed_articles: completed_set(&progress_map(&articles)),
            paths: paths.iter().map(|p| (p.path_id, p.status())).collect(),
        })
    }

    fn completed_paths(&self) -> HashSet<Uuid> {
        self.paths
            .iter()
            .filter(|(_, status)| status.is_completed())
            .map(|(id, _)| *id)
            .collect()
    }
}

pub struct LearningPathService;

impl LearningPathService {
    pub async fn list(
        pool: &PgPool,
        user: &AuthUser,
        query: &LearningPathListQuery,
    ) -> Result<Vec<LearningPathResponse>, ApiError> {
        let paths = LearningPathRepository::list(pool, user.user_id, query.include_archived, query.phase)
            .await
            .map_err(ApiError::Internal)?;
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let path_ids: Vec<Uuid> = paths.iter().map(|p| p.id).collect();
        let memberships = LearningPathRepository::memberships(pool, &path_ids)
            .await
            .map_err(ApiError::Internal)?;
        let progress = LearnerProgress::load(pool, user.user_id).await?;
        let completed_paths = progress.completed_paths();
        let grouped = group_memberships(&memberships, user.user_id);

        Ok(paths
            .into_iter()
            .map(|path| {
                let article_ids = grouped.get(&path.id).map(Vec::as_slice).unwrap_or(&[]);
                path_response(path, user, article_ids, &progress, &completed_paths)
            })
            .collect())
    }

    pub async fn get(
        pool: &PgPool,
        user: &AuthUser,
        id: Uuid,
    ) -> Result<LearningPathDetailResponse, ApiError> {
        let path = Self::find_visible(pool, user, id).await?;

        let articles = LearningPathRepository::articles(pool, id)
            .await
            .map_err(ApiError::Internal)?;
        let progress = LearnerProgress::load(pool, user.user_id).await?;

        Ok(detail_response(path, user, articles, &progress))
    }

    pub async fn create(
        pool: &PgPool,
        user: &AuthUser,
        request: CreateLearningPathRequest,
    ) -> Result<LearningPathDetailResponse, ApiError> {
        require_coach(user)?;

        let title = request.title.trim().to_string();
        ValidationError::check("title", validate_required_text(&title, 200))?;
        let phase = request.phase.unwrap_or(1);
        ValidationError::check("phase", validate_phase(phase))?;

        let prerequisite_ids = dedupe_ids(request.prerequisite_ids);
        ensure_paths_exist(pool, &prerequisite_ids).await?;
        let article_ids = dedupe_ids(request.article_ids);
        ensure_articles_exist(pool, &article_ids).await?;

        let id = LearningPathRepository::create(
            pool,
            CreateLearningPath {
                coach_id: user.user_id,
                title,
                description: request.description,
                phase,
                prerequisite_ids,
                published: request.published,
                article_ids,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        tracing::info!(path_id = %id, coach_id = %user.user_id, "Learning path created");
        Self::get(pool, user, id).await
    }

    pub async fn update(
        pool: &PgPool,
        user: &AuthUser,
        id: Uuid,
        request: UpdateLearningPathRequest,
    ) -> Result<LearningPathDetailResponse, ApiError> {
        let path = Self::find_existing(pool, id).await?;
        ensure_owner(path.coach_id, user)?;

        let title = request.title.map(|t| t.trim().to_string());
        if let Some(title) = &title {
            ValidationError::check("title", validate_required_text(title, 200))?;
        }
        if let Some(phase) = request.phase {
            ValidationError::check("phase", validate_phase(phase))?;
        }
        let prerequisite_ids = request.prerequisite_ids.map(dedupe_ids);
        if let Some(ids) = &prerequisite_ids {
            if ids.contains(&id) {
                return Err(ValidationError::new(
                    "prerequisite_ids",
                    "a path cannot be its own prerequisite",
                )
                .into());
            }
            ensure_paths_exist(pool, ids).await?;
        }

        let updates = UpdateLearningPath {
            title,
            description: request.description,
            phase: request.phase,
            prerequisite_ids,
            published: request.published,
            is_archived: request.is_archived,
        };
        LearningPathRepository::update(pool, id, updates)
            .await
            .map_err(ApiError::Internal)?;

        Self::get(pool, user, id).await
    }

    /// Replace the ordered article list of a path
    pub async fn set_articles(
        pool: &PgPool,
        user: &AuthUser,
        id: Uuid,
        article_ids: Vec<Uuid>,
    ) -> Result<LearningPathDetailResponse, ApiError> {
        let path = Self::find_existing(pool, id).await?;
        ensure_owner(path.coach_id, user)?;

        let article_ids = dedupe_ids(article_ids);
        ensure_articles_exist(pool, &article_ids).await?;

        LearningPathRepository::set_articles(pool, id, &article_ids)
            .await
            .map_err(ApiError::Internal)?;

        Self::get(pool, user, id).await
    }

    pub async fn delete(pool: &PgPool, user: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        let path = Self::find_existing(pool, id).await?;
        ensure_owner(path.coach_id, user)?;

        LearningPathRepository::delete(pool, id)
            .await
            .map_err(ApiError::Internal)?;

        tracing::info!(path_id = %id, "Learning path deleted");
        Ok(())
    }

    /// Re-evaluate every path containing `article_id` for a user
    ///
    /// Paths whose articles are all in `completed` are marked completed, the
    /// others in progress. Returns the paths that became completed now.
    pub async fn sync_progress(
        pool: &PgPool,
        user_id: Uuid,
        article_id: Uuid,
        completed: &HashSet<Uuid>,
    ) -> Result<Vec<Uuid>, ApiError> {
        let path_ids = LearningPathRepository::paths_containing(pool, article_id)
            .await
            .map_err(ApiError::Internal)?;
        if path_ids.is_empty() {
            return Ok(Vec::new());
        }

        let (memberships, existing) = tokio::try_join!(
            LearningPathRepository::memberships(pool, &path_ids),
            PathProgressRepository::list_for_user(pool, user_id),
        )
        .map_err(ApiError::Internal)?;

        let already_completed: HashSet<Uuid> = existing
            .iter()
            .filter(|p| p.status().is_completed())
            .map(|p| p.path_id)
            .collect();
        let grouped = group_memberships(&memberships, user_id);

        let mut newly_completed = Vec::new();
        for path_id in path_ids {
            let article_ids = grouped.get(&path_id).map(Vec::as_slice).unwrap_or(&[]);
            let status = if is_path_complete(article_ids, completed) {
                ProgressStatus::Completed
            } else {
                ProgressStatus::InProgress
            };

            let record = PathProgressRepository::upsert(pool, user_id, path_id, status)
                .await
                .map_err(ApiError::Internal)?;
            if record.status().is_completed() && !already_completed.contains(&path_id) {
                tracing::info!(%user_id, %path_id, "Learning path completed");
                newly_completed.push(path_id);
            }
        }

        Ok(newly_completed)
    }

    async fn find_existing(pool: &PgPool, id: Uuid) -> Result<LearningPathRecord, ApiError> {
        LearningPathRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Learning path not found".to_string()))
    }

    async fn find_visible(
        pool: &PgPool,
        user: &AuthUser,
        id: Uuid,
    ) -> Result<LearningPathRecord, ApiError> {
        let path = Self::find_existing(pool, id).await?;
        if path.published || path.coach_id == user.user_id {
            Ok(path)
        } else {
            Err(ApiError::NotFound("Learning path not found".to_string()))
        }
    }
}

async fn ensure_paths_exist(pool: &PgPool, ids: &[Uuid]) -> Result<(), ApiError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = LearningPathRepository::find_many(pool, ids)
        .await
        .map_err(ApiError::Internal)?;

    if found.len() != ids.len() {
        return Err(ValidationError::new("prerequisite_ids", "references an unknown path").into());
    }
    Ok(())
}

/// Article ids per path, keeping only the articles `viewer_id` can see
fn group_memberships(memberships: &[PathMembership], viewer_id: Uuid) -> HashMap<Uuid, Vec<Uuid>> {
    let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for membership in memberships.iter().filter(|m| m.is_visible_to(viewer_id)) {
        grouped
            .entry(membership.path_id)
            .or_default()
            .push(membership.article_id);
    }
    grouped
}

/// An empty path is never complete
fn is_path_complete(article_ids: &[Uuid], completed: &HashSet<Uuid>) -> bool {
    !article_ids.is_empty() && article_ids.iter().all(|id| completed.contains(id))
}

/// Completed article count and percentage for a path
fn completion(article_ids: &[Uuid], completed: &HashSet<Uuid>) -> (usize, f64) {
    let done = article_ids.iter().filter(|id| completed.contains(id)).count();
    let percent = if article_ids.is_empty() {
        0.0
    } else {
        round2(done as f64 * 100.0 / article_ids.len() as f64)
    };
    (done, percent)
}

fn path_response(
    path: LearningPathRecord,
    user: &AuthUser,
    article_ids: &[Uuid],
    progress: &LearnerProgress,
    completed_paths: &HashSet<Uuid>,
) -> LearningPathResponse {
    let (completed_count, progress_percent) = completion(article_ids, &progress.completed_articles);
    let lock = if path.coach_id == user.user_id {
        LockState::unlocked()
    } else {
        evaluate_lock(&path.prerequisite_ids, completed_paths)
    };

    LearningPathResponse {
        status: progress.paths.get(&path.id).copied(),
        id: path.id,
        coach_id: path.coach_id,
        title: path.title,
        description: path.description,
        phase: path.phase,
        prerequisite_ids: path.prerequisite_ids,
        published: path.published,
        is_archived: path.is_archived,
        article_count: article_ids.len(),
        completed_count,
        progress_percent,
        locked: lock.locked,
        missing_prerequisites: lock.missing,
    }
}

fn detail_response(
    path: LearningPathRecord,
    user: &AuthUser,
    articles: Vec<PathArticleRecord>,
    progress: &LearnerProgress,
) -> LearningPathDetailResponse {
    let articles: Vec<PathArticleRecord> = articles
        .into_iter()
        .filter(|entry| entry.article.published || entry.article.author_id == user.user_id)
        .collect();
    let article_ids: Vec<Uuid> = articles.iter().map(|a| a.article.id).collect();
    let completed_paths = progress.completed_paths();

    let entries = articles
        .iter()
        .map(|entry| PathArticleEntry {
            article: summarize(&entry.article),
            position: entry.position,
            completed: progress.completed_articles.contains(&entry.article.id),
            locked: entry.article.author_id != user.user_id
                && is_locked(&entry.article.prerequisite_ids, &progress.completed_articles),
        })
        .collect();

    LearningPathDetailResponse {
        path: path_response(path, user, &article_ids, progress, &completed_paths),
        articles: entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::ArticleRecord;
    use rstest::rstest;

    fn member(path_id: Uuid, article_id: Uuid, author_id: Uuid, published: bool) -> PathMembership {
        PathMembership {
            path_id,
            article_id,
            author_id,
            published,
        }
    }

    fn client() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: coaching_platform_shared::Role::Client,
        }
    }

    fn learning_path(prerequisite_ids: Vec<Uuid>) -> LearningPathRecord {
        LearningPathRecord {
            id: Uuid::new_v4(),
            coach_id: Uuid::new_v4(),
            title: "Foundations".to_string(),
            description: None,
            phase: 2,
            prerequisite_ids,
            published: true,
            is_archived: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn path_article(author_id: Uuid, published: bool, position: i32) -> PathArticleRecord {
        PathArticleRecord {
            article: ArticleRecord {
                id: Uuid::new_v4(),
                author_id,
                category_id: None,
                category_name: None,
                title: format!("Lesson {position}"),
                summary: None,
                content: "Body".to_string(),
                tags: Vec::new(),
                phase: 1,
                prerequisite_ids: Vec::new(),
                published,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            },
            position,
        }
    }

    #[test]
    fn test_group_memberships() {
        let path = Uuid::new_v4();
        let other = Uuid::new_v4();
        let author = Uuid::new_v4();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            member(path, a, author, true),
            member(other, c, author, true),
            member(path, b, author, true),
        ];

        let grouped = group_memberships(&rows, Uuid::new_v4());
        assert_eq!(grouped[&path], vec![a, b]);
        assert_eq!(grouped[&other], vec![c]);
    }

    #[test]
    fn test_draft_members_only_count_for_their_author() {
        let path = Uuid::new_v4();
        let author = Uuid::new_v4();
        let (published, draft) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            member(path, published, author, true),
            member(path, draft, author, false),
        ];

        let learner = group_memberships(&rows, Uuid::new_v4());
        assert_eq!(learner[&path], vec![published]);
        let completed: HashSet<Uuid> = [published].into_iter().collect();
        assert!(is_path_complete(&learner[&path], &completed));

        let own = group_memberships(&rows, author);
        assert_eq!(own[&path], vec![published, draft]);
        assert!(!is_path_complete(&own[&path], &completed));
    }

    #[test]
    fn test_detail_hides_drafts_from_learners() {
        let author = Uuid::new_v4();
        let articles = vec![
            path_article(author, true, 1),
            path_article(author, false, 2),
        ];
        let done = articles[0].article.id;
        let progress = LearnerProgress {
            completed_articles: [done].into_iter().collect(),
            paths: HashMap::new(),
        };

        let detail = detail_response(learning_path(Vec::new()), &client(), articles, &progress);
        assert_eq!(detail.articles.len(), 1);
        assert_eq!(detail.articles[0].position, 1);
        assert_eq!(detail.path.article_count, 1);
        assert_eq!(detail.path.progress_percent, 100.0);
    }

    #[rstest]
    #[case::empty_path(0, 0, false)]
    #[case::nothing_done(3, 0, false)]
    #[case::partly_done(3, 2, false)]
    #[case::all_done(3, 3, true)]
    fn test_is_path_complete(#[case] total: usize, #[case] done: usize, #[case] expected: bool) {
        let ids: Vec<Uuid> = (0..total).map(|_| Uuid::new_v4()).collect();
        let completed: HashSet<Uuid> = ids.iter().take(done).copied().collect();
        assert_eq!(is_path_complete(&ids, &completed), expected);
    }

    #[test]
    fn test_completion_percent() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let completed: HashSet<Uuid> = ids.iter().take(1).copied().collect();

        assert_eq!(completion(&ids, &completed), (1, 33.33));
        assert_eq!(completion(&[], &completed), (0, 0.0));
    }

    #[test]
    fn test_path_lock_uses_completed_paths() {
        let prerequisite = Uuid::new_v4();
        let path = learning_path(vec![prerequisite]);
        let user = client();
        let progress = LearnerProgress {
            completed_articles: HashSet::new(),
            paths: HashMap::new(),
        };

        let locked = path_response(path.clone(), &user, &[], &progress, &HashSet::new());
        assert!(locked.locked);
        assert_eq!(locked.missing_prerequisites, vec![prerequisite]);

        let done: HashSet<Uuid> = [prerequisite].into_iter().collect();
        let unlocked = path_response(path, &user, &[], &progress, &done);
        assert!(!unlocked.locked);
    }
}
