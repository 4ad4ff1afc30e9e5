//! Workout program repository

use super::nutrition_plan::AssignmentFilter;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkoutProgram {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub client_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub duration_weeks: i32,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkoutExercise {
    pub id: Uuid,
    pub program_id: Uuid,
    pub day: i32,
    pub name: String,
    pub sets: i32,
    pub reps: String,
    pub rest_seconds: Option<i32>,
    pub notes: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone)]
pub struct NewExercise {
    pub day: i32,
    pub name: String,
    pub sets: i32,
    pub reps: String,
    pub rest_seconds: Option<i32>,
    pub notes: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone)]
pub struct CreateWorkoutProgram {
    pub coach_id: Uuid,
    pub client_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub duration_weeks: i32,
    pub exercises: Vec<NewExercise>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateWorkoutProgram {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client_id: Option<Uuid>,
    pub duration_weeks: Option<i32>,
    pub is_archived: Option<bool>,
}

const PROGRAM_COLUMNS: &str = "id, coach_id, client_id, name, description, duration_weeks, \
                               is_archived, created_at, updated_at";

pub struct WorkoutRepository;

impl WorkoutRepository {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<WorkoutProgram>> {
        let program = sqlx::query_as::<_, WorkoutProgram>(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM workout_programs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(program)
    }

    pub async fn list(db: &PgPool, filter: AssignmentFilter) -> Result<Vec<WorkoutProgram>> {
        let programs = sqlx::query_as::<_, WorkoutProgram>(&format!(
            r#"
            SELECT {PROGRAM_COLUMNS}
            FROM workout_programs
            WHERE ($1::UUID IS NULL OR coach_id = $1)
              AND ($2::UUID IS NULL OR client_id = $2)
              AND ($3 OR NOT is_archived)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.coach_id)
        .bind(filter.client_id)
        .bind(filter.include_archived)
        .fetch_all(db)
        .await?;

        Ok(programs)
    }

    pub async fn exercises(db: &PgPool, program_id: Uuid) -> Result<Vec<WorkoutExercise>> {
        let exercises = sqlx::query_as::<_, WorkoutExercise>(
            r#"
            SELECT id, program_id, day, name, sets, reps, rest_seconds, notes, sort_order
            FROM workout_exercises
            WHERE program_id = $1
            ORDER BY day ASC, sort_order ASC
            "#,
        )
        .bind(program_id)
        .fetch_all(db)
        .await?;

        Ok(exercises)
    }

    pub async fn create(db: &PgPool, input: CreateWorkoutProgram) -> Result<Uuid> {
        let mut tx = db.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO workout_programs (coach_id, client_id, name, description, duration_weeks)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.coach_id)
        .bind(input.client_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.duration_weeks)
        .fetch_one(&mut *tx)
        .await?;

        insert_exercises(&mut tx, id, &input.exercises).await?;

        tx.commit().await?;
        Ok(id)
    }

    pub async fn update(db: &PgPool, id: Uuid, updates: UpdateWorkoutProgram) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE workout_programs SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                client_id = COALESCE($4, client_id),
                duration_weeks = COALESCE($5, duration_weeks),
                is_archived = COALESCE($6, is_archived)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(updates.name)
        .bind(updates.description)
        .bind(updates.client_id)
        .bind(updates.duration_weeks)
        .bind(updates.is_archived)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace every exercise of a program
    pub async fn set_exercises(db: &PgPool, program_id: Uuid, exercises: &[NewExercise]) -> Result<()> {
        let mut tx = db.begin().await?;

        sqlx::query("DELETE FROM workout_exercises WHERE program_id = $1")
            .bind(program_id)
            .execute(&mut *tx)
            .await?;
        insert_exercises(&mut tx, program_id, exercises).await?;

        sqlx::query("UPDATE workout_programs SET updated_at = NOW() WHERE id = $1")
            .bind(program_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workout_programs WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_coach(db: &PgPool, coach_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM workout_programs WHERE coach_id = $1 AND NOT is_archived",
        )
        .bind(coach_id)
        .fetch_one(db)
        .await?;

        Ok(count)
    }
}

async fn insert_exercises(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    program_id: Uuid,
    exercises: &[NewExercise],
) -> Result<()> {
    for exercise in exercises {
        sqlx::query(
            r#"
            INSERT INTO workout_exercises (
                program_id, day, name, sets, reps, rest_seconds, notes, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(program_id)
        .bind(exercise.day)
        .bind(&exercise.name)
        .bind(exercise.sets)
        .bind(&exercise.reps)
        .bind(exercise.rest_seconds)
        .bind(&exercise.notes)
        .bind(exercise.sort_order)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
