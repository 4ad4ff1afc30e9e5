//! Workout program service

use super::nutrition_plan::assignment_filter;
use crate::auth::access::{ensure_can_view_assignment, ensure_coach_of, ensure_owner, require_coach};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::repositories::{
    CreateWorkoutProgram, NewExercise, UpdateWorkoutProgram, WorkoutExercise, WorkoutProgram,
    WorkoutRepository,
};
use coaching_platform_shared::types::{
    AssignmentListQuery, CreateWorkoutProgramRequest, ExerciseRequest, ExerciseResponse,
    UpdateWorkoutProgramRequest, WorkoutProgramDetailResponse, WorkoutProgramResponse,
};
use coaching_platform_shared::validation::{
    validate_day, validate_duration_weeks, validate_minutes, validate_required_text,
    validate_sets, ValidationError,
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct WorkoutService;

impl WorkoutService {
    pub async fn list(
        pool: &PgPool,
        user: &AuthUser,
        query: &AssignmentListQuery,
    ) -> Result<Vec<WorkoutProgramResponse>, ApiError> {
        let programs = WorkoutRepository::list(pool, assignment_filter(user, query))
            .await
            .map_err(ApiError::Internal)?;

        Ok(programs.into_iter().map(to_response).collect())
    }

    pub async fn get(
        pool: &PgPool,
        user: &AuthUser,
        program_id: Uuid,
    ) -> Result<WorkoutProgramDetailResponse, ApiError> {
        let program = Self::find(pool, program_id).await?;
        ensure_can_view_assignment(program.coach_id, program.client_id, user, "Workout program")?;

        Self::detail(pool, program).await
    }

    pub async fn create(
        pool: &PgPool,
        user: &AuthUser,
        request: CreateWorkoutProgramRequest,
    ) -> Result<WorkoutProgramDetailResponse, ApiError> {
        require_coach(user)?;

        ValidationError::check("name", validate_required_text(&request.name, 200))?;
        ValidationError::check("duration_weeks", validate_duration_weeks(request.duration_weeks))?;
        if let Some(client_id) = request.client_id {
            ensure_coach_of(pool, user, client_id).await?;
        }
        let exercises = prepare_exercises(&request.exercises)?;

        let program_id = WorkoutRepository::create(
            pool,
            CreateWorkoutProgram {
                coach_id: user.user_id,
                client_id: request.client_id,
                name: request.name.trim().to_string(),
                description: request.description,
                duration_weeks: request.duration_weeks,
                exercises,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        tracing::info!(%program_id, coach_id = %user.user_id, "Workout program created");
        let program = Self::find(pool, program_id).await?;
        Self::detail(pool, program).await
    }

    pub async fn update(
        pool: &PgPool,
        user: &AuthUser,
        program_id: Uuid,
        request: UpdateWorkoutProgramRequest,
    ) -> Result<WorkoutProgramDetailResponse, ApiError> {
        let program = Self::find(pool, program_id).await?;
        ensure_owner(program.coach_id, user)?;

        if let Some(name) = &request.name {
            ValidationError::check("name", validate_required_text(name, 200))?;
        }
        if let Some(weeks) = request.duration_weeks {
            ValidationError::check("duration_weeks", validate_duration_weeks(weeks))?;
        }
        if let Some(client_id) = request.client_id {
            ensure_coach_of(pool, user, client_id).await?;
        }

        let updates = UpdateWorkoutProgram {
            name: request.name.map(|n| n.trim().to_string()),
            description: request.description,
            client_id: request.client_id,
            duration_weeks: request.duration_weeks,
            is_archived: request.is_archived,
        };
        WorkoutRepository::update(pool, program_id, updates)
            .await
            .map_err(ApiError::Internal)?;

        let program = Self::find(pool, program_id).await?;
        Self::detail(pool, program).await
    }

    /// Replace the program's exercise list
    pub async fn set_exercises(
        pool: &PgPool,
        user: &AuthUser,
        program_id: Uuid,
        exercises: Vec<ExerciseRequest>,
    ) -> Result<WorkoutProgramDetailResponse, ApiError> {
        let program = Self::find(pool, program_id).await?;
        ensure_owner(program.coach_id, user)?;

        let exercises = prepare_exercises(&exercises)?;
        WorkoutRepository::set_exercises(pool, program_id, &exercises)
            .await
            .map_err(ApiError::Internal)?;

        Self::detail(pool, program).await
    }

    pub async fn delete(pool: &PgPool, user: &AuthUser, program_id: Uuid) -> Result<(), ApiError> {
        let program = Self::find(pool, program_id).await?;
        ensure_owner(program.coach_id, user)?;

        WorkoutRepository::delete(pool, program_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(())
    }

    async fn find(pool: &PgPool, program_id: Uuid) -> Result<WorkoutProgram, ApiError> {
        WorkoutRepository::find_by_id(pool, program_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Workout program not found".to_string()))
    }

    async fn detail(
        pool: &PgPool,
        program: WorkoutProgram,
    ) -> Result<WorkoutProgramDetailResponse, ApiError> {
        let exercises = WorkoutRepository::exercises(pool, program.id)
            .await
            .map_err(ApiError::Internal)?;

        Ok(WorkoutProgramDetailResponse {
            program: to_response(program),
            exercises: exercises.into_iter().map(exercise_response).collect(),
        })
    }
}

fn prepare_exercises(exercises: &[ExerciseRequest]) -> Result<Vec<NewExercise>, ApiError> {
    exercises
        .iter()
        .enumerate()
        .map(|(index, exercise)| {
            ValidationError::check("day", validate_day(exercise.day))?;
            ValidationError::check("name", validate_required_text(&exercise.name, 200))?;
            ValidationError::check("sets", validate_sets(exercise.sets))?;
            ValidationError::check("reps", validate_required_text(&exercise.reps, 50))?;
            if let Some(rest) = exercise.rest_seconds {
                ValidationError::check("rest_seconds", validate_minutes(rest))?;
            }

            Ok(NewExercise {
                day: exercise.day,
                name: exercise.name.trim().to_string(),
                sets: exercise.sets,
                reps: exercise.reps.trim().to_string(),
                rest_seconds: exercise.rest_seconds,
                notes: exercise.notes.clone(),
                sort_order: exercise.sort_order.unwrap_or(index as i32),
            })
        })
        .collect()
}

pub(crate) fn to_response(program: WorkoutProgram) -> WorkoutProgramResponse {
    WorkoutProgramResponse {
        id: program.id,
        coach_id: program.coach_id,
        client_id: program.client_id,
        name: program.name,
        description: program.description,
        duration_weeks: program.duration_weeks,
        is_archived: program.is_archived,
        created_at: program.created_at,
        updated_at: program.updated_at,
    }
}

fn exercise_response(exercise: WorkoutExercise) -> ExerciseResponse {
    ExerciseResponse {
        id: exercise.id,
        day: exercise.day,
        name: exercise.name,
        sets: exercise.sets,
        reps: exercise.reps,
        rest_seconds: exercise.rest_seconds,
        notes: exercise.notes,
        sort_order: exercise.sort_order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn exercise(day: i32, sets: i32, rest_seconds: Option<i32>) -> ExerciseRequest {
        ExerciseRequest {
            day,
            name: " Squat ".to_string(),
            sets,
            reps: "8-10".to_string(),
            rest_seconds,
            notes: None,
            sort_order: None,
        }
    }

    #[test]
    fn test_exercises_are_trimmed_and_ordered() {
        let prepared =
            prepare_exercises(&[exercise(1, 3, Some(90)), exercise(2, 4, None)]).unwrap();

        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[0].name, "Squat");
        assert_eq!(prepared[0].sort_order, 0);
        assert_eq!(prepared[1].sort_order, 1);
    }

    #[rstest]
    #[case::day_out_of_week(exercise(8, 3, None), "day")]
    #[case::no_sets(exercise(1, 0, None), "sets")]
    #[case::negative_rest(exercise(1, 3, Some(-30)), "rest_seconds")]
    fn test_invalid_exercise_names_field(#[case] input: ExerciseRequest, #[case] field: &str) {
        let err = prepare_exercises(&[input]).unwrap_err();
        assert!(matches!(err, ApiError::InvalidField(ref e) if e.field == field));
    }
}
