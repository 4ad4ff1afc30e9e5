//! Input validation functions
//!
//! This module provides validation utilities for user input. Each validator
//! returns a plain message; wrap it with [`ValidationError::check`] to attach
//! the field it belongs to.

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a required display text (names, titles, questions)
pub fn validate_required_text(value: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("cannot be empty".to_string());
    }
    if value.chars().count() > max_len {
        return Err(format!("must be at most {} characters", max_len));
    }
    Ok(())
}

/// Validate a nutrient amount (calories, grams)
pub fn validate_nutrient(value: f64) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err("must be a valid number".to_string());
    }
    if value < 0.0 {
        return Err("cannot be negative".to_string());
    }
    if value > 50000.0 {
        return Err("is unreasonably high".to_string());
    }
    Ok(())
}

/// Validate a strictly positive quantity (servings, serving size)
pub fn validate_quantity(value: f64) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err("must be a valid number".to_string());
    }
    if value <= 0.0 {
        return Err("must be positive".to_string());
    }
    if value > 10000.0 {
        return Err("is unreasonably high".to_string());
    }
    Ok(())
}

/// Validate a day index within a weekly plan (1 = Monday ... 7 = Sunday)
pub fn validate_day(day: i32) -> Result<(), String> {
    if !(1..=7).contains(&day) {
        return Err("must be between 1 and 7".to_string());
    }
    Ok(())
}

/// Validate a learning phase number
pub fn validate_phase(phase: i32) -> Result<(), String> {
    if phase < 1 {
        return Err("must be at least 1".to_string());
    }
    if phase > 100 {
        return Err("must be at most 100".to_string());
    }
    Ok(())
}

/// Validate a workout set count
pub fn validate_sets(sets: i32) -> Result<(), String> {
    if !(1..=50).contains(&sets) {
        return Err("must be between 1 and 50".to_string());
    }
    Ok(())
}

/// Validate a program length in weeks
pub fn validate_duration_weeks(weeks: i32) -> Result<(), String> {
    if !(1..=104).contains(&weeks) {
        return Err("must be between 1 and 104".to_string());
    }
    Ok(())
}

/// Validate a duration in minutes (prep, cook, rest)
pub fn validate_minutes(minutes: i32) -> Result<(), String> {
    if minutes < 0 {
        return Err("cannot be negative".to_string());
    }
    if minutes > 1440 {
        return Err("cannot exceed 24 hours".to_string());
    }
    Ok(())
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "email" => "Email",
        "password" => "Password",
        "name" => "Name",
        "title" => "Title",
        "content" => "Content",
        "question" => "Question",
        "answer" => "Answer",
        "phase" => "Phase",
        "serving_size" => "Serving Size",
        "servings" => "Servings",
        "calories" => "Calories",
        "protein_g" => "Protein",
        "carbohydrates_g" => "Carbohydrates",
        "fat_g" => "Fat",
        "fiber_g" => "Fiber",
        "target_calories" => "Daily Calorie Target",
        "target_protein_g" => "Daily Protein Target",
        "target_carbohydrates_g" => "Daily Carbohydrate Target",
        "target_fat_g" => "Daily Fat Target",
        "day" => "Day",
        "sets" => "Sets",
        "reps" => "Reps",
        "rest_seconds" => "Rest",
        "duration_weeks" => "Program Length",
        "prep_minutes" => "Prep Time",
        "cook_minutes" => "Cook Time",
        "quantity" => "Quantity",
        "unit" => "Unit",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Attach a field name to a validator result
    pub fn check(field: &str, result: Result<(), String>) -> Result<(), ValidationError> {
        result.map_err(|message| Self::new(field, &message))
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_required_text() {
        assert!(validate_required_text("Meal prep 101", 200).is_ok());
        assert!(validate_required_text("   ", 200).is_err());
        assert!(validate_required_text(&"x".repeat(201), 200).is_err());
    }

    #[test]
    fn test_validate_nutrient() {
        assert!(validate_nutrient(0.0).is_ok());
        assert!(validate_nutrient(2500.0).is_ok());
        assert!(validate_nutrient(-1.0).is_err());
        assert!(validate_nutrient(f64::NAN).is_err());
        assert!(validate_nutrient(100000.0).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0.5).is_ok());
        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-2.0).is_err());
        assert!(validate_quantity(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(validate_day(1).is_ok());
        assert!(validate_day(7).is_ok());
        assert!(validate_day(0).is_err());
        assert!(validate_day(8).is_err());
        assert!(validate_phase(1).is_ok());
        assert!(validate_phase(0).is_err());
        assert!(validate_sets(5).is_ok());
        assert!(validate_sets(0).is_err());
        assert!(validate_duration_weeks(12).is_ok());
        assert!(validate_duration_weeks(0).is_err());
        assert!(validate_minutes(90).is_ok());
        assert!(validate_minutes(-5).is_err());
    }

    #[test]
    fn test_validation_error_carries_label() {
        let err = ValidationError::check("target_calories", validate_nutrient(-10.0)).unwrap_err();
        assert_eq!(err.field, "target_calories");
        assert_eq!(err.user_message(), "Daily Calorie Target: cannot be negative");
        assert_eq!(get_field_display_label("unknown_field"), "unknown_field");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_valid_nutrient_range(value in 0.0f64..=50000.0) {
            prop_assert!(validate_nutrient(value).is_ok());
        }

        #[test]
        fn prop_day_valid_only_within_week(day in -20i32..20) {
            prop_assert_eq!(validate_day(day).is_ok(), (1..=7).contains(&day));
        }

        #[test]
        fn prop_password_length_valid(len in 8usize..=128) {
            let password: String = (0..len).map(|_| 'a').collect();
            prop_assert!(validate_password(&password).is_ok());
        }
    }
}
