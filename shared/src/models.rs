//! Domain enums shared by the backend and WASM modules

use crate::errors::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role used by the access-control checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coach,
    #[default]
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Coach => "coach",
            Role::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coach" => Ok(Role::Coach),
            "client" => Ok(Role::Client),
            _ => Err(ParseEnumError {
                kind: "role",
                value: s.to_string(),
                allowed: "coach, client",
            }),
        }
    }
}

/// Progress of a user through an article or learning path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ProgressStatus::Completed)
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in_progress" => Ok(ProgressStatus::InProgress),
            "completed" => Ok(ProgressStatus::Completed),
            _ => Err(ParseEnumError {
                kind: "progress status",
                value: s.to_string(),
                allowed: "in_progress, completed",
            }),
        }
    }
}

/// Meal slot within a nutrition plan day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(ParseEnumError {
                kind: "meal type",
                value: s.to_string(),
                allowed: "breakfast, lunch, dinner, snack",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        assert_eq!("coach".parse::<Role>().unwrap(), Role::Coach);
        assert_eq!(" Client ".parse::<Role>().unwrap(), Role::Client);
        assert_eq!(Role::Coach.to_string(), "coach");
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        let json = serde_json::to_string(&Role::Coach).unwrap();
        assert_eq!(json, "\"coach\"");
        let role: Role = serde_json::from_str("\"client\"").unwrap();
        assert_eq!(role, Role::Client);
    }

    #[test]
    fn test_progress_status_parse() {
        assert_eq!(
            "completed".parse::<ProgressStatus>().unwrap(),
            ProgressStatus::Completed
        );
        assert_eq!(
            "IN_PROGRESS".parse::<ProgressStatus>().unwrap(),
            ProgressStatus::InProgress
        );
        let err = "done".parse::<ProgressStatus>().unwrap_err();
        assert!(err.to_string().contains("in_progress, completed"));
    }

    #[test]
    fn test_meal_type_parse() {
        assert_eq!("Dinner".parse::<MealType>().unwrap(), MealType::Dinner);
        assert!("brunch".parse::<MealType>().is_err());
    }
}
