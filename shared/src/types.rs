//! API request and response types

use crate::models::{MealType, ProgressStatus, Role};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Envelopes
// ============================================================================

/// Success envelope: every JSON response body is `{ "data": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl Pagination {
    /// Rows to return, capped at 100
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, 100) as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.limit()
    }
}

/// Paginated list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: &Pagination) -> Self {
        let per_page = pagination.limit() as u32;
        let total_pages = ((total.max(0) as u32) + per_page - 1) / per_page;
        Self {
            items,
            total,
            page: pagination.page.max(1),
            per_page,
            total_pages,
        }
    }
}

/// Macro/calorie totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbohydrates_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
}

// ============================================================================
// Auth
// ============================================================================

/// Authentication tokens response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub role: Role,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
    /// Required when `role` is coach
    #[serde(default)]
    pub invite_code: Option<String>,
}

/// Refresh token request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// User profile response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coach_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Clients
// ============================================================================

/// Coach creates a client account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClientRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub is_archived: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientListQuery {
    #[serde(default)]
    pub include_archived: bool,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Article categories
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub article_count: i64,
}

// ============================================================================
// Articles
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub content: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub phase: Option<i32>,
    #[serde(default)]
    pub prerequisite_ids: Vec<Uuid>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub phase: Option<i32>,
    pub prerequisite_ids: Option<Vec<Uuid>>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleListQuery {
    pub category_id: Option<Uuid>,
    pub phase: Option<i32>,
    pub tag: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ArticleListQuery {
    pub fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelatedArticlesQuery {
    pub limit: Option<usize>,
}

/// Article as seen by the requesting user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Omitted while the article is locked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub phase: i32,
    pub prerequisite_ids: Vec<Uuid>,
    pub published: bool,
    pub locked: bool,
    pub missing_prerequisites: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact article entry used by search, related and path listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub tags: Vec<String>,
    pub phase: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSearchResult {
    #[serde(flatten)]
    pub article: ArticleSummary,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedArticle {
    #[serde(flatten)]
    pub article: ArticleSummary,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProgressRequest {
    pub status: ProgressStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub article_id: Uuid,
    pub status: ProgressStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Learning paths completed as a result of this update
    pub completed_paths: Vec<Uuid>,
}

// ============================================================================
// Learning paths
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLearningPathRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phase: Option<i32>,
    #[serde(default)]
    pub prerequisite_ids: Vec<Uuid>,
    #[serde(default)]
    pub article_ids: Vec<Uuid>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLearningPathRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub phase: Option<i32>,
    pub prerequisite_ids: Option<Vec<Uuid>>,
    pub published: Option<bool>,
    pub is_archived: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPathArticlesRequest {
    pub article_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningPathListQuery {
    #[serde(default)]
    pub include_archived: bool,
    pub phase: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPathResponse {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub phase: i32,
    pub prerequisite_ids: Vec<Uuid>,
    pub published: bool,
    pub is_archived: bool,
    pub article_count: usize,
    pub completed_count: usize,
    pub progress_percent: f64,
    pub locked: bool,
    pub missing_prerequisites: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProgressStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathArticleEntry {
    #[serde(flatten)]
    pub article: ArticleSummary,
    pub position: i32,
    pub completed: bool,
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPathDetailResponse {
    #[serde(flatten)]
    pub path: LearningPathResponse,
    pub articles: Vec<PathArticleEntry>,
}

// ============================================================================
// Food items
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFoodItemRequest {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub calories: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbohydrates_g: f64,
    #[serde(default)]
    pub fat_g: f64,
    #[serde(default)]
    pub fiber_g: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFoodItemRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbohydrates_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub fiber_g: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodSearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItemResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbohydrates_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
}

// ============================================================================
// Recipes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddIngredientRequest {
    pub food_item_id: Uuid,
    pub servings: f64,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    pub servings: f64,
    #[serde(default)]
    pub prep_minutes: Option<i32>,
    #[serde(default)]
    pub cook_minutes: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub ingredients: Vec<AddIngredientRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub servings: Option<f64>,
    pub prep_minutes: Option<i32>,
    pub cook_minutes: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub servings: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook_minutes: Option<i32>,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub per_serving: MacroTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredientResponse {
    pub food_item_id: Uuid,
    pub name: String,
    pub servings: f64,
    pub serving_size: f64,
    pub serving_unit: String,
    pub sort_order: i32,
    pub nutrition: MacroTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetailResponse {
    #[serde(flatten)]
    pub recipe: RecipeResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub totals: MacroTotals,
}

// ============================================================================
// Nutrition plans
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMealRequest {
    pub day: i32,
    pub meal_type: MealType,
    pub recipe_id: Uuid,
    #[serde(default = "default_servings")]
    pub servings: f64,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

fn default_servings() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNutritionPlanRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub target_calories: Option<i32>,
    #[serde(default)]
    pub target_protein_g: Option<i32>,
    #[serde(default)]
    pub target_carbohydrates_g: Option<i32>,
    #[serde(default)]
    pub target_fat_g: Option<i32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub meals: Vec<PlanMealRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNutritionPlanRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client_id: Option<Uuid>,
    pub target_calories: Option<i32>,
    pub target_protein_g: Option<i32>,
    pub target_carbohydrates_g: Option<i32>,
    pub target_fat_g: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_archived: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPlanMealsRequest {
    pub meals: Vec<PlanMealRequest>,
}

/// Filters for plan/program listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentListQuery {
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionPlanResponse {
    pub id: Uuid,
    pub coach_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_calories: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_protein_g: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_carbohydrates_g: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_fat_g: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMealResponse {
    pub id: Uuid,
    pub day: i32,
    pub meal_type: MealType,
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub servings: f64,
    pub sort_order: i32,
    pub nutrition: MacroTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionPlanDetailResponse {
    #[serde(flatten)]
    pub plan: NutritionPlanResponse,
    pub meals: Vec<PlanMealResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayNutritionSummary {
    pub day: i32,
    pub meal_count: usize,
    pub totals: MacroTotals,
    /// Calories as a percentage of the plan's daily target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_percent_of_target: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_percent_of_target: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbohydrates_percent_of_target: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_percent_of_target: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionPlanSummaryResponse {
    pub plan_id: Uuid,
    pub days: Vec<DayNutritionSummary>,
    /// Average over the days that have at least one meal
    pub daily_average: MacroTotals,
}

// ============================================================================
// Workout programs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseRequest {
    pub day: i32,
    pub name: String,
    pub sets: i32,
    pub reps: String,
    #[serde(default)]
    pub rest_seconds: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkoutProgramRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    pub duration_weeks: i32,
    #[serde(default)]
    pub exercises: Vec<ExerciseRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWorkoutProgramRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client_id: Option<Uuid>,
    pub duration_weeks: Option<i32>,
    pub is_archived: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetExercisesRequest {
    pub exercises: Vec<ExerciseRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutProgramResponse {
    pub id: Uuid,
    pub coach_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub duration_weeks: i32,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseResponse {
    pub id: Uuid,
    pub day: i32,
    pub name: String,
    pub sets: i32,
    pub reps: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutProgramDetailResponse {
    #[serde(flatten)]
    pub program: WorkoutProgramResponse,
    pub exercises: Vec<ExerciseResponse>,
}

// ============================================================================
// FAQs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFaqRequest {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFaqRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub sort_order: Option<i32>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaqListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqResponse {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub sort_order: i32,
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Shopping lists
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingItemRequest {
    pub name: String,
    #[serde(default = "default_servings")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub food_item_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShoppingListRequest {
    pub name: String,
    /// Required for coaches; clients always create lists for themselves
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub items: Vec<ShoppingItemRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateShoppingListRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateShoppingItemRequest {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub checked: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateShoppingListRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShoppingListQuery {
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub created_by: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition_plan_id: Option<Uuid>,
    pub item_count: i64,
    pub checked_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingItemResponse {
    pub id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_item_id: Option<Uuid>,
    pub checked: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListDetailResponse {
    #[serde(flatten)]
    pub list: ShoppingListResponse,
    pub items: Vec<ShoppingItemResponse>,
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningSummary {
    pub total_paths: usize,
    pub completed_paths: usize,
    pub in_progress_paths: usize,
    pub completed_articles: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentArticle {
    pub id: Uuid,
    pub title: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientDashboard {
    pub nutrition_plans: Vec<NutritionPlanResponse>,
    pub workout_programs: Vec<WorkoutProgramResponse>,
    pub learning: LearningSummary,
    pub recent_articles: Vec<RecentArticle>,
    pub shopping_list_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachDashboard {
    pub client_count: i64,
    pub article_count: i64,
    pub published_article_count: i64,
    pub learning_path_count: i64,
    pub recipe_count: i64,
    pub nutrition_plan_count: i64,
    pub workout_program_count: i64,
    pub faq_count: i64,
}

/// Dashboard body, tagged by the role it was built for
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DashboardResponse {
    Coach(CoachDashboard),
    Client(ClientDashboard),
}
