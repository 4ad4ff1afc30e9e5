//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod article;
pub mod faq;
pub mod learning_path;
pub mod nutrition;
pub mod nutrition_plan;
pub mod shopping_list;
pub mod user;
pub mod workout;

pub use article::{
    ArticleFilter, ArticleProgressRecord, ArticleProgressRepository, ArticleRecord,
    ArticleRepository, CategoryRecord, CategoryRepository, CompletedArticle, CreateArticle,
    UpdateArticle,
};
pub use faq::{CreateFaq, Faq, FaqRepository, UpdateFaq};
pub use learning_path::{
    CreateLearningPath, LearningPathRecord, LearningPathRepository, PathArticleRecord,
    PathMembership, PathProgressRecord, PathProgressRepository, UpdateLearningPath,
};
pub use nutrition::{
    AddRecipeIngredient, CreateFoodItem, CreateRecipe, FoodItem, FoodItemRepository, Recipe,
    RecipeIngredient, RecipeMacroCache, RecipeRepository, UpdateFoodItem, UpdateRecipe,
};
pub use nutrition_plan::{
    AssignmentFilter, CreateNutritionPlan, NewPlanMeal, NutritionPlan, NutritionPlanRepository,
    PlanIngredient, PlanMeal, UpdateNutritionPlan,
};
pub use shopping_list::{
    CreateShoppingList, NewShoppingItem, ShoppingItem, ShoppingList, ShoppingListRepository,
    UpdateShoppingItem,
};
pub use user::{CreateUser, UpdateClient, UserRecord, UserRepository};
pub use workout::{
    CreateWorkoutProgram, NewExercise, UpdateWorkoutProgram, WorkoutExercise, WorkoutProgram,
    WorkoutRepository,
};
