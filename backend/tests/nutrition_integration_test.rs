//! Integration tests for foods, recipes, nutrition plans, shopping lists and
//! the dashboard

mod common;

use axum::http::StatusCode;
use common::{data_id, TestApp, TestUser};
use serde_json::{json, Value};

async fn create_food(app: &TestApp, coach: &TestUser, body: Value) -> String {
    let (status, response) = app.post_auth("/api/v1/foods", &body, &coach.token).await;
    assert_eq!(status, StatusCode::CREATED, "create food: {}", response);
    data_id(&response)
}

/// Oats and milk porridge, two servings; 210 kcal per serving
async fn create_porridge(app: &TestApp, coach: &TestUser) -> (String, String, String) {
    let oats = create_food(
        app,
        coach,
        json!({ "name": "Rolled oats", "serving_size": 40, "serving_unit": "g",
                "calories": 150, "protein_g": 5, "carbohydrates_g": 27, "fat_g": 3, "fiber_g": 4 }),
    )
    .await;
    let milk = create_food(
        app,
        coach,
        json!({ "name": "Milk", "serving_size": 250, "serving_unit": "ml",
                "calories": 120, "protein_g": 8, "carbohydrates_g": 12, "fat_g": 5 }),
    )
    .await;

    let (status, recipe) = app
        .post_auth(
            "/api/v1/recipes",
            &json!({
                "name": "Porridge",
                "servings": 2,
                "ingredients": [
                    { "food_item_id": oats, "servings": 2 },
                    { "food_item_id": milk, "servings": 1 }
                ]
            }),
            &coach.token,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create recipe: {}", recipe);
    assert_eq!(recipe["data"]["totals"]["calories"], 420.0);
    assert_eq!(recipe["data"]["per_serving"]["calories"], 210.0);

    (data_id(&recipe), oats, milk)
}

async fn create_plan(app: &TestApp, coach: &TestUser, client: &TestUser, recipe: &str) -> String {
    let (status, plan) = app
        .post_auth(
            "/api/v1/nutrition-plans",
            &json!({
                "name": "Cut phase",
                "client_id": client.id,
                "target_calories": 2100,
                "target_protein_g": 90,
                "meals": [
                    { "day": 1, "meal_type": "breakfast", "recipe_id": recipe },
                    { "day": 2, "meal_type": "breakfast", "recipe_id": recipe, "servings": 2 }
                ]
            }),
            &coach.token,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create plan: {}", plan);
    data_id(&plan)
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_food_updates_refresh_recipe_macros() {
    let app = TestApp::new().await;
    let coach = app.create_coach().await;
    let (recipe, oats, _) = create_porridge(&app, &coach).await;

    let (status, _) = app
        .patch_auth(&format!("/api/v1/foods/{}", oats), &json!({ "calories": 160 }), &coach.token)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = app
        .get_auth(&format!("/api/v1/recipes/{}", recipe), &coach.token)
        .await;
    assert_eq!(detail["data"]["per_serving"]["calories"], 220.0);

    // Foods used by a recipe cannot be deleted
    let status = app.delete_auth(&format!("/api/v1/foods/{}", oats), &coach.token).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_plan_summary_per_day() {
    let app = TestApp::new().await;
    let coach = app.create_coach().await;
    let client = app.create_client(&coach).await;
    let (recipe, _, _) = create_porridge(&app, &coach).await;
    let plan = create_plan(&app, &coach, &client, &recipe).await;

    let (status, summary) = app
        .get_auth(&format!("/api/v1/nutrition-plans/{}/summary", plan), &client.token)
        .await;
    assert_eq!(status, StatusCode::OK);

    let days = summary["data"]["days"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["totals"]["calories"], 210.0);
    assert_eq!(days[0]["calories_percent_of_target"], 10.0);
    assert_eq!(days[0]["protein_percent_of_target"], 10.0);
    assert!(days[0].get("fat_percent_of_target").is_none());
    assert_eq!(days[1]["totals"]["calories"], 420.0);
    assert_eq!(summary["data"]["daily_average"]["calories"], 315.0);

    // A scheduled recipe cannot be deleted
    let status = app.delete_auth(&format!("/api/v1/recipes/{}", recipe), &coach.token).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Plans are hidden from other clients
    let stranger = app.create_client(&coach).await;
    let (status, _) = app
        .get_auth(&format!("/api/v1/nutrition-plans/{}", plan), &stranger.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_shopping_list_from_plan_and_export() {
    let app = TestApp::new().await;
    let coach = app.create_coach().await;
    let client = app.create_client(&coach).await;
    let (recipe, _, _) = create_porridge(&app, &coach).await;
    let plan = create_plan(&app, &coach, &client, &recipe).await;

    let (status, list) = app
        .post_auth(
            &format!("/api/v1/shopping-lists/from-plan/{}", plan),
            &json!({}),
            &client.token,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "generate: {}", list);
    assert_eq!(list["data"]["name"], "Cut phase - shopping list");
    assert_eq!(list["data"]["client_id"], client.id.to_string());

    // Three meal servings of a two-serving recipe
    let items = list["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Milk");
    assert_eq!(items[0]["quantity"], 375.0);
    assert_eq!(items[0]["unit"], "ml");
    assert_eq!(items[1]["name"], "Rolled oats");
    assert_eq!(items[1]["quantity"], 120.0);
    assert_eq!(items[1]["unit"], "g");

    let list_id = data_id(&list);
    let (status, item) = app
        .post_auth(
            &format!("/api/v1/shopping-lists/{}/items", list_id),
            &json!({ "name": "Blueberries" }),
            &client.token,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["data"]["unit"], "item");

    let item_id = data_id(&item);
    let (status, item) = app
        .patch_auth(
            &format!("/api/v1/shopping-lists/{}/items/{}", list_id, item_id),
            &json!({ "checked": true }),
            &coach.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["data"]["checked"], true);

    let (status, csv) = app
        .get_text_auth(&format!("/api/v1/shopping-lists/{}/export", list_id), &client.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("name,quantity,unit,checked"));
    assert!(csv.contains("Blueberries"));
    assert!(csv.contains("Rolled oats"));

    // Lists are hidden from other coaches
    let other = app.create_coach().await;
    let (status, _) = app
        .get_auth(&format!("/api/v1/shopping-lists/{}", list_id), &other.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_unassigned_plan_cannot_generate_list() {
    let app = TestApp::new().await;
    let coach = app.create_coach().await;
    let (recipe, _, _) = create_porridge(&app, &coach).await;

    let (status, plan) = app
        .post_auth(
            "/api/v1/nutrition-plans",
            &json!({
                "name": "Template",
                "meals": [{ "day": 1, "meal_type": "lunch", "recipe_id": recipe }]
            }),
            &coach.token,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post_auth(
            &format!("/api/v1/shopping-lists/from-plan/{}", data_id(&plan)),
            &json!({}),
            &coach.token,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_dashboards() {
    let app = TestApp::new().await;
    let coach = app.create_coach().await;
    let client = app.create_client(&coach).await;
    let (recipe, _, _) = create_porridge(&app, &coach).await;
    create_plan(&app, &coach, &client, &recipe).await;

    let (status, dashboard) = app.get_auth("/api/v1/dashboard", &coach.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["data"]["role"], "coach");
    assert_eq!(dashboard["data"]["client_count"], 1);
    assert_eq!(dashboard["data"]["recipe_count"], 1);
    assert_eq!(dashboard["data"]["nutrition_plan_count"], 1);

    let (status, dashboard) = app.get_auth("/api/v1/dashboard", &client.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["data"]["role"], "client");
    assert_eq!(dashboard["data"]["nutrition_plans"].as_array().unwrap().len(), 1);
    assert_eq!(dashboard["data"]["shopping_list_count"], 0);
    assert_eq!(dashboard["data"]["learning"]["completed_articles"], 0);
}
