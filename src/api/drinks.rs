use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{middleware, Json, Router};
use http::StatusCode;
use log::{error, warn};
use serde_json::json;

use super::authz_middleware::authorization_middleware;
use crate::errors::ApiError;
use crate::models::{DrinkPayload, NewDrink};
use crate::openapi::DRINKS_TAG;
use crate::state::AppState;
use crate::store::{DrinkStore, StoreError};

/// Drinks routes. The public listing shares its path with the protected
/// create endpoint, so each method router carries its own permission layer.
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/drinks", get(get_drinks))
        .route(
            "/drinks",
            post(create_drink).route_layer(middleware::from_fn_with_state(
                (state.clone(), "post:drinks"),
                authorization_middleware,
            )),
        )
        .route(
            "/drinks-detail",
            get(get_drinks_detail).route_layer(middleware::from_fn_with_state(
                (state.clone(), "get:drinks-detail"),
                authorization_middleware,
            )),
        )
        .route(
            "/drinks/{id}",
            patch(update_drink).route_layer(middleware::from_fn_with_state(
                (state.clone(), "patch:drinks"),
                authorization_middleware,
            )),
        )
        .route(
            "/drinks/{id}",
            delete(delete_drink).route_layer(middleware::from_fn_with_state(
                (state.clone(), "delete:drinks"),
                authorization_middleware,
            )),
        )
}

/// List all drinks in the public short form
#[utoipa::path(
    get,
    path = "/drinks",
    tag = DRINKS_TAG,
    responses(
        (status = 200, description = "All drinks, ingredient names withheld"),
        (status = 500, description = "Internal server error")
    )
)]
pub(crate) async fn get_drinks(State(state): State<AppState>) -> Response {
    let rows = match state.store.list_all().await {
        Ok(rows) => rows,
        Err(err) => {
            error!("Failed to list drinks: {err}");
            return ApiError::from(err).into_response();
        }
    };

    let drinks = match rows.iter().map(|d| d.short()).collect::<Result<Vec<_>, _>>() {
        Ok(drinks) => drinks,
        Err(err) => {
            error!("Failed to decode stored recipe: {err}");
            return ApiError::internal().into_response();
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "drinks": drinks,
            "status_code": 200,
        })),
    )
        .into_response()
}

/// List all drinks with full recipe detail
#[utoipa::path(
    get,
    path = "/drinks-detail",
    tag = DRINKS_TAG,
    params(
        ("Authorization" = String, Header, description = "Bearer token with the get:drinks-detail permission"),
    ),
    responses(
        (status = 200, description = "All drinks with ingredient names"),
        (status = 401, description = "Missing, malformed or expired token"),
        (status = 403, description = "Token lacks the required permission"),
        (status = 500, description = "Internal server error")
    )
)]
pub(crate) async fn get_drinks_detail(State(state): State<AppState>) -> Response {
    let rows = match state.store.list_all().await {
        Ok(rows) => rows,
        Err(err) => {
            error!("Failed to list drinks: {err}");
            return ApiError::from(err).into_response();
        }
    };

    let drinks = match rows.iter().map(|d| d.long()).collect::<Result<Vec<_>, _>>() {
        Ok(drinks) => drinks,
        Err(err) => {
            error!("Failed to decode stored recipe: {err}");
            return ApiError::internal().into_response();
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "drinks": drinks,
            "status_code": 200,
        })),
    )
        .into_response()
}

/// Create a drink.
///
/// The request is rejected as unprocessable only when `title` and `recipe`
/// are BOTH missing. A request carrying just one of them is accepted and the
/// other field defaults to empty. That boundary is deliberate and matches
/// the long-standing behavior of this endpoint.
#[utoipa::path(
    post,
    path = "/drinks",
    tag = DRINKS_TAG,
    request_body = DrinkPayload,
    params(
        ("Authorization" = String, Header, description = "Bearer token with the post:drinks permission"),
    ),
    responses(
        (status = 200, description = "The created drink in long form"),
        (status = 400, description = "Malformed JSON body"),
        (status = 401, description = "Missing, malformed or expired token"),
        (status = 403, description = "Token lacks the required permission"),
        (status = 422, description = "Neither title nor recipe supplied")
    )
)]
pub(crate) async fn create_drink(
    State(state): State<AppState>,
    payload: Result<Json<DrinkPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Rejected drink payload: {rejection}");
            return ApiError::bad_request().into_response();
        }
    };

    if payload.title.is_none() && payload.recipe.is_none() {
        return ApiError::unprocessable().into_response();
    }

    let title = payload.title.unwrap_or_default();
    let ingredients = payload
        .recipe
        .map(|r| r.into_ingredients())
        .unwrap_or_default();
    let drink = match NewDrink::new(title, &ingredients) {
        Ok(drink) => drink,
        Err(err) => {
            error!("Failed to serialize recipe: {err}");
            return ApiError::internal().into_response();
        }
    };

    let created = match state.store.insert(drink).await {
        Ok(created) => created,
        Err(StoreError::Constraint(reason)) => {
            warn!("Drink insert violated a constraint: {reason}");
            return ApiError::unprocessable().into_response();
        }
        Err(err) => {
            error!("Failed to insert drink: {err}");
            return ApiError::from(err).into_response();
        }
    };

    match created.long() {
        Ok(drink) => (
            StatusCode::OK,
            Json(json!({"success": true, "drinks": [drink]})),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to decode stored recipe: {err}");
            ApiError::internal().into_response()
        }
    }
}

/// Update the supplied fields of an existing drink.
///
/// The id is resolved before the body is considered, so an unknown id is a
/// 404 regardless of what the body contains.
#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    tag = DRINKS_TAG,
    request_body = DrinkPayload,
    params(
        ("id" = String, Path, description = "Drink id"),
        ("Authorization" = String, Header, description = "Bearer token with the patch:drinks permission"),
    ),
    responses(
        (status = 200, description = "The updated drink in long form"),
        (status = 400, description = "Malformed JSON body"),
        (status = 401, description = "Missing, malformed or expired token"),
        (status = 403, description = "Token lacks the required permission"),
        (status = 404, description = "Unknown drink id"),
        (status = 422, description = "Neither title nor recipe supplied")
    )
)]
pub(crate) async fn update_drink(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<DrinkPayload>, JsonRejection>,
) -> Response {
    // A non-numeric id cannot name a row, so it is just an unknown id
    let id: i64 = match id.parse() {
        Ok(id) => id,
        Err(_) => return ApiError::not_found().into_response(),
    };
    let mut drink = match state.store.get_by_id(id).await {
        Ok(Some(drink)) => drink,
        Ok(None) => return ApiError::not_found().into_response(),
        Err(err) => {
            error!("Failed to fetch drink {id}: {err}");
            return ApiError::from(err).into_response();
        }
    };

    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Rejected drink payload: {rejection}");
            return ApiError::bad_request().into_response();
        }
    };
    if payload.title.is_none() && payload.recipe.is_none() {
        return ApiError::unprocessable().into_response();
    }

    if let Some(title) = payload.title {
        drink.title = title;
    }
    if let Some(recipe) = payload.recipe {
        if let Err(err) = drink.set_recipe(&recipe.into_ingredients()) {
            error!("Failed to serialize recipe: {err}");
            return ApiError::internal().into_response();
        }
    }

    match state.store.update(&drink).await {
        Ok(()) => {}
        Err(StoreError::NotFound) => return ApiError::not_found().into_response(),
        Err(err) => {
            error!("Failed to update drink {id}: {err}");
            return ApiError::from(err).into_response();
        }
    }

    match drink.long() {
        Ok(drink) => (
            StatusCode::OK,
            Json(json!({"success": true, "drinks": [drink]})),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to decode stored recipe: {err}");
            ApiError::internal().into_response()
        }
    }
}

/// Delete a drink. Hard delete, no tombstone; a repeated delete of the same
/// id is a 404.
#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    tag = DRINKS_TAG,
    params(
        ("id" = String, Path, description = "Drink id"),
        ("Authorization" = String, Header, description = "Bearer token with the delete:drinks permission"),
    ),
    responses(
        (status = 200, description = "The deleted drink id"),
        (status = 401, description = "Missing, malformed or expired token"),
        (status = 403, description = "Token lacks the required permission"),
        (status = 404, description = "Unknown drink id")
    )
)]
pub(crate) async fn delete_drink(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id: i64 = match id.parse() {
        Ok(id) => id,
        Err(_) => return ApiError::not_found().into_response(),
    };
    match state.store.get_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return ApiError::not_found().into_response(),
        Err(err) => {
            error!("Failed to fetch drink {id}: {err}");
            return ApiError::from(err).into_response();
        }
    }

    match state.store.delete(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"success": true, "delete": id})),
        )
            .into_response(),
        Err(StoreError::NotFound) => ApiError::not_found().into_response(),
        Err(err) => {
            error!("Failed to delete drink {id}: {err}");
            ApiError::from(err).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{mint_token, TestFixture, TokenSpec};
    use http::StatusCode;
    use serde_json::{json, Value};

    fn latte_recipe() -> Value {
        json!([
            {"name": "Espresso", "color": "brown", "parts": 1},
            {"name": "Steamed Milk", "color": "white", "parts": 3},
        ])
    }

    /// Create a drink through the API and return its id
    async fn seed_drink(fixture: &TestFixture, title: &str, recipe: Value) -> i64 {
        let token = fixture.token(&["post:drinks"]);
        let response = fixture
            .post(
                "/drinks",
                Some(&token),
                &json!({"title": title, "recipe": recipe}),
            )
            .await;
        response.assert_status(StatusCode::OK);
        response.drinks()[0]["id"].as_i64().expect("No id assigned")
    }

    #[tokio::test]
    async fn test_list_drinks_empty() {
        let fixture = TestFixture::new().await;
        let response = fixture.get("/drinks", None).await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.body["success"], json!(true));
        assert_eq!(response.body["status_code"], json!(200));
        assert_eq!(response.drinks().len(), 0);
    }

    #[tokio::test]
    async fn test_public_listing_strips_ingredient_names() {
        let fixture = TestFixture::new().await;
        seed_drink(&fixture, "Latte", latte_recipe()).await;

        let response = fixture.get("/drinks", None).await;
        response.assert_status(StatusCode::OK);

        let recipe = response.drinks()[0]["recipe"]
            .as_array()
            .expect("Recipe is not an array");
        assert_eq!(recipe.len(), 2);
        for entry in recipe {
            assert!(entry.get("name").is_none(), "Name leaked: {entry}");
            assert!(entry.get("color").is_some());
            assert!(entry.get("parts").is_some());
        }
    }

    #[tokio::test]
    async fn test_detail_listing_requires_token() {
        let fixture = TestFixture::new().await;
        let response = fixture.get("/drinks-detail", None).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["success"], json!(false));
        assert_eq!(response.error_code(), "invalid_header");
    }

    #[tokio::test]
    async fn test_detail_listing_round_trips_recipe() {
        let fixture = TestFixture::new().await;
        seed_drink(&fixture, "Latte", latte_recipe()).await;

        let token = fixture.token(&["get:drinks-detail"]);
        let response = fixture.get("/drinks-detail", Some(&token)).await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.body["status_code"], json!(200));

        // Order and names preserved exactly
        assert_eq!(response.drinks()[0]["recipe"], latte_recipe());
    }

    #[tokio::test]
    async fn test_detail_listing_without_permission() {
        let fixture = TestFixture::new().await;
        let token = fixture.token(&["post:drinks"]);
        let response = fixture.get("/drinks-detail", Some(&token)).await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(response.error_code(), "unauthorized");
        assert_eq!(response.body["message"], json!("Permission not found."));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let fixture = TestFixture::new().await;
        let token = mint_token(
            TokenSpec::valid(&fixture.config.auth.issuer)
                .permissions(&["get:drinks-detail"])
                .expired(),
        );
        let response = fixture.get("/drinks-detail", Some(&token)).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.error_code(), "token_expired");
    }

    #[tokio::test]
    async fn test_wrong_audience_is_rejected() {
        let fixture = TestFixture::new().await;
        let token = mint_token(
            TokenSpec::valid(&fixture.config.auth.issuer)
                .permissions(&["get:drinks-detail"])
                .audience("payments"),
        );
        let response = fixture.get("/drinks-detail", Some(&token)).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.error_code(), "invalid_claims");
    }

    #[tokio::test]
    async fn test_token_without_permissions_claim() {
        let fixture = TestFixture::new().await;
        let token = mint_token(TokenSpec::valid(&fixture.config.auth.issuer));
        let response = fixture.get("/drinks-detail", Some(&token)).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.error_code(), "invalid_claims");
        assert_eq!(
            response.body["message"],
            json!("Permissions not included in JWT.")
        );
    }

    #[tokio::test]
    async fn test_create_requires_token() {
        let fixture = TestFixture::new().await;
        let response = fixture
            .post("/drinks", None, &json!({"title": "Water"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        // The public GET on the same path is unaffected
        fixture.get("/drinks", None).await.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_with_title_only() {
        let fixture = TestFixture::new().await;
        let token = fixture.token(&["post:drinks"]);
        let response = fixture
            .post("/drinks", Some(&token), &json!({"title": "Water"}))
            .await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.body["success"], json!(true));

        let drink = &response.drinks()[0];
        assert_eq!(drink["title"], json!("Water"));
        assert_eq!(drink["recipe"], json!([]));
    }

    #[tokio::test]
    async fn test_create_with_recipe_only() {
        // The endpoint rejects only when BOTH fields are missing, so a
        // recipe without a title is accepted
        let fixture = TestFixture::new().await;
        let token = fixture.token(&["post:drinks"]);
        let response = fixture
            .post("/drinks", Some(&token), &json!({"recipe": latte_recipe()}))
            .await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.drinks()[0]["recipe"], latte_recipe());
    }

    #[tokio::test]
    async fn test_create_with_empty_body() {
        let fixture = TestFixture::new().await;
        let token = fixture.token(&["post:drinks"]);
        let response = fixture.post("/drinks", Some(&token), &json!({})).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.error_code(), "unprocessable");
        assert_eq!(response.body["message"], json!("unprocessable"));
    }

    #[tokio::test]
    async fn test_create_with_null_fields() {
        // Explicit nulls count as absent
        let fixture = TestFixture::new().await;
        let token = fixture.token(&["post:drinks"]);
        let response = fixture
            .post(
                "/drinks",
                Some(&token),
                &json!({"title": null, "recipe": null}),
            )
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_with_non_object_body() {
        let fixture = TestFixture::new().await;
        let token = fixture.token(&["post:drinks"]);
        let response = fixture
            .post("/drinks", Some(&token), &json!("not an object"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.error_code(), "bad_request");
    }

    #[tokio::test]
    async fn test_create_normalizes_single_ingredient_recipe() {
        let fixture = TestFixture::new().await;
        let token = fixture.token(&["post:drinks"]);
        let response = fixture
            .post(
                "/drinks",
                Some(&token),
                &json!({
                    "title": "Water",
                    "recipe": {"name": "Water", "color": "blue", "parts": 1},
                }),
            )
            .await;
        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.drinks()[0]["recipe"],
            json!([{"name": "Water", "color": "blue", "parts": 1}])
        );
    }

    #[tokio::test]
    async fn test_update_unknown_id_regardless_of_body() {
        let fixture = TestFixture::new().await;
        let token = fixture.token(&["patch:drinks"]);

        let response = fixture
            .patch("/drinks/999999", Some(&token), &json!({"title": "New Name"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.error_code(), "not_found");
        assert_eq!(response.body["message"], json!("resource not found"));

        // Still 404 with a body that would otherwise be unprocessable
        fixture
            .patch("/drinks/999999", Some(&token), &json!({}))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        // A non-numeric id is just an unknown id
        fixture
            .patch("/drinks/lungo", Some(&token), &json!({"title": "New Name"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_title_leaves_recipe_alone() {
        let fixture = TestFixture::new().await;
        let id = seed_drink(&fixture, "Latte", latte_recipe()).await;

        let token = fixture.token(&["patch:drinks"]);
        let response = fixture
            .patch(
                &format!("/drinks/{id}"),
                Some(&token),
                &json!({"title": "Oat Latte"}),
            )
            .await;
        response.assert_status(StatusCode::OK);

        let drink = &response.drinks()[0];
        assert_eq!(drink["title"], json!("Oat Latte"));
        assert_eq!(drink["recipe"], latte_recipe());
    }

    #[tokio::test]
    async fn test_update_recipe_leaves_title_alone() {
        let fixture = TestFixture::new().await;
        let id = seed_drink(&fixture, "Latte", latte_recipe()).await;

        let token = fixture.token(&["patch:drinks"]);
        let new_recipe = json!([{"name": "Espresso", "color": "brown", "parts": 2}]);
        let response = fixture
            .patch(
                &format!("/drinks/{id}"),
                Some(&token),
                &json!({"recipe": new_recipe}),
            )
            .await;
        response.assert_status(StatusCode::OK);

        let drink = &response.drinks()[0];
        assert_eq!(drink["title"], json!("Latte"));
        assert_eq!(drink["recipe"], new_recipe);
    }

    #[tokio::test]
    async fn test_update_with_neither_field() {
        let fixture = TestFixture::new().await;
        let id = seed_drink(&fixture, "Latte", latte_recipe()).await;

        let token = fixture.token(&["patch:drinks"]);
        let response = fixture
            .patch(&format!("/drinks/{id}"), Some(&token), &json!({}))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.error_code(), "unprocessable");
    }

    #[tokio::test]
    async fn test_update_without_permission() {
        let fixture = TestFixture::new().await;
        let id = seed_drink(&fixture, "Latte", latte_recipe()).await;

        let token = fixture.token(&["get:drinks-detail"]);
        fixture
            .patch(
                &format!("/drinks/{id}"),
                Some(&token),
                &json!({"title": "Oat Latte"}),
            )
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_delete_removes_drink() {
        let fixture = TestFixture::new().await;
        let id = seed_drink(&fixture, "Latte", latte_recipe()).await;

        let token = fixture.token(&["delete:drinks"]);
        let response = fixture.delete(&format!("/drinks/{id}"), Some(&token)).await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.body["success"], json!(true));
        assert_eq!(response.body["delete"], json!(id));

        // Gone from the public listing
        let listing = fixture.get("/drinks", None).await;
        assert!(listing
            .drinks()
            .iter()
            .all(|d| d["id"].as_i64() != Some(id)));

        // Hard delete: a second delete of the same id is a 404
        let response = fixture.delete(&format!("/drinks/{id}"), Some(&token)).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.error_code(), "not_found");
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let fixture = TestFixture::new().await;
        let token = fixture.token(&["delete:drinks"]);
        fixture
            .delete("/drinks/999999", Some(&token))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        fixture
            .delete("/drinks/espresso", Some(&token))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
