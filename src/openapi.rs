use utoipa::OpenApi;

pub(crate) const DRINKS_TAG: &str = "Drinks API";
pub(crate) const HEALTH_TAG: &str = "Health API";

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = DRINKS_TAG, description = "Drinks menu endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    ),
    paths(
        crate::api::drinks::get_drinks,
        crate::api::drinks::get_drinks_detail,
        crate::api::drinks::create_drink,
        crate::api::drinks::update_drink,
        crate::api::drinks::delete_drink,
        crate::api::health::health_check,
    ),
    components(schemas(
        crate::models::DrinkPayload,
        crate::models::DrinkSummary,
        crate::models::DrinkDetail,
        crate::models::Ingredient,
        crate::models::IngredientSummary,
        crate::models::RecipeInput,
    )),
    info(
        title = "Barback API",
        description = "Drinks menu service with token-gated authorization",
        version = "1.0.0"
    )
)]
pub(crate) struct ApiDoc;
