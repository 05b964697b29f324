use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single recipe ingredient with full detail.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Ingredient {
    /// Ingredient name (only disclosed in the long projection)
    pub name: String,
    /// Display color for the ingredient
    pub color: String,
    /// Relative parts of this ingredient in the drink
    pub parts: u32,
}

/// A recipe ingredient as disclosed publicly, with the name stripped.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct IngredientSummary {
    pub color: String,
    pub parts: u32,
}

impl From<&Ingredient> for IngredientSummary {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            color: ingredient.color.clone(),
            parts: ingredient.parts,
        }
    }
}

/// Recipe as accepted on the wire: either a single ingredient object or an
/// ordered sequence of them. Always normalized to a sequence before storage.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(untagged)]
pub enum RecipeInput {
    Single(Ingredient),
    Sequence(Vec<Ingredient>),
}

impl RecipeInput {
    pub fn into_ingredients(self) -> Vec<Ingredient> {
        match self {
            Self::Single(ingredient) => vec![ingredient],
            Self::Sequence(ingredients) => ingredients,
        }
    }
}

/// Request body for POST and PATCH on the drinks resource.
///
/// Both fields are optional; the handlers decide which combinations are
/// acceptable. An explicit JSON `null` counts as "not supplied".
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
pub struct DrinkPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

/// Short projection of a drink: ingredient names are withheld.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct DrinkSummary {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<IngredientSummary>,
}

/// Long projection of a drink: full ingredient detail.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct DrinkDetail {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// A persisted drink record.
///
/// The recipe is held as serialized JSON text, exactly as the store keeps it;
/// it only becomes structured data through the projection methods. The
/// serialized form is an invariant of this type: both constructors accept
/// structured ingredients and serialize them here, so a decode failure on the
/// way out means the backing row was corrupted outside the application.
#[derive(Debug, Clone, PartialEq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    recipe: String,
}

impl Drink {
    /// Reconstruct a drink from its stored columns.
    pub fn from_columns(id: i64, title: String, recipe: String) -> Self {
        Self { id, title, recipe }
    }

    /// Decoded structured form of the recipe.
    pub fn recipe(&self) -> Result<Vec<Ingredient>, serde_json::Error> {
        serde_json::from_str(&self.recipe)
    }

    /// Replace the recipe, serializing the structured form internally.
    pub fn set_recipe(&mut self, ingredients: &[Ingredient]) -> Result<(), serde_json::Error> {
        self.recipe = serde_json::to_string(ingredients)?;
        Ok(())
    }

    /// The serialized recipe text, for persistence.
    pub fn recipe_text(&self) -> &str {
        &self.recipe
    }

    pub fn short(&self) -> Result<DrinkSummary, serde_json::Error> {
        let recipe = self.recipe()?;
        Ok(DrinkSummary {
            id: self.id,
            title: self.title.clone(),
            recipe: recipe.iter().map(IngredientSummary::from).collect(),
        })
    }

    pub fn long(&self) -> Result<DrinkDetail, serde_json::Error> {
        Ok(DrinkDetail {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe()?,
        })
    }
}

/// A drink that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDrink {
    pub title: String,
    recipe: String,
}

impl NewDrink {
    pub fn new(title: String, ingredients: &[Ingredient]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            title,
            recipe: serde_json::to_string(ingredients)?,
        })
    }

    pub fn recipe_text(&self) -> &str {
        &self.recipe
    }

    /// Promote to a full record once the store has assigned an id.
    pub fn into_drink(self, id: i64) -> Drink {
        Drink {
            id,
            title: self.title,
            recipe: self.recipe,
        }
    }
}
