//! Food text parser. Turns "200g chicken breast with rice" into structured foods.
//!
//! Two stages, tried in order, first success wins:
//! 1. AI: one completion call; the reply's first JSON object is read and its
//!    totals are normalized to per-unit values.
//! 2. Fallback: keyword matching against the user's frequent foods.
//!
//! Provider failures never reach the caller. They are logged and the fallback runs.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{extract_json_object, CompletionProvider};
use crate::nutrition::fallback::match_foods;
use crate::nutrition::frequent::FrequentFoodSource;
use crate::nutrition::prompts::{food_parse_prompt, food_parse_system};
use crate::nutrition::{round_to, NutritionTotals, Portion};

pub const AI_CONFIDENCE: f64 = 0.85;
/// Size of the frequent-foods corpus the fallback matches against.
pub const FALLBACK_CORPUS_SIZE: i64 = 50;

const NO_MATCH_MESSAGE: &str = "Could not identify any foods. Try being more specific, \
    for example \"200g chicken breast, 1 cup rice\".";

/// A food recognized in free text. Nutrient values are per unit of `quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedFood {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub confidence: f64,
}

impl ParsedFood {
    pub fn portion(&self) -> Portion {
        Portion {
            quantity: self.quantity,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParseSource {
    #[serde(rename = "cloudflare-ai")]
    CloudflareAi,
    #[serde(rename = "fallback")]
    Fallback,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParseOutcome {
    pub success: bool,
    pub foods: Vec<ParsedFood>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<NutritionTotals>,
    pub message: String,
    pub source: ParseSource,
}

impl ParseOutcome {
    fn found(foods: Vec<ParsedFood>, source: ParseSource) -> Self {
        let totals = NutritionTotals::from_portions(foods.iter().map(ParsedFood::portion));
        let noun = if foods.len() == 1 { "food" } else { "foods" };
        let message = match source {
            ParseSource::CloudflareAi => format!("Identified {} {noun} using AI", foods.len()),
            ParseSource::Fallback => {
                format!("Matched {} {noun} from your food history", foods.len())
            }
        };
        Self {
            success: true,
            foods,
            totals: Some(totals),
            message,
            source,
        }
    }

    fn not_found() -> Self {
        Self {
            success: false,
            foods: Vec::new(),
            totals: None,
            message: NO_MATCH_MESSAGE.to_string(),
            source: ParseSource::Fallback,
        }
    }
}

/// Shape the model is asked to return. Values are totals for the full quantity.
#[derive(Debug, Deserialize)]
struct AiFoodReply {
    #[serde(default)]
    foods: Vec<AiFood>,
}

/// Every field but `name` may be missing or `null`.
#[derive(Debug, Deserialize)]
struct AiFood {
    name: String,
    #[serde(default)]
    quantity: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    calories: Option<f64>,
    #[serde(default)]
    protein: Option<f64>,
    #[serde(default)]
    carbs: Option<f64>,
    #[serde(default)]
    fats: Option<f64>,
}

fn default_unit() -> String {
    "serving".to_string()
}

/// Runs the two-stage pipeline. Only a failed corpus read is an error.
pub async fn parse_food_text(
    text: &str,
    user_id: Uuid,
    provider: Option<&dyn CompletionProvider>,
    corpus: &dyn FrequentFoodSource,
) -> Result<ParseOutcome, AppError> {
    if let Some(provider) = provider {
        if let Some(foods) = parse_with_ai(provider, text).await {
            return Ok(ParseOutcome::found(foods, ParseSource::CloudflareAi));
        }
    }

    let rows = corpus
        .top_frequent_foods(user_id, None, FALLBACK_CORPUS_SIZE)
        .await?;
    let foods = match_foods(text, &rows);
    debug!(
        "Fallback matched {} foods against {} history rows",
        foods.len(),
        rows.len()
    );

    if foods.is_empty() {
        Ok(ParseOutcome::not_found())
    } else {
        Ok(ParseOutcome::found(foods, ParseSource::Fallback))
    }
}

/// `None` on any miss: provider error, no JSON, bad JSON, or no foods.
async fn parse_with_ai(provider: &dyn CompletionProvider, text: &str) -> Option<Vec<ParsedFood>> {
    let reply = match provider
        .complete(&food_parse_system(), &food_parse_prompt(text))
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            warn!("AI food parse failed, using fallback: {e}");
            return None;
        }
    };

    let foods = read_ai_reply(&reply);
    if foods.is_none() {
        warn!("AI food parse returned no usable foods, using fallback");
    }
    foods
}

fn read_ai_reply(reply: &str) -> Option<Vec<ParsedFood>> {
    let json = extract_json_object(reply)?;
    let parsed: AiFoodReply = serde_json::from_str(json).ok()?;
    let foods: Vec<ParsedFood> = parsed
        .foods
        .into_iter()
        .filter(|f| !f.name.trim().is_empty())
        .map(normalize_ai_food)
        .collect();
    (!foods.is_empty()).then_some(foods)
}

/// Totals → per-unit values. A missing or non-positive quantity counts as one
/// unit; a missing nutrient counts as zero.
fn normalize_ai_food(food: AiFood) -> ParsedFood {
    let quantity = food
        .quantity
        .filter(|q| q.is_finite() && *q > 0.0)
        .unwrap_or(1.0);
    let per_unit = |total: Option<f64>| round_to(total.unwrap_or(0.0).max(0.0) / quantity, 2);
    let unit = food
        .unit
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map_or_else(default_unit, String::from);

    ParsedFood {
        name: food.name.trim().to_string(),
        quantity,
        unit,
        calories: per_unit(food.calories),
        protein: per_unit(food.protein),
        carbs: per_unit(food.carbs),
        fats: per_unit(food.fats),
        confidence: AI_CONFIDENCE,
    }
}
