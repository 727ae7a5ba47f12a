// Food parsing prompt templates.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub fn food_parse_system() -> String {
    format!("{JSON_ONLY_SYSTEM} {FOOD_PARSE_INSTRUCTIONS}")
}

const FOOD_PARSE_INSTRUCTIONS: &str = "\
You are a nutrition assistant that turns a free-text meal description into structured data. \
Identify every distinct food and estimate its nutrition. \
Values must describe the FULL quantity described, not a single unit. \
Return ONLY a JSON object of this exact shape: \
{\"foods\": [{\"name\": string, \"quantity\": number, \"unit\": string, \
\"calories\": number, \"protein\": number, \"carbs\": number, \"fats\": number}]}. \
protein, carbs and fats are grams. If no food can be identified, return {\"foods\": []}.";

pub const FOOD_PARSE_PROMPT: &str = "Parse this food description:\n\n{text}";

pub fn food_parse_prompt(text: &str) -> String {
    FOOD_PARSE_PROMPT.replace("{text}", text)
}
