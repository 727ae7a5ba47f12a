//! Keyword fallback for food parsing.
//!
//! Used when AI parsing is unavailable or misses. Each phrase of the input is
//! matched against the user's frequent foods by substring containment, in
//! either direction. The corpus is walked in ranked order and the first hit
//! wins, so with both "rice" and "brown rice" in history the more-used one
//! decides a phrase like "brown rice".

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::nutrition::FrequentFoodRow;
use crate::nutrition::frequent::history_key;
use crate::nutrition::parser::ParsedFood;
use crate::nutrition::round_to;

pub const FALLBACK_CONFIDENCE: f64 = 0.6;
const MIN_RECONCILED_QUANTITY: f64 = 0.01;

/// Stored as Option so a bad pattern degrades to "no split" instead of panicking.
static SEPARATOR_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r",|\n|\+|&|\s+and\s+|\s+with\s+").ok());

static QUANTITY_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Matches: "200g chicken", "2 large eggs", "1.5 cups of rice", "3 slices toast"
    Regex::new(
        r"^(\d+(?:\.\d+)?)\s*(?:(grams?|g|ml|cups?|tbsp|pieces?|slices?|servings?|large|medium|small)\b)?\s*(?:of\s+)?(.*)$",
    )
    .ok()
});

/// Leading quantity and unit pulled off a phrase, plus what is left to match.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseQuantity {
    pub quantity: f64,
    pub unit: &'static str,
    pub food_term: String,
}

/// Lowercased corpus keyed by food name. Duplicate names keep the highest-ranked row.
pub fn build_corpus(rows: &[FrequentFoodRow]) -> Vec<(String, &FrequentFoodRow)> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|row| {
            let key = history_key(&row.food_name);
            (!key.is_empty() && seen.insert(key.clone())).then_some((key, row))
        })
        .collect()
}

pub fn split_phrases(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let parts: Vec<&str> = match SEPARATOR_PATTERN.as_ref() {
        Some(pattern) => pattern.split(&lowered).collect(),
        None => vec![lowered.as_str()],
    };
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

pub fn parse_phrase(phrase: &str) -> PhraseQuantity {
    let phrase = phrase.trim();
    let captures = QUANTITY_PATTERN
        .as_ref()
        .and_then(|pattern| pattern.captures(phrase));

    let Some(caps) = captures else {
        return PhraseQuantity {
            quantity: 1.0,
            unit: infer_unit_from_words(phrase),
            food_term: phrase.to_string(),
        };
    };

    let quantity = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|q| *q > 0.0)
        .unwrap_or(1.0);
    let rest = caps.get(3).map_or("", |m| m.as_str()).trim();
    let unit = match caps.get(2) {
        Some(token) => canonical_unit(token.as_str()).unwrap_or("serving"),
        None => infer_unit_from_words(rest),
    };

    PhraseQuantity {
        quantity,
        unit,
        food_term: rest.to_string(),
    }
}

/// Matches `text` against `rows` (already ranked). Returns an empty list when
/// nothing matches or the history is empty.
pub fn match_foods(text: &str, rows: &[FrequentFoodRow]) -> Vec<ParsedFood> {
    let corpus = build_corpus(rows);
    if corpus.is_empty() {
        return Vec::new();
    }

    let mut foods: Vec<ParsedFood> = split_phrases(text)
        .iter()
        .filter_map(|phrase| {
            let parsed = parse_phrase(phrase);
            let term = if parsed.food_term.is_empty() {
                phrase.as_str()
            } else {
                parsed.food_term.as_str()
            };
            find_match(&corpus, term)
                .map(|(key, row)| to_parsed_food(key, row, parsed.quantity, parsed.unit))
        })
        .collect();

    if foods.is_empty() {
        let whole = text.to_lowercase();
        if let Some((key, row)) = corpus.iter().find(|(key, _)| whole.contains(key.as_str())) {
            foods.push(to_parsed_food(key, row, 1.0, "serving"));
        }
    }

    foods
}

fn find_match<'a>(
    corpus: &'a [(String, &'a FrequentFoodRow)],
    term: &str,
) -> Option<(&'a str, &'a FrequentFoodRow)> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    corpus
        .iter()
        .find(|(key, _)| term.contains(key.as_str()) || key.contains(term))
        .map(|(key, row)| (key.as_str(), *row))
}

fn to_parsed_food(key: &str, row: &FrequentFoodRow, quantity: f64, unit: &str) -> ParsedFood {
    let (quantity, unit) = reconcile_unit(quantity, unit, &row.unit);
    ParsedFood {
        name: title_case(key),
        quantity,
        unit,
        calories: round_to(row.calories, 2),
        protein: round_to(row.protein_g, 2),
        carbs: round_to(row.carbs_g, 2),
        fats: round_to(row.fats_g, 2),
        confidence: FALLBACK_CONFIDENCE,
    }
}

/// Grams typed against a food logged in some other unit are read as multiples
/// of a ~100 g canonical serving, never less than 0.01. A generic "serving"
/// adopts the food's own unit.
pub fn reconcile_unit(quantity: f64, unit: &str, canonical_unit: &str) -> (f64, String) {
    if unit == "g" && !is_gram_unit(canonical_unit) {
        (
            round_to(quantity / 100.0, 2).max(MIN_RECONCILED_QUANTITY),
            canonical_unit.to_string(),
        )
    } else if unit == "serving" {
        (quantity, canonical_unit.to_string())
    } else {
        (quantity, unit.to_string())
    }
}

fn is_gram_unit(unit: &str) -> bool {
    matches!(unit.trim().to_lowercase().as_str(), "g" | "gram" | "grams")
}

fn canonical_unit(token: &str) -> Option<&'static str> {
    match token {
        "g" | "gram" | "grams" => Some("g"),
        "ml" => Some("ml"),
        "cup" | "cups" => Some("cup"),
        "tbsp" => Some("tbsp"),
        "slice" | "slices" => Some("slice"),
        _ => None,
    }
}

fn infer_unit_from_words(phrase: &str) -> &'static str {
    phrase
        .split_whitespace()
        .find_map(canonical_unit)
        .unwrap_or("serving")
}

pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn food(name: &str, unit: &str, calories: f64, use_count: i32) -> FrequentFoodRow {
        FrequentFoodRow {
            user_id: Uuid::nil(),
            meal_type: "lunch".to_string(),
            food_name: name.to_string(),
            unit: unit.to_string(),
            calories,
            protein_g: calories / 10.0,
            carbs_g: 1.0,
            fats_g: 0.5,
            use_count,
            last_used_at: Utc::now() - Duration::days(i64::from(use_count)),
        }
    }

    #[test]
    fn test_split_on_all_separators() {
        let phrases = split_phrases("2 eggs, toast and butter with jam + coffee & milk\nbanana");
        assert_eq!(
            phrases,
            vec!["2 eggs", "toast", "butter", "jam", "coffee", "milk", "banana"]
        );
    }

    #[test]
    fn test_split_does_not_break_words_containing_and() {
        assert_eq!(split_phrases("candy bar"), vec!["candy bar"]);
        assert_eq!(split_phrases("sandwich"), vec!["sandwich"]);
    }

    #[test]
    fn test_parse_phrase_with_grams() {
        let parsed = parse_phrase("200g chicken breast");
        assert_eq!(parsed.quantity, 200.0);
        assert_eq!(parsed.unit, "g");
        assert_eq!(parsed.food_term, "chicken breast");
    }

    #[test]
    fn test_parse_phrase_variants() {
        let cups = parse_phrase("1.5 cups of rice");
        assert_eq!((cups.quantity, cups.unit), (1.5, "cup"));
        assert_eq!(cups.food_term, "rice");

        let eggs = parse_phrase("2 large eggs");
        assert_eq!((eggs.quantity, eggs.unit), (2.0, "serving"));
        assert_eq!(eggs.food_term, "eggs");

        let grams = parse_phrase("150 grams oats");
        assert_eq!((grams.quantity, grams.unit), (150.0, "g"));

        let plain = parse_phrase("banana");
        assert_eq!((plain.quantity, plain.unit), (1.0, "serving"));
        assert_eq!(plain.food_term, "banana");
    }

    #[test]
    fn test_parse_phrase_infers_unit_without_number() {
        let parsed = parse_phrase("a cup of coffee");
        assert_eq!(parsed.quantity, 1.0);
        assert_eq!(parsed.unit, "cup");
    }

    #[test]
    fn test_zero_quantity_defaults_to_one() {
        assert_eq!(parse_phrase("0 apples").quantity, 1.0);
    }

    #[test]
    fn test_grams_reconciled_to_canonical_unit() {
        let rows = vec![food("chicken breast", "serving", 165.0, 4)];
        let foods = match_foods("200g chicken breast", &rows);
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].name, "Chicken Breast");
        assert_eq!(foods[0].quantity, 2.0);
        assert_eq!(foods[0].unit, "serving");
        assert_eq!(foods[0].calories, 165.0);
        assert_eq!(foods[0].confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn test_tiny_gram_amount_keeps_a_positive_quantity() {
        let rows = vec![food("chicken breast", "serving", 165.0, 4)];
        let foods = match_foods("0.4g chicken breast", &rows);
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].unit, "serving");
        assert_eq!(foods[0].quantity, 0.01);
        assert!(foods[0].quantity > 0.0);
    }

    #[test]
    fn test_grams_kept_when_canonical_unit_is_grams() {
        let rows = vec![food("chicken breast", "g", 1.65, 4)];
        let foods = match_foods("200g chicken breast", &rows);
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].quantity, 200.0);
        assert_eq!(foods[0].unit, "g");
        assert_eq!(foods[0].calories, 1.65);
    }

    #[test]
    fn test_generic_serving_adopts_corpus_unit() {
        let rows = vec![food("toast", "slice", 80.0, 2)];
        let foods = match_foods("2 toast", &rows);
        assert_eq!(foods[0].quantity, 2.0);
        assert_eq!(foods[0].unit, "slice");
    }

    #[test]
    fn test_explicit_non_gram_unit_is_kept() {
        let rows = vec![food("rice", "serving", 200.0, 2)];
        let foods = match_foods("1 cup rice", &rows);
        assert_eq!(foods[0].unit, "cup");
        assert_eq!(foods[0].quantity, 1.0);
    }

    #[test]
    fn test_matches_each_phrase() {
        let rows = vec![
            food("greek yogurt", "cup", 130.0, 5),
            food("banana", "serving", 105.0, 3),
        ];
        let foods = match_foods("Greek yogurt with 2 bananas", &rows);
        let names: Vec<_> = foods.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Greek Yogurt", "Banana"]);
        assert_eq!(foods[1].quantity, 2.0);
    }

    #[test]
    fn test_reverse_containment_matches_short_phrase() {
        let rows = vec![food("peanut butter", "tbsp", 95.0, 1)];
        let foods = match_foods("1 tbsp peanut", &rows);
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].name, "Peanut Butter");
        assert_eq!(foods[0].unit, "tbsp");
    }

    #[test]
    fn test_first_ranked_match_wins() {
        let rows = vec![
            food("rice", "serving", 200.0, 9),
            food("brown rice", "serving", 215.0, 3),
        ];
        let foods = match_foods("brown rice", &rows);
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].name, "Rice");
    }

    #[test]
    fn test_duplicate_names_keep_higher_ranked_row() {
        let rows = vec![
            food("Oatmeal", "cup", 150.0, 6),
            food("oatmeal", "serving", 300.0, 2),
        ];
        let corpus = build_corpus(&rows);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].1.unit, "cup");
    }

    #[test]
    fn test_empty_corpus_returns_nothing() {
        assert!(match_foods("2 eggs", &[]).is_empty());
    }

    #[test]
    fn test_unmatched_text_returns_nothing() {
        let rows = vec![food("salmon", "serving", 280.0, 1)];
        assert!(match_foods("pizza", &rows).is_empty());
    }

    #[test]
    fn test_whole_input_scan_when_no_phrase_matches() {
        let rows = vec![food("rice and beans", "bowl", 410.0, 1)];
        // splits into "spicy rice" / "beans please", neither of which matches alone
        let foods = match_foods("spicy rice and beans please", &rows);
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].name, "Rice And Beans");
        assert_eq!(foods[0].quantity, 1.0);
        assert_eq!(foods[0].unit, "bowl");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("chicken  breast"), "Chicken Breast");
        assert_eq!(title_case("oats"), "Oats");
    }
}
