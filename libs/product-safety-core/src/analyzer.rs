//! Ingredient-list analysis: tokenization, flag matching, and verdict
//! derivation.
//!
//! The analyzer never fails: degenerate input (empty text, no flags)
//! degrades to an `unknown`/`good` verdict instead of an error, because the
//! domain wants a best-effort answer rather than a rejection. Garbled OCR
//! text is tolerated by the tokenizer's cleanup step.

use crate::models::{
    AnalysisResult, FlagType, IngredientFlag, OverallStatus, ParsedIngredient,
    ProductAnalysisInput, VeganStatus, VegetarianStatus,
};
use crate::policy::{AnalysisPolicy, MatchMode};
use crate::synonyms;
use tracing::debug;

/// UTF-8 bullet read back through a single-byte decoder, a common artifact
/// in OCR output. Treated as a list separator.
const MANGLED_BULLET: &str = "\u{00e2}\u{20ac}\u{00a2}";

/// Splits free-text ingredient labels into individual ingredient tokens.
///
/// Newlines become separators, the mangled-bullet artifact becomes a comma,
/// and asterisks (footnote markers on organic labels) are dropped. Commas
/// inside parenthetical groups do not split, so
/// `"Natural Flavor (contains milk, soy)"` stays one token. Token order is
/// order of appearance; segments that trim to nothing are discarded.
pub fn parse_ingredient_string(text: &str) -> Vec<String> {
    let prepared = text
        .replace('\n', ", ")
        .replace(MANGLED_BULLET, ",")
        .replace('*', "");

    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    for ch in prepared.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    segments.push(current);

    segments
        .iter()
        .map(|segment| collapse_whitespace(segment))
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Canonical form for display and future deduplication: lowercased, with
/// everything but word characters, whitespace, and hyphens stripped.
/// Matching does not use this form.
pub fn normalize_ingredient_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_' || *c == '-')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Analyzes an ingredient text and its structured declarations against the
/// user's active flags, producing a per-ingredient report and an overall
/// verdict.
///
/// Three passes feed `flagged_count`: one increment per flagged ingredient
/// in the per-ingredient pass, one per ingredient newly flagged by the
/// allergen cross-check, and one per violated diet status. The increments
/// are additive across passes rather than globally deduplicated.
pub fn analyze(
    input: &ProductAnalysisInput,
    user_flags: &[IngredientFlag],
    policy: &AnalysisPolicy,
) -> AnalysisResult {
    let active_flags: Vec<&IngredientFlag> =
        user_flags.iter().filter(|flag| flag.is_active).collect();

    let mut flagged_count: u32 = 0;

    // Pass 1: every token against every active flag, in stored flag order.
    let mut parsed: Vec<ParsedIngredient> = Vec::new();
    for name in parse_ingredient_string(&input.ingredients_text) {
        let name_lower = name.to_lowercase();
        let mut flag_reasons: Vec<String> = Vec::new();
        for flag in &active_flags {
            if matches_flag(&name_lower, flag, policy.match_mode)
                && !flag_reasons.contains(&flag.display_name)
            {
                flag_reasons.push(flag.display_name.clone());
            }
        }

        let is_flagged = !flag_reasons.is_empty();
        if is_flagged {
            // One increment per ingredient, however many flags matched it.
            flagged_count += 1;
        }
        parsed.push(ParsedIngredient {
            normalized_name: normalize_ingredient_name(&name),
            name,
            is_flagged,
            flag_reasons,
        });
    }

    // Pass 2: structured allergen declarations cross-checked against the
    // parsed list. An ingredient flagged here for the first time counts
    // again even though pass 1 already ran; see DESIGN.md for why this
    // double-count is kept.
    for allergen in &input.allergens {
        let allergen_lower = allergen.to_lowercase();
        for flag in active_flags
            .iter()
            .filter(|flag| flag.flag_type == FlagType::Allergen)
        {
            if !allergen_lower.contains(&flag.value.to_lowercase()) {
                continue;
            }
            for ingredient in parsed.iter_mut() {
                if !ingredient.name.to_lowercase().contains(&allergen_lower) {
                    continue;
                }
                if !ingredient.flag_reasons.contains(&flag.display_name) {
                    ingredient.flag_reasons.push(flag.display_name.clone());
                }
                if !ingredient.is_flagged {
                    ingredient.is_flagged = true;
                    flagged_count += 1;
                }
            }
        }
    }

    // Pass 3: product-level diet statuses. These increments are not
    // attached to any ingredient.
    if has_active_flag_value(&active_flags, "vegan")
        && matches!(
            input.vegan_status,
            VeganStatus::NonVegan | VeganStatus::MaybeVegan
        )
    {
        flagged_count += 1;
    }
    if has_active_flag_value(&active_flags, "vegetarian")
        && matches!(
            input.vegetarian_status,
            VegetarianStatus::NonVegetarian | VegetarianStatus::MaybeVegetarian
        )
    {
        flagged_count += 1;
    }

    // An empty or unparsable label cannot be judged, whatever the count says.
    let overall_status = if parsed.is_empty() {
        OverallStatus::Unknown
    } else if flagged_count == 0 {
        OverallStatus::Good
    } else if flagged_count <= policy.caution_threshold {
        OverallStatus::Caution
    } else {
        OverallStatus::Warning
    };

    debug!(
        ingredients = parsed.len(),
        flagged_count,
        status = ?overall_status,
        "ingredient analysis complete"
    );

    AnalysisResult {
        parsed_ingredients: parsed,
        overall_status,
        flagged_count,
    }
}

/// An ingredient matches a flag when its lowercased text contains the
/// lowercased flag value or any registered synonym of it.
fn matches_flag(ingredient_lower: &str, flag: &IngredientFlag, mode: MatchMode) -> bool {
    let value = flag.value.to_lowercase();
    if contains_term(ingredient_lower, &value, mode) {
        return true;
    }
    synonyms::synonyms_for(&value)
        .iter()
        .any(|synonym| contains_term(ingredient_lower, synonym, mode))
}

fn contains_term(haystack: &str, needle: &str, mode: MatchMode) -> bool {
    if needle.is_empty() {
        return false;
    }
    match mode {
        MatchMode::Substring => haystack.contains(needle),
        MatchMode::WholeWord => {
            let mut from = 0;
            while let Some(offset) = haystack[from..].find(needle) {
                let start = from + offset;
                let end = start + needle.len();
                let clear_before = haystack[..start]
                    .chars()
                    .next_back()
                    .map_or(true, |c| !c.is_alphanumeric());
                let clear_after = haystack[end..]
                    .chars()
                    .next()
                    .map_or(true, |c| !c.is_alphanumeric());
                if clear_before && clear_after {
                    return true;
                }
                from = end;
            }
            false
        }
    }
}

fn has_active_flag_value(active_flags: &[&IngredientFlag], value: &str) -> bool {
    active_flags
        .iter()
        .any(|flag| flag.value.eq_ignore_ascii_case(value))
}

fn collapse_whitespace(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(id: &str, flag_type: FlagType, value: &str, display_name: &str) -> IngredientFlag {
        IngredientFlag {
            id: id.to_string(),
            flag_type,
            value: value.to_string(),
            display_name: display_name.to_string(),
            is_active: true,
        }
    }

    fn input_with_text(text: &str) -> ProductAnalysisInput {
        ProductAnalysisInput {
            ingredients_text: text.to_string(),
            ..ProductAnalysisInput::default()
        }
    }

    const CHOCOLATE_LABEL: &str = "Sugar, Cocoa (contains milk, soy lecithin), Vanilla";

    #[test]
    fn parenthetical_commas_do_not_split() {
        let tokens = parse_ingredient_string(CHOCOLATE_LABEL);
        assert_eq!(
            tokens,
            vec![
                "Sugar",
                "Cocoa (contains milk, soy lecithin)",
                "Vanilla"
            ]
        );
    }

    #[test]
    fn newlines_bullets_and_asterisks_are_cleaned_up() {
        let tokens = parse_ingredient_string("Organic Sugar*\nSea Salt \u{00e2}\u{20ac}\u{00a2} Yeast");
        assert_eq!(tokens, vec!["Organic Sugar", "Sea Salt", "Yeast"]);
    }

    #[test]
    fn empty_segments_are_discarded_and_whitespace_collapsed() {
        let tokens = parse_ingredient_string("Sugar,  Cocoa   Butter ,, ");
        assert_eq!(tokens, vec!["Sugar", "Cocoa Butter"]);
    }

    #[test]
    fn unbalanced_parenthesis_swallows_the_rest() {
        // Depth never returns to zero, so later commas stop splitting.
        let tokens = parse_ingredient_string("Sugar (milk, soy");
        assert_eq!(tokens, vec!["Sugar (milk, soy"]);
    }

    #[test]
    fn normalization_strips_punctuation_but_keeps_hyphens() {
        assert_eq!(normalize_ingredient_name("Soy Lecithin*"), "soy lecithin");
        assert_eq!(normalize_ingredient_name("Vitamin B-12!"), "vitamin b-12");
        assert_eq!(
            normalize_ingredient_name("  Cocoa (processed) "),
            "cocoa processed"
        );
    }

    #[test]
    fn no_flags_yields_good_verdict() {
        let result = analyze(
            &input_with_text(CHOCOLATE_LABEL),
            &[],
            &AnalysisPolicy::default(),
        );

        assert_eq!(result.parsed_ingredients.len(), 3);
        assert_eq!(result.flagged_count, 0);
        assert_eq!(result.overall_status, OverallStatus::Good);
        assert!(result.parsed_ingredients.iter().all(|i| !i.is_flagged));
    }

    #[test]
    fn milk_flag_catches_parenthetical_declaration() {
        let flags = vec![flag("f1", FlagType::Allergen, "milk", "Milk")];
        let result = analyze(
            &input_with_text(CHOCOLATE_LABEL),
            &flags,
            &AnalysisPolicy::default(),
        );

        let cocoa = &result.parsed_ingredients[1];
        assert!(cocoa.is_flagged);
        assert_eq!(cocoa.flag_reasons, vec!["Milk"]);
        assert_eq!(result.flagged_count, 1);
        assert_eq!(result.overall_status, OverallStatus::Caution);
    }

    #[test]
    fn inactive_flags_are_invisible() {
        let mut milk = flag("f1", FlagType::Allergen, "milk", "Milk");
        milk.is_active = false;
        let result = analyze(
            &input_with_text(CHOCOLATE_LABEL),
            &[milk],
            &AnalysisPolicy::default(),
        );

        assert_eq!(result.flagged_count, 0);
        assert_eq!(result.overall_status, OverallStatus::Good);
    }

    #[test]
    fn synonyms_expand_the_match() {
        let flags = vec![flag("f1", FlagType::Allergen, "milk", "Milk")];
        let result = analyze(
            &input_with_text("Whey Protein Concentrate, Salt"),
            &flags,
            &AnalysisPolicy::default(),
        );

        assert!(result.parsed_ingredients[0].is_flagged);
        assert_eq!(result.parsed_ingredients[0].flag_reasons, vec!["Milk"]);
        assert!(!result.parsed_ingredients[1].is_flagged);
    }

    #[test]
    fn one_ingredient_with_many_matches_counts_once() {
        let flags = vec![
            flag("f1", FlagType::Allergen, "milk", "Milk"),
            flag("f2", FlagType::Allergen, "soy", "Soy"),
        ];
        let result = analyze(
            &input_with_text("Milk Chocolate (soy lecithin)"),
            &flags,
            &AnalysisPolicy::default(),
        );

        let ingredient = &result.parsed_ingredients[0];
        assert_eq!(ingredient.flag_reasons, vec!["Milk", "Soy"]);
        assert_eq!(result.flagged_count, 1);
        assert_eq!(result.overall_status, OverallStatus::Caution);
    }

    #[test]
    fn duplicate_display_names_are_not_repeated() {
        let flags = vec![
            flag("f1", FlagType::Allergen, "milk", "Dairy"),
            flag("f2", FlagType::Custom, "casein", "Dairy"),
        ];
        let result = analyze(
            &input_with_text("Casein Extract"),
            &flags,
            &AnalysisPolicy::default(),
        );

        assert_eq!(result.parsed_ingredients[0].flag_reasons, vec!["Dairy"]);
    }

    #[test]
    fn verdict_escalates_to_warning_above_threshold() {
        let flags = vec![
            flag("f1", FlagType::Allergen, "milk", "Milk"),
            flag("f2", FlagType::Allergen, "egg", "Eggs"),
            flag("f3", FlagType::Allergen, "peanut", "Peanuts"),
        ];
        let result = analyze(
            &input_with_text("Milk, Egg Yolk, Peanut Oil"),
            &flags,
            &AnalysisPolicy::default(),
        );

        assert_eq!(result.flagged_count, 3);
        assert_eq!(result.overall_status, OverallStatus::Warning);
    }

    #[test]
    fn caution_threshold_is_tunable() {
        let flags = vec![
            flag("f1", FlagType::Allergen, "milk", "Milk"),
            flag("f2", FlagType::Allergen, "egg", "Eggs"),
            flag("f3", FlagType::Allergen, "peanut", "Peanuts"),
        ];
        let policy = AnalysisPolicy {
            caution_threshold: 5,
            ..AnalysisPolicy::default()
        };
        let result = analyze(&input_with_text("Milk, Egg Yolk, Peanut Oil"), &flags, &policy);

        assert_eq!(result.flagged_count, 3);
        assert_eq!(result.overall_status, OverallStatus::Caution);
    }

    #[test]
    fn allergen_cross_check_does_not_double_count_flagged_ingredients() {
        let flags = vec![flag("f1", FlagType::Allergen, "milk", "Milk")];
        let input = ProductAnalysisInput {
            ingredients_text: "Milk Chocolate, Sugar".to_string(),
            allergens: vec!["milk".to_string()],
            ..ProductAnalysisInput::default()
        };
        let result = analyze(&input, &flags, &AnalysisPolicy::default());

        // Pass 1 already flagged the ingredient; the cross-check must not
        // add a second reason or a second count for it.
        assert_eq!(result.parsed_ingredients[0].flag_reasons, vec!["Milk"]);
        assert_eq!(result.flagged_count, 1);
    }

    #[test]
    fn allergen_cross_check_can_flag_what_word_matching_missed() {
        let flags = vec![flag("f1", FlagType::Allergen, "egg", "Eggs")];
        let policy = AnalysisPolicy {
            match_mode: MatchMode::WholeWord,
            ..AnalysisPolicy::default()
        };
        let input = ProductAnalysisInput {
            ingredients_text: "Eggplant Puree".to_string(),
            allergens: vec!["eggplant".to_string()],
            ..ProductAnalysisInput::default()
        };
        let result = analyze(&input, &flags, &policy);

        // Word-boundary matching skips "Eggplant" in pass 1, but the
        // substring-based cross-check still reaches it.
        assert!(result.parsed_ingredients[0].is_flagged);
        assert_eq!(result.flagged_count, 1);
    }

    #[test]
    fn non_allergen_flags_do_not_participate_in_cross_check() {
        let flags = vec![flag("f1", FlagType::Custom, "milk", "No Milk")];
        let policy = AnalysisPolicy {
            match_mode: MatchMode::WholeWord,
            ..AnalysisPolicy::default()
        };
        let input = ProductAnalysisInput {
            ingredients_text: "Buttermilk Powder".to_string(),
            allergens: vec!["buttermilk".to_string()],
            ..ProductAnalysisInput::default()
        };
        let result = analyze(&input, &flags, &policy);

        assert!(!result.parsed_ingredients[0].is_flagged);
        assert_eq!(result.flagged_count, 0);
    }

    #[test]
    fn diet_status_counts_without_touching_ingredients() {
        let flags = vec![flag("f1", FlagType::Diet, "vegan", "Vegan")];
        let input = ProductAnalysisInput {
            ingredients_text: "Sugar".to_string(),
            vegan_status: VeganStatus::NonVegan,
            ..ProductAnalysisInput::default()
        };
        let result = analyze(&input, &flags, &AnalysisPolicy::default());

        assert!(!result.parsed_ingredients[0].is_flagged);
        assert_eq!(result.flagged_count, 1);
        assert_eq!(result.overall_status, OverallStatus::Caution);
    }

    #[test]
    fn maybe_vegetarian_also_violates_a_vegetarian_flag() {
        let flags = vec![flag("f1", FlagType::Diet, "vegetarian", "Vegetarian")];
        let input = ProductAnalysisInput {
            ingredients_text: "Sugar".to_string(),
            vegetarian_status: VegetarianStatus::MaybeVegetarian,
            ..ProductAnalysisInput::default()
        };
        let result = analyze(&input, &flags, &AnalysisPolicy::default());

        assert_eq!(result.flagged_count, 1);
    }

    #[test]
    fn empty_text_is_unknown_even_with_diet_violations() {
        let flags = vec![flag("f1", FlagType::Diet, "vegan", "Vegan")];
        let input = ProductAnalysisInput {
            ingredients_text: String::new(),
            vegan_status: VeganStatus::NonVegan,
            ..ProductAnalysisInput::default()
        };
        let result = analyze(&input, &flags, &AnalysisPolicy::default());

        assert!(result.parsed_ingredients.is_empty());
        assert_eq!(result.flagged_count, 1);
        assert_eq!(result.overall_status, OverallStatus::Unknown);
    }

    #[test]
    fn whole_word_mode_skips_embedded_matches() {
        let flags = vec![flag("f1", FlagType::Allergen, "egg", "Eggs")];
        let substring = analyze(
            &input_with_text("Eggplant, Egg Yolk"),
            &flags,
            &AnalysisPolicy::default(),
        );
        let whole_word = analyze(
            &input_with_text("Eggplant, Egg Yolk"),
            &flags,
            &AnalysisPolicy {
                match_mode: MatchMode::WholeWord,
                ..AnalysisPolicy::default()
            },
        );

        assert_eq!(substring.flagged_count, 2);
        assert_eq!(whole_word.flagged_count, 1);
        assert!(!whole_word.parsed_ingredients[0].is_flagged);
        assert!(whole_word.parsed_ingredients[1].is_flagged);
    }

    #[test]
    fn empty_flag_value_never_matches() {
        let flags = vec![flag("f1", FlagType::Custom, "", "Everything")];
        let result = analyze(
            &input_with_text(CHOCOLATE_LABEL),
            &flags,
            &AnalysisPolicy::default(),
        );

        assert_eq!(result.flagged_count, 0);
        assert_eq!(result.overall_status, OverallStatus::Good);
    }

    #[test]
    fn analysis_is_idempotent() {
        let flags = vec![
            flag("f1", FlagType::Allergen, "milk", "Milk"),
            flag("f2", FlagType::Diet, "vegan", "Vegan"),
        ];
        let input = ProductAnalysisInput {
            ingredients_text: CHOCOLATE_LABEL.to_string(),
            allergens: vec!["milk".to_string()],
            vegan_status: VeganStatus::MaybeVegan,
            ..ProductAnalysisInput::default()
        };

        let first = analyze(&input, &flags, &AnalysisPolicy::default());
        let second = analyze(&input, &flags, &AnalysisPolicy::default());
        assert_eq!(first, second);
    }

    #[test]
    fn adding_flags_never_softens_the_verdict() {
        let milk = flag("f1", FlagType::Allergen, "milk", "Milk");
        let soy = flag("f2", FlagType::Allergen, "soy", "Soy");

        let with_one = analyze(
            &input_with_text(CHOCOLATE_LABEL),
            std::slice::from_ref(&milk),
            &AnalysisPolicy::default(),
        );
        let with_two = analyze(
            &input_with_text(CHOCOLATE_LABEL),
            &[milk, soy],
            &AnalysisPolicy::default(),
        );

        assert!(with_two.flagged_count >= with_one.flagged_count);
    }
}
