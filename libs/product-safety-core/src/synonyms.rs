//! Static synonym table mapping a canonical flag value to alternate
//! ingredient-label spellings that should also trigger a match.
//!
//! Process-wide read-only configuration, built once on first access. Keys
//! and synonyms are all lowercase; callers lowercase the flag value before
//! lookup.

use std::collections::HashMap;
use std::sync::LazyLock;

static SYNONYMS: LazyLock<HashMap<&'static str, &'static [&'static str]>> = LazyLock::new(|| {
    HashMap::from([
        (
            "milk",
            &[
                "casein",
                "caseinate",
                "whey",
                "lactose",
                "butter",
                "cream",
                "ghee",
                "curd",
                "dairy",
            ][..],
        ),
        (
            "egg",
            &[
                "albumin",
                "albumen",
                "ovalbumin",
                "lysozyme",
                "meringue",
                "mayonnaise",
            ][..],
        ),
        ("peanut", &["groundnut", "arachis"][..]),
        (
            "nut",
            &[
                "almond",
                "hazelnut",
                "walnut",
                "cashew",
                "pecan",
                "pistachio",
                "macadamia",
                "brazil nut",
                "praline",
            ][..],
        ),
        (
            "soy",
            &["soya", "soybean", "edamame", "tofu", "tempeh", "miso"][..],
        ),
        (
            "gluten",
            &[
                "wheat",
                "barley",
                "rye",
                "oat",
                "spelt",
                "semolina",
                "durum",
                "malt",
                "khorasan",
            ][..],
        ),
        ("wheat", &["semolina", "durum", "spelt", "farina"][..]),
        (
            "fish",
            &[
                "anchovy",
                "cod",
                "salmon",
                "tuna",
                "sardine",
                "haddock",
                "pollock",
            ][..],
        ),
        (
            "crustacean",
            &["shrimp", "prawn", "crab", "lobster", "crayfish", "scampi"][..],
        ),
        (
            "mollusc",
            &[
                "mussel", "oyster", "squid", "snail", "clam", "scallop", "octopus",
            ][..],
        ),
        ("sesame", &["tahini", "benne", "gingelly"][..]),
        ("celery", &["celeriac"][..]),
        ("lupin", &["lupine"][..]),
        (
            "sulphite",
            &["sulfite", "sulphur dioxide", "sulfur dioxide", "e220", "e221", "e222", "e223", "e224"][..],
        ),
        (
            "sulfite",
            &["sulphite", "sulphur dioxide", "sulfur dioxide", "e220", "e221", "e222", "e223", "e224"][..],
        ),
        (
            "vegan",
            &[
                "gelatin",
                "gelatine",
                "honey",
                "carmine",
                "cochineal",
                "shellac",
                "lard",
                "tallow",
                "whey",
                "casein",
                "albumin",
            ][..],
        ),
        (
            "vegetarian",
            &[
                "gelatin",
                "gelatine",
                "rennet",
                "lard",
                "tallow",
                "carmine",
                "cochineal",
            ][..],
        ),
    ])
});

/// Alternate spellings registered for a canonical flag value, or an empty
/// slice when none exist. `value` must already be lowercased.
pub fn synonyms_for(value: &str) -> &'static [&'static str] {
    SYNONYMS.get(value).copied().unwrap_or(&[])
}
