//! Field normalizers.
//!
//! Sheet cells arrive in whatever spelling the submitter typed: German or
//! English words, flag emoji, stray units. Each function here maps one raw
//! cell onto the canonical vocabulary stored with an order. None of them
//! fail; input that no dictionary knows is passed through lowercased so a
//! single odd cell never costs the whole row.
//!
//! [`clean_value()`] is the only place that interprets sentinel tokens such
//! as `-` or `—`. Every other normalizer receives an already-cleaned `&str`.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Canonical range token for the long-range battery.
pub const RANGE_MAX: &str = "max";
/// Canonical range token for the standard battery.
pub const RANGE_STANDARD: &str = "standard";
/// Canonical tow hitch token when the trim cannot be ordered with one.
pub const TOW_HITCH_UNAVAILABLE: &str = "nv";

const SENTINELS: &[&str] = &["-", "—", "–"];

const COUNTRIES: &[(&str, &str)] = &[
    ("deutschland", "de"),
    ("germany", "de"),
    ("ger", "de"),
    ("d", "de"),
    ("österreich", "at"),
    ("oesterreich", "at"),
    ("austria", "at"),
    ("aut", "at"),
    ("a", "at"),
    ("schweiz", "ch"),
    ("switzerland", "ch"),
    ("suisse", "ch"),
    ("niederlande", "nl"),
    ("netherlands", "nl"),
    ("nederland", "nl"),
    ("holland", "nl"),
    ("belgien", "be"),
    ("belgium", "be"),
    ("belgique", "be"),
    ("luxemburg", "lu"),
    ("luxembourg", "lu"),
    ("frankreich", "fr"),
    ("france", "fr"),
    ("italien", "it"),
    ("italy", "it"),
    ("italia", "it"),
    ("spanien", "es"),
    ("spain", "es"),
    ("españa", "es"),
    ("dänemark", "dk"),
    ("daenemark", "dk"),
    ("denmark", "dk"),
    ("schweden", "se"),
    ("sweden", "se"),
    ("sverige", "se"),
    ("norwegen", "no"),
    ("norway", "no"),
    ("norge", "no"),
    ("polen", "pl"),
    ("poland", "pl"),
    ("polska", "pl"),
    ("tschechien", "cz"),
    ("czechia", "cz"),
    ("czech republic", "cz"),
];

const COLORS: &[(&str, &str)] = &[
    ("schwarz", "black"),
    ("black", "black"),
    ("solid black", "black"),
    ("diamantschwarz", "black"),
    ("diamond black", "black"),
    ("weiß", "white"),
    ("weiss", "white"),
    ("white", "white"),
    ("perlweiß", "white"),
    ("pearl white", "white"),
    ("grau", "grey"),
    ("grey", "grey"),
    ("gray", "grey"),
    ("stealth grey", "grey"),
    ("silber", "silver"),
    ("silver", "silver"),
    ("quicksilver", "silver"),
    ("midnight silver", "silver"),
    ("blau", "blue"),
    ("blue", "blue"),
    ("tiefblau", "blue"),
    ("deep blue", "blue"),
    ("deep blue metallic", "blue"),
    ("marine blue", "blue"),
    ("rot", "red"),
    ("red", "red"),
    ("ultra red", "red"),
    ("ultrarot", "red"),
    ("multi-coat red", "red"),
];

const DRIVES: &[(&str, &str)] = &[
    ("hinterradantrieb", "rwd"),
    ("heckantrieb", "rwd"),
    ("rwd", "rwd"),
    ("rear-wheel drive", "rwd"),
    ("allrad", "awd"),
    ("allradantrieb", "awd"),
    ("awd", "awd"),
    ("dual motor", "awd"),
    ("dual motor allradantrieb", "awd"),
    ("all-wheel drive", "awd"),
];

const INTERIORS: &[(&str, &str)] = &[
    ("schwarz", "black"),
    ("black", "black"),
    ("all black", "black"),
    ("komplett schwarz", "black"),
    ("weiß", "white"),
    ("weiss", "white"),
    ("white", "white"),
    ("schwarz-weiß", "white"),
    ("schwarz/weiß", "white"),
    ("black and white", "white"),
];

const AUTOPILOTS: &[(&str, &str)] = &[
    ("ap", "ap"),
    ("autopilot", "ap"),
    ("basis", "ap"),
    ("basis-autopilot", "ap"),
    ("standard", "ap"),
    ("nein", "ap"),
    ("no", "ap"),
    ("eap", "eap"),
    ("enhanced autopilot", "eap"),
    ("erweiterter autopilot", "eap"),
    ("fsd", "fsd"),
    ("full self-driving", "fsd"),
    ("volles potenzial für autonomes fahren", "fsd"),
];

const TOW_HITCHES: &[(&str, &str)] = &[
    ("ja", "ja"),
    ("yes", "ja"),
    ("y", "ja"),
    ("x", "ja"),
    ("nein", "nein"),
    ("no", "nein"),
    ("n", "nein"),
    ("nv", TOW_HITCH_UNAVAILABLE),
    ("n.v.", TOW_HITCH_UNAVAILABLE),
    ("n/a", TOW_HITCH_UNAVAILABLE),
    ("nicht verfügbar", TOW_HITCH_UNAVAILABLE),
];

const MODELS: &[(&str, &str)] = &[
    ("lr", "long range"),
    ("maximale reichweite", "long range"),
    ("sr", "standard"),
    ("standard range", "standard"),
    ("p", "performance"),
];

const BATTERIES: &[(&str, &str)] = &[
    ("max", RANGE_MAX),
    ("maximal", RANGE_MAX),
    ("maximale reichweite", RANGE_MAX),
    ("long range", RANGE_MAX),
    ("lr", RANGE_MAX),
    ("große batterie", RANGE_MAX),
    ("standard", RANGE_STANDARD),
    ("standard range", RANGE_STANDARD),
    ("standardreichweite", RANGE_STANDARD),
    ("sr", RANGE_STANDARD),
    ("kleine batterie", RANGE_STANDARD),
];

/// Model 3 trims and whether a tow hitch can be ordered with them.
const TOW_HITCH_AVAILABILITY: &[(&str, bool)] = &[
    ("performance", false),
    ("long range", true),
    ("standard", true),
];

static TWO_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}").expect("static wheel pattern"));

// Two-digit years first: `%Y` would accept "24" as the year 24.
const DATE_FORMATS: &[&str] = &["%d.%m.%y", "%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y"];

/// Resolves empty cells and "no value" sentinels to `None`.
pub fn clean_value(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || SENTINELS.contains(&trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

pub fn parse_number(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Maps a country cell such as `🇩🇪 Deutschland` to a two-letter code.
pub fn normalize_country(value: &str) -> String {
    let (flag_code, rest) = split_flag_prefix(value);
    let lowered = rest.trim().to_lowercase();
    if lowered.is_empty() {
        return flag_code.unwrap_or_else(|| value.trim().to_lowercase());
    }
    lookup(COUNTRIES, &lowered)
        .map(str::to_string)
        .unwrap_or(lowered)
}

pub fn normalize_color(value: &str) -> String {
    translate(COLORS, value)
}

pub fn normalize_drive(value: &str) -> String {
    translate(DRIVES, value)
}

pub fn normalize_interior(value: &str) -> String {
    translate(INTERIORS, value)
}

pub fn normalize_autopilot(value: &str) -> String {
    translate(AUTOPILOTS, value)
}

pub fn normalize_tow_hitch(value: &str) -> String {
    translate(TOW_HITCHES, value)
}

pub fn normalize_model(value: &str) -> String {
    translate(MODELS, value)
}

/// Extracts the rim size, e.g. `19" Gemini` becomes `19`.
pub fn normalize_wheels(value: &str) -> String {
    TWO_DIGITS
        .find(value)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Resolves the range of a Model 3 from its trim and battery cells.
pub fn map_battery_to_range(trim: Option<&str>, battery: Option<&str>) -> Option<String> {
    if trim.is_some_and(|t| t.to_lowercase().contains("performance")) {
        return Some(RANGE_MAX.to_string());
    }
    let lowered = battery?.trim().to_lowercase();
    lookup(BATTERIES, &lowered).map(str::to_string)
}

/// Resolves the tow hitch of a Model 3, forcing the unavailable sentinel for
/// trims that cannot carry one.
pub fn map_tow_hitch(trim: Option<&str>, value: Option<&str>) -> Option<String> {
    if let Some(trim) = trim {
        let lowered = trim.to_lowercase();
        let unavailable = TOW_HITCH_AVAILABILITY
            .iter()
            .any(|(key, available)| !available && lowered.contains(key));
        if unavailable {
            return Some(TOW_HITCH_UNAVAILABLE.to_string());
        }
    }
    value.map(normalize_tow_hitch)
}

/// Range assumed for a new order whose sheet row has none.
pub fn default_range_for_trim(trim: Option<&str>) -> &'static str {
    match trim {
        Some(t) if t.to_lowercase().contains("standard") => RANGE_STANDARD,
        _ => RANGE_MAX,
    }
}

fn translate(dict: &[(&str, &str)], value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    lookup(dict, &lowered)
        .map(str::to_string)
        .unwrap_or(lowered)
}

fn lookup<'a>(dict: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    dict.iter()
        .find(|(token, _)| *token == key)
        .map(|(_, canonical)| *canonical)
}

const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;
const REGIONAL_INDICATOR_Z: u32 = 0x1F1FF;

/// Splits leading regional-indicator glyphs off a cell. A complete flag is
/// also decoded into its lowercase country code.
fn split_flag_prefix(value: &str) -> (Option<String>, &str) {
    let trimmed = value.trim_start();
    let mut letters = String::new();
    let mut end = 0;
    for (idx, ch) in trimmed.char_indices() {
        let code = ch as u32;
        if (REGIONAL_INDICATOR_A..=REGIONAL_INDICATOR_Z).contains(&code) {
            let offset = code - REGIONAL_INDICATOR_A;
            if let Some(letter) = char::from_u32('a' as u32 + offset) {
                letters.push(letter);
            }
            end = idx + ch.len_utf8();
        } else {
            break;
        }
    }
    let code = (letters.len() == 2).then_some(letters);
    (code, &trimmed[end..])
}
