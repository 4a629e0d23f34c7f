//! Raw model identifier normalization.
//!
//! Providers report the same model family under many spellings:
//! `meta-llama/Meta-Llama-3.1-70B-Instruct`, `hf:llama3.1-70b-instruct`,
//! `gpt-4o-2024-08-06`, `chatgpt-4o-latest`. [`normalize`] folds them into one
//! logical key. The steps run in a fixed order; reordering them changes the
//! keys produced.

use std::sync::LazyLock;

use regex::Regex;

static LETTER_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z])([0-9])").expect("letter/digit regex must compile")
});

static DOT_ZERO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)\.0\b").expect("version suffix regex must compile")
});

static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[- ][0-9]{2}[- ][0-9]{2}").expect("month/day regex must compile")
});

static DATE_RUN_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"\b[0-9]{4}\b").expect("4-digit date regex must compile"),
        Regex::new(r"\b[0-9]{6}\b").expect("6-digit date regex must compile"),
        Regex::new(r"\b[0-9]{8}\b").expect("8-digit date regex must compile"),
    ]
});

// `-experimental` must precede `-exp` or the alternation leaves "erimental" behind.
static SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-latest|-experimental|-exp|-with-apps|-preview|-distill")
        .expect("suffix regex must compile")
});

static INFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"api|lora|image|audio|chat").expect("infix regex must compile")
});

static HYPHEN_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("hyphen run regex must compile"));

const DISTILL: &str = "distill";

/// Map a raw provider model identifier to its logical family key.
///
/// Total and deterministic. The result may be empty or non-ASCII; use
/// [`normalize_logical`] to get only names eligible for the catalog.
pub fn normalize(raw: &str) -> String {
    let mut s = raw.to_lowercase();

    // Namespace and vendor prefixes: `hf:`, `meta-llama/`, `accounts/x/models/`.
    if let Some(idx) = s.rfind(':') {
        s = s[idx + 1..].to_string();
    }
    if let Some(idx) = s.rfind('/') {
        s = s[idx + 1..].to_string();
    }

    s = s.replace(['_', ' '], "-");
    s = LETTER_DIGIT_RE.replace_all(&s, "${1}-${2}").into_owned();
    s = DOT_ZERO_RE.replace_all(&s, "${1}").into_owned();

    s = MONTH_DAY_RE.replace_all(&s, "").into_owned();
    for re in DATE_RUN_RES.iter() {
        s = re.replace_all(&s, "").into_owned();
    }

    if let Some(idx) = s.find(DISTILL) {
        s.truncate(idx + DISTILL.len());
    }

    s = SUFFIX_RE.replace_all(&s, "").into_owned();
    s = INFIX_RE.replace_all(&s, "").into_owned();

    s = HYPHEN_RUN_RE.replace_all(&s, "-").into_owned();
    s.trim_matches(|c| c == '-' || c == ' ').to_string()
}

/// Normalize and keep only names that can enter the catalog.
///
/// Returns `None` for an empty result or one containing non-ASCII characters.
pub fn normalize_logical(raw: &str) -> Option<String> {
    let name = normalize(raw);
    if name.is_empty() || !name.is_ascii() {
        return None;
    }
    Some(name)
}
