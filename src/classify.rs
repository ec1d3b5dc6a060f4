//! Keyword-frequency contract type classifier.
//!
//! Scores each category by counting non-overlapping, case-insensitive
//! occurrences of its keywords. The highest score wins; ties go to the
//! category listed first. With no hits at all the result is [`OTHER`].

/// Default number of leading characters scored by the pipeline.
pub const CLASSIFIER_WINDOW_CHARS: usize = 5000;

/// Returned when no keyword matches.
pub const OTHER: &str = "Other";

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "NDA",
        &[
            "non-disclosure",
            "confidentiality agreement",
            "nda",
            "proprietary information",
        ],
    ),
    (
        "Employment Agreement",
        &[
            "employment agreement",
            "employment contract",
            "employee",
            "offer letter",
        ],
    ),
    (
        "Services Agreement",
        &[
            "master services agreement",
            "msa",
            "scope of work",
            "statement of work",
            "consulting agreement",
            "service provider",
        ],
    ),
    (
        "Lease",
        &["lease agreement", "tenant", "landlord", "premises", "rental"],
    ),
    (
        "Purchase Agreement",
        &[
            "purchase agreement",
            "asset purchase",
            "sales contract",
            "buyer",
            "seller",
        ],
    ),
    (
        "Vendor Agreement",
        &["vendor agreement", "supplier", "vendor", "procurement"],
    ),
];

/// Classify contract text into one of the known categories or [`OTHER`].
pub fn classify_contract_type(text: &str) -> &'static str {
    let text = text.to_lowercase();

    let mut best = OTHER;
    let mut best_score = 0usize;
    for &(category, keywords) in CATEGORIES {
        let score: usize = keywords.iter().map(|k| text.matches(k).count()).sum();
        if score > best_score {
            best = category;
            best_score = score;
        }
    }
    best
}

/// Classify only the first `max_chars` characters of `text`.
pub fn classify_prefix(text: &str, max_chars: usize) -> &'static str {
    let end = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    classify_contract_type(&text[..end])
}
