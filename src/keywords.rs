/// Vocabulary a passage must mention (case-insensitively) to count as medicinal.
pub(crate) const MEDICINAL_KEYWORDS: [&str; 18] = [
    "medicinal",
    "therapy",
    "treatment",
    "healing",
    "immune",
    "inflammation",
    "infection",
    "cold",
    "cough",
    "fever",
    "pain",
    "antiviral",
    "antibacterial",
    "antifungal",
    "antioxidant",
    "allergy",
    "flu",
    "asthma",
];

/// Plain substring match, so "painful" and "influence" both hit.
pub(crate) fn is_medicinal(passage: &str) -> bool {
    let lower = passage.to_lowercase();
    MEDICINAL_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Keep only medicinal passages, preserving their order.
pub(crate) fn filter_medicinal(passages: Vec<String>) -> Vec<String> {
    passages.into_iter().filter(|p| is_medicinal(p)).collect()
}
