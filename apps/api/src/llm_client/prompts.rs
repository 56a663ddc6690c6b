// Shared prompt fragments. Task-specific templates live in `analysis::prompts`.

/// Appended to every analysis prompt.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Use ONLY facts present in the candidate's resume. \
    Do NOT invent employers, titles, dates, metrics, tools or achievements. \
    If a detail is missing, leave it out rather than guessing.";

/// Appended to every prompt that expects a JSON object back.
pub const JSON_OBJECT_ONLY_INSTRUCTION: &str = "\
    Return ONLY the JSON object. No prose before or after it, no markdown.";
