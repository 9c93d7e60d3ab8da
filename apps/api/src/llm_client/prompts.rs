// Shared prompt fragments.
// Each module that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt whose output is shown to a person after the
/// pseudonyms in it are resolved.
pub const PSEUDONYM_INSTRUCTION: &str = "\
    IMPORTANT: Names of people, organizations and places in the text above are \
    placeholders (fictional names, or tokens such as person_1a2b3c4d). \
    Copy every placeholder exactly as written: same spelling, no translation, \
    no abbreviation, no added titles. Never guess the real value behind one.";
