// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it and composes these where needed.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to any prompt that asks for scores, to counter score inflation.
pub const REALISTIC_SCORING_INSTRUCTION: &str = "IMPORTANT: Be realistic with scoring. \
    Most resumes will score 30-80%. Perfect matches (90%+) are very rare.";
