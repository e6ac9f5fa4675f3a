// Cross-cutting prompt fragments shared by every LLM caller.
// Feature-specific prompts live next to the feature (see ingest/prompts.rs).

/// System prompt used for all job-analysis calls.
pub const JOB_ANALYST_SYSTEM: &str = "You are a job intelligence assistant.";

/// Appended to every prompt that expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Return ONLY valid JSON. Do NOT include markdown or backticks. \
    Do NOT include any text outside the JSON object.";
