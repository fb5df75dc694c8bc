// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Persona shared by every recruiting prompt.
pub const RECRUITER_PERSONA: &str = "You are an experienced technical recruiter and talent \
    assessor. You evaluate candidates fairly, ground every statement in the material \
    provided, and never invent employers, dates, qualifications or skills.";

/// Fragment that asks for a single JSON object in the reply.
pub const JSON_OBJECT_INSTRUCTION: &str = "Reply with exactly one JSON object. \
    Do NOT place any other braces before it. \
    Do NOT use markdown code fences.";
