use crate::domain::model::{ChatTurn, CompletionRequest};

pub const ENHANCE_SYSTEM_PROMPT: &str = "You are a prompt engineering expert. Your job is to take a short, vague prompt and transform it into a detailed, well-structured, and descriptive prompt that will produce much better results when given to an AI assistant or used in a GitHub issue.

Rules:
- Keep the original intent intact
- Add context, constraints, expected output format, and edge cases
- Make it actionable and specific
- Return ONLY the enhanced prompt, no explanations or preamble";

pub fn enhance_request(prompt: &str) -> CompletionRequest {
    CompletionRequest {
        messages: vec![ChatTurn::user(format!("Enhance this prompt:\n\n{}", prompt))],
        system: Some(ENHANCE_SYSTEM_PROMPT.to_string()),
    }
}

pub fn ask_request(question: &str) -> CompletionRequest {
    CompletionRequest {
        messages: vec![ChatTurn::user(question)],
        system: None,
    }
}
