//! Outgoing request construction for the completion API
//!
//! Every call builds a fresh body: the fixed teaching preamble, the prior
//! turns mapped to wire roles, and the new message as the final user entry.
//! Sampling parameters are fixed for the product, not user-tunable.

use serde::Serialize;

use crate::types::ChatTurn;

/// System preamble sent as the leading message of every request
pub const SYSTEM_PROMPT: &str = "\
I am an experienced Processing creative-coding teacher. I focus on:

1. Processing fundamentals:
- Drawing basics (points, lines, shapes)
- Color and style handling
- Animation and interaction design
- Math and physics simulation

2. Creative coding concepts:
- Principles of generative art
- Algorithmic art design
- Interaction patterns
- Building visual effects

3. Programming mindset:
- Logical thinking practice
- Breaking problems down
- Creative solutions
- Tidying and refactoring code

I answer in a friendly, patient voice and:
- Give clear code examples
- Explain the key concepts
- Encourage experimentation
- Suggest practical exercises
- Share project ideas

Let's explore the creative side of Processing together!";

/// Upper bound on generated tokens per reply
pub const MAX_TOKENS: u32 = 2000;

/// Sampling temperature
pub const TEMPERATURE: f32 = 0.7;

/// Nucleus sampling cutoff
pub const TOP_P: f32 = 0.7;

/// One `{role, content}` entry in the outgoing message list
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WireMessage {
    /// Wire role: "system", "user" or "assistant"
    pub role: &'static str,

    /// Message text
    pub content: String,
}

/// Complete request body for both request modes
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,

    /// System preamble, prior turns, then the new message
    pub messages: Vec<WireMessage>,

    /// True for the incremental fragment stream, false for one buffered body
    pub stream: bool,

    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl ChatRequest {
    /// Assemble a request body for `message` with `history` as prior turns.
    ///
    /// History order is preserved, oldest first; the new message always
    /// comes last so the model sees it as the turn to answer.
    pub fn new(model: &str, message: &str, history: &[ChatTurn], stream: bool) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(WireMessage {
            role: "system",
            content: SYSTEM_PROMPT.to_string(),
        });
        for turn in history {
            messages.push(WireMessage {
                role: turn.role.as_api_role(),
                content: turn.content.clone(),
            });
        }
        messages.push(WireMessage {
            role: "user",
            content: message.to_string(),
        });

        ChatRequest {
            model: model.to_string(),
            messages,
            stream,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatTurn;

    #[test]
    fn test_request_leads_with_system_prompt() {
        let request = ChatRequest::new("test-model", "hello", &[], true);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
    }

    #[test]
    fn test_new_message_is_final_user_entry() {
        let history = vec![ChatTurn::user("first"), ChatTurn::ai("reply")];
        let request = ChatRequest::new("test-model", "second question", &history, false);

        let last = request.messages.last().unwrap();
        assert_eq!(last.role, "user");
        assert_eq!(last.content, "second question");
    }

    #[test]
    fn test_history_roles_mapped() {
        let history = vec![ChatTurn::user("q"), ChatTurn::ai("a")];
        let request = ChatRequest::new("test-model", "next", &history, true);

        // system + 2 history turns + new message
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(request.messages[1].content, "q");
        assert_eq!(request.messages[2].role, "assistant");
        assert_eq!(request.messages[2].content, "a");
    }

    #[test]
    fn test_fixed_sampling_parameters() {
        let request = ChatRequest::new("test-model", "hi", &[], false);
        assert_eq!(request.max_tokens, 2000);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.top_p, 0.7);
        assert!(!request.stream);
    }

    #[test]
    fn test_serialized_body_shape() {
        let request = ChatRequest::new("deepseek-ai/DeepSeek-R1-Distill-Qwen-7B", "hi", &[], true);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value["model"],
            "deepseek-ai/DeepSeek-R1-Distill-Qwen-7B"
        );
        assert_eq!(value["stream"], true);
        assert_eq!(value["max_tokens"], 2000);
        assert!(value["messages"].is_array());
        assert_eq!(value["messages"][0]["role"], "system");
    }
}
