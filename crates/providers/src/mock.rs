//! Scripted provider for tests.
//!
//! Returns a queue of canned responses, one per `complete` call. Downstream
//! crates (agents, workflow) drive their adapter and engine tests with it,
//! so it lives here as a normal module rather than behind `cfg(test)`.

use std::sync::Mutex;

use async_trait::async_trait;
use taskweave_core::error::ProviderError;
use taskweave_core::provider::{ChatRequest, ChatResponse, Provider};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` pops the next response from the front of the
/// queue. Running past the end of the queue returns an API error, which
/// exercises the adapters' infrastructure-failure paths.
pub struct ScriptedProvider {
    responses: Mutex<Vec<ScriptedResponse>>,
    calls: Mutex<Vec<ChatRequest>>,
}

enum ScriptedResponse {
    Text(String),
    Error(ProviderError),
}

impl ScriptedProvider {
    /// A provider that returns the given texts in order.
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|s| ScriptedResponse::Text(s.to_string()))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A provider that returns a single text response.
    pub fn single(text: &str) -> Self {
        Self::new(vec![text])
    }

    /// A provider whose first call fails with the given error.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            responses: Mutex::new(vec![ScriptedResponse::Error(error)]),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Append a canned error after the already-queued responses.
    pub fn then_error(self, error: ProviderError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(ScriptedResponse::Error(error));
        self
    }

    /// How many completion calls were made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The prompt text of the n-th call (all messages concatenated).
    pub fn prompt_text(&self, n: usize) -> Option<String> {
        self.calls.lock().unwrap().get(n).map(|r| {
            r.messages
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ChatRequest) -> std::result::Result<ChatResponse, ProviderError> {
        self.calls.lock().unwrap().push(request);

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "ScriptedProvider: no more responses queued".into(),
            });
        }

        match responses.remove(0) {
            ScriptedResponse::Text(text) => Ok(ChatResponse {
                content: text,
                model: "scripted".into(),
            }),
            ScriptedResponse::Error(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskweave_core::provider::ChatMessage;

    fn request(text: &str) -> ChatRequest {
        ChatRequest {
            model: "scripted".into(),
            messages: vec![ChatMessage::user(text)],
            temperature: 0.0,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn responses_served_in_order() {
        let provider = ScriptedProvider::new(vec!["first", "second"]);
        assert_eq!(provider.complete(request("a")).await.unwrap().content, "first");
        assert_eq!(provider.complete(request("b")).await.unwrap().content, "second");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn exhausted_queue_errors() {
        let provider = ScriptedProvider::single("only");
        provider.complete(request("a")).await.unwrap();
        let err = provider.complete(request("b")).await.unwrap_err();
        assert!(matches!(err, ProviderError::ApiError { .. }));
    }

    #[tokio::test]
    async fn scripted_error_is_returned() {
        let provider = ScriptedProvider::failing(ProviderError::EmptyResponse);
        let err = provider.complete(request("a")).await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
    }

    #[tokio::test]
    async fn prompt_text_records_calls() {
        let provider = ScriptedProvider::single("ok");
        provider.complete(request("what is 2+2")).await.unwrap();
        assert!(provider.prompt_text(0).unwrap().contains("2+2"));
    }
}
