//! Function-calling dispatch loop
//!
//! One user turn runs through at most two model round-trips:
//!
//! ```text
//! AwaitingUserInput -> AwaitingModelReply -> Done                      (plain text)
//!                                         -> ExecutingFunction -> Done (chart)
//!                                         -> ExecutingFunction -> AwaitingSummaryReply -> Done
//! ```
//!
//! A failure at any step ends the turn. Messages already appended to the
//! session stay there.

use super::session::Session;
use crate::config::ChatConfig;
use crate::engine::{ChartArtifact, IndicatorEngine};
use crate::error::Result;
use crate::tools::{FunctionOutput, FunctionRegistry};
use finchat_llm::{CompletionRequest, FunctionCallMode, LLMProvider, Message};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Position of a turn in the dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingUserInput,
    AwaitingModelReply,
    ExecutingFunction,
    AwaitingSummaryReply,
    Done,
}

/// What a completed turn surfaces to the user
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Model reply text
    Text(String),
    /// Chart written to disk
    Chart(ChartArtifact),
}

/// Drives user turns through the model and the registered functions
///
/// Holds only shared, immutable state; the session is borrowed per turn.
pub struct Dispatcher {
    provider: Arc<dyn LLMProvider>,
    engine: IndicatorEngine,
    registry: FunctionRegistry,
    model: String,
    max_tokens: usize,
    temperature: Option<f32>,
    system_prompt: Option<String>,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn LLMProvider>, engine: IndicatorEngine, config: &ChatConfig) -> Self {
        Self {
            provider,
            engine,
            registry: FunctionRegistry::new(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
        }
    }

    /// Run one user turn against `session`
    pub async fn handle_turn(&self, session: &mut Session, input: &str) -> Result<TurnOutcome> {
        let mut state = TurnState::AwaitingUserInput;

        session.push(Message::user(input));
        advance(&mut state, TurnState::AwaitingModelReply);

        info!(
            model = %self.model,
            messages = session.len(),
            function_count = self.registry.len(),
            "Sending request to LLM"
        );
        let response = self
            .provider
            .complete(self.request(session, true))
            .await
            .inspect_err(|e| warn!(error = %e, "Model request failed"))?;
        info!(
            stop_reason = ?response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "LLM response received"
        );

        let reply = response.message;
        let Some(call) = reply.function_call.clone() else {
            let text = reply.content.unwrap_or_default();
            let preview: String = text.chars().take(200).collect();
            debug!(response_preview = %preview, "Plain text reply");

            session.push(Message::assistant(text.clone()));
            advance(&mut state, TurnState::Done);
            return Ok(TurnOutcome::Text(text));
        };

        advance(&mut state, TurnState::ExecutingFunction);
        info!(function = %call.name, arguments = %call.arguments, "Model requested function call");

        let function = self
            .registry
            .resolve(&call.name, &call.arguments)
            .inspect_err(|e| warn!(function = %call.name, error = %e, "Function call rejected"))?;
        debug!(function = function.name(), ticker = function.ticker(), "Running function");
        let output = function
            .invoke(&self.engine)
            .await
            .inspect_err(|e| warn!(function = function.name(), error = %e, "Function failed"))?;

        let result = match output {
            FunctionOutput::Chart(artifact) => {
                info!(path = %artifact.path.display(), "Chart rendered");
                advance(&mut state, TurnState::Done);
                return Ok(TurnOutcome::Chart(artifact));
            }
            FunctionOutput::Text(result) => result,
        };
        debug!(function = function.name(), result = %result, "Function completed");

        session.push(reply);
        session.push(Message::function_result(function.name(), result));
        advance(&mut state, TurnState::AwaitingSummaryReply);

        info!(messages = session.len(), "Requesting summary from LLM");
        let summary = self
            .provider
            .complete(self.request(session, false))
            .await
            .inspect_err(|e| warn!(error = %e, "Summary request failed"))?;

        let text = summary.message.content.unwrap_or_default();
        session.push(Message::assistant(text.clone()));
        advance(&mut state, TurnState::Done);

        Ok(TurnOutcome::Text(text))
    }

    /// Request over the whole session, advertising functions when asked
    fn request(&self, session: &Session, with_functions: bool) -> CompletionRequest {
        let builder = CompletionRequest::builder(&self.model)
            .messages(session.messages().to_vec())
            .system_opt(self.system_prompt.clone())
            .max_tokens(self.max_tokens)
            .temperature_opt(self.temperature);

        if with_functions {
            builder
                .functions(self.registry.specs().to_vec(), FunctionCallMode::Auto)
                .build()
        } else {
            builder.build()
        }
    }
}

fn advance(state: &mut TurnState, next: TurnState) {
    debug!(from = ?*state, to = ?next, "Turn state transition");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataProvider;
    use async_trait::async_trait;
    use finchat_llm::{CompletionResponse, LLMError};

    /// Provider that fails every call
    struct Unreachable;

    #[async_trait]
    impl LLMProvider for Unreachable {
        async fn complete(&self, _request: CompletionRequest) -> finchat_llm::Result<CompletionResponse> {
            Err(LLMError::RequestFailed("unreachable".to_string()))
        }

        fn name(&self) -> &'static str {
            "unreachable"
        }
    }

    fn dispatcher(config: &ChatConfig) -> Dispatcher {
        let engine = IndicatorEngine::new(Arc::new(MockMarketDataProvider::new()), "stock.svg");
        Dispatcher::new(Arc::new(Unreachable), engine, config)
    }

    #[test]
    fn test_first_request_advertises_functions() {
        let config = ChatConfig::builder()
            .system_prompt("You are a stock assistant.")
            .temperature(0.0)
            .build()
            .unwrap();
        let dispatcher = dispatcher(&config);
        let mut session = Session::new();
        session.push(Message::user("What is the RSI of AAPL?"));

        let request = dispatcher.request(&session, true);
        assert_eq!(request.model, "gpt-3.5-turbo-0613");
        assert_eq!(request.messages, session.messages());
        assert_eq!(request.system.as_deref(), Some("You are a stock assistant."));
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.functions.as_ref().map(Vec::len), Some(6));
        assert_eq!(request.function_call, Some(FunctionCallMode::Auto));
    }

    #[test]
    fn test_summary_request_has_no_functions() {
        let dispatcher = dispatcher(&ChatConfig::default());
        let request = dispatcher.request(&Session::new(), false);

        assert!(!request.has_functions());
        assert!(request.function_call.is_none());
        assert!(request.system.is_none());
        assert_eq!(request.max_tokens, 1024);
    }

    #[tokio::test]
    async fn test_model_failure_keeps_user_message() {
        let dispatcher = dispatcher(&ChatConfig::default());
        let mut session = Session::new();

        let err = dispatcher.handle_turn(&mut session, "hello").await.unwrap_err();

        assert!(err.to_string().contains("unreachable"));
        assert_eq!(session.messages(), &[Message::user("hello")]);
    }
}
