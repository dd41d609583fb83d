use crate::graph::models::{ConversationState, Deps, GraphError, NodeRunner, NodeTransition};
use providers::{BaseProvider, Message, Role};
use tracing::debug;

/// The `tools` state
///
/// Runs every tool call on the latest ai message, in order, and answers each
/// with a tool message carrying the matching call id.
#[derive(Debug)]
pub struct ToolStep;

impl<P: BaseProvider> NodeRunner<P> for ToolStep {
    async fn run(
        &self,
        state: &mut ConversationState,
        deps: &Deps<P>,
    ) -> std::result::Result<NodeTransition, GraphError> {
        let last_msg = state.last_message().ok_or_else(|| {
            GraphError::InvalidStateTransition("No messages in history".to_string())
        })?;

        if last_msg.role != Role::Ai || !last_msg.has_tool_calls() {
            return Err(GraphError::InvalidStateTransition(
                "Last message is not an ai message with tool calls".to_string(),
            ));
        }

        let calls = last_msg.tool_calls.clone();
        state.consume_step();

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            debug!(node = %deps.name, tool = %call.name, id = %call.id, "Running tool");
            let result = deps
                .tools
                .call(&call.name, call.arguments)
                .await
                .map_err(|err| GraphError::from_tool(&call.name, err))?;

            results.push(Message::tool(result.to_message_text(), call.id).with_name(&deps.name));
        }

        // Append only once every call has succeeded so a failing call never
        // leaves a partially answered ai message behind.
        state.messages.extend(results);
        Ok(NodeTransition::ToAgent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use providers::ToolCall;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;
    use tools::{Tool, ToolRegistry, ToolResult, ToolSpec};

    struct NoModel;

    impl BaseProvider for NoModel {
        async fn query(&self, _messages: &[Message], _tools: &[ToolSpec]) -> Result<Message> {
            unreachable!("tools never query the model")
        }
    }

    #[derive(Deserialize, JsonSchema)]
    struct EchoInput {
        text: String,
    }

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        type Input = EchoInput;

        fn title(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echo text back"
        }

        async fn run(&self, input: EchoInput) -> ToolResult {
            if input.text.is_empty() {
                ToolResult::error("nothing to echo")
            } else {
                ToolResult::ok(input.text)
            }
        }
    }

    fn deps() -> Deps<NoModel> {
        Deps {
            name: "coder".into(),
            intro_message: String::new(),
            provider: NoModel,
            tools: ToolRegistry::new().with(Echo).unwrap(),
            system_prompt: String::new(),
        }
    }

    fn call(id: &str, name: &str, text: &str) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: name.into(),
            arguments: json!({ "text": text }),
        }
    }

    fn state_with(calls: Vec<ToolCall>) -> ConversationState {
        ConversationState::new(
            vec![Message::human("go"), Message::ai_with_tool_calls("", calls)],
            10,
        )
    }

    #[tokio::test]
    async fn answers_every_call_in_order() {
        let mut state = state_with(vec![call("a", "echo", "one"), call("b", "echo", "")]);

        let transition = ToolStep.run(&mut state, &deps()).await.unwrap();

        assert_eq!(transition, NodeTransition::ToAgent);
        assert_eq!(state.remaining_steps, 9);
        assert_eq!(state.messages.len(), 4);
        assert_eq!(state.messages[2].tool_call_id.as_deref(), Some("a"));
        assert_eq!(state.messages[2].content, "one");
        assert_eq!(state.messages[3].tool_call_id.as_deref(), Some("b"));
        assert_eq!(state.messages[3].content, "Error: nothing to echo");
        assert!(state.messages[2..]
            .iter()
            .all(|message| message.name.as_deref() == Some("coder")));
    }

    #[tokio::test]
    async fn unknown_tool_aborts_without_appending() {
        let mut state = state_with(vec![call("a", "echo", "one"), call("b", "missing", "x")]);

        let err = ToolStep.run(&mut state, &deps()).await.unwrap_err();

        assert!(matches!(err, GraphError::ToolNotFound(name) if name == "missing"));
        assert_eq!(state.messages.len(), 2);
    }

    #[tokio::test]
    async fn bad_arguments_are_execution_errors() {
        let mut state = state_with(vec![ToolCall {
            id: "a".into(),
            name: "echo".into(),
            arguments: json!({ "txt": 1 }),
        }]);

        let err = ToolStep.run(&mut state, &deps()).await.unwrap_err();
        assert!(matches!(err, GraphError::ToolExecution { tool, .. } if tool == "echo"));
    }

    #[tokio::test]
    async fn requires_pending_tool_calls() {
        let mut state = ConversationState::new(vec![Message::ai("done")], 10);
        let err = ToolStep.run(&mut state, &deps()).await.unwrap_err();
        assert!(matches!(err, GraphError::InvalidStateTransition(_)));
    }
}
