mod common;

use agent::{
    ConversationState, CurrentNode, GraphError, MemorySaver, NodeSubgraph, Checkpointer,
    SUPERVISOR,
};
use common::{count_call, node_config, CountingTool, ScriptedProvider, SYSTEM_PROMPT};
use futures_util::future::join_all;
use providers::{Message, Role, ToolCall};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tools::ToolRegistry;

fn compile(
    dir: &std::path::Path,
    provider: ScriptedProvider,
    saver: &MemorySaver,
) -> (NodeSubgraph<ScriptedProvider>, CountingTool) {
    let tool = CountingTool::default();
    let tools = ToolRegistry::new().with(tool.clone()).unwrap();
    let graph = NodeSubgraph::compile(
        &node_config(dir, "coder"),
        provider,
        tools,
        Arc::new(saver.clone()),
    )
    .unwrap();
    (graph, tool)
}

#[tokio::test]
async fn tool_round_trip_then_answer() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new([
        Message::ai_with_tool_calls("Counting.", vec![count_call("call_1")]),
        Message::ai("Counted once."),
    ]);
    let (graph, tool) = compile(dir.path(), provider.clone(), &MemorySaver::new());

    let mut iter = graph.iter(ConversationState::new(
        vec![Message::system(SYSTEM_PROMPT), Message::human("count please")],
        10,
    ));
    let mut visited = Vec::new();
    while let Some(node) = iter.next().await {
        visited.push(node.unwrap());
    }
    let state = iter.into_state();

    assert_eq!(
        visited,
        vec![
            CurrentNode::Agent,
            CurrentNode::Tools,
            CurrentNode::Agent,
            CurrentNode::Terminal
        ]
    );
    assert_eq!(provider.calls(), 2);
    assert_eq!(tool.runs.load(Ordering::SeqCst), 1);
    assert_eq!(state.messages.len(), 2 + 3);
    assert_eq!(state.prev_agent, "coder");
    assert_eq!(state.remaining_steps, 7);
    assert_eq!(state.last_message().unwrap().content, "Counted once.");
}

#[tokio::test]
async fn low_budget_never_reaches_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new([Message::ai("unused")]);
    let (graph, _) = compile(dir.path(), provider.clone(), &MemorySaver::new());

    let input = ConversationState::new(vec![Message::human("hi")], 3);
    let state = graph.run(input.clone()).await.unwrap();

    assert_eq!(provider.calls(), 0);
    assert_eq!(state.prev_agent, SUPERVISOR);
    assert_eq!(state.messages, input.messages);
    assert_eq!(state.remaining_steps, 3);
}

#[tokio::test]
async fn system_prompt_stays_single_across_steps() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new([
        Message::ai_with_tool_calls("", vec![count_call("a")]),
        Message::ai_with_tool_calls("", vec![count_call("b")]),
        Message::ai("done"),
    ]);
    let (graph, _) = compile(dir.path(), provider.clone(), &MemorySaver::new());

    let state = graph
        .run(ConversationState::new(vec![Message::human("go")], 20))
        .await
        .unwrap();

    assert_eq!(state.system_message_count(), 1);
    assert_eq!(state.messages[0], Message::system(SYSTEM_PROMPT));
    for conversation in provider.seen() {
        assert_eq!(conversation[0].role, Role::System);
        assert_eq!(
            conversation.iter().filter(|m| m.role == Role::System).count(),
            1
        );
    }
}

#[tokio::test]
async fn tool_messages_answer_the_preceding_calls() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new([
        Message::ai_with_tool_calls("", vec![count_call("x1"), count_call("x2")]),
        Message::ai("done"),
    ]);
    let (graph, tool) = compile(dir.path(), provider, &MemorySaver::new());

    let state = graph
        .run(ConversationState::new(vec![Message::human("go")], 20))
        .await
        .unwrap();

    assert_eq!(tool.runs.load(Ordering::SeqCst), 2);
    let mut pending: Vec<String> = Vec::new();
    for message in &state.messages {
        match message.role {
            Role::Ai => pending = message.tool_calls.iter().map(|c| c.id.clone()).collect(),
            Role::Tool => {
                let id = message.tool_call_id.clone().unwrap();
                assert!(pending.contains(&id), "unexpected tool_call_id {}", id);
            }
            _ => {}
        }
    }
    let answered: Vec<_> = state
        .messages
        .iter()
        .filter_map(|m| m.tool_call_id.as_deref())
        .collect();
    assert_eq!(answered, vec!["x1", "x2"]);
}

#[tokio::test]
async fn sessions_accumulate_across_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let saver = MemorySaver::new();
    let provider = ScriptedProvider::new([Message::ai("first"), Message::ai("second")]);
    let (graph, _) = compile(dir.path(), provider.clone(), &saver);

    let first = graph
        .invoke(ConversationState::new(vec![Message::human("one")], 12))
        .await
        .unwrap();
    assert_eq!(first.messages.len(), 3);
    assert_eq!(first.remaining_steps, 11);

    let second = graph
        .invoke(ConversationState::new(vec![Message::human("two")], 30))
        .await
        .unwrap();

    let contents: Vec<_> = second.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec![SYSTEM_PROMPT, "one", "first", "two", "second"]);
    assert_eq!(second.remaining_steps, 10);
    assert_eq!(provider.seen()[1].len(), 4);
    assert_eq!(saver.load("coder_graph_id").await.unwrap(), Some(second));
}

#[tokio::test]
async fn distinct_sessions_run_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let saver = MemorySaver::new();
    let provider = ScriptedProvider::new((0..4).map(|i| Message::ai(format!("reply {}", i))));
    let (graph, _) = compile(dir.path(), provider.clone(), &saver);
    let graph = Arc::new(graph);

    let handles = (0..4).map(|i| {
        let graph = Arc::clone(&graph);
        tokio::spawn(async move {
            graph
                .invoke_session(
                    &format!("session_{}", i),
                    ConversationState::new(vec![Message::human(format!("hi {}", i))], 10),
                )
                .await
        })
    });

    for joined in join_all(handles).await {
        let state = joined.unwrap().unwrap();
        assert_eq!(state.messages.len(), 3);
    }
    assert_eq!(provider.calls(), 4);
    assert_eq!(
        saver.sessions().await,
        vec!["session_0", "session_1", "session_2", "session_3"]
    );
}

#[tokio::test]
async fn unknown_tool_leaves_checkpoint_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let saver = MemorySaver::new();
    let provider = ScriptedProvider::new([
        Message::ai("fine"),
        Message::ai_with_tool_calls(
            "",
            vec![ToolCall {
                id: "bad".into(),
                name: "format_disk".into(),
                arguments: json!({}),
            }],
        ),
    ]);
    let (graph, _) = compile(dir.path(), provider, &saver);

    let saved = graph
        .invoke(ConversationState::new(vec![Message::human("one")], 12))
        .await
        .unwrap();

    let err = graph
        .invoke(ConversationState::new(vec![Message::human("two")], 12))
        .await
        .unwrap_err();

    assert!(matches!(err, GraphError::ToolNotFound(ref name) if name == "format_disk"));
    assert_eq!(saver.load("coder_graph_id").await.unwrap(), Some(saved));
}

#[tokio::test]
async fn model_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let (graph, _) = compile(dir.path(), ScriptedProvider::default(), &MemorySaver::new());

    let err = graph
        .invoke(ConversationState::new(vec![Message::human("hi")], 10))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::ModelInvocation(_)));
}
