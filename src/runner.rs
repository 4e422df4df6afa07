//! Streaming execution of one conversation turn.
//!
//! The runner feeds the triage agent and the full history into the chat
//! completions API and drives the turn to completion: text deltas are
//! forwarded to the caller the moment they arrive, tool calls are dispatched
//! locally, and a `transfer_to_*` pseudo-tool call switches the active agent
//! for the remainder of the turn. Which branch the model takes is entirely
//! its own inference; the runner only interprets the calls it gets back.

use std::sync::Arc;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCallChunk,
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionToolType,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, FinishReason, FunctionCall,
    },
};
use futures::StreamExt;
use serde_json::json;

use crate::{
    agent::Agent,
    config::GameConfig,
    error::AIError,
    session::{ChatMessage, Role},
};

/// Hard ceiling on model round-trips within one turn. A handoff plus a few
/// tool calls fits comfortably; anything beyond is a runaway loop.
pub const MAX_TURN_STEPS: usize = 8;

/// Events emitted while a turn is being processed.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// One incremental unit of model-generated text, in order.
    Delta(String),
    /// The turn finished; payload is the full concatenated response.
    Completed(String),
    /// The turn failed; payload is the user-visible error text.
    Failed(String),
}

/// A tool call re-assembled from stream chunks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// Fold one streamed tool-call chunk into the pending set.
///
/// Chunks arrive indexed and fragmented: the first fragment for an index
/// carries the id and name, later ones append argument text.
pub fn accumulate_tool_call(
    pending: &mut Vec<PendingToolCall>,
    chunk: ChatCompletionMessageToolCallChunk,
) {
    let index = chunk.index as usize;
    if pending.len() <= index {
        pending.resize_with(index + 1, PendingToolCall::default);
    }
    let slot = &mut pending[index];
    if let Some(id) = chunk.id {
        slot.id.push_str(&id);
    }
    if let Some(function) = chunk.function {
        if let Some(name) = function.name {
            slot.name.push_str(&name);
        }
        if let Some(arguments) = function.arguments {
            slot.arguments.push_str(&arguments);
        }
    }
}

/// Run one turn: stream the response for `history` starting from the triage
/// agent, forwarding text deltas through `events` as they arrive.
///
/// Returns the concatenated assistant text for the turn. Errors are returned
/// to the caller, which owns the turn boundary; nothing is retried here.
pub async fn run_streamed(
    client: &Client<OpenAIConfig>,
    config: &GameConfig,
    entry: Arc<Agent>,
    history: &[ChatMessage],
    events: &tokio::sync::mpsc::UnboundedSender<TurnEvent>,
) -> Result<String, AIError> {
    let mut active = entry;
    let mut transcript: Vec<ChatCompletionRequestMessage> = history
        .iter()
        .map(to_request_message)
        .collect::<Result<_, _>>()?;
    let mut full_text = String::new();

    for _ in 0..MAX_TURN_STEPS {
        let request = build_request(&active, &transcript, config)?;
        let mut stream = client.chat().create_stream(request).await?;

        let mut step_text = String::new();
        let mut pending: Vec<PendingToolCall> = Vec::new();
        let mut finish: Option<FinishReason> = None;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let Some(choice) = chunk.choices.into_iter().next() else {
                continue;
            };
            if let Some(text) = choice.delta.content {
                if !text.is_empty() {
                    // Forward immediately; the UI renders deltas as they come.
                    let _ = events.send(TurnEvent::Delta(text.clone()));
                    step_text.push_str(&text);
                }
            }
            if let Some(chunks) = choice.delta.tool_calls {
                for tool_chunk in chunks {
                    accumulate_tool_call(&mut pending, tool_chunk);
                }
            }
            if let Some(reason) = choice.finish_reason {
                finish = Some(reason);
            }
        }

        full_text.push_str(&step_text);

        let calls = finalize_calls(pending)?;
        if calls.is_empty() || finish != Some(FinishReason::ToolCalls) {
            return Ok(full_text);
        }

        log::debug!(
            "agent {} requested {} tool call(s)",
            active.name,
            calls.len()
        );
        transcript.push(assistant_with_calls(&step_text, &calls)?);

        // Handoff short-circuit: the first transfer call wins; remaining
        // calls in the batch are acknowledged but not executed, since the
        // new agent owns the rest of the turn.
        let handoff = calls.iter().find_map(|call| {
            active
                .find_handoff(&call.name)
                .map(|target| (call.id.clone(), Arc::clone(target)))
        });
        if let Some((handoff_id, target)) = handoff {
            log::info!("handoff: {} -> {}", active.name, target.name);

            for call in &calls {
                let ack = if call.id == handoff_id {
                    json!({ "handoff": target.name, "ack": true })
                } else {
                    json!({ "skipped": "superseded by handoff" })
                };
                transcript.push(tool_message(&ack.to_string(), &call.id)?);
            }

            active = target;
            continue;
        }

        // Regular tool calls: dispatch locally, feed results back, continue
        // the same agent.
        for call in &calls {
            let output = match active.find_tool(&call.name) {
                Some(tool) => {
                    let args = serde_json::from_str(&call.arguments)
                        .unwrap_or_else(|_| json!({}));
                    let result = tool.dispatch(&args);
                    log::debug!("tool {}({}) -> {}", call.name, call.arguments, result);
                    result
                }
                // The model named a tool this agent does not own. Tell it so
                // and let it recover rather than aborting the turn.
                None => json!({ "error": format!("unknown tool: {}", call.name) }).to_string(),
            };
            transcript.push(tool_message(&output, &call.id)?);
        }
    }

    Err(AIError::MaxStepsReached(MAX_TURN_STEPS))
}

fn build_request(
    active: &Agent,
    transcript: &[ChatCompletionRequestMessage],
    config: &GameConfig,
) -> Result<CreateChatCompletionRequest, AIError> {
    let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(transcript.len() + 1);
    messages.push(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(active.instructions)
            .build()?
            .into(),
    );
    messages.extend(transcript.iter().cloned());

    let mut request = CreateChatCompletionRequestArgs::default();
    request
        .model(config.model.as_str())
        .messages(messages)
        .stream(true);

    let declarations = active.declarations();
    if !declarations.is_empty() {
        request.tools(declarations);
    }

    Ok(request.build()?)
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, AIError> {
    Ok(match message.role {
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
    })
}

/// Drop empty slots and insist on complete calls; a call without an id or
/// name cannot be answered and would wedge the protocol.
fn finalize_calls(pending: Vec<PendingToolCall>) -> Result<Vec<PendingToolCall>, AIError> {
    let mut calls = Vec::with_capacity(pending.len());
    for call in pending {
        if call.id.is_empty() && call.name.is_empty() && call.arguments.is_empty() {
            continue;
        }
        if call.id.is_empty() || call.name.is_empty() {
            return Err(AIError::MalformedToolCall(format!("{call:?}")));
        }
        calls.push(call);
    }
    Ok(calls)
}

fn assistant_with_calls(
    text: &str,
    calls: &[PendingToolCall],
) -> Result<ChatCompletionRequestMessage, AIError> {
    let tool_calls: Vec<ChatCompletionMessageToolCall> = calls
        .iter()
        .map(|call| ChatCompletionMessageToolCall {
            id: call.id.clone(),
            r#type: ChatCompletionToolType::Function,
            function: FunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        })
        .collect();

    let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
    if !text.is_empty() {
        builder.content(text);
    }
    Ok(builder.tool_calls(tool_calls).build()?.into())
}

fn tool_message(content: &str, call_id: &str) -> Result<ChatCompletionRequestMessage, AIError> {
    Ok(ChatCompletionRequestToolMessageArgs::default()
        .content(content)
        .tool_call_id(call_id)
        .build()?
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::types::FunctionCallStream;

    fn chunk(
        index: u32,
        id: Option<&str>,
        name: Option<&str>,
        arguments: Option<&str>,
    ) -> ChatCompletionMessageToolCallChunk {
        ChatCompletionMessageToolCallChunk {
            index,
            id: id.map(str::to_string),
            r#type: None,
            function: Some(FunctionCallStream {
                name: name.map(str::to_string),
                arguments: arguments.map(str::to_string),
            }),
        }
    }

    #[test]
    fn fragmented_arguments_are_reassembled() {
        let mut pending = Vec::new();
        accumulate_tool_call(&mut pending, chunk(0, Some("call_1"), Some("roll_dice"), None));
        accumulate_tool_call(&mut pending, chunk(0, None, None, Some("{\"sid")));
        accumulate_tool_call(&mut pending, chunk(0, None, None, Some("es\": 20}")));

        let calls = finalize_calls(pending).unwrap();
        assert_eq!(
            calls,
            vec![PendingToolCall {
                id: "call_1".to_string(),
                name: "roll_dice".to_string(),
                arguments: "{\"sides\": 20}".to_string(),
            }]
        );
    }

    #[test]
    fn parallel_calls_keep_their_indices() {
        let mut pending = Vec::new();
        accumulate_tool_call(&mut pending, chunk(0, Some("a"), Some("roll_dice"), Some("{}")));
        accumulate_tool_call(
            &mut pending,
            chunk(1, Some("b"), Some("generate_event"), Some("{\"context\":\"forest\"}")),
        );
        accumulate_tool_call(&mut pending, chunk(0, None, None, None));

        let calls = finalize_calls(pending).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "roll_dice");
        assert_eq!(calls[1].name, "generate_event");
    }

    #[test]
    fn nameless_call_is_rejected() {
        let mut pending = Vec::new();
        accumulate_tool_call(&mut pending, chunk(0, Some("call_x"), None, Some("{}")));
        assert!(matches!(
            finalize_calls(pending),
            Err(AIError::MalformedToolCall(_))
        ));
    }

    #[test]
    fn empty_slots_are_dropped() {
        let pending = vec![PendingToolCall::default()];
        assert!(finalize_calls(pending).unwrap().is_empty());
    }
}
