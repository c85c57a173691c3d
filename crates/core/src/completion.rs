//! Tool-calling completion rounds
//!
//! A round validates every pending call before running any callback, so a
//! malformed call aborts the round with no side effects.

use crate::{Error, Object, Result, Tool, ToolCalling, ToolResult};

/// Run one completion round for `response`.
///
/// Returns the follow-up request, or `None` when nothing is pending or no
/// callback produced a result. Calls naming undeclared tools are skipped.
/// The assistant message records only the calls that got a result, so every
/// recorded call id is answered by a tool message.
pub async fn complete<R: ToolCalling>(request: &R, response: &R::Response) -> Result<Option<R>> {
    let calls = request.tool_calls(response);
    if calls.is_empty() {
        return Ok(None);
    }

    let mut pending = Vec::with_capacity(calls.len());
    for call in &calls {
        let Some(tool) = request.tools().iter().find(|t| t.name == call.name) else {
            tracing::warn!("skipping call {} to undeclared tool '{}'", call.id, call.name);
            continue;
        };
        let args = call.parse_arguments()?;
        let missing = tool.missing(&args);
        if !missing.is_empty() {
            return Err(Error::MissingRequiredToolArguments {
                tool: tool.name.clone(),
                missing,
            });
        }
        pending.push((call, tool, args));
    }

    let mut answered = Vec::with_capacity(pending.len());
    let mut results = Vec::with_capacity(pending.len());
    for (call, tool, args) in pending {
        tracing::debug!("calling tool '{}' for call {}", tool.name, call.id);
        if let Some(output) = invoke(tool, args).await? {
            answered.push(call.clone());
            results.push(ToolResult::new(call.id.clone(), output));
        }
    }

    if results.is_empty() {
        tracing::debug!("no tool produced a result, ending the exchange");
        return Ok(None);
    }

    let mut messages = request.messages().to_vec();
    messages.push(request.assistant_message(response, &answered));
    messages.extend(results.into_iter().map(|r| request.tool_message(r)));
    Ok(Some(request.with_messages(messages)))
}

/// Run a callback to completion on its own task.
///
/// Dropping the caller does not interrupt the callback.
async fn invoke(tool: &Tool, args: Object) -> Result<Option<String>> {
    let handle = tokio::spawn(tool.call(args));
    match handle.await {
        Ok(output) => output.map_err(|e| match e.downcast::<Error>() {
            Ok(err) => err,
            Err(e) => Error::Tool(e),
        }),
        Err(join) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
        Err(join) => Err(Error::Tool(join.into())),
    }
}
