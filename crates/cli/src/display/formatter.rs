use bsp_console_core::{BuildEvent, EventResult};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;

/// Renders an event as one human-readable line.
///
/// File positions are shown one-based, the way compilers print them.
pub fn format_event<Id: Display>(build_id: &Id, event: &BuildEvent<Id>) -> String {
    match event {
        BuildEvent::Start(start) => {
            let mut line = format!("[{build_id}] ▶ {}", start.title);
            if !start.message.is_empty() {
                line.push_str(&format!(" - {}", start.message));
            }
            line
        }
        BuildEvent::Progress(progress) => format!(
            "[{build_id}] {} (in {}): {}",
            progress.id, progress.parent_id, progress.message
        ),
        BuildEvent::Finish(finish) => {
            let mark = match finish.result {
                EventResult::Success => "✔",
                EventResult::Failure => "✘",
                EventResult::Skipped => "⏭",
            };
            format!(
                "[{build_id}] {mark} {} {}: {}",
                finish.id,
                finish.result.as_str(),
                finish.message
            )
        }
        BuildEvent::FileMessage(diagnostic) => format!(
            "[{build_id}] {} {} {}:{}:{}: {}",
            diagnostic.severity.as_str(),
            diagnostic.id,
            diagnostic.path.display(),
            diagnostic.line + 1,
            diagnostic.column + 1,
            diagnostic.message.trim_end_matches('\n')
        ),
        BuildEvent::Output(output) => {
            let text = output.message.trim_end_matches('\n');
            match &output.id {
                Some(id) => format!("[{build_id}] {id} | {text}"),
                None => format!("[{build_id}] | {text}"),
            }
        }
    }
}

/// Renders an event as a single JSON object with the root task id added as `build_id`.
pub fn format_event_json<Id: Display + Serialize>(
    build_id: &Id,
    event: &BuildEvent<Id>,
) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(event)?;
    if let Some(object) = value.as_object_mut() {
        object.insert("build_id".to_string(), Value::String(build_id.to_string()));
    }
    serde_json::to_string(&value)
}
