//! Integration tests for the task console state machine

use bsp_console_core::{
    ActionKind, BuildEvent, ConsoleKind, EventResult, EventSink, MessageKind, RecordingSink,
    TaskActions, TaskConsole, TaskId,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn id(value: &str) -> TaskId {
    TaskId::from(value)
}

fn build_console() -> (Arc<RecordingSink<TaskId>>, TaskConsole) {
    let recorder = Arc::new(RecordingSink::new());
    let sink: Arc<dyn EventSink<TaskId>> = recorder.clone();
    (recorder, TaskConsole::build(sink, "/workspace"))
}

fn sync_console(reloads: Arc<AtomicUsize>) -> (Arc<RecordingSink<TaskId>>, TaskConsole) {
    let recorder = Arc::new(RecordingSink::new());
    let sink: Arc<dyn EventSink<TaskId>> = recorder.clone();
    let console = TaskConsole::sync(sink, "/workspace", move || {
        reloads.fetch_add(1, Ordering::SeqCst);
    });
    (recorder, console)
}

fn start(console: &TaskConsole, task: &str) {
    console.start_task(id(task), "Build", "Building", TaskActions::new());
}

fn outputs(recorder: &RecordingSink<TaskId>) -> Vec<(Option<TaskId>, String)> {
    recorder
        .events()
        .into_iter()
        .filter_map(|(_, event)| match event {
            BuildEvent::Output(output) => Some((output.id, output.message)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_start_task_twice_emits_one_start_event() {
    let (recorder, console) = build_console();
    start(&console, "T1");
    start(&console, "T1");

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    let (build_id, BuildEvent::Start(event)) = &events[0] else {
        panic!("expected a start event");
    };
    assert_eq!(build_id, &id("T1"));
    assert_eq!(event.title, "BSP: Build");
    assert_eq!(event.message, "Building");
    assert_eq!(event.base_path, PathBuf::from("/workspace"));
    assert!(event.activate_tool_window);
    assert!(console.has_tasks_in_progress());
}

#[test]
fn test_round_trip_task_with_subtask() {
    let (recorder, console) = build_console();
    start(&console, "T1");
    console.start_subtask(id("T1"), id("S1"), "Compiling");
    console.finish_subtask(&id("S1"), "Compiled", EventResult::Success);
    console.finish_task(&id("T1"), "Done", EventResult::Success);

    let events = recorder.events();
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|(build_id, _)| build_id == &id("T1")));
    let kinds: Vec<_> = events.iter().map(|(_, event)| event.kind_name()).collect();
    assert_eq!(kinds, vec!["start", "progress", "finish", "finish"]);

    let BuildEvent::Progress(progress) = &events[1].1 else {
        panic!("expected a progress event");
    };
    assert_eq!(progress.id, id("S1"));
    assert_eq!(progress.parent_id, id("T1"));
    assert_eq!(progress.message, "Compiling");

    assert!(!console.has_tasks_in_progress());
    assert!(console.active_subtasks().is_empty());
}

#[test]
fn test_finish_task_drops_descendants() {
    let (recorder, console) = build_console();
    start(&console, "T1");
    console.start_subtask(id("T1"), id("S1"), "one");
    console.start_subtask(id("S1"), id("S2"), "two");
    console.finish_task(&id("T1"), "Done", EventResult::Failure);
    let emitted = recorder.len();

    assert!(console.active_subtasks().is_empty());
    console.add_message(&id("S2"), "late output");
    console.finish_subtask(&id("S1"), "late finish", EventResult::Success);
    console.add_diagnostic_message(&id("S2"), "/ws/a.rs", 0, 0, "late", MessageKind::Error);
    assert_eq!(recorder.len(), emitted);
    assert!(!console.has_tasks_in_progress());
}

#[test]
fn test_finish_of_unknown_task_is_ignored() {
    let (recorder, console) = build_console();
    console.finish_task(&id("missing"), "Done", EventResult::Success);
    console.finish_subtask(&id("missing"), "Done", EventResult::Success);
    assert!(recorder.is_empty());
}

#[test]
fn test_subtask_under_unknown_parent_is_dropped() {
    let (recorder, console) = build_console();
    console.start_subtask(id("ghost"), id("S1"), "orphan");
    assert!(recorder.is_empty());
    assert!(console.active_subtasks().is_empty());

    start(&console, "T1");
    console.finish_task(&id("T1"), "Done", EventResult::Success);
    console.start_subtask(id("T1"), id("S2"), "after finish");
    assert_eq!(recorder.len(), 2);
    assert!(console.active_subtasks().is_empty());
}

#[test]
fn test_nested_subtask_resolves_root() {
    let (recorder, console) = build_console();
    start(&console, "T1");
    console.start_subtask(id("T1"), id("S1"), "one");
    console.start_subtask(id("S1"), id("S2"), "two");

    let events = recorder.events();
    let (build_id, BuildEvent::Progress(progress)) = &events[2] else {
        panic!("expected a progress event");
    };
    assert_eq!(build_id, &id("T1"));
    assert_eq!(progress.parent_id, id("S1"));
}

#[test]
fn test_finish_subtask_with_descendants_emits_one_event() {
    let (recorder, console) = build_console();
    start(&console, "T1");
    console.start_subtask(id("T1"), id("S1"), "one");
    console.start_subtask(id("S1"), id("S2"), "two");
    console.start_subtask(id("S2"), id("S3"), "three");
    console.start_subtask(id("T1"), id("other"), "sibling");
    recorder.take();

    console.finish_subtask(&id("S1"), "Done", EventResult::Skipped);

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    let BuildEvent::Finish(finish) = &events[0].1 else {
        panic!("expected a finish event");
    };
    assert_eq!(finish.id, id("S1"));
    assert_eq!(finish.result, EventResult::Skipped);
    assert_eq!(console.active_subtasks(), vec![id("other")]);
}

#[test]
fn test_message_propagates_to_every_ancestor() {
    let (recorder, console) = build_console();
    start(&console, "T1");
    console.start_subtask(id("T1"), id("S1"), "one");
    console.start_subtask(id("S1"), id("S2"), "two");
    console.start_subtask(id("S2"), id("S3"), "three");
    recorder.take();

    console.add_message(&id("S3"), "warning: unused variable");

    assert_eq!(
        outputs(&recorder),
        vec![
            (Some(id("S3")), "warning: unused variable\n".to_string()),
            (Some(id("S2")), "warning: unused variable\n".to_string()),
            (Some(id("S1")), "warning: unused variable\n".to_string()),
            (None, "warning: unused variable\n".to_string()),
        ]
    );
    assert!(recorder.events().iter().all(|(build_id, _)| build_id == &id("T1")));
}

#[test]
fn test_message_to_root_task_is_not_duplicated() {
    let (recorder, console) = build_console();
    start(&console, "T1");
    recorder.take();

    console.add_message(&id("T1"), "already terminated\n");
    assert_eq!(outputs(&recorder), vec![(None, "already terminated\n".to_string())]);
}

#[test]
fn test_blank_messages_are_dropped() {
    let (recorder, console) = build_console();
    start(&console, "T1");
    recorder.take();

    console.add_message(&id("T1"), "   ");
    console.add_latest_message("");
    console.add_diagnostic_message(&id("T1"), "/ws/a.rs", 1, 2, " \n", MessageKind::Error);
    assert!(recorder.is_empty());
}

#[test]
fn test_latest_message_targets_newest_subtask() {
    let (recorder, console) = build_console();
    console.add_latest_message("nobody listens");
    assert!(recorder.is_empty());

    start(&console, "T1");
    start(&console, "T2");
    recorder.take();
    console.add_latest_message("to T2");
    assert_eq!(outputs(&recorder), vec![(None, "to T2\n".to_string())]);

    console.start_subtask(id("T1"), id("S1"), "one");
    recorder.take();
    console.add_latest_message("to S1");
    let events = recorder.events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|(build_id, _)| build_id == &id("T1")));
    assert_eq!(
        outputs(&recorder),
        vec![
            (Some(id("S1")), "to S1\n".to_string()),
            (None, "to S1\n".to_string()),
        ]
    );
}

#[cfg(unix)]
#[test]
fn test_diagnostic_on_subtask() {
    let (recorder, console) = build_console();
    start(&console, "T1");
    console.start_subtask(id("T1"), id("S1"), "one");
    recorder.take();

    console.add_diagnostic_message(
        &id("S1"),
        "/workspace/src/main.rs",
        4,
        8,
        "mismatched types",
        MessageKind::Error,
    );

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    let (build_id, BuildEvent::FileMessage(diagnostic)) = &events[0] else {
        panic!("expected a file message event");
    };
    assert_eq!(build_id, &id("T1"));
    assert_eq!(diagnostic.id, id("S1"));
    assert_eq!(diagnostic.path, PathBuf::from("/workspace/src/main.rs"));
    assert_eq!((diagnostic.line, diagnostic.column), (4, 8));
    assert_eq!(diagnostic.severity, MessageKind::Error);
    assert_eq!(diagnostic.message, "mismatched types\n");
}

#[cfg(unix)]
#[test]
fn test_diagnostic_on_root_task_and_bad_uri() {
    let (recorder, console) = build_console();
    start(&console, "T1");
    recorder.take();

    console.add_diagnostic_message(
        &id("T1"),
        "file:///workspace/BUILD",
        0,
        0,
        "deprecated rule",
        MessageKind::Warning,
    );
    console.add_diagnostic_message(&id("T1"), "relative/BUILD", 0, 0, "dropped", MessageKind::Info);

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    let BuildEvent::FileMessage(diagnostic) = &events[0].1 else {
        panic!("expected a file message event");
    };
    assert_eq!(diagnostic.id, id("T1"));
    assert_eq!(diagnostic.path, PathBuf::from("/workspace/BUILD"));
}

#[cfg(unix)]
#[test]
fn test_diagnostic_bare_path_is_not_reparsed() {
    let (recorder, console) = build_console();
    start(&console, "T1");
    recorder.take();

    let paths = ["/ws/C#/main.cs", "/ws/what?.rs", "/ws/a%20b.rs"];
    for path in paths {
        console.add_diagnostic_message(&id("T1"), path, 1, 0, "unused", MessageKind::Warning);
    }

    let emitted: Vec<PathBuf> = recorder
        .events()
        .into_iter()
        .filter_map(|(_, event)| match event {
            BuildEvent::FileMessage(diagnostic) => Some(diagnostic.path),
            _ => None,
        })
        .collect();
    let expected: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
    assert_eq!(emitted, expected);
}

#[test]
fn test_stop_action_follows_task_state() {
    let (recorder, console) = build_console();
    let stops = Arc::new(AtomicUsize::new(0));
    let counter = stops.clone();
    console.start_task(
        id("T1"),
        "Build",
        "Building",
        TaskActions::new().on_cancel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    let events = recorder.events();
    let BuildEvent::Start(event) = &events[0].1 else {
        panic!("expected a start event");
    };
    let stop = &event.actions[1];
    assert_eq!(stop.kind(), ActionKind::Stop);
    assert_eq!(stop.label(), "Stop");
    assert_eq!(stop.icon(), "disconnect");
    assert!(stop.is_enabled());
    assert!(stop.perform());
    assert_eq!(stops.load(Ordering::SeqCst), 1);
    assert!(console.has_tasks_in_progress(), "stopping must not finish the task");

    console.finish_task(&id("T1"), "Cancelled", EventResult::Skipped);
    assert!(!stop.is_enabled());
    assert!(!stop.perform());
    assert_eq!(stops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_rebuild_runs_only_caller_action() {
    let (recorder, console) = build_console();
    let rebuilds = Arc::new(AtomicUsize::new(0));
    let counter = rebuilds.clone();
    console.start_task(
        id("T1"),
        "Build",
        "Building",
        TaskActions::new().on_redo(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    start(&console, "T2");

    let events = recorder.events();
    let BuildEvent::Start(with_redo) = &events[0].1 else {
        panic!("expected a start event");
    };
    let BuildEvent::Start(without_redo) = &events[1].1 else {
        panic!("expected a start event");
    };
    let rebuild = &with_redo.actions[0];
    assert_eq!(rebuild.kind(), ActionKind::Rebuild);
    assert_eq!(rebuild.icon(), "compile");
    assert!(!rebuild.is_enabled(), "disabled while tasks run");

    console.finish_task(&id("T1"), "Done", EventResult::Success);
    assert!(!rebuild.is_enabled(), "T2 still runs");
    console.finish_task(&id("T2"), "Done", EventResult::Success);

    assert!(rebuild.perform());
    assert_eq!(rebuilds.load(Ordering::SeqCst), 1);
    assert!(!without_redo.actions[0].perform());
}

#[test]
fn test_reload_falls_back_to_default() {
    let reloads = Arc::new(AtomicUsize::new(0));
    let (recorder, console) = sync_console(reloads.clone());
    start(&console, "sync");
    console.finish_task(&id("sync"), "Synced", EventResult::Success);

    let events = recorder.events();
    let BuildEvent::Start(event) = &events[0].1 else {
        panic!("expected a start event");
    };
    let reload = &event.actions[0];
    assert_eq!(reload.kind(), ActionKind::Reload);
    assert_eq!(reload.label(), "Reload");
    assert_eq!(reload.icon(), "reload");
    assert!(reload.perform());
    assert_eq!(reloads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_actions_are_disabled_once_console_is_gone() {
    let (recorder, console) = build_console();
    start(&console, "T1");
    drop(console);

    let events = recorder.events();
    let BuildEvent::Start(event) = &events[0].1 else {
        panic!("expected a start event");
    };
    assert!(event.actions.iter().all(|action| !action.is_enabled()));
}

#[test]
fn test_console_accessors() {
    let (_, console) = build_console();
    assert_eq!(console.base_path(), Path::new("/workspace"));
    assert_eq!(console.kind().redo_kind(), ActionKind::Rebuild);
    assert!(!console.is_task_in_progress(&id("T1")));

    start(&console, "T1");
    console.start_subtask(id("T1"), id("S1"), "compile");
    assert!(console.is_task_in_progress(&id("T1")));
    assert!(!console.is_task_in_progress(&id("S1")), "subtasks are not tasks");
    assert_eq!(console.tasks_in_progress(), vec![id("T1")]);

    console.finish_task(&id("T1"), "Done", EventResult::Success);
    assert!(!console.is_task_in_progress(&id("T1")));

    let (_, sync) = sync_console(Arc::new(AtomicUsize::new(0)));
    assert!(matches!(sync.kind(), ConsoleKind::Sync { .. }));
    assert_eq!(sync.kind().redo_kind(), ActionKind::Reload);
}

#[test]
fn test_title_prefix_is_configurable() {
    let (recorder, console) = build_console();
    let console = console.with_title_prefix("Bazel");
    start(&console, "T1");

    let events = recorder.events();
    let BuildEvent::Start(event) = &events[0].1 else {
        panic!("expected a start event");
    };
    assert_eq!(event.title, "Bazel: Build");
}

#[test]
fn test_concurrent_callers_keep_registry_consistent() {
    let (recorder, console) = build_console();
    let console = Arc::new(console);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let console = Arc::clone(&console);
            std::thread::spawn(move || {
                for round in 0..50 {
                    let task = id(&format!("task-{worker}-{round}"));
                    let subtask = id(&format!("sub-{worker}-{round}"));
                    console.start_task(task.clone(), "Build", "", TaskActions::new());
                    console.start_subtask(task.clone(), subtask.clone(), "compile");
                    console.add_message(&subtask, "line");
                    console.finish_task(&task, "Done", EventResult::Success);
                    console.add_message(&subtask, "dropped");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(!console.has_tasks_in_progress());
    assert!(console.active_subtasks().is_empty());
    // start, progress, two outputs, finish per round
    assert_eq!(recorder.len(), 8 * 50 * 5);
}

#[test]
fn test_finish_task_racing_start_subtask_leaves_no_orphans() {
    let (_, console) = build_console();
    let console = Arc::new(console);
    let roots: Vec<TaskId> = (0..200).map(|n| id(&format!("root-{n}"))).collect();
    for root in &roots {
        console.start_task(root.clone(), "Build", "", TaskActions::new());
    }

    let finisher = {
        let console = Arc::clone(&console);
        let roots = roots.clone();
        std::thread::spawn(move || {
            for root in &roots {
                console.finish_task(root, "Done", EventResult::Success);
            }
        })
    };
    let starter = {
        let console = Arc::clone(&console);
        let roots = roots.clone();
        std::thread::spawn(move || {
            for (n, root) in roots.iter().enumerate() {
                let child = id(&format!("child-{n}"));
                let grandchild = id(&format!("grandchild-{n}"));
                console.start_subtask(root.clone(), child.clone(), "compile");
                console.start_subtask(child, grandchild, "codegen");
            }
        })
    };
    finisher.join().unwrap();
    starter.join().unwrap();

    assert!(!console.has_tasks_in_progress());
    assert!(console.active_subtasks().is_empty());
}
