//! Tests for the session operations

mod support;

use serde_json::{json, Value};
use support::{drain, session, settle, ScriptedTransport};
use tapline_core::events::SessionEvent;
use tapline_core::session::BLANK_SOURCE;
use tapline_core::{Scope, VariableReference};

fn query(url: &url::Url, key: &str) -> Option<String>
{
    url.query_pairs()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

fn frames(count: usize) -> Value
{
    Value::Array(
        (0..count)
            .map(|index| json!({ "name": format!("frame{index}"), "sourceUri": "src/a", "line": index + 1 }))
            .collect(),
    )
}

fn stack_values() -> Value
{
    json!([
        {
            "name": "local",
            "type": "struct",
            "value": "{2}",
            "children": [
                {"name": "count", "type": "number", "value": "3"},
                {
                    "name": "items",
                    "type": "array",
                    "value": "[1]",
                    "children": [{"name": "1", "type": "string", "value": "\"a\""}]
                }
            ]
        },
        {"name": "broken", "value": "?"},
        {"name": "flag", "type": "boolean", "value": "true"}
    ])
}

#[tokio::test(start_paused = true)]
async fn test_stack_trace_window()
{
    let transport = ScriptedTransport::new();
    transport.json("stacktrace", frames(5));
    transport.json("stacktrace", frames(5));
    transport.json("stacktrace", frames(5));
    let (session, _events) = session(&transport);

    let page = session.stack_trace(0, 2).await;
    assert_eq!(page.iter().map(|frame| frame.index).collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(page[0].name, "frame0");
    assert_eq!(page[1].line, 2);

    let rest = session.stack_trace(3, 0).await;
    assert_eq!(rest.iter().map(|frame| frame.index).collect::<Vec<_>>(), vec![3, 4]);

    assert!(session.stack_trace(10, 2).await.is_empty());
    assert_eq!(transport.count("stacktrace"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_stack_trace_drops_malformed_frames()
{
    let transport = ScriptedTransport::new();
    transport.json(
        "stacktrace",
        json!([
            {"name": "main", "sourceUri": "src/a", "line": 3},
            {"name": "broken"},
            {"name": "leaf", "sourceUri": "src/b", "sourceNumber": 4, "line": 9, "column": 2}
        ]),
    );
    let (session, mut events) = session(&transport);

    let stack = session.stack_trace(0, 0).await;
    assert_eq!(stack.len(), 2);
    assert_eq!(stack[1].name, "leaf");
    assert_eq!(stack[1].index, 1);
    assert_eq!(stack[1].source_number, Some(4));
    assert!(drain(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_set_breakpoints_normalizes_path()
{
    let transport = ScriptedTransport::new();
    transport.json("breakpoints/set", json!({ "sourceUri": "src/a", "breakpoints": [3] }));
    let (session, _events) = session(&transport);

    let set = session.set_breakpoints("src\\a.cf", &[3, 5]).await;

    let request = transport.last("breakpoints/set").unwrap();
    assert_eq!(query(&request, "path").as_deref(), Some("src/a"));
    assert_eq!(query(&request, "lines").as_deref(), Some("3,5"));
    assert_eq!(set.source_uri, "src/a");
    assert_eq!(set.verified_lines, vec![3]);
    assert!(set.is_verified(3));
    assert!(!set.is_verified(5));
}

#[tokio::test(start_paused = true)]
async fn test_set_breakpoints_failure_ends_session()
{
    let transport = ScriptedTransport::new();
    let (session, mut events) = session(&transport);

    let set = session.set_breakpoints("lib/util.cf", &[1]).await;

    assert_eq!(set.source_uri, "lib/util");
    assert!(set.verified_lines.is_empty());
    let received = drain(&mut events);
    assert!(matches!(received[0], SessionEvent::Output { .. }));
    assert_eq!(received[1], SessionEvent::End);
}

#[tokio::test(start_paused = true)]
async fn test_source_text()
{
    let transport = ScriptedTransport::new();
    transport.raw("sources/content", Some("text/plain; charset=utf-8"), "line one\nline two\n");
    transport.raw("sources/content", Some("application/octet-stream"), "\u{0}\u{1}");
    transport.raw("sources/content", None, "untyped");
    let (session, _events) = session(&transport);

    assert_eq!(session.source("src\\main.cf").await, "line one\nline two\n");
    assert_eq!(
        query(&transport.last("sources/content").unwrap(), "uri").as_deref(),
        Some("src/main")
    );
    assert_eq!(session.source("bin/blob").await, BLANK_SOURCE);
    assert_eq!(session.source("bin/untyped").await, BLANK_SOURCE);
    assert!(!session.is_terminated());
}

#[tokio::test(start_paused = true)]
async fn test_scopes()
{
    let transport = ScriptedTransport::new();
    let (session, _events) = session(&transport);

    assert_eq!(session.scopes(), vec![Scope::stack()]);
    assert_eq!(session.scopes()[0].reference, VariableReference::STACK_SCOPE);
}

#[tokio::test(start_paused = true)]
async fn test_root_references_are_stable()
{
    let transport = ScriptedTransport::new();
    transport.json("values/stack", stack_values());
    transport.json("values/stack", stack_values());
    let (session, _events) = session(&transport);

    let first = session.list_root(0, 0).await;
    let second = session.list_root(0, 0).await;

    // The malformed entry is dropped, its siblings kept.
    assert_eq!(first.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(), vec!["local", "flag"]);
    assert_eq!(first, second);
    assert!(first[0].reference.is_expandable());
    assert_eq!(first[1].reference, VariableReference::NONE);

    let items = &first[0].children.as_ref().unwrap()[1];
    assert!(items.reference.is_expandable());
    assert_ne!(items.reference, first[0].reference);
}

#[tokio::test(start_paused = true)]
async fn test_variables_dispatch()
{
    let transport = ScriptedTransport::new();
    transport.json("values/stack", stack_values());
    transport.json("values/stack", stack_values());
    let (session, _events) = session(&transport);

    let page = session.variables(VariableReference::STACK_SCOPE, 1, 1).await;
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "flag");
    assert!(session.variables(VariableReference::STACK_SCOPE, 5, 1).await.is_empty());
    assert!(!session.is_terminated());
}

#[tokio::test(start_paused = true)]
async fn test_list_children()
{
    let transport = ScriptedTransport::new();
    transport.json("values/stack", stack_values());
    transport.json(
        "values",
        json!({
            "name": "local",
            "type": "struct",
            "value": "{3}",
            "children": [
                {"name": "count", "type": "number", "value": "4"},
                {"name": "items", "type": "array", "value": "[1]",
                 "children": [{"name": "1", "type": "string", "value": "\"b\""}]},
                {"name": "extra", "type": "null", "value": "null"}
            ]
        }),
    );
    let (session, _events) = session(&transport);

    let root = session.list_root(0, 0).await;
    let local = root[0].reference;
    let items = root[0].children.as_ref().unwrap()[1].reference;

    let children = session.variables(local, 0, 0).await;
    assert_eq!(query(&transport.last("values").unwrap(), "path").as_deref(), Some("local"));
    assert_eq!(children.len(), 3);
    assert_eq!(children[0].value, "4");
    // The same path keeps its reference after the refresh.
    assert_eq!(children[1].reference, items);
    assert_eq!(children[2].reference, VariableReference::NONE);
}

#[tokio::test(start_paused = true)]
async fn test_list_children_accepts_bare_array()
{
    let transport = ScriptedTransport::new();
    transport.json("values/stack", stack_values());
    transport.json("values", json!([{"name": "1", "type": "string", "value": "\"z\""}, {"name": 2}]));
    let (session, _events) = session(&transport);

    let root = session.list_root(0, 0).await;
    let items = root[0].children.as_ref().unwrap()[1].reference;

    let children = session.list_children(items).await;
    assert_eq!(query(&transport.last("values").unwrap(), "path").as_deref(), Some("local.items"));
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].value, "\"z\"");
}

#[tokio::test(start_paused = true)]
async fn test_stale_reference_lists_nothing()
{
    let transport = ScriptedTransport::new();
    transport.json("values/stack", stack_values());
    transport.json("values/stack", json!([{"name": "flag", "type": "boolean", "value": "false"}]));
    let (session, mut events) = session(&transport);

    let root = session.list_root(0, 0).await;
    let local = root[0].reference;
    session.list_root(0, 0).await;

    assert!(session.list_children(local).await.is_empty());
    assert!(session.list_children(VariableReference::from_raw(9_999)).await.is_empty());
    assert!(session.list_children(VariableReference::NONE).await.is_empty());
    assert_eq!(transport.count("values"), 0);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_evaluate()
{
    let transport = ScriptedTransport::new();
    transport.json(
        "values",
        json!({"name": "items", "type": "array", "value": "[1]",
               "children": [{"name": "1", "type": "string", "value": "\"a\""}]}),
    );
    transport.json("values", json!({"name": "count"}));
    let (session, _events) = session(&transport);

    let items = session.evaluate("local.items").await.unwrap();
    assert_eq!(query(&transport.last("values").unwrap(), "path").as_deref(), Some("local.items"));
    assert_eq!(items.type_name, "array");
    assert!(items.reference.is_expandable());

    assert!(session.evaluate("local.count").await.is_none());
    assert!(!session.is_terminated());
}

#[tokio::test(start_paused = true)]
async fn test_evaluated_reference_expands()
{
    let transport = ScriptedTransport::new();
    transport.json(
        "values",
        json!({"name": "items", "type": "array", "value": "[1]",
               "children": [{"name": "1", "type": "struct", "value": "{1}",
                             "children": [{"name": "x", "type": "number", "value": "7"}]}]}),
    );
    transport.json("values", json!([{"name": "1", "type": "string", "value": "\"fresh\""}]));
    let (session, mut events) = session(&transport);

    // No root listing: the evaluated node is not part of the stack tree.
    let items = session.evaluate("local.items").await.unwrap();
    let nested = items.children.as_ref().unwrap()[0].reference;

    let children = session.variables(items.reference, 0, 0).await;
    assert_eq!(transport.count("values"), 2);
    assert_eq!(query(&transport.last("values").unwrap(), "path").as_deref(), Some("local.items"));
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].value, "\"fresh\"");

    // The refreshed child has no children any more; its old reference is stale.
    assert!(session.list_children(nested).await.is_empty());
    assert_eq!(transport.count("values"), 2);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_evaluated_nested_reference_expands()
{
    let transport = ScriptedTransport::new();
    transport.json(
        "values",
        json!({"name": "items", "type": "array", "value": "[1]",
               "children": [{"name": "1", "type": "struct", "value": "{1}",
                             "children": [{"name": "x", "type": "number", "value": "7"}]}]}),
    );
    transport.json("values", json!([{"name": "x", "type": "number", "value": "8"}]));
    let (session, _events) = session(&transport);

    let items = session.evaluate("local.items").await.unwrap();
    let nested = items.children.as_ref().unwrap()[0].reference;

    let children = session.list_children(nested).await;
    assert_eq!(query(&transport.last("values").unwrap(), "path").as_deref(), Some("local.items.1"));
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].value, "8");
}

#[tokio::test(start_paused = true)]
async fn test_operations_after_end_are_empty()
{
    let transport = ScriptedTransport::new();
    transport.json("stacktrace", frames(3));
    transport.json("values/stack", stack_values());
    let (session, mut events) = session(&transport);

    session.stop();

    assert!(session.stack_trace(0, 0).await.is_empty());
    assert!(session.list_root(0, 0).await.is_empty());
    assert!(session.evaluate("local").await.is_none());
    assert!(session.set_breakpoints("src/a", &[1]).await.verified_lines.is_empty());
    assert_eq!(session.source("src/a").await, BLANK_SOURCE);
    assert!(transport.requests().is_empty());

    settle().await;
    assert_eq!(drain(&mut events), vec![SessionEvent::End]);
}

#[tokio::test(start_paused = true)]
async fn test_stop_forgets_references()
{
    let transport = ScriptedTransport::new();
    transport.json("values/stack", stack_values());
    let (session, _events) = session(&transport);

    let root = session.list_root(0, 0).await;
    session.stop();

    assert!(session.list_children(root[0].reference).await.is_empty());
    assert_eq!(transport.count("values"), 0);
}
