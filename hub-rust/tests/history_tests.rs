use hub_llm::Message;
use project_hub::{
    history::{parse_history, sanitize_history, to_messages},
    AssistantError, ConversationTurn, Role, StructuredReply, TurnContent,
};
use serde_json::json;

fn shelf_reply() -> StructuredReply {
    StructuredReply {
        summary: "Build a shelf".to_string(),
        materials: vec!["wood".to_string()],
        steps: vec!["cut".to_string(), "assemble".to_string()],
        questions: vec!["q1".to_string(), "q2".to_string(), "q3".to_string()],
    }
}

#[test]
fn sanitize_history_leaves_text_only_history_unchanged() {
    let history = vec![
        ConversationTurn::user("How do I build a shelf?"),
        ConversationTurn::model("{\"summary\":\"Build a shelf\"}"),
        ConversationTurn::user("What wood?"),
    ];

    assert_eq!(sanitize_history(history.clone()), history);
}

#[test]
fn sanitize_history_collapses_structured_turns_preserving_order() {
    let history = vec![
        ConversationTurn::user("How do I build a shelf?"),
        ConversationTurn::model(shelf_reply()),
        ConversationTurn::user("Thanks"),
        ConversationTurn::model(StructuredReply::default()),
    ];

    let sanitized = sanitize_history(history);

    assert_eq!(sanitized.len(), 4);
    assert_eq!(
        sanitized.iter().map(|turn| turn.role).collect::<Vec<_>>(),
        vec![Role::User, Role::Model, Role::User, Role::Model]
    );
    assert!(sanitized
        .iter()
        .all(|turn| matches!(turn.content, TurnContent::Text(_))));
    assert_eq!(
        sanitized[1].content,
        TurnContent::Text(
            r#"{"summary":"Build a shelf","materials":["wood"],"steps":["cut","assemble"],"questions":["q1","q2","q3"]}"#
                .to_string()
        )
    );
    assert_eq!(
        sanitized[3].content,
        TurnContent::Text(
            r#"{"summary":"","materials":[],"steps":[],"questions":[]}"#.to_string()
        )
    );
}

#[test]
fn sanitize_history_collapses_structured_user_turns_too() {
    let sanitized = sanitize_history(vec![ConversationTurn::user(shelf_reply())]);

    assert_eq!(sanitized[0].role, Role::User);
    assert_eq!(
        sanitized[0].content,
        TurnContent::Text(shelf_reply().to_json_string())
    );
}

#[test]
fn sanitize_history_accepts_empty_history() {
    assert!(sanitize_history(Vec::new()).is_empty());
}

#[test]
fn sanitize_history_tolerates_any_ordering() {
    let history = vec![
        ConversationTurn::model("first"),
        ConversationTurn::model("second"),
        ConversationTurn::user("third"),
    ];

    assert_eq!(sanitize_history(history.clone()), history);
}

#[test]
fn parse_history_reads_text_and_structured_content() {
    let history = parse_history(&[
        json!({ "role": "user", "content": "How do I build a shelf?" }),
        json!({
            "role": "model",
            "content": {
                "summary": "Build a shelf",
                "materials": ["wood"],
                "steps": ["cut", "assemble"],
                "questions": ["q1", "q2", "q3"],
                "extra": true
            }
        }),
    ])
    .expect("history parses");

    assert_eq!(
        history,
        vec![
            ConversationTurn::user("How do I build a shelf?"),
            ConversationTurn::model(shelf_reply()),
        ]
    );
}

#[test]
fn parse_history_defaults_missing_reply_fields() {
    let history = parse_history(&[json!({ "role": "model", "content": { "summary": "ok" } })])
        .expect("history parses");

    assert_eq!(
        history[0].content,
        TurnContent::Structured(StructuredReply {
            summary: "ok".to_string(),
            ..Default::default()
        })
    );
}

#[test]
fn parse_history_rejects_malformed_entries() {
    let cases = [
        (json!("just text"), "history entry 0: expected an object"),
        (json!({ "content": "hi" }), "history entry 0: missing role"),
        (
            json!({ "role": "system", "content": "hi" }),
            "history entry 0: unknown role 'system'",
        ),
        (json!({ "role": "user" }), "history entry 0: missing content"),
        (
            json!({ "role": "user", "content": 42 }),
            "history entry 0: content must be a string or an object",
        ),
    ];

    for (entry, expected) in cases {
        match parse_history(&[entry]) {
            Err(AssistantError::InvalidRequest(message)) => assert_eq!(message, expected),
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }
}

#[test]
fn parse_history_names_the_failing_index() {
    let result = parse_history(&[
        json!({ "role": "user", "content": "ok" }),
        json!({ "role": "model", "content": { "materials": "wood" } }),
    ]);

    match result {
        Err(AssistantError::InvalidRequest(message)) => {
            assert!(message.starts_with("history entry 1:"), "{message}");
        }
        other => panic!("expected InvalidRequest, got {other:?}"),
    }
}

#[test]
fn to_messages_maps_roles() {
    let messages = to_messages(vec![
        ConversationTurn::user("hi"),
        ConversationTurn::model("hello"),
    ]);

    assert_eq!(
        messages,
        vec![Message::user(["hi"]), Message::assistant(["hello"])]
    );
}
