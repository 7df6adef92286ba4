use project_hub::{
    reply::{extract_json_span, extract_reply},
    AssistantError, ReplyPolicy, StructuredReply,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

#[test]
fn extract_reply_reads_object_wrapped_in_prose() {
    let raw = "Sure! {\"summary\":\"Build a shelf\",\"materials\":[\"wood\"],\"steps\":[\"cut\",\"assemble\"],\"questions\":[\"q1\",\"q2\",\"q3\"]} Hope that helps!";

    let reply = extract_reply(raw, ReplyPolicy::Lenient).expect("reply extracts");

    assert_eq!(
        reply,
        StructuredReply {
            summary: "Build a shelf".to_string(),
            materials: strings(&["wood"]),
            steps: strings(&["cut", "assemble"]),
            questions: strings(&["q1", "q2", "q3"]),
        }
    );
}

#[test]
fn extract_reply_reads_object_inside_code_fence() {
    let raw = "```json\n{\"summary\":\"Paint\",\"steps\":[\"sand\"]}\n```";

    let reply = extract_reply(raw, ReplyPolicy::Lenient).expect("reply extracts");

    assert_eq!(reply.summary, "Paint");
    assert_eq!(reply.steps, strings(&["sand"]));
}

#[test]
fn extract_reply_fails_without_braces() {
    let result = extract_reply("I think you should use wood.", ReplyPolicy::Lenient);

    assert!(matches!(result, Err(AssistantError::MalformedReply(_))));
}

#[test]
fn extract_reply_fails_on_missing_closing_brace() {
    let result = extract_reply("{\"summary\": \"x\"", ReplyPolicy::Lenient);

    assert!(matches!(result, Err(AssistantError::MalformedReply(_))));
}

#[test]
fn extract_reply_fails_when_close_precedes_open() {
    let result = extract_reply("} nothing here {", ReplyPolicy::Lenient);

    assert!(matches!(result, Err(AssistantError::MalformedReply(_))));
}

#[test]
fn extract_reply_fails_on_unparsable_span() {
    let result = extract_reply("{ summary: 'single quotes' }", ReplyPolicy::Lenient);

    assert!(matches!(result, Err(AssistantError::MalformedReply(_))));
}

#[test]
fn extract_reply_fails_on_wrong_field_type() {
    let result = extract_reply(
        "{\"summary\":\"ok\",\"materials\":\"wood\"}",
        ReplyPolicy::Lenient,
    );

    assert!(matches!(result, Err(AssistantError::MalformedReply(_))));
}

#[test]
fn extract_reply_defaults_missing_fields() {
    let reply = extract_reply("{\"summary\":\"ok\"}", ReplyPolicy::Lenient).expect("reply extracts");

    assert_eq!(
        reply,
        StructuredReply {
            summary: "ok".to_string(),
            materials: vec![],
            steps: vec![],
            questions: vec![],
        }
    );
}

#[test]
fn extract_reply_treats_null_fields_as_missing() {
    let reply = extract_reply(
        "{\"summary\":null,\"materials\":null,\"steps\":[\"a\"],\"questions\":null}",
        ReplyPolicy::Lenient,
    )
    .expect("reply extracts");

    assert_eq!(reply.summary, "");
    assert!(reply.materials.is_empty());
    assert_eq!(reply.steps, strings(&["a"]));
}

#[test]
fn extract_reply_ignores_unknown_fields() {
    let reply = extract_reply(
        "{\"summary\":\"ok\",\"confidence\":0.9,\"steps\":[]}",
        ReplyPolicy::Lenient,
    )
    .expect("reply extracts");

    assert_eq!(reply.summary, "ok");
}

#[test]
fn lenient_policy_accepts_empty_summary() {
    let reply = extract_reply("{\"summary\":\"\"}", ReplyPolicy::Lenient).expect("reply extracts");

    assert_eq!(reply, StructuredReply::default());
}

#[test]
fn strict_policy_rejects_empty_summary() {
    for raw in ["{\"summary\":\"\"}", "{\"summary\":\"   \"}", "{\"steps\":[\"a\"]}"] {
        let result = extract_reply(raw, ReplyPolicy::Strict);

        assert!(
            matches!(result, Err(AssistantError::MalformedReply(_))),
            "{raw}"
        );
    }
}

#[test]
fn strict_policy_accepts_non_empty_summary() {
    let reply = extract_reply("{\"summary\":\"ok\"}", ReplyPolicy::Strict).expect("reply extracts");

    assert_eq!(reply.summary, "ok");
}

#[test]
fn unexpected_question_count_is_accepted() {
    let reply = extract_reply(
        "{\"summary\":\"ok\",\"questions\":[\"a\",\"b\",\"c\",\"d\",\"e\"]}",
        ReplyPolicy::Strict,
    )
    .expect("reply extracts");

    assert_eq!(reply.questions.len(), 5);
}

#[test]
fn extract_json_span_spans_first_open_to_last_close() {
    assert_eq!(
        extract_json_span("a {x} b {y} c", '{', '}'),
        Some("{x} b {y}")
    );
    assert_eq!(extract_json_span("[1, [2]] tail", '[', ']'), Some("[1, [2]]"));
    assert_eq!(extract_json_span("no json", '{', '}'), None);
}

#[test]
fn structured_reply_serializes_fields_in_order() {
    let reply = StructuredReply {
        summary: "s".to_string(),
        materials: strings(&["m"]),
        steps: strings(&["st"]),
        questions: strings(&["q"]),
    };

    assert_eq!(
        reply.to_json_string(),
        r#"{"summary":"s","materials":["m"],"steps":["st"],"questions":["q"]}"#
    );
}
