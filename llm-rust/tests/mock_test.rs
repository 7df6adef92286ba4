use hub_llm::{
    mock::{MockGenerateResult, MockLanguageModel},
    LanguageModel, LanguageModelError, LanguageModelInput, Message, ModelResponse, Part,
};

fn user_input(text: &str) -> LanguageModelInput {
    LanguageModelInput {
        messages: vec![Message::user([text])],
        ..LanguageModelInput::default()
    }
}

#[tokio::test]
async fn mock_language_model_tracks_generate_inputs_and_returns_results() {
    let model = MockLanguageModel::new();

    let response1 = ModelResponse {
        content: vec![Part::text("Hello, world!")],
        ..ModelResponse::default()
    };

    model
        .enqueue_generate(response1.clone())
        .enqueue_generate(MockGenerateResult::error(LanguageModelError::InvalidInput(
            "generate error".to_string(),
        )))
        .enqueue_generate(MockGenerateResult::text("Goodbye, world!"));

    let input1 = user_input("Hi");
    let res1 = model
        .generate(input1.clone())
        .await
        .expect("first generate should succeed");
    assert_eq!(res1, response1);
    let tracked = model.tracked_generate_inputs();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].messages, input1.messages);

    let err = model
        .generate(user_input("Error"))
        .await
        .expect_err("second generate should error");
    match err {
        LanguageModelError::InvalidInput(msg) => assert_eq!(msg, "generate error"),
        other => panic!("unexpected error variant: {other:?}"),
    }

    let res3 = model
        .generate(user_input("Goodbye"))
        .await
        .expect("third generate should succeed");
    assert_eq!(res3.text(), "Goodbye, world!");
    assert_eq!(model.tracked_generate_inputs().len(), 3);
}

#[tokio::test]
async fn mock_language_model_errors_when_queue_is_empty() {
    let model = MockLanguageModel::new();

    let err = model
        .generate(user_input("anyone there?"))
        .await
        .expect_err("empty queue should error");
    assert!(matches!(err, LanguageModelError::Invariant("mock", _)));
    assert_eq!(model.tracked_generate_inputs().len(), 1);
}

#[tokio::test]
async fn mock_language_model_restore_clears_queue_and_inputs() {
    let mut model = MockLanguageModel::new();
    model.set_provider("stub");
    model.set_model_id("stub-1");
    assert_eq!(model.provider(), "stub");
    assert_eq!(model.model_id(), "stub-1");

    model.enqueue_generate(MockGenerateResult::text("queued"));
    model
        .generate(user_input("first"))
        .await
        .expect("queued response");
    model.enqueue_generate(MockGenerateResult::text("never returned"));

    model.restore();

    assert!(model.tracked_generate_inputs().is_empty());
    assert!(model.generate(user_input("second")).await.is_err());
}

#[test]
fn model_response_text_skips_reasoning() {
    let response = ModelResponse {
        content: vec![
            Part::reasoning("let me think"),
            Part::text("{\"a\":"),
            Part::text("1}"),
        ],
        ..ModelResponse::default()
    };
    assert_eq!(response.text(), "{\"a\":1}");
}
