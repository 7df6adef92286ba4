use project_hub::{
    instruction::{build_instruction, get_prompt, project_planner_instructions},
    InstructionParam, MaterialSnapshot, ProjectContext, TodoSnapshot,
};

#[test]
fn build_instruction_embeds_serialized_todos() {
    let context = ProjectContext {
        todos: vec![TodoSnapshot {
            id: 1,
            text: "buy wood".to_string(),
            completed: false,
        }],
        materials: vec![],
    };

    let instruction = build_instruction(&context);

    assert!(instruction.contains(r#"[{"id":1,"text":"buy wood","completed":false}]"#));
    assert!(instruction.contains("materials list is: []"));
}

#[test]
fn build_instruction_embeds_serialized_materials() {
    let context = ProjectContext {
        todos: vec![],
        materials: vec![MaterialSnapshot {
            id: 3,
            name: "screws".to_string(),
            quantity: "1 box".to_string(),
            cost: 4.5,
        }],
    };

    let instruction = build_instruction(&context);

    assert!(instruction.contains(r#"[{"id":3,"name":"screws","quantity":"1 box","cost":4.5}]"#));
}

#[test]
fn build_instruction_handles_missing_context_fields() {
    let context: ProjectContext = serde_json::from_str("{}").expect("empty context parses");

    let instruction = build_instruction(&context);

    assert!(instruction.contains("checklist is: []"));
    assert!(instruction.contains("materials list is: []"));
}

#[test]
fn build_instruction_states_persona_and_output_contract() {
    let instruction = build_instruction(&ProjectContext::default());

    assert!(instruction.contains("methodical project-planning assistant"));
    for field in ["\"summary\"", "\"materials\"", "\"steps\"", "\"questions\""] {
        assert!(instruction.contains(field), "missing {field}");
    }
    assert!(instruction.contains("code fences"));
    assert!(instruction.contains("3 to 4 internal research queries"));
    assert!(instruction.contains("not clarifying questions for the user"));
}

#[test]
fn build_instruction_changes_with_context() {
    let empty = build_instruction(&ProjectContext::default());
    let with_todo = build_instruction(&ProjectContext {
        todos: vec![TodoSnapshot {
            id: 9,
            text: "prime walls".to_string(),
            completed: true,
        }],
        materials: vec![],
    });

    assert_ne!(empty, with_todo);
    assert!(with_todo.contains("prime walls"));
}

#[test]
fn context_entries_default_missing_fields() {
    let context: ProjectContext =
        serde_json::from_str(r#"{"todos":[{"text":"sand"}],"materials":[{"name":"paint"}]}"#)
            .expect("partial context parses");

    assert_eq!(
        context.todos,
        vec![TodoSnapshot {
            id: 0,
            text: "sand".to_string(),
            completed: false,
        }]
    );
    assert_eq!(context.materials[0].name, "paint");
    assert_eq!(context.materials[0].quantity, "");
}

#[test]
fn get_prompt_joins_instructions_with_newlines() {
    let instructions: Vec<InstructionParam<ProjectContext>> = vec![
        "first".into(),
        InstructionParam::Func(|ctx| format!("todos: {}", ctx.todos.len())),
        String::from("last").into(),
    ];

    assert_eq!(
        get_prompt(&instructions, &ProjectContext::default()),
        "first\ntodos: 0\nlast"
    );
}

#[test]
fn project_planner_instructions_end_with_project_state() {
    let instructions = project_planner_instructions();

    assert!(matches!(
        instructions.last(),
        Some(InstructionParam::Func(_))
    ));
}
