use crate::ProjectContext;

#[derive(Debug, Clone)]
pub enum InstructionParam<TCtx> {
    String(String),
    Func(fn(&TCtx) -> String),
}

impl<TCtx> InstructionParam<TCtx> {
    pub fn as_string(&self, context: &TCtx) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Func(f) => f(context),
        }
    }
}

impl<TCtx> From<&str> for InstructionParam<TCtx> {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl<TCtx> From<String> for InstructionParam<TCtx> {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<TCtx> From<fn(&TCtx) -> String> for InstructionParam<TCtx> {
    fn from(value: fn(&TCtx) -> String) -> Self {
        Self::Func(value)
    }
}

pub fn get_prompt<TCtx>(instructions: &[InstructionParam<TCtx>], context: &TCtx) -> String {
    instructions
        .iter()
        .map(|param| param.as_string(context))
        .collect::<Vec<_>>()
        .join("\n")
}

const PERSONA: &str = "You are a methodical project-planning assistant for home-improvement \
and DIY projects. Break the user's goal into concrete, ordered work and be precise about \
what is needed.";

const OUTPUT_CONTRACT: &str = "Respond with a single JSON object and nothing else. Do not \
wrap it in markdown, code fences, or prose. The object must have exactly these four fields: \
\"summary\" (a short string answering the request), \"materials\" (an array of strings), \
\"steps\" (an array of strings, in order) and \"questions\" (an array of strings).";

const RESEARCH_QUESTIONS: &str = "The \"questions\" field must contain 3 to 4 internal \
research queries that you yourself should investigate to deepen and verify your answer. \
They are not clarifying questions for the user; never ask the user anything there.";

fn project_state(context: &ProjectContext) -> String {
    let todos = serde_json::to_string(&context.todos).unwrap_or_else(|_| "[]".to_string());
    let materials =
        serde_json::to_string(&context.materials).unwrap_or_else(|_| "[]".to_string());
    format!(
        "The project's current checklist is: {todos}\n\
         The project's current materials list is: {materials}\n\
         Do not suggest steps or materials that are already on these lists."
    )
}

/// Instructions that fix the assistant's persona and output contract, with the
/// live checklist and materials appended on every call.
#[must_use]
pub fn project_planner_instructions() -> Vec<InstructionParam<ProjectContext>> {
    vec![
        PERSONA.into(),
        OUTPUT_CONTRACT.into(),
        RESEARCH_QUESTIONS.into(),
        InstructionParam::Func(project_state),
    ]
}

#[must_use]
pub fn build_instruction(context: &ProjectContext) -> String {
    get_prompt(&project_planner_instructions(), context)
}
