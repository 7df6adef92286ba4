use crate::models::{Material, Project, Todo};
use serde::{Deserialize, Serialize};

/// Read-only snapshot of a project's checklist and materials, resent by the
/// caller with every chat message. Missing fields default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectContext {
    pub todos: Vec<TodoSnapshot>,
    pub materials: Vec<MaterialSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoSnapshot {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSnapshot {
    pub id: u64,
    pub name: String,
    pub quantity: String,
    pub cost: f64,
}

impl From<&Todo> for TodoSnapshot {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            text: todo.text.clone(),
            completed: todo.completed,
        }
    }
}

impl From<&Material> for MaterialSnapshot {
    fn from(material: &Material) -> Self {
        Self {
            id: material.id,
            name: material.name.clone(),
            quantity: material.quantity.clone(),
            cost: material.cost,
        }
    }
}

impl From<&Project> for ProjectContext {
    fn from(project: &Project) -> Self {
        Self {
            todos: project.todos.iter().map(TodoSnapshot::from).collect(),
            materials: project.materials.iter().map(MaterialSnapshot::from).collect(),
        }
    }
}
