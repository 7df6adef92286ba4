use super::{AppState, AuthUser, JsonBody, PathParams};
use crate::{
    models::{Material, Project, Todo},
    HubError,
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

const PROJECT_NOT_FOUND: &str = "Project not found";

#[derive(Deserialize)]
pub struct NewProject {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
pub struct NewMaterial {
    #[serde(default)]
    name: String,
    #[serde(default)]
    quantity: Value,
    #[serde(default)]
    cost: Value,
}

pub async fn list_projects_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<Vec<Project>> {
    let projects = state
        .store
        .read(|db| {
            db.projects
                .iter()
                .filter(|project| project.user_id == user.id)
                .cloned()
                .collect()
        })
        .await;
    Json(projects)
}

pub async fn create_project_handler(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<NewProject>,
) -> Result<(StatusCode, Json<Project>), HubError> {
    let name = required(&body.name, "Project name is required")?;

    let project = state
        .store
        .update(|db| {
            let project = Project {
                id: db.next_id(),
                user_id: user.id,
                name,
                todos: Vec::new(),
                materials: Vec::new(),
                created_at: Utc::now(),
            };
            db.projects.push(project.clone());
            Ok::<_, HubError>(project)
        })
        .await?;

    tracing::info!(user_id = user.id, project_id = project.id, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn delete_project_handler(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(project_id): PathParams<u64>,
) -> Result<StatusCode, HubError> {
    state
        .store
        .update(|db| {
            let index = db
                .projects
                .iter()
                .position(|project| project.id == project_id && project.user_id == user.id)
                .ok_or_else(|| HubError::NotFound(PROJECT_NOT_FOUND.to_string()))?;
            db.projects.remove(index);
            Ok::<_, HubError>(())
        })
        .await?;

    tracing::info!(user_id = user.id, project_id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_todo_handler(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(project_id): PathParams<u64>,
    JsonBody(body): JsonBody<NewTodo>,
) -> Result<Json<Project>, HubError> {
    let text = required(&body.text, "Todo text is required")?;

    let project = state
        .store
        .update(|db| {
            let id = db.next_id();
            let project = db
                .find_project_mut(user.id, project_id)
                .ok_or_else(|| HubError::NotFound(PROJECT_NOT_FOUND.to_string()))?;
            project.todos.push(Todo {
                id,
                text,
                completed: false,
            });
            Ok::<_, HubError>(project.clone())
        })
        .await?;

    Ok(Json(project))
}

pub async fn toggle_todo_handler(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams((project_id, todo_id)): PathParams<(u64, u64)>,
) -> Result<Json<Project>, HubError> {
    let project = state
        .store
        .update(|db| {
            let project = db
                .find_project_mut(user.id, project_id)
                .ok_or_else(|| HubError::NotFound(PROJECT_NOT_FOUND.to_string()))?;
            let todo = project
                .todos
                .iter_mut()
                .find(|todo| todo.id == todo_id)
                .ok_or_else(|| HubError::NotFound("Todo not found".to_string()))?;
            todo.completed = !todo.completed;
            Ok::<_, HubError>(project.clone())
        })
        .await?;

    Ok(Json(project))
}

pub async fn add_material_handler(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(project_id): PathParams<u64>,
    JsonBody(body): JsonBody<NewMaterial>,
) -> Result<Json<Project>, HubError> {
    let name = required(&body.name, "Material name is required")?;
    let quantity = quantity_text(&body.quantity)?;
    let cost = parse_cost(&body.cost)?;

    let project = state
        .store
        .update(|db| {
            let id = db.next_id();
            let project = db
                .find_project_mut(user.id, project_id)
                .ok_or_else(|| HubError::NotFound(PROJECT_NOT_FOUND.to_string()))?;
            project.materials.push(Material {
                id,
                name,
                quantity,
                cost,
            });
            Ok::<_, HubError>(project.clone())
        })
        .await?;

    Ok(Json(project))
}

fn required(value: &str, message: &str) -> Result<String, HubError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(HubError::BadRequest(message.to_string()));
    }
    Ok(value.to_string())
}

fn quantity_text(value: &Value) -> Result<String, HubError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(text) => Ok(text.trim().to_string()),
        Value::Number(number) => Ok(number.to_string()),
        _ => Err(HubError::BadRequest(
            "Quantity must be text or a number".to_string(),
        )),
    }
}

/// Cost arrives as a number or a numeric string; blank means zero.
fn parse_cost(value: &Value) -> Result<f64, HubError> {
    let invalid = || HubError::BadRequest("Cost must be a number".to_string());
    let cost = match value {
        Value::Null => 0.0,
        Value::Number(number) => number.as_f64().ok_or_else(invalid)?,
        Value::String(text) if text.trim().is_empty() => 0.0,
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    if cost.is_finite() {
        Ok(cost)
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_cost_accepts_numbers_and_numeric_strings() {
        assert!((parse_cost(&json!(12.5)).unwrap() - 12.5).abs() < f64::EPSILON);
        assert!((parse_cost(&json!(" 3.25 ")).unwrap() - 3.25).abs() < f64::EPSILON);
        assert!(parse_cost(&json!("")).unwrap().abs() < f64::EPSILON);
        assert!(parse_cost(&Value::Null).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn parse_cost_rejects_garbage() {
        assert!(matches!(
            parse_cost(&json!("cheap")),
            Err(HubError::BadRequest(_))
        ));
        assert!(matches!(parse_cost(&json!("NaN")), Err(HubError::BadRequest(_))));
        assert!(matches!(parse_cost(&json!([1])), Err(HubError::BadRequest(_))));
    }

    #[test]
    fn quantity_accepts_numbers() {
        assert_eq!(quantity_text(&json!(4)).unwrap(), "4");
        assert_eq!(quantity_text(&json!(" 2 boxes ")).unwrap(), "2 boxes");
    }
}
