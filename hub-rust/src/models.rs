//! Entities persisted in the JSON data file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a [`User`], without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: u64,
    pub email: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub user_id: u64,
    pub name: String,
    #[serde(default)]
    pub todos: Vec<Todo>,
    #[serde(default)]
    pub materials: Vec<Material>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub user_id: u64,
    pub user_email: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// The whole data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Database {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub posts: Vec<Post>,
    pub last_id: u64,
}

impl Database {
    /// Next identifier: the current time in milliseconds, bumped past the last
    /// issued id when the clock has not advanced.
    pub fn next_id(&mut self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let id = now.max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }

    /// Find a user by email, ignoring case and surrounding whitespace.
    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        let email = normalize_email(email);
        self.users.iter().find(|user| user.email == email)
    }

    pub fn find_project(&self, user_id: u64, project_id: u64) -> Option<&Project> {
        self.projects
            .iter()
            .find(|project| project.id == project_id && project.user_id == user_id)
    }

    pub fn find_project_mut(&mut self, user_id: u64, project_id: u64) -> Option<&mut Project> {
        self.projects
            .iter_mut()
            .find(|project| project.id == project_id && project.user_id == user_id)
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
