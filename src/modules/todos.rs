// To-do records behind the demo hosts.
// The organizer never looks inside these; they only back the demos the
// registration table points at.

use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TodoSummary {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

/// Callbacks a demo host hands to the component it renders.
pub trait DemoHost {
    fn on_completed_change(&mut self, id: u64, completed: bool);
    fn on_delete(&mut self, id: u64);
    /// Returns the id of the new item, or `None` when the title is blank.
    fn on_submit(&mut self, title: &str) -> Option<u64>;
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct TodoList {
    pub todos: Vec<Todo>,
}

impl TodoList {
    /// The items every demo host starts with.
    pub fn sample() -> Self {
        let todo = |id, title: &str, completed| Todo {
            id,
            title: title.to_string(),
            completed,
        };
        Self {
            todos: vec![
                todo(1, "Learn React", false),
                todo(2, "Build awesome apps", true),
                todo(3, "Master TypeScript", false),
            ],
        }
    }

    pub fn delete_all_completed(&mut self) {
        self.todos.retain(|t| !t.completed);
    }

    pub fn summary(&self) -> TodoSummary {
        let completed = self.todos.iter().filter(|t| t.completed).count();
        TodoSummary {
            total: self.todos.len(),
            completed,
            remaining: self.todos.len() - completed,
        }
    }
}

impl DemoHost for TodoList {
    fn on_completed_change(&mut self, id: u64, completed: bool) {
        if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
            todo.completed = completed;
        }
    }

    fn on_delete(&mut self, id: u64) {
        self.todos.retain(|t| t.id != id);
    }

    fn on_submit(&mut self, title: &str) -> Option<u64> {
        let title = title.trim();
        if title.is_empty() {
            log::warn!("[Todos] Ignoring blank todo title");
            return None;
        }
        let id = self.todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        self.todos.push(Todo {
            id,
            title: title.to_string(),
            completed: false,
        });
        Some(id)
    }
}
