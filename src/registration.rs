// Registration table: the ordered list of demoable components that seeds
// the organizer's default state.

use std::collections::{BTreeMap, HashSet};

use crate::settings::OrganizerConfig;
use crate::state::{ComponentDescriptor, OrganizerState};

#[derive(Debug, Clone)]
pub struct ComponentRegistration {
    components: Vec<ComponentDescriptor>,
}

impl ComponentRegistration {
    /// Builds a table; a repeated id keeps its first registration.
    pub fn new(components: Vec<ComponentDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let components = components
            .into_iter()
            .filter(|c| {
                let fresh = seen.insert(c.id.clone());
                if !fresh {
                    log::warn!("[Registration] Ignoring duplicate component id '{}'", c.id);
                }
                fresh
            })
            .collect();
        Self { components }
    }

    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }

    pub fn descriptor_map(&self) -> BTreeMap<String, ComponentDescriptor> {
        self.components
            .iter()
            .map(|c| (c.id.clone(), c.clone()))
            .collect()
    }

    /// Everything ungrouped, in registration order.
    pub fn default_state(&self) -> OrganizerState {
        OrganizerState {
            components: self.descriptor_map(),
            groups: Vec::new(),
            ungrouped_component_ids: self.components.iter().map(|c| c.id.clone()).collect(),
        }
    }

    /// Adds components registered after `state` was persisted.
    ///
    /// New ids are appended to the ungrouped sequence in registration order.
    /// Descriptors already in `state` are left as they are.
    pub fn merge_into(&self, state: &OrganizerState) -> OrganizerState {
        let mut next = state.clone();
        for component in &self.components {
            if !next.components.contains_key(&component.id) {
                log::info!("[Registration] Adding newly registered component '{}'", component.id);
                next.components.insert(component.id.clone(), component.clone());
                next.ungrouped_component_ids.push(component.id.clone());
            }
        }
        next
    }
}

/// The to-do demo components shipped with the component library.
pub fn todo_components(config: &OrganizerConfig) -> ComponentRegistration {
    ComponentRegistration::new(vec![
        ComponentDescriptor::new(
            "todolist",
            "TodoList",
            &config.component_route("todolist"),
            "A component for managing and displaying a list of todo items",
        ),
        ComponentDescriptor::new(
            "addtodoform",
            "AddTodoForm",
            &config.component_route("addtodoform"),
            "A form component for adding new todo items",
        ),
        ComponentDescriptor::new(
            "todoitem",
            "TodoItem",
            &config.component_route("todoitem"),
            "A component for displaying and managing individual todo items",
        ),
        ComponentDescriptor::new(
            "todosummary",
            "TodoSummary",
            &config.component_route("todosummary"),
            "A component that shows todo completion statistics",
        ),
    ])
}
