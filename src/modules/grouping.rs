// Grouping transitions - pure logic, no storage access.
// Every function takes the current state by reference and returns the
// replacement, so a rejected operation leaves the caller's state untouched.

use crate::error::OrganizerError;
use crate::state::{ContainerId, Group, OrganizerState};

fn container_mut<'a>(
    state: &'a mut OrganizerState,
    container: &ContainerId,
) -> Option<&'a mut Vec<String>> {
    match container {
        ContainerId::Ungrouped => Some(&mut state.ungrouped_component_ids),
        ContainerId::Group(id) => state
            .groups
            .iter_mut()
            .find(|g| &g.id == id)
            .map(|g| &mut g.component_ids),
    }
}

/// Moves a component between (or within) containers.
///
/// Algorithm:
/// 1. Validate the component, both containers, and that the source holds the id
/// 2. Remove the id from the source sequence
/// 3. Insert into the target at `to_index`, clamped to the target's length
///
/// Moving within one container is a reorder; the id is never duplicated.
pub fn move_component(
    state: &OrganizerState,
    component_id: &str,
    from: &ContainerId,
    to: &ContainerId,
    to_index: usize,
) -> Result<OrganizerState, OrganizerError> {
    if !state.components.contains_key(component_id) {
        return Err(OrganizerError::ComponentNotFound(component_id.to_string()));
    }
    let source = state
        .container(from)
        .ok_or_else(|| OrganizerError::GroupNotFound(from.to_string()))?;
    if state.container(to).is_none() {
        return Err(OrganizerError::GroupNotFound(to.to_string()));
    }
    let source_index = source
        .iter()
        .position(|id| id == component_id)
        .ok_or_else(|| OrganizerError::ComponentNotInContainer {
            component: component_id.to_string(),
            container: from.to_string(),
        })?;

    let mut next = state.clone();

    if let Some(ids) = container_mut(&mut next, from) {
        ids.remove(source_index);
    }
    if let Some(ids) = container_mut(&mut next, to) {
        let index = to_index.min(ids.len());
        ids.insert(index, component_id.to_string());
    }

    Ok(next)
}

/// Appends an empty group. The name is stored trimmed.
pub fn create_group(
    state: &OrganizerState,
    group_id: &str,
    name: &str,
) -> Result<OrganizerState, OrganizerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(OrganizerError::EmptyGroupName);
    }

    let mut next = state.clone();
    next.groups.push(Group {
        id: group_id.to_string(),
        name: name.to_string(),
        component_ids: Vec::new(),
    });
    Ok(next)
}

/// Removes a group; its members are appended to the ungrouped sequence
/// in their existing order.
pub fn delete_group(
    state: &OrganizerState,
    group_id: &str,
) -> Result<OrganizerState, OrganizerError> {
    let index = state
        .group_index(group_id)
        .ok_or_else(|| OrganizerError::GroupNotFound(group_id.to_string()))?;

    let mut next = state.clone();
    let removed = next.groups.remove(index);
    next.ungrouped_component_ids.extend(removed.component_ids);
    Ok(next)
}

pub fn rename_group(
    state: &OrganizerState,
    group_id: &str,
    new_name: &str,
) -> Result<OrganizerState, OrganizerError> {
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return Err(OrganizerError::EmptyGroupName);
    }
    let index = state
        .group_index(group_id)
        .ok_or_else(|| OrganizerError::GroupNotFound(group_id.to_string()))?;

    let mut next = state.clone();
    next.groups[index].name = new_name.to_string();
    Ok(next)
}

/// Removes the group at `from_index` and reinserts it at `to_index`.
pub fn reorder_groups(
    state: &OrganizerState,
    from_index: usize,
    to_index: usize,
) -> Result<OrganizerState, OrganizerError> {
    let len = state.groups.len();
    for index in [from_index, to_index] {
        if index >= len {
            return Err(OrganizerError::GroupIndexOutOfBounds { index, len });
        }
    }

    let mut next = state.clone();
    let group = next.groups.remove(from_index);
    next.groups.insert(to_index, group);
    Ok(next)
}

/// Generates a group id that is not yet used in `state`.
pub fn next_group_id(state: &OrganizerState, now_millis: i64) -> String {
    let base = format!("group-{}", now_millis);
    if state.group(&base).is_none() {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}-{}", base, n);
        if state.group(&candidate).is_none() {
            return candidate;
        }
        n += 1;
    }
}
