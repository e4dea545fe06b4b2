// Shared organizer data model.
// Plain serde structs, persisted verbatim under the component groups key.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Container id used by the drag surface for the ungrouped sequence.
pub const UNGROUPED: &str = "ungrouped";

/// Static metadata for a demoable UI component.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub id: String,
    pub name: String,
    pub path: String,
    pub description: String,
}

impl ComponentDescriptor {
    pub fn new(id: &str, name: &str, path: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            path: path.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub component_ids: Vec<String>,
}

/// Either the ungrouped sequence or one group's member sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContainerId {
    Ungrouped,
    Group(String),
}

impl ContainerId {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ungrouped => UNGROUPED,
            Self::Group(id) => id,
        }
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        if id == UNGROUPED {
            Self::Ungrouped
        } else {
            Self::Group(id.to_string())
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The whole grouping state.
///
/// Every id in `components` lives in exactly one container. Values are
/// never mutated once published; operations build a replacement.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerState {
    pub components: BTreeMap<String, ComponentDescriptor>,
    pub groups: Vec<Group>,
    pub ungrouped_component_ids: Vec<String>,
}

impl OrganizerState {
    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn group_index(&self, group_id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.id == group_id)
    }

    /// Member sequence of a container, `None` for an unknown group.
    pub fn container(&self, container: &ContainerId) -> Option<&[String]> {
        match container {
            ContainerId::Ungrouped => Some(&self.ungrouped_component_ids),
            ContainerId::Group(id) => self.group(id).map(|g| g.component_ids.as_slice()),
        }
    }

    /// Which container currently holds `component_id`.
    pub fn container_of(&self, component_id: &str) -> Option<ContainerId> {
        if self.ungrouped_component_ids.iter().any(|id| id == component_id) {
            return Some(ContainerId::Ungrouped);
        }
        self.groups
            .iter()
            .find(|g| g.component_ids.iter().any(|id| id == component_id))
            .map(|g| ContainerId::Group(g.id.clone()))
    }

    /// Number of ids placed across all containers (duplicates counted).
    pub fn placed_count(&self) -> usize {
        self.ungrouped_component_ids.len()
            + self.groups.iter().map(|g| g.component_ids.len()).sum::<usize>()
    }

    /// Describes every broken membership rule. Empty means the state is valid.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut group_ids: HashSet<&str> = HashSet::new();

        for (key, descriptor) in &self.components {
            if key != &descriptor.id {
                violations.push(format!("component key '{}' holds descriptor '{}'", key, descriptor.id));
            }
        }

        for group in &self.groups {
            if group.id == UNGROUPED {
                violations.push(format!("group id '{}' is reserved", UNGROUPED));
            } else if !group_ids.insert(group.id.as_str()) {
                violations.push(format!("duplicate group id '{}'", group.id));
            }
        }

        let placed = self
            .ungrouped_component_ids
            .iter()
            .map(|id| (UNGROUPED, id))
            .chain(
                self.groups
                    .iter()
                    .flat_map(|g| g.component_ids.iter().map(move |id| (g.id.as_str(), id))),
            );

        for (container, id) in placed {
            if !self.components.contains_key(id) {
                violations.push(format!("unknown component '{}' in '{}'", id, container));
            } else if !seen.insert(id.as_str()) {
                violations.push(format!("component '{}' placed more than once", id));
            }
        }

        for id in self.components.keys() {
            if !seen.contains(id.as_str()) {
                violations.push(format!("component '{}' is in no container", id));
            }
        }

        violations
    }

    /// Returns a copy satisfying the membership rules.
    ///
    /// Unknown ids are dropped, repeated ids keep their first placement
    /// and unplaced components are appended to the ungrouped sequence.
    /// Members of a group that cannot be addressed (a repeated id, or the
    /// reserved `ungrouped` id) also return to the ungrouped sequence.
    pub fn repaired(&self) -> OrganizerState {
        let mut seen: HashSet<String> = HashSet::new();
        let mut keep = |id: &str| self.components.contains_key(id) && seen.insert(id.to_string());

        let ungrouped: Vec<String> = self
            .ungrouped_component_ids
            .iter()
            .filter(|id| keep(id.as_str()))
            .cloned()
            .collect();

        let mut group_ids: HashSet<String> = HashSet::new();
        let mut groups = Vec::with_capacity(self.groups.len());
        let mut orphans = Vec::new();
        for group in &self.groups {
            let members: Vec<String> = group
                .component_ids
                .iter()
                .filter(|id| keep(id.as_str()))
                .cloned()
                .collect();
            if group.id != UNGROUPED && group_ids.insert(group.id.clone()) {
                groups.push(Group {
                    id: group.id.clone(),
                    name: group.name.clone(),
                    component_ids: members,
                });
            } else {
                // Reserved or repeated group ids cannot be addressed; members go back to ungrouped.
                orphans.extend(members);
            }
        }

        let mut ungrouped_component_ids = ungrouped;
        ungrouped_component_ids.extend(orphans);
        for id in self.components.keys() {
            if !seen.contains(id) {
                ungrouped_component_ids.push(id.clone());
            }
        }

        // Containers refer to map keys, so the key wins over the stored id.
        let components = self
            .components
            .iter()
            .map(|(key, descriptor)| {
                let descriptor = ComponentDescriptor {
                    id: key.clone(),
                    ..descriptor.clone()
                };
                (key.clone(), descriptor)
            })
            .collect();

        OrganizerState {
            components,
            groups,
            ungrouped_component_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn descriptor(id: &str) -> ComponentDescriptor {
        ComponentDescriptor::new(id, id, &format!("/components/{}", id), "")
    }

    fn state(ungrouped: &[&str], groups: &[(&str, &[&str])]) -> OrganizerState {
        let mut components = BTreeMap::new();
        for id in ["a", "b", "c"] {
            components.insert(id.to_string(), descriptor(id));
        }
        OrganizerState {
            components,
            groups: groups
                .iter()
                .map(|(id, members)| Group {
                    id: id.to_string(),
                    name: id.to_string(),
                    component_ids: members.iter().map(|m| m.to_string()).collect(),
                })
                .collect(),
            ungrouped_component_ids: ungrouped.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_valid_state_has_no_violations() {
        let s = state(&["a"], &[("g1", &["b", "c"])]);
        assert!(s.invariant_violations().is_empty());
        assert_eq!(s.container_of("b"), Some(ContainerId::Group("g1".into())));
        assert_eq!(s.container_of("a"), Some(ContainerId::Ungrouped));
        assert_eq!(s.container_of("zzz"), None);
    }

    #[rstest]
    #[case::missing(state(&["a"], &[("g1", &["b"])]))]
    #[case::duplicate(state(&["a", "b", "c"], &[("g1", &["b"])]))]
    #[case::unknown(state(&["a", "b", "c", "x"], &[]))]
    #[case::duplicate_group(state(&["a"], &[("g1", &["b"]), ("g1", &["c"])]))]
    #[case::reserved_group_id(state(&["a"], &[("ungrouped", &["b", "c"])]))]
    fn test_violations_detected_and_repaired(#[case] broken: OrganizerState) {
        assert!(!broken.invariant_violations().is_empty());
        let fixed = broken.repaired();
        assert!(fixed.invariant_violations().is_empty(), "{:?}", fixed);
        assert_eq!(fixed.placed_count(), 3);
    }

    #[test]
    fn test_repair_keeps_first_placement_and_order() {
        let s = state(&["c", "a"], &[("g1", &["a", "b"])]);
        let fixed = s.repaired();
        assert_eq!(fixed.ungrouped_component_ids, vec!["c", "a"]);
        assert_eq!(fixed.groups[0].component_ids, vec!["b"]);
    }

    #[test]
    fn test_reserved_group_members_return_to_ungrouped() {
        let s = state(&["a"], &[("ungrouped", &["b"]), ("g1", &["c"])]);
        assert_eq!(s.invariant_violations(), vec!["group id 'ungrouped' is reserved"]);

        let fixed = s.repaired();
        assert_eq!(fixed.ungrouped_component_ids, vec!["a", "b"]);
        assert_eq!(fixed.groups.len(), 1);
        assert_eq!(fixed.groups[0].id, "g1");
        assert_eq!(fixed.container_of("b"), Some(ContainerId::Ungrouped));
    }

    #[test]
    fn test_component_key_must_match_descriptor_id() {
        let mut s = state(&["a", "b", "c"], &[]);
        s.components.insert("a".to_string(), descriptor("zzz"));
        assert_eq!(
            s.invariant_violations(),
            vec!["component key 'a' holds descriptor 'zzz'"]
        );

        let fixed = s.repaired();
        assert!(fixed.invariant_violations().is_empty());
        assert_eq!(fixed.components["a"].id, "a");
        assert_eq!(fixed.components["a"].path, "/components/zzz");
        assert_eq!(fixed.ungrouped_component_ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_json_layout_uses_camel_case() {
        let s = state(&["a", "b"], &[("g1", &["c"])]);
        let json: serde_json::Value = serde_json::to_value(&s).unwrap();
        assert!(json.get("ungroupedComponentIds").is_some());
        assert_eq!(json["groups"][0]["componentIds"][0], "c");
        assert_eq!(json["components"]["a"]["path"], "/components/a");
    }

    #[rstest]
    #[case("ungrouped", ContainerId::Ungrouped)]
    #[case("group-1", ContainerId::Group("group-1".into()))]
    fn test_container_id_from_str(#[case] raw: &str, #[case] expected: ContainerId) {
        let parsed = ContainerId::from(raw);
        assert_eq!(parsed, expected);
        assert_eq!(parsed.to_string(), raw);
    }
}
