// Collapse/expand flags for the ungrouped container and each group.
// View-local state: it never touches membership, and bad stored values
// simply read back as "expanded".

use std::collections::BTreeSet;

use crate::state::OrganizerState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseState {
    pub ungrouped_collapsed: bool,
    pub collapsed_groups: BTreeSet<String>,
}

impl CollapseState {
    /// Restores flags from their stored encodings.
    ///
    /// The ungrouped flag is the literal string `true`; the group flags are
    /// a JSON array of group ids. Anything else means expanded.
    pub fn decode(ungrouped: Option<&str>, groups: Option<&str>) -> Self {
        let ungrouped_collapsed = ungrouped.map(|v| v.trim() == "true").unwrap_or(false);

        let collapsed_groups = match groups {
            Some(raw) => serde_json::from_str::<Vec<String>>(raw).unwrap_or_else(|e| {
                log::warn!("[Collapse] Ignoring unparsable collapsed groups: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        Self {
            ungrouped_collapsed,
            collapsed_groups: collapsed_groups.into_iter().collect(),
        }
    }

    pub fn encode_ungrouped(&self) -> String {
        self.ungrouped_collapsed.to_string()
    }

    pub fn encode_groups(&self) -> String {
        let ids: Vec<&String> = self.collapsed_groups.iter().collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn is_group_collapsed(&self, group_id: &str) -> bool {
        self.collapsed_groups.contains(group_id)
    }

    pub fn toggle_group(&self, group_id: &str) -> Self {
        let mut next = self.clone();
        if !next.collapsed_groups.remove(group_id) {
            next.collapsed_groups.insert(group_id.to_string());
        }
        next
    }

    pub fn toggle_ungrouped(&self) -> Self {
        Self {
            ungrouped_collapsed: !self.ungrouped_collapsed,
            collapsed_groups: self.collapsed_groups.clone(),
        }
    }

    /// Drops flags of groups that no longer exist.
    pub fn retain_groups_of(&self, state: &OrganizerState) -> Self {
        Self {
            ungrouped_collapsed: self.ungrouped_collapsed,
            collapsed_groups: self
                .collapsed_groups
                .iter()
                .filter(|id| state.group(id).is_some())
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Group;
    use rstest::rstest;

    #[rstest]
    #[case(None, false)]
    #[case(Some("true"), true)]
    #[case(Some("false"), false)]
    #[case(Some("TRUE"), false)]
    #[case(Some("garbage"), false)]
    fn test_decode_ungrouped(#[case] raw: Option<&str>, #[case] expected: bool) {
        assert_eq!(CollapseState::decode(raw, None).ungrouped_collapsed, expected);
    }

    #[rstest]
    #[case(None, &[])]
    #[case(Some(r#"["g1","g2"]"#), &["g1", "g2"])]
    #[case(Some(r#"{"g1":true}"#), &[])]
    #[case(Some("not json"), &[])]
    #[case(Some("[1,2]"), &[])]
    fn test_decode_groups(#[case] raw: Option<&str>, #[case] expected: &[&str]) {
        let state = CollapseState::decode(None, raw);
        let ids: Vec<&str> = state.collapsed_groups.iter().map(|s| s.as_str()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_toggle_and_encode() {
        let state = CollapseState::default()
            .toggle_group("g2")
            .toggle_group("g1")
            .toggle_ungrouped();

        assert!(state.is_group_collapsed("g1"));
        assert_eq!(state.encode_groups(), r#"["g1","g2"]"#);
        assert_eq!(state.encode_ungrouped(), "true");

        let state = state.toggle_group("g1").toggle_ungrouped();
        assert!(!state.is_group_collapsed("g1"));
        assert_eq!(state.encode_ungrouped(), "false");

        let restored = CollapseState::decode(
            Some(&state.encode_ungrouped()),
            Some(&state.encode_groups()),
        );
        assert_eq!(restored, state);
    }

    #[test]
    fn test_retain_groups_of() {
        let organizer = OrganizerState {
            groups: vec![Group {
                id: "g1".into(),
                name: "G1".into(),
                component_ids: vec![],
            }],
            ..OrganizerState::default()
        };
        let state = CollapseState::default().toggle_group("g1").toggle_group("gone");
        let kept = state.retain_groups_of(&organizer);
        assert!(kept.is_group_collapsed("g1"));
        assert!(!kept.is_group_collapsed("gone"));
    }
}
