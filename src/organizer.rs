use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::OrganizerError;
use crate::modules::collapse::CollapseState;
use crate::modules::drag::{DropCommand, GroupReorder};
use crate::modules::grouping;
use crate::registration::ComponentRegistration;
use crate::settings::{OrganizerConfig, StorageKeys};
use crate::state::{ContainerId, OrganizerState};
use crate::storage::Storage;

/// Banner text shown while running without persistence.
pub const STORAGE_WARNING: &str =
    "Local storage is not available. Your changes will not be saved between sessions.";

const REQUIRED_KEYS: [&str; 3] = ["components", "groups", "ungroupedComponentIds"];

/// Parses a persisted blob, rejecting anything that is not an object
/// carrying all three top-level keys.
pub fn parse_persisted(raw: &str) -> Result<OrganizerState, String> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    let object = value
        .as_object()
        .ok_or_else(|| "persisted state is not an object".to_string())?;
    if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !object.contains_key(**k)) {
        return Err(format!("missing key '{}'", missing));
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Owns the current grouping state and the view's collapse flags.
///
/// Each operation builds a replacement state, swaps it in whole and then
/// writes it to storage. A failed write is logged and remembered but the
/// new state stays in effect.
///
/// Readers never block. Writers are serialized by `writer`, so each
/// replacement is built from the one before it and writes reach storage
/// in the same order.
pub struct Organizer {
    state: ArcSwap<OrganizerState>,
    collapse: ArcSwap<CollapseState>,
    storage: Arc<dyn Storage>,
    registration: ComponentRegistration,
    keys: StorageKeys,
    persistent: bool,
    writer: Mutex<()>,
    // Failed writes by storage key, cleared when that key is written again.
    persist_errors: DashMap<String, String>,
}

impl Organizer {
    pub fn open(
        config: &OrganizerConfig,
        registration: ComponentRegistration,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let keys = config.storage_keys.clone();
        let persistent = storage.probe();

        let (state, collapse) = if persistent {
            let state = Self::load_state(storage.as_ref(), &keys, &registration);
            let collapse = Self::load_collapse(storage.as_ref(), &keys).retain_groups_of(&state);
            (state, collapse)
        } else {
            log::warn!("[Organizer] Storage unavailable, running in memory only");
            (registration.default_state(), CollapseState::default())
        };

        log::info!(
            "[Organizer] Loaded {} components in {} groups",
            state.components.len(),
            state.groups.len()
        );

        let organizer = Self {
            state: ArcSwap::from_pointee(state),
            collapse: ArcSwap::from_pointee(collapse),
            storage,
            registration,
            keys,
            persistent,
            writer: Mutex::new(()),
            persist_errors: DashMap::new(),
        };
        organizer.persist_state(&organizer.state.load());
        organizer
    }

    fn load_state(
        storage: &dyn Storage,
        keys: &StorageKeys,
        registration: &ComponentRegistration,
    ) -> OrganizerState {
        let raw = match storage.load(&keys.component_groups) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::info!("[Organizer] No saved state found, using default state");
                return registration.default_state();
            }
            Err(e) => {
                log::error!("[Organizer] Failed to read saved state: {}, using default state", e);
                return registration.default_state();
            }
        };

        match parse_persisted(&raw) {
            Ok(state) => {
                let violations = state.invariant_violations();
                let state = if violations.is_empty() {
                    state
                } else {
                    log::warn!("[Organizer] Repairing saved state: {:?}", violations);
                    state.repaired()
                };
                registration.merge_into(&state)
            }
            Err(reason) => {
                log::warn!(
                    "[Organizer] Invalid state structure in storage ({}), using default state",
                    reason
                );
                registration.default_state()
            }
        }
    }

    fn load_collapse(storage: &dyn Storage, keys: &StorageKeys) -> CollapseState {
        let read = |key: &str| match storage.load(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("[Organizer] Failed to read '{}': {}", key, e);
                None
            }
        };
        CollapseState::decode(
            read(&keys.ungrouped_collapsed).as_deref(),
            read(&keys.collapsed_groups).as_deref(),
        )
    }

    // --- Snapshots ---

    pub fn state(&self) -> Arc<OrganizerState> {
        self.state.load_full()
    }

    pub fn collapse(&self) -> Arc<CollapseState> {
        self.collapse.load_full()
    }

    pub fn container_of(&self, component_id: &str) -> Option<ContainerId> {
        self.state.load().container_of(component_id)
    }

    /// False when the storage probe failed at startup.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn storage_warning(&self) -> Option<&'static str> {
        (!self.persistent).then_some(STORAGE_WARNING)
    }

    /// An outstanding write failure, the grouping state's key first.
    ///
    /// A failure only clears once the same key is written successfully.
    pub fn last_persist_error(&self) -> Option<String> {
        self.persist_errors
            .get(&self.keys.component_groups)
            .map(|e| e.value().clone())
            .or_else(|| self.persist_errors.iter().next().map(|e| e.value().clone()))
    }

    fn write_lock(&self) -> MutexGuard<'_, ()> {
        // The guarded unit holds no data, so a poisoned lock is still usable.
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }

    // --- Grouping operations ---

    fn apply<F>(&self, op: &str, f: F) -> Result<Arc<OrganizerState>, OrganizerError>
    where
        F: FnOnce(&OrganizerState) -> Result<OrganizerState, OrganizerError>,
    {
        let _writer = self.write_lock();
        let current = self.state.load_full();
        let next = f(current.as_ref()).map_err(|e| {
            log::warn!("[Organizer] {} rejected: {}", op, e);
            e
        })?;

        if cfg!(debug_assertions) {
            let violations = next.invariant_violations();
            if !violations.is_empty() {
                log::error!("[Organizer] {} broke membership rules: {:?}", op, violations);
            }
        }

        let next = Arc::new(next);
        self.state.store(next.clone());
        log::debug!("[Organizer] Applied {}", op);
        self.persist_state(&next);
        Ok(next)
    }

    pub fn move_component(
        &self,
        component_id: &str,
        from_container_id: &str,
        to_container_id: &str,
        to_index: usize,
    ) -> Result<Arc<OrganizerState>, OrganizerError> {
        let from = ContainerId::from(from_container_id);
        let to = ContainerId::from(to_container_id);
        self.apply("move_component", |state| {
            grouping::move_component(state, component_id, &from, &to, to_index)
        })
    }

    pub fn apply_drop(&self, command: &DropCommand) -> Result<Arc<OrganizerState>, OrganizerError> {
        self.apply("apply_drop", |state| {
            grouping::move_component(
                state,
                &command.component_id,
                &command.from,
                &command.to,
                command.to_index,
            )
        })
    }

    /// Returns the new group's id.
    pub fn create_group(&self, name: &str) -> Result<String, OrganizerError> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut id = String::new();
        self.apply("create_group", |state| {
            id = grouping::next_group_id(state, now);
            grouping::create_group(state, &id, name)
        })?;
        Ok(id)
    }

    pub fn delete_group(&self, group_id: &str) -> Result<Arc<OrganizerState>, OrganizerError> {
        let next = self.apply("delete_group", |state| grouping::delete_group(state, group_id))?;

        let _writer = self.write_lock();
        let collapse = self.collapse.load_full();
        if collapse.is_group_collapsed(group_id) {
            let pruned = collapse.retain_groups_of(&next);
            self.persist_collapse_groups(&pruned);
            self.collapse.store(Arc::new(pruned));
        }
        Ok(next)
    }

    pub fn rename_group(
        &self,
        group_id: &str,
        new_name: &str,
    ) -> Result<Arc<OrganizerState>, OrganizerError> {
        self.apply("rename_group", |state| {
            grouping::rename_group(state, group_id, new_name)
        })
    }

    pub fn reorder_groups(
        &self,
        from_index: usize,
        to_index: usize,
    ) -> Result<Arc<OrganizerState>, OrganizerError> {
        self.apply("reorder_groups", |state| {
            grouping::reorder_groups(state, from_index, to_index)
        })
    }

    pub fn apply_group_reorder(
        &self,
        reorder: GroupReorder,
    ) -> Result<Arc<OrganizerState>, OrganizerError> {
        self.reorder_groups(reorder.from_index, reorder.to_index)
    }

    /// Back to the registration default: every component ungrouped.
    pub fn reset(&self) -> Arc<OrganizerState> {
        let _writer = self.write_lock();
        let next = Arc::new(self.registration.default_state());
        self.state.store(next.clone());
        log::info!("[Organizer] Reset to default state");
        self.persist_state(&next);

        let collapse = self.collapse.load_full().retain_groups_of(&next);
        self.persist_collapse_groups(&collapse);
        self.collapse.store(Arc::new(collapse));
        next
    }

    // --- Collapse flags ---

    pub fn is_group_collapsed(&self, group_id: &str) -> bool {
        self.collapse.load().is_group_collapsed(group_id)
    }

    pub fn is_ungrouped_collapsed(&self) -> bool {
        self.collapse.load().ungrouped_collapsed
    }

    /// Returns the group's new collapsed flag.
    pub fn toggle_group_collapsed(&self, group_id: &str) -> bool {
        let _writer = self.write_lock();
        let next = self.collapse.load().toggle_group(group_id);
        let collapsed = next.is_group_collapsed(group_id);
        self.persist_collapse_groups(&next);
        self.collapse.store(Arc::new(next));
        collapsed
    }

    pub fn toggle_ungrouped_collapsed(&self) -> bool {
        let _writer = self.write_lock();
        let next = self.collapse.load().toggle_ungrouped();
        let collapsed = next.ungrouped_collapsed;
        if self.persistent {
            let result = self
                .storage
                .save(&self.keys.ungrouped_collapsed, &next.encode_ungrouped())
                .map_err(|e| e.to_string());
            self.record_persist(&self.keys.ungrouped_collapsed, result);
        }
        self.collapse.store(Arc::new(next));
        collapsed
    }

    // --- Persistence ---

    fn persist_state(&self, state: &OrganizerState) {
        if !self.persistent {
            return;
        }
        let result = serde_json::to_string(state)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.storage
                    .save(&self.keys.component_groups, &json)
                    .map_err(|e| e.to_string())
            });
        self.record_persist(&self.keys.component_groups, result);
    }

    fn persist_collapse_groups(&self, collapse: &CollapseState) {
        if !self.persistent {
            return;
        }
        let result = self
            .storage
            .save(&self.keys.collapsed_groups, &collapse.encode_groups())
            .map_err(|e| e.to_string());
        self.record_persist(&self.keys.collapsed_groups, result);
    }

    fn record_persist(&self, key: &str, result: Result<(), String>) {
        match result {
            Ok(()) => {
                self.persist_errors.remove(key);
            }
            Err(e) => {
                log::error!("[Organizer] Failed to save '{}': {}", key, e);
                self.persist_errors.insert(key.to_string(), e);
            }
        }
    }
}
