// Component Organizer Library Entry Point
// Grouping state for the component library dev tool, plus the storage
// and drag-and-drop plumbing around it.

pub mod error;
pub mod organizer;
pub mod registration;
pub mod settings;
pub mod state;
pub mod storage;

// Pure logic modules (no storage access)
pub mod modules;

pub use error::{OrganizerError, StorageError};
pub use organizer::{Organizer, STORAGE_WARNING};
pub use registration::ComponentRegistration;
pub use settings::OrganizerConfig;
pub use state::{ComponentDescriptor, ContainerId, Group, OrganizerState};
