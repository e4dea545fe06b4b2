// Drag-and-drop gesture logic - pure functions, no state access.
// The view reports drag items, drop targets and pointer positions; these
// helpers turn them into commands for the organizer.

use crate::state::ContainerId;

/// Payload carried by a dragged component card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDragItem {
    pub component_id: String,
    pub source: ContainerId,
    pub source_index: usize,
}

/// A resolved component move, consumed by `Organizer::apply_drop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropCommand {
    pub component_id: String,
    pub from: ContainerId,
    pub to: ContainerId,
    pub to_index: usize,
}

/// Resolves a drop of `item` onto `target`.
///
/// `hover_index` is the card position under the pointer, or `None` when the
/// drop landed on the container body, which appends to the end. Dropping on
/// the body of the source container, or back onto its own slot, does nothing.
pub fn resolve_component_drop(
    item: &ComponentDragItem,
    target: &ContainerId,
    target_len: usize,
    hover_index: Option<usize>,
) -> Option<DropCommand> {
    let same_container = &item.source == target;
    let to_index = match hover_index {
        None if same_container => return None,
        None => target_len,
        Some(index) if same_container && index == item.source_index => return None,
        Some(index) => index,
    };

    Some(DropCommand {
        component_id: item.component_id.clone(),
        from: item.source.clone(),
        to: target.clone(),
        to_index,
    })
}

/// Vertical extent of the element under the pointer, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverRect {
    pub top: f64,
    pub bottom: f64,
}

impl HoverRect {
    fn middle(&self) -> f64 {
        (self.bottom - self.top) / 2.0
    }
}

/// Whether dragging group `drag_index` over group `hover_index` should swap them.
///
/// Moves only once the pointer crosses the hovered element's midpoint:
/// below it when dragging downwards, above it when dragging upwards.
pub fn crosses_midpoint(drag_index: usize, hover_index: usize, rect: HoverRect, client_y: f64) -> bool {
    if drag_index == hover_index {
        return false;
    }
    let hover_y = client_y - rect.top;
    let middle = rect.middle();

    if drag_index < hover_index && hover_y < middle {
        return false;
    }
    if drag_index > hover_index && hover_y > middle {
        return false;
    }
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupReorder {
    pub from_index: usize,
    pub to_index: usize,
}

/// Tracks a group while it is being dragged.
///
/// The dragged group's index follows each reorder it triggers, so repeated
/// hovers over the same target don't bounce it back and forth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDrag {
    index: usize,
}

impl GroupDrag {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn hover(&mut self, hover_index: usize, rect: HoverRect, client_y: f64) -> Option<GroupReorder> {
        if !crosses_midpoint(self.index, hover_index, rect, client_y) {
            return None;
        }
        let reorder = GroupReorder {
            from_index: self.index,
            to_index: hover_index,
        };
        self.index = hover_index;
        Some(reorder)
    }
}
