// Module exports for pure logic
pub mod grouping;   // Group/membership transitions
pub mod collapse;   // Collapse/expand view flags
pub mod drag;       // Drop resolution and group hover gestures
pub mod todos;      // Demo host records and callbacks
