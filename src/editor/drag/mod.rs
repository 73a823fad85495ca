//! Drag trackers for the editor
//!
//! Each tracker owns the transient state of one interaction and knows how to
//! commit it to the level. Nothing here touches the level until `commit`.
//!
//! - `MoveTracker`: drag-move of selected vertices/entities
//! - `BoxSelectTracker`: rubber-band selection
//! - `CutTracker`: cut-point preview over a candidate edge set
//! - `RotateTracker`: snapped rotation of selected entities

mod box_select;
mod cut_tracker;
mod move_tracker;
mod rotate_tracker;

pub use box_select::BoxSelectTracker;
pub use cut_tracker::{CutPreview, CutTracker};
pub use move_tracker::MoveTracker;
pub use rotate_tracker::RotateTracker;

/// The left-button drag running in Select mode
#[derive(Debug, Clone, Default)]
pub enum ActiveDrag {
    /// No drag in progress
    #[default]
    None,
    /// Moving the selection
    Move(MoveTracker),
    /// Box selection rectangle
    BoxSelect(BoxSelectTracker),
}

impl ActiveDrag {
    /// Follow the (snapped) cursor
    pub fn update(&mut self, snapped_mouse: crate::math::Vec2) {
        match self {
            ActiveDrag::None => {}
            ActiveDrag::Move(tracker) => tracker.current = snapped_mouse,
            ActiveDrag::BoxSelect(tracker) => tracker.current = snapped_mouse,
        }
    }
}
