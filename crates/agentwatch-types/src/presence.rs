//! Presence state carried between evaluations.

use serde::{Deserialize, Serialize};

use crate::ActivityRecord;

/// Latched activity plus visibility, re-derived on every evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceState {
    pub latched_activity: Option<ActivityRecord>,
    pub visible: bool,
}

impl PresenceState {
    pub fn view(&self) -> PresenceView {
        PresenceView {
            visible: self.visible,
            activity: self.latched_activity.clone(),
        }
    }
}

/// What the rendering layer receives.
///
/// `activity` is the latched activity even while hidden; renderers gate on
/// `visible`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceView {
    pub visible: bool,
    pub activity: Option<ActivityRecord>,
}
