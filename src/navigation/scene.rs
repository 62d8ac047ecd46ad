use std::collections::BTreeMap;

use serde::Serialize;

use crate::keyboard::finger::FingerId;
use crate::keyboard::key::KeyId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FingerState {
    Idle,
    Active,
    Inactive,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavigationRole {
    None,
    Target,
    Path,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PressResult {
    Neutral,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavigationArrow {
    None,
    Up,
    Down,
    Left,
    Right,
}

impl NavigationArrow {
    /// Direction of a one-step move between two grid cells.
    pub fn between(from: (usize, usize), to: (usize, usize)) -> Self {
        use std::cmp::Ordering::*;
        match (to.0.cmp(&from.0), to.1.cmp(&from.1)) {
            (Less, _) => NavigationArrow::Up,
            (Greater, _) => NavigationArrow::Down,
            (Equal, Less) => NavigationArrow::Left,
            (Equal, Greater) => NavigationArrow::Right,
            (Equal, Equal) => NavigationArrow::None,
        }
    }

    pub fn glyph(self) -> Option<char> {
        match self {
            NavigationArrow::None => None,
            NavigationArrow::Up => Some('↑'),
            NavigationArrow::Down => Some('↓'),
            NavigationArrow::Left => Some('←'),
            NavigationArrow::Right => Some('→'),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct KeyScene {
    pub visibility: Visibility,
    pub role: NavigationRole,
    pub press: PressResult,
    pub arrow: NavigationArrow,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FingerScene {
    pub state: FingerState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<BTreeMap<KeyId, KeyScene>>,
}

impl FingerScene {
    pub fn bare(state: FingerState) -> Self {
        Self { state, keys: None }
    }
}

/// Render-ready finger and key states. Rebuilt from scratch for every
/// progression change, never edited in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub fingers: BTreeMap<FingerId, FingerScene>,
}

impl ViewModel {
    /// Every finger idle, no key detail.
    pub fn idle() -> Self {
        Self {
            fingers: FingerId::ALL
                .iter()
                .map(|&finger| (finger, FingerScene::bare(FingerState::Idle)))
                .collect(),
        }
    }

    pub fn finger_state(&self, finger: FingerId) -> Option<FingerState> {
        self.fingers.get(&finger).map(|scene| scene.state)
    }

    /// Scene of `key`, wherever a finger carries detail for it.
    pub fn key(&self, key: KeyId) -> Option<&KeyScene> {
        self.fingers
            .values()
            .filter_map(|scene| scene.keys.as_ref())
            .find_map(|keys| keys.get(&key))
    }

    pub fn is_idle(&self) -> bool {
        self.fingers
            .values()
            .all(|scene| scene.state == FingerState::Idle && scene.keys.is_none())
    }
}
