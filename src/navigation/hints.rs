use std::collections::{BTreeMap, BTreeSet};

use crate::keyboard::finger::{FingerId, Hand};
use crate::keyboard::key::KeyId;
use crate::keyboard::layout::KeyboardLayout;
use crate::navigation::scene::{
    FingerScene, FingerState, KeyScene, NavigationArrow, NavigationRole, PressResult, ViewModel,
    Visibility,
};
use crate::session::lesson::Attempt;
use crate::session::progression::ProgressionSnapshot;

/// How the last failed attempt relates to the fingers the target needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The right fingers moved, just to the wrong keys.
    InCluster,
    /// Some other set of fingers moved; these are marked incorrect.
    OutOfCluster(BTreeSet<FingerId>),
}

/// Classify a failed attempt against the target fingers. A successful or
/// missing attempt is no error at all.
pub fn classify_error(
    attempt: Option<&Attempt>,
    target_fingers: &BTreeSet<FingerId>,
    layout: &KeyboardLayout,
) -> Option<ErrorKind> {
    let attempt = attempt.filter(|a| !a.correct)?;
    let pressed: BTreeSet<FingerId> = attempt
        .pressed
        .iter()
        .filter_map(|&key| layout.finger_for_key(key))
        .collect();
    if &pressed == target_fingers {
        Some(ErrorKind::InCluster)
    } else {
        Some(ErrorKind::OutOfCluster(pressed))
    }
}

/// Build the view model for one progression snapshot.
///
/// Pure: the same snapshot and layout always give an equal result, and
/// nothing from a previous derivation is carried over.
pub fn derive_view_model(snapshot: &ProgressionSnapshot, layout: &KeyboardLayout) -> ViewModel {
    let Some(target) = snapshot.target.as_ref().filter(|_| snapshot.is_active()) else {
        return ViewModel::idle();
    };

    // Finger -> required keys it owns.
    let mut required: BTreeMap<FingerId, Vec<KeyId>> = BTreeMap::new();
    for &key in &target.keys {
        if let Some(finger) = layout.finger_for_key(key) {
            required.entry(finger).or_default().push(key);
        }
    }
    let target_fingers: BTreeSet<FingerId> = required.keys().copied().collect();

    let failed = snapshot.last_attempt.as_ref().filter(|a| !a.correct);
    let incorrect_fingers = match classify_error(failed, &target_fingers, layout) {
        Some(ErrorKind::OutOfCluster(fingers)) => fingers,
        Some(ErrorKind::InCluster) | None => BTreeSet::new(),
    };

    let active_hands: BTreeSet<Hand> = target_fingers
        .iter()
        .chain(incorrect_fingers.iter())
        .map(|finger| finger.hand)
        .collect();

    let pressed = failed.map(|a| &a.pressed);
    let press_result = |key: KeyId| match pressed {
        Some(pressed) if pressed.contains(&key) => PressResult::Incorrect,
        _ => PressResult::Neutral,
    };

    let mut fingers = BTreeMap::new();
    for finger in FingerId::ALL {
        let state = if incorrect_fingers.contains(&finger) {
            FingerState::Incorrect
        } else if target_fingers.contains(&finger) {
            FingerState::Active
        } else if active_hands.contains(&finger.hand) {
            FingerState::Idle
        } else {
            FingerState::Inactive
        };

        let keys = match (state, required.get(&finger)) {
            (FingerState::Active, Some(keys)) => {
                Some(cluster_detail(finger, keys, layout, &press_result))
            }
            // A required finger that is also marked incorrect still shows its
            // cluster and target, without a path.
            (_, Some(keys)) => Some(targets_only(finger, keys, layout, &press_result)),
            (_, None) => None,
        };
        fingers.insert(finger, FingerScene { state, keys });
    }

    ViewModel { fingers }
}

/// Full per-key detail for an active finger: the whole cluster visible, the
/// path from the home key marked with arrows, the required key as target.
fn cluster_detail(
    finger: FingerId,
    required: &[KeyId],
    layout: &KeyboardLayout,
    press_result: &impl Fn(KeyId) -> PressResult,
) -> BTreeMap<KeyId, KeyScene> {
    let path = match (layout.home_key(finger), required.first()) {
        (Some(home), Some(&goal)) => layout.graph().shortest_path(home, goal),
        _ => Vec::new(),
    };

    // Each non-final path key points at the key after it.
    let mut steps: BTreeMap<KeyId, NavigationArrow> = BTreeMap::new();
    for pair in path.windows(2) {
        let arrow = match (layout.position(pair[0]), layout.position(pair[1])) {
            (Some(from), Some(to)) => NavigationArrow::between(from, to),
            _ => NavigationArrow::None,
        };
        steps.entry(pair[0]).or_insert(arrow);
    }

    layout
        .cluster(finger)
        .iter()
        .map(|&key| {
            let (role, arrow) = if required.contains(&key) {
                (NavigationRole::Target, NavigationArrow::None)
            } else if let Some(&arrow) = steps.get(&key) {
                (NavigationRole::Path, arrow)
            } else {
                (NavigationRole::None, NavigationArrow::None)
            };
            let scene = KeyScene {
                visibility: Visibility::Visible,
                role,
                press: press_result(key),
                arrow,
            };
            (key, scene)
        })
        .collect()
}

fn targets_only(
    finger: FingerId,
    required: &[KeyId],
    layout: &KeyboardLayout,
    press_result: &impl Fn(KeyId) -> PressResult,
) -> BTreeMap<KeyId, KeyScene> {
    layout
        .cluster(finger)
        .iter()
        .map(|&key| {
            let role = if required.contains(&key) {
                NavigationRole::Target
            } else {
                NavigationRole::None
            };
            let scene = KeyScene {
                visibility: Visibility::Visible,
                role,
                press: press_result(key),
                arrow: NavigationArrow::None,
            };
            (key, scene)
        })
        .collect()
}
