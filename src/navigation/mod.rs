//! Finger and key hints derived from the lesson state.

pub mod hints;
pub mod scene;

pub use hints::{ErrorKind, classify_error, derive_view_model};
pub use scene::{
    FingerScene, FingerState, KeyScene, NavigationArrow, NavigationRole, PressResult, ViewModel,
    Visibility,
};
