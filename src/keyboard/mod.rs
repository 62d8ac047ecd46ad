pub mod display;
pub mod finger;
pub mod graph;
pub mod key;
pub mod layout;

pub use finger::{Finger, FingerId, Hand};
pub use graph::KeyGraph;
pub use key::KeyId;
pub use layout::{KeyboardLayout, LayoutError};
