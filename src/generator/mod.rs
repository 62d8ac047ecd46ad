pub mod dictionary;
pub mod words;

use crate::keyboard::layout::KeyboardLayout;

pub use words::WordLesson;

/// Source of lesson text. Everything it produces must be typeable on `layout`.
pub trait TextGenerator {
    fn generate(&mut self, layout: &KeyboardLayout, word_count: usize) -> String;
}
