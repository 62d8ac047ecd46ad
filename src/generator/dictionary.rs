use crate::keyboard::layout::KeyboardLayout;

const WORDS_EN: &str = include_str!("../../assets/words-en.json");

pub struct Dictionary {
    words: Vec<String>,
}

impl Dictionary {
    pub fn load() -> Self {
        let words: Vec<String> = serde_json::from_str(WORDS_EN).unwrap_or_default();

        let words = words
            .into_iter()
            .filter(|w| w.len() >= 2 && w.chars().all(|c| c.is_ascii_lowercase()))
            .collect();

        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words whose every character `layout` can produce.
    pub fn typeable_on(&self, layout: &KeyboardLayout) -> Vec<&str> {
        self.words
            .iter()
            .filter(|w| w.chars().all(|c| layout.can_type(c)))
            .map(String::as_str)
            .collect()
    }
}
