use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::generator::TextGenerator;
use crate::generator::dictionary::Dictionary;
use crate::keyboard::layout::KeyboardLayout;

const FALLBACK_WORD: &str = "the";

/// Random words from the embedded dictionary, separated by single spaces.
pub struct WordLesson {
    dictionary: Dictionary,
    rng: SmallRng,
    capital_chance: f64,
}

impl WordLesson {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Same seed, same lesson.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            dictionary: Dictionary::load(),
            rng,
            capital_chance: 0.0,
        }
    }

    /// Capitalize each word with probability `chance`, so lessons also drill
    /// Shift chords. Capitals the layout cannot type are left lowercase.
    pub fn with_capitals(mut self, chance: f64) -> Self {
        self.capital_chance = chance.clamp(0.0, 1.0);
        self
    }

    fn capitalize(&mut self, word: &str, layout: &KeyboardLayout) -> String {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            return String::new();
        };
        let upper = first.to_ascii_uppercase();
        if self.capital_chance > 0.0
            && layout.can_type(upper)
            && self.rng.gen_bool(self.capital_chance)
        {
            std::iter::once(upper).chain(chars).collect()
        } else {
            word.to_string()
        }
    }
}

impl Default for WordLesson {
    fn default() -> Self {
        Self::new()
    }
}

impl TextGenerator for WordLesson {
    fn generate(&mut self, layout: &KeyboardLayout, word_count: usize) -> String {
        let candidates: Vec<String> = self
            .dictionary
            .typeable_on(layout)
            .into_iter()
            .map(str::to_string)
            .collect();
        if candidates.is_empty() {
            warn!(layout = layout.name(), "no dictionary word is typeable, using fallback");
        }

        let mut words = Vec::with_capacity(word_count);
        let mut last: Option<&str> = None;
        for _ in 0..word_count {
            let mut pick = candidates
                .choose(&mut self.rng)
                .map_or(FALLBACK_WORD, String::as_str);
            // Avoid the same word twice in a row when there is a choice.
            if candidates.len() > 1 && Some(pick) == last {
                pick = candidates
                    .choose(&mut self.rng)
                    .map_or(FALLBACK_WORD, String::as_str);
            }
            last = Some(pick);
            let word = self.capitalize(pick, layout);
            words.push(word);
        }
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qwerty() -> KeyboardLayout {
        KeyboardLayout::load_with_user_dir(None, "qwerty").unwrap()
    }

    #[test]
    fn test_word_count_and_spacing() {
        let text = WordLesson::seeded(7).generate(&qwerty(), 12);
        assert_eq!(text.split(' ').count(), 12);
        assert!(!text.contains("  "));
        assert!(!text.starts_with(' ') && !text.ends_with(' '));
    }

    #[test]
    fn test_seeded_lessons_repeat() {
        let layout = qwerty();
        let a = WordLesson::seeded(42).generate(&layout, 20);
        let b = WordLesson::seeded(42).generate(&layout, 20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_character_is_typeable() {
        let layout = qwerty();
        let text = WordLesson::seeded(3).with_capitals(0.5).generate(&layout, 50);
        assert!(text.chars().all(|c| layout.can_type(c)));
    }

    #[test]
    fn test_capitals_appear_when_requested() {
        let layout = qwerty();
        let text = WordLesson::seeded(11).with_capitals(1.0).generate(&layout, 10);
        assert!(text.split(' ').all(|w| w.starts_with(|c: char| c.is_ascii_uppercase())));
        let plain = WordLesson::seeded(11).generate(&layout, 10);
        assert!(!plain.chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_zero_words_is_empty() {
        assert_eq!(WordLesson::seeded(1).generate(&qwerty(), 0), "");
    }
}
