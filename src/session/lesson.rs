use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use icu_normalizer::ComposingNormalizerBorrowed;

use crate::keyboard::key::KeyId;
use crate::keyboard::layout::KeyboardLayout;

/// One character of the lesson and the keys that must be held to type it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetSymbol {
    pub symbol: char,
    pub keys: BTreeSet<KeyId>,
}

impl TargetSymbol {
    pub fn new(symbol: char, keys: impl IntoIterator<Item = KeyId>) -> Self {
        Self {
            symbol,
            keys: keys.into_iter().collect(),
        }
    }

    pub fn resolve(symbol: char, layout: &KeyboardLayout) -> Self {
        Self {
            symbol,
            keys: layout.required_keys(symbol),
        }
    }

    /// False when the layout has no way to type this symbol.
    pub fn is_mapped(&self) -> bool {
        !self.keys.is_empty()
    }

    /// The key that produces the character, as opposed to the modifiers
    /// held with it.
    pub fn primary_key(&self) -> Option<KeyId> {
        self.keys
            .iter()
            .copied()
            .find(|key| !key.is_modifier())
            .or_else(|| self.keys.iter().next().copied())
    }

    pub fn needs_shift(&self) -> bool {
        self.keys.iter().any(|key| key.is_shift())
    }
}

/// Compare a chord with the keys a symbol requires, as unordered sets.
///
/// With `strict_shift` off, either Shift satisfies a Shift requirement.
pub fn keys_match(
    required: &BTreeSet<KeyId>,
    pressed: &BTreeSet<KeyId>,
    strict_shift: bool,
) -> bool {
    if strict_shift {
        return required == pressed;
    }
    let canonical = |keys: &BTreeSet<KeyId>| -> BTreeSet<KeyId> {
        keys.iter()
            .map(|&key| if key.is_shift() { KeyId::ShiftLeft } else { key })
            .collect()
    };
    canonical(required) == canonical(pressed)
}

/// One evaluated chord against one symbol. Never changed after it is recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attempt {
    pub pressed: BTreeSet<KeyId>,
    pub started_at: Instant,
    pub ended_at: Instant,
    pub correct: bool,
}

impl Attempt {
    pub fn evaluate(
        target: &TargetSymbol,
        pressed: BTreeSet<KeyId>,
        started_at: Instant,
        ended_at: Instant,
        strict_shift: bool,
    ) -> Self {
        let correct = keys_match(&target.keys, &pressed, strict_shift);
        Self {
            pressed,
            started_at,
            ended_at,
            correct,
        }
    }

    pub fn duration(&self) -> Duration {
        self.ended_at.saturating_duration_since(self.started_at)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamSymbol {
    pub target: TargetSymbol,
    attempts: Vec<Attempt>,
}

impl StreamSymbol {
    pub fn new(target: TargetSymbol) -> Self {
        Self {
            target,
            attempts: Vec::new(),
        }
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn last_attempt(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    pub fn error_count(&self) -> usize {
        self.attempts.iter().filter(|a| !a.correct).count()
    }

    /// Typed correctly without a single wrong attempt.
    pub fn first_try(&self) -> bool {
        self.attempts.first().is_some_and(|a| a.correct)
    }

    pub fn is_passed(&self) -> bool {
        self.attempts.iter().any(|a| a.correct)
    }
}

/// The whole lesson: symbols in order, each with its attempt history.
/// Symbols are never reordered or removed, attempts are only appended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stream {
    symbols: Vec<StreamSymbol>,
}

impl Stream {
    /// Resolve every character of `text` against `layout`. The text is NFC
    /// normalized first so composed characters match layout symbols; `\r\n`
    /// line endings become `\n`. Unknown characters stay in the stream with
    /// no required keys.
    pub fn from_text(text: &str, layout: &KeyboardLayout) -> Self {
        let normalized = ComposingNormalizerBorrowed::new_nfc().normalize(text);
        let symbols = normalized
            .replace("\r\n", "\n")
            .chars()
            .map(|ch| StreamSymbol::new(TargetSymbol::resolve(ch, layout)))
            .collect();
        Self { symbols }
    }

    pub fn from_targets(targets: impl IntoIterator<Item = TargetSymbol>) -> Self {
        Self {
            symbols: targets.into_iter().map(StreamSymbol::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StreamSymbol> {
        self.symbols.get(index)
    }

    pub fn symbols(&self) -> &[StreamSymbol] {
        &self.symbols
    }

    pub fn text(&self) -> String {
        self.symbols.iter().map(|s| s.target.symbol).collect()
    }

    /// Index and character of the first symbol the layout cannot type.
    pub fn first_unmapped(&self) -> Option<(usize, char)> {
        self.symbols
            .iter()
            .position(|s| !s.target.is_mapped())
            .map(|idx| (idx, self.symbols[idx].target.symbol))
    }

    pub fn attempt_count(&self) -> usize {
        self.symbols.iter().map(|s| s.attempts.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.symbols.iter().map(StreamSymbol::error_count).sum()
    }

    pub(crate) fn record(&mut self, index: usize, attempt: Attempt) {
        if let Some(symbol) = self.symbols.get_mut(index) {
            symbol.attempts.push(attempt);
        }
    }
}
