use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn opposite(self) -> Hand {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }

    fn prefix(self) -> char {
        match self {
            Hand::Left => 'L',
            Hand::Right => 'R',
        }
    }
}

/// Digits are numbered thumb-out (`1` thumb .. `5` pinky). `Base` is the heel
/// of the palm, which some layouts use for the bottom-row modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
    Base,
}

impl Finger {
    fn suffix(self) -> char {
        match self {
            Finger::Thumb => '1',
            Finger::Index => '2',
            Finger::Middle => '3',
            Finger::Ring => '4',
            Finger::Pinky => '5',
            Finger::Base => 'B',
        }
    }
}

/// One of the twelve tracked fingers, written `L1`..`L5`, `LB`, `R1`..`R5`, `RB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FingerId {
    pub hand: Hand,
    pub finger: Finger,
}

impl FingerId {
    pub const ALL: [FingerId; 12] = [
        FingerId::new(Hand::Left, Finger::Thumb),
        FingerId::new(Hand::Left, Finger::Index),
        FingerId::new(Hand::Left, Finger::Middle),
        FingerId::new(Hand::Left, Finger::Ring),
        FingerId::new(Hand::Left, Finger::Pinky),
        FingerId::new(Hand::Left, Finger::Base),
        FingerId::new(Hand::Right, Finger::Thumb),
        FingerId::new(Hand::Right, Finger::Index),
        FingerId::new(Hand::Right, Finger::Middle),
        FingerId::new(Hand::Right, Finger::Ring),
        FingerId::new(Hand::Right, Finger::Pinky),
        FingerId::new(Hand::Right, Finger::Base),
    ];

    pub const fn new(hand: Hand, finger: Finger) -> Self {
        Self { hand, finger }
    }
}

impl fmt::Display for FingerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.hand.prefix(), self.finger.suffix())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown finger id: {0:?}")]
pub struct UnknownFingerId(pub String);

impl FromStr for FingerId {
    type Err = UnknownFingerId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FingerId::ALL
            .iter()
            .copied()
            .find(|finger| finger.to_string() == s)
            .ok_or_else(|| UnknownFingerId(s.to_string()))
    }
}

impl TryFrom<String> for FingerId {
    type Error = UnknownFingerId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FingerId> for String {
    fn from(value: FingerId) -> Self {
        value.to_string()
    }
}
