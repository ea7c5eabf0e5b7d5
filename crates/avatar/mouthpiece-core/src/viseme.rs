//! Viseme channels and the phoneme-code table that feeds them.

use serde::{Deserialize, Serialize};

/// Mouth shapes the lip-sync driver can activate.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Viseme {
    PP,
    kk,
    I,
    AA,
    O,
    U,
    FF,
    TH,
}

impl Viseme {
    pub const COUNT: usize = 8;

    pub const ALL: [Viseme; Self::COUNT] = [
        Viseme::PP,
        Viseme::kk,
        Viseme::I,
        Viseme::AA,
        Viseme::O,
        Viseme::U,
        Viseme::FF,
        Viseme::TH,
    ];

    /// Morph target name carrying this mouth shape.
    #[inline]
    pub fn channel_name(self) -> &'static str {
        match self {
            Viseme::PP => "viseme_PP",
            Viseme::kk => "viseme_kk",
            Viseme::I => "viseme_I",
            Viseme::AA => "viseme_AA",
            Viseme::O => "viseme_O",
            Viseme::U => "viseme_U",
            Viseme::FF => "viseme_FF",
            Viseme::TH => "viseme_TH",
        }
    }

    /// Dense index, stable across runs.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Map a single-letter mouth cue code (A-H, X) to its viseme.
    /// Unknown codes map to nothing.
    pub fn from_phoneme(code: &str) -> Option<Viseme> {
        match code {
            "A" => Some(Viseme::PP),
            "B" => Some(Viseme::kk),
            "C" => Some(Viseme::I),
            "D" => Some(Viseme::AA),
            "E" => Some(Viseme::O),
            "F" => Some(Viseme::U),
            "G" => Some(Viseme::FF),
            "H" => Some(Viseme::TH),
            // Rest shape shares the closed-lips channel.
            "X" => Some(Viseme::PP),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phoneme_table() {
        assert_eq!(Viseme::from_phoneme("A"), Some(Viseme::PP));
        assert_eq!(Viseme::from_phoneme("X"), Some(Viseme::PP));
        assert_eq!(Viseme::from_phoneme("H"), Some(Viseme::TH));
        assert_eq!(Viseme::from_phoneme("Z"), None);
        assert_eq!(Viseme::from_phoneme(""), None);
        assert_eq!(Viseme::from_phoneme("a"), None);
    }

    #[test]
    fn indices_match_all_order() {
        for (i, v) in Viseme::ALL.iter().enumerate() {
            assert_eq!(v.index(), i);
        }
        assert_eq!(Viseme::kk.channel_name(), "viseme_kk");
    }
}
