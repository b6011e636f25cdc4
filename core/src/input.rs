use std::fmt;

pub const KEY_W: u8 = 1 << 0;
pub const KEY_A: u8 = 1 << 1;
pub const KEY_S: u8 = 1 << 2;
pub const KEY_D: u8 = 1 << 3;

pub fn key_bit_from_char(ch: char) -> Option<u8> {
    match ch.to_ascii_lowercase() {
        'w' => Some(KEY_W),
        'a' => Some(KEY_A),
        's' => Some(KEY_S),
        'd' => Some(KEY_D),
        _ => None,
    }
}

/// Held movement keys for one call, parsed from the `.wasd` suffix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Keys(u8);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeysError {
    Unknown(char),
    Repeated(char),
}

impl fmt::Display for KeysError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeysError::Unknown(ch) => write!(f, "'{ch}' is not a movement key (expected w, a, s or d)"),
            KeysError::Repeated(ch) => write!(f, "movement key '{ch}' is given twice"),
        }
    }
}

impl std::error::Error for KeysError {}

impl Keys {
    pub const NONE: Keys = Keys(0);
    pub const FORWARD: Keys = Keys(KEY_W);
    /// Forward plus left strafe, the fixed 45-strafe input.
    pub const FORWARD_LEFT: Keys = Keys(KEY_W | KEY_A);

    pub fn parse(suffix: &str) -> Result<Self, KeysError> {
        let mut bits = 0u8;
        for ch in suffix.chars() {
            let bit = key_bit_from_char(ch).ok_or(KeysError::Unknown(ch))?;
            if bits & bit != 0 {
                return Err(KeysError::Repeated(ch));
            }
            bits |= bit;
        }
        Ok(Keys(bits))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `(forward, strafe)` in the game's convention: `a` strafes positive.
    pub fn intent(self) -> (f32, f32) {
        let mut forward = 0.0f32;
        let mut strafe = 0.0f32;
        if self.contains(KEY_W) {
            forward += 1.0;
        }
        if self.contains(KEY_S) {
            forward -= 1.0;
        }
        if self.contains(KEY_A) {
            strafe += 1.0;
        }
        if self.contains(KEY_D) {
            strafe -= 1.0;
        }
        (forward, strafe)
    }
}

impl fmt::Display for Keys {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (bit, ch) in [(KEY_W, 'w'), (KEY_A, 'a'), (KEY_S, 's'), (KEY_D, 'd')] {
            if self.contains(bit) {
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_bit_mapping_supports_wasd() {
        assert_eq!(key_bit_from_char('W'), Some(KEY_W));
        assert_eq!(key_bit_from_char('a'), Some(KEY_A));
        assert_eq!(key_bit_from_char('s'), Some(KEY_S));
        assert_eq!(key_bit_from_char('d'), Some(KEY_D));
        assert_eq!(key_bit_from_char('q'), None);
    }

    #[test]
    fn keys_parse_rejects_unknown_and_repeated() {
        assert_eq!(Keys::parse("wq"), Err(KeysError::Unknown('q')));
        assert_eq!(Keys::parse("waw"), Err(KeysError::Repeated('w')));
        assert_eq!(Keys::parse(""), Ok(Keys::NONE));
    }

    #[test]
    fn keys_intent_cancels_opposites() {
        assert_eq!(Keys::parse("wa").expect("wa").intent(), (1.0, 1.0));
        assert_eq!(Keys::parse("ad").expect("ad").intent(), (0.0, 0.0));
        assert_eq!(Keys::parse("sd").expect("sd").intent(), (-1.0, -1.0));
    }

    #[test]
    fn keys_display_is_canonical_order() {
        assert_eq!(Keys::parse("dw").expect("dw").to_string(), "wd");
    }
}
