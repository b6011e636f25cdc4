use std::fmt;

pub const MOD_WATER: u8 = 1 << 0;
pub const MOD_LAVA: u8 = 1 << 1;
pub const MOD_WEB: u8 = 1 << 2;
pub const MOD_LADDER: u8 = 1 << 3;
pub const MOD_BLOCK: u8 = 1 << 4;
pub const MOD_SOULSAND: u8 = 1 << 5;

const NAMES: [(u8, &str); 6] = [
    (MOD_WATER, "water"),
    (MOD_LAVA, "lava"),
    (MOD_WEB, "web"),
    (MOD_LADDER, "ladder"),
    (MOD_BLOCK, "block"),
    (MOD_SOULSAND, "soulsand"),
];

pub fn modifier_bit_from_name(name: &str) -> Option<u8> {
    match name.to_ascii_lowercase().as_str() {
        "water" | "wt" => Some(MOD_WATER),
        "lava" | "lv" => Some(MOD_LAVA),
        "web" | "wb" => Some(MOD_WEB),
        "ladder" | "ld" | "vine" => Some(MOD_LADDER),
        "block" | "bl" => Some(MOD_BLOCK),
        "soulsand" | "ss" => Some(MOD_SOULSAND),
        _ => None,
    }
}

/// Terrain and fluid flags active during a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const ALL: Modifiers = Modifiers(
        MOD_WATER | MOD_LAVA | MOD_WEB | MOD_LADDER | MOD_BLOCK | MOD_SOULSAND,
    );
    pub const FLUIDS: Modifiers = Modifiers(MOD_WATER | MOD_LAVA);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
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

    /// Flags in `self` that `allowed` does not carry.
    pub const fn outside(self, allowed: Modifiers) -> Modifiers {
        Modifiers(self.0 & !allowed.0)
    }

    pub const fn in_water(self) -> bool {
        self.contains(MOD_WATER)
    }

    pub const fn in_lava(self) -> bool {
        self.contains(MOD_LAVA)
    }

    pub const fn in_fluid(self) -> bool {
        self.0 & (MOD_WATER | MOD_LAVA) != 0
    }

    pub const fn in_web(self) -> bool {
        self.contains(MOD_WEB)
    }

    pub fn names(self) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.names().join(", "))
    }
}
