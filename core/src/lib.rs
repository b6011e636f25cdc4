//! Tick-accurate player movement: state, horizontal and vertical models, output events.

pub mod horizontal;
pub mod input;
pub mod mathf;
pub mod modifiers;
pub mod output;
pub mod state;
pub mod vertical;

pub use input::{key_bit_from_char, Keys, KeysError, KEY_A, KEY_D, KEY_S, KEY_W};
pub use modifiers::{
    modifier_bit_from_name, Modifiers, MOD_BLOCK, MOD_LADDER, MOD_LAVA, MOD_SOULSAND, MOD_WATER,
    MOD_WEB,
};
pub use output::{format_fixed, format_number, EventSink, NullSink, OutputEvent, VecEventSink};
pub use state::{
    AxisModel, Controls, InertiaMode, MoveState, NoObserver, PlayerState, StateError,
    TickObserver, DEFAULT_GROUND_SLIP, DEFAULT_INERTIA_THRESHOLD, DEFAULT_PRECISION,
    MAX_POTION_LEVEL, MAX_PRECISION, PLAYER_HEIGHT,
};
pub use state::validate_slip;

#[cfg(test)]
mod tests;
