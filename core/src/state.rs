use std::collections::VecDeque;
use std::fmt;

use crate::input::Keys;
use crate::modifiers::Modifiers;

pub const MAX_POTION_LEVEL: i64 = 256;
pub const MAX_PRECISION: usize = 16;
pub const PLAYER_HEIGHT: f64 = 1.8;
pub const DEFAULT_GROUND_SLIP: f32 = 0.6;
pub const DEFAULT_INERTIA_THRESHOLD: f64 = 0.005;
pub const DEFAULT_PRECISION: usize = 6;
/// Surface drag multiplier applied to the block slipperiness.
pub const SLIP_FACTOR: f32 = 0.91;
/// Drag while airborne.
pub const AIR_DRAG: f32 = 0.91;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisModel {
    Horizontal,
    Vertical,
}

impl fmt::Display for AxisModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AxisModel::Horizontal => write!(f, "xz"),
            AxisModel::Vertical => write!(f, "y"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveState {
    Ground,
    Jump,
    Air,
    /// Vertical model only: bounce off a slime-like surface.
    Slime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InertiaMode {
    /// Each axis is zeroed on its own.
    PerAxis,
    /// Both axes are zeroed when the horizontal speed is below the threshold.
    Combined,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StateError {
    PotionOutOfRange { potion: &'static str, level: i64 },
    InertiaThreshold { value: f64 },
    CeilingTooLow { value: f64 },
    SlipNotPositive { value: f32 },
    Precision { value: i64 },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StateError::PotionOutOfRange { potion, level } => write!(
                f,
                "{potion} level must be between 0 and {MAX_POTION_LEVEL}, got {level}"
            ),
            StateError::InertiaThreshold { value } => {
                write!(f, "inertia threshold must be a non-negative number, got {value}")
            }
            StateError::CeilingTooLow { value } => write!(
                f,
                "ceiling height must be at least the player height {PLAYER_HEIGHT}, got {value}"
            ),
            StateError::SlipNotPositive { value } => {
                write!(f, "slipperiness must be a positive number, got {value}")
            }
            StateError::Precision { value } => {
                write!(f, "precision must be between 0 and {MAX_PRECISION}, got {value}")
            }
        }
    }
}

impl std::error::Error for StateError {}

/// Everything the caller decides for a single tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Controls {
    pub phase: MoveState,
    pub keys: Keys,
    pub sprint: bool,
    pub sneak: bool,
    pub modifiers: Modifiers,
    /// Facing for this call, overriding the default facing.
    pub rotation: Option<f32>,
    /// Added to the resolved facing (45-strafe uses +45).
    pub facing_offset: f32,
    pub reverse: bool,
    /// Ground slipperiness for this call, overriding the state's.
    pub slip: Option<f32>,
}

impl Controls {
    pub fn new(phase: MoveState) -> Self {
        Self {
            phase,
            keys: Keys::NONE,
            sprint: false,
            sneak: false,
            modifiers: Modifiers::NONE,
            rotation: None,
            facing_offset: 0.0,
            reverse: false,
            slip: None,
        }
    }
}

/// Runs after every tick with the post-tick state.
pub trait TickObserver {
    fn after_tick(&mut self, state: &PlayerState);
}

pub struct NoObserver;

impl TickObserver for NoObserver {
    fn after_tick(&mut self, _state: &PlayerState) {}
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub(crate) axis: AxisModel,
    pub(crate) x: f64,
    pub(crate) z: f64,
    pub(crate) vx: f64,
    pub(crate) vz: f64,
    pub(crate) y: f64,
    pub(crate) vy: f64,
    pub(crate) facing: f32,
    pub(crate) modifiers: Modifiers,
    pub(crate) move_state: MoveState,
    pub(crate) ground_slip: f32,
    pub(crate) prev_slip: f32,
    pub(crate) prev_sprint: bool,
    pub(crate) prev_sneak: bool,
    pub(crate) prev_modifiers: Modifiers,
    pub(crate) speed: u16,
    pub(crate) slowness: u16,
    pub(crate) jump_boost: u16,
    pub(crate) precision: usize,
    pub(crate) inertia_threshold: f64,
    pub(crate) inertia_mode: InertiaMode,
    pub(crate) ceiling: Option<f64>,
    pub(crate) pending_snap: Option<f64>,
    pub(crate) angle_queue: VecDeque<f32>,
    pub(crate) turn_queue: VecDeque<f32>,
    pub(crate) ticks: u64,
}

impl PlayerState {
    pub fn new(axis: AxisModel) -> Self {
        Self {
            axis,
            x: 0.0,
            z: 0.0,
            vx: 0.0,
            vz: 0.0,
            y: 0.0,
            vy: 0.0,
            facing: 0.0,
            modifiers: Modifiers::NONE,
            move_state: MoveState::Ground,
            ground_slip: DEFAULT_GROUND_SLIP,
            prev_slip: DEFAULT_GROUND_SLIP * SLIP_FACTOR,
            prev_sprint: false,
            prev_sneak: false,
            prev_modifiers: Modifiers::NONE,
            speed: 0,
            slowness: 0,
            jump_boost: 0,
            precision: DEFAULT_PRECISION,
            inertia_threshold: DEFAULT_INERTIA_THRESHOLD,
            inertia_mode: InertiaMode::PerAxis,
            ceiling: None,
            pending_snap: None,
            angle_queue: VecDeque::new(),
            turn_queue: VecDeque::new(),
            ticks: 0,
        }
    }

    /// Advances one tick under the state's axis model.
    pub fn tick(&mut self, controls: &Controls, observer: &mut dyn TickObserver) {
        match self.axis {
            AxisModel::Horizontal => self.tick_horizontal(controls),
            AxisModel::Vertical => self.tick_vertical(controls),
        }
        self.ticks += 1;
        observer.after_tick(self);
    }

    pub fn axis(&self) -> AxisModel {
        self.axis
    }
    pub fn x(&self) -> f64 {
        self.x
    }
    pub fn z(&self) -> f64 {
        self.z
    }
    pub fn vx(&self) -> f64 {
        self.vx
    }
    pub fn vz(&self) -> f64 {
        self.vz
    }
    pub fn y(&self) -> f64 {
        self.y
    }
    pub fn vy(&self) -> f64 {
        self.vy
    }
    pub fn facing(&self) -> f32 {
        self.facing
    }
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
    pub fn move_state(&self) -> MoveState {
        self.move_state
    }
    pub fn ground_slip(&self) -> f32 {
        self.ground_slip
    }
    /// Drag the next tick will apply.
    pub fn prev_slip(&self) -> f32 {
        self.prev_slip
    }
    pub fn prev_sprint(&self) -> bool {
        self.prev_sprint
    }
    pub fn prev_sneak(&self) -> bool {
        self.prev_sneak
    }
    pub fn prev_modifiers(&self) -> Modifiers {
        self.prev_modifiers
    }
    pub fn speed(&self) -> u16 {
        self.speed
    }
    pub fn slowness(&self) -> u16 {
        self.slowness
    }
    pub fn jump_boost(&self) -> u16 {
        self.jump_boost
    }
    pub fn precision(&self) -> usize {
        self.precision
    }
    pub fn inertia_threshold(&self) -> f64 {
        self.inertia_threshold
    }
    pub fn inertia_mode(&self) -> InertiaMode {
        self.inertia_mode
    }
    pub fn ceiling(&self) -> Option<f64> {
        self.ceiling
    }
    pub fn pending_angles(&self) -> usize {
        self.angle_queue.len()
    }
    pub fn pending_turns(&self) -> usize {
        self.turn_queue.len()
    }
    /// Ticks simulated since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn set_x(&mut self, value: f64) {
        self.x = value;
    }
    pub fn set_z(&mut self, value: f64) {
        self.z = value;
    }
    pub fn set_vx(&mut self, value: f64) {
        self.vx = value;
    }
    pub fn set_vz(&mut self, value: f64) {
        self.vz = value;
    }
    pub fn set_y(&mut self, value: f64) {
        self.y = value;
        self.pending_snap = None;
    }
    pub fn set_vy(&mut self, value: f64) {
        self.vy = value;
        self.pending_snap = None;
    }
    pub fn set_facing(&mut self, degrees: f32) {
        self.facing = degrees;
    }
    pub fn turn(&mut self, degrees: f32) {
        self.facing += degrees;
    }
    pub fn queue_angles(&mut self, angles: impl IntoIterator<Item = f32>) {
        self.angle_queue.extend(angles);
    }
    pub fn queue_turns(&mut self, deltas: impl IntoIterator<Item = f32>) {
        self.turn_queue.extend(deltas);
    }

    pub fn set_speed(&mut self, level: i64) -> Result<(), StateError> {
        self.speed = potion_level("speed", level)?;
        Ok(())
    }

    pub fn set_slowness(&mut self, level: i64) -> Result<(), StateError> {
        self.slowness = potion_level("slowness", level)?;
        Ok(())
    }

    pub fn set_jump_boost(&mut self, level: i64) -> Result<(), StateError> {
        self.jump_boost = potion_level("jump boost", level)?;
        Ok(())
    }

    pub fn set_inertia(&mut self, threshold: f64, mode: InertiaMode) -> Result<(), StateError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(StateError::InertiaThreshold { value: threshold });
        }
        self.inertia_threshold = threshold;
        self.inertia_mode = mode;
        Ok(())
    }

    pub fn set_ceiling(&mut self, height: Option<f64>) -> Result<(), StateError> {
        if let Some(value) = height {
            if !value.is_finite() || value < PLAYER_HEIGHT {
                return Err(StateError::CeilingTooLow { value });
            }
        }
        self.ceiling = height;
        self.pending_snap = None;
        Ok(())
    }

    pub fn set_ground_slip(&mut self, slip: f32) -> Result<(), StateError> {
        validate_slip(slip)?;
        self.ground_slip = slip;
        Ok(())
    }

    pub fn set_precision(&mut self, digits: i64) -> Result<(), StateError> {
        match usize::try_from(digits) {
            Ok(value) if value <= MAX_PRECISION => {
                self.precision = value;
                Ok(())
            }
            _ => Err(StateError::Precision { value: digits }),
        }
    }

    /// Hex digest over the bit pattern of every field.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[match self.axis {
            AxisModel::Horizontal => 0,
            AxisModel::Vertical => 1,
        }]);
        for value in [self.x, self.z, self.vx, self.vz, self.y, self.vy, self.inertia_threshold] {
            hasher.update(&value.to_bits().to_le_bytes());
        }
        for value in [self.facing, self.ground_slip, self.prev_slip] {
            hasher.update(&value.to_bits().to_le_bytes());
        }
        hasher.update(&[
            self.modifiers.bits(),
            self.prev_modifiers.bits(),
            self.prev_sprint as u8,
            self.prev_sneak as u8,
            self.move_state as u8,
            self.inertia_mode as u8,
        ]);
        for level in [self.speed, self.slowness, self.jump_boost] {
            hasher.update(&level.to_le_bytes());
        }
        hasher.update(&(self.precision as u64).to_le_bytes());
        for extra in [self.ceiling, self.pending_snap] {
            let bits = extra.map(f64::to_bits).unwrap_or(u64::MAX);
            hasher.update(&bits.to_le_bytes());
        }
        for angle in self.angle_queue.iter().chain(self.turn_queue.iter()) {
            hasher.update(&angle.to_bits().to_le_bytes());
        }
        hasher.update(&(self.angle_queue.len() as u64).to_le_bytes());
        hasher.update(&self.ticks.to_le_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

/// Slipperiness must be finite and positive.
pub fn validate_slip(slip: f32) -> Result<(), StateError> {
    if !slip.is_finite() || slip <= 0.0 {
        return Err(StateError::SlipNotPositive { value: slip });
    }
    Ok(())
}

fn potion_level(potion: &'static str, level: i64) -> Result<u16, StateError> {
    if !(0..=MAX_POTION_LEVEL).contains(&level) {
        return Err(StateError::PotionOutOfRange { potion, level });
    }
    Ok(level as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn potion_levels_are_checked_at_assignment() {
        let mut state = PlayerState::new(AxisModel::Horizontal);
        assert!(state.set_speed(256).is_ok());
        assert_eq!(
            state.set_speed(257),
            Err(StateError::PotionOutOfRange { potion: "speed", level: 257 })
        );
        assert_eq!(state.speed(), 256);
        assert!(state.set_slowness(-1).is_err());
    }

    #[test]
    fn ceiling_and_inertia_setters_reject_bad_values() {
        let mut state = PlayerState::new(AxisModel::Vertical);
        assert!(state.set_ceiling(Some(1.0)).is_err());
        assert!(state.set_ceiling(Some(2.5)).is_ok());
        assert_eq!(state.ceiling(), Some(2.5));
        assert!(state.set_inertia(-0.1, InertiaMode::PerAxis).is_err());
        assert!(state.set_inertia(f64::NAN, InertiaMode::PerAxis).is_err());
        assert_eq!(state.inertia_threshold(), DEFAULT_INERTIA_THRESHOLD);
    }

    #[test]
    fn precision_setter_bounds() {
        let mut state = PlayerState::new(AxisModel::Horizontal);
        assert!(state.set_precision(17).is_err());
        assert!(state.set_precision(-1).is_err());
        assert!(state.set_precision(3).is_ok());
        assert_eq!(state.precision(), 3);
    }

    #[test]
    fn fingerprint_tracks_every_change() {
        let state = PlayerState::new(AxisModel::Horizontal);
        let copy = state.clone();
        assert_eq!(state.fingerprint(), copy.fingerprint());
        let mut moved = state.clone();
        moved.set_vz(1e-12);
        assert_ne!(state.fingerprint(), moved.fingerprint());
    }
}
