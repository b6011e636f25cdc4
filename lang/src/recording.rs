//! Per-tick listeners armed by `possibility` and `inertialistener`.

use mothball_core::{AxisModel, EventSink, InertiaMode, OutputEvent, PlayerState, TickObserver};

use crate::stdlib::Coord;

/// Water and lava drag replace the ground/air slip on the next tick.
const WATER_DRAG: f32 = 0.8;
const LAVA_DRAG: f32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct PossibilitySession {
    pub axes: Vec<Coord>,
    pub min_distance: f64,
    pub offset: f64,
    pub increment: f64,
    pub miss: f64,
    pub label: String,
    pub start_tick: u64,
}

impl PossibilitySession {
    fn observe(&self, state: &PlayerState, sink: &mut dyn EventSink) {
        let tick = state.ticks().saturating_sub(self.start_tick);
        let precision = state.precision();
        for coord in &self.axes {
            let position = match coord {
                Coord::X => state.x(),
                Coord::Z => state.z(),
                Coord::Y => state.y(),
            }
            .abs();
            let distance = position - self.offset;
            let remainder = distance.rem_euclid(self.increment);
            let floor = self.offset + distance - remainder;
            let center = if remainder < self.min_distance {
                floor
            } else if self.increment - remainder < self.miss {
                floor + self.increment
            } else {
                continue;
            };
            let label = format!("{} t{tick} {}", self.label, coord.name());
            sink.emit(OutputEvent::centered(label, position, center, precision));
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InertiaSession {
    pub miss: f64,
    pub label: String,
    pub start_tick: u64,
}

impl InertiaSession {
    fn observe(&self, state: &PlayerState, sink: &mut dyn EventSink) {
        let tick = state.ticks().saturating_sub(self.start_tick);
        let threshold = state.inertia_threshold();
        let mut report = |name: &str, speed: f64| {
            if speed == 0.0 || speed >= threshold + self.miss {
                return;
            }
            let label = format!("{} t{tick} {name}", self.label);
            sink.emit(OutputEvent::centered(label, speed, threshold, state.precision()));
        };
        match state.axis() {
            AxisModel::Vertical => report("vy", state.vy().abs()),
            AxisModel::Horizontal => {
                let drag = next_drag(state) as f64;
                match state.inertia_mode() {
                    InertiaMode::PerAxis => {
                        report("vx", state.vx().abs() * drag);
                        report("vz", state.vz().abs() * drag);
                    }
                    InertiaMode::Combined => report("v", state.vx().hypot(state.vz()) * drag),
                }
            }
        }
    }
}

/// Multiplier the next horizontal tick applies before its inertia check.
fn next_drag(state: &PlayerState) -> f32 {
    let mods = state.prev_modifiers();
    if mods.in_water() {
        WATER_DRAG
    } else if mods.in_lava() {
        LAVA_DRAG
    } else {
        state.prev_slip()
    }
}

/// Sessions currently armed on an engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Recording {
    pub possibility: Option<PossibilitySession>,
    pub inertia: Option<InertiaSession>,
}

impl Recording {
    pub fn is_idle(&self) -> bool {
        self.possibility.is_none() && self.inertia.is_none()
    }
}

/// Feeds every completed tick to the armed sessions.
pub struct RecordingHook<'a> {
    recording: &'a Recording,
    sink: &'a mut dyn EventSink,
}

impl<'a> RecordingHook<'a> {
    pub fn new(recording: &'a Recording, sink: &'a mut dyn EventSink) -> Self {
        Self { recording, sink }
    }
}

impl TickObserver for RecordingHook<'_> {
    fn after_tick(&mut self, state: &PlayerState) {
        if self.recording.is_idle() {
            return;
        }
        if let Some(session) = &self.recording.possibility {
            session.observe(state, self.sink);
        }
        if let Some(session) = &self.recording.inertia {
            session.observe(state, self.sink);
        }
    }
}
