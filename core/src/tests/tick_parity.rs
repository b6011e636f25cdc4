use crate::input::Keys;
use crate::modifiers::{Modifiers, MOD_BLOCK, MOD_LADDER, MOD_SOULSAND, MOD_WATER, MOD_WEB};
use crate::state::{AxisModel, Controls, InertiaMode, MoveState, NoObserver, PlayerState};

const SPRINT_TICK: f64 = 0.1273999661207199;
const WALK_TICK: f64 = 0.098;

fn sprint(phase: MoveState) -> Controls {
    let mut controls = Controls::new(phase);
    controls.keys = Keys::FORWARD;
    controls.sprint = true;
    controls
}

fn run(state: &mut PlayerState, controls: &Controls, ticks: usize) {
    for _ in 0..ticks {
        state.tick(controls, &mut NoObserver);
    }
}

fn close(actual: f64, expected: f64, tolerance: f64) -> bool {
    (actual - expected).abs() < tolerance
}

#[test]
fn sprint_converges_to_terminal_speed() {
    let mut state = PlayerState::new(AxisModel::Horizontal);
    run(&mut state, &sprint(MoveState::Ground), 200);
    assert!(close(state.vz(), 0.2806167, 1e-5), "vz = {}", state.vz());
    assert_eq!(state.vx(), 0.0);
}

#[test]
fn strafe45_moves_along_facing_without_input_damping() {
    let mut state = PlayerState::new(AxisModel::Horizontal);
    let mut controls = sprint(MoveState::Ground);
    controls.keys = Keys::FORWARD_LEFT;
    controls.facing_offset = 45.0;
    state.tick(&controls, &mut NoObserver);
    assert!(close(state.vz(), 0.13, 1e-6), "vz = {}", state.vz());
    assert!(state.vx().abs() < 1e-6, "vx = {}", state.vx());
}

#[test]
fn sprint_jump_adds_impulse_toward_facing() {
    let mut straight = PlayerState::new(AxisModel::Horizontal);
    straight.tick(&sprint(MoveState::Jump), &mut NoObserver);
    assert!(close(straight.vz(), 0.2 + SPRINT_TICK, 1e-6), "vz = {}", straight.vz());

    let mut sideways = PlayerState::new(AxisModel::Horizontal);
    let mut controls = sprint(MoveState::Jump);
    controls.rotation = Some(90.0);
    sideways.tick(&controls, &mut NoObserver);
    assert!(close(sideways.vx(), -(0.2 + SPRINT_TICK), 1e-6), "vx = {}", sideways.vx());
    assert!(sideways.vz().abs() < 1e-6);
}

#[test]
fn queued_angle_replaces_facing_for_one_tick() {
    let mut state = PlayerState::new(AxisModel::Horizontal);
    state.queue_angles([90.0]);
    state.tick(&sprint(MoveState::Ground), &mut NoObserver);
    assert_eq!(state.pending_angles(), 0);
    assert!(state.vx() < -0.1);
    assert!(state.vz().abs() < 1e-6);
    assert_eq!(state.facing(), 0.0);

    let vx_before = state.vx();
    state.tick(&sprint(MoveState::Ground), &mut NoObserver);
    assert!(state.vz() > 0.1);
    assert!(state.vx() > vx_before);
}

#[test]
fn queued_turn_moves_default_facing() {
    let mut state = PlayerState::new(AxisModel::Horizontal);
    state.queue_turns([90.0, -45.0]);
    state.tick(&sprint(MoveState::Ground), &mut NoObserver);
    assert_eq!(state.facing(), 90.0);
    assert_eq!(state.pending_turns(), 1);
    state.tick(&sprint(MoveState::Ground), &mut NoObserver);
    assert_eq!(state.facing(), 45.0);
    assert_eq!(state.pending_turns(), 0);
}

#[test]
fn combined_inertia_keeps_small_diagonal_speed() {
    let mut per_axis = PlayerState::new(AxisModel::Horizontal);
    per_axis.set_vx(0.006);
    per_axis.set_vz(0.0085);
    let mut combined = per_axis.clone();
    combined
        .set_inertia(0.005, InertiaMode::Combined)
        .expect("threshold");

    let idle = Controls::new(MoveState::Ground);
    per_axis.tick(&idle, &mut NoObserver);
    combined.tick(&idle, &mut NoObserver);

    assert_eq!(per_axis.vx(), 0.0);
    assert_eq!(per_axis.vz(), 0.0);
    assert!(combined.vx() > 0.003);
    assert!(combined.vz() > 0.004);
}

#[test]
fn web_resets_then_quarters_velocity() {
    let mut state = PlayerState::new(AxisModel::Horizontal);
    state.set_vz(1.0);
    let mut controls = sprint(MoveState::Ground);
    controls.modifiers = Modifiers::from_bits(MOD_WEB);
    state.tick(&controls, &mut NoObserver);
    assert!(close(state.vz(), SPRINT_TICK * 0.25, 1e-6), "vz = {}", state.vz());
    assert_eq!(state.z(), 1.0);
}

#[test]
fn ladder_caps_horizontal_speed() {
    let mut state = PlayerState::new(AxisModel::Horizontal);
    let mut controls = sprint(MoveState::Ground);
    controls.modifiers = Modifiers::from_bits(MOD_LADDER);
    run(&mut state, &controls, 50);
    assert!(state.vz() <= 0.15000000596046448);
    assert!(close(state.vz(), 0.15, 1e-6));
}

#[test]
fn speed_and_slowness_scale_ground_acceleration() {
    let mut fast = PlayerState::new(AxisModel::Horizontal);
    fast.set_speed(1).expect("speed");
    fast.tick(&sprint(MoveState::Ground), &mut NoObserver);
    assert!(close(fast.vz(), SPRINT_TICK * 1.2, 1e-6), "vz = {}", fast.vz());

    let mut stuck = PlayerState::new(AxisModel::Horizontal);
    stuck.set_slowness(7).expect("slowness");
    stuck.tick(&sprint(MoveState::Ground), &mut NoObserver);
    assert_eq!(stuck.vz(), 0.0);
}

#[test]
fn air_sprint_bonus_follows_previous_tick() {
    let mut state = PlayerState::new(AxisModel::Horizontal);
    let air = sprint(MoveState::Air);
    state.tick(&air, &mut NoObserver);
    let first = 0.02f32 * 0.98f32;
    assert!(close(state.vz(), first as f64, 1e-9), "vz = {}", state.vz());

    state.tick(&air, &mut NoObserver);
    let expected = first as f64 * 0.91f32 as f64 + (0.026f32 * 0.98f32) as f64;
    assert!(close(state.vz(), expected, 1e-6), "vz = {}", state.vz());
}

#[test]
fn water_drag_lags_one_tick_behind() {
    let mut state = PlayerState::new(AxisModel::Horizontal);
    let mut swim = Controls::new(MoveState::Ground);
    swim.keys = Keys::FORWARD;
    swim.modifiers = Modifiers::from_bits(MOD_WATER);
    state.tick(&swim, &mut NoObserver);
    let first = state.vz();
    assert!(close(first, 0.0196, 1e-8), "vz = {}", first);

    let idle = Controls::new(MoveState::Ground);
    state.tick(&idle, &mut NoObserver);
    assert!(close(state.vz(), first * 0.8, 1e-8), "vz = {}", state.vz());
    let second = state.vz();

    state.tick(&idle, &mut NoObserver);
    assert!(close(state.vz(), second * 0.546, 1e-8), "vz = {}", state.vz());
}

#[test]
fn sneak_soulsand_and_blocking_reduce_motion() {
    let mut sneaking = PlayerState::new(AxisModel::Horizontal);
    let mut controls = Controls::new(MoveState::Ground);
    controls.keys = Keys::FORWARD;
    controls.sneak = true;
    sneaking.tick(&controls, &mut NoObserver);
    assert!(close(sneaking.vz(), WALK_TICK * 0.3, 1e-6), "vz = {}", sneaking.vz());

    let mut sand = PlayerState::new(AxisModel::Horizontal);
    sand.set_vz(1.0);
    let mut idle = Controls::new(MoveState::Ground);
    idle.modifiers = Modifiers::from_bits(MOD_SOULSAND);
    sand.tick(&idle, &mut NoObserver);
    assert!(close(sand.vz(), 0.4 * 0.546, 1e-6), "vz = {}", sand.vz());

    let mut blocking = PlayerState::new(AxisModel::Horizontal);
    let mut guarded = sprint(MoveState::Ground);
    guarded.modifiers = Modifiers::from_bits(MOD_BLOCK);
    blocking.tick(&guarded, &mut NoObserver);
    assert!(close(blocking.vz(), SPRINT_TICK * 0.2, 1e-6), "vz = {}", blocking.vz());
}

#[test]
fn call_slip_overrides_ground_drag_for_next_tick() {
    let mut ice = PlayerState::new(AxisModel::Horizontal);
    let mut controls = sprint(MoveState::Ground);
    controls.slip = Some(0.98);
    ice.tick(&controls, &mut NoObserver);
    assert!(close(ice.prev_slip() as f64, 0.98 * 0.91, 1e-6));
    assert!(ice.vz() < SPRINT_TICK);
}

#[test]
fn identical_runs_share_a_fingerprint() {
    let mut a = PlayerState::new(AxisModel::Horizontal);
    let mut b = PlayerState::new(AxisModel::Horizontal);
    run(&mut a, &sprint(MoveState::Jump), 1);
    run(&mut b, &sprint(MoveState::Jump), 1);
    run(&mut a, &sprint(MoveState::Air), 11);
    run(&mut b, &sprint(MoveState::Air), 11);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.ticks(), 12);
}

#[test]
fn tick_end_snapshot_keeps_sprint_and_sneak() {
    let mut crouched = PlayerState::new(AxisModel::Horizontal);
    let mut standing = PlayerState::new(AxisModel::Horizontal);
    let mut crouch = Controls::new(MoveState::Ground);
    crouch.sneak = true;
    crouched.tick(&crouch, &mut NoObserver);
    standing.tick(&Controls::new(MoveState::Ground), &mut NoObserver);
    assert!(crouched.prev_sneak() && !crouched.prev_sprint());
    assert!(!standing.prev_sneak());
    assert_eq!((crouched.vz(), crouched.z()), (standing.vz(), standing.z()));
    assert_ne!(crouched.fingerprint(), standing.fingerprint());
}
