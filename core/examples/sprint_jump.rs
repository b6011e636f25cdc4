// A 12-tick sprint jump driven straight through the tick model.

use mothball_core::{AxisModel, Controls, Keys, MoveState, NoObserver, PlayerState};

fn main() {
    let mut state = PlayerState::new(AxisModel::Horizontal);
    for tick in 1..=12 {
        let phase = if tick == 1 { MoveState::Jump } else { MoveState::Air };
        let mut controls = Controls::new(phase);
        controls.keys = Keys::FORWARD;
        controls.sprint = true;
        state.tick(&controls, &mut NoObserver);
        println!("t{tick:>2}  z = {:.6}  vz = {:.6}", state.z(), state.vz());
    }
    println!("fingerprint {}", state.fingerprint());
}
