mod controller;
mod driver;
mod machine;
mod progress;
mod state;

pub use controller::{spawn_controller, Action, ControllerHandle, WorkoutController};
pub use driver::{Clock, SystemClock, Tick, TickSource};
pub use machine::{apply, OverflowPolicy, TimerMachine, Transition};
pub use progress::{format_clock, TimerView};
pub use state::{Phase, TimerEvent, TimerState};
