mod engine;

pub use engine::{whole_minutes_between, ActiveTimer, StoppedTimer, TimerEngine, TimerState};
