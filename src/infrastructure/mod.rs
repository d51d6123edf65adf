pub mod countdown;

pub use countdown::{CountdownHandle, CountdownScheduler, TickControl};
