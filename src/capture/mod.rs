//! Producer-side capture: timestamp synchronization, image pacing,
//! inertial fusion, and the tracking collaborator interface.

pub mod clock;
pub mod pacer;
pub mod sensor;
pub mod tracking;
