//! Sensors

pub mod ultrasonic;

pub use ultrasonic::{echo_to_cm, is_near, ProximityTrigger, TriggerDecision};
