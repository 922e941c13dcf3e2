//! Flipper motion
//!
//! The flipper arm is driven by two servos mounted facing each other, so
//! one arm angle maps to mirrored servo angles. The plans below are the
//! arm movements the flipper board runs.

pub mod plan;

pub use plan::{MotionPlan, PlanSteps, Segment, ServoStep};

/// Arm angle at which the mirrored servo reaches 0°
pub const MIRROR_SPAN: i16 = 200;

/// Largest angle a positional servo accepts
pub const SERVO_MAX_ANGLE: i16 = 180;

/// Arm angle at rest between runs
pub const IDLE_ANGLE: i16 = 180;

/// Arm angle at the end of the throw
pub const THROW_ANGLE: i16 = 200;

/// Toast door angle when closed
pub const TOAST_DOOR_CLOSED: i16 = 90;

/// Toast door angle when open
pub const TOAST_DOOR_OPEN: i16 = 0;

/// Servo angles for one arm angle: `(left, right)`
///
/// The left servo runs mirrored (`200 - angle`). Both are clamped to the
/// servo's 0..=180 range the way a servo library clamps angle writes.
pub fn mirrored_angles(angle: i16) -> (u16, u16) {
    let left = (MIRROR_SPAN - angle).clamp(0, SERVO_MAX_ANGLE);
    let right = angle.clamp(0, SERVO_MAX_ANGLE);
    (left as u16, right as u16)
}

/// Boot move from mid travel to the idle angle
pub const HOME: MotionPlan = MotionPlan::new(
    "home",
    &[Segment::Sweep {
        from: 90,
        to: IDLE_ANGLE,
        step: 1,
        hold_ms: 10,
    }],
);

/// Lower the arm so a bun can slide in
pub const LOAD: MotionPlan = MotionPlan::new(
    "load",
    &[Segment::Sweep {
        from: IDLE_ANGLE,
        to: 0,
        step: -1,
        hold_ms: 10,
    }],
);

/// Settle, shake the bun loose, throw it, and return to idle
pub const THROW: MotionPlan = MotionPlan::new(
    "throw",
    &[
        Segment::Pause { ms: 3000 },
        Segment::Wiggle {
            a: 15,
            b: 0,
            times: 5,
            hold_ms: 200,
        },
        Segment::Pause { ms: 1000 },
        Segment::Sweep {
            from: 0,
            to: THROW_ANGLE,
            step: 5,
            hold_ms: 5,
        },
        Segment::Pause { ms: 1000 },
        Segment::Sweep {
            from: THROW_ANGLE,
            to: IDLE_ANGLE,
            step: -1,
            hold_ms: 10,
        },
    ],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirrored_angles() {
        assert_eq!(mirrored_angles(0), (180, 0));
        assert_eq!(mirrored_angles(100), (100, 100));
        assert_eq!(mirrored_angles(180), (20, 180));
        assert_eq!(mirrored_angles(200), (0, 180));
        assert_eq!(mirrored_angles(-5), (180, 0));
    }

    #[test]
    fn test_home_plan() {
        let mut steps = HOME.steps();
        assert_eq!(steps.next().unwrap().angle, Some(90));
        assert_eq!(HOME.final_angle(), Some(179));
        assert_eq!(HOME.steps().count(), 90);
    }

    #[test]
    fn test_load_plan() {
        assert_eq!(LOAD.steps().next().unwrap().angle, Some(180));
        assert_eq!(LOAD.final_angle(), Some(1));
        assert_eq!(LOAD.duration_ms(), 1800);
    }

    #[test]
    fn test_throw_plan() {
        let angles = THROW.steps().filter_map(|s| s.angle);
        // 10 wiggle positions, 40 throw positions, 20 return positions
        assert_eq!(angles.count(), 70);

        let throw_top = THROW
            .steps()
            .filter_map(|s| s.angle)
            .max()
            .unwrap();
        assert_eq!(throw_top, THROW_ANGLE);
        assert_eq!(THROW.final_angle(), Some(181));

        // 3000 + 2000 + 1000 + 200 + 1000 + 200
        assert_eq!(THROW.duration_ms(), 7400);
    }
}
