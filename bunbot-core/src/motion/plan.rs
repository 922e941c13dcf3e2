//! Servo motion plans
//!
//! A plan is a static list of segments that expands into timed
//! [`ServoStep`]s. The executing task writes each step's angle (if any)
//! and then waits `hold_ms` before taking the next step.

/// One element of a motion plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Segment {
    /// Wait without moving
    Pause { ms: u32 },
    /// Move from `from` towards `to` (exclusive) in increments of `step`
    Sweep {
        from: i16,
        to: i16,
        step: i16,
        hold_ms: u32,
    },
    /// Alternate between `a` and `b`, `times` round trips
    Wiggle {
        a: i16,
        b: i16,
        times: u8,
        hold_ms: u32,
    },
}

impl Segment {
    /// Number of steps this segment expands into
    pub fn len(&self) -> usize {
        match *self {
            Segment::Pause { .. } => 1,
            Segment::Sweep { from, to, step, .. } => {
                if step == 0 || (to - from).signum() != step.signum() {
                    return 0;
                }
                let distance = (i32::from(to) - i32::from(from)).unsigned_abs();
                let stride = i32::from(step).unsigned_abs();
                distance.div_ceil(stride) as usize
            }
            Segment::Wiggle { times, .. } => usize::from(times) * 2,
        }
    }

    /// Check if the segment expands to nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn step_at(&self, n: usize) -> ServoStep {
        match *self {
            Segment::Pause { ms } => ServoStep {
                angle: None,
                hold_ms: ms,
            },
            Segment::Sweep {
                from,
                step,
                hold_ms,
                ..
            } => ServoStep {
                angle: Some(from + step * n as i16),
                hold_ms,
            },
            Segment::Wiggle { a, b, hold_ms, .. } => ServoStep {
                angle: Some(if n % 2 == 0 { a } else { b }),
                hold_ms,
            },
        }
    }
}

/// A single timed servo command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoStep {
    /// Angle to command, `None` to keep the current one
    pub angle: Option<i16>,
    /// Time to wait after commanding the angle
    pub hold_ms: u32,
}

/// A named sequence of segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionPlan {
    /// Name for log output
    pub name: &'static str,
    segments: &'static [Segment],
}

impl MotionPlan {
    /// Create a plan from static segments
    pub const fn new(name: &'static str, segments: &'static [Segment]) -> Self {
        Self { name, segments }
    }

    /// Segments in execution order
    pub fn segments(&self) -> &'static [Segment] {
        self.segments
    }

    /// Expand into steps
    pub fn steps(&self) -> PlanSteps {
        PlanSteps {
            segments: self.segments,
            segment: 0,
            index: 0,
        }
    }

    /// Total time the plan takes to run
    pub fn duration_ms(&self) -> u32 {
        self.steps().map(|s| s.hold_ms).sum()
    }

    /// Last commanded angle
    pub fn final_angle(&self) -> Option<i16> {
        self.steps().filter_map(|s| s.angle).last()
    }
}

/// Iterator over the steps of a [`MotionPlan`]
#[derive(Debug, Clone)]
pub struct PlanSteps {
    segments: &'static [Segment],
    segment: usize,
    index: usize,
}

impl Iterator for PlanSteps {
    type Item = ServoStep;

    fn next(&mut self) -> Option<ServoStep> {
        loop {
            let segment = self.segments.get(self.segment)?;
            if self.index < segment.len() {
                let step = segment.step_at(self.index);
                self.index += 1;
                return Some(step);
            }
            self.segment += 1;
            self.index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_len() {
        let up = Segment::Sweep {
            from: 0,
            to: 200,
            step: 5,
            hold_ms: 5,
        };
        assert_eq!(up.len(), 40);

        let down = Segment::Sweep {
            from: 180,
            to: 0,
            step: -1,
            hold_ms: 10,
        };
        assert_eq!(down.len(), 180);

        let wrong_way = Segment::Sweep {
            from: 0,
            to: 10,
            step: -1,
            hold_ms: 10,
        };
        assert!(wrong_way.is_empty());
    }

    #[test]
    fn test_uneven_sweep_stops_before_end() {
        const SEGMENTS: &[Segment] = &[Segment::Sweep {
            from: 0,
            to: 10,
            step: 4,
            hold_ms: 1,
        }];
        let plan = MotionPlan::new("uneven", SEGMENTS);
        let mut angles = [0i16; 3];
        for (slot, step) in angles.iter_mut().zip(plan.steps()) {
            *slot = step.angle.unwrap();
        }
        assert_eq!(angles, [0, 4, 8]);
        assert_eq!(plan.steps().count(), 3);
    }

    #[test]
    fn test_wiggle_alternates() {
        const SEGMENTS: &[Segment] = &[Segment::Wiggle {
            a: 15,
            b: 0,
            times: 2,
            hold_ms: 200,
        }];
        let plan = MotionPlan::new("wiggle", SEGMENTS);
        let mut steps = plan.steps();
        assert_eq!(steps.next().unwrap().angle, Some(15));
        assert_eq!(steps.next().unwrap().angle, Some(0));
        assert_eq!(steps.next().unwrap().angle, Some(15));
        assert_eq!(steps.next().unwrap().angle, Some(0));
        assert_eq!(steps.next(), None);
        assert_eq!(plan.duration_ms(), 800);
    }

    #[test]
    fn test_pause_has_no_angle() {
        const SEGMENTS: &[Segment] = &[Segment::Pause { ms: 3000 }];
        let plan = MotionPlan::new("pause", SEGMENTS);
        let step = plan.steps().next().unwrap();
        assert_eq!(step.angle, None);
        assert_eq!(step.hold_ms, 3000);
        assert_eq!(plan.final_angle(), None);
    }
}
