use glam::Vec3;
use serde::Serialize;

use crate::behavior::{Frame, LodBehavior};
use crate::proximity::DistanceRange;

/// What the dispatcher hands to a behavior each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LodSignal {
    Visible { zone: usize, closeness: f32 },
    Invisible,
}

/// The two dispatcher states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LodState {
    Visible,
    Invisible,
}

impl LodSignal {
    pub fn state(&self) -> LodState {
        match self {
            Self::Visible { .. } => LodState::Visible,
            Self::Invisible => LodState::Invisible,
        }
    }

    pub fn zone(&self) -> Option<usize> {
        match self {
            Self::Visible { zone, .. } => Some(*zone),
            Self::Invisible => None,
        }
    }
}

impl std::fmt::Display for LodSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Visible { zone, closeness } => {
                write!(f, "visible zone={zone} closeness={closeness:.3}")
            }
            Self::Invisible => write!(f, "invisible"),
        }
    }
}

/// How closeness is produced for a behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClosenessMode {
    /// Normalize the distance to the selected observer.
    Distance(DistanceRange),
    /// Distance-insensitive behaviors always receive this value.
    Fixed(f32),
}

/// Combine the nearest zone and the selected observer into a signal.
///
/// Visible requires both a visible zone and a selected observer.
pub fn resolve(
    nearest_zone: Option<usize>,
    observer: Option<Vec3>,
    position: Vec3,
    mode: ClosenessMode,
) -> LodSignal {
    match (nearest_zone, observer) {
        (Some(zone), Some(eye)) => {
            let closeness = match mode {
                ClosenessMode::Distance(range) => range.closeness(eye.distance(position)),
                ClosenessMode::Fixed(value) => value,
            };
            LodSignal::Visible { zone, closeness }
        }
        _ => LodSignal::Invisible,
    }
}

/// Delivers one signal per tick and tracks the VISIBLE/INVISIBLE state.
#[derive(Debug, Clone, Default)]
pub struct LodDispatcher {
    last: Option<LodSignal>,
}

impl LodDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<LodSignal> {
        self.last
    }

    pub fn state(&self) -> Option<LodState> {
        self.last.map(|s| s.state())
    }

    pub fn dispatch<B: LodBehavior + ?Sized>(
        &mut self,
        signal: LodSignal,
        behavior: &mut B,
        frame: &Frame,
    ) {
        match signal {
            LodSignal::Visible { zone, closeness } => behavior.on_visible(zone, closeness, frame),
            LodSignal::Invisible => behavior.on_invisible(frame),
        }

        let previous = self.state();
        if previous != Some(signal.state()) {
            tracing::debug!(frame = frame.index, ?previous, %signal, "lod state changed");
        }
        self.last = Some(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<LodSignal>,
    }

    impl LodBehavior for Recorder {
        fn zone_radii(&self) -> Vec<f32> {
            vec![1.0]
        }

        fn on_visible(&mut self, zone: usize, closeness: f32, _frame: &Frame) {
            self.calls.push(LodSignal::Visible { zone, closeness });
        }

        fn on_invisible(&mut self, _frame: &Frame) {
            self.calls.push(LodSignal::Invisible);
        }
    }

    #[test]
    fn no_zone_is_invisible() {
        let mode = ClosenessMode::Fixed(0.0);
        assert_eq!(
            resolve(None, Some(Vec3::ZERO), Vec3::ZERO, mode),
            LodSignal::Invisible
        );
    }

    #[test]
    fn no_observer_is_invisible() {
        let mode = ClosenessMode::Fixed(0.0);
        assert_eq!(resolve(Some(0), None, Vec3::ZERO, mode), LodSignal::Invisible);
    }

    #[test]
    fn distance_mode_normalizes() {
        let mode = ClosenessMode::Distance(DistanceRange::new(10.0, 15.0));
        let signal = resolve(Some(1), Some(Vec3::new(12.5, 0.0, 0.0)), Vec3::ZERO, mode);
        assert_eq!(
            signal,
            LodSignal::Visible {
                zone: 1,
                closeness: 0.5
            }
        );
    }

    #[test]
    fn fixed_mode_ignores_distance() {
        let mode = ClosenessMode::Fixed(0.25);
        let signal = resolve(Some(0), Some(Vec3::splat(1000.0)), Vec3::ZERO, mode);
        assert_eq!(
            signal,
            LodSignal::Visible {
                zone: 0,
                closeness: 0.25
            }
        );
    }

    #[test]
    fn dispatch_routes_to_callbacks() {
        let mut dispatcher = LodDispatcher::new();
        let mut behavior = Recorder::default();
        let frame = Frame::default();
        let visible = LodSignal::Visible {
            zone: 2,
            closeness: 1.0,
        };

        dispatcher.dispatch(visible, &mut behavior, &frame);
        dispatcher.dispatch(visible, &mut behavior, &frame);
        dispatcher.dispatch(LodSignal::Invisible, &mut behavior, &frame);

        assert_eq!(
            behavior.calls,
            vec![visible, visible, LodSignal::Invisible]
        );
        assert_eq!(dispatcher.state(), Some(LodState::Invisible));
    }

    #[test]
    fn signal_display() {
        assert_eq!(LodSignal::Invisible.to_string(), "invisible");
        let visible = LodSignal::Visible {
            zone: 1,
            closeness: 0.5,
        };
        assert_eq!(visible.to_string(), "visible zone=1 closeness=0.500");
        assert_eq!(visible.zone(), Some(1));
    }
}
