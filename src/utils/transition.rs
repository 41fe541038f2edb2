//! Phase transitions and enter/exit animation scheduling
//!
//! The view composer never animates anything itself. It reports the phase it
//! wants to show to a [`Presence`], and on every frame asks the presence which
//! layers are visible and with what motion values. Time is passed in
//! explicitly as "elapsed since mount", so the whole engine is testable
//! without a rendering surface or a real clock.
//!
//! Swaps use "wait" ordering: the outgoing layer finishes its exit before the
//! incoming layer is mounted, so at most one layer is on screen at a time.

use std::time::Duration;

/// The mutually exclusive phases a fetch-backed view can be in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Loading,
    Loaded,
    Errored,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Loading => "loading",
            PhaseKind::Loaded => "loaded",
            PhaseKind::Errored => "errored",
        }
    }
}

/// Events that move a view between phases
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEvent {
    /// The data source produced a value
    Resolved,
    /// The data source failed
    Failed,
    /// The user asked to try again after a failure
    Retry,
}

impl PhaseEvent {
    /// The event that would carry a view from `from` into `to`, if any
    pub fn between(from: PhaseKind, to: PhaseKind) -> Option<Self> {
        match (from, to) {
            (_, PhaseKind::Loaded) => Some(PhaseEvent::Resolved),
            (_, PhaseKind::Errored) => Some(PhaseEvent::Failed),
            (PhaseKind::Errored, PhaseKind::Loading) => Some(PhaseEvent::Retry),
            _ => None,
        }
    }
}

/// Anything that can be placed in a [`Presence`]
pub trait Phased {
    fn phase_kind(&self) -> PhaseKind;
}

/// Animation timing configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionConfig {
    /// Length of one exit or one enter animation
    pub duration_ms: u64,
    /// Vertical travel in pixels
    pub offset_px: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 300,
            offset_px: 12.0,
        }
    }
}

impl TransitionConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Cubic bezier timing curve anchored at (0,0) and (1,1)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl CubicBezier {
    /// CSS `ease-out`
    pub const EASE_OUT: CubicBezier = CubicBezier {
        x1: 0.0,
        y1: 0.0,
        x2: 0.58,
        y2: 1.0,
    };

    fn component(t: f32, p1: f32, p2: f32) -> f32 {
        let u = 1.0 - t;
        3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
    }

    /// Progress along the curve for a linear time fraction `x` in 0..=1
    pub fn solve(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        // x(t) is monotonic for control points inside the unit square
        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        let mut t = x;
        for _ in 0..24 {
            let estimate = Self::component(t, self.x1, self.x2);
            if (estimate - x).abs() < 1e-5 {
                break;
            }
            if estimate < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) / 2.0;
        }
        Self::component(t, self.y1, self.y2)
    }
}

/// Visual values for one layer at one instant
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub opacity: f32,
    pub offset_y: f32,
}

impl Motion {
    pub const VISIBLE: Motion = Motion {
        opacity: 1.0,
        offset_y: 0.0,
    };

    fn lerp(from: Motion, to: Motion, t: f32) -> Motion {
        Motion {
            opacity: from.opacity + (to.opacity - from.opacity) * t,
            offset_y: from.offset_y + (to.offset_y - from.offset_y) * t,
        }
    }

    /// Inline CSS for this motion
    pub fn style(&self) -> String {
        format!(
            "opacity: {:.3}; transform: translateY({:.2}px);",
            self.opacity, self.offset_y
        )
    }
}

/// A single tween between two motions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    pub from: Motion,
    pub to: Motion,
    pub duration: Duration,
    pub easing: CubicBezier,
}

impl Animation {
    /// Fade in while rising from below
    pub fn enter(config: &TransitionConfig) -> Self {
        Self {
            from: Motion {
                opacity: 0.0,
                offset_y: config.offset_px,
            },
            to: Motion::VISIBLE,
            duration: config.duration(),
            easing: CubicBezier::EASE_OUT,
        }
    }

    /// Fade out while rising above, mirroring [`Animation::enter`]
    pub fn exit(config: &TransitionConfig) -> Self {
        Self {
            from: Motion::VISIBLE,
            to: Motion {
                opacity: 0.0,
                offset_y: -config.offset_px,
            },
            duration: config.duration(),
            easing: CubicBezier::EASE_OUT,
        }
    }

    /// Same curve and target, starting from wherever the layer is now
    pub fn starting_from(mut self, from: Motion) -> Self {
        self.from = from;
        self
    }

    pub fn sample(&self, elapsed: Duration) -> Motion {
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.to;
        }
        let progress = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        Motion::lerp(self.from, self.to, self.easing.solve(progress))
    }
}

/// One row of the transition table
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub next: PhaseKind,
    pub exit: Animation,
    pub enter: Animation,
}

/// The transition table: `(current, event) -> (next, exit, enter)`
///
/// `Loaded` is terminal; nothing leaves it.
pub fn transition(
    current: PhaseKind,
    event: PhaseEvent,
    config: &TransitionConfig,
) -> Option<Transition> {
    let next = match (current, event) {
        (PhaseKind::Loading, PhaseEvent::Resolved) => PhaseKind::Loaded,
        (PhaseKind::Loading, PhaseEvent::Failed) => PhaseKind::Errored,
        (PhaseKind::Errored, PhaseEvent::Retry) => PhaseKind::Loading,
        // a retry that settled before its Loading value was observed
        (PhaseKind::Errored, PhaseEvent::Resolved) => PhaseKind::Loaded,
        _ => return None,
    };

    Some(Transition {
        next,
        exit: Animation::exit(config),
        enter: Animation::enter(config),
    })
}

#[derive(Clone, Debug)]
struct Layer<P> {
    id: u64,
    phase: P,
    animation: Animation,
    starts_at: Duration,
}

impl<P> Layer<P> {
    fn ends_at(&self) -> Duration {
        self.starts_at + self.animation.duration
    }

    fn motion_at(&self, now: Duration) -> Motion {
        if now <= self.starts_at {
            return self.animation.from;
        }
        self.animation.sample(now - self.starts_at)
    }
}

/// A layer to draw on this frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerFrame<'a, P> {
    /// Stable per-mount identity, usable as a render key
    pub id: u64,
    pub phase: &'a P,
    pub motion: Motion,
}

/// Tracks the displayed layer and any layer still leaving the screen
#[derive(Clone, Debug)]
pub struct Presence<P> {
    config: TransitionConfig,
    current: Layer<P>,
    exiting: Option<Layer<P>>,
    next_id: u64,
}

impl<P: Phased> Presence<P> {
    /// Mount the first layer; it plays its enter animation from `now`
    pub fn new(phase: P, config: TransitionConfig, now: Duration) -> Self {
        Self {
            current: Layer {
                id: 0,
                phase,
                animation: Animation::enter(&config),
                starts_at: now,
            },
            exiting: None,
            next_id: 1,
            config,
        }
    }

    pub fn current(&self) -> &P {
        &self.current.phase
    }

    pub fn current_kind(&self) -> PhaseKind {
        self.current.phase.phase_kind()
    }

    /// Request that `phase` be displayed from `now` on
    ///
    /// Returns true when a transition was scheduled. A phase of the same kind
    /// replaces the payload in place; a pair missing from the transition
    /// table is ignored.
    pub fn show(&mut self, phase: P, now: Duration) -> bool {
        let from = self.current_kind();
        let to = phase.phase_kind();

        if from == to {
            self.current.phase = phase;
            return false;
        }

        let Some(step) = PhaseEvent::between(from, to)
            .and_then(|event| transition(from, event, &self.config))
        else {
            log::debug!("Ignoring {} -> {} phase change", from.as_str(), to.as_str());
            return false;
        };

        log::debug!("Transition {} -> {}", from.as_str(), step.next.as_str());

        // A swap still in progress is settled: the old exiting layer is
        // dropped and the current one leaves from wherever it is now.
        let leaving_from = self.current.motion_at(now);
        let incoming = Layer {
            id: self.next_id,
            phase,
            animation: step.enter,
            starts_at: now + step.exit.duration,
        };
        self.next_id += 1;

        let outgoing = std::mem::replace(&mut self.current, incoming);
        self.exiting = Some(Layer {
            id: outgoing.id,
            phase: outgoing.phase,
            animation: step.exit.starting_from(leaving_from),
            starts_at: now,
        });
        true
    }

    /// Visible layers at `now`, in paint order
    pub fn frame(&self, now: Duration) -> Vec<LayerFrame<'_, P>> {
        if let Some(exiting) = &self.exiting {
            if now < exiting.ends_at() {
                return vec![LayerFrame {
                    id: exiting.id,
                    phase: &exiting.phase,
                    motion: exiting.motion_at(now),
                }];
            }
        }

        vec![LayerFrame {
            id: self.current.id,
            phase: &self.current.phase,
            motion: self.current.motion_at(now),
        }]
    }

    /// True while any layer is still moving at `now`
    pub fn is_animating(&self, now: Duration) -> bool {
        now < self.current.ends_at()
    }
}
