//! The compression run as a pure transition function.
//!
//! A run is a sequence of `(RunState, Event) -> Step` transitions. The state
//! holds everything that changes across iterations (current dimensions,
//! downscale count, best candidate so far). Performing the requested
//! [`Effect`] and feeding back the resulting [`Event`] is the driver's job;
//! see [`Compressor`](super::Compressor).
//!
//! ```text
//! start -> Searching --Searched--> (met | budget spent | too small) -> Finished
//!              ^                         |
//!              |                         v
//!              +------Resampled----- Downscaling
//! ```

use super::scale::{DimensionScaler, ScaleStep};
use super::{CompressionRequest, EncodedCandidate, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A candidate together with the dimensions it was encoded at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedCandidate {
    pub candidate: EncodedCandidate,
    pub dims: Dimensions,
    pub distance: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a quality search at the current dimensions.
    Searching,
    /// Waiting for the working buffer to be resampled to these dimensions.
    Downscaling(Dimensions),
}

/// Work the driver must perform next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Run a quality search on the working buffer.
    Search(Dimensions),
    /// Replace the working buffer with one resampled to these dimensions.
    Resample(Dimensions),
}

/// Result of performing an [`Effect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Searched(EncodedCandidate),
    Resampled(Dimensions),
}

/// Terminal value of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    pub outcome: Outcome,
    pub winner: RankedCandidate,
    pub downscale_steps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue(RunState, Effect),
    Finished(Finished),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    dims: Dimensions,
    downscale_steps: u32,
    best: Option<RankedCandidate>,
    phase: Phase,
}

impl RunState {
    /// Initial state for a working buffer of `dims`, and its first effect.
    pub fn start(dims: Dimensions) -> (Self, Effect) {
        let state = Self {
            dims,
            downscale_steps: 0,
            best: None,
            phase: Phase::Searching,
        };
        (state, Effect::Search(dims))
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    pub fn downscale_steps(&self) -> u32 {
        self.downscale_steps
    }

    pub fn best(&self) -> Option<&RankedCandidate> {
        self.best.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Effect the current phase is waiting on.
    pub fn pending_effect(&self) -> Effect {
        match self.phase {
            Phase::Searching => Effect::Search(self.dims),
            Phase::Downscaling(to) => Effect::Resample(to),
        }
    }

    /// Apply one event. Events that do not match the phase leave the state
    /// unchanged and re-request the pending effect.
    pub fn step(self, event: Event, request: &CompressionRequest) -> Step {
        match (self.phase, event) {
            (Phase::Searching, Event::Searched(candidate)) => self.evaluate(candidate, request),
            (Phase::Downscaling(_), Event::Resampled(dims)) => {
                let state = Self {
                    dims,
                    downscale_steps: self.downscale_steps + 1,
                    best: self.best,
                    phase: Phase::Searching,
                };
                Step::Continue(state, Effect::Search(dims))
            }
            _ => {
                let effect = self.pending_effect();
                Step::Continue(self, effect)
            }
        }
    }

    fn evaluate(self, candidate: EncodedCandidate, request: &CompressionRequest) -> Step {
        let target = request.target_size_bytes;
        let fits = candidate.size() <= target;
        let ranked = RankedCandidate {
            distance: candidate.distance_to(target),
            candidate,
            dims: self.dims,
        };

        let best = match self.best {
            Some(previous) if previous.distance <= ranked.distance => previous,
            _ => ranked,
        };

        let outcome = if fits {
            Some(Outcome::TargetMet)
        } else if self.downscale_steps >= request.max_downscale_attempts {
            Some(Outcome::AttemptsExhausted)
        } else {
            None
        };

        if let Some(outcome) = outcome {
            return Step::Finished(Finished {
                outcome,
                winner: best,
                downscale_steps: self.downscale_steps,
            });
        }

        let scaler = DimensionScaler::new(request.downscale_factor, request.min_dimension_floor);
        match scaler.next(self.dims) {
            ScaleStep::TooSmall => {
                log::warn!(
                    "Image too small to compress further at {}x{}",
                    self.dims.width,
                    self.dims.height
                );
                Step::Finished(Finished {
                    outcome: Outcome::TooSmall,
                    winner: best,
                    downscale_steps: self.downscale_steps,
                })
            }
            ScaleStep::Resize(to) => Step::Continue(
                Self {
                    dims: self.dims,
                    downscale_steps: self.downscale_steps,
                    best: Some(best),
                    phase: Phase::Downscaling(to),
                },
                Effect::Resample(to),
            ),
        }
    }
}
