//! Repaint governor.
//!
//! egui redraws whenever a repaint is requested; requesting one every frame
//! burns a core for a window that is usually idle. Harbor repaints for three
//! reasons only:
//!
//! 1. user input — egui wakes itself, nothing to do here;
//! 2. a one-shot state change signalled from outside the input path
//!    (a background worker sent a progress event): `mark_needs_repaint`;
//! 3. a continuous phase (a paste in flight, animating progress):
//!    `set_continuous(true)` until the phase ends.

use std::time::Duration;

/// Repaint interval while a continuous phase is active.
const CONTINUOUS_INTERVAL: Duration = Duration::from_millis(100);

/// Drop into the app struct; call [`RepaintController::end_frame`] at the
/// bottom of `update()`.
pub struct RepaintController {
    continuous: bool,
    needs_repaint: bool,
}

impl Default for RepaintController {
    fn default() -> Self {
        Self::new()
    }
}

impl RepaintController {
    pub fn new() -> Self {
        Self {
            continuous: false,
            needs_repaint: false,
        }
    }

    /// Enable or disable timed repainting for a continuous phase.
    pub fn set_continuous(&mut self, continuous: bool) {
        self.continuous = continuous;
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Request a single repaint on the next opportunity. Call when state
    /// changed outside of user input (e.g. a worker message arrived).
    pub fn mark_needs_repaint(&mut self) {
        self.needs_repaint = true;
    }

    /// Schedule the next repaint if one is due. Otherwise egui sleeps until
    /// the next input event.
    pub fn end_frame(&mut self, ctx: &egui::Context) {
        if self.continuous {
            ctx.request_repaint_after(CONTINUOUS_INTERVAL);
        } else if self.needs_repaint {
            ctx.request_repaint();
        }
        self.needs_repaint = false;
    }
}
