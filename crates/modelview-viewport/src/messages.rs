//! Transient status messages
//!
//! One message at a time, auto-dismissed after a fixed deadline measured in
//! frame time. The frame loop ticks the center and redraws when a message
//! appears or expires.

/// Seconds a message stays up.
pub const DISMISS_AFTER: f32 = 2.0;

/// Holds the current status message and its remaining lifetime.
#[derive(Debug, Default)]
pub struct MessageCenter {
    current: Option<String>,
    remaining: f32,
}

impl MessageCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current message and restart the dismiss deadline.
    pub fn post(&mut self, text: impl Into<String>) {
        self.current = Some(text.into());
        self.remaining = DISMISS_AFTER;
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Advance the deadline. Returns `true` when the message just expired,
    /// so the caller knows to redraw without it.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.current.is_none() {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.current = None;
            return true;
        }
        false
    }
}
