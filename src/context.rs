use std::time::Instant;

/// Process-wide execution context. Constructed in `main` before option
/// parsing, passed by reference to every component that needs it, and dropped
/// only on process exit. There is deliberately no global equivalent.
#[derive(Debug)]
pub struct Context {
    started_at: Instant,
    /// Effective listening locator, present once the transport has bound.
    listening_locator: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            listening_locator: None,
        }
    }

    /// Record the transport-reported locator after a successful bind.
    pub fn set_listening_locator(&mut self, locator: String) {
        self.listening_locator = Some(locator);
    }

    /// Best-known listening locator for diagnostics, bound or not.
    pub fn listening_description(&self) -> &str {
        self.listening_locator.as_deref().unwrap_or("(not listening)")
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
