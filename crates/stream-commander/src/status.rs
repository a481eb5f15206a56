//! Status string and active flag.
//!
//! The register only decides *whether* something must be published; the
//! device facade does the sending.

/// Holds the device status and the flag that gates automatic status pushes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRegister {
    status: String,
    active: bool,
}

impl StatusRegister {
    /// Create an inactive register with an empty status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether status changes are pushed automatically.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Store `status` without any change detection.
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Store `status` if it differs from the current one.
    ///
    /// Returns `true` when a `status` message must go out: the value changed
    /// and the device is active.
    pub fn update(&mut self, status: &str) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status.to_string();
        self.active
    }

    /// Set the active flag.
    ///
    /// Returns `true` when the flag changed and an `active` message must go out.
    pub fn set_active(&mut self, active: bool) -> bool {
        if self.active == active {
            return false;
        }
        self.active = active;
        true
    }
}
