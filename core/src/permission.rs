//! The "add address" permission flow.
//!
//! ```text
//! Unrequested --request, not granted--> Pending --both granted--> Granted
//!                                          \--any denied--> Denied(Soft | Hard)
//! ```
//!
//! The machine only decides; the host performs the returned [`FlowAction`]
//! (show the OS prompt, start updates, show a message).

use tracing::{debug, warn};

use crate::location::Permission;

pub const RATIONALE_MESSAGE: &str = "Location Permission is required for this feature to work";
pub const SETTINGS_MESSAGE: &str = "Location Permission is required: enable in device settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The OS will show the prompt again; explain why it matters.
    Soft,
    /// The user has to go to settings.
    Hard,
}

impl Denial {
    pub fn message(&self) -> &'static str {
        match self {
            Denial::Soft => RATIONALE_MESSAGE,
            Denial::Hard => SETTINGS_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unrequested,
    Pending,
    Granted,
    Denied(Denial),
}

/// What the host should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    /// Show the OS prompt for these permissions.
    RequestPermissions(&'static [Permission]),
    /// Start location updates and switch to the location view.
    StartUpdates,
    ShowMessage(&'static str),
    None,
}

/// Outcome of the OS permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionGrant {
    pub fine: bool,
    pub coarse: bool,
}

impl PermissionGrant {
    pub fn all_granted(&self) -> bool {
        self.fine && self.coarse
    }
}

#[derive(Debug, Default)]
pub struct PermissionFlow {
    state: PermissionState,
}

impl PermissionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    /// The user asked for an address.
    ///
    /// `already_granted` is the live permission check. Asking again after a
    /// grant was revoked goes back through the prompt.
    pub fn request_address(&mut self, already_granted: bool) -> FlowAction {
        if already_granted {
            self.state = PermissionState::Granted;
            FlowAction::StartUpdates
        } else {
            self.state = PermissionState::Pending;
            debug!("requesting location permissions");
            FlowAction::RequestPermissions(&Permission::ALL)
        }
    }

    /// The OS prompt returned.
    ///
    /// `rationale_required` is true when the OS says a rationale should be
    /// shown for either permission.
    pub fn on_permission_result(
        &mut self,
        grant: PermissionGrant,
        rationale_required: bool,
    ) -> FlowAction {
        if self.state != PermissionState::Pending {
            warn!(state = ?self.state, "permission result without a pending request");
            return FlowAction::None;
        }

        if grant.all_granted() {
            self.state = PermissionState::Granted;
            return FlowAction::StartUpdates;
        }

        let denial = if rationale_required {
            Denial::Soft
        } else {
            Denial::Hard
        };
        self.state = PermissionState::Denied(denial);
        debug!(?denial, ?grant, "location permission denied");
        FlowAction::ShowMessage(denial.message())
    }
}
