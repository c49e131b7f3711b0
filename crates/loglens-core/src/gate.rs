//! Access gate
//!
//! Every request handler calls [`AccessGate::authorize`] first and branches
//! on the returned [`Decision`].

use crate::types::CallerIdentity;

/// Classes of operations the gate knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// List, read, stat or clear log files, or view the UI
    AdminFileOperation,
    /// Post a browser-side log record
    ClientLogSubmission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    NotPrivileged,
    ClientLoggingDisabled,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "authentication required",
            DenyReason::NotPrivileged => "administrator privileges required",
            DenyReason::ClientLoggingDisabled => "Client logger is disabled.",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// Access policy for log administration and client log submission
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGate {
    allow_client_logging: bool,
}

impl AccessGate {
    pub fn new(allow_client_logging: bool) -> Self {
        Self {
            allow_client_logging,
        }
    }

    pub fn client_logging_enabled(&self) -> bool {
        self.allow_client_logging
    }

    pub fn authorize(&self, identity: &CallerIdentity, operation: Operation) -> Decision {
        match operation {
            Operation::AdminFileOperation => {
                if !identity.authenticated {
                    Decision::Denied(DenyReason::Unauthenticated)
                } else if !identity.privileged {
                    Decision::Denied(DenyReason::NotPrivileged)
                } else {
                    Decision::Allowed
                }
            }
            Operation::ClientLogSubmission => {
                if self.allow_client_logging {
                    Decision::Allowed
                } else {
                    Decision::Denied(DenyReason::ClientLoggingDisabled)
                }
            }
        }
    }
}
