use std::fmt;

use crate::user::errors::CodeError;
use crate::user::errors::UserError;

/// Account status.
///
/// The numeric codes are persisted and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserStatus {
    /// Reserved; withdrawal deletes the record instead of storing this.
    Withdrawn,
    Blocked,
    /// Awaiting activation through the mailed key.
    Deactivated,
    Normal,
}

impl UserStatus {
    pub fn code(self) -> i16 {
        match self {
            UserStatus::Withdrawn => -1,
            UserStatus::Blocked => -2,
            UserStatus::Deactivated => 0,
            UserStatus::Normal => 1,
        }
    }
}

impl TryFrom<i16> for UserStatus {
    type Error = CodeError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(UserStatus::Withdrawn),
            -2 => Ok(UserStatus::Blocked),
            0 => Ok(UserStatus::Deactivated),
            1 => Ok(UserStatus::Normal),
            other => Err(CodeError::UnknownStatus(other)),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UserStatus::Withdrawn => "withdrawn",
            UserStatus::Blocked => "blocked",
            UserStatus::Deactivated => "deactivated",
            UserStatus::Normal => "normal",
        };
        f.write_str(name)
    }
}

/// A status change with exactly one legal source and one target.
///
/// Withdrawal is not a transition: it deletes the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Activate,
    Block,
    Unblock,
}

impl Transition {
    pub fn source(self) -> UserStatus {
        match self {
            Transition::Activate => UserStatus::Deactivated,
            Transition::Block => UserStatus::Normal,
            Transition::Unblock => UserStatus::Blocked,
        }
    }

    pub fn target(self) -> UserStatus {
        match self {
            Transition::Activate => UserStatus::Normal,
            Transition::Block => UserStatus::Blocked,
            Transition::Unblock => UserStatus::Normal,
        }
    }

    /// Check that the transition may be applied to a user in `current`.
    ///
    /// # Returns
    /// The target status
    ///
    /// # Errors
    /// * `InvalidTransition` - `current` is not the transition's source
    pub fn check(self, current: UserStatus) -> Result<UserStatus, UserError> {
        if current == self.source() {
            Ok(self.target())
        } else {
            Err(UserError::InvalidTransition {
                from: current,
                transition: self,
            })
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transition::Activate => "activate",
            Transition::Block => "block",
            Transition::Unblock => "unblock",
        };
        f.write_str(name)
    }
}
