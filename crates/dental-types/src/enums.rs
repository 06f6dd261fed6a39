//! Closed enumerations for roles and entity states.
//!
//! Every enum round-trips through the same lower-case wire string in JSON and in the
//! database (`TEXT` columns), so the string tables below are the single source of truth.

use std::fmt;
use std::str::FromStr;

/// A string did not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}', expected one of: {expected}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, utoipa::ToSchema,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_owned(),
                        expected: [$($wire),+].join(", "),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Staff role carried in every session token.
    Role, "role" {
        Dentist => "dentist",
        Hygienist => "hygienist",
        /// Superuser: passes every role guard.
        Admin => "admin",
        Staff => "staff",
    }
}

impl Role {
    /// Whether a caller holding `self` may pass a guard that requires `required`.
    pub fn satisfies(self, required: Role) -> bool {
        self == required || self == Role::Admin
    }
}

wire_enum! {
    RiskLevel, "risk level" {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Low
    }
}

wire_enum! {
    AppointmentStatus, "appointment status" {
        Scheduled => "scheduled",
        Completed => "completed",
        Cancelled => "cancelled",
        NoShow => "no-show",
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Scheduled
    }
}

wire_enum! {
    TreatmentStatus, "treatment status" {
        Pending => "pending",
        InProgress => "in-progress",
        Completed => "completed",
    }
}

impl TreatmentStatus {
    /// Assignments in these states make up the treatment queue.
    pub const QUEUED: &'static [TreatmentStatus] =
        &[TreatmentStatus::Pending, TreatmentStatus::InProgress];

    pub fn is_queued(self) -> bool {
        Self::QUEUED.contains(&self)
    }
}

impl Default for TreatmentStatus {
    fn default() -> Self {
        TreatmentStatus::Pending
    }
}

wire_enum! {
    Priority, "priority" {
        Low => "low",
        Normal => "normal",
        High => "high",
        Urgent => "urgent",
    }
}

impl Priority {
    /// Queue rank: smaller is served first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Normal => 2,
            Priority::Low => 3,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

wire_enum! {
    InvoiceStatus, "invoice status" {
        Pending => "pending",
        Paid => "paid",
        Overdue => "overdue",
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Pending
    }
}

wire_enum! {
    ClaimStatus, "claim status" {
        Submitted => "submitted",
        Approved => "approved",
        Denied => "denied",
    }
}

impl Default for ClaimStatus {
    fn default() -> Self {
        ClaimStatus::Submitted
    }
}
