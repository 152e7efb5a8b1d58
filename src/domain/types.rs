//! Status and classification codes persisted as integers.
//!
//! Rows may carry codes outside the known ranges; those are tolerated on read
//! and render as an empty label.

/// A closed set of numeric codes with a display label per member.
pub trait Coded: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn code(self) -> i32;

    fn label(self) -> &'static str;

    fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|member| member.code() == code)
    }
}

/// Display label for a raw code, or `""` when the code is unknown.
pub fn label_for<T: Coded>(code: i32) -> &'static str {
    T::from_code(code).map(T::label).unwrap_or("")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportStatus {
    Open,
    InProgress,
    Resolved,
}

impl Coded for ReportStatus {
    const ALL: &'static [Self] = &[Self::Open, Self::InProgress, Self::Resolved];

    fn code(self) -> i32 {
        match self {
            ReportStatus::Open => 10,
            ReportStatus::InProgress => 20,
            ReportStatus::Resolved => 30,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ReportStatus::Open => "Open",
            ReportStatus::InProgress => "In Progress",
            ReportStatus::Resolved => "Resolved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanStatus {
    InProgress,
    Pending,
    Completed,
    Cancelled,
}

impl PlanStatus {
    /// Completed and cancelled plans accept no further status changes.
    pub fn is_closed(self) -> bool {
        matches!(self, PlanStatus::Completed | PlanStatus::Cancelled)
    }
}

impl Coded for PlanStatus {
    const ALL: &'static [Self] = &[
        Self::InProgress,
        Self::Pending,
        Self::Completed,
        Self::Cancelled,
    ];

    fn code(self) -> i32 {
        match self {
            PlanStatus::InProgress => 10,
            PlanStatus::Pending => 20,
            PlanStatus::Completed => 30,
            PlanStatus::Cancelled => 40,
        }
    }

    fn label(self) -> &'static str {
        match self {
            PlanStatus::InProgress => "In Progress",
            PlanStatus::Pending => "Pending",
            PlanStatus::Completed => "Completed",
            PlanStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Low,
    Moderate,
    High,
}

impl Coded for Priority {
    const ALL: &'static [Self] = &[Self::Low, Self::Moderate, Self::High];

    fn code(self) -> i32 {
        match self {
            Priority::Low => 10,
            Priority::Moderate => 20,
            Priority::High => 30,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Moderate => "Moderate",
            Priority::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    Corrective,
    Preventive,
    Mitigation,
    Containment,
    Monitoring,
    Administrative,
}

impl Coded for ActionType {
    const ALL: &'static [Self] = &[
        Self::Corrective,
        Self::Preventive,
        Self::Mitigation,
        Self::Containment,
        Self::Monitoring,
        Self::Administrative,
    ];

    fn code(self) -> i32 {
        match self {
            ActionType::Corrective => 10,
            ActionType::Preventive => 20,
            ActionType::Mitigation => 30,
            ActionType::Containment => 40,
            ActionType::Monitoring => 50,
            ActionType::Administrative => 60,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ActionType::Corrective => "Corrective",
            ActionType::Preventive => "Preventive",
            ActionType::Mitigation => "Mitigation",
            ActionType::Containment => "Containment",
            ActionType::Monitoring => "Monitoring",
            ActionType::Administrative => "Administrative",
        }
    }
}
