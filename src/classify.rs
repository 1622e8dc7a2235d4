//! Per-activity eligibility and measurement-track assignment.
//!
//! Every activity is classified exactly once per pass and the result is
//! reused by every bucket it feeds. Two tracks exist:
//!
//! - **local**: progress against the locally allocated scope (flat or grid)
//! - **boq**: progress against the contractual bill-of-quantities scope
//!
//! An activity may feed either, both or neither.
//!
//! Exclusion precedence, strongest first:
//!
//! 1. `Malformed`: a numeric field is NaN or infinite
//! 2. `Handoff`: work transfers never count toward progress
//! 3. `Unattributable`: no task and no assignee; both tracks are closed
//! 4. `NoLocalScope`: closes the local track only; BOQ is unaffected

use serde::Serialize;

use crate::core::Activity;
use crate::scope::resolve_scope;

/// Why an activity was kept out of some or all rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Malformed,
    Handoff,
    Unattributable,
    NoLocalScope,
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed"),
            Self::Handoff => write!(f, "handoff"),
            Self::Unattributable => write!(f, "unattributable"),
            Self::NoLocalScope => write!(f, "no_local_scope"),
        }
    }
}

/// Measurement tracks an activity contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Tracks {
    pub boq: bool,
    pub local: bool,
}

/// Outcome of classifying one activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub eligible: bool,
    pub reason: Option<ExclusionReason>,
    pub tracks: Tracks,
    /// Resolved local scope; zero unless the local track is open.
    pub local_scope: f64,
    /// Positive contractual quantity, recorded even when the BOQ track is
    /// closed so the BOQ tally can see it.
    pub boq_scope: f64,
}

impl Classification {
    fn excluded(reason: ExclusionReason) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
            tracks: Tracks::default(),
            local_scope: 0.0,
            boq_scope: 0.0,
        }
    }

    /// Whether the activity takes part in the BOQ coverage tally.
    pub fn is_tallied(&self) -> bool {
        !matches!(
            self.reason,
            Some(ExclusionReason::Malformed | ExclusionReason::Handoff)
        )
    }
}

/// Classify a single activity.
pub fn classify(activity: &Activity) -> Classification {
    if activity.is_malformed() {
        return Classification::excluded(ExclusionReason::Malformed);
    }
    if activity.is_handoff {
        return Classification::excluded(ExclusionReason::Handoff);
    }

    let boq_scope = activity.boq_scope().unwrap_or(0.0);

    if activity.task_ref().is_none() && activity.assignee_ref().is_none() {
        return Classification {
            boq_scope,
            ..Classification::excluded(ExclusionReason::Unattributable)
        };
    }

    let local_scope = resolve_scope(activity);
    let tracks = Tracks {
        boq: boq_scope > 0.0,
        local: local_scope > 0.0,
    };
    let reason = (!tracks.local).then_some(ExclusionReason::NoLocalScope);

    Classification {
        eligible: tracks.boq || tracks.local,
        reason,
        tracks,
        local_scope: if tracks.local { local_scope } else { 0.0 },
        boq_scope,
    }
}

/// Count of non-handoff activities with and without contractual scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BoqTally {
    pub activities_with_boq: usize,
    pub activities_without_boq: usize,
}

impl BoqTally {
    pub fn record(&mut self, classification: &Classification) {
        if !classification.is_tallied() {
            return;
        }
        if classification.boq_scope > 0.0 {
            self.activities_with_boq += 1;
        } else {
            self.activities_without_boq += 1;
        }
    }
}
