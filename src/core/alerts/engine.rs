// Alert engine - runs every rule against a snapshot.
//
// Output order is rule order (`AlertKind::all()`), NOT severity order. Callers
// wanting the most severe alert first sort with `sort_by_severity`.

use super::model::{Alert, AlertKind, Severity};
use super::triggers::evaluate_rule;
use crate::core::model::SignalSnapshot;

/// Derive the alert list for one snapshot.
///
/// Pure and deterministic: the same snapshot always yields the same list. At
/// most one alert per kind. An empty list is the "all clear" result, not an
/// error.
pub fn derive_alerts(snapshot: &SignalSnapshot) -> Vec<Alert> {
    AlertKind::all()
        .iter()
        .filter_map(|kind| evaluate_rule(*kind, snapshot))
        .collect()
}

/// Most severe first; rule order is kept between alerts of equal severity.
pub fn sort_by_severity(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
}

pub fn highest_severity(alerts: &[Alert]) -> Option<Severity> {
    alerts.iter().map(|a| a.severity).max()
}
