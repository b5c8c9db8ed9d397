use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::records::{CaseRecord, TheatreData};

// ---------------------------------------------------------------------------
// Filter predicate: which case types / treatment functions are selected
// ---------------------------------------------------------------------------

/// The user's slicer state. An empty set selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub case_types: BTreeSet<String>,
    pub treatment_functions: BTreeSet<String>,
}

impl FilterSelection {
    /// Everything selected (the dashboard's initial state).
    pub fn all(data: &TheatreData) -> Self {
        FilterSelection {
            case_types: data.case_types(),
            treatment_functions: data.treatment_functions(),
        }
    }

    /// Drop any selected value the dataset does not contain.
    pub fn restrict_to(&mut self, data: &TheatreData) {
        let case_types = data.case_types();
        let treatment_functions = data.treatment_functions();
        self.case_types.retain(|v| case_types.contains(v));
        self.treatment_functions
            .retain(|v| treatment_functions.contains(v));
    }

    /// Whether nothing at all can pass.
    pub fn is_empty(&self) -> bool {
        self.case_types.is_empty() || self.treatment_functions.is_empty()
    }

    pub fn matches(&self, case: &CaseRecord) -> bool {
        self.case_types.contains(&case.case_type)
            && self.treatment_functions.contains(&case.treatment_function)
    }

    /// Toggle one case type on or off.
    pub fn toggle_case_type(&mut self, value: &str) {
        toggle(&mut self.case_types, value);
    }

    /// Toggle one treatment function on or off.
    pub fn toggle_treatment_function(&mut self, value: &str) {
        toggle(&mut self.treatment_functions, value);
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

/// Rows passing both inclusion tests, in source order.
pub fn filter_cases<'a>(
    cases: &'a [CaseRecord],
    selection: &FilterSelection,
) -> Vec<&'a CaseRecord> {
    cases.iter().filter(|c| selection.matches(c)).collect()
}
