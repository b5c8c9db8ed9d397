//! Filter-driven aggregation behind the dashboard page.
//!
//! [`compute`] is a pure function of the loaded records and a
//! [`FilterSelection`]: it slices the cases, then builds every summary,
//! pivot and ranking the dashboard shows. Nothing is rounded here; display
//! rounding happens in [`crate::format`].

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::data::filter::{filter_cases, FilterSelection};
use crate::data::records::{CaseRecord, IncomeRecord, TheatreData};

pub const ELECTIVE: &str = "Elective";
pub const OPHTHALMOLOGY: &str = "Ophthalmology";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("No data matches your filters.")]
    EmptyFilterResult,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Headline metrics for the filtered slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Distinct case identifiers.
    pub total_cases: usize,
    pub total_surgery_minutes: f64,
    /// Income of every procedure present in the slice.
    pub total_income: f64,
    /// Income of the ten highest-earning procedures present in the slice.
    pub top10_income: f64,
}

/// Mean duration for one group (procedure, consultant, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStat {
    pub key: String,
    pub mean: f64,
    /// Rows with a recorded duration.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeRow {
    pub procedure: String,
    pub income: f64,
}

/// Distinct cases by treatment function (rows) and case type (columns).
/// Absent combinations are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CasePivot {
    pub treatment_functions: Vec<String>,
    pub case_types: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl CasePivot {
    pub fn get(&self, treatment_function: &str, case_type: &str) -> Option<usize> {
        let r = self
            .treatment_functions
            .iter()
            .position(|t| t == treatment_function)?;
        let c = self.case_types.iter().position(|t| t == case_type)?;
        Some(self.counts[r][c])
    }
}

/// Everything the dashboard page renders for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Rows in the filtered slice.
    pub row_count: usize,
    pub summary: Summary,
    pub case_pivot: CasePivot,
    /// Distinct cases per procedure, most first.
    pub cases_by_procedure: Vec<CountRow>,
    pub longest_elective: Vec<GroupStat>,
    pub shortest_elective: Vec<GroupStat>,
    pub efficient_ophthalmology_consultants: Vec<GroupStat>,
    pub best_consultants: Vec<GroupStat>,
    /// Every consultant, alphabetical.
    pub consultant_efficiency: Vec<GroupStat>,
    pub longest_procedures: Vec<GroupStat>,
    pub consultant_performance: Vec<GroupStat>,
    /// Row counts per procedure, top five.
    pub procedure_counts: Vec<CountRow>,
    pub top_income: Vec<IncomeRow>,
    pub fastest_procedures: Vec<GroupStat>,
    pub late_start_consultants: Vec<CountRow>,
    pub late_start_theatres: Vec<CountRow>,
    pub early_finish_theatres: Vec<CountRow>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Slice `data.cases` by `selection` and aggregate the slice.
pub fn compute(
    data: &TheatreData,
    selection: &FilterSelection,
) -> Result<DashboardView, EngineError> {
    if selection.is_empty() {
        return Err(EngineError::EmptyFilterResult);
    }
    let rows = filter_cases(&data.cases, selection);
    if rows.is_empty() {
        return Err(EngineError::EmptyFilterResult);
    }

    let elective: Vec<&CaseRecord> = rows
        .iter()
        .copied()
        .filter(|c| c.case_type == ELECTIVE)
        .collect();
    let ophthalmology: Vec<&CaseRecord> = rows
        .iter()
        .copied()
        .filter(|c| c.treatment_function == OPHTHALMOLOGY)
        .collect();

    let by_procedure = mean_by(&rows, |c| &c.procedure);
    let by_consultant = mean_by(&rows, |c| &c.consultant);
    let elective_by_procedure = mean_by(&elective, |c| &c.procedure);
    let matched = matched_income(&data.income, &rows);

    let view = DashboardView {
        row_count: rows.len(),
        summary: summarize(&rows, &matched),
        case_pivot: case_pivot(&rows),
        cases_by_procedure: distinct_cases_by(&rows, |c| &c.procedure),
        longest_elective: nlargest(elective_by_procedure.clone(), 10),
        shortest_elective: nsmallest(elective_by_procedure, 10),
        efficient_ophthalmology_consultants: nsmallest(
            mean_by(&ophthalmology, |c| &c.consultant),
            5,
        ),
        best_consultants: nsmallest(by_consultant.clone(), 5),
        longest_procedures: nlargest(by_procedure.clone(), 10),
        consultant_performance: nlargest(by_consultant.clone(), 20),
        consultant_efficiency: by_consultant,
        procedure_counts: top_counts(row_counts_by(&rows, |c| &c.procedure), 5),
        top_income: top_income(matched, 20),
        fastest_procedures: nsmallest(by_procedure, 5),
        late_start_consultants: ophthalmology_flag_counts(
            &rows,
            |c| &c.consultant,
            |c| c.late_start,
            10,
        ),
        late_start_theatres: ophthalmology_flag_counts(&rows, |c| &c.theatre, |c| c.late_start, 5),
        early_finish_theatres: ophthalmology_flag_counts(
            &rows,
            |c| &c.theatre,
            |c| c.early_finish,
            4,
        ),
    };

    log::debug!(
        "aggregated {} rows ({} distinct cases)",
        view.row_count,
        view.summary.total_cases
    );
    Ok(view)
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

fn summarize(rows: &[&CaseRecord], matched: &[IncomeRow]) -> Summary {
    let total_cases = rows
        .iter()
        .map(|c| c.case_id.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    let total_surgery_minutes: f64 = rows.iter().filter_map(|c| c.duration_minutes).sum();
    let total_income: f64 = matched.iter().map(|r| r.income).sum();
    let top10_income: f64 = top_income(matched.to_vec(), 10)
        .iter()
        .map(|r| r.income)
        .sum();

    Summary {
        total_cases,
        total_surgery_minutes,
        total_income,
        top10_income,
    }
}

/// Distinct cases per (treatment function, case type), zero-filled.
pub fn case_pivot(rows: &[&CaseRecord]) -> CasePivot {
    let mut cells: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
    let mut case_types = BTreeSet::new();
    for c in rows {
        case_types.insert(c.case_type.as_str());
        cells
            .entry((c.treatment_function.as_str(), c.case_type.as_str()))
            .or_default()
            .insert(c.case_id.as_str());
    }

    let treatment_functions: Vec<String> = cells
        .keys()
        .map(|(tf, _)| tf.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let case_types: Vec<String> = case_types.into_iter().map(String::from).collect();

    let counts = treatment_functions
        .iter()
        .map(|tf| {
            case_types
                .iter()
                .map(|ct| {
                    cells
                        .get(&(tf.as_str(), ct.as_str()))
                        .map_or(0, BTreeSet::len)
                })
                .collect()
        })
        .collect();

    CasePivot {
        treatment_functions,
        case_types,
        counts,
    }
}

/// Mean duration per group, groups in ascending key order.
///
/// Blank durations are skipped; a group with none recorded has no mean and
/// is left out.
pub fn mean_by<'a, F>(rows: &[&'a CaseRecord], key: F) -> Vec<GroupStat>
where
    F: Fn(&'a CaseRecord) -> &'a String,
{
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for &c in rows {
        if let Some(minutes) = c.duration_minutes {
            let g = groups.entry(key(c).as_str()).or_default();
            g.0 += minutes;
            g.1 += 1;
        }
    }
    groups
        .into_iter()
        .map(|(k, (sum, n))| GroupStat {
            key: k.to_string(),
            mean: sum / n as f64,
            count: n,
        })
        .collect()
}

/// The `n` highest means. Ties keep their incoming order.
pub fn nlargest(mut stats: Vec<GroupStat>, n: usize) -> Vec<GroupStat> {
    stats.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    stats.truncate(n);
    stats
}

/// The `n` lowest means. Ties keep their incoming order.
pub fn nsmallest(mut stats: Vec<GroupStat>, n: usize) -> Vec<GroupStat> {
    stats.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    stats.truncate(n);
    stats
}

/// Distinct case identifiers per group, most first.
pub fn distinct_cases_by<'a, F>(rows: &[&'a CaseRecord], key: F) -> Vec<CountRow>
where
    F: Fn(&'a CaseRecord) -> &'a String,
{
    let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for &c in rows {
        groups
            .entry(key(c).as_str())
            .or_default()
            .insert(c.case_id.as_str());
    }
    let counts = groups
        .into_iter()
        .map(|(k, ids)| CountRow {
            key: k.to_string(),
            count: ids.len(),
        })
        .collect();
    top_counts(counts, usize::MAX)
}

/// Rows per group, groups in ascending key order.
pub fn row_counts_by<'a, F>(rows: &[&'a CaseRecord], key: F) -> Vec<CountRow>
where
    F: Fn(&'a CaseRecord) -> &'a String,
{
    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
    for &c in rows {
        *groups.entry(key(c).as_str()).or_default() += 1;
    }
    groups
        .into_iter()
        .map(|(k, count)| CountRow {
            key: k.to_string(),
            count,
        })
        .collect()
}

fn top_counts(mut counts: Vec<CountRow>, n: usize) -> Vec<CountRow> {
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(n);
    counts
}

/// Ophthalmology rows with `flag` set, counted per group; top `n`.
/// Rows from any other treatment function never count.
pub fn ophthalmology_flag_counts<'a, K, P>(
    rows: &[&'a CaseRecord],
    key: K,
    flag: P,
    n: usize,
) -> Vec<CountRow>
where
    K: Fn(&'a CaseRecord) -> &'a String,
    P: Fn(&CaseRecord) -> bool,
{
    let flagged: Vec<&'a CaseRecord> = rows
        .iter()
        .copied()
        .filter(|&c| c.treatment_function == OPHTHALMOLOGY && flag(c))
        .collect();
    top_counts(row_counts_by(&flagged, key), n)
}

/// Income rows whose procedure appears in the slice, in income-sheet order.
/// Procedures without an income row contribute nothing.
pub fn matched_income(income: &[IncomeRecord], rows: &[&CaseRecord]) -> Vec<IncomeRow> {
    let present: BTreeSet<&str> = rows.iter().map(|c| c.procedure.as_str()).collect();
    income
        .iter()
        .filter(|r| present.contains(r.procedure.as_str()))
        .map(|r| IncomeRow {
            procedure: r.procedure.clone(),
            income: r.income,
        })
        .collect()
}

fn top_income(mut rows: Vec<IncomeRow>, n: usize) -> Vec<IncomeRow> {
    rows.sort_by(|a, b| b.income.total_cmp(&a.income));
    rows.truncate(n);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(
        id: &str,
        case_type: &str,
        tf: &str,
        procedure: &str,
        consultant: &str,
        minutes: f64,
    ) -> CaseRecord {
        CaseRecord {
            case_id: id.into(),
            treatment_function: tf.into(),
            case_type: case_type.into(),
            procedure: procedure.into(),
            consultant: consultant.into(),
            theatre: "Theatre 1".into(),
            duration_minutes: Some(minutes),
            late_start: false,
            early_finish: false,
        }
    }

    fn income(procedure: &str, amount: f64) -> IncomeRecord {
        IncomeRecord {
            procedure: procedure.into(),
            income: amount,
        }
    }

    fn keys(stats: &[GroupStat]) -> Vec<&str> {
        stats.iter().map(|s| s.key.as_str()).collect()
    }

    fn sample() -> TheatreData {
        TheatreData {
            cases: vec![
                case("1", ELECTIVE, OPHTHALMOLOGY, "Cataract", "Dr A", 20.0),
                case("2", ELECTIVE, OPHTHALMOLOGY, "Cataract", "Dr B", 30.0),
                case("3", "Day Case", OPHTHALMOLOGY, "Vitrectomy", "Dr A", 90.0),
                case("4", ELECTIVE, "Urology", "Cystoscopy", "Dr C", 15.0),
                case("4", ELECTIVE, "Urology", "Cystoscopy", "Dr C", 25.0),
            ],
            income: vec![income("Cataract", 1000.0), income("Vitrectomy", 2500.0)],
        }
    }

    #[test]
    fn empty_selection_signals_empty_result() {
        let data = sample();
        let mut sel = FilterSelection::all(&data);
        sel.case_types.clear();
        assert_eq!(compute(&data, &sel), Err(EngineError::EmptyFilterResult));

        let mut sel = FilterSelection::all(&data);
        sel.treatment_functions.clear();
        assert_eq!(compute(&data, &sel), Err(EngineError::EmptyFilterResult));
    }

    #[test]
    fn selection_excluding_every_row_is_empty() {
        let data = sample();
        let sel = FilterSelection {
            case_types: ["Day Case".to_string()].into(),
            treatment_functions: ["Urology".to_string()].into(),
        };
        assert_eq!(compute(&data, &sel), Err(EngineError::EmptyFilterResult));
    }

    #[test]
    fn summary_counts_distinct_cases() {
        let data = sample();
        let view = compute(&data, &FilterSelection::all(&data)).unwrap();
        assert_eq!(view.row_count, 5);
        assert_eq!(view.summary.total_cases, 4);
        assert_eq!(view.summary.total_surgery_minutes, 180.0);
        assert_eq!(view.summary.total_income, 3500.0);
        assert_eq!(view.summary.top10_income, 3500.0);
    }

    #[test]
    fn compute_is_idempotent() {
        let data = sample();
        let sel = FilterSelection::all(&data);
        assert_eq!(compute(&data, &sel), compute(&data, &sel));
    }

    #[test]
    fn income_ignores_unmatched_procedures() {
        let mut cases = Vec::new();
        for i in 0..10 {
            cases.push(case(&format!("a{i}"), ELECTIVE, OPHTHALMOLOGY, "A", "Dr A", 10.0));
        }
        for i in 0..5 {
            cases.push(case(&format!("b{i}"), ELECTIVE, OPHTHALMOLOGY, "B", "Dr A", 10.0));
        }
        let data = TheatreData {
            cases,
            income: vec![income("A", 100.0), income("B", 50.0), income("C", 999.0)],
        };
        let view = compute(&data, &FilterSelection::all(&data)).unwrap();
        assert_eq!(view.summary.total_income, 150.0);
        assert!(view.top_income.iter().all(|r| r.procedure != "C"));
    }

    #[test]
    fn mean_rankings_use_full_precision() {
        let rows_owned = vec![
            case("1", ELECTIVE, OPHTHALMOLOGY, "P1", "Dr A", 10.0),
            case("2", ELECTIVE, OPHTHALMOLOGY, "P1", "Dr A", 20.0),
            case("3", ELECTIVE, OPHTHALMOLOGY, "P2", "Dr A", 5.0),
            case("4", ELECTIVE, OPHTHALMOLOGY, "P3", "Dr A", 30.0),
            case("5", ELECTIVE, OPHTHALMOLOGY, "P3", "Dr A", 30.0),
            case("6", ELECTIVE, OPHTHALMOLOGY, "P3", "Dr A", 30.0),
        ];
        let rows: Vec<&CaseRecord> = rows_owned.iter().collect();
        let means = mean_by(&rows, |c| &c.procedure);

        let by_key: BTreeMap<&str, f64> = means.iter().map(|s| (s.key.as_str(), s.mean)).collect();
        assert_eq!(by_key["P1"], 15.0);
        assert_eq!(by_key["P2"], 5.0);
        assert_eq!(by_key["P3"], 30.0);

        assert_eq!(keys(&nsmallest(means.clone(), 2)), vec!["P2", "P1"]);
        assert_eq!(keys(&nlargest(means, 1)), vec!["P3"]);
    }

    #[test]
    fn ranking_does_not_round_first() {
        let rows_owned = vec![
            case("1", ELECTIVE, OPHTHALMOLOGY, "X", "Dr A", 10.004),
            case("2", ELECTIVE, OPHTHALMOLOGY, "Y", "Dr A", 10.001),
        ];
        let rows: Vec<&CaseRecord> = rows_owned.iter().collect();
        let top = nlargest(mean_by(&rows, |c| &c.procedure), 1);
        assert_eq!(keys(&top), vec!["X"]);
    }

    #[test]
    fn blank_durations_are_skipped() {
        let mut a = case("1", ELECTIVE, OPHTHALMOLOGY, "P", "Dr A", 10.0);
        let mut b = a.clone();
        b.case_id = "2".into();
        b.duration_minutes = None;
        a.duration_minutes = Some(40.0);
        let mut c = a.clone();
        c.procedure = "Q".into();
        c.duration_minutes = None;

        let owned = vec![a, b, c];
        let rows: Vec<&CaseRecord> = owned.iter().collect();
        let means = mean_by(&rows, |c| &c.procedure);
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].mean, 40.0);
        assert_eq!(means[0].count, 1);
    }

    #[test]
    fn elective_rankings_exclude_other_case_types() {
        let data = sample();
        let view = compute(&data, &FilterSelection::all(&data)).unwrap();
        assert!(!keys(&view.longest_elective).contains(&"Vitrectomy"));
        assert!(keys(&view.longest_procedures).contains(&"Vitrectomy"));
        assert_eq!(view.longest_procedures[0].key, "Vitrectomy");
    }

    #[test]
    fn pivot_is_zero_filled() {
        let data = sample();
        let view = compute(&data, &FilterSelection::all(&data)).unwrap();
        let pivot = &view.case_pivot;
        assert_eq!(pivot.treatment_functions, vec![OPHTHALMOLOGY, "Urology"]);
        assert_eq!(pivot.case_types, vec!["Day Case", ELECTIVE]);
        assert_eq!(pivot.get(OPHTHALMOLOGY, ELECTIVE), Some(2));
        assert_eq!(pivot.get(OPHTHALMOLOGY, "Day Case"), Some(1));
        assert_eq!(pivot.get("Urology", "Day Case"), Some(0));
        // Case 4 appears twice but is one case.
        assert_eq!(pivot.get("Urology", ELECTIVE), Some(1));
        assert_eq!(pivot.get("Cardiology", ELECTIVE), None);
    }

    #[test]
    fn procedure_breakdowns() {
        let data = sample();
        let view = compute(&data, &FilterSelection::all(&data)).unwrap();

        assert_eq!(view.cases_by_procedure[0].key, "Cataract");
        assert_eq!(view.cases_by_procedure[0].count, 2);
        let cysto = view
            .cases_by_procedure
            .iter()
            .find(|r| r.key == "Cystoscopy")
            .unwrap();
        assert_eq!(cysto.count, 1);

        // Row counts, not distinct cases.
        let cysto_rows = view
            .procedure_counts
            .iter()
            .find(|r| r.key == "Cystoscopy")
            .unwrap();
        assert_eq!(cysto_rows.count, 2);
        assert!(view
            .cases_by_procedure
            .windows(2)
            .all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn late_starts_only_count_ophthalmology() {
        let mut oph = case("1", ELECTIVE, OPHTHALMOLOGY, "Cataract", "Dr A", 20.0);
        oph.late_start = true;
        let mut uro = case("2", ELECTIVE, "Urology", "Cystoscopy", "Dr B", 20.0);
        uro.late_start = true;
        uro.early_finish = true;
        let mut uro2 = uro.clone();
        uro2.case_id = "3".into();

        let data = TheatreData {
            cases: vec![oph, uro, uro2],
            income: Vec::new(),
        };
        let view = compute(&data, &FilterSelection::all(&data)).unwrap();

        assert_eq!(
            view.late_start_consultants,
            vec![CountRow {
                key: "Dr A".into(),
                count: 1
            }]
        );
        assert_eq!(view.late_start_theatres.len(), 1);
        assert!(view.early_finish_theatres.is_empty());
    }

    #[test]
    fn ophthalmology_consultant_ranking_uses_only_ophthalmology_rows() {
        let data = sample();
        let view = compute(&data, &FilterSelection::all(&data)).unwrap();
        assert!(!keys(&view.efficient_ophthalmology_consultants).contains(&"Dr C"));
        assert_eq!(view.best_consultants[0].key, "Dr C");
    }
}
