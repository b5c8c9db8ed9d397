//! Chart descriptions built from aggregate results.
//!
//! These are plain values; `ui::plot` turns a [`ChartSpec`] into an
//! `egui_plot` bar chart. Keeping them UI-free lets the ordering, titles and
//! tooltips be tested without a window.

use serde::Serialize;

use crate::engine::{CountRow, GroupStat};
use crate::format;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    /// Categories along x, values up the y axis.
    Vertical,
    /// Categories down the y axis, values along x.
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub value: f64,
    /// Optional second measure used to shade the bar.
    pub weight: Option<f64>,
    pub tooltip: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: &'static str,
    pub title: String,
    /// Title of the category axis.
    pub category_title: String,
    /// Title of the value axis.
    pub value_title: String,
    pub orientation: Orientation,
    /// Bars in display order.
    pub bars: Vec<ChartBar>,
    /// Decimals printed on the value labels.
    pub label_decimals: usize,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// (min, max) of the bar weights, when any bar has one.
    pub fn weight_range(&self) -> Option<(f64, f64)> {
        self.bars
            .iter()
            .filter_map(|b| b.weight)
            .fold(None, |acc, w| match acc {
                None => Some((w, w)),
                Some((lo, hi)) => Some((lo.min(w), hi.max(w))),
            })
    }

    /// Text drawn on top of a bar.
    pub fn value_label(&self, bar: &ChartBar) -> String {
        format::grouped(bar.value, self.label_decimals)
    }
}

fn duration_bar(stat: &GroupStat, key_title: &str) -> ChartBar {
    ChartBar {
        label: stat.key.clone(),
        value: stat.mean,
        weight: None,
        tooltip: vec![
            (key_title.to_string(), stat.key.clone()),
            ("Avg Duration".to_string(), format::mean(stat.mean)),
        ],
    }
}

fn count_bar(row: &CountRow, key_title: &str, count_title: &str) -> ChartBar {
    ChartBar {
        label: row.key.clone(),
        value: row.count as f64,
        weight: None,
        tooltip: vec![
            (key_title.to_string(), row.key.clone()),
            (count_title.to_string(), format::count(row.count)),
        ],
    }
}

fn sort_descending(bars: &mut [ChartBar]) {
    bars.sort_by(|a, b| b.value.total_cmp(&a.value));
}

fn sort_ascending(bars: &mut [ChartBar]) {
    bars.sort_by(|a, b| a.value.total_cmp(&b.value));
}

/// Ophthalmology consultants with the lowest mean duration, tallest bar first.
pub fn efficient_ophthalmology_consultants(stats: &[GroupStat]) -> ChartSpec {
    let mut bars: Vec<ChartBar> = stats.iter().map(|s| duration_bar(s, "Consultant")).collect();
    sort_descending(&mut bars);
    ChartSpec {
        id: "efficient_ophthalmology_consultants",
        title: "Top 5 Efficient Ophthalmology Consultants by Surgery Time".into(),
        category_title: "Consultant".into(),
        value_title: "Average Surgery Duration (minutes)".into(),
        orientation: Orientation::Vertical,
        bars,
        label_decimals: 1,
    }
}

/// Consultants across all specialties with the lowest mean duration, shortest first.
pub fn best_consultants(stats: &[GroupStat]) -> ChartSpec {
    let mut bars: Vec<ChartBar> = stats.iter().map(|s| duration_bar(s, "Consultant")).collect();
    sort_ascending(&mut bars);
    ChartSpec {
        id: "best_consultants",
        title: "Top 5 Best Performing Consultants by Surgery Time".into(),
        category_title: "Consultant".into(),
        value_title: "Average Surgery Duration (minutes)".into(),
        orientation: Orientation::Vertical,
        bars,
        label_decimals: 1,
    }
}

/// Cases per consultant, horizontal, shaded by mean duration.
pub fn consultant_efficiency(stats: &[GroupStat]) -> ChartSpec {
    let mut bars: Vec<ChartBar> = stats
        .iter()
        .map(|s| ChartBar {
            label: s.key.clone(),
            value: s.count as f64,
            weight: Some(s.mean),
            tooltip: vec![
                ("Consultant".into(), s.key.clone()),
                ("Number of Cases".into(), format::count(s.count)),
                ("Average Surgery Duration".into(), format::mean(s.mean)),
            ],
        })
        .collect();
    sort_descending(&mut bars);
    ChartSpec {
        id: "consultant_efficiency",
        title: "Consultant Efficiency Analysis".into(),
        category_title: "Consultant".into(),
        value_title: "Number of Cases".into(),
        orientation: Orientation::Horizontal,
        bars,
        label_decimals: 0,
    }
}

/// Most frequent procedures by row count.
pub fn procedure_count(rows: &[CountRow]) -> ChartSpec {
    let mut bars: Vec<ChartBar> = rows
        .iter()
        .map(|r| count_bar(r, "ProcedureName", "Count"))
        .collect();
    sort_descending(&mut bars);
    ChartSpec {
        id: "procedure_count",
        title: "Procedure Count".into(),
        category_title: "Procedure Name".into(),
        value_title: "Count".into(),
        orientation: Orientation::Vertical,
        bars,
        label_decimals: 0,
    }
}

/// Procedures with the lowest mean duration, shortest first.
pub fn fastest_procedures(stats: &[GroupStat]) -> ChartSpec {
    let mut bars: Vec<ChartBar> = stats
        .iter()
        .map(|s| duration_bar(s, "ProcedureName"))
        .collect();
    sort_ascending(&mut bars);
    ChartSpec {
        id: "fastest_procedures",
        title: "Top 5 Best Performing Procedures by Lowest Average Duration".into(),
        category_title: "Procedure Name".into(),
        value_title: "Average Duration (minutes)".into(),
        orientation: Orientation::Vertical,
        bars,
        label_decimals: 1,
    }
}

/// Ophthalmology consultants with the most late starts.
pub fn late_start_consultants(rows: &[CountRow]) -> ChartSpec {
    let mut bars: Vec<ChartBar> = rows
        .iter()
        .map(|r| count_bar(r, "Consultant", "Late Starts"))
        .collect();
    sort_descending(&mut bars);
    ChartSpec {
        id: "late_start_consultants",
        title: "Ophthalmology Consultants with the Most Late Starts".into(),
        category_title: "Consultant".into(),
        value_title: "Late Starts".into(),
        orientation: Orientation::Vertical,
        bars,
        label_decimals: 0,
    }
}
