use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{CellValue, Table};

// Column names as they appear in the source workbook.
pub const COL_CASE_ID: &str = "BKCaseNo";
pub const COL_TREATMENT_FUNCTION: &str = "TreatmentFunction";
pub const COL_CASE_TYPE: &str = "CaseType";
pub const COL_PROCEDURE: &str = "ProcedureName";
pub const COL_CONSULTANT: &str = "Consultant";
pub const COL_THEATRE: &str = "TheatreName";
pub const COL_DURATION: &str = "DurationOfSurgeryMinutes";
pub const COL_LATE_START: &str = "LateStart";
pub const COL_EARLY_FINISH: &str = "EarlyFinish";
pub const COL_INCOME_PROCEDURE: &str = "Procedure_Name";
pub const COL_INCOME: &str = "Income";

/// A loaded table does not have the shape the dashboard needs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: column '{column}' has unusable value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

/// One theatre case (a row of the "Raw Data" sheet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: String,
    pub treatment_function: String,
    pub case_type: String,
    pub procedure: String,
    pub consultant: String,
    pub theatre: String,
    /// Minutes; `None` for a blank cell.
    pub duration_minutes: Option<f64>,
    pub late_start: bool,
    pub early_finish: bool,
}

/// Tariff income for one procedure (a row of the "Ophthalmology Income" sheet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub procedure: String,
    pub income: f64,
}

/// Locates named columns in a table and reads typed cells from a row.
struct Columns<'a, const N: usize> {
    idx: [usize; N],
    names: [&'a str; N],
}

impl<'a, const N: usize> Columns<'a, N> {
    fn locate(table: &Table, names: [&'a str; N]) -> Result<Self, SchemaError> {
        let mut idx = [0; N];
        for (slot, name) in idx.iter_mut().zip(names) {
            *slot = table
                .column_index(name)
                .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))?;
        }
        Ok(Columns { idx, names })
    }

    fn cell<'r>(&self, row: &'r [CellValue], i: usize) -> &'r CellValue {
        &row[self.idx[i]]
    }

    fn invalid(&self, row_no: usize, i: usize, value: &CellValue) -> SchemaError {
        SchemaError::InvalidValue {
            row: row_no,
            column: self.names[i].to_string(),
            value: value.to_string(),
        }
    }
}

impl CaseRecord {
    /// Convert every row of the raw case sheet.
    pub fn from_table(table: &Table) -> Result<Vec<CaseRecord>, SchemaError> {
        let cols = Columns::locate(
            table,
            [
                COL_CASE_ID,
                COL_TREATMENT_FUNCTION,
                COL_CASE_TYPE,
                COL_PROCEDURE,
                COL_CONSULTANT,
                COL_THEATRE,
                COL_DURATION,
                COL_LATE_START,
                COL_EARLY_FINISH,
            ],
        )?;

        table
            .rows
            .iter()
            .enumerate()
            .map(|(row_no, row)| {
                let duration = cols.cell(row, 6);
                let duration_minutes = match duration {
                    CellValue::Null => None,
                    v => match v.as_f64() {
                        Some(m) if m >= 0.0 => Some(m),
                        _ => return Err(cols.invalid(row_no, 6, v)),
                    },
                };
                let flag = |i: usize| {
                    let v = cols.cell(row, i);
                    v.as_flag().ok_or_else(|| cols.invalid(row_no, i, v))
                };

                Ok(CaseRecord {
                    case_id: cols.cell(row, 0).as_text(),
                    treatment_function: cols.cell(row, 1).as_text(),
                    case_type: cols.cell(row, 2).as_text(),
                    procedure: cols.cell(row, 3).as_text(),
                    consultant: cols.cell(row, 4).as_text(),
                    theatre: cols.cell(row, 5).as_text(),
                    duration_minutes,
                    late_start: flag(7)?,
                    early_finish: flag(8)?,
                })
            })
            .collect()
    }
}

impl IncomeRecord {
    /// Convert every row of the income sheet, parsing `£1,234.00`-style amounts.
    /// Rows with a blank income are skipped.
    pub fn from_table(table: &Table) -> Result<Vec<IncomeRecord>, SchemaError> {
        let cols = Columns::locate(table, [COL_INCOME_PROCEDURE, COL_INCOME])?;

        let mut out = Vec::with_capacity(table.len());
        for (row_no, row) in table.rows.iter().enumerate() {
            let amount = cols.cell(row, 1);
            if amount.is_null() {
                continue;
            }
            let income = match amount {
                CellValue::String(s) => parse_currency(s),
                v => v.as_f64(),
            }
            .ok_or_else(|| cols.invalid(row_no, 1, amount))?;

            out.push(IncomeRecord {
                procedure: cols.cell(row, 0).as_text(),
                income,
            });
        }
        Ok(out)
    }
}

/// Parse a sterling amount such as `£12,345.60`.
///
/// Only `£` and `,` are stripped; other locales are not handled.
pub fn parse_currency(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != '£' && *c != ',').collect();
    cleaned.trim().parse::<f64>().ok()
}

/// Both sheets after schema conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TheatreData {
    pub cases: Vec<CaseRecord>,
    pub income: Vec<IncomeRecord>,
}

impl TheatreData {
    pub fn from_tables(raw: &Table, income: &Table) -> Result<Self, SchemaError> {
        Ok(TheatreData {
            cases: CaseRecord::from_table(raw)?,
            income: IncomeRecord::from_table(income)?,
        })
    }

    /// Distinct case types, sorted.
    pub fn case_types(&self) -> BTreeSet<String> {
        self.cases.iter().map(|c| c.case_type.clone()).collect()
    }

    /// Distinct treatment functions, sorted.
    pub fn treatment_functions(&self) -> BTreeSet<String> {
        self.cases
            .iter()
            .map(|c| c.treatment_function.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_table(rows: Vec<Vec<CellValue>>) -> Table {
        let mut t = Table::new(
            [
                COL_CASE_ID,
                COL_TREATMENT_FUNCTION,
                COL_CASE_TYPE,
                COL_PROCEDURE,
                COL_CONSULTANT,
                COL_THEATRE,
                COL_DURATION,
                COL_LATE_START,
                COL_EARLY_FINISH,
            ]
            .map(String::from)
            .to_vec(),
        );
        for r in rows {
            t.push_row(r);
        }
        t
    }

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn parses_sterling_amounts() {
        assert_eq!(parse_currency("£1,234.50"), Some(1234.5));
        assert_eq!(parse_currency(" £100 "), Some(100.0));
        assert_eq!(parse_currency("12,000,000"), Some(12_000_000.0));
        assert_eq!(parse_currency("n/a"), None);
    }

    #[test]
    fn converts_case_rows() {
        let t = raw_table(vec![vec![
            CellValue::Integer(1001),
            s("Ophthalmology"),
            s("Elective"),
            s("Cataract"),
            s("Dr A"),
            s("Theatre 1"),
            CellValue::Integer(35),
            CellValue::Integer(1),
            CellValue::Bool(false),
        ]]);
        let cases = CaseRecord::from_table(&t).unwrap();
        assert_eq!(cases.len(), 1);
        let c = &cases[0];
        assert_eq!(c.case_id, "1001");
        assert_eq!(c.duration_minutes, Some(35.0));
        assert!(c.late_start);
        assert!(!c.early_finish);
    }

    #[test]
    fn blank_duration_is_none_and_negative_is_rejected() {
        let mut row = vec![
            CellValue::Integer(1),
            s("Ophthalmology"),
            s("Elective"),
            s("Cataract"),
            s("Dr A"),
            s("Theatre 1"),
            CellValue::Null,
            CellValue::Null,
            CellValue::Null,
        ];
        let cases = CaseRecord::from_table(&raw_table(vec![row.clone()])).unwrap();
        assert_eq!(cases[0].duration_minutes, None);

        row[6] = CellValue::Float(-3.0);
        let err = CaseRecord::from_table(&raw_table(vec![row])).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidValue { row: 0, ref column, .. } if column == COL_DURATION
        ));
    }

    #[test]
    fn missing_column_is_named() {
        let t = Table::new(vec![COL_CASE_ID.to_string()]);
        let err = CaseRecord::from_table(&t).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumn(COL_TREATMENT_FUNCTION.to_string())
        );
    }

    #[test]
    fn income_accepts_text_and_numbers() {
        let mut t = Table::new(vec![COL_INCOME_PROCEDURE.into(), COL_INCOME.into()]);
        t.push_row(vec![s("A"), s("£1,000.00")]);
        t.push_row(vec![s("B"), CellValue::Float(50.5)]);
        t.push_row(vec![s("C"), CellValue::Null]);
        let income = IncomeRecord::from_table(&t).unwrap();
        assert_eq!(
            income,
            vec![
                IncomeRecord {
                    procedure: "A".into(),
                    income: 1000.0
                },
                IncomeRecord {
                    procedure: "B".into(),
                    income: 50.5
                },
            ]
        );
    }

    #[test]
    fn unparseable_income_is_a_schema_error() {
        let mut t = Table::new(vec![COL_INCOME_PROCEDURE.into(), COL_INCOME.into()]);
        t.push_row(vec![s("A"), s("lots")]);
        assert!(IncomeRecord::from_table(&t).is_err());
    }
}
