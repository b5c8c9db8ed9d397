//! Writes a synthetic copy of the theatre data to `data/` plus a
//! `theatre-dash.json` pointing the dashboard at it.
//!
//! ```text
//! cargo run --bin generate_sample
//! cargo run            # picks up theatre-dash.json
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use theatre_dash::catalog;
use theatre_dash::config::{AppConfig, DataSource, DEFAULT_CONFIG_FILE};
use theatre_dash::data::records::{
    CaseRecord, IncomeRecord, TheatreData, COL_CASE_ID, COL_CASE_TYPE, COL_CONSULTANT,
    COL_DURATION, COL_EARLY_FINISH, COL_INCOME, COL_INCOME_PROCEDURE, COL_LATE_START,
    COL_PROCEDURE, COL_THEATRE, COL_TREATMENT_FUNCTION,
};
use theatre_dash::engine::{self, CountRow, GroupStat, ELECTIVE, OPHTHALMOLOGY};

const DATA_DIR: &str = "data";
const RAW_FILE: &str = "sample_raw_data.parquet";
const INCOME_FILE: &str = "sample_income.csv";
const CASES: usize = 1200;

/// (treatment function, [(procedure, typical minutes, tariff)])
const SPECIALTIES: &[(&str, &[(&str, f64, f64)])] = &[
    (
        OPHTHALMOLOGY,
        &[
            ("Phacoemulsification of lens", 28.0, 1012.0),
            ("Vitrectomy", 75.0, 2431.5),
            ("Trabeculectomy", 62.0, 1789.0),
            ("Corneal graft", 90.0, 3120.0),
            ("Intravitreal injection", 12.0, 356.25),
            ("Strabismus correction", 55.0, 1540.0),
            ("Removal of chalazion", 15.0, 412.0),
        ],
    ),
    (
        "General Surgery",
        &[
            ("Laparoscopic cholecystectomy", 85.0, 0.0),
            ("Inguinal hernia repair", 60.0, 0.0),
            ("Appendicectomy", 55.0, 0.0),
            ("Excision of skin lesion", 25.0, 0.0),
        ],
    ),
    (
        "Trauma & Orthopaedics",
        &[
            ("Total hip replacement", 120.0, 0.0),
            ("Total knee replacement", 115.0, 0.0),
            ("Carpal tunnel release", 22.0, 0.0),
            ("Arthroscopy of knee", 45.0, 0.0),
        ],
    ),
    (
        "Urology",
        &[
            ("Cystoscopy", 18.0, 0.0),
            ("TURP", 70.0, 0.0),
            ("Ureteroscopy", 50.0, 0.0),
        ],
    ),
];

const CASE_TYPES: &[(&str, f64)] = &[(ELECTIVE, 0.6), ("Day Case", 0.25), ("Emergency", 0.15)];

const CONSULTANTS: &[&str] = &[
    "Mr A Patel",
    "Ms B Okafor",
    "Dr C Nguyen",
    "Mr D Hughes",
    "Mrs E Kowalski",
    "Dr F Rahman",
    "Ms G O'Neill",
    "Mr H Schmidt",
];

const THEATRES: &[&str] = &[
    "Main Theatre 1",
    "Main Theatre 2",
    "Main Theatre 3",
    "Eye Unit Theatre A",
    "Eye Unit Theatre B",
    "Day Surgery Theatre",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn weighted<'a>(&mut self, items: &'a [(&'a str, f64)]) -> &'a str {
        let mut r = self.next_f64();
        for (item, w) in items {
            if r < *w {
                return *item;
            }
            r -= w;
        }
        items[items.len() - 1].0
    }
}

fn generate_cases(rng: &mut SimpleRng) -> Vec<CaseRecord> {
    let mut cases = Vec::with_capacity(CASES + CASES / 10);
    for n in 0..CASES {
        let case_id = format!("BK{:06}", 100_000 + n);
        let (specialty, procedures) = *rng.pick(SPECIALTIES);
        let case_type = rng.weighted(CASE_TYPES);
        let consultant = *rng.pick(CONSULTANTS);
        let theatre = if specialty == OPHTHALMOLOGY {
            *rng.pick(&THEATRES[3..5])
        } else {
            *rng.pick(&THEATRES[..3])
        };
        let late_start = rng.chance(0.2);
        let early_finish = rng.chance(0.12);

        // Roughly one case in ten records a second procedure.
        let count = if rng.chance(0.1) { 2 } else { 1 };
        for _ in 0..count {
            let (procedure, typical, _) = *rng.pick(procedures);
            let duration = if rng.chance(0.03) {
                None
            } else {
                Some(rng.gauss(typical, typical * 0.2).max(5.0).round())
            };
            cases.push(CaseRecord {
                case_id: case_id.clone(),
                treatment_function: specialty.to_string(),
                case_type: case_type.to_string(),
                procedure: procedure.to_string(),
                consultant: consultant.to_string(),
                theatre: theatre.to_string(),
                duration_minutes: duration,
                late_start,
                early_finish,
            });
        }
    }
    cases
}

fn income_records() -> Vec<IncomeRecord> {
    SPECIALTIES
        .iter()
        .filter(|(specialty, _)| *specialty == OPHTHALMOLOGY)
        .flat_map(|(_, procedures)| procedures.iter())
        .map(|(procedure, _, tariff)| IncomeRecord {
            procedure: procedure.to_string(),
            income: *tariff,
        })
        .collect()
}

fn write_raw_parquet(path: &Path, cases: &[CaseRecord]) -> Result<()> {
    let text = |f: fn(&CaseRecord) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(cases.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new(COL_CASE_ID, DataType::Utf8, false),
        Field::new(COL_TREATMENT_FUNCTION, DataType::Utf8, false),
        Field::new(COL_CASE_TYPE, DataType::Utf8, false),
        Field::new(COL_PROCEDURE, DataType::Utf8, false),
        Field::new(COL_CONSULTANT, DataType::Utf8, false),
        Field::new(COL_THEATRE, DataType::Utf8, false),
        Field::new(COL_DURATION, DataType::Float64, true),
        Field::new(COL_LATE_START, DataType::Boolean, false),
        Field::new(COL_EARLY_FINISH, DataType::Boolean, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        text(|c| c.case_id.as_str()),
        text(|c| c.treatment_function.as_str()),
        text(|c| c.case_type.as_str()),
        text(|c| c.procedure.as_str()),
        text(|c| c.consultant.as_str()),
        text(|c| c.theatre.as_str()),
        Arc::new(Float64Array::from(
            cases.iter().map(|c| c.duration_minutes).collect::<Vec<_>>(),
        )),
        Arc::new(BooleanArray::from(
            cases.iter().map(|c| c.late_start).collect::<Vec<_>>(),
        )),
        Arc::new(BooleanArray::from(
            cases.iter().map(|c| c.early_finish).collect::<Vec<_>>(),
        )),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_csv(path: &Path, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn pounds_text(value: f64) -> String {
    theatre_dash::format::pounds(value)
}

fn count_rows(rows: &[CountRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| vec![r.key.clone(), r.count.to_string()])
        .collect()
}

fn mean_rows(rows: &[GroupStat]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| vec![r.key.clone(), format!("{:.2}", r.mean)])
        .collect()
}

type AnalysisCsv = (&'static [&'static str], Vec<Vec<String>>);

/// Rows per (first, second) key pair, in ascending key order.
fn pair_counts<'a>(
    rows: &[&'a CaseRecord],
    key: impl Fn(&'a CaseRecord) -> (&'a str, &'a str),
) -> Vec<Vec<String>> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for &c in rows {
        *counts.entry(key(c)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((a, b), n)| vec![a.to_string(), b.to_string(), n.to_string()])
        .collect()
}

/// Header and rows for one reference analysis, following its SQL text.
fn analysis_rows(name: &str, data: &TheatreData) -> Option<AnalysisCsv> {
    let rows: Vec<&CaseRecord> = data.cases.iter().collect();
    let elective: Vec<&CaseRecord> = rows
        .iter()
        .copied()
        .filter(|c| c.case_type == ELECTIVE)
        .collect();
    let elective_by_procedure = || engine::mean_by(&elective, |c| &c.procedure);
    let late_starts = |key: fn(&CaseRecord) -> &String, n| {
        count_rows(&engine::ophthalmology_flag_counts(&elective, key, |c| c.late_start, n))
    };

    let analysis: AnalysisCsv = match name {
        "Cases_by_Treatment_and_Case_Type" => (
            &["TreatmentFunction", "CaseType", "NumberOfCases"],
            pair_counts(&rows, |c| (c.treatment_function.as_str(), c.case_type.as_str())),
        ),
        "Cases_by_Procedure_and_Case_Type" => (
            &["ProcedureName", "CaseType", "NumberOfCases"],
            pair_counts(&rows, |c| (c.procedure.as_str(), c.case_type.as_str())),
        ),
        "Top_20_Elective_Procedures_by_Cases" => {
            let mut counts = engine::row_counts_by(&elective, |c| &c.procedure);
            counts.sort_by(|a, b| b.count.cmp(&a.count));
            counts.truncate(20);
            (&["ProcedureName", "NumberOfCases"], count_rows(&counts))
        }
        "Average_Surgery_Duration_by_Procedure" => (
            &["ProcedureName", "AverageDuration"],
            mean_rows(&engine::nlargest(elective_by_procedure(), usize::MAX)),
        ),
        "Top_10_Procedures_Longest_Duration" => (
            &["ProcedureName", "AverageDuration"],
            mean_rows(&engine::nlargest(elective_by_procedure(), 10)),
        ),
        "Top_10_Procedures_Shortest_Duration" => (
            &["ProcedureName", "AverageDuration"],
            mean_rows(&engine::nsmallest(elective_by_procedure(), 10)),
        ),
        "Top_10_Consultants_Most_Late_Starts" => (
            &["Consultant", "LateStarts"],
            late_starts(|c| &c.consultant, 10),
        ),
        "Top_5_Theatres_Most_Late_Starts" => {
            (&["TheatreName", "LateStarts"], late_starts(|c| &c.theatre, 5))
        }
        "Theatre_Most_Early_Finishes" => (
            &["TheatreName", "EarlyFinishes"],
            count_rows(&engine::ophthalmology_flag_counts(
                &elective,
                |c| &c.theatre,
                |c| c.early_finish,
                4,
            )),
        ),
        "Potential_Income_Top_10_Efficient_Ophthalmology_Procedures" => {
            let ophthalmology: Vec<&CaseRecord> = elective
                .iter()
                .copied()
                .filter(|c| c.treatment_function == OPHTHALMOLOGY)
                .collect();
            let fastest =
                engine::nsmallest(engine::mean_by(&ophthalmology, |c| &c.procedure), 10);
            let body = fastest
                .iter()
                .filter_map(|s| {
                    let income = data.income.iter().find(|r| r.procedure == s.key)?;
                    Some(vec![
                        s.key.clone(),
                        pounds_text(income.income),
                        format!("{:.2}", s.mean),
                    ])
                })
                .collect();
            (&["ProcedureName", "Income", "AverageDuration"], body)
        }
        _ => return None,
    };
    Some(analysis)
}

/// One CSV per reference analysis, named the way the SQL page looks them up.
fn write_analyses(dir: &Path, data: &TheatreData) -> Result<()> {
    for analysis in catalog::ANALYSES {
        let Some((headers, body)) = analysis_rows(analysis.name, data) else {
            log::warn!("no sample generator for analysis {}", analysis.name);
            continue;
        };
        write_csv(&dir.join(analysis.csv_filename()), headers, body)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let dir = Path::new(DATA_DIR);
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let cases = generate_cases(&mut rng);
    let income = income_records();

    write_raw_parquet(&dir.join(RAW_FILE), &cases)?;
    write_csv(
        &dir.join(INCOME_FILE),
        &[COL_INCOME_PROCEDURE, COL_INCOME],
        income
            .iter()
            .map(|r| vec![r.procedure.clone(), pounds_text(r.income)])
            .collect(),
    )?;

    let data = TheatreData { cases, income };
    write_analyses(dir, &data)?;

    let config = AppConfig {
        data_dir: dir.to_path_buf(),
        raw_data: DataSource {
            file: RAW_FILE.to_string(),
            sheet: None,
        },
        income: DataSource {
            file: INCOME_FILE.to_string(),
            sheet: None,
        },
        ..AppConfig::default()
    };
    std::fs::write(DEFAULT_CONFIG_FILE, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("writing {DEFAULT_CONFIG_FILE}"))?;

    println!(
        "Wrote {} case rows, {} income rows and {} analyses to {DATA_DIR}/",
        data.cases.len(),
        data.income.len(),
        catalog::ANALYSES.len()
    );
    println!("Config written to {DEFAULT_CONFIG_FILE}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: &str, tf: &str, ct: &str, procedure: &str, minutes: f64, late: bool) -> CaseRecord {
        CaseRecord {
            case_id: id.into(),
            treatment_function: tf.into(),
            case_type: ct.into(),
            procedure: procedure.into(),
            consultant: format!("Dr {id}"),
            theatre: "Eye Unit Theatre A".into(),
            duration_minutes: Some(minutes),
            late_start: late,
            early_finish: false,
        }
    }

    fn data() -> TheatreData {
        TheatreData {
            cases: vec![
                case("1", OPHTHALMOLOGY, ELECTIVE, "Cataract", 20.0, true),
                case("2", OPHTHALMOLOGY, "Day Case", "Cataract", 200.0, true),
                case("3", OPHTHALMOLOGY, ELECTIVE, "Vitrectomy", 60.0, false),
                case("4", "Urology", ELECTIVE, "Cystoscopy", 40.0, true),
                case("5", "Urology", "Emergency", "TURP", 500.0, false),
            ],
            income: vec![IncomeRecord {
                procedure: "Cataract".into(),
                income: 1000.0,
            }],
        }
    }

    #[test]
    fn every_catalog_entry_has_rows() {
        let data = data();
        for analysis in catalog::ANALYSES {
            assert!(analysis_rows(analysis.name, &data).is_some(), "{}", analysis.name);
        }
        assert!(analysis_rows("Unknown", &data).is_none());
    }

    #[test]
    fn duration_analyses_use_elective_cases_only() {
        let (_, body) = analysis_rows("Average_Surgery_Duration_by_Procedure", &data()).unwrap();
        let procedures: Vec<&str> = body.iter().map(|r| r[0].as_str()).collect();
        // Highest first; the 200 min Day Case and the TURP emergency are excluded.
        assert_eq!(procedures, ["Vitrectomy", "Cystoscopy", "Cataract"]);
        assert_eq!(body[2][1], "20.00");

        let (_, longest) = analysis_rows("Top_10_Procedures_Longest_Duration", &data()).unwrap();
        assert_eq!(longest[0][0], "Vitrectomy");
        let (_, shortest) = analysis_rows("Top_10_Procedures_Shortest_Duration", &data()).unwrap();
        assert_eq!(shortest[0], vec!["Cataract".to_string(), "20.00".to_string()]);
    }

    #[test]
    fn late_starts_are_elective_ophthalmology_only() {
        let (headers, body) =
            analysis_rows("Top_10_Consultants_Most_Late_Starts", &data()).unwrap();
        assert_eq!(headers, ["Consultant", "LateStarts"]);
        // Case 2 is a Day Case and case 4 is Urology.
        assert_eq!(body, vec![vec!["Dr 1".to_string(), "1".to_string()]]);
    }

    #[test]
    fn case_counts_count_rows() {
        let (_, body) = analysis_rows("Cases_by_Treatment_and_Case_Type", &data()).unwrap();
        assert_eq!(body[0], ["Ophthalmology", "Day Case", "1"]);
        assert_eq!(body[1], ["Ophthalmology", "Elective", "2"]);
        assert_eq!(body.len(), 4);
    }

    #[test]
    fn potential_income_joins_on_procedure() {
        let (headers, body) = analysis_rows(
            "Potential_Income_Top_10_Efficient_Ophthalmology_Procedures",
            &data(),
        )
        .unwrap();
        assert_eq!(headers, ["ProcedureName", "Income", "AverageDuration"]);
        assert_eq!(body.len(), 1);
        assert_eq!(body[0], ["Cataract", "£1,000.00", "20.00"]);
    }
}
