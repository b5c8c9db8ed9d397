//! Reference SQL shown on the "SQL Analysis" page.
//!
//! The queries document how each pre-aggregated CSV under the data directory
//! was produced. They are never executed; the CSV named by
//! [`Analysis::csv_filename`] is what gets displayed.

pub const NO_DESCRIPTION: &str = "No description available for this analysis.";
pub const NO_QUERY: &str = "No SQL query available for this analysis.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analysis {
    pub name: &'static str,
    pub description: &'static str,
    pub sql: &'static str,
}

impl Analysis {
    /// `"Top 5 Theatres"` → `"Top_5_Theatres.csv"`.
    pub fn csv_filename(&self) -> String {
        csv_filename(self.name)
    }
}

pub fn csv_filename(name: &str) -> String {
    format!("{}.csv", name.replace(' ', "_"))
}

pub fn find(name: &str) -> Option<&'static Analysis> {
    ANALYSES.iter().find(|a| a.name == name)
}

pub fn description(name: &str) -> &'static str {
    find(name).map_or(NO_DESCRIPTION, |a| a.description)
}

pub fn sql(name: &str) -> &'static str {
    find(name).map_or(NO_QUERY, |a| a.sql)
}

pub static ANALYSES: &[Analysis] = &[
    Analysis {
        name: "Cases_by_Treatment_and_Case_Type",
        description: "This analysis shows how cases are distributed across different treatment types and case categories, providing insight into the focus areas of healthcare services.",
        sql: "\
-- number of cases by Treatment Function and Case Type
SELECT
    TreatmentFunction,
    CaseType,
    COUNT(*) AS NumberOfCases
FROM
    Business_Analyst_Test_Theatre_Cases
GROUP BY
    TreatmentFunction,
    CaseType
ORDER BY
    TreatmentFunction,
    CaseType;",
    },
    Analysis {
        name: "Cases_by_Procedure_and_Case_Type",
        description: "This analysis details the number of cases for each procedure, categorized by case type.",
        sql: "\
-- number of cases by Procedure Name and Case Type
SELECT
    ProcedureName,
    CaseType,
    COUNT(*) AS NumberOfCases
FROM
    Business_Analyst_Test_Theatre_Cases
GROUP BY
    ProcedureName,
    CaseType
ORDER BY
    ProcedureName,
    CaseType;",
    },
    Analysis {
        name: "Top_20_Elective_Procedures_by_Cases",
        description: "List of the top 20 elective procedures ranked by the number of cases, highlighting the most frequently performed elective surgeries.",
        sql: "\
-- top 20 elective procedures by number of cases
SELECT TOP 20
    ProcedureName,
    COUNT(*) AS NumberOfCases
FROM
    Business_Analyst_Test_Theatre_Cases
WHERE
    CaseType = 'Elective'
GROUP BY
    ProcedureName
ORDER BY
    NumberOfCases DESC;",
    },
    Analysis {
        name: "Average_Surgery_Duration_by_Procedure",
        description: "Analyzes the average duration of surgeries across different procedures, focusing on elective surgeries.",
        sql: "\
-- average duration of surgery for elective procedures
SELECT
    ProcedureName,
    AVG(DurationOfSurgeryMinutes) AS AverageDuration
FROM
    Business_Analyst_Test_Theatre_Cases
WHERE
    CaseType = 'Elective'
GROUP BY
    ProcedureName
ORDER BY
    AverageDuration DESC;",
    },
    Analysis {
        name: "Top_10_Procedures_Longest_Duration",
        description: "Identifies the top 10 procedures with the longest average surgery times.",
        sql: "\
-- top 10 procedures with the longest average duration
SELECT TOP 10
    ProcedureName,
    AVG(DurationOfSurgeryMinutes) AS AverageDuration
FROM
    Business_Analyst_Test_Theatre_Cases
WHERE
    CaseType = 'Elective'
GROUP BY
    ProcedureName
ORDER BY
    AverageDuration DESC;",
    },
    Analysis {
        name: "Top_10_Procedures_Shortest_Duration",
        description: "Shows the procedures that have the shortest average surgery times, allowing for quick patient turnover.",
        sql: "\
-- top 10 procedures with the shortest average duration
SELECT TOP 10
    ProcedureName,
    AVG(DurationOfSurgeryMinutes) AS AverageDuration
FROM
    Business_Analyst_Test_Theatre_Cases
WHERE
    CaseType = 'Elective'
GROUP BY
    ProcedureName
ORDER BY
    AverageDuration ASC;",
    },
    Analysis {
        name: "Top_10_Consultants_Most_Late_Starts",
        description: "Highlights the top 10 consultants with the most frequent late starts, indicating potential areas for efficiency improvement.",
        sql: "\
-- top 10 consultants with the most late starts
SELECT TOP 10
    Consultant,
    COUNT(*) AS LateStarts
FROM Business_Analyst_Test_Theatre_Cases
WHERE CaseType = 'Elective' AND TreatmentFunction = 'Ophthalmology' AND LateStart = 1
GROUP BY Consultant
ORDER BY LateStarts DESC;",
    },
    Analysis {
        name: "Top_5_Theatres_Most_Late_Starts",
        description: "Details which 5 theatres have the most late starts, which may indicate logistical or operational challenges.",
        sql: "\
-- theatres with the most late starts
SELECT TOP 5
    TheatreName,
    COUNT(*) AS LateStarts
FROM Business_Analyst_Test_Theatre_Cases
WHERE CaseType = 'Elective' AND TreatmentFunction = 'Ophthalmology' AND LateStart = 1
GROUP BY TheatreName
ORDER BY LateStarts DESC;",
    },
    Analysis {
        name: "Theatre_Most_Early_Finishes",
        description: "Identifies the theatre with the most early finishes, potentially indicating better than expected operational efficiency.",
        sql: "\
-- theatres with the most early finishes
SELECT TOP 4
    TheatreName,
    COUNT(*) AS EarlyFinishes
FROM Business_Analyst_Test_Theatre_Cases
WHERE CaseType = 'Elective' AND TreatmentFunction = 'Ophthalmology' AND EarlyFinish = 1
GROUP BY TheatreName
ORDER BY EarlyFinishes DESC;",
    },
    Analysis {
        name: "Potential_Income_Top_10_Efficient_Ophthalmology_Procedures",
        description: "Estimates potential income increases if the top 3 most efficient ophthalmology procedures were performed more frequently.",
        sql: "\
-- income for the most efficient Ophthalmology procedures
SELECT
    a.ProcedureName,
    b.Income,
    a.AverageDuration
FROM
    (SELECT TOP 10
        ProcedureName,
        AVG(DurationOfSurgeryMinutes) AS AverageDuration
    FROM
        Business_Analyst_Test_Theatre_Cases
    WHERE
        CaseType = 'Elective' AND TreatmentFunction = 'Ophthalmology'
    GROUP BY
        ProcedureName
    ORDER BY
        AverageDuration ASC) a
JOIN
    NHS_Biz_Ophthalmology_Income b ON a.ProcedureName = b.Procedure_Name;",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn filename_replaces_spaces() {
        assert_eq!(csv_filename("Top 5 Theatres"), "Top_5_Theatres.csv");
        assert_eq!(
            find("Theatre_Most_Early_Finishes").unwrap().csv_filename(),
            "Theatre_Most_Early_Finishes.csv"
        );
    }

    #[test]
    fn unknown_names_fall_back() {
        assert_eq!(description("Nope"), NO_DESCRIPTION);
        assert_eq!(sql("Nope"), NO_QUERY);
    }

    #[test]
    fn every_analysis_is_complete_and_unique() {
        let names: BTreeSet<_> = ANALYSES.iter().map(|a| a.name).collect();
        assert_eq!(names.len(), ANALYSES.len());
        assert_eq!(ANALYSES.len(), 10);
        for a in ANALYSES {
            assert!(!a.description.is_empty());
            assert!(a.sql.contains("SELECT"), "{} has no query", a.name);
        }
    }
}
