//! Quality control reports
//!
//! Summarises merged check flags per property and renders them either as a
//! coloured terminal table or as CSV through polars.

use crate::checks::{CheckInfo, CheckRun};
use crate::error::Result;
use crate::flags::ArgoQcFlag;
use crate::output::FlagArray;
use crate::profile::{Profile, Property};
use colored::*;
use polars::prelude::{Column, CsvWriter, DataFrame, SerWriter};
use std::collections::BTreeMap;
use std::io::Write;

/// Number of samples carrying each flag for one property
#[derive(Debug, Clone, PartialEq)]
pub struct FlagSummary {
    pub property: Property,
    pub counts: BTreeMap<&'static str, usize>,
    pub total: usize,
}

impl FlagSummary {
    fn from_flags(property: Property, flags: &FlagArray) -> Self {
        let counts = ArgoQcFlag::all_values()
            .into_iter()
            .map(|flag| (flag.name(), flags.count(flag)))
            .filter(|(_, count)| *count > 0)
            .collect();
        Self {
            property,
            counts,
            total: flags.len(),
        }
    }

    /// Samples carrying `flag`
    pub fn count(&self, flag: ArgoQcFlag) -> usize {
        self.counts.get(flag.name()).copied().unwrap_or(0)
    }
}

/// Result of running the quality control checks on one profile
#[derive(Debug)]
pub struct QcReport<'p> {
    profile: &'p Profile,
    flags: BTreeMap<Property, FlagArray>,
    checks: Vec<CheckInfo>,
    skipped: Vec<CheckInfo>,
    tests_performed: u32,
    tests_failed: u32,
}

impl<'p> QcReport<'p> {
    /// Merge the outputs of a check run into a report
    pub fn from_run(profile: &'p Profile, run: &CheckRun<'_>) -> Result<Self> {
        let flags = run.merged(profile)?.into_flags();
        Ok(Self {
            profile,
            flags,
            checks: run.results.iter().map(|result| result.info).collect(),
            skipped: run.skipped.clone(),
            tests_performed: run.tests_performed(),
            tests_failed: run.tests_failed(),
        })
    }

    /// Argo QC test bitmask of the checks performed
    pub fn tests_performed(&self) -> u32 {
        self.tests_performed
    }

    /// Argo QC test bitmask of the checks that failed at least one sample
    pub fn tests_failed(&self) -> u32 {
        self.tests_failed
    }

    /// Merged flags of `property`; every sample is `NO_QC` when no check
    /// inspected it
    pub fn flags(&self, property: Property) -> FlagArray {
        self.flags
            .get(&property)
            .cloned()
            .unwrap_or_else(|| FlagArray::new(self.profile.shape()))
    }

    pub fn summaries(&self) -> Vec<FlagSummary> {
        Property::ALL
            .into_iter()
            .map(|property| FlagSummary::from_flags(property, &self.flags(property)))
            .collect()
    }

    /// One line per sample with the values and wire codes of every property
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let shape = self.profile.shape();
        let width = shape.samples.max(1);
        let rows: Vec<u32> = (0..shape.len()).map(|i| (i / width) as u32).collect();
        let samples: Vec<u32> = (0..shape.len()).map(|i| (i % width) as u32).collect();

        let mut columns = vec![
            Column::new("ROW".into(), rows),
            Column::new("SAMPLE".into(), samples),
        ];
        for property in Property::ALL {
            let values = self.profile.property(property).to_options();
            columns.push(Column::new(property.name().into(), values));
        }
        for property in Property::ALL {
            let codes = self.flags(property).to_codes();
            columns.push(Column::new(property.qc_name().into(), codes));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Write the per-sample table as CSV
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut df = self.to_dataframe()?;
        CsvWriter::new(writer).include_header(true).finish(&mut df)?;
        Ok(())
    }

    /// Checks performed and their outcome
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let label = if self.profile.label().is_empty() {
            "profile"
        } else {
            self.profile.label()
        };

        out.push_str(&format!(
            "{} {} ({})\n",
            "Quality control for".bright_green().bold(),
            label.bright_white().bold(),
            self.profile.shape()
        ));

        for info in &self.checks {
            let status = if self.tests_failed & info.argo_binary_id != 0 {
                "FAILED".bright_red().bold()
            } else {
                "passed".green()
            };
            out.push_str(&format!("  {:<32} {}\n", info.to_string(), status));
        }
        for info in &self.skipped {
            let status = "skipped".dimmed();
            out.push_str(&format!("  {:<32} {}\n", info.to_string(), status));
        }

        out.push_str(&format!(
            "  Tests performed: {}  Tests failed: {}\n",
            self.tests_performed, self.tests_failed
        ));

        for summary in self.summaries() {
            let counts: Vec<String> = summary
                .counts
                .iter()
                .map(|(name, count)| format!("{name}={count}"))
                .collect();
            out.push_str(&format!(
                "  {:<5} {}\n",
                summary.property.name(),
                counts.join(" ")
            ));
        }

        out
    }

    /// Per-sample table with flags coloured by severity
    pub fn render_table(&self) -> String {
        let shape = self.profile.shape();
        let flags: Vec<FlagArray> = Property::ALL.iter().map(|p| self.flags(*p)).collect();

        let mut out = format!(
            "{:>4} {:>6} {:>10} {:>10} {:>10} {:>7} {:>7} {:>7}\n",
            "ROW", "SAMPLE", "PRES", "TEMP", "PSAL", "PRES_QC", "TEMP_QC", "PSAL_QC"
        );

        let width = shape.samples.max(1);
        for i in 0..shape.len() {
            out.push_str(&format!("{:>4} {:>6}", i / width, i % width));
            for property in Property::ALL {
                let value = match self.profile.property(property).get(i) {
                    Some(value) => format!("{value:>10.3}"),
                    None => format!("{:>10}", "--"),
                };
                out.push_str(&format!(" {value}"));
            }
            for property_flags in &flags {
                let flag = property_flags.get(i).unwrap_or(ArgoQcFlag::NoQc);
                let code = format!("{:>7}", flag.as_str());
                out.push_str(&format!(" {}", colorize(flag, &code)));
            }
            out.push('\n');
        }

        out
    }
}

fn colorize(flag: ArgoQcFlag, text: &str) -> ColoredString {
    match flag {
        ArgoQcFlag::Good => text.green(),
        ArgoQcFlag::ProbablyGood => text.cyan(),
        ArgoQcFlag::ProbablyBad => text.yellow(),
        ArgoQcFlag::Bad => text.bright_red().bold(),
        ArgoQcFlag::NoQc => text.dimmed(),
        _ => text.normal(),
    }
}

/// Flag vocabulary with wire codes and the flags each may overwrite
pub fn render_flag_table() -> Result<String> {
    let mut out = format!(
        "{:<14} {:<5} {:<45} {}\n",
        "FLAG", "CODE", "DESCRIPTION", "OVERRIDES"
    );
    for flag in ArgoQcFlag::all_values() {
        let overrides: Vec<&str> = flag.overridable_by()?.iter().map(|f| f.name()).collect();
        out.push_str(&format!(
            "{:<14} {:<5} {:<45} {}\n",
            flag.name(),
            format!("{:?}", flag.as_str()),
            flag.description(),
            overrides.join(", ")
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::run_checks;
    use crate::config::QcConfig;
    use crate::profile::PropertyData;

    fn create_test_profile() -> Profile {
        Profile::new(
            PropertyData::from_values(vec![0.0, 1.0, 1.0, 3.0]),
            PropertyData::from_options(vec![Some(10.0), Some(50.0), Some(9.0), None]),
            PropertyData::from_values(vec![35.0, 35.0, 35.0, 35.0]),
        )
        .unwrap()
        .with_label("R1901234_001")
    }

    #[test]
    fn test_report_from_run() {
        let profile = create_test_profile();
        let run = run_checks(&profile, None, &QcConfig::default()).unwrap();
        let report = QcReport::from_run(&profile, &run).unwrap();

        assert_eq!(report.tests_performed(), 64 | 256);
        assert_eq!(report.tests_failed(), 64 | 256);

        let summaries = report.summaries();
        assert_eq!(summaries.len(), 3);

        let temperature = &summaries[1];
        assert_eq!(temperature.property, Property::Temperature);
        assert_eq!(temperature.count(ArgoQcFlag::Good), 1);
        assert_eq!(temperature.count(ArgoQcFlag::Bad), 2);
        assert_eq!(temperature.count(ArgoQcFlag::NoQc), 1);
        assert_eq!(temperature.total, 4);
    }

    #[test]
    fn test_unchecked_property_reports_no_qc() {
        let profile = create_test_profile();
        let run = CheckRun::default();
        let report = QcReport::from_run(&profile, &run).unwrap();

        assert_eq!(report.flags(Property::Salinity).count(ArgoQcFlag::NoQc), 4);
        assert_eq!(report.tests_performed(), 0);
    }

    #[test]
    fn test_to_dataframe() {
        let profile = create_test_profile();
        let run = run_checks(&profile, None, &QcConfig::default()).unwrap();
        let report = QcReport::from_run(&profile, &run).unwrap();

        let df = report.to_dataframe().unwrap();
        assert_eq!(df.height(), 4);
        assert_eq!(df.width(), 8);

        let codes: Vec<Option<&str>> = df
            .column("TEMP_QC")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(codes, vec![Some("1"), Some("4"), Some("4"), Some("0")]);
    }

    #[test]
    fn test_write_csv() {
        let profile = create_test_profile();
        let run = run_checks(&profile, None, &QcConfig::default()).unwrap();
        let report = QcReport::from_run(&profile, &run).unwrap();

        let mut buffer = Vec::new();
        report.write_csv(&mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("ROW,SAMPLE,PRES,TEMP,PSAL,PRES_QC,TEMP_QC,PSAL_QC")
        );
        assert_eq!(csv.lines().count(), 5);
    }

    #[test]
    fn test_render_table_lists_every_sample() {
        let profile = create_test_profile();
        let run = run_checks(&profile, None, &QcConfig::default()).unwrap();
        let report = QcReport::from_run(&profile, &run).unwrap();

        let table = report.render_table();
        assert_eq!(table.lines().count(), 5);
        assert!(table.contains("--"));

        let summary = report.render_summary();
        assert!(summary.contains("R1901234_001"));
        assert!(summary.contains("Global range test"));
    }

    #[test]
    fn test_render_flag_table() {
        let table = render_flag_table().unwrap();
        assert_eq!(table.lines().count(), 10);
        assert!(table.contains("PROBABLY_BAD"));
        assert!(table.contains("FILL_VALUE"));
    }
}
