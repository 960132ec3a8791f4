//! Report output
//!
//! The CSV report has a fixed column set: instance attributes, per-metric
//! maxima, then the recommendation columns. Empty cells mean "not
//! evaluated", `NA` means "evaluated, nothing cheaper found".

use crate::error::{Result, RightsizerError};
use crate::metrics::TrackedMetric;
use crate::recommend::{AnalyzedInstance, Suggestion};
use comfy_table::{Cell, Table};
use console::style;
use std::io::Write;
use std::path::Path;

const NOT_APPLICABLE: &str = "NA";

const PROFILE_COLUMNS: [&str; 8] = [
    "DBInstanceIdentifier",
    "DBInstanceClass",
    "Engine",
    "EngineVersion",
    "MultiAZ",
    "StorageType",
    "Iops",
    "AllocatedStorage",
];

const RECOMMENDATION_COLUMNS: [&str; 10] = [
    "instanceType",
    "vCPU",
    "Memory",
    "MonthlyCost",
    "GravitonInstanceType",
    "GravitonMonthlyCostSavings",
    "ScaleDownInstanceType",
    "ScaleDownCostSavings",
    "CostSavings-io1-to-gp3",
    "NoConnectionsInstances",
];

/// Full header row
pub fn header() -> Vec<String> {
    PROFILE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(TrackedMetric::ALL.iter().map(|m| format!("Max{}", m.name())))
        .chain(RECOMMENDATION_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn suggestion_cells(suggestion: &Suggestion) -> [String; 2] {
    match suggestion {
        Suggestion::Unavailable => [String::new(), String::new()],
        Suggestion::NotApplicable => [NOT_APPLICABLE.to_string(), NOT_APPLICABLE.to_string()],
        Suggestion::Switch {
            instance_type,
            monthly_savings,
        } => [instance_type.clone(), money(*monthly_savings)],
    }
}

/// One CSV row, aligned with `header()`
pub fn row(entry: &AnalyzedInstance) -> Vec<String> {
    let profile = &entry.profile;
    let rec = &entry.recommendation;

    let mut cells = vec![
        profile.id.clone(),
        profile.instance_class.clone(),
        profile.engine.clone(),
        profile.engine_version.clone(),
        profile.multi_az.to_string(),
        profile.storage_type.clone(),
        optional(profile.provisioned_iops),
        optional(profile.allocated_storage_gib),
    ];
    cells.extend(TrackedMetric::ALL.iter().map(|m| entry.usage.get(*m).to_string()));

    cells.push(rec.instance_type.clone());
    cells.push(optional(rec.current.map(|c| c.vcpu)));
    cells.push(optional(rec.current.map(|c| c.memory_gib)));
    cells.push(optional(rec.current.map(|c| money(c.monthly_cost))));
    cells.extend(suggestion_cells(&rec.graviton));
    cells.extend(suggestion_cells(&rec.scale_down));
    cells.push(optional(rec.io_savings.map(money)));
    cells.push(rec.idle_instance.clone().unwrap_or_default());
    cells
}

/// Write the CSV report to any writer
pub fn write_csv<W: Write>(writer: W, entries: &[AnalyzedInstance]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(header())?;
    for entry in entries {
        csv.write_record(row(entry))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the CSV report to `path`
pub fn write_csv_file(path: &Path, entries: &[AnalyzedInstance]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(file, entries)
}

/// Render the CSV report to a string
pub fn to_csv_string(entries: &[AnalyzedInstance]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, entries)?;
    String::from_utf8(buffer).map_err(|e| RightsizerError::Io(std::io::Error::other(e)))
}

/// Print the records as pretty JSON on stdout
pub fn print_json(entries: &[AnalyzedInstance]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(entries)?);
    Ok(())
}

fn suggestion_label(suggestion: &Suggestion) -> String {
    match suggestion {
        Suggestion::Unavailable => "-".to_string(),
        Suggestion::NotApplicable => NOT_APPLICABLE.to_string(),
        Suggestion::Switch {
            instance_type,
            monthly_savings,
        } => format!("{} (${:.2}/mo)", instance_type, monthly_savings),
    }
}

/// Summary table for terminal output
pub fn summary_table(entries: &[AnalyzedInstance]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Instance",
        "Class",
        "Monthly Cost",
        "Graviton",
        "Scale Down",
        "io1 -> gp3",
        "Idle",
    ]);
    for entry in entries {
        let rec = &entry.recommendation;
        table.add_row(vec![
            Cell::new(&rec.instance_id),
            Cell::new(&rec.instance_type),
            Cell::new(
                rec.current
                    .map(|c| format!("${:.2}", c.monthly_cost))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(suggestion_label(&rec.graviton)),
            Cell::new(suggestion_label(&rec.scale_down)),
            Cell::new(
                rec.io_savings
                    .map(|s| format!("${:.2}/mo", s))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(if rec.idle_instance.is_some() { "yes" } else { "" }),
        ]);
    }
    table
}

/// Total potential monthly savings across all records
pub fn total_potential_savings(entries: &[AnalyzedInstance]) -> f64 {
    entries
        .iter()
        .map(|e| e.recommendation.potential_savings())
        .sum()
}

/// Print the summary table and the report location
pub fn print_summary(entries: &[AnalyzedInstance], report_path: &Path) {
    if entries.is_empty() {
        println!("{}", style("No instances could be analyzed").yellow());
    } else {
        println!("{}", summary_table(entries));
        println!(
            "Potential monthly savings: {}",
            style(format!("${:.2}", total_potential_savings(entries)))
                .green()
                .bold()
        );
    }
    println!("Report written to {}", report_path.display());
}
