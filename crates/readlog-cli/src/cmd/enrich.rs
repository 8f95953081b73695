use crate::output::{print_json, print_table};
use anyhow::Context;
use readlog_core::{
    batch::{enrich_all, BatchReport},
    enrich::Outcome,
    io,
    isbndb::IsbnDbClient,
    paths,
};
use std::path::{Path, PathBuf};

pub fn run(root: &Path, files: Vec<PathBuf>, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;

    let targets = if files.is_empty() {
        let dir = config.content_dir(root);
        io::list_records(&dir)
            .with_context(|| format!("failed to list records in {}", dir.display()))?
    } else {
        files
            .into_iter()
            .map(|f| if f.is_absolute() { f } else { root.join(f) })
            .collect()
    };

    if targets.is_empty() {
        if json {
            print_json(&BatchReport::default())?;
        } else {
            println!("No reading records found.");
        }
        return Ok(());
    }

    let client = IsbnDbClient::from_config(&config).context("failed to set up metadata client")?;
    let today = chrono::Local::now().date_naive();
    let report = enrich_all(&targets, &client, today, dry_run);

    if json {
        print_json(&report)?;
    } else {
        print_report(root, &report, dry_run);
    }

    if report.has_failures() {
        anyhow::bail!("{} record(s) could not be enriched", report.failures.len());
    }
    Ok(())
}

fn print_report(root: &Path, report: &BatchReport, dry_run: bool) {
    let mut rows: Vec<Vec<String>> = report
        .files
        .iter()
        .map(|f| {
            let detail = match &f.outcome {
                Outcome::AlreadyEnriched => String::new(),
                Outcome::NotFound { query } => query.to_string(),
                Outcome::Enriched { added, .. } => added
                    .iter()
                    .map(|c| c.key.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            };
            vec![
                paths::display_relative(root, &f.path),
                f.outcome.label().to_string(),
                detail,
            ]
        })
        .collect();
    rows.extend(report.failures.iter().map(|f| {
        vec![
            paths::display_relative(root, &f.path),
            "failed".to_string(),
            f.error.clone(),
        ]
    }));

    print_table(&["FILE", "OUTCOME", "DETAIL"], &rows);

    println!();
    let verb = if dry_run { "would enrich" } else { "enriched" };
    println!(
        "{} {verb}, {} skipped, {} not found, {} failed",
        report.count("enriched"),
        report.count("skipped"),
        report.count("not found"),
        report.failures.len()
    );
}
