use crate::output::{print_json, print_table};
use anyhow::Context;
use readlog_core::{batch::inspect_file, io, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let dir = config.content_dir(root);
    let records = io::list_records(&dir)
        .with_context(|| format!("failed to list records in {}", dir.display()))?;

    let mut statuses = Vec::with_capacity(records.len());
    let mut unreadable = Vec::new();
    for path in &records {
        match inspect_file(path) {
            Ok(status) => statuses.push(status),
            Err(e) => unreadable.push((paths::display_relative(root, path), e.to_string())),
        }
    }

    if json {
        let unreadable: Vec<_> = unreadable
            .iter()
            .map(|(path, error)| serde_json::json!({ "path": path, "error": error }))
            .collect();
        print_json(&serde_json::json!({
            "records": statuses,
            "unreadable": unreadable,
        }))?;
        return Ok(());
    }

    if statuses.is_empty() && unreadable.is_empty() {
        println!("No reading records in {}.", dir.display());
        return Ok(());
    }

    let mut rows: Vec<Vec<String>> = statuses
        .iter()
        .map(|s| {
            vec![
                paths::display_relative(root, &s.path),
                s.title.clone().unwrap_or_else(|| "-".to_string()),
                s.isbn13.clone().unwrap_or_else(|| "-".to_string()),
                s.updated_at.clone().unwrap_or_else(|| "pending".to_string()),
            ]
        })
        .collect();
    rows.extend(unreadable.iter().map(|(path, error)| {
        vec![path.clone(), format!("error: {error}"), "-".to_string(), "-".to_string()]
    }));
    print_table(&["FILE", "TITLE", "ISBN13", "UPDATED"], &rows);

    let pending = statuses.iter().filter(|s| !s.is_enriched()).count();
    println!();
    println!("{} record(s), {pending} pending enrichment", statuses.len());
    Ok(())
}
