use crate::output::print_json;
use anyhow::Context;
use readlog_core::{
    isbndb::{IsbnDbClient, MetadataSource},
    query::{normalize_isbn, MetadataQuery},
};
use std::path::Path;

pub fn run(
    root: &Path,
    isbn: Option<&str>,
    title: Option<&str>,
    author: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let query = match (isbn, title) {
        (Some(isbn), _) => MetadataQuery::Isbn {
            isbn: normalize_isbn(isbn)?,
        },
        (None, Some(title)) => MetadataQuery::search(title, author),
        (None, None) => anyhow::bail!("pass --isbn or --title"),
    };

    let config = super::load_config(root)?;
    let client = IsbnDbClient::from_config(&config).context("failed to set up metadata client")?;
    let found = client
        .lookup(&query)
        .with_context(|| format!("lookup failed for {query}"))?;

    match found {
        None => {
            if json {
                print_json(&serde_json::Value::Null)?;
            } else {
                println!("No metadata found for {query}.");
            }
        }
        Some(book) => {
            if json {
                print_json(&book)?;
            } else {
                for (key, value) in &book {
                    match value {
                        serde_json::Value::String(s) if s.is_empty() => {}
                        serde_json::Value::Null => {}
                        serde_json::Value::String(s) => println!("{key}: {s}"),
                        other => println!("{key}: {other}"),
                    }
                }
            }
        }
    }

    Ok(())
}
