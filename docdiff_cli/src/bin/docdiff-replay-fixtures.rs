use std::fs;
use std::path::Path;

use docdiff_diff::{Comparator, ComparisonDetail, LexicalComparator, LineSummary};
use docdiff_text::NormalizeOptions;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Fixture {
    name: String,
    original: String,
    revised: String,
    #[serde(default)]
    options: NormalizeOptions,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    is_identical: bool,
    lines_added: usize,
    lines_deleted: usize,
    lines_modified: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let fixtures_dir = repo_root.join("fixtures");

    let mut entries = fs::read_dir(&fixtures_dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.path());

    let mut checked = 0usize;
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let raw = fs::read_to_string(&path)?;
        let fixture: Fixture = serde_json::from_str(&raw)?;

        let comparison = LexicalComparator::new(fixture.options)
            .compare(&fixture.original, &fixture.revised)
            .map_err(|err| format!("fixture {}: comparison failed: {err}", fixture.name))?;

        if comparison.is_identical != fixture.expected.is_identical {
            return Err(format!(
                "fixture {}: is_identical mismatch: expected {}, got {}",
                fixture.name, fixture.expected.is_identical, comparison.is_identical
            )
            .into());
        }

        let summary = match &comparison.detail {
            ComparisonDetail::Lexical(diff) => diff.summary,
            ComparisonDetail::Semantic(_) => {
                return Err(format!("fixture {}: unexpected semantic detail", fixture.name).into());
            }
        };
        let expected = LineSummary {
            lines_added: fixture.expected.lines_added,
            lines_deleted: fixture.expected.lines_deleted,
            lines_modified: fixture.expected.lines_modified,
        };
        if summary != expected {
            return Err(format!(
                "fixture {}: summary mismatch: expected {:?}, got {:?}",
                fixture.name, expected, summary
            )
            .into());
        }

        checked += 1;
    }

    println!("replayed {checked} fixture(s)");
    Ok(())
}
