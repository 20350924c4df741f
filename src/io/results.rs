//! Plain-text results file
//!
//! Each comparison appends two lines: the space-separated field names and the
//! nine values in fixed six-decimal notation.

use crate::compare::{MeshDifferences, RESULT_FIELD_NAMES};
use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Header line naming the nine values
pub fn results_header() -> String {
    RESULT_FIELD_NAMES.join(" ")
}

/// Value line in interchange order
pub fn format_results(differences: &MeshDifferences) -> String {
    differences
        .values()
        .iter()
        .map(|v| format!("{:.6}", v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Append the header and value lines to `path`, creating it if needed
pub fn append_results(path: &Path, differences: &MeshDifferences) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", results_header())?;
    writeln!(file, "{}", format_results(differences))?;

    log::info!("Appended comparison results to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MeshDifferences {
        MeshDifferences {
            min_dist: -0.25,
            max_dist: 1.5,
            abs_min_dist: 0.0,
            abs_max_dist: 1.5,
            mean_dist: 0.125,
            abs_mean_dist: 0.5,
            rms_dist: 0.75,
            volume_overlap: 0.5,
            intersection_over_union: 1.0 / 3.0,
        }
    }

    #[test]
    fn test_format_results() {
        assert_eq!(
            results_header(),
            "min_dist max_dist min_abs_dist max_abs_dist mean_dist mean_abs_dist rms_dist volume_overlap int_over_union"
        );
        assert_eq!(
            format_results(&sample()),
            "-0.250000 1.500000 0.000000 1.500000 0.125000 0.500000 0.750000 0.500000 0.333333"
        );
    }

    #[test]
    fn test_append_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");

        append_results(&path, &sample()).unwrap();
        append_results(&path, &sample()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], results_header());
        assert_eq!(lines[3], format_results(&sample()));
    }
}
