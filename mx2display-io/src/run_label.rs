//! Run/subrun labels parsed from DST file names.
//!
//! DST files carry the run and subrun in their name, e.g.
//! `MV_00001234_0005_numib_v09_2403011200_DST.root`. The label is the first
//! digit group that follows a `00` prefix and is joined to a second digit
//! group by an underscore (`001234_0005` above).

use std::fmt;
use std::path::Path;

/// Run identifier shown on the display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunLabel {
    /// `<run>_<subrun>` digits as they appear in the file name.
    Known { run: String, subrun: String },
    /// The file name holds no run/subrun pattern.
    Unknown,
}

fn digit_run(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()
}

impl RunLabel {
    /// Extracts the label from a file name.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let bytes = name.as_bytes();
        for start in 0..bytes.len().saturating_sub(1) {
            if &bytes[start..start + 2] != b"00" {
                continue;
            }
            let run_start = start + 2;
            let run_len = digit_run(bytes, run_start);
            let sep = run_start + run_len;
            if run_len == 0 || bytes.get(sep) != Some(&b'_') {
                continue;
            }
            let subrun_len = digit_run(bytes, sep + 1);
            if subrun_len == 0 {
                continue;
            }
            return RunLabel::Known {
                run: name[run_start..sep].to_string(),
                subrun: name[sep + 1..sep + 1 + subrun_len].to_string(),
            };
        }
        RunLabel::Unknown
    }

    /// Extracts the label from the file name of `path`.
    ///
    /// Logs a warning and returns [`RunLabel::Unknown`] if no label is found.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = Self::parse(&name);
        if label == RunLabel::Unknown {
            log::warn!(
                "run/subrun pattern not found in '{}', labelling run as unknown",
                path.display()
            );
        }
        label
    }

    /// Numeric run number, if known.
    #[must_use]
    pub fn run(&self) -> Option<u32> {
        match self {
            RunLabel::Known { run, .. } => run.parse().ok(),
            RunLabel::Unknown => None,
        }
    }

    /// Numeric subrun number, if known.
    #[must_use]
    pub fn subrun(&self) -> Option<u32> {
        match self {
            RunLabel::Known { subrun, .. } => subrun.parse().ok(),
            RunLabel::Unknown => None,
        }
    }
}

impl fmt::Display for RunLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunLabel::Known { run, subrun } => write!(f, "{run}_{subrun}"),
            RunLabel::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dst_name() {
        let label = RunLabel::parse("MV_00001234_0005_numib_v09_2403011200_DST.root");
        assert_eq!(label.to_string(), "001234_0005");
        assert_eq!(label.run(), Some(1234));
        assert_eq!(label.subrun(), Some(5));
    }

    #[test]
    fn test_parse_skips_partial_matches() {
        // "00_" has no run digits, the later "0042_7" matches
        let label = RunLabel::parse("x00_a0042_7.json");
        assert_eq!(label.to_string(), "42_7");
    }

    #[test]
    fn test_unknown() {
        assert_eq!(RunLabel::parse("event_display.json"), RunLabel::Unknown);
        assert_eq!(RunLabel::parse("0012"), RunLabel::Unknown);
        assert_eq!(RunLabel::parse(""), RunLabel::Unknown);
        assert_eq!(RunLabel::Unknown.to_string(), "unknown");
        assert_eq!(RunLabel::Unknown.run(), None);
    }

    #[test]
    fn test_from_path_uses_file_name() {
        let label = RunLabel::from_path(Path::new("/data/run_0099_1/MV_00000077_0003_DST.json"));
        assert_eq!(label.to_string(), "000077_0003");
    }
}
