//! Name pools for identity generation
//!
//! Built-in first/last name lists plus loading of replacement pools from
//! user-supplied, newline-delimited text files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use tracing::info;

use crate::error::NameSourceError;

/// Common first names for males
pub const MALE_FIRST_NAMES: &[&str] = &[
    "James", "John", "Robert", "Michael", "William", "David", "Richard", "Joseph",
    "Thomas", "Christopher", "Charles", "Daniel", "Matthew", "Anthony", "Mark",
    "Donald", "Steven", "Kenneth", "Andrew", "Joshua", "Kevin", "Brian",
    "George", "Edward", "Ronald", "Timothy", "Jason", "Jeffrey", "Ryan", "Jacob",
];

/// Common first names for females
pub const FEMALE_FIRST_NAMES: &[&str] = &[
    "Mary", "Patricia", "Jennifer", "Linda", "Elizabeth", "Barbara", "Susan", "Jessica",
    "Sarah", "Karen", "Nancy", "Betty", "Margaret", "Sandra", "Ashley", "Kimberly",
    "Emily", "Donna", "Michelle", "Dorothy", "Carol", "Amanda", "Melissa", "Deborah",
    "Stephanie", "Rebecca", "Sharon", "Laura", "Cynthia", "Kathleen", "Amy", "Shirley",
];

/// Common last names
pub const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
    "Rodriguez", "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson",
    "Thomas", "Taylor", "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson",
    "White", "Harris", "Sanchez", "Clark", "Ramirez", "Lewis", "Robinson", "Walker",
    "Young", "Allen", "King", "Wright", "Scott", "Torres", "Nguyen", "Hill", "Flores",
    "Green", "Adams", "Nelson", "Baker", "Hall", "Rivera", "Campbell", "Mitchell",
];

/// Countries offered for account registration
pub const COUNTRIES: &[&str] = &[
    "United States", "Canada", "United Kingdom", "Australia", "Germany", "France",
    "Italy", "Spain", "Netherlands", "Belgium", "Switzerland", "Austria", "Sweden",
    "Norway", "Denmark", "Finland", "Ireland", "New Zealand", "Singapore", "Japan",
];

/// Both gender buckets as one flat pool, male names first.
static DEFAULT_FIRST_NAMES: Lazy<Vec<String>> = Lazy::new(|| {
    MALE_FIRST_NAMES
        .iter()
        .chain(FEMALE_FIRST_NAMES)
        .map(|name| name.to_string())
        .collect()
});

static DEFAULT_LAST_NAMES: Lazy<Vec<String>> =
    Lazy::new(|| LAST_NAMES.iter().map(|name| name.to_string()).collect());

/// Paths of the optional name-list files.
#[derive(Debug, Clone, Default)]
pub struct NameFiles {
    /// One person per line: `First Last` or `First, Last`
    pub combined: Option<PathBuf>,
    /// One first name per line
    pub first_names: Option<PathBuf>,
    /// One last name per line
    pub last_names: Option<PathBuf>,
}

impl NameFiles {
    pub fn is_empty(&self) -> bool {
        self.combined.is_none() && self.first_names.is_none() && self.last_names.is_none()
    }
}

/// Outcome of [`NameSource::load_from_files`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub first_names: usize,
    pub last_names: usize,
    pub replaced_first: bool,
    pub replaced_last: bool,
}

/// The active first/last name pools.
///
/// Starts out with the built-in lists. Each pool is swapped wholesale by
/// [`load_from_files`](Self::load_from_files) and is never empty.
#[derive(Debug, Clone)]
pub struct NameSource {
    first_names: Vec<String>,
    last_names: Vec<String>,
    custom_first: bool,
    custom_last: bool,
}

impl NameSource {
    pub fn builtin() -> Self {
        Self {
            first_names: DEFAULT_FIRST_NAMES.clone(),
            last_names: DEFAULT_LAST_NAMES.clone(),
            custom_first: false,
            custom_last: false,
        }
    }

    /// Build a source from the built-in lists, then apply `files`.
    pub fn from_files(files: &NameFiles) -> Result<Self, NameSourceError> {
        let mut source = Self::builtin();
        source.load_from_files(files)?;
        Ok(source)
    }

    /// Replace the pools with names read from `files`.
    ///
    /// Every file is read before either pool changes, so a failed read leaves
    /// the source exactly as it was. A pool that ends up empty after
    /// deduplication keeps its previous contents.
    pub fn load_from_files(&mut self, files: &NameFiles) -> Result<LoadSummary, NameSourceError> {
        let mut firsts = Vec::new();
        let mut lasts = Vec::new();

        if let Some(path) = &files.combined {
            let (f, l) = parse_combined(&read_list(path)?);
            firsts.extend(f);
            lasts.extend(l);
        }
        if let Some(path) = &files.first_names {
            firsts.extend(parse_single_column(&read_list(path)?));
        }
        if let Some(path) = &files.last_names {
            lasts.extend(parse_single_column(&read_list(path)?));
        }

        let firsts = dedup(firsts);
        let lasts = dedup(lasts);
        let replaced_first = !firsts.is_empty();
        let replaced_last = !lasts.is_empty();

        if replaced_first {
            self.first_names = firsts;
            self.custom_first = true;
        }
        if replaced_last {
            self.last_names = lasts;
            self.custom_last = true;
        }

        let summary = LoadSummary {
            first_names: self.first_names.len(),
            last_names: self.last_names.len(),
            replaced_first,
            replaced_last,
        };
        info!(
            "Name pools: {} first names{}, {} last names{}",
            summary.first_names,
            if replaced_first { " (custom)" } else { "" },
            summary.last_names,
            if replaced_last { " (custom)" } else { "" },
        );
        Ok(summary)
    }

    pub fn first_names(&self) -> &[String] {
        &self.first_names
    }

    pub fn last_names(&self) -> &[String] {
        &self.last_names
    }

    pub fn countries(&self) -> &'static [&'static str] {
        COUNTRIES
    }

    /// True once a loaded list has replaced the built-in first names.
    pub fn has_custom_first_names(&self) -> bool {
        self.custom_first
    }

    pub fn has_custom_last_names(&self) -> bool {
        self.custom_last
    }
}

impl Default for NameSource {
    fn default() -> Self {
        Self::builtin()
    }
}

fn read_list(path: &Path) -> Result<String, NameSourceError> {
    fs::read_to_string(path).map_err(|source| NameSourceError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Split `First Last` lines into first/last candidates.
///
/// Commas count as whitespace; middle tokens are ignored and lines with
/// fewer than two tokens are skipped.
pub fn parse_combined(text: &str) -> (Vec<String>, Vec<String>) {
    let mut firsts = Vec::new();
    let mut lasts = Vec::new();

    for line in text.lines() {
        let tokens: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .collect();
        if let [first, .., last] = tokens.as_slice() {
            firsts.push(first.to_string());
            lasts.push(last.to_string());
        }
    }

    (firsts, lasts)
}

/// One trimmed name per non-blank line.
pub fn parse_single_column(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drop repeats, keeping the first occurrence of each name.
fn dedup(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_builtin_pool_sizes() {
        let source = NameSource::builtin();
        assert_eq!(
            source.first_names().len(),
            MALE_FIRST_NAMES.len() + FEMALE_FIRST_NAMES.len()
        );
        assert_eq!(source.last_names().len(), 48);
        assert_eq!(source.countries().len(), 20);
        assert!(!source.has_custom_first_names());
    }

    #[test]
    fn test_parse_combined_skips_short_lines() {
        let (firsts, lasts) = parse_combined("Ada Lovelace\nPlato\n\n  Grace, Brewster Hopper \n");
        assert_eq!(firsts, vec!["Ada", "Grace"]);
        assert_eq!(lasts, vec!["Lovelace", "Hopper"]);
    }

    #[test]
    fn test_combined_file_dedups_in_first_occurrence_order() {
        let dir = tempfile::tempdir().unwrap();
        let combined = write_file(
            dir.path(),
            "people.txt",
            "Zoe Adams\nAmy Brown\nZoe Clark\nAmy Adams\nBen Brown\n",
        );

        let mut source = NameSource::builtin();
        let summary = source
            .load_from_files(&NameFiles {
                combined: Some(combined),
                ..NameFiles::default()
            })
            .unwrap();

        assert_eq!(source.first_names(), ["Zoe", "Amy", "Ben"]);
        assert_eq!(source.last_names(), ["Adams", "Brown", "Clark"]);
        assert!(summary.replaced_first && summary.replaced_last);
        assert!(source.has_custom_first_names());
    }

    #[test]
    fn test_sources_concatenate_before_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let combined = write_file(dir.path(), "c.txt", "Ann Lee\n");
        let firsts = write_file(dir.path(), "f.txt", "Bea\nAnn\n\n  Cy  \n");

        let source = NameSource::from_files(&NameFiles {
            combined: Some(combined),
            first_names: Some(firsts),
            last_names: None,
        })
        .unwrap();

        assert_eq!(source.first_names(), ["Ann", "Bea", "Cy"]);
        assert_eq!(source.last_names(), ["Lee"]);
    }

    #[test]
    fn test_empty_replacement_keeps_default() {
        let dir = tempfile::tempdir().unwrap();
        let lasts = write_file(dir.path(), "l.txt", "\n   \n");

        let mut source = NameSource::builtin();
        let summary = source
            .load_from_files(&NameFiles {
                last_names: Some(lasts),
                ..NameFiles::default()
            })
            .unwrap();

        assert!(!summary.replaced_last);
        assert_eq!(source.last_names().len(), LAST_NAMES.len());
    }

    #[test]
    fn test_missing_file_errors_without_partial_update() {
        let dir = tempfile::tempdir().unwrap();
        let firsts = write_file(dir.path(), "f.txt", "Only\n");

        let mut source = NameSource::builtin();
        let result = source.load_from_files(&NameFiles {
            combined: None,
            first_names: Some(firsts),
            last_names: Some(dir.path().join("missing.txt")),
        });

        assert!(matches!(result, Err(NameSourceError::Read { .. })));
        assert_eq!(source.first_names().len(), DEFAULT_FIRST_NAMES.len());
        assert!(!source.has_custom_first_names());
    }
}
