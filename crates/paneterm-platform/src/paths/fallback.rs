//! Synthesized fallback `PATH`.
//!
//! Used when the shell cannot be queried (broken rc files, hung prompts,
//! missing shell). Well-known user and package-manager `bin` directories
//! come first, then everything already on the inherited `PATH`, with
//! duplicates removed while preserving first occurrence.

use std::path::PathBuf;

/// Platform `PATH` entry separator.
#[cfg(windows)]
const PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
const PATH_SEPARATOR: char = ':';

/// Home-relative directories commonly added by user tooling.
const HOME_BIN_DIRS: &[&str] = &[
    "bin",
    ".local/bin",
    ".cargo/bin",
    ".deno/bin",
    ".bun/bin",
    "go/bin",
];

/// Fixed system directories commonly populated by package managers.
#[cfg(unix)]
const SYSTEM_BIN_DIRS: &[&str] = &[
    "/opt/homebrew/bin",
    "/opt/homebrew/sbin",
    "/usr/local/bin",
    "/usr/local/sbin",
];

#[cfg(not(unix))]
const SYSTEM_BIN_DIRS: &[&str] = &[];

/// Build the synthesized fallback `PATH`.
///
/// Entry order: home-relative tool directories, fixed package-manager
/// directories, then the inherited process `PATH`. Duplicates keep their
/// first occurrence.
pub fn fallback_path() -> String {
    let mut entries: Vec<String> = Vec::new();

    if let Some(home) = dirs::home_dir() {
        for dir in HOME_BIN_DIRS {
            entries.push(join_home(&home, dir));
        }
    }

    for dir in SYSTEM_BIN_DIRS {
        entries.push((*dir).to_string());
    }

    if let Ok(inherited) = std::env::var("PATH") {
        for entry in inherited.split(PATH_SEPARATOR) {
            if !entry.is_empty() {
                entries.push(entry.to_string());
            }
        }
    }

    dedup_preserving_order(entries).join(&PATH_SEPARATOR.to_string())
}

fn join_home(home: &PathBuf, relative: &str) -> String {
    home.join(relative).to_string_lossy().into_owned()
}

/// Remove duplicate entries, keeping the first occurrence of each.
fn dedup_preserving_order(entries: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.clone()))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence() {
        let entries = vec![
            "/usr/bin".to_string(),
            "/usr/local/bin".to_string(),
            "/usr/bin".to_string(),
            "/opt/bin".to_string(),
            "/usr/local/bin".to_string(),
        ];
        assert_eq!(
            dedup_preserving_order(entries),
            vec!["/usr/bin", "/usr/local/bin", "/opt/bin"]
        );
    }

    #[test]
    fn fallback_path_is_non_empty() {
        let path = fallback_path();
        assert!(!path.is_empty(), "fallback PATH should never be empty");
    }

    #[test]
    fn fallback_path_has_no_duplicate_entries() {
        let path = fallback_path();
        let entries: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let unique: std::collections::HashSet<&str> = entries.iter().copied().collect();
        assert_eq!(
            entries.len(),
            unique.len(),
            "fallback PATH should be deduplicated: {path}"
        );
    }

    #[test]
    fn fallback_path_keeps_inherited_entries() {
        // Every entry of the inherited PATH must survive the merge.
        let inherited = std::env::var("PATH").expect("PATH should be set in tests");
        let fallback = fallback_path();
        for entry in inherited.split(PATH_SEPARATOR).filter(|e| !e.is_empty()) {
            assert!(
                fallback.split(PATH_SEPARATOR).any(|f| f == entry),
                "inherited entry {entry} missing from fallback: {fallback}"
            );
        }
    }

    #[test]
    #[cfg(unix)]
    fn fallback_path_puts_home_dirs_first() {
        if let Some(home) = dirs::home_dir() {
            let first = fallback_path()
                .split(PATH_SEPARATOR)
                .next()
                .expect("fallback PATH has at least one entry")
                .to_string();
            assert_eq!(first, home.join("bin").to_string_lossy());
        }
    }
}
