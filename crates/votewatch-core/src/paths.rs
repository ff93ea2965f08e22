use crate::error::{Result, VoteError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const VOTEWATCH_DIR: &str = ".votewatch";
pub const CHAMBERS_DIR: &str = ".votewatch/chambers";
pub const RESOLUTIONS_DIR: &str = "resolutions";

pub const CONFIG_FILE: &str = ".votewatch/config.yaml";

pub const ROSTER_SUFFIX: &str = "_votes.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn votewatch_dir(root: &Path) -> PathBuf {
    root.join(VOTEWATCH_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn chambers_dir(root: &Path) -> PathBuf {
    root.join(CHAMBERS_DIR)
}

pub fn chamber_state_path(root: &Path, chamber: &str) -> PathBuf {
    chambers_dir(root).join(format!("{chamber}.yaml"))
}

pub fn resolutions_dir(root: &Path) -> PathBuf {
    root.join(RESOLUTIONS_DIR)
}

pub fn roster_path(root: &Path, resolution_id: &str) -> PathBuf {
    resolutions_dir(root).join(format!("{resolution_id}{ROSTER_SUFFIX}"))
}

// ---------------------------------------------------------------------------
// Id validation
// ---------------------------------------------------------------------------

static CHAMBER_RE: OnceLock<Regex> = OnceLock::new();
static RESOLUTION_RE: OnceLock<Regex> = OnceLock::new();

fn chamber_re() -> &'static Regex {
    CHAMBER_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap())
}

fn resolution_re() -> &'static Regex {
    RESOLUTION_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-]*$").unwrap())
}

/// Chamber ids become file names, so only plain alphanumerics are allowed.
pub fn validate_chamber(chamber: &str) -> Result<()> {
    if chamber.len() > 16 || !chamber_re().is_match(chamber) {
        return Err(VoteError::InvalidChamber(chamber.to_string()));
    }
    Ok(())
}

pub fn validate_resolution_id(id: &str) -> Result<()> {
    if id.len() > 128 || !resolution_re().is_match(id) {
        return Err(VoteError::InvalidResolutionId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids() {
        for id in ["1", "ga_612", "sc-401", "Repeal_98"] {
            validate_resolution_id(id).unwrap_or_else(|_| panic!("expected valid: {id}"));
        }
        for chamber in ["1", "2", "ga"] {
            validate_chamber(chamber).unwrap_or_else(|_| panic!("expected valid: {chamber}"));
        }
    }

    #[test]
    fn invalid_ids() {
        for id in ["", "../etc", "a/b", "_leading", "has space"] {
            assert!(validate_resolution_id(id).is_err(), "expected invalid: {id}");
        }
        for chamber in ["", "1/2", "g a", "."] {
            assert!(validate_chamber(chamber).is_err(), "expected invalid: {chamber}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/wa");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/wa/.votewatch/config.yaml")
        );
        assert_eq!(
            roster_path(root, "612"),
            PathBuf::from("/tmp/wa/resolutions/612_votes.yaml")
        );
        assert_eq!(
            chamber_state_path(root, "2"),
            PathBuf::from("/tmp/wa/.votewatch/chambers/2.yaml")
        );
    }
}
