use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration loaded from a `.samlcheckrc` TOML file.
///
/// Looked up first next to the checked file, then in `$HOME`.
/// CLI flags always take precedence over file values.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RcConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
    pub no_color: Option<bool>,
    pub sp_only: Option<bool>,
}

impl RcConfig {
    /// Load `.samlcheckrc` from `dir`, falling back to `$HOME`.
    pub fn load(dir: &Path) -> Self {
        let candidates = [Some(dir.join(".samlcheckrc")), dirs_home().map(|h| h.join(".samlcheckrc"))];

        for candidate in candidates.iter().flatten() {
            let Ok(contents) = std::fs::read_to_string(candidate) else {
                continue;
            };
            match toml::from_str::<RcConfig>(&contents) {
                Ok(cfg) => {
                    tracing::debug!(path = %candidate.display(), "loaded rc file");
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(path = %candidate.display(), error = %e, "ignoring unreadable rc file")
                }
            }
        }

        RcConfig::default()
    }

    /// A flag is on when the command line sets it or the rc file does.
    pub fn merge(cli_flag: bool, rc_value: Option<bool>) -> bool {
        cli_flag || rc_value.unwrap_or(false)
    }
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rc_next_to_checked_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".samlcheckrc"), "verbose = true\nsp_only = true\n").unwrap();
        let rc = RcConfig::load(dir.path());
        assert_eq!(rc.verbose, Some(true));
        assert_eq!(rc.sp_only, Some(true));
        assert_eq!(rc.json, None);
    }

    #[test]
    fn cli_flag_wins_over_absent_rc() {
        assert!(RcConfig::merge(true, None));
        assert!(RcConfig::merge(false, Some(true)));
        assert!(!RcConfig::merge(false, Some(false)));
        assert!(!RcConfig::merge(false, None));
    }
}
