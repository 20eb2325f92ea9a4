//! Command-line argument parsing and handling.

use clap::Parser;
use locale_patcher_core::PatcherConfig;
use std::path::PathBuf;

/// locale-patcher - apply translated strings to a folder of JSON locale files
#[derive(Parser, Debug)]
#[command(name = "locale-patcher")]
#[command(version)]
#[command(about = "Apply patch documents of translated strings to JSON locale files")]
#[command(long_about = None)]
pub struct Args {
    /// Patch documents (YAML or JSON) applied in the given order
    #[arg(value_name = "PATCH", required = true)]
    pub patches: Vec<PathBuf>,

    /// Locale directory (overrides `directory` from the config file)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Run configuration file (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Locale whose entry is used for files without their own entry
    #[arg(long, value_name = "CODE")]
    pub default_locale: Option<String>,

    /// Report what would change without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Keep a timestamped backup of every rewritten file
    #[arg(long)]
    pub backup: bool,

    /// Print run summaries as JSON instead of per-file lines
    #[arg(long)]
    pub json: bool,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Fold command-line overrides into the loaded configuration
    pub fn apply_to(&self, config: &mut PatcherConfig) {
        if let Some(dir) = &self.dir {
            config.directory = Some(dir.clone());
        }
        if let Some(locale) = &self.default_locale {
            config.default_locale = locale.clone();
        }
        config.dry_run |= self.dry_run;
        config.backup |= self.backup;
    }

    pub fn log_filter(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_patches_and_overrides() {
        let args = Args::try_parse_from([
            "locale-patcher",
            "--dir",
            "eater/Localization",
            "--default-locale",
            "de",
            "--dry-run",
            "patches/feedback_nav.yaml",
            "patches/units.yaml",
        ])
        .unwrap();

        assert_eq!(args.patches.len(), 2);
        let mut config = PatcherConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.directory, Some(PathBuf::from("eater/Localization")));
        assert_eq!(config.default_locale, "de");
        assert!(config.dry_run);
        assert!(!config.backup);
    }

    #[test]
    fn requires_at_least_one_patch() {
        assert!(Args::try_parse_from(["locale-patcher", "--dir", "x"]).is_err());
    }

    #[test]
    fn verbose_wins_over_log_level() {
        let args =
            Args::try_parse_from(["locale-patcher", "-v", "--log-level", "warn", "p.yaml"])
                .unwrap();
        assert_eq!(args.log_filter(), "debug");
    }

    #[test]
    fn flags_do_not_clear_config_values() {
        let args = Args::try_parse_from(["locale-patcher", "p.yaml"]).unwrap();
        let mut config = PatcherConfig {
            backup: true,
            directory: Some(PathBuf::from("Localization")),
            ..PatcherConfig::default()
        };
        args.apply_to(&mut config);
        assert!(config.backup);
        assert_eq!(config.directory, Some(PathBuf::from("Localization")));
    }
}
