use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SAML2 Service Provider settings checker
#[derive(Parser, Debug)]
#[command(
    name = "samlcheck",
    version,
    about = "Validate SAML2 Service Provider settings and SP metadata",
    long_about = "Checks a SAML2 settings file for missing or contradictory Service \
                  Provider and Identity Provider configuration, validates SAML 2.0 \
                  metadata documents, and renders SP metadata from settings. Reports \
                  every problem with a stable error code and a suggestion.",
    after_help = "\
EXAMPLES:
  samlcheck settings saml.toml              Check SP and IdP settings
  samlcheck settings --sp-only saml.toml    Check the SP side only
  samlcheck metadata sp-metadata.xml        Validate a metadata document
  samlcheck sp-metadata saml.toml > sp.xml  Render SP metadata
  samlcheck --json settings saml.toml       Output results as JSON

EXIT CODES:
  0  No errors found
  1  One or more errors found
  2  Tool failure (e.g., file not found, malformed XML)

LOGGING:
  Set RUST_LOG (e.g. RUST_LOG=samlcheck=debug) to trace validation on stderr."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show all checks including passed ones
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output results as JSON (for scripting and CI)
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a settings file
    Settings {
        /// TOML settings file
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Skip the Identity Provider checks
        #[arg(long)]
        sp_only: bool,
    },

    /// Validate a SAML 2.0 metadata document
    Metadata {
        /// Metadata XML file
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Render SP metadata from a settings file
    #[command(name = "sp-metadata")]
    SpMetadata {
        /// TOML settings file
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

impl Command {
    pub fn path(&self) -> &PathBuf {
        match self {
            Command::Settings { path, .. }
            | Command::Metadata { path }
            | Command::SpMetadata { path } => path,
        }
    }
}
