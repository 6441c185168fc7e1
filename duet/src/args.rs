use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use duet_source::InputKind;

/// Duet article-to-conversation generator
#[derive(Debug, Parser)]
#[command(name = "duet", about = "Turn an encyclopedia article into a two-voice audio conversation")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "duet.toml", env = "DUET_CONFIG", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a conversation from an article title or URL
    Generate {
        /// Article title or Wikipedia article URL
        input: String,

        /// How to read the input; detected from its shape when omitted
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Print the stored metadata of a run
    Show {
        /// Run identifier, as printed by `generate`
        run_id: String,
    },

    /// Check a JSON file of draft lines against the script rules
    Validate {
        /// JSON array of `{index, speaker, section, text}` objects
        file: PathBuf,

        /// Treat an out-of-range duration estimate as a violation
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Title,
    Url,
}

impl From<KindArg> for InputKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Title => Self::Title,
            KindArg::Url => Self::Url,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn generate_accepts_kind_override() {
        let args = Args::try_parse_from(["duet", "generate", "Photosynthesis", "--kind", "title"]).unwrap();

        let Command::Generate { input, kind } = args.command else {
            panic!("expected generate");
        };
        assert_eq!(input, "Photosynthesis");
        assert_eq!(kind.map(InputKind::from), Some(InputKind::Title));
    }

    #[test]
    fn config_flag_is_global() {
        let args = Args::try_parse_from(["duet", "show", "run-1", "--config", "/etc/duet.toml"]).unwrap();
        assert_eq!(args.config, PathBuf::from("/etc/duet.toml"));
    }
}
