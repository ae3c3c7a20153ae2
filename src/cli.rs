use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for the sysedit text tool.
#[derive(Parser, Debug)]
#[command(
    name = "sysedit",
    about = "Rule-driven text editing for configuration files",
    version
)]
pub struct Cli {
    #[allow(missing_docs)]
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[allow(missing_docs)]
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without writing files
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Settings file (default: $XDG_CONFIG_HOME/sysedit/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Rename written files to this extension first (%date%, %datetime%, %seconds%)
    #[arg(long, global = true)]
    pub backup: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a rule string on a file
    Rules(RulesOpts),
    /// Replace a regular expression in every line of a file
    Replace(ReplaceOpts),
    /// Replace the line matching a key, or insert it
    Upsert(UpsertOpts),
    /// Replace the text between two delimiters of a document
    ReplaceRange(ReplaceRangeOpts),
    /// Set variables in config files as described by a JSON form
    AdaptVariables(AdaptVariablesOpts),
    /// Print an example form for adapt-variables
    ExampleAdaptVariables(ExampleOpts),
    /// Print the rule language reference
    DescribeRules,
    /// Generate shell completions
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name, used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rules(_) => "rules",
            Self::Replace(_) => "replace",
            Self::Upsert(_) => "upsert",
            Self::ReplaceRange(_) => "replace-range",
            Self::AdaptVariables(_) => "adapt-variables",
            Self::ExampleAdaptVariables(_) => "example-adapt-variables",
            Self::DescribeRules => "describe-rules",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `rules` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RulesOpts {
    /// File to edit
    pub file: PathBuf,

    /// Rule string, e.g. 'bof >/^#/ insert:"# managed"'
    pub rules: String,

    /// Loop guard factor (default from settings)
    #[arg(long)]
    pub max_loops: Option<usize>,

    /// Print cursor, markers and registers after the run
    #[arg(long)]
    pub show_state: bool,
}

/// Options for the `replace` subcommand.
#[derive(Parser, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReplaceOpts {
    /// File to edit
    pub file: PathBuf,

    /// Regular expression (plain text with --literal)
    pub pattern: String,

    /// Replacement; `\1` or `$1` refer to groups
    pub replacement: String,

    /// Treat the pattern as plain text
    #[arg(short, long)]
    pub literal: bool,

    /// Match whole words only
    #[arg(short, long)]
    pub word: bool,

    /// Ignore case
    #[arg(short, long)]
    pub ignore_case: bool,

    /// Count replacements instead of changed lines
    #[arg(long)]
    pub count_hits: bool,

    /// Character standing for `\` in the replacement
    #[arg(long)]
    pub group_marker: Option<char>,

    /// Decode `\n`, `\t`, `\xHH` and friends in the replacement
    #[arg(short, long)]
    pub unescape: bool,
}

/// Options for the `upsert` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct UpsertOpts {
    /// File to edit
    pub file: PathBuf,

    /// Regular expression identifying the line
    pub key: String,

    /// The wanted line
    pub line: String,

    /// Insert below the first line matching this (default: at the end)
    #[arg(short, long)]
    pub anchor: Option<String>,

    /// Insert above the anchor instead of below
    #[arg(long)]
    pub above: bool,
}

/// Options for the `replace-range` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ReplaceRangeOpts {
    /// Document to change
    pub document: PathBuf,

    /// Replacement text (exclusive with --file)
    #[arg(short, long)]
    pub replacement: Option<String>,

    /// File holding the replacement (exclusive with --replacement)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Regular expression starting the range
    #[arg(short, long, default_value = crate::text::DEFAULT_DELIMITER)]
    pub start: String,

    /// Regular expression ending the range
    #[arg(short, long, default_value = crate::text::DEFAULT_DELIMITER)]
    pub end: String,

    /// The range is searched behind the first line matching this
    #[arg(short, long)]
    pub anchor: Option<String>,

    /// Minimum replacement length (default from settings)
    #[arg(short, long)]
    pub min_length: Option<usize>,

    /// Append a newline to --replacement
    #[arg(short, long)]
    pub newline: bool,

    /// Line to insert when the start is not found
    #[arg(long)]
    pub insertion: Option<String>,

    /// The insertion goes behind the first line matching this
    #[arg(long, requires = "insertion")]
    pub insertion_position: Option<String>,
}

/// Options for the `adapt-variables` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct AdaptVariablesOpts {
    /// JSON form with "Variables", "Comment" and "Files"
    pub form: PathBuf,
}

/// Options for the `example-adapt-variables` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ExampleOpts {
    /// Write the example to this file instead of stdout
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Options for the `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Target shell
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_rules_with_globals() {
        let cli = Cli::parse_from([
            "sysedit", "-d", "--backup", "bak", "rules", "/etc/hosts", "bof", "--max-loops", "3",
        ]);
        assert!(cli.global.dry_run);
        assert_eq!(cli.global.backup.as_deref(), Some("bak"));
        assert!(
            matches!(&cli.command, Command::Rules(_)),
            "Expected Rules command"
        );
        if let Command::Rules(opts) = cli.command {
            assert_eq!(opts.file, PathBuf::from("/etc/hosts"));
            assert_eq!(opts.rules, "bof");
            assert_eq!(opts.max_loops, Some(3));
            assert!(!opts.show_state);
        }
    }

    #[test]
    fn parse_replace_flags() {
        let cli = Cli::parse_from([
            "sysedit", "replace", "f.txt", "a.b", "x", "-l", "-w", "-i", "--group-marker", "%",
        ]);
        assert!(
            matches!(&cli.command, Command::Replace(_)),
            "Expected Replace command"
        );
        if let Command::Replace(opts) = cli.command {
            assert!(opts.literal && opts.word && opts.ignore_case);
            assert_eq!(opts.group_marker, Some('%'));
            assert!(!opts.count_hits);
        }
    }

    #[test]
    fn replace_range_defaults_to_fences() {
        let cli = Cli::parse_from(["sysedit", "replace-range", "README.md", "-r", "text"]);
        assert!(
            matches!(&cli.command, Command::ReplaceRange(_)),
            "Expected ReplaceRange command"
        );
        if let Command::ReplaceRange(opts) = cli.command {
            assert_eq!(opts.start, "```");
            assert_eq!(opts.end, "```");
            assert_eq!(opts.min_length, None);
            assert_eq!(opts.replacement.as_deref(), Some("text"));
        }
    }

    #[test]
    fn insertion_position_requires_insertion() {
        let result = Cli::try_parse_from([
            "sysedit",
            "replace-range",
            "doc",
            "-r",
            "abc",
            "--insertion-position",
            "^x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn command_names_match_subcommands() {
        let cli = Cli::parse_from(["sysedit", "example-adapt-variables"]);
        assert_eq!(cli.command.name(), "example-adapt-variables");
        let cli = Cli::parse_from(["sysedit", "describe-rules"]);
        assert_eq!(cli.command.name(), "describe-rules");
        let cli = Cli::parse_from(["sysedit", "-v", "version"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_completions_shell() {
        let cli = Cli::parse_from(["sysedit", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Command::Completions(CompletionsOpts {
                shell: clap_complete::Shell::Bash
            })
        ));
    }
}
