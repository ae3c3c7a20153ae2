//! The `sysedit` binary.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use sysedit_cli::cli::{Cli, Command};
use sysedit_cli::commands::{self, CommandSetup};
use sysedit_cli::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    match &args.command {
        Command::DescribeRules => return commands::describe::run(),
        Command::ExampleAdaptVariables(opts) => return commands::example::run(opts),
        Command::Completions(opts) => {
            commands::completions(opts.shell);
            return Ok(());
        }
        Command::Version => return commands::version::run(),
        _ => {}
    }

    let name = args.command.name();
    init_subscriber(args.verbose, name);
    let log = Arc::new(Logger::new(name));
    let setup = CommandSetup::init(&args.global, log)?;

    match &args.command {
        Command::Rules(opts) => commands::rules::run(&setup, opts),
        Command::Replace(opts) => commands::replace::run(&setup, opts),
        Command::Upsert(opts) => commands::upsert::run(&setup, opts),
        Command::ReplaceRange(opts) => commands::replace_range::run(&setup, opts),
        Command::AdaptVariables(opts) => commands::adapt_variables::run(&setup, opts),
        Command::DescribeRules
        | Command::ExampleAdaptVariables(_)
        | Command::Completions(_)
        | Command::Version => Ok(()),
    }
}
