use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use spdlog::warn;

use postlint::logger::configure_logger;

use crate::check::check_cmd;
use crate::config::{log_config_source, open_config};
use crate::list::list_cmd;
use crate::new::new_cmd;

mod check;
mod config;
mod list;
mod new;

const CFG_FILE_NAME: &str = "postlint.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path. Defaults to the first postlint.toml found
    #[arg(short, long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,

    /// Log debug messages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lint every post in a directory
    Check(CheckArgs),
    /// List posts, pinned first and newest first
    List(ListArgs),
    /// Create a new post with front matter
    New(NewArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Posts directory. Overrides paths.posts_dir
    dir: Option<PathBuf>,

    /// Report format
    #[arg(short, long, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Exit with failure on warnings too
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Posts directory. Overrides paths.posts_dir
    dir: Option<PathBuf>,

    /// Only posts with this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Only posts in this category
    #[arg(long)]
    category: Option<String>,
}

#[derive(Parser, Debug)]
struct NewArgs {
    /// Title of the post
    #[arg(short, long)]
    title: String,

    /// Name of the author. If empty, OS user real name is being used
    #[arg(short, long)]
    author: Option<String>,

    /// Comma separated tags
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,

    /// Comma separated categories
    #[arg(long, value_delimiter = ',')]
    categories: Vec<String>,

    /// Where the new post goes
    #[arg(short, long, default_value_t = PostOutput::Stdout)]
    output: PostOutput,

    /// Front matter syntax
    #[arg(long, default_value_t = HeaderFormat::Yaml)]
    header: HeaderFormat,

    /// Directory for file and dir outputs. Defaults to paths.posts_dir
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum PostOutput {
    /// Writes the new post content to the stdout
    Stdout,
    /// Writes the new post content to a file (posts without images)
    File,
    /// Writes the new post content to a directory (posts with images)
    Dir,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum HeaderFormat {
    Yaml,
    Toml,
}

fn value_name<T: ValueEnum>(value: &T) -> String {
    value.to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

impl Display for ReportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", value_name(self))
    }
}

impl Display for PostOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", value_name(self))
    }
}

impl Display for HeaderFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", value_name(self))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let (config, config_path) = match open_config(args.config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{:#}", err);
            eprintln!("Please run postlint --help");
            return ExitCode::from(2);
        }
    };

    if let Err(err) = configure_logger(&config, args.verbose) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }
    log_config_source(&config_path);

    let result = match args.command {
        Command::Check(check_args) => check_cmd(config, check_args),
        Command::List(list_args) => list_cmd(config, list_args),
        Command::New(new_args) => new_cmd(config, new_args),
    };

    spdlog::default_logger().flush();

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_flag() {
        let args = Args::try_parse_from(["postlint", "check", "--config", "blog/postlint.toml", "posts"]).unwrap();
        assert_eq!(args.config_path, Some(PathBuf::from("blog/postlint.toml")));
        let Command::Check(check) = args.command else {
            panic!("expected the check command");
        };
        assert_eq!(check.dir, Some(PathBuf::from("posts")));

        let args = Args::try_parse_from(["postlint", "-c", "p.toml", "list"]).unwrap();
        assert_eq!(args.config_path, Some(PathBuf::from("p.toml")));

        assert!(Args::try_parse_from(["postlint", "check", "--config-path", "p.toml"]).is_err());
    }
}
