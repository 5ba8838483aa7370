use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use spdlog::info;

use postlint::catalog::Catalog;
use postlint::config::Config;
use postlint::lint::Linter;
use postlint::post_list::PostList;
use postlint::report::{render_json, render_text};

use crate::{CheckArgs, ReportFormat};

pub(crate) fn load_catalog(config: &Config) -> Result<Catalog> {
    let post_list = PostList {
        root_dir: config.paths.posts_dir.clone(),
        post_file: config.defaults.post_file.clone(),
        extensions: config.defaults.extensions.clone(),
    };
    let paths = post_list.retrieve_posts()?;
    info!("Checking {} posts under {}", paths.len(), config.paths.posts_dir.display());

    Ok(Catalog::load(&paths, &config.defaults.post_file))
}

pub(crate) fn check_cmd(mut config: Config, args: CheckArgs) -> Result<ExitCode> {
    if let Some(dir) = args.dir {
        config.paths.posts_dir = dir;
    }

    let linter = Linter::new(&config).context("Invalid [rules] in configuration")?;
    let catalog = load_catalog(&config)?;
    let report = linter.check_catalog(&catalog);
    info!("{} errors, {} warnings", report.errors, report.warnings);

    match args.format {
        ReportFormat::Text => {
            let cur_dir = env::current_dir().ok();
            print!("{}", render_text(&report, cur_dir.as_deref()));
        }
        ReportFormat::Json => println!("{}", render_json(&report)?),
    }

    let failed = report.has_errors() || (args.deny_warnings && report.has_warnings());
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
