use std::fmt::Write;
use std::fs::{create_dir, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use spdlog::info;

use postlint::config::Config;

use crate::{HeaderFormat, NewArgs, PostOutput};

struct NewPost<'a> {
    title: &'a str,
    date: &'a str,
    author: &'a str,
    tags: &'a [String],
    categories: &'a [String],
}

fn get_author(args: &NewArgs) -> String {
    if let Some(ref name) = args.author {
        return name.clone();
    }

    let name = whoami::realname();
    if name.is_empty() {
        return whoami::username();
    }
    name
}

fn yaml_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn toml_quote(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

fn render_list(items: &[String], quote: fn(&str) -> String) -> String {
    let items: Vec<String> = items.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(quote)
        .collect();
    format!("[{}]", items.join(", "))
}

fn render_header(post: &NewPost, format: HeaderFormat) -> String {
    let mut buf = String::new();

    match format {
        HeaderFormat::Yaml => {
            let _ = writeln!(&mut buf, "---");
            let _ = writeln!(&mut buf, "title: {}", yaml_quote(post.title));
            let _ = writeln!(&mut buf, "date: {}", post.date);
            let _ = writeln!(&mut buf, "author: {}", yaml_quote(post.author));
            let _ = writeln!(&mut buf, "categories: {}", render_list(post.categories, yaml_quote));
            let _ = writeln!(&mut buf, "tags: {}", render_list(post.tags, yaml_quote));
            let _ = writeln!(&mut buf, "toc: false");
            let _ = writeln!(&mut buf, "---");
        }
        HeaderFormat::Toml => {
            let _ = writeln!(&mut buf, "+++");
            let _ = writeln!(&mut buf, "title = {}", toml_quote(post.title));
            let _ = writeln!(&mut buf, "date = {}", toml_quote(post.date));
            let _ = writeln!(&mut buf, "author = {}", toml_quote(post.author));
            let _ = writeln!(&mut buf, "categories = {}", render_list(post.categories, toml_quote));
            let _ = writeln!(&mut buf, "tags = {}", render_list(post.tags, toml_quote));
            let _ = writeln!(&mut buf, "toc = false");
            let _ = writeln!(&mut buf, "+++");
        }
    }
    let _ = writeln!(&mut buf);
    buf
}

fn render_body() -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "This is a body example");
    let _ = writeln!(&mut buf, "Please remove it and replace with your content");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "<!-- more -->");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "And this is the rest of your post");

    buf
}

fn post_url_from_title(title: &str, date: &NaiveDate) -> String {
    let title = unidecode::unidecode(title);
    let alpha_chars: String = title.chars()
        .filter(|&c| c.is_ascii_alphanumeric() || c == ' ')
        .map(|c| if c == ' ' { '_' } else { c })
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut url = String::new();
    let mut prev_char = None;

    for c in alpha_chars.trim_matches('_').chars() {
        if c != '_' || prev_char != Some('_') {
            url.push(c);
        }
        prev_char = Some(c);
    }

    let date = date.format("%Y%m%d");

    format!("{}_{}", date, url)
}

fn write_new_file(path: &Path, content: &str) -> Result<()> {
    use std::io::Write;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub(crate) fn new_cmd(config: Config, args: NewArgs) -> Result<ExitCode> {
    let author = get_author(&args);
    let now = Local::now();
    let date = now.format("%Y-%m-%d %H:%M:%S").to_string();

    let post = NewPost {
        title: &args.title,
        date: &date,
        author: &author,
        tags: &args.tags,
        categories: &args.categories,
    };
    let content = format!("{}{}", render_header(&post, args.header), render_body());

    let out_dir: PathBuf = args.out_dir.clone().unwrap_or_else(|| config.paths.posts_dir.clone());
    let name = post_url_from_title(&args.title, &now.date_naive());

    match args.output {
        PostOutput::Stdout => {
            print!("{}", content);
        }
        PostOutput::File => {
            let file_name = out_dir.join(format!("{}.md", name));
            write_new_file(&file_name, &content)?;
            info!("Created {}", file_name.display());
            println!("Creating file {}", file_name.display());
        }
        PostOutput::Dir => {
            let dir_name = out_dir.join(&name);
            create_dir(&dir_name).with_context(|| format!("Error creating directory {}", dir_name.display()))?;
            let full_path = dir_name.join(&config.defaults.post_file);
            write_new_file(&full_path, &content)?;
            info!("Created {}", full_path.display());
            println!("Creating dir post {}", full_path.display());
        }
    };

    Ok(ExitCode::SUCCESS)
}
