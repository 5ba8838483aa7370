use std::fmt::Write;
use std::process::ExitCode;

use anyhow::Result;
use spdlog::warn;

use postlint::catalog::Catalog;
use postlint::config::Config;
use postlint::content::Post;
use postlint::text_utils::format_date_time;

use crate::check::load_catalog;
use crate::ListArgs;

fn select_posts<'a>(catalog: &'a Catalog, tag: Option<&str>, category: Option<&str>) -> Vec<&'a Post> {
    let mut posts = match tag {
        Some(tag) => catalog.find_by_tag(tag),
        None => catalog.sorted(),
    };
    if let Some(category) = category {
        let in_category = catalog.find_by_category(category);
        posts.retain(|p| in_category.iter().any(|c| std::ptr::eq(*c, *p)));
    }
    posts
}

fn render_post_line(catalog: &Catalog, post: &Post) -> String {
    let date = post.date()
        .map(|d| format_date_time(d).0)
        .unwrap_or_else(|| "----------".to_string());
    let pin = if post.is_pinned() { '*' } else { ' ' };
    let title = post.title().unwrap_or("(untitled)");
    let link = catalog.link_of(post.source()).unwrap_or_default();

    let mut line = format!("{} {} {} ({})", date, pin, title, link);
    if !post.tags().is_empty() {
        let _ = write!(&mut line, " [{}]", post.tags().join(", "));
    }
    line
}

fn render_listing(catalog: &Catalog, posts: &[&Post]) -> String {
    let mut buf = String::new();
    for post in posts {
        let _ = writeln!(&mut buf, "{}", render_post_line(catalog, post));
    }

    let tags = catalog.tag_counts();
    if !tags.is_empty() {
        let _ = writeln!(&mut buf);
        let counts: Vec<String> = tags.iter().map(|(tag, n)| format!("{} ({})", tag, n)).collect();
        let _ = writeln!(&mut buf, "tags: {}", counts.join(", "));
    }
    buf
}

pub(crate) fn list_cmd(mut config: Config, args: ListArgs) -> Result<ExitCode> {
    if let Some(dir) = args.dir {
        config.paths.posts_dir = dir;
    }

    let catalog = load_catalog(&config)?;
    for failure in catalog.failures() {
        warn!("Skipping {}: {}", failure.path.display(), failure.error);
    }

    let posts = select_posts(&catalog, args.tag.as_deref(), args.category.as_deref());

    print!("{}", render_listing(&catalog, &posts));
    Ok(ExitCode::SUCCESS)
}
