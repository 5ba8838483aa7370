use std::collections::HashSet;

use crate::content::body::ImageKind;
use crate::content::{FieldIssueKind, Post};
use crate::lint::assets::{AssetResolver, Resolution};
use crate::lint::{Hit, Rule};

pub(crate) fn check_post(post: &Post, assets: &AssetResolver) -> Vec<Hit> {
    let mut hits = vec![];
    check_required(post, &mut hits);
    check_field_issues(post, &mut hits);
    check_labels(post, "tags", "tag", Rule::EmptyTag, Rule::DuplicateTag, &mut hits);
    check_labels(post, "categories", "category", Rule::EmptyCategory, Rule::DuplicateCategory, &mut hits);
    check_images(post, assets, &mut hits);
    check_body(post, &mut hits);
    check_unknown_fields(post, &mut hits);
    hits
}

fn has_issue(post: &Post, field: &str) -> bool {
    post.front_matter().issues().iter().any(|i| i.field == field)
}

fn check_required(post: &Post, hits: &mut Vec<Hit>) {
    let fm = post.front_matter();

    match fm.title() {
        Some(title) if title.trim().is_empty() => {
            hits.push(Hit::new(Rule::MissingTitle, fm.line_of("title"), "title is empty".to_string()));
        }
        None if !has_issue(post, "title") => {
            hits.push(Hit::new(Rule::MissingTitle, fm.line_of("title"), "title is missing".to_string()));
        }
        _ => {}
    }

    if fm.date().is_none() && !has_issue(post, "date") {
        hits.push(Hit::new(Rule::MissingDate, fm.line_of("date"), "date is missing".to_string()));
    }
}

fn check_field_issues(post: &Post, hits: &mut Vec<Hit>) {
    for issue in post.front_matter().issues() {
        let rule = match issue.kind {
            FieldIssueKind::InvalidDate => Rule::InvalidDate,
            FieldIssueKind::WrongType | FieldIssueKind::Repeated => Rule::InvalidField,
        };
        hits.push(Hit::new(rule, Some(issue.line), format!("{}: {}", issue.field, issue.message)));
    }
}

fn check_labels(post: &Post, field: &str, label: &str, empty_rule: Rule, duplicate_rule: Rule, hits: &mut Vec<Hit>) {
    let fm = post.front_matter();
    let values = match field {
        "tags" => fm.tags(),
        _ => fm.categories(),
    };
    let line = fm.line_of(field);

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for (idx, value) in values.iter().enumerate() {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() {
            hits.push(Hit::new(empty_rule, line, format!("{} #{} is empty", label, idx + 1)));
            continue;
        }
        if !seen.insert(normalized.clone()) && reported.insert(normalized) {
            hits.push(Hit::new(duplicate_rule, line, format!("{} '{}' is listed more than once", label, value.trim())));
        }
    }
}

fn check_images(post: &Post, assets: &AssetResolver, hits: &mut Vec<Hit>) {
    let fm = post.front_matter();
    let source = post.source();

    if let Some(image) = fm.image() {
        let line = fm.line_of("image");
        if image.trim().is_empty() {
            hits.push(Hit::new(Rule::MissingImage, line, "cover image reference is empty".to_string()));
        } else if let Resolution::Missing(tried) = assets.resolve(source, image) {
            hits.push(Hit::new(Rule::MissingImage, line, missing_message("cover image", image, &tried)));
        }
    }

    for image in post.body().images() {
        let resolution = match image.kind {
            ImageKind::AssetTag => assets.resolve_asset_tag(source, &image.src),
            _ => assets.resolve(source, &image.src),
        };
        if let Resolution::Missing(tried) = resolution {
            hits.push(Hit::new(Rule::MissingImage, Some(image.line), missing_message("image", &image.src, &tried)));
        }
    }
}

fn missing_message(what: &str, src: &str, tried: &[std::path::PathBuf]) -> String {
    if tried.is_empty() {
        return format!("{} reference '{}' is empty", what, src);
    }
    let tried: Vec<String> = tried.iter().map(|p| p.display().to_string()).collect();
    format!("{} '{}' not found (looked in {})", what, src, tried.join(", "))
}

fn check_body(post: &Post, hits: &mut Vec<Hit>) {
    let fm = post.front_matter();
    let body = post.body();

    if post.wants_toc() && body.headings().next().is_none() {
        hits.push(Hit::new(Rule::TocWithoutHeadings, fm.line_of("toc"),
                           "toc is enabled but the body has no headings".to_string()));
    }

    if let (Some(date), Some(updated)) = (fm.date(), fm.updated()) {
        if updated < date {
            hits.push(Hit::new(Rule::UpdatedBeforeDate, fm.line_of("updated"),
                               format!("updated ({}) is earlier than date ({})", updated, date)));
        }
    }

    if body.is_empty() {
        hits.push(Hit::new(Rule::EmptyBody, Some(body.line_offset()), "post has no content".to_string()));
    }
}

fn check_unknown_fields(post: &Post, hits: &mut Vec<Hit>) {
    let fm = post.front_matter();
    for key in fm.extra().keys() {
        hits.push(Hit::new(Rule::UnknownField, fm.line_of(key), format!("unknown field '{}'", key)));
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, File};
    use std::path::{Path, PathBuf};

    use crate::test_data::POST_DATA;

    use super::*;

    fn rules_of(hits: &[Hit]) -> Vec<(Rule, Option<usize>)> {
        hits.iter().map(|h| (h.rule, h.line)).collect()
    }

    fn check_str(content: &str) -> Vec<Hit> {
        let post = Post::from_string(Path::new("posts/a.md"), content).unwrap();
        check_post(&post, &AssetResolver::new(PathBuf::from("posts")))
    }

    #[test]
    fn test_clean_post_with_assets() {
        let root = tempfile::tempdir().unwrap();
        let source = root.path().join("source");
        let post_path = source.join("_posts/goroutine-scheduler.md");
        for file in ["images/gmp.png", "images/steal.png", "_posts/goroutine-scheduler/gmp.png",
            "_posts/goroutine-scheduler/runqueue.png"] {
            let path = source.join(file);
            create_dir_all(path.parent().unwrap()).unwrap();
            File::create(path).unwrap();
        }

        let post = Post::from_string(&post_path, POST_DATA).unwrap();
        let hits = check_post(&post, &AssetResolver::new(source));
        assert!(hits.is_empty(), "{:?}", hits);
    }

    #[test]
    fn test_missing_assets() {
        let hits = check_str(POST_DATA);
        assert_eq!(rules_of(&hits), [
            (Rule::MissingImage, Some(8)),
            (Rule::MissingImage, Some(18)),
            (Rule::MissingImage, Some(28)),
            (Rule::MissingImage, Some(30)),
        ]);
        assert!(hits[0].message.contains("cover image '/images/gmp.png' not found"), "{}", hits[0].message);
    }

    #[test]
    fn test_cover_image_mapping() {
        let header = "---\ntitle: t\ndate: 2021-01-01\nimage:\n  path: /assets/img/nope.png\n  alt: cover\n---\nText\n";
        let hits = check_str(header);
        assert_eq!(rules_of(&hits), [(Rule::MissingImage, Some(4))]);
        assert!(hits[0].message.contains("'/assets/img/nope.png' not found"), "{}", hits[0].message);

        let root = tempfile::tempdir().unwrap();
        let source = root.path().to_path_buf();
        let cover = source.join("assets/img/nope.png");
        create_dir_all(cover.parent().unwrap()).unwrap();
        File::create(&cover).unwrap();
        let post = Post::from_string(&source.join("_posts/a.md"), header).unwrap();
        assert!(check_post(&post, &AssetResolver::new(source)).is_empty());

        let hits = check_str("---\ntitle: t\ndate: 2021-01-01\nimage:\n  alt: cover\n---\nText\n");
        assert_eq!(rules_of(&hits), [(Rule::InvalidField, Some(4))]);
        assert!(hits[0].message.starts_with("image: "), "{}", hits[0].message);
    }

    #[test]
    fn test_required_fields() {
        let hits = check_str("---\ntoc: false\n---\nText\n");
        assert_eq!(rules_of(&hits), [(Rule::MissingTitle, None), (Rule::MissingDate, None)]);

        let hits = check_str("---\ntitle: '  '\ndate:\n---\nText\n");
        assert_eq!(rules_of(&hits), [(Rule::MissingTitle, Some(2)), (Rule::MissingDate, Some(3))]);

        let hits = check_str("No header at all\n");
        assert_eq!(rules_of(&hits), [(Rule::MissingTitle, None), (Rule::MissingDate, None)]);
    }

    #[test]
    fn test_invalid_fields() {
        let hits = check_str("---\ntitle: [a, b]\ndate: 2021-02-30\npin: sometimes\n---\nText\n");
        assert_eq!(rules_of(&hits), [
            (Rule::InvalidField, Some(2)),
            (Rule::InvalidDate, Some(3)),
            (Rule::InvalidField, Some(4)),
        ]);
        assert!(hits[2].message.starts_with("pin: "), "{}", hits[2].message);
    }

    #[test]
    fn test_labels() {
        let hits = check_str("---\ntitle: t\ndate: 2021-01-01\ntags: [Go, go, '', GO, rust]\ncategories:\n  - A\n  -\n  - A\n---\nText\n");
        assert_eq!(rules_of(&hits), [
            (Rule::DuplicateTag, Some(4)),
            (Rule::EmptyTag, Some(4)),
            (Rule::EmptyCategory, Some(5)),
            (Rule::DuplicateCategory, Some(5)),
        ]);
        assert_eq!(hits[0].message, "tag 'go' is listed more than once");
        assert_eq!(hits[1].message, "tag #3 is empty");
    }

    #[test]
    fn test_body_checks() {
        let hits = check_str("---\ntitle: t\ndate: 2021-01-02\nupdated: 2021-01-01\ntoc: true\n---\n<!-- nothing yet -->\n");
        assert_eq!(rules_of(&hits), [
            (Rule::TocWithoutHeadings, Some(5)),
            (Rule::UpdatedBeforeDate, Some(4)),
            (Rule::EmptyBody, Some(7)),
        ]);
    }

    #[test]
    fn test_unknown_fields() {
        let hits = check_str("---\ntitle: t\ndate: 2021-01-01\nlayout: post\n---\nText\n");
        assert_eq!(rules_of(&hits), [(Rule::UnknownField, Some(4))]);
    }
}
