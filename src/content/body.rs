use std::collections::HashMap;
use std::io;
use std::io::ErrorKind;

use lazy_static::lazy_static;
use markdown::mdast::Node;
use markdown::ParseOptions;
use regex::Regex;
use serde::Serialize;

const MORE_TAG: &str = "<!-- more -->";

lazy_static! {
    static ref IMG_TAG_REGEX: Regex = Regex::new(r#"<img[^>]*\ssrc\s*=\s*["']([^"']*)["'][^>]*>"#).unwrap();
    static ref ASSET_IMG_REGEX: Regex = Regex::new(r"\{%\s*asset_img\s+(\S+)[^%]*%\}").unwrap();
}

/// Top-level Markdown blocks in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    /// Display only, never executed
    Code { lang: Option<String>, code: String },
    Image { src: String, alt: String },
    List { ordered: bool, items: usize },
    Quote(String),
    Html(String),
    ThematicBreak,
    Table { rows: usize },
    Other,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageKind {
    /// `![alt](src)`
    Markdown,
    /// `![alt][id]` with a `[id]: src` definition
    Reference,
    /// `<img src="...">`
    Html,
    /// `{% asset_img name %}`, relative to the post asset folder
    AssetTag,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    pub src: String,
    pub kind: ImageKind,
    /// 1-based line in the post file
    pub line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Body {
    raw: String,
    line_offset: usize,
    blocks: Vec<Block>,
    images: Vec<ImageRef>,
}

impl Body {
    /// `line_offset` is the file line the body starts on.
    pub fn parse(raw: &str, line_offset: usize) -> io::Result<Body> {
        let root = markdown::to_mdast(raw, &ParseOptions::gfm())
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("Error parsing markdown: {}", e)))?;

        let mut body = Body {
            raw: raw.to_string(),
            line_offset: line_offset.max(1),
            blocks: vec![],
            images: vec![],
        };

        if let Some(children) = root.children() {
            body.blocks = children.iter().filter_map(to_block).collect();
        }

        let mut definitions = HashMap::new();
        collect_definitions(&root, &mut definitions);
        body.collect_images(&root, &definitions);
        body.images.sort_by_key(|i| i.line);

        Ok(body)
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn line_offset(&self) -> usize {
        self.line_offset
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn headings(&self) -> impl Iterator<Item=(u8, &str)> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading { level, text } => Some((*level, text.as_str())),
            _ => None,
        })
    }

    /// Text before the `<!-- more -->` marker, if the post has one.
    pub fn excerpt(&self) -> Option<&str> {
        self.raw.find(MORE_TAG).map(|pos| &self.raw[..pos])
    }

    /// True when nothing but whitespace and HTML comments is left.
    pub fn is_empty(&self) -> bool {
        match remove_comments(&self.raw) {
            Ok(text) => text.trim().is_empty(),
            Err(_) => false,
        }
    }

    fn file_line(&self, node: &Node) -> usize {
        let body_line = node.position().map_or(1, |p| p.start.line);
        self.line_offset + body_line - 1
    }

    fn collect_images(&mut self, node: &Node, definitions: &HashMap<String, String>) {
        match node {
            Node::Image(image) => {
                let line = self.file_line(node);
                self.push_image(&image.url, ImageKind::Markdown, line);
            }
            Node::ImageReference(reference) => {
                if let Some(url) = definitions.get(&reference.identifier) {
                    let line = self.file_line(node);
                    self.push_image(url, ImageKind::Reference, line);
                }
            }
            Node::Html(html) => {
                let line = self.file_line(node);
                self.scan_text(&html.value, line, &IMG_TAG_REGEX, ImageKind::Html);
            }
            Node::Text(text) => {
                let line = self.file_line(node);
                self.scan_text(&text.value, line, &ASSET_IMG_REGEX, ImageKind::AssetTag);
            }
            _ => {}
        }

        if let Some(children) = node.children() {
            for child in children {
                self.collect_images(child, definitions);
            }
        }
    }

    fn scan_text(&mut self, text: &str, first_line: usize, regex: &Regex, kind: ImageKind) {
        for caps in regex.captures_iter(text) {
            if let (Some(all), Some(src)) = (caps.get(0), caps.get(1)) {
                let line = first_line + text[..all.start()].matches('\n').count();
                self.push_image(src.as_str(), kind, line);
            }
        }
    }

    fn push_image(&mut self, src: &str, kind: ImageKind, line: usize) {
        self.images.push(ImageRef { src: src.to_string(), kind, line });
    }
}

fn collect_definitions(node: &Node, definitions: &mut HashMap<String, String>) {
    if let Node::Definition(def) = node {
        definitions.entry(def.identifier.clone()).or_insert_with(|| def.url.clone());
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_definitions(child, definitions);
        }
    }
}

fn to_block(node: &Node) -> Option<Block> {
    let block = match node {
        Node::Heading(heading) => Block::Heading { level: heading.depth, text: node.to_string() },
        Node::Paragraph(paragraph) => {
            let mut visible = paragraph.children.iter()
                .filter(|c| !matches!(c, Node::Text(t) if t.value.trim().is_empty()));
            match (visible.next(), visible.next()) {
                (Some(Node::Image(image)), None) => Block::Image { src: image.url.clone(), alt: image.alt.clone() },
                _ => Block::Paragraph(node.to_string()),
            }
        }
        Node::Code(code) => Block::Code { lang: code.lang.clone(), code: code.value.clone() },
        Node::List(list) => Block::List { ordered: list.ordered, items: list.children.len() },
        Node::Blockquote(_) => Block::Quote(node.to_string()),
        Node::Html(html) => Block::Html(html.value.clone()),
        Node::ThematicBreak(_) => Block::ThematicBreak,
        Node::Table(table) => Block::Table { rows: table.children.len() },
        Node::Definition(_) => return None,
        _ => Block::Other,
    };
    Some(block)
}

fn remove_comments(md_post: &str) -> io::Result<String> {
    let mut res: String = String::new();
    let mut slice = Some(md_post);

    let start_comment = "<!--";
    let end_comment = "-->";

    while let Some(block) = slice {
        let md_buf: &str = match block.find(start_comment) {
            Some(start) => {
                let to_render: &str = &block[0..start];

                let next: &str = &block[(start + start_comment.len())..];
                match next.find(end_comment) {
                    Some(end) => {
                        slice = Some(&next[(end + end_comment.len())..]);
                    }
                    None => {
                        return Err(io::Error::new(
                            ErrorKind::InvalidData,
                            "Error finding end of comment",
                        ));
                    }
                };

                to_render
            }
            None => {
                slice = None;
                block
            }
        };
        res.push_str(md_buf);
    }

    Ok(res)
}

#[cfg(test)]
mod tests {
    use crate::test_data::POST_DATA;

    use super::*;

    fn body_of_post_data() -> Body {
        // Front matter of POST_DATA spans the first 11 lines
        let raw = POST_DATA.splitn(3, "---\n").nth(2).unwrap();
        Body::parse(raw, 12).unwrap()
    }

    #[test]
    fn test_blocks() {
        let body = body_of_post_data();
        let blocks = body.blocks();

        assert!(matches!(&blocks[0], Block::Paragraph(p) if p.starts_with("Goroutines are cheap")));
        assert_eq!(blocks[1], Block::Html("<!-- more -->".to_string()));
        assert_eq!(blocks[2], Block::Heading { level: 2, text: "The three letters".to_string() });
        assert_eq!(blocks[3], Block::Image { src: "gmp.png".to_string(), alt: "G, M and P".to_string() });
        assert!(matches!(&blocks[4], Block::Code { lang: Some(lang), code } if lang == "go" && code.contains("go func()")));

        let headings: Vec<(u8, &str)> = body.headings().collect();
        assert_eq!(headings, [(2, "The three letters"), (2, "Work stealing")]);
    }

    #[test]
    fn test_images_with_file_lines() {
        let body = body_of_post_data();
        assert_eq!(body.images(), [
            ImageRef { src: "gmp.png".to_string(), kind: ImageKind::Markdown, line: 18 },
            ImageRef { src: "/images/steal.png".to_string(), kind: ImageKind::Html, line: 28 },
            ImageRef { src: "runqueue.png".to_string(), kind: ImageKind::AssetTag, line: 30 },
        ]);
    }

    #[test]
    fn test_reference_images() {
        let raw = "Intro\n\n![diagram][sched]\n\n[sched]: ./img/sched.svg\n";
        let body = Body::parse(raw, 5).unwrap();
        assert_eq!(body.images(), [
            ImageRef { src: "./img/sched.svg".to_string(), kind: ImageKind::Reference, line: 7 },
        ]);
        assert!(!body.blocks().iter().any(|b| matches!(b, Block::Other)));
    }

    #[test]
    fn test_images_in_code_are_ignored() {
        let raw = "```markdown\n![not an image](nope.png)\n<img src=\"nope.png\">\n```\n";
        let body = Body::parse(raw, 1).unwrap();
        assert!(body.images().is_empty());
    }

    #[test]
    fn test_excerpt() {
        let body = Body::parse("First part\n<!-- more -->\nRest\n", 1).unwrap();
        assert_eq!(body.excerpt(), Some("First part\n"));

        let body = Body::parse("No marker\n", 1).unwrap();
        assert_eq!(body.excerpt(), None);
    }

    #[test]
    fn test_is_empty() {
        assert!(Body::parse("", 1).unwrap().is_empty());
        assert!(Body::parse("\n  <!-- draft -->\n\n", 1).unwrap().is_empty());
        assert!(!Body::parse("<!-- more -->text", 1).unwrap().is_empty());
    }

    #[test]
    fn test_parse_removes_comment() {
        let content = r#"Some text.<!-- more -->Wo<!-- xyz -->rd"#;
        assert_eq!(remove_comments(content).unwrap(), "Some text.Word");

        let content = r#"Some text.Word"#;
        assert_eq!(remove_comments(content).unwrap(), "Some text.Word");

        assert_eq!(remove_comments("").unwrap(), "");
        assert_eq!(remove_comments("<!-- more --><!-- xyz -->").unwrap(), "");
        assert!(remove_comments("text <!-- open").is_err());
    }
}
