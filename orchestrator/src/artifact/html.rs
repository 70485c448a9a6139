use std::fmt::Write as _;

use crate::types::constant::STYLESHEET_FILE_NAME;
use crate::types::jobs::payload::{NavigationItem, Section, SiteContent};

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Links may only point at http(s), mail, phone, or within the site. Anything else becomes `#`.
fn safe_href(href: &str) -> &str {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    let allowed = ["https://", "http://", "mailto:", "tel:", "/", "#"].iter().any(|p| lower.starts_with(p));
    if allowed {
        href
    } else {
        "#"
    }
}

/// Class name fragment from a section type
fn css_ident(value: &str) -> String {
    value.chars().map(|c| if c.is_ascii_alphanumeric() || c == '-' { c.to_ascii_lowercase() } else { '-' }).collect()
}

fn render_navigation(out: &mut String, navigation: &[NavigationItem]) {
    if navigation.is_empty() {
        return;
    }
    out.push_str("<header>\n<nav>\n<ul>\n");
    for item in navigation {
        let _ = writeln!(
            out,
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(safe_href(&item.href)),
            escape_html(&item.label)
        );
    }
    out.push_str("</ul>\n</nav>\n</header>\n");
}

fn render_section(out: &mut String, section: &Section) {
    let _ = writeln!(
        out,
        "<section id=\"{}\" class=\"section section-{}\">",
        escape_html(&section.id),
        css_ident(&section.kind)
    );
    if let Some(heading) = &section.heading {
        let _ = writeln!(out, "<h2>{}</h2>", escape_html(heading));
    }
    if let Some(body) = &section.body {
        // Blank lines separate paragraphs
        for paragraph in body.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            let _ = writeln!(out, "<p>{}</p>", escape_html(paragraph));
        }
    }
    if !section.items.is_empty() {
        out.push_str("<ul>\n");
        for item in &section.items {
            let _ = writeln!(out, "<li>{}</li>", escape_html(item));
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</section>\n");
}

pub fn render_index(title: &str, content: &SiteContent) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape_html(title));
    let _ = writeln!(out, "<link rel=\"stylesheet\" href=\"{}\">", STYLESHEET_FILE_NAME);
    out.push_str("</head>\n<body>\n");
    render_navigation(&mut out, &content.navigation);
    out.push_str("<main>\n");
    for section in &content.sections {
        render_section(&mut out, section);
    }
    out.push_str("</main>\n</body>\n</html>\n");
    out
}
