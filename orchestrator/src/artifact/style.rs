use std::fmt::Write as _;

use crate::types::jobs::payload::StyleSettings;

const DEFAULT_PRIMARY_COLOR: &str = "#1f6feb";
const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";
const DEFAULT_FONT_FAMILY: &str = "system-ui, -apple-system, sans-serif";

/// Drops values that could close the declaration or the block they are written into.
fn css_value(value: &str) -> Option<&str> {
    let value = value.trim();
    let unsafe_char = |c: char| matches!(c, ';' | '{' | '}' | '<' | '>' | '\\') || c.is_control();
    (!value.is_empty() && !value.contains(unsafe_char)).then_some(value)
}

fn css_variable_name(name: &str) -> Option<&str> {
    let name = name.trim();
    (!name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')).then_some(name)
}

pub fn render_stylesheet(style: &StyleSettings) -> String {
    let primary = style.primary_color.as_deref().and_then(css_value).unwrap_or(DEFAULT_PRIMARY_COLOR);
    let background = style.background_color.as_deref().and_then(css_value).unwrap_or(DEFAULT_BACKGROUND_COLOR);
    let font = style.font_family.as_deref().and_then(css_value).unwrap_or(DEFAULT_FONT_FAMILY);

    let mut out = String::from(":root {\n");
    let _ = writeln!(out, "  --primary-color: {};", primary);
    let _ = writeln!(out, "  --background-color: {};", background);
    let _ = writeln!(out, "  --font-family: {};", font);
    // BTreeMap iteration keeps the output stable
    for (name, value) in &style.variables {
        if let (Some(name), Some(value)) = (css_variable_name(name), css_value(value)) {
            let _ = writeln!(out, "  --{}: {};", name, value);
        }
    }
    out.push_str("}\n\n");
    out.push_str(
        "body {\n  margin: 0;\n  font-family: var(--font-family);\n  background: var(--background-color);\n}\n\n\
         nav ul {\n  display: flex;\n  gap: 1rem;\n  list-style: none;\n  padding: 1rem;\n  margin: 0;\n}\n\n\
         a {\n  color: var(--primary-color);\n}\n\n\
         .section {\n  padding: 2rem 1rem;\n}\n\n\
         .section h2 {\n  color: var(--primary-color);\n}\n",
    );
    out
}
