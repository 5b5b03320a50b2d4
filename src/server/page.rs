//! Layout pages hosting the console canvas

use flashweb_core::{title_case, Action, OPTIONAL_FIELDS};
use std::fmt::Write as _;

/// Page rendered for `/`
pub const DEFAULT_PAGE: &str = "home";

/// Id of the canvas the front-end attaches to
pub const CANVAS_ID: &str = "flashweb_canvas";

/// Pages the server knows how to render
pub const KNOWN_PAGES: &[&str] = &[DEFAULT_PAGE, "about"];

/// Render `page`, or `None` if it is not a known page
pub fn render(page: &str) -> Option<String> {
    let body = match page {
        "home" => home_body(),
        "about" => about_body(),
        _ => return None,
    };
    Some(layout(&title_case(page), &body))
}

fn layout(title: &str, body: &str) -> String {
    let nav: String = KNOWN_PAGES
        .iter()
        .map(|page| {
            let href = if *page == DEFAULT_PAGE {
                "/".to_string()
            } else {
                format!("/{}", page)
            };
            format!(r#"<a href="{}">{}</a>"#, href, title_case(page))
        })
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - flashweb</title>
<style>
html, body {{ margin: 0; height: 100%; font-family: sans-serif; }}
nav {{ padding: 0.5em 1em; background: #222; }}
nav a {{ color: #eee; margin-right: 1em; }}
canvas {{ display: block; width: 100%; height: calc(100% - 2.5em); }}
main {{ padding: 1em; }}
</style>
</head>
<body>
<nav>{nav}</nav>
{body}
</body>
</html>
"#
    )
}

fn home_body() -> String {
    format!(
        r#"<canvas id="{CANVAS_ID}"></canvas>
<script type="module">
import init from "/pkg/flashweb_wasm.js";
init();
</script>"#
    )
}

fn about_body() -> String {
    let mut out = String::from("<main>\n<h1>About</h1>\n");
    out.push_str("<p>Each operation is relayed to flashrom on the server host.</p>\n");
    out.push_str("<table>\n<tr><th>Field</th><th>Shown for</th><th>Description</th></tr>\n");
    for spec in OPTIONAL_FIELDS {
        let actions: Vec<&str> = spec.actions.iter().map(|a| a.as_str()).collect();
        let _ = writeln!(
            out,
            r#"<tr data-actions="{}"><td>{}</td><td>{}</td><td>{}</td></tr>"#,
            actions.join(" "),
            spec.label,
            actions.join(", "),
            spec.help
        );
    }
    out.push_str("</table>\n<p>Actions: ");
    let names: Vec<String> = Action::ALL.iter().map(|a| title_case(a.as_str())).collect();
    out.push_str(&names.join(", "));
    out.push_str("</p>\n</main>");
    out
}
