//! HTML rendering for the container list.

use crate::types::ContainerView;
use std::fmt::Write;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Containers</title>
<style>
body { font-family: sans-serif; margin: 2rem; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #ddd; padding: 0.4rem 0.6rem; text-align: left; }
.running { color: #1a7f37; }
.stopped { color: #888; }
form { display: inline; }
</style>
</head>
<body>
<h1>Containers</h1>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_index(containers: &[ContainerView]) -> String {
    let mut html = String::from(PAGE_HEAD);

    if containers.is_empty() {
        html.push_str("<p>No containers found.</p>\n");
        html.push_str(PAGE_TAIL);
        return html;
    }

    html.push_str(
        "<table>\n<thead><tr><th>Name</th><th>ID</th><th>Status</th><th>IP</th>\
         <th>Ports</th><th>Image</th><th>Actions</th></tr></thead>\n<tbody>\n",
    );
    for container in containers {
        render_row(&mut html, container);
    }
    html.push_str("</tbody>\n</table>\n");
    html.push_str(PAGE_TAIL);
    html
}

fn render_row(html: &mut String, container: &ContainerView) {
    let class = match container.is_running {
        Some(true) => "running",
        _ => "stopped",
    };
    let image = container.image.as_deref().unwrap_or("Unknown");
    let ports = if container.ports.is_empty() {
        "-"
    } else {
        container.ports.as_str()
    };

    // Writing into a String cannot fail
    let _ = write!(
        html,
        "<tr><td>{}</td><td title=\"{}\">{}</td><td class=\"{class}\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>",
        escape(&container.name),
        escape(&container.id),
        escape(container.short_id()),
        escape(&container.status),
        escape(&container.ip),
        escape(ports),
        escape(image),
    );
    for action in ["start", "stop", "restart"] {
        let _ = write!(
            html,
            "<form method=\"post\" action=\"/{action}\"><input type=\"hidden\" name=\"container_id\" value=\"{}\"><button type=\"submit\">{action}</button></form>",
            escape(&container.id),
        );
    }
    html.push_str("</td></tr>\n");
}
