use reachboard_core::Components;

const PAGE_TITLE: &str = "Engagement Dashboard";

/// Wraps the embedded dashboard in a standalone HTML page.
pub fn render_page(parts: &Components) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <h1>{title}</h1>
    {div}
    {script}
</body>
</html>"#,
        title = PAGE_TITLE,
        css = inline_css(),
        div = parts.div,
        script = parts.script,
    )
}

fn inline_css() -> &'static str {
    r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 16px; color: #222; }
h1 { font-size: 24px; font-weight: 600; margin: 0 0 16px; }
.reachboard-tabs { display: flex; gap: 4px; border-bottom: 1px solid #ddd; margin-bottom: 16px; }
.reachboard-tab { border: 1px solid #ddd; border-bottom: none; background: #f7f7f7; padding: 6px 16px; cursor: pointer; font-size: 14px; }
.reachboard-tab.active { background: #fff; font-weight: 600; }
.reachboard-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 32px; margin: 16px; }
.reachboard-cell { min-width: 0; }
.reachboard-slider { display: flex; align-items: center; gap: 8px; margin-top: 16px; font-size: 14px; }
.reachboard-slider input { flex: 1; }
"#
}
