// HTML host page for trying a widget before embedding it

/// How the preview page loads the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewScript {
    /// Reference the public script route
    Src(String),
    /// Inline an already materialized script
    Inline(String),
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn render_preview_page(embed_code: &str, script: PreviewScript) -> String {
    let code = escape_html(embed_code);
    let script_tag = match script {
        PreviewScript::Src(url) => format!("<script src=\"{}\" async></script>", escape_html(&url)),
        // Materialized scripts never contain a raw `<`, so `</script>` cannot appear
        PreviewScript::Inline(body) => format!("<script>\n{}</script>", body),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Widget preview: {code}</title>
  <style>
    body {{ margin: 0; padding: 40px; font-family: system-ui, -apple-system, sans-serif; background: #F3F4F6; color: #1F2937; }}
    main {{ max-width: 720px; }}
    code {{ background: #E5E7EB; padding: 2px 6px; border-radius: 4px; }}
  </style>
</head>
<body>
  <main>
    <h1>Widget preview</h1>
    <p>Embed code: <code>{code}</code></p>
    <p>The chat button in the corner behaves exactly as it will on your site.</p>
  </main>
  {script_tag}
</body>
</html>
"#
    )
}
