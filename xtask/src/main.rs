use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use std::fs;
use svg_untransform::{FlattenOptions, flatten_str};
use untransform_compare::{CompareResult, compare_rendered, write_debug_pngs};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo xtask <command>");
        eprintln!("Commands:");
        eprintln!("  compare-html [DIR]    Flatten every SVG in DIR and write an HTML comparison");
        std::process::exit(1);
    }

    match args[1].as_str() {
        "compare-html" => compare_html(args.get(2).map(Utf8PathBuf::from)),
        other => bail!("Unknown command: {other}"),
    }
}

struct Outcome {
    name: String,
    original: String,
    flattened: Result<String, String>,
    result: CompareResult,
}

impl Outcome {
    fn is_match(&self) -> bool {
        self.flattened.is_ok() && self.result.is_match()
    }
}

fn run_fixture(path: &Utf8Path) -> Result<Outcome> {
    let name = path.file_stem().unwrap_or(path.as_str()).to_string();
    let original = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;

    let flattened = flatten_str(&original, &FlattenOptions::default())
        .map_err(|e| error_chain(&e));
    let result = match &flattened {
        Ok(flat) => compare_rendered(&original, flat),
        Err(e) => CompareResult::RenderError { details: e.clone() },
    };

    Ok(Outcome {
        name,
        original,
        flattened,
        result,
    })
}

/// Error chain as plain text.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    text
}

fn compare_html(dir: Option<Utf8PathBuf>) -> Result<()> {
    let root = Utf8Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .context("xtask lives inside the workspace")?
        .to_owned();
    let dir = dir.unwrap_or_else(|| root.join("tests/fixtures"));
    let output_path = root.join("comparison.html");
    let debug_dir = root.join("target/compare-debug");

    let mut paths: Vec<Utf8PathBuf> = fs::read_dir(&dir)
        .with_context(|| format!("reading {dir}"))?
        .filter_map(|e| e.ok())
        .filter_map(|e| Utf8PathBuf::from_path_buf(e.path()).ok())
        .filter(|p| p.extension() == Some("svg"))
        .collect();
    paths.sort();

    let outcomes: Vec<Outcome> = paths
        .par_iter()
        .map(|path| run_fixture(path))
        .collect::<Result<_>>()?;

    for outcome in outcomes.iter().filter(|o| !o.is_match()) {
        if let Ok(flat) = &outcome.flattened {
            write_debug_pngs(&debug_dir, &outcome.name, &outcome.original, flat);
        }
    }

    let total = outcomes.len();
    let passed = outcomes.iter().filter(|o| o.is_match()).count();
    let pass_rate = if total > 0 {
        (passed as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let mut html = String::new();
    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Original vs flattened</title>
    <style>
        body {{
            font-family: system-ui, sans-serif;
            margin: 0;
            padding: 24px;
            background: #eee;
            color: #333;
        }}
        .card {{
            background: white;
            border-radius: 8px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.08);
            margin-bottom: 16px;
            padding: 12px 16px;
        }}
        .status {{
            font-size: 11px;
            font-weight: 600;
            padding: 3px 8px;
            border-radius: 4px;
        }}
        .status.match {{ background: #dcfce7; color: #166534; }}
        .status.mismatch {{ background: #fee2e2; color: #991b1b; }}
        .comparison {{
            display: grid;
            grid-template-columns: 1fr 1fr;
            gap: 12px;
        }}
        .comparison svg {{
            max-width: 100%;
            height: auto;
            max-height: 300px;
        }}
        .error, .source {{
            font-family: monospace;
            font-size: 11px;
            white-space: pre-wrap;
        }}
        .error {{ color: #991b1b; background: #fef2f2; padding: 12px; }}
    </style>
</head>
<body>
<h1>Original vs flattened: {:.0}% ({} / {})</h1>
"#,
        pass_rate, passed, total
    ));

    for outcome in &outcomes {
        let (status_class, status_text) = if outcome.is_match() {
            ("match", "MATCH")
        } else {
            ("mismatch", "MISMATCH")
        };
        let score = outcome
            .result
            .score()
            .map(|s| format!("score {s:.4}"))
            .unwrap_or_default();
        let flattened = match &outcome.flattened {
            Ok(flat) => flat.clone(),
            Err(e) => format!(r#"<div class="error">{}</div>"#, html_escape(e)),
        };
        let details = match &outcome.result {
            CompareResult::RenderError { details } => {
                format!(r#"<div class="error">{}</div>"#, html_escape(details))
            }
            _ => String::new(),
        };
        let source = outcome.flattened.as_deref().unwrap_or_default();

        html.push_str(&format!(
            r#"
<div class="card" id="{name}">
    <h2>{name} <span class="status {status_class}">{status_text}</span> {score}</h2>
    {details}
    <div class="comparison">
        <div>{original}</div>
        <div>{flattened}</div>
    </div>
    <details>
        <summary>Flattened source</summary>
        <div class="source">{source}</div>
    </details>
</div>
"#,
            name = outcome.name,
            original = outcome.original,
            source = html_escape(source),
        ));
    }

    html.push_str("</body></html>\n");

    fs::write(&output_path, html).with_context(|| format!("writing {output_path}"))?;
    println!("Generated comparison at: {output_path}");
    Ok(())
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
