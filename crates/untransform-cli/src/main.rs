//! `untransform INPUT [OUTPUT] [--strict] [--precision N]`
//!
//! Reads an SVG file, bakes every transform it can into the geometry and
//! writes the result to OUTPUT, or stdout when no OUTPUT is given.

use std::fs;
use std::path::PathBuf;

use miette::{Context, IntoDiagnostic, miette};
use svg_untransform::{Document, FlattenOptions, Flattener};

const USAGE: &str = "Usage: untransform INPUT [OUTPUT] [--strict] [--precision N]";

#[derive(Debug, PartialEq)]
struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    options: FlattenOptions,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut options = FlattenOptions::default();
    let mut positional = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--strict" => options = options.strict(true),
            "--precision" => {
                let value = args.next().ok_or("--precision needs a value")?;
                let precision = value
                    .parse::<usize>()
                    .ok()
                    .filter(|p| *p > 0)
                    .ok_or_else(|| format!("invalid precision: {value}"))?;
                options = options.precision(precision);
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option: {flag}")),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    let input = positional.next().ok_or("missing INPUT")?;
    let output = positional.next();
    if positional.next().is_some() {
        return Err("too many arguments".to_string());
    }
    Ok(Args {
        input,
        output,
        options,
    })
}

fn main() -> miette::Result<()> {
    // Logs go to stderr; stdout may carry the document
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1)).map_err(|e| miette!("{e}\n{USAGE}"))?;

    let source = fs::read_to_string(&args.input)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {}", args.input.display()))?;

    let mut document = Document::parse(&source)?;
    let report = Flattener::new(&mut document, args.options).flatten()?;
    let flat = document.to_string_pretty()?;

    tracing::info!(
        rewritten = report.rewritten,
        links = report.links_resolved,
        "flattened {}",
        args.input.display()
    );
    if report.residual > 0 || report.unsupported > 0 {
        tracing::warn!(
            residual = report.residual,
            unsupported = report.unsupported,
            "some transforms could not be flattened"
        );
    }

    match &args.output {
        Some(path) => fs::write(path, flat)
            .into_diagnostic()
            .wrap_err_with(|| format!("writing {}", path.display()))?,
        None => println!("{flat}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, String> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults() {
        let args = parse(&["in.svg"]).unwrap();
        assert_eq!(args.input, PathBuf::from("in.svg"));
        assert_eq!(args.output, None);
        assert_eq!(args.options, FlattenOptions::default());
    }

    #[test]
    fn flags_anywhere() {
        let args = parse(&["--strict", "in.svg", "--precision", "3", "out.svg"]).unwrap();
        assert_eq!(args.output, Some(PathBuf::from("out.svg")));
        assert_eq!(args.options, FlattenOptions::default().strict(true).precision(3));
    }

    #[test]
    fn bad_arguments() {
        assert_eq!(parse(&[]).unwrap_err(), "missing INPUT");
        assert_eq!(parse(&["a", "b", "c"]).unwrap_err(), "too many arguments");
        assert_eq!(parse(&["a", "--precision", "x"]).unwrap_err(), "invalid precision: x");
        assert_eq!(parse(&["a", "--precision"]).unwrap_err(), "--precision needs a value");
        assert_eq!(parse(&["--fast", "a"]).unwrap_err(), "unknown option: --fast");
    }
}
