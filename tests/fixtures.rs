use camino::Utf8Path;
use regex_lite::Regex;
use svg_untransform::{AffineMatrix, Attributes, Document, ElementTree, FlattenOptions, flatten_str};
use svg_untransform::parse::path_data;

/// Elements that accept every transform function, so none may keep one.
const ALWAYS_FLAT: &str = r#"<(svg|g|defs|clipPath|path|polygon|polyline|line)\b[^>]*\stransform=""#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn flatten_fixture(path: &Utf8Path) -> datatest_stable::Result<()> {
    init_tracing();
    let source = std::fs::read_to_string(path)?;
    let options = FlattenOptions::default();

    let flat = match flatten_str(&source, &options) {
        Ok(flat) => flat,
        Err(err) => {
            let report = miette::Report::new(err);
            panic!("{path} failed to flatten:\n{report:?}");
        }
    };

    let leftover = Regex::new(ALWAYS_FLAT)?;
    if let Some(found) = leftover.find(&flat) {
        panic!("{path}: transform survived on `{}`\n{flat}", found.as_str());
    }
    assert!(!flat.contains("NaN"), "{path}: non-finite number in output\n{flat}");

    // Re-parses, and a second pass finds nothing left to do.
    let reparsed = Document::parse(&flat)?;
    let original = Document::parse(&source)?;
    assert_eq!(
        reparsed.descendants().len(),
        original.descendants().len(),
        "{path}: element count changed"
    );
    // Rewritten arcs must still fit their chords.
    for node in reparsed.descendants() {
        let element = reparsed.node(node);
        if let (Some(d), "path") = (element.attribute("d"), element.local_name()) {
            if let Err(err) = path_data(d).map_err(miette::Report::new).and_then(|data| {
                data.transform(&AffineMatrix::IDENTITY)
                    .map_err(miette::Report::new)
            }) {
                panic!("{path}: rewritten path data is invalid:\n{err:?}");
            }
        }
    }

    let again = flatten_str(&flat, &options)?;
    assert_eq!(flat, again, "{path}: flattening is not idempotent");

    Ok(())
}

datatest_stable::harness! {
    { test = flatten_fixture, root = "tests/fixtures", pattern = r"\.svg$" },
}
