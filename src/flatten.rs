//! Flattening driver.
//!
//! Walks the element tree depth-first from the root, accumulating transform
//! functions on the way down, and bakes them into each element's geometry.
//! `clipPath` and `mask` elements are flattened in the coordinate space of
//! the first element that links to them, at most once each.

use std::collections::HashMap;

use crate::applyer::{Applyer, ElementRole, SKIP_SUBTREE, TransformApplyer};
use crate::dom::{Attributes, ElementTree, NodeId};
use crate::errors::{ApplyError, FlattenCause, FlattenError};
use crate::log::{debug, info, warn};
use crate::parse;
use crate::style::Style;
use crate::transform::{TransformOp, compose, encode_list};
use crate::types::DEFAULT_PRECISION;

/// Attributes (and style properties) that link to a registered element.
const LINK_ATTRIBUTES: [&str; 2] = ["clip-path", "mask"];

/// Element kinds that are only rendered through a link.
const LINKABLE: [&str; 2] = ["clipPath", "mask"];

/// Knobs for a flatten run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Fail on transforms a shape cannot absorb instead of keeping them as
    /// a residual `transform` attribute.
    pub strict: bool,
    /// Significant figures for rewritten numbers.
    pub precision: usize,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            strict: false,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl FlattenOptions {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

/// What a flatten run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenReport {
    /// Elements whose geometry absorbed at least one transform function.
    pub rewritten: usize,
    /// Elements left with a residual `transform` attribute.
    pub residual: usize,
    /// Elements with no applyer, left as written.
    pub unsupported: usize,
    /// Linked elements flattened on behalf of a referencing element.
    pub links_resolved: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum LinkState {
    /// Not reached yet by either the walk or a link.
    Pending,
    /// Reached by the walk; holds the transform inherited there.
    Deferred(Vec<TransformOp>),
    Processed,
}

#[derive(Debug)]
struct Entry {
    node: NodeId,
    state: LinkState,
}

/// Outcome of resolving a link.
#[derive(Debug, PartialEq, Eq)]
enum Claim {
    /// The target must be flattened now.
    Fresh(NodeId),
    /// Already flattened.
    Done,
    Missing,
}

/// `clipPath`/`mask` elements by id, in document order.
#[derive(Debug, Default)]
struct Definitions {
    entries: Vec<Entry>,
    by_id: HashMap<String, usize>,
    by_node: HashMap<NodeId, usize>,
}

impl Definitions {
    /// Register every linkable element with an id outside skipped subtrees.
    /// The first element wins when ids repeat.
    fn scan<T: ElementTree>(tree: &T) -> Self {
        let mut definitions = Self::default();
        let mut stack = vec![tree.root()];
        while let Some(node) = stack.pop() {
            let element = tree.node(node);
            let local = element.local_name();
            if SKIP_SUBTREE.contains(&local) {
                continue;
            }
            if LINKABLE.contains(&local) {
                if let Some(id) = element.attribute("id") {
                    definitions.register(id, node);
                }
            }
            stack.extend(tree.children(node).into_iter().rev());
        }
        definitions
    }

    fn register(&mut self, id: &str, node: NodeId) {
        if self.by_id.contains_key(id) {
            warn!("duplicate id {id:?}, keeping the first definition");
            return;
        }
        let index = self.entries.len();
        self.entries.push(Entry {
            node,
            state: LinkState::Pending,
        });
        self.by_id.insert(id.to_string(), index);
        self.by_node.insert(node, index);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    /// Record the walk reaching `node`. Returns whether the node is
    /// registered, in which case the walk must not flatten it itself.
    fn defer(&mut self, node: NodeId, inherited: &[TransformOp]) -> bool {
        let Some(&index) = self.by_node.get(&node) else {
            return false;
        };
        let entry = &mut self.entries[index];
        if entry.state == LinkState::Pending {
            entry.state = LinkState::Deferred(inherited.to_vec());
        }
        true
    }

    fn claim(&mut self, id: &str) -> Claim {
        let Some(&index) = self.by_id.get(id) else {
            return Claim::Missing;
        };
        let entry = &mut self.entries[index];
        match entry.state {
            LinkState::Processed => Claim::Done,
            LinkState::Pending | LinkState::Deferred(_) => {
                entry.state = LinkState::Processed;
                Claim::Fresh(entry.node)
            }
        }
    }

    /// Take the inherited ops of an entry the walk reached but no link did.
    fn take_deferred(&mut self, index: usize) -> Option<(NodeId, Vec<TransformOp>)> {
        let entry = self.entries.get_mut(index)?;
        match std::mem::replace(&mut entry.state, LinkState::Processed) {
            LinkState::Deferred(ops) => Some((entry.node, ops)),
            other => {
                entry.state = other;
                None
            }
        }
    }
}

/// `url(#id)`, optionally quoted, to `id`.
fn link_target(value: &str) -> Option<&str> {
    let inner = value
        .trim()
        .strip_prefix("url(")?
        .strip_suffix(')')?
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');
    inner.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Ids linked from attributes and the inline style, attributes first.
fn link_targets(element: &dyn Attributes) -> Vec<String> {
    let style = element.attribute("style").map(Style::decode);
    let mut targets = Vec::new();
    for key in LINK_ATTRIBUTES {
        let values = [
            element.attribute(key),
            style.as_ref().and_then(|style| style.get(key)),
        ];
        for value in values.into_iter().flatten() {
            if let Some(id) = link_target(value) {
                if !targets.iter().any(|t| t == id) {
                    targets.push(id.to_string());
                }
            }
        }
    }
    targets
}

/// `<rect id="a">` or `<rect>`, for error messages.
fn describe(element: &dyn Attributes) -> String {
    match element.attribute("id") {
        Some(id) => format!("<{} id=\"{id}\">", element.name()),
        None => format!("<{}>", element.name()),
    }
}

/// How one element splits its accumulated transform.
struct Plan {
    applyer: Option<Applyer>,
    /// Baked into this element; also what its children and links inherit.
    applied: Vec<TransformOp>,
    /// Written back as the element's `transform` attribute; `None` leaves
    /// the attribute as written.
    residual: Option<Vec<TransformOp>>,
}

/// Removes every `transform` it can from a tree.
pub struct Flattener<'a, T: ElementTree> {
    tree: &'a mut T,
    options: FlattenOptions,
    definitions: Definitions,
    report: FlattenReport,
}

impl<'a, T: ElementTree> Flattener<'a, T> {
    pub fn new(tree: &'a mut T, options: FlattenOptions) -> Self {
        let definitions = Definitions::scan(&*tree);
        Self {
            tree,
            options,
            definitions,
            report: FlattenReport::default(),
        }
    }

    /// Flatten the whole tree in place.
    ///
    /// On error the tree is left partially rewritten.
    pub fn flatten(mut self) -> Result<FlattenReport, FlattenError> {
        let root = self.tree.root();
        self.visit(root, &[])?;

        // Linked elements nothing referenced keep the transform they inherit.
        for index in 0..self.definitions.len() {
            if let Some((node, ops)) = self.definitions.take_deferred(index) {
                debug!("flattening unreferenced {}", describe(self.tree.node(node)));
                self.flatten_node(node, &ops)?;
            }
        }

        let report = self.report;
        info!(
            "flattened: {} rewritten, {} residual, {} unsupported, {} links resolved",
            report.rewritten, report.residual, report.unsupported, report.links_resolved
        );
        Ok(report)
    }

    fn visit(&mut self, node: NodeId, inherited: &[TransformOp]) -> Result<(), FlattenError> {
        let local = self.tree.node(node).local_name();
        if SKIP_SUBTREE.contains(&local) {
            debug!("leaving <{local}> subtree untouched");
            return Ok(());
        }
        if self.definitions.defer(node, inherited) {
            debug!("deferring {}", describe(self.tree.node(node)));
            return Ok(());
        }
        self.flatten_node(node, inherited)
    }

    fn flatten_node(&mut self, node: NodeId, inherited: &[TransformOp]) -> Result<(), FlattenError> {
        let element = self.tree.node(node);
        let label = describe(element);
        let fail = |cause: FlattenCause| FlattenError::Element {
            element: label.clone(),
            cause,
        };

        let own = match element.attribute("transform") {
            Some(text) => parse::transform_list(text).map_err(|err| fail(err.into()))?,
            None => Vec::new(),
        };
        let links = link_targets(element);
        let plan = match ElementRole::of(element.local_name()) {
            ElementRole::Skip => return Ok(()),
            ElementRole::Ignorable => Plan {
                applyer: None,
                applied: [inherited, &own[..]].concat(),
                residual: Some(Vec::new()),
            },
            // Its own transform stays on it and still applies to the
            // children, so they only inherit what came from above.
            ElementRole::Unsupported(err) => {
                warn!("{err}, leaving its attributes as written");
                self.report.unsupported += 1;
                Plan {
                    applyer: None,
                    applied: inherited.to_vec(),
                    residual: None,
                }
            }
            ElementRole::Shape(applyer) => {
                let (applied, skipped): (Vec<_>, Vec<_>) = inherited
                    .iter()
                    .chain(&own)
                    .cloned()
                    .partition(|op| applyer.can_apply(op));
                if !skipped.is_empty() {
                    let err = ApplyError::DisabledTransform {
                        element: label.clone(),
                        ops: encode_list(&skipped, self.options.precision),
                    };
                    if self.options.strict {
                        return Err(fail(err.into()));
                    }
                    warn!(
                        "{err}, keeping it as a transform attribute applied after the \
                         flattened ones, which moves the shape unless they commute"
                    );
                    self.report.residual += 1;
                }
                Plan {
                    applyer: Some(applyer),
                    applied,
                    residual: Some(skipped),
                }
            }
        };

        for id in &links {
            self.resolve_link(&label, id, &plan.applied)?;
        }

        let matrix = compose(&plan.applied).map_err(|err| fail(err.into()))?;
        let element = self.tree.node_mut(node);
        if let Some(applyer) = plan.applyer {
            if !plan.applied.is_empty() {
                debug!("{label}: baking {matrix}");
                applyer
                    .apply(&mut *element, &matrix, &self.options)
                    .map_err(fail)?;
                self.report.rewritten += 1;
            }
        }
        match &plan.residual {
            None => {}
            Some(residual) if residual.is_empty() => {
                element.remove_attribute("transform");
            }
            Some(residual) => {
                element.set_attribute("transform", encode_list(residual, self.options.precision));
            }
        }

        for child in self.tree.children(node) {
            self.visit(child, &plan.applied)?;
        }
        Ok(())
    }

    fn resolve_link(
        &mut self,
        referrer: &str,
        id: &str,
        ops: &[TransformOp],
    ) -> Result<(), FlattenError> {
        match self.definitions.claim(id) {
            Claim::Fresh(target) => {
                debug!("{referrer} links #{id}, flattening it in the referrer's space");
                self.report.links_resolved += 1;
                self.flatten_node(target, ops)
            }
            Claim::Done => Ok(()),
            Claim::Missing => {
                warn!("{referrer} links #{id}, which is not a clipPath or mask");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, Element};

    /// A [`Document`] that counts mutable accesses per element.
    struct CountingTree {
        doc: Document,
        writes: HashMap<NodeId, usize>,
    }

    impl ElementTree for CountingTree {
        type Element = Element;

        fn root(&self) -> NodeId {
            self.doc.root()
        }

        fn node(&self, id: NodeId) -> &Element {
            self.doc.node(id)
        }

        fn node_mut(&mut self, id: NodeId) -> &mut Element {
            *self.writes.entry(id).or_default() += 1;
            self.doc.node_mut(id)
        }

        fn children(&self, id: NodeId) -> Vec<NodeId> {
            self.doc.children(id)
        }
    }

    fn flatten(source: &str, options: FlattenOptions) -> (Document, FlattenReport) {
        let mut doc = Document::parse(source).unwrap();
        let report = Flattener::new(&mut doc, options).flatten().unwrap();
        (doc, report)
    }

    fn by_id<'d>(doc: &'d Document, id: &str) -> &'d Element {
        doc.node(doc.find_by_id(id).unwrap())
    }

    #[test]
    fn link_targets_accept_quotes_and_style() {
        assert_eq!(link_target("url(#a)"), Some("a"));
        assert_eq!(link_target(" url( '#b' ) "), Some("b"));
        assert_eq!(link_target("url(other.svg#c)"), None);
        assert_eq!(link_target("none"), None);

        let doc = Document::parse(
            r#"<rect clip-path="url(#a)" style="mask:url(&quot;#m&quot;);clip-path:url(#a)"/>"#,
        )
        .unwrap();
        assert_eq!(link_targets(doc.node(doc.root())), ["a", "m"]);
    }

    #[test]
    fn shared_clip_path_is_flattened_once() {
        let source = r#"<svg>
            <defs><clipPath id="c"><circle id="dot" r="1"/></clipPath></defs>
            <g transform="scale(2)">
                <rect width="1" height="1" clip-path="url(#c)"/>
                <rect width="1" height="1" style="clip-path:url(#c)"/>
            </g>
        </svg>"#;
        let mut tree = CountingTree {
            doc: Document::parse(source).unwrap(),
            writes: HashMap::new(),
        };
        let report = Flattener::new(&mut tree, FlattenOptions::default())
            .flatten()
            .unwrap();

        let dot = tree.doc.find_by_id("dot").unwrap();
        assert_eq!(tree.writes.get(&dot), Some(&1));
        assert_eq!(tree.doc.node(dot).attribute("r"), Some("2"));
        assert_eq!(report.links_resolved, 1);
    }

    #[test]
    fn clip_path_after_its_referrer() {
        let (doc, _) = flatten(
            r#"<svg>
                <rect transform="translate(3,0)" width="1" clip-path="url(#c)"/>
                <clipPath id="c"><rect id="clip" width="2"/></clipPath>
            </svg>"#,
            FlattenOptions::default(),
        );
        assert_eq!(by_id(&doc, "clip").attribute("x"), Some("3"));
    }

    #[test]
    fn unreferenced_clip_path_keeps_inherited_transform() {
        let (doc, report) = flatten(
            r#"<g transform="translate(5,0)"><clipPath id="c"><rect id="r" width="1"/></clipPath></g>"#,
            FlattenOptions::default(),
        );
        let rect = by_id(&doc, "r");
        assert_eq!(rect.attribute("x"), Some("5"));
        assert_eq!(rect.attribute("y"), Some("0"));
        assert_eq!(report.links_resolved, 0);
    }

    #[test]
    fn skip_list_leaves_subtree_alone() {
        let (doc, _) = flatten(
            r#"<svg transform="scale(2)">
                <metadata><rect id="meta" width="1" transform="scale(3)"/></metadata>
                <rect id="shape" width="1"/>
            </svg>"#,
            FlattenOptions::default(),
        );
        let meta = by_id(&doc, "meta");
        assert_eq!(meta.attribute("width"), Some("1"));
        assert_eq!(meta.attribute("transform"), Some("scale(3)"));
        assert_eq!(by_id(&doc, "shape").attribute("width"), Some("2"));
        assert_eq!(doc.node(doc.root()).attribute("transform"), None);
    }

    #[test]
    fn disabled_ops_stay_as_residual() {
        let (doc, report) = flatten(
            r#"<rect width="1" height="1" transform="translate(1,0) rotate(45)"/>"#,
            FlattenOptions::default(),
        );
        let rect = doc.node(doc.root());
        assert_eq!(rect.attribute("x"), Some("1"));
        assert_eq!(rect.attribute("y"), Some("0"));
        assert_eq!(rect.attribute("transform"), Some("rotate(45)"));
        assert_eq!(report.residual, 1);
        assert_eq!(report.rewritten, 1);
    }

    #[test]
    fn strict_mode_rejects_disabled_ops() {
        let mut doc =
            Document::parse(r#"<ellipse id="e" rx="1" transform="skewX(30)"/>"#).unwrap();
        let err = Flattener::new(&mut doc, FlattenOptions::default().strict(true))
            .flatten()
            .unwrap_err();
        assert_eq!(err.to_string(), r#"failed to flatten <ellipse id="e">"#);
        assert!(matches!(
            err.cause(),
            Some(FlattenCause::Apply(ApplyError::DisabledTransform { .. }))
        ));
    }

    #[test]
    fn unsupported_element_is_left_as_written() {
        let (doc, report) = flatten(
            r#"<svg transform="translate(1,1)">
                <foo id="foo" transform="scale(2)"><rect id="r" width="1" transform="translate(1)"/></foo>
            </svg>"#,
            FlattenOptions::default(),
        );
        assert_eq!(by_id(&doc, "foo").attribute("transform"), Some("scale(2)"));
        let rect = by_id(&doc, "r");
        assert_eq!(rect.attribute("x"), Some("2"));
        assert_eq!(rect.attribute("y"), Some("1"));
        assert_eq!(rect.attribute("transform"), None);
        assert_eq!(report.unsupported, 1);
    }

    #[test]
    fn animation_elements_gain_no_transform() {
        let (doc, report) = flatten(
            r#"<g transform="scale(2)">
                <rect id="r" width="1" height="1"><animate id="a" attributeName="x" to="5" dur="1s"/></rect>
            </g>"#,
            FlattenOptions::default(),
        );
        let animate = by_id(&doc, "a");
        assert_eq!(animate.attribute("transform"), None);
        assert_eq!(
            animate.attribute_names(),
            ["id", "attributeName", "to", "dur"]
        );
        assert_eq!(by_id(&doc, "r").attribute("width"), Some("2"));
        assert_eq!(report.unsupported, 1);
    }

    #[test]
    fn rotating_matrix_stays_on_rect_and_ellipse() {
        let (doc, report) = flatten(
            r#"<svg>
                <rect id="r" width="10" height="10" transform="matrix(0,1,-1,0,0,0)"/>
                <ellipse id="e" rx="2" ry="1" transform="translate(1,0) matrix(0,1,-1,0,0,0)"/>
            </svg>"#,
            FlattenOptions::default(),
        );
        let rect = by_id(&doc, "r");
        assert_eq!(rect.attribute("width"), Some("10"));
        assert_eq!(rect.attribute("height"), Some("10"));
        assert_eq!(rect.attribute("transform"), Some("matrix(0,1,-1,0,0,0)"));

        let ellipse = by_id(&doc, "e");
        assert_eq!(ellipse.attribute("cx"), Some("1"));
        assert_eq!(ellipse.attribute("rx"), Some("2"));
        assert_eq!(ellipse.attribute("ry"), Some("1"));
        assert_eq!(ellipse.attribute("transform"), Some("matrix(0,1,-1,0,0,0)"));
        assert_eq!(report.residual, 2);

        let mut doc = Document::parse(
            r#"<rect id="r" width="10" height="10" transform="matrix(0,1,-1,0,0,0)"/>"#,
        )
        .unwrap();
        let err = Flattener::new(&mut doc, FlattenOptions::default().strict(true))
            .flatten()
            .unwrap_err();
        assert_eq!(err.to_string(), r#"failed to flatten <rect id="r">"#);
    }

    #[test]
    fn residual_moves_outside_the_baked_ops() {
        // translate(10,0) rotate(90) would put the corner at (10,0); with the
        // rotation kept outside the translation it lands at (0,10).
        let (doc, _) = flatten(
            r#"<g transform="translate(10,0)"><rect id="r" width="1" height="1" transform="rotate(90)"/></g>"#,
            FlattenOptions::default(),
        );
        let rect = by_id(&doc, "r");
        assert_eq!(rect.attribute("x"), Some("10"));
        assert_eq!(rect.attribute("y"), Some("0"));
        assert_eq!(rect.attribute("transform"), Some("rotate(90)"));
    }

    #[test]
    fn inline_tspan_stays_in_the_flow() {
        let (doc, _) = flatten(
            r#"<text id="t" x="0" y="10" transform="translate(5,5)">Hello <tspan id="w" font-weight="bold">world</tspan></text>"#,
            FlattenOptions::default(),
        );
        let text = by_id(&doc, "t");
        assert_eq!(text.attribute("x"), Some("5"));
        assert_eq!(text.attribute("y"), Some("15"));
        let tspan = by_id(&doc, "w");
        assert_eq!(tspan.attribute("x"), None);
        assert_eq!(tspan.attribute("y"), None);
    }

    #[test]
    fn nested_em_font_size_is_scaled_once() {
        let (doc, _) = flatten(
            r#"<text id="t" style="font-size:10px" transform="scale(2)">a<tspan id="s" style="font-size:1.5em">b</tspan></text>"#,
            FlattenOptions::default(),
        );
        assert_eq!(by_id(&doc, "t").attribute("style"), Some("font-size:20px;"));
        assert_eq!(by_id(&doc, "s").attribute("style"), Some("font-size:1.5em;"));
    }

    #[test]
    fn dangling_links_are_ignored() {
        let (doc, _) = flatten(
            r#"<circle r="1" transform="scale(3)" clip-path="url(#nowhere)"/>"#,
            FlattenOptions::default(),
        );
        assert_eq!(doc.node(doc.root()).attribute("r"), Some("3"));
    }

    #[test]
    fn errors_name_the_element() {
        let mut doc = Document::parse(r#"<path id="p" d="M 0" transform="scale(2)"/>"#).unwrap();
        let err = Flattener::new(&mut doc, FlattenOptions::default())
            .flatten()
            .unwrap_err();
        assert_eq!(err.to_string(), r#"failed to flatten <path id="p">"#);
        assert!(matches!(err.cause(), Some(FlattenCause::Parse(_))));
    }

    #[test]
    fn precision_option_applies() {
        let (doc, _) = flatten(
            r#"<circle r="1" transform="scale(0.333333333)"/>"#,
            FlattenOptions::default().precision(3),
        );
        assert_eq!(doc.node(doc.root()).attribute("r"), Some("0.333"));
    }
}
