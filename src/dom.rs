//! Element tree the flattener walks, plus an arena [`Document`] that loads
//! and saves XML with quick-xml.
//!
//! The flattener only needs [`ElementTree`] and [`Attributes`]. [`NodeId`]s
//! are only minted by [`Document`], so other trees wrap one.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::DocumentError;

/// Handle to an element of an [`ElementTree`].
///
/// Handles only come from a tree, so indexing with one can't go out of range:
///
/// ```compile_fail
/// let id = svg_untransform::NodeId(3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Attribute access on a single element.
pub trait Attributes {
    /// Qualified tag name as written, e.g. `rect` or `sodipodi:namedview`.
    fn name(&self) -> &str;

    /// Tag name without its namespace prefix.
    fn local_name(&self) -> &str {
        let name = self.name();
        name.rsplit_once(':').map_or(name, |(_, local)| local)
    }

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Replace the value in place, or append a new attribute.
    fn set_attribute(&mut self, name: &str, value: String);

    fn remove_attribute(&mut self, name: &str) -> Option<String>;

    /// Attribute names in document order.
    fn attribute_names(&self) -> Vec<&str>;
}

/// A tree of elements addressed by [`NodeId`].
pub trait ElementTree {
    type Element: Attributes;

    fn root(&self) -> NodeId;
    fn node(&self, id: NodeId) -> &Self::Element;
    fn node_mut(&mut self, id: NodeId) -> &mut Self::Element;
    /// Element children in document order.
    fn children(&self, id: NodeId) -> Vec<NodeId>;
}

/// Anything that can sit in an element's content or around the root.
///
/// Non-element nodes keep quick-xml's raw (still escaped) text so they are
/// written back untouched.
#[derive(Debug, Clone)]
pub enum Content {
    Element(NodeId),
    Text(BytesText<'static>),
    CData(BytesCData<'static>),
    Comment(BytesText<'static>),
    ProcessingInstruction(BytesPI<'static>),
    Declaration(BytesDecl<'static>),
    DocType(BytesText<'static>),
}

/// An element with its attributes in document order.
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    content: Vec<Content>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, DocumentError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            content: Vec::new(),
        })
    }
}

impl Attributes for Element {
    fn name(&self) -> &str {
        &self.name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(index).1)
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|(key, _)| key.as_str()).collect()
    }
}

/// Arena-backed XML document.
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    prolog: Vec<Content>,
    root: NodeId,
    epilog: Vec<Content>,
}

/// Accumulates reader events into the arena.
#[derive(Default)]
struct Builder {
    elements: Vec<Element>,
    stack: Vec<NodeId>,
    prolog: Vec<Content>,
    root: Option<NodeId>,
    epilog: Vec<Content>,
}

impl Builder {
    fn push(&mut self, content: Content) {
        match (self.stack.last(), self.root) {
            (Some(parent), _) => self.elements[parent.0].content.push(content),
            (None, None) => self.prolog.push(content),
            (None, Some(_)) => self.epilog.push(content),
        }
    }

    fn open(&mut self, start: &BytesStart<'_>) -> Result<NodeId, DocumentError> {
        let element = Element::from_start(start)?;
        if self.stack.is_empty() && self.root.is_some() {
            return Err(DocumentError::Unbalanced(element.name));
        }
        let id = NodeId(self.elements.len());
        self.elements.push(element);
        if self.stack.is_empty() {
            self.root = Some(id);
        } else {
            self.push(Content::Element(id));
        }
        Ok(id)
    }

    /// Whether an open element is a `text`, where whitespace renders.
    fn in_text(&self) -> bool {
        self.stack
            .iter()
            .any(|id| self.elements[id.0].local_name() == "text")
    }

    fn close(&mut self, end: &BytesEnd<'_>) -> Result<(), DocumentError> {
        match self.stack.pop() {
            Some(_) => Ok(()),
            None => Err(DocumentError::Unbalanced(
                String::from_utf8_lossy(end.name().as_ref()).into_owned(),
            )),
        }
    }

    fn finish(self) -> Result<Document, DocumentError> {
        if let Some(open) = self.stack.last() {
            return Err(DocumentError::Unbalanced(self.elements[open.0].name.clone()));
        }
        let root = self.root.ok_or(DocumentError::Empty)?;
        Ok(Document {
            elements: self.elements,
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}

impl Document {
    /// Load a document. Whitespace-only text between tags is dropped outside
    /// `text` elements; the serializer re-indents.
    pub fn parse(source: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(source);
        let mut builder = Builder::default();

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    let id = builder.open(&start)?;
                    builder.stack.push(id);
                }
                Event::Empty(start) => {
                    builder.open(&start)?;
                }
                Event::End(end) => builder.close(&end)?,
                Event::Text(text) => {
                    if builder.in_text() || !text.iter().all(u8::is_ascii_whitespace) {
                        builder.push(Content::Text(text.into_owned()));
                    }
                }
                Event::CData(data) => builder.push(Content::CData(data.into_owned())),
                Event::Comment(comment) => builder.push(Content::Comment(comment.into_owned())),
                Event::PI(pi) => builder.push(Content::ProcessingInstruction(pi.into_owned())),
                Event::Decl(decl) => builder.push(Content::Declaration(decl.into_owned())),
                Event::DocType(doctype) => builder.push(Content::DocType(doctype.into_owned())),
                Event::Eof => break,
            }
        }

        builder.finish()
    }

    /// Serialize with two-space indentation.
    pub fn to_string_pretty(&self) -> Result<String, DocumentError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        for content in &self.prolog {
            self.write_content(&mut writer, content)?;
        }
        self.write_element(&mut writer, self.root, false)?;
        for content in &self.epilog {
            self.write_content(&mut writer, content)?;
        }
        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write_content(
        &self,
        writer: &mut Writer<Vec<u8>>,
        content: &Content,
    ) -> Result<(), DocumentError> {
        let event = match content {
            Content::Element(id) => return self.write_element(writer, *id, false),
            Content::Text(text) => Event::Text(text.clone()),
            Content::CData(data) => Event::CData(data.clone()),
            Content::Comment(comment) => Event::Comment(comment.clone()),
            Content::ProcessingInstruction(pi) => Event::PI(pi.clone()),
            Content::Declaration(decl) => Event::Decl(decl.clone()),
            Content::DocType(doctype) => Event::DocType(doctype.clone()),
        };
        writer.write_event(event).map_err(quick_xml::Error::from)?;
        Ok(())
    }

    /// Whitespace is significant inside text and mixed content, so those
    /// subtrees are written on one line.
    fn is_inline(&self, id: NodeId) -> bool {
        let element = &self.elements[id.0];
        element.local_name() == "text"
            || element
                .content
                .iter()
                .any(|content| matches!(content, Content::Text(_) | Content::CData(_)))
    }

    fn write_element(
        &self,
        writer: &mut Writer<Vec<u8>>,
        id: NodeId,
        inline: bool,
    ) -> Result<(), DocumentError> {
        if !inline && self.is_inline(id) {
            let mut flat = Writer::new(Vec::new());
            self.write_element(&mut flat, id, true)?;
            if !writer.get_ref().is_empty() {
                writer.write_indent().map_err(quick_xml::Error::from)?;
            }
            writer.get_mut().extend_from_slice(&flat.into_inner());
            return Ok(());
        }

        let element = &self.elements[id.0];
        let mut start = BytesStart::new(element.name.as_str());
        for (key, value) in &element.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if element.content.is_empty() {
            writer
                .write_event(Event::Empty(start))
                .map_err(quick_xml::Error::from)?;
            return Ok(());
        }

        writer
            .write_event(Event::Start(start))
            .map_err(quick_xml::Error::from)?;
        for content in &element.content {
            match content {
                Content::Element(child) => self.write_element(writer, *child, inline)?,
                other => self.write_content(writer, other)?,
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(element.name.as_str())))
            .map_err(quick_xml::Error::from)?;
        Ok(())
    }

    /// Every element in document order, root first.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        out
    }

    /// First element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants()
            .into_iter()
            .find(|node| self.node(*node).attribute("id") == Some(id))
    }
}

impl ElementTree for Document {
    type Element = Element;

    fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &Element {
        &self.elements[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.elements[id.0]
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.elements[id.0]
            .content
            .iter()
            .filter_map(|content| match content {
                Content::Element(child) => Some(*child),
                _ => None,
            })
            .collect()
    }
}
