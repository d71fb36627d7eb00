use super::{
    Document, HeadDeclaration, MutationBatch, MutationRecord, NodeId, OBSERVED_ATTRIBUTES,
    ReadyState,
};
use indexmap::IndexMap;
use tracing::debug;

/// `type` of the `<script>` holding an inline localization payload.
pub const INLINE_PAYLOAD_TYPE: &str = "application/l10n";

#[derive(Clone, Debug)]
enum NodeKind {
    Element {
        tag: String,
        attributes: IndexMap<String, String>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An arena-backed document for hosts without a native tree.
///
/// Starts as `<html><head></head><body></body></html>`. Detached nodes stay in
/// the arena; they are simply no longer connected.
#[derive(Clone, Debug)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    ready_state: ReadyState,
    observing: bool,
    records: MutationBatch,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            ready_state: ReadyState::Loading,
            observing: false,
            records: Vec::new(),
        };
        doc.root = doc.create_element("html");
        doc.head = doc.create_element("head");
        doc.body = doc.create_element("body");
        doc.attach(doc.root, doc.head);
        doc.attach(doc.root, doc.body);
        doc
    }

    /// Sets `lang` on the document element.
    pub fn with_lang(mut self, lang: &str) -> Self {
        let root = self.root;
        self.set_attribute(root, "lang", lang);
        self
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: IndexMap::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Appends `child` to `parent`, moving it if it already has a parent.
    ///
    /// Appending a node to itself or to one of its descendants is rejected
    /// and leaves the tree unchanged.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.nodes.get(parent.0).is_none() || self.nodes.get(child.0).is_none() {
            return;
        }
        if self.is_inclusive_ancestor(child, parent) {
            debug!("Refusing to append {:?} into its own subtree at {:?}", child, parent);
            return;
        }
        self.detach(child);
        self.attach(parent, child);
        if self.observing && self.is_connected(parent) {
            self.records.push(MutationRecord::ChildList {
                target: parent,
                added: vec![child],
            });
        }
    }

    /// Creates an element with attributes and appends it to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> NodeId {
        let element = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(element, name, value);
        }
        self.append_child(parent, element);
        element
    }

    /// Detaches `node` from its parent.
    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    /// Appends `<link rel=".." href="..">` to the head.
    pub fn add_link(&mut self, rel: &str, href: &str) -> NodeId {
        let head = self.head;
        self.append_element(head, "link", &[("rel", rel), ("href", href)])
    }

    /// Appends `<meta name=".." content="..">` to the head.
    pub fn add_meta(&mut self, name: &str, content: &str) -> NodeId {
        let head = self.head;
        self.append_element(head, "meta", &[("name", name), ("content", content)])
    }

    /// Embeds an inline localization payload for `locale` in the head.
    pub fn add_inline_payload(&mut self, locale: &str, payload: &str) -> NodeId {
        let head = self.head;
        let script = self.append_element(
            head,
            "script",
            &[("type", INLINE_PAYLOAD_TYPE), ("lang", locale)],
        );
        let text = self.create_text(payload);
        self.attach(script, text);
        script
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node.0) else {
            return;
        };
        match &n.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for child in &n.children {
                    self.collect_text(*child, out);
                }
            },
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != node);
        self.nodes[node.0].parent = None;
    }

    fn attributes(&self, node: NodeId) -> Option<&IndexMap<String, String>> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            NodeKind::Text(_) => None,
        }
    }

    fn attributes_mut(&mut self, node: NodeId) -> Option<&mut IndexMap<String, String>> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            NodeKind::Text(_) => None,
        }
    }

    fn record_attribute(&mut self, node: NodeId, name: &str) {
        if self.observing && OBSERVED_ATTRIBUTES.contains(&name) && self.is_connected(node) {
            self.records.push(MutationRecord::Attributes {
                target: node,
                name: name.to_string(),
            });
        }
    }
}

impl Document for MemoryDocument {
    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn document_element(&self) -> NodeId {
        self.root
    }

    fn head_declarations(&self) -> Vec<HeadDeclaration> {
        self.children(self.head)
            .iter()
            .filter_map(|&node| {
                let attr = |name: &str| self.attribute(node, name);
                match (self.tag_name(node)?, attr("rel").as_deref()) {
                    ("link", Some("localization")) => {
                        attr("href").map(HeadDeclaration::ResourceLink)
                    },
                    ("link", Some("manifest")) => attr("href").map(HeadDeclaration::ManifestLink),
                    ("meta", _) => match attr("name").as_deref() {
                        Some("locales") => attr("content").map(HeadDeclaration::LocalesMeta),
                        Some("default_locale") => {
                            attr("content").map(HeadDeclaration::DefaultLocaleMeta)
                        },
                        _ => None,
                    },
                    _ => None,
                }
            })
            .collect()
    }

    fn inline_payload(&self, locale: &str) -> Option<String> {
        self.descendant_elements(self.root)
            .into_iter()
            .find(|&node| {
                self.tag_name(node) == Some("script")
                    && self.attribute(node, "type").as_deref() == Some(INLINE_PAYLOAD_TYPE)
                    && self.attribute(node, "lang").as_deref() == Some(locale)
            })
            .map(|script| self.text_content(script))
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.tag_name(node).is_some()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    fn child_element_count(&self, node: NodeId) -> usize {
        self.children(node)
            .iter()
            .filter(|c| self.is_element(**c))
            .count()
    }

    fn descendant_elements(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !self.is_element(id) {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.attributes(node)?.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(attributes) = self.attributes_mut(node) else {
            return;
        };
        attributes.insert(name.to_string(), value.to_string());
        self.record_attribute(node, name);
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let Some(attributes) = self.attributes_mut(node) else {
            return;
        };
        if attributes.shift_remove(name).is_some() {
            self.record_attribute(node, name);
        }
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        if !self.is_element(node) {
            return;
        }
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
        let text_node = self.create_text(text);
        self.attach(node, text_node);
        if self.observing && self.is_connected(node) {
            self.records.push(MutationRecord::ChildList {
                target: node,
                added: vec![text_node],
            });
        }
    }

    fn observe(&mut self) {
        self.observing = true;
    }

    fn disconnect(&mut self) {
        self.observing = false;
    }

    fn is_observing(&self) -> bool {
        self.observing
    }

    fn take_records(&mut self) -> MutationBatch {
        std::mem::take(&mut self.records)
    }
}
