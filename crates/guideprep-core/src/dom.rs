/// Index of a node inside its owning [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Synthetic parent of all top-level nodes.
    Root,
    Element {
        name: String,
        attributes: Vec<Attribute>,
        /// Written as `<name/>` when it still has no children.
        self_closing: bool,
    },
    /// Unescaped character data.
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable document tree. Nodes live in an arena and are addressed by
/// [`NodeId`]; detaching a node leaves it in the arena, unreachable from
/// the root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.nodes[id.0].children.is_empty()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element with no attributes.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element {
            name: name.to_string(),
            attributes: Vec::new(),
            self_closing: false,
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Create a detached node of any kind. Used by the parser.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        self.push(kind)
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != child);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> NodeId {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        child
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> NodeId {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(0, child);
        child
    }

    /// Remove every child and every attribute of `id`.
    pub fn clear(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        if let NodeKind::Element {
            attributes,
            self_closing,
            ..
        } = &mut self.nodes[id.0].kind
        {
            attributes.clear();
            *self_closing = false;
        }
    }

    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.element_name(id) == Some(tag)
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    /// Has no effect on non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind {
            match attributes.iter_mut().find(|a| a.name == name) {
                Some(existing) => existing.value = value.to_string(),
                None => attributes.push(Attribute {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
            }
        }
    }

    /// Whether the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }

    /// All nodes below `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Elements below `id` matching `pred`, in document order.
    pub fn select(&self, id: NodeId, pred: impl Fn(&Document, NodeId) -> bool) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.element_name(n).is_some() && pred(self, n))
            .collect()
    }

    /// First element in the whole document named `tag`.
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        self.select(self.root(), |d, n| d.is_element(n, tag))
            .into_iter()
            .next()
    }

    /// First element in the whole document named `tag` whose `id` is `id_value`.
    pub fn find_by_id(&self, tag: &str, id_value: &str) -> Option<NodeId> {
        self.select(self.root(), |d, n| {
            d.is_element(n, tag) && d.attribute(n, "id") == Some(id_value)
        })
        .into_iter()
        .next()
    }

    /// Following sibling of `id`, skipping whitespace-only text.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings[pos + 1..].iter().copied().find(|&s| {
            !matches!(&self.nodes[s.0].kind, NodeKind::Text(t) if t.trim().is_empty())
        })
    }

    /// Concatenated text and CDATA of all descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeKind::Text(t) | NodeKind::CData(t) = &self.nodes[id.0].kind {
            out.push_str(t);
        }
        for n in self.descendants(id) {
            if let NodeKind::Text(t) | NodeKind::CData(t) = &self.nodes[n.0].kind {
                out.push_str(t);
            }
        }
        out
    }

    /// Replace all children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        let t = self.create_text(text);
        self.append_child(id, t);
    }
}
