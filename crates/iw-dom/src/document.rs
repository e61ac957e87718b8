use crate::node::Attribute;
use crate::node::ElementData;
use crate::node::Node;
use crate::node::NodeData;
use crate::node::NodeHandle;
use crate::node::is_void_element;
use iw_core::EditorError;
use iw_core::EditorResult;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Live, mutable document tree.
///
/// Nodes live in an arena and are never freed while the document exists;
/// detached nodes keep their slot so outstanding handles stay resolvable.
/// Cloning keeps the generation, so handles resolve in both copies.
#[derive(Debug, Clone)]
pub struct Document {
    generation: u64,
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            generation: next_generation(),
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn root(&self) -> NodeHandle {
        self.handle(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True when `node` was issued by this document (or a clone of it).
    pub fn contains(&self, node: NodeHandle) -> bool {
        node.generation() == self.generation && node.index() < self.nodes.len()
    }

    pub fn data(&self, node: NodeHandle) -> Option<&NodeData> {
        self.slot(node).map(|slot| &slot.data)
    }

    pub fn element(&self, node: NodeHandle) -> Option<&ElementData> {
        self.data(node).and_then(NodeData::as_element)
    }

    pub fn is_element(&self, node: NodeHandle) -> bool {
        self.element(node).is_some()
    }

    pub fn tag_name(&self, node: NodeHandle) -> Option<&str> {
        self.element(node).map(|element| element.tag.as_str())
    }

    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.slot(node)
            .and_then(|slot| slot.parent)
            .map(|index| self.handle(index))
    }

    pub fn parent_element(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.parent(node).filter(|parent| self.is_element(*parent))
    }

    pub fn children(&self, node: NodeHandle) -> impl Iterator<Item = NodeHandle> + '_ {
        let generation = self.generation;
        self.slot(node)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |index| NodeHandle::new(generation, *index))
    }

    pub fn element_children(&self, node: NodeHandle) -> impl Iterator<Item = NodeHandle> + '_ {
        self.children(node).filter(|child| self.is_element(*child))
    }

    /// Ancestors of `node`, nearest first, ending at the document node.
    pub fn ancestors(&self, node: NodeHandle) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(node),
        }
    }

    /// Descendants of `node` in tree order, excluding `node` itself.
    pub fn descendants(&self, node: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeHandle> = self.children(node).collect();
        stack.reverse();

        while let Some(current) = stack.pop() {
            out.push(current);
            let mut children: Vec<NodeHandle> = self.children(current).collect();
            children.reverse();
            stack.extend(children);
        }

        out
    }

    /// True when `node` is reachable from the document node.
    pub fn is_connected(&self, node: NodeHandle) -> bool {
        if !self.contains(node) {
            return false;
        }
        if node == self.root() {
            return true;
        }
        self.ancestors(node).any(|ancestor| ancestor == self.root())
    }

    pub fn document_element(&self) -> Option<NodeHandle> {
        self.element_children(self.root()).next()
    }

    pub fn head(&self) -> Option<NodeHandle> {
        let html = self.document_element()?;
        self.first_child_with_tag(html, "head")
    }

    pub fn body(&self) -> Option<NodeHandle> {
        let html = self.document_element()?;
        self.first_child_with_tag(html, "body")
    }

    pub fn first_child_with_tag(&self, parent: NodeHandle, tag: &str) -> Option<NodeHandle> {
        self.element_children(parent)
            .find(|child| self.tag_name(*child) == Some(tag))
    }

    pub fn title(&self) -> Option<String> {
        let title = self.elements_by_tag_name("title").into_iter().next()?;
        let collapsed = collapse_whitespace(&self.text_content(title));
        if collapsed.is_empty() {
            None
        } else {
            Some(collapsed)
        }
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeHandle> {
        if id.is_empty() {
            return None;
        }
        self.descendants(self.root())
            .into_iter()
            .find(|node| self.get_attribute(*node, "id") == Some(id))
    }

    pub fn elements_by_tag_name(&self, tag: &str) -> Vec<NodeHandle> {
        let tag = tag.to_ascii_lowercase();
        self.descendants(self.root())
            .into_iter()
            .filter(|node| self.tag_name(*node) == Some(tag.as_str()))
            .collect()
    }

    /// 1-based position of `node` among its parent's element children that
    /// share its tag name.
    pub fn nth_of_type(&self, node: NodeHandle) -> Option<usize> {
        let tag = self.tag_name(node)?;
        let parent = self.parent(node)?;
        self.element_children(parent)
            .filter(|sibling| self.tag_name(*sibling) == Some(tag))
            .position(|sibling| sibling == node)
            .map(|position| position + 1)
    }

    pub fn attributes(&self, node: NodeHandle) -> &[Attribute] {
        self.element(node)
            .map(|element| element.attrs.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_attribute(&self, node: NodeHandle, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|element| element.attr(&name.to_ascii_lowercase()))
    }

    pub fn has_attribute(&self, node: NodeHandle, name: &str) -> bool {
        self.get_attribute(node, name).is_some()
    }

    pub fn set_attribute(&mut self, node: NodeHandle, name: &str, value: &str) -> EditorResult<()> {
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(EditorError::new(
                "dom.invalid_attribute",
                "attribute name must not be empty",
            ));
        }

        let element = self.element_mut(node)?;
        match element.attrs.iter_mut().find(|attr| attr.name == name) {
            Some(existing) => existing.value = value.to_owned(),
            None => element.attrs.push(Attribute::new(name, value)),
        }
        Ok(())
    }

    /// Removes `name`; reports whether the attribute was present.
    pub fn remove_attribute(&mut self, node: NodeHandle, name: &str) -> EditorResult<bool> {
        let name = name.to_ascii_lowercase();
        let element = self.element_mut(node)?;
        let before = element.attrs.len();
        element.attrs.retain(|attr| attr.name != name);
        Ok(element.attrs.len() != before)
    }

    pub fn class_list(&self, node: NodeHandle) -> Vec<&str> {
        self.get_attribute(node, "class")
            .map(|value| value.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, node: NodeHandle, token: &str) -> bool {
        self.class_list(node).contains(&token)
    }

    pub fn add_class(&mut self, node: NodeHandle, token: &str) -> EditorResult<()> {
        validate_class_token(token)?;
        let mut tokens: Vec<String> = self
            .class_list(node)
            .into_iter()
            .map(str::to_owned)
            .collect();
        if tokens.iter().any(|existing| existing == token) {
            // Still surface stale handles to the caller.
            self.element_mut(node)?;
            return Ok(());
        }
        tokens.push(token.to_owned());
        self.set_attribute(node, "class", &tokens.join(" "))
    }

    /// Removes `token`. The attribute itself is dropped once no tokens remain.
    pub fn remove_class(&mut self, node: NodeHandle, token: &str) -> EditorResult<()> {
        validate_class_token(token)?;
        let Some(current) = self.element_mut(node)?.attr("class").map(str::to_owned) else {
            return Ok(());
        };

        let remaining: Vec<&str> = current
            .split_ascii_whitespace()
            .filter(|existing| *existing != token)
            .collect();
        if remaining.is_empty() {
            self.remove_attribute(node, "class")?;
            return Ok(());
        }
        if remaining.len() == current.split_ascii_whitespace().count() {
            return Ok(());
        }
        let joined = remaining.join(" ");
        self.set_attribute(node, "class", &joined)
    }

    /// Flattened text of all descendant text nodes, in tree order.
    pub fn text_content(&self, node: NodeHandle) -> String {
        match self.data(node) {
            Some(NodeData::Text(text)) | Some(NodeData::Comment(text)) => text.clone(),
            Some(NodeData::Element(_)) | Some(NodeData::Document) => self
                .descendants(node)
                .into_iter()
                .filter_map(|descendant| self.data(descendant).and_then(NodeData::as_text))
                .collect(),
            Some(NodeData::Doctype { .. }) | None => String::new(),
        }
    }

    /// Replaces every child of `node` with a single text node. An empty
    /// string leaves the node without children.
    pub fn set_text_content(&mut self, node: NodeHandle, text: &str) -> EditorResult<()> {
        let index = self.resolve(node)?;
        match &mut self.nodes[index as usize].data {
            NodeData::Text(data) | NodeData::Comment(data) => {
                *data = text.to_owned();
                return Ok(());
            }
            NodeData::Doctype { .. } => return Ok(()),
            NodeData::Element(_) | NodeData::Document => {}
        }

        let children = std::mem::take(&mut self.nodes[index as usize].children);
        for child in children {
            self.nodes[child as usize].parent = None;
        }

        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(node, text_node)?;
        }
        Ok(())
    }

    pub fn create_element(&mut self, tag: &str) -> NodeHandle {
        self.push(NodeData::Element(ElementData::new(tag)))
    }

    pub fn create_element_with_attrs(&mut self, tag: &str, attrs: Vec<Attribute>) -> NodeHandle {
        let mut element = ElementData::new(tag);
        for attr in attrs {
            let name = attr.name.to_ascii_lowercase();
            // First occurrence wins, as in HTML tokenization.
            if element.attr(&name).is_none() {
                element.attrs.push(Attribute::new(name, attr.value));
            }
        }
        self.push(NodeData::Element(element))
    }

    pub fn create_text(&mut self, text: &str) -> NodeHandle {
        self.push(NodeData::Text(text.to_owned()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeHandle {
        self.push(NodeData::Comment(text.to_owned()))
    }

    pub fn create_doctype(&mut self, name: &str) -> NodeHandle {
        self.push(NodeData::Doctype {
            name: name.to_owned(),
        })
    }

    /// Appends `child` as the last child of `parent`, detaching it from its
    /// current parent first.
    pub fn append_child(&mut self, parent: NodeHandle, child: NodeHandle) -> EditorResult<()> {
        let parent_index = self.resolve(parent)?;
        let child_index = self.resolve(child)?;

        match self.nodes[parent_index as usize].data {
            NodeData::Element(ref element) if is_void_element(&element.tag) => {
                return Err(EditorError::new(
                    "dom.hierarchy",
                    format!("<{}> cannot have children", element.tag),
                ));
            }
            NodeData::Element(_) | NodeData::Document => {}
            _ => {
                return Err(EditorError::new(
                    "dom.hierarchy",
                    "only elements and the document node can have children",
                ));
            }
        }

        if child_index == 0 || child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(EditorError::new(
                "dom.hierarchy",
                "appending would create a cycle",
            ));
        }

        self.detach_index(child_index);
        self.nodes[child_index as usize].parent = Some(parent_index);
        self.nodes[parent_index as usize].children.push(child_index);
        Ok(())
    }

    pub fn detach(&mut self, node: NodeHandle) -> EditorResult<()> {
        let index = self.resolve(node)?;
        self.detach_index(index);
        Ok(())
    }

    fn detach_index(&mut self, index: u32) {
        let Some(parent) = self.nodes[index as usize].parent.take() else {
            return;
        };
        self.nodes[parent as usize]
            .children
            .retain(|child| *child != index);
    }

    fn push(&mut self, data: NodeData) -> NodeHandle {
        let index = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        self.nodes.push(Node::new(data));
        self.handle(index)
    }

    fn handle(&self, index: u32) -> NodeHandle {
        NodeHandle::new(self.generation, index)
    }

    fn slot(&self, node: NodeHandle) -> Option<&Node> {
        if node.generation() != self.generation {
            return None;
        }
        self.nodes.get(node.index())
    }

    fn resolve(&self, node: NodeHandle) -> EditorResult<u32> {
        if !self.contains(node) {
            return Err(EditorError::new(
                "dom.stale_handle",
                format!(
                    "node {} of generation {} does not belong to document generation {}",
                    node.index(),
                    node.generation(),
                    self.generation
                ),
            ));
        }
        Ok(node.index() as u32)
    }

    fn element_mut(&mut self, node: NodeHandle) -> EditorResult<&mut ElementData> {
        let index = self.resolve(node)?;
        match &mut self.nodes[index as usize].data {
            NodeData::Element(element) => Ok(element),
            _ => Err(EditorError::new(
                "dom.not_an_element",
                format!("node {index} is not an element"),
            )),
        }
    }
}

/// Iterator over the ancestors of a node.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeHandle>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

fn validate_class_token(token: &str) -> EditorResult<()> {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(EditorError::new(
            "dom.invalid_token",
            format!("`{token}` is not a valid class token"),
        ));
    }
    Ok(())
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
