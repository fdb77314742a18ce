//! Owned XML tree types.
//!
//! Every node owns its children, so `Clone` is a deep copy. Whitespace
//! between elements is kept as ordinary [`Node::Text`] children, which lets
//! the writer reproduce the exact layout a tree was built or parsed with.

/// An attribute on an element, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, stored unescaped.
    Text(String),
    CData(String),
    Comment(String),
    /// `<?target content?>`
    ProcessingInstruction { target: String, content: String },
    DocType(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// An element with its attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Look up an attribute value by its qualified name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing an existing value with the same key.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.key == key) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { key, value }),
        }
    }

    /// Builder form of [`set_attr`](Self::set_attr).
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Text preceding the first non-text child.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .map_while(|n| match n {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace the leading text of this element, leaving child elements alone.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let leading = self
            .children
            .iter()
            .take_while(|n| matches!(n, Node::Text(_) | Node::CData(_)))
            .count();
        self.children.drain(..leading);
        let text = text.into();
        if !text.is_empty() {
            self.children.insert(0, Node::Text(text));
        }
    }

    /// Builder form of [`set_text`](Self::set_text).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Child elements, skipping text, comments and instructions.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// First element matching a slash-separated path of child names,
    /// relative to this element (e.g. `"title/p"`).
    pub fn find(&self, path: &str) -> Option<&Element> {
        let steps = split_path(path);
        let mut found = None;
        walk(self, &steps, &mut |e| {
            found = Some(e);
            false
        });
        found
    }

    /// All elements matching a slash-separated path, in document order.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let steps = split_path(path);
        let mut found = Vec::new();
        walk(self, &steps, &mut |e| {
            found.push(e);
            true
        });
        found
    }

    /// Mutable access to the first element matching `path`.
    pub fn find_mut(&mut self, path: &str) -> Option<&mut Element> {
        let steps = split_path(path);
        let indices = locate(self, &steps)?;
        let mut current = self;
        for index in indices {
            current = current.children.get_mut(index)?.as_element_mut()?;
        }
        Some(current)
    }

    /// Mutable access to the `n`th element matching `path`.
    pub fn find_nth_mut(&mut self, path: &str, n: usize) -> Option<&mut Element> {
        let steps = split_path(path);
        let mut all = Vec::new();
        locate_all(self, &steps, &mut Vec::new(), &mut all);
        let indices = all.into_iter().nth(n)?;
        let mut current = self;
        for index in indices {
            current = current.children.get_mut(index)?.as_element_mut()?;
        }
        Some(current)
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(t) | Node::CData(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
            _ => {}
        }
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

fn step_matches(element: &Element, step: &str) -> bool {
    step == "*" || element.name == step
}

/// Depth-first walk over path matches. The visitor returns `false` to stop.
fn walk<'a>(element: &'a Element, steps: &[&str], visit: &mut dyn FnMut(&'a Element) -> bool) -> bool {
    let Some((step, rest)) = steps.split_first() else {
        return visit(element);
    };
    for child in element.child_elements() {
        if step_matches(child, step) && !walk(child, rest, visit) {
            return false;
        }
    }
    true
}

fn locate(element: &Element, steps: &[&str]) -> Option<Vec<usize>> {
    let Some((step, rest)) = steps.split_first() else {
        return Some(Vec::new());
    };
    for (index, child) in element.children.iter().enumerate() {
        if let Node::Element(child) = child
            && step_matches(child, step)
            && let Some(mut tail) = locate(child, rest)
        {
            tail.insert(0, index);
            return Some(tail);
        }
    }
    None
}

fn locate_all(element: &Element, steps: &[&str], prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    let Some((step, rest)) = steps.split_first() else {
        out.push(prefix.clone());
        return;
    };
    for (index, child) in element.children.iter().enumerate() {
        if let Node::Element(child) = child
            && step_matches(child, step)
        {
            prefix.push(index);
            locate_all(child, rest, prefix, out);
            prefix.pop();
        }
    }
}

/// A parsed document: prolog nodes, the root element, and anything after it,
/// all kept in [`children`](Self::children) in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlDocument {
    pub children: Vec<Node>,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<&Element> {
        self.children.iter().find_map(Node::as_element)
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.children.iter_mut().find_map(Node::as_element_mut)
    }

    /// Insert a processing instruction (followed by a newline) directly
    /// before the root element.
    pub fn insert_before_root(&mut self, target: &str, content: &str) {
        let at = self
            .children
            .iter()
            .position(|n| matches!(n, Node::Element(_)))
            .unwrap_or(self.children.len());
        self.children.splice(
            at..at,
            [
                Node::ProcessingInstruction {
                    target: target.to_string(),
                    content: content.to_string(),
                },
                Node::Text("\n".to_string()),
            ],
        );
    }
}
