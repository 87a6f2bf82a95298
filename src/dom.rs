//! Veränderbarer XML-Baum für den Merge.
//!
//! `roxmltree` liefert nur einen unveränderlichen Baum. Der Merge muss aber
//! Knoten zwischen Dokumenten kopieren, einfügen und entfernen, daher wird
//! das geparste Dokument in eine Arena (`Vec<NodeData>`) übertragen.
//!
//! Knoten werden nie freigegeben: `remove_child` hängt einen Knoten nur aus,
//! `NodeId`s bleiben bis zum Ende des Dokuments gültig.

use roxmltree::ParsingOptions;

/// Namespace des `xml:` Prefix (immer implizit gebunden).
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Index eines Knotens in der Arena eines [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Name eines Elements oder Attributs, so wie er im Dokument stand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlName {
    /// Prefix im Quelltext (`None` für Default-Namespace bzw. ohne Namespace).
    pub prefix: Option<String>,
    pub local_name: String,
    /// Aufgelöster Namespace-URI.
    pub namespace: Option<String>,
}

impl XmlName {
    pub fn new(prefix: Option<&str>, local_name: &str, namespace: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
            namespace: namespace.map(str::to_string),
        }
    }

    /// Qualifizierter Name (`prefix:local` oder `local`).
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// Vergleicht Namespace und lokalen Namen (Prefix egal).
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace)
    }
}

/// `xmlns` bzw. `xmlns:prefix` Deklaration auf einem Element.
///
/// Ein leerer `uri` beim Default-Namespace steht für `xmlns=""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: XmlName,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: XmlName,
    /// Nur die auf diesem Element geschriebenen Deklarationen.
    pub namespaces: Vec<NamespaceDecl>,
    pub attributes: Vec<Attribute>,
}

impl Element {
    /// Wert eines Attributs ohne Namespace (z.B. `schemaLocation`).
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.is_none() && a.name.local_name == local_name)
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Unsichtbarer Wurzelknoten (Index 0).
    Document,
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, value: Option<String> },
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-basiertes XML-Dokument.
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
    /// Leeres Dokument (nur Wurzelknoten).
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parsed XML-Text. DTDs sind erlaubt, Entities werden aufgelöst.
    pub fn parse(text: &str) -> Result<Self, roxmltree::Error> {
        let opts = ParsingOptions { allow_dtd: true, ..Default::default() };
        let source = roxmltree::Document::parse_with_options(text, opts)?;
        let mut doc = Self::new();
        let root = doc.document_node();
        for child in source.root().children() {
            doc.copy_from_source(child, root);
        }
        Ok(doc)
    }

    fn copy_from_source(&mut self, node: roxmltree::Node, parent: NodeId) {
        let kind = match node.node_type() {
            roxmltree::NodeType::Element => NodeKind::Element(element_from_source(&node)),
            roxmltree::NodeType::Text => NodeKind::Text(node.text().unwrap_or_default().to_string()),
            roxmltree::NodeType::Comment => {
                NodeKind::Comment(node.text().unwrap_or_default().to_string())
            }
            roxmltree::NodeType::PI => match node.pi() {
                Some(pi) => NodeKind::ProcessingInstruction {
                    target: pi.target.to_string(),
                    value: pi.value.map(str::to_string),
                },
                None => return,
            },
            roxmltree::NodeType::Root => return,
        };
        let id = self.push(kind);
        self.append_child(parent, id);
        for child in node.children() {
            self.copy_from_source(child, id);
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData { kind, parent: None, children: Vec::new() });
        NodeId(self.nodes.len() - 1)
    }

    pub fn document_node(&self) -> NodeId {
        NodeId(0)
    }

    /// Erstes Element unterhalb des Wurzelknotens.
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.document_node())
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Prüft Namespace und lokalen Namen eines Elements.
    pub fn is_element(&self, id: NodeId, namespace: &str, local_name: &str) -> bool {
        self.element(id).is_some_and(|e| e.name.is(namespace, local_name))
    }

    /// Direkte Kind-Elemente mit passendem Namen, als Snapshot.
    ///
    /// Der Snapshot darf während der Iteration verändert werden, ohne dass
    /// sich die Auswahl verschiebt.
    pub fn child_elements(&self, id: NodeId, namespace: &str, local_name: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c, namespace, local_name))
            .collect()
    }

    pub fn has_element_children(&self, id: NodeId) -> bool {
        self.children(id).iter().any(|&c| self.element(c).is_some())
    }

    /// Alle Knoten unterhalb von `id` in Dokumentreihenfolge (ohne `id`).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn attribute(&self, id: NodeId, local_name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attribute(local_name))
    }

    /// Entfernt ein Attribut ohne Namespace. Gibt `true` zurück wenn es existierte.
    pub fn remove_attribute(&mut self, id: NodeId, local_name: &str) -> bool {
        let Some(element) = self.element_mut(id) else {
            return false;
        };
        let before = element.attributes.len();
        element
            .attributes
            .retain(|a| !(a.name.namespace.is_none() && a.name.local_name == local_name));
        element.attributes.len() != before
    }

    /// Erzeugt ein neues, noch nicht eingehängtes Element.
    pub fn create_element(&mut self, name: XmlName) -> NodeId {
        self.push(NodeKind::Element(Element {
            name,
            namespaces: Vec::new(),
            attributes: Vec::new(),
        }))
    }

    /// Hängt `child` aus seinem bisherigen Elternknoten aus.
    fn detach(&mut self, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
    }

    fn insert_at(&mut self, parent: NodeId, child: NodeId, index: usize) {
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let len = self.nodes[parent.0].children.len();
        self.insert_at(parent, child, len);
    }

    /// Fügt `child` vor `reference` ein; ohne Referenz wird angehängt.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.detach(child);
        let index = reference
            .and_then(|r| self.position(parent, r))
            .unwrap_or(self.nodes[parent.0].children.len());
        self.insert_at(parent, child, index);
    }

    /// Fügt `child` direkt hinter `reference` ein; ohne Referenz an erster Stelle.
    pub fn insert_after(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.detach(child);
        let index = match reference.and_then(|r| self.position(parent, r)) {
            Some(pos) => pos + 1,
            None => 0,
        };
        self.insert_at(parent, child, index);
    }

    /// Hängt `child` aus `parent` aus. Gibt `true` zurück wenn es ein Kind war.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.nodes[child.0].parent != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    fn position(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.nodes[parent.0].children.iter().position(|&c| c == child)
    }

    /// Tiefe Kopie eines Knotens aus `source` in dieses Dokument.
    ///
    /// Die Kopie ist nicht eingehängt. Ein kopiertes Element trägt alle an
    /// seiner Quellposition gültigen Namespace-Bindungen, damit Prefixe in
    /// Element-Namen und QName-Werten (`type="tns:Foo"`) auflösbar bleiben.
    /// Ein am Zielort geerbter Default-Namespace wird erst beim Einhängen
    /// behandelt, siehe [`Document::undeclare_inherited_default`].
    pub fn import_node(&mut self, source: &Document, node: NodeId) -> NodeId {
        let copy = self.copy_subtree(source, node);
        let namespaces = source.in_scope_namespaces(node);
        if let Some(element) = self.element_mut(copy) {
            element.namespaces = namespaces;
        }
        copy
    }

    /// Setzt `xmlns=""` auf `id`, wenn das Element selbst keinen
    /// Default-Namespace bindet, der Elternknoten aber einen vererbt.
    ///
    /// Ohne Default-Bindung an der Quelle gehören Elemente ohne Prefix und
    /// unpräfixierte QName-Werte (`type="T"`) zu keinem Namespace; das muss
    /// am neuen Ort so bleiben. Gibt `true` zurück wenn deklariert wurde.
    pub fn undeclare_inherited_default(&mut self, id: NodeId) -> bool {
        let inherits_default = self
            .parent(id)
            .is_some_and(|p| self.in_scope_namespaces(p).iter().any(|d| d.prefix.is_none()));
        let Some(element) = self.element_mut(id) else {
            return false;
        };
        if !inherits_default || element.namespaces.iter().any(|d| d.prefix.is_none()) {
            return false;
        }
        element.namespaces.push(NamespaceDecl { prefix: None, uri: String::new() });
        true
    }

    fn copy_subtree(&mut self, source: &Document, node: NodeId) -> NodeId {
        let copy = self.push(source.kind(node).clone());
        for &child in source.children(node) {
            let child_copy = self.copy_subtree(source, child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Alle an `id` gültigen Namespace-Bindungen (innere überschreiben äußere).
    ///
    /// Ein per `xmlns=""` aufgehobener Default-Namespace taucht nicht auf.
    pub fn in_scope_namespaces(&self, id: NodeId) -> Vec<NamespaceDecl> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(element) = self.element(node) {
                chain.push(element);
            }
            current = self.parent(node);
        }

        let mut scope: Vec<NamespaceDecl> = Vec::new();
        for element in chain.into_iter().rev() {
            for decl in &element.namespaces {
                match scope.iter_mut().find(|d| d.prefix == decl.prefix) {
                    Some(existing) => existing.uri.clone_from(&decl.uri),
                    None => scope.push(decl.clone()),
                }
            }
        }
        scope.retain(|d| !d.uri.is_empty());
        scope
    }

    /// Sucht einen an `id` gebundenen Prefix für `uri`.
    ///
    /// `Some(None)` bedeutet Default-Namespace, `None` dass der URI nicht gebunden ist.
    pub fn lookup_prefix(&self, id: NodeId, uri: &str) -> Option<Option<String>> {
        self.in_scope_namespaces(id)
            .into_iter()
            .find(|d| d.uri == uri)
            .map(|d| d.prefix)
    }
}

/// Überträgt Name, Attribute und eigene Namespace-Deklarationen eines
/// roxmltree-Elements.
fn element_from_source(node: &roxmltree::Node) -> Element {
    let tag = node.tag_name();
    let namespace = tag.namespace().filter(|uri| !uri.is_empty());
    let prefix = namespace.and_then(|uri| node.lookup_prefix(uri));
    let name = XmlName::new(prefix, tag.name(), namespace);

    let attributes = node
        .attributes()
        .map(|attr| {
            let prefix = attr.namespace().and_then(|uri| attribute_prefix(node, uri));
            Attribute {
                name: XmlName::new(prefix, attr.name(), attr.namespace()),
                value: attr.value().to_string(),
            }
        })
        .collect();

    Element { name, namespaces: declared_namespaces(node), attributes }
}

/// Attribute haben keinen Default-Namespace, daher nur benannte Prefixe.
fn attribute_prefix<'input>(node: &roxmltree::Node<'_, 'input>, uri: &str) -> Option<&'input str> {
    if uri == XML_NS {
        return Some("xml");
    }
    node.namespaces()
        .find(|ns| ns.uri() == uri && ns.name().is_some())
        .and_then(|ns| ns.name())
}

/// roxmltree kennt nur die gültigen Bindungen eines Knotens. Deklariert ist,
/// was sich gegenüber dem Eltern-Element geändert hat.
fn declared_namespaces(node: &roxmltree::Node) -> Vec<NamespaceDecl> {
    let parent = node.parent_element();
    let in_parent = |name: Option<&str>, uri: &str| {
        parent.is_some_and(|p| p.namespaces().any(|ns| ns.name() == name && ns.uri() == uri))
    };

    let mut decls: Vec<NamespaceDecl> = node
        .namespaces()
        .filter(|ns| ns.name() != Some("xml") && !ns.uri().is_empty())
        .filter(|ns| !in_parent(ns.name(), ns.uri()))
        .map(|ns| NamespaceDecl {
            prefix: ns.name().map(str::to_string),
            uri: ns.uri().to_string(),
        })
        .collect();

    if let Some(p) = parent
        && binds_default(&p)
        && !binds_default(node)
    {
        decls.push(NamespaceDecl { prefix: None, uri: String::new() });
    }
    decls
}

fn binds_default(node: &roxmltree::Node) -> bool {
    node.namespaces().any(|ns| ns.name().is_none() && !ns.uri().is_empty())
}
