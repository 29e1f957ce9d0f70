//! Typed syntax tree for scanned Python modules.
//!
//! The tree-sitter concrete tree is lowered into a small closed set of
//! statement and expression kinds. Statements live in an arena so every node
//! can point back at its syntactic parent; expressions are plain owned trees.

pub mod builder;
pub mod literal;

pub use builder::build_tree;

/// Index of a statement inside a [`SyntaxTree`]
pub type NodeId = usize;

/// Root node id of every tree
pub const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    stmt: Stmt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Module {
        body: Vec<NodeId>,
    },
    ClassDef {
        name: String,
        decorators: Vec<Expr>,
        body: Vec<NodeId>,
    },
    FunctionDef {
        name: String,
        decorators: Vec<Expr>,
        returns: Option<Expr>,
        body: Vec<NodeId>,
        is_async: bool,
    },
    /// `target: annotation [= value]`
    AnnAssign {
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
    },
    Return {
        value: Option<Expr>,
    },
    Expr(Expr),
    /// Any statement that owns nested blocks (`if`, `for`, `try`, `with`, ...)
    Compound {
        body: Vec<NodeId>,
    },
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        slice: Box<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    Constant(Constant),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    /// Source text of a form the tree does not model
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    /// `None` for `**kwargs` splats
    pub arg: Option<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Str(String),
    Bytes(String),
    Int(String),
    Float(String),
    Complex(String),
    Bool(bool),
    None,
    Ellipsis,
}

impl SyntaxTree {
    pub(crate) fn with_root() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                stmt: Stmt::Module { body: Vec::new() },
            }],
        }
    }

    pub(crate) fn push(&mut self, parent: NodeId, stmt: Stmt) -> NodeId {
        self.nodes.push(Node {
            parent: Some(parent),
            stmt,
        });
        self.nodes.len() - 1
    }

    pub(crate) fn set_stmt(&mut self, id: NodeId, stmt: Stmt) {
        self.nodes[id].stmt = stmt;
    }

    pub fn stmt(&self, id: NodeId) -> &Stmt {
        &self.nodes[id].stmt
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn module_body(&self) -> &[NodeId] {
        self.stmt(ROOT).body()
    }

    /// True when the statement sits directly in the module body
    pub fn is_top_level(&self, id: NodeId) -> bool {
        self.parent(id)
            .map(|parent| matches!(self.stmt(parent), Stmt::Module { .. }))
            .unwrap_or(false)
    }

    /// Pre-order traversal of every statement, root first
    pub fn walk(&self) -> Vec<NodeId> {
        self.walk_from(ROOT)
    }

    /// Pre-order traversal of `start` and all statements nested under it
    pub fn walk_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.stmt(id).body().iter().rev().copied());
        }
        order
    }
}

impl Stmt {
    pub fn body(&self) -> &[NodeId] {
        match self {
            Stmt::Module { body }
            | Stmt::ClassDef { body, .. }
            | Stmt::FunctionDef { body, .. }
            | Stmt::Compound { body } => body,
            Stmt::AnnAssign { .. } | Stmt::Return { .. } | Stmt::Expr(_) | Stmt::Other => &[],
        }
    }

    /// Returns the docstring literal when the first body statement is a string
    pub fn docstring<'a>(&self, tree: &'a SyntaxTree) -> Option<&'a str> {
        let first = *self.body().first()?;
        match tree.stmt(first) {
            Stmt::Expr(Expr::Constant(Constant::Str(text))) => Some(text),
            _ => None,
        }
    }
}

impl Expr {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Expr::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Constant(Constant::Str(text)) => Some(text),
            _ => None,
        }
    }
}

impl Keyword {
    pub fn is(&self, name: &str) -> bool {
        self.arg.as_deref() == Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> SyntaxTree {
        let mut tree = SyntaxTree::with_root();
        let class = tree.push(
            ROOT,
            Stmt::ClassDef {
                name: "A".into(),
                decorators: vec![],
                body: vec![],
            },
        );
        let doc = tree.push(class, Stmt::Expr(Expr::Constant(Constant::Str("Doc".into()))));
        let method = tree.push(
            class,
            Stmt::FunctionDef {
                name: "run".into(),
                decorators: vec![],
                returns: None,
                body: vec![],
                is_async: false,
            },
        );
        tree.set_stmt(
            class,
            Stmt::ClassDef {
                name: "A".into(),
                decorators: vec![],
                body: vec![doc, method],
            },
        );
        let func = tree.push(ROOT, Stmt::Other);
        tree.set_stmt(ROOT, Stmt::Module { body: vec![class, func] });
        tree
    }

    #[test]
    fn test_walk_is_preorder() {
        let tree = sample_tree();
        assert_eq!(tree.walk(), vec![0, 1, 2, 3, 4]);
        assert_eq!(tree.walk_from(1), vec![1, 2, 3]);
    }

    #[test]
    fn test_top_level_uses_parent() {
        let tree = sample_tree();
        assert!(tree.is_top_level(1));
        assert!(tree.is_top_level(4));
        assert!(!tree.is_top_level(3));
        assert!(!tree.is_top_level(ROOT));
        assert_eq!(tree.parent(3), Some(1));
    }

    #[test]
    fn test_docstring() {
        let tree = sample_tree();
        assert_eq!(tree.stmt(1).docstring(&tree), Some("Doc"));
        assert_eq!(tree.stmt(3).docstring(&tree), None);
    }
}
