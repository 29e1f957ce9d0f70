//! Lowers a tree-sitter Python tree into a [`SyntaxTree`].
//!
//! Statements are pushed into the arena before their children are lowered so
//! each child records its parent id at construction time.

use tree_sitter::Node;

use super::literal::{complex_literal, decode_string, float_literal, int_literal};
use super::{Constant, Expr, Keyword, NodeId, Stmt, SyntaxTree, ROOT};

/// Builds the typed tree for an already-validated parse
pub fn build_tree(root: Node<'_>, source: &str) -> SyntaxTree {
    let mut lowering = Lowering {
        source: source.as_bytes(),
        tree: SyntaxTree::with_root(),
    };
    let body = lowering.lower_statements(ROOT, root);
    lowering.tree.set_stmt(ROOT, Stmt::Module { body });
    lowering.tree
}

struct Lowering<'s> {
    source: &'s [u8],
    tree: SyntaxTree,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn field_text(&self, node: Node<'_>, field: &str) -> String {
        node.child_by_field_name(field)
            .map(|child| self.text(child).to_string())
            .unwrap_or_default()
    }

    fn lower_statements(&mut self, parent: NodeId, container: Node<'_>) -> Vec<NodeId> {
        named_children(container)
            .into_iter()
            .filter_map(|child| self.lower_stmt(parent, child))
            .collect()
    }

    fn lower_stmt(&mut self, parent: NodeId, node: Node<'_>) -> Option<NodeId> {
        match node.kind() {
            "comment" => None,
            "decorated_definition" => {
                let decorators = named_children(node)
                    .into_iter()
                    .filter(|child| child.kind() == "decorator")
                    .map(|decorator| match first_named(decorator) {
                        Some(expr) => self.lower_expr(expr),
                        None => Expr::Unsupported(self.text(decorator).to_string()),
                    })
                    .collect();
                let definition = node.child_by_field_name("definition")?;
                self.lower_definition(parent, definition, decorators)
            }
            "class_definition" | "function_definition" => {
                self.lower_definition(parent, node, Vec::new())
            }
            "expression_statement" => {
                let stmt = self.lower_expression_statement(node);
                Some(self.tree.push(parent, stmt))
            }
            "return_statement" => {
                let value = first_named(node).map(|value| self.lower_expr(value));
                Some(self.tree.push(parent, Stmt::Return { value }))
            }
            _ => {
                let id = self.tree.push(parent, Stmt::Compound { body: Vec::new() });
                let body = self.lower_nested_blocks(id, node);
                let stmt = if body.is_empty() {
                    Stmt::Other
                } else {
                    Stmt::Compound { body }
                };
                self.tree.set_stmt(id, stmt);
                Some(id)
            }
        }
    }

    fn lower_definition(
        &mut self,
        parent: NodeId,
        node: Node<'_>,
        decorators: Vec<Expr>,
    ) -> Option<NodeId> {
        let name = self.field_text(node, "name");
        let id = self.tree.push(parent, Stmt::Other);
        let body = match node.child_by_field_name("body") {
            Some(block) => self.lower_statements(id, block),
            None => Vec::new(),
        };

        let stmt = match node.kind() {
            "class_definition" => Stmt::ClassDef {
                name,
                decorators,
                body,
            },
            "function_definition" => {
                let returns = node
                    .child_by_field_name("return_type")
                    .map(|annotation| self.lower_expr(annotation));
                let mut cursor = node.walk();
                let is_async = node
                    .children(&mut cursor)
                    .take_while(|child| child.kind() != "def")
                    .any(|child| child.kind() == "async");
                Stmt::FunctionDef {
                    name,
                    decorators,
                    returns,
                    body,
                    is_async,
                }
            }
            _ => Stmt::Other,
        };
        self.tree.set_stmt(id, stmt);
        Some(id)
    }

    fn lower_expression_statement(&mut self, node: Node<'_>) -> Stmt {
        let children = named_children(node);
        match children.as_slice() {
            [single] if single.kind() == "assignment" => self.lower_assignment(*single),
            [single] if single.kind() == "augmented_assignment" => Stmt::Other,
            [single] => Stmt::Expr(self.lower_expr(*single)),
            [] => Stmt::Other,
            many => Stmt::Expr(Expr::Tuple(
                many.iter().map(|child| self.lower_expr(*child)).collect(),
            )),
        }
    }

    fn lower_assignment(&mut self, node: Node<'_>) -> Stmt {
        let (Some(left), Some(annotation)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("type"),
        ) else {
            return Stmt::Other;
        };

        Stmt::AnnAssign {
            target: self.lower_expr(left),
            annotation: self.lower_expr(annotation),
            value: node
                .child_by_field_name("right")
                .map(|value| self.lower_expr(value)),
        }
    }

    /// Collects statements from every block owned by a compound statement,
    /// descending through its clauses (`elif`, `else`, `except`, `case`, ...)
    fn lower_nested_blocks(&mut self, parent: NodeId, node: Node<'_>) -> Vec<NodeId> {
        let mut body = Vec::new();
        for child in named_children(node) {
            if child.kind() == "block" {
                body.extend(self.lower_statements(parent, child));
            } else if child.kind().ends_with("_clause") {
                body.extend(self.lower_nested_blocks(parent, child));
            }
        }
        body
    }

    fn lower_expr(&mut self, node: Node<'_>) -> Expr {
        match node.kind() {
            "identifier" => Expr::Name(self.text(node).to_string()),
            "attribute" => match node.child_by_field_name("object") {
                Some(object) => Expr::Attribute {
                    value: Box::new(self.lower_expr(object)),
                    attr: self.field_text(node, "attribute"),
                },
                None => self.unsupported(node),
            },
            "subscript" => {
                let Some(value) = node.child_by_field_name("value") else {
                    return self.unsupported(node);
                };
                let mut cursor = node.walk();
                let params: Vec<Node<'_>> =
                    node.children_by_field_name("subscript", &mut cursor).collect();
                self.subscript(value, params)
            }
            "generic_type" => {
                let children = named_children(node);
                match children.as_slice() {
                    [base, parameters] if parameters.kind() == "type_parameter" => {
                        self.subscript(*base, named_children(*parameters))
                    }
                    _ => self.unsupported(node),
                }
            }
            "member_type" => {
                let children = named_children(node);
                match children.as_slice() {
                    [base, attr] => Expr::Attribute {
                        value: Box::new(self.lower_expr(*base)),
                        attr: self.text(*attr).to_string(),
                    },
                    _ => self.unsupported(node),
                }
            }
            "type" | "parenthesized_expression" => match first_named(node) {
                Some(inner) => self.lower_expr(inner),
                None => self.unsupported(node),
            },
            "call" => self.lower_call(node),
            "string" => match decode_string(self.text(node)) {
                Some(constant) => Expr::Constant(constant),
                None => self.unsupported(node),
            },
            "concatenated_string" => self.lower_concatenated(node),
            "integer" | "float" => Expr::Constant(self.number(node, false)),
            "true" => Expr::Constant(Constant::Bool(true)),
            "false" => Expr::Constant(Constant::Bool(false)),
            "none" => Expr::Constant(Constant::None),
            "ellipsis" => Expr::Constant(Constant::Ellipsis),
            "unary_operator" => {
                let operator = node
                    .child_by_field_name("operator")
                    .map(|op| self.text(op))
                    .unwrap_or("");
                match node.child_by_field_name("argument") {
                    Some(argument)
                        if operator == "-"
                            && matches!(argument.kind(), "integer" | "float") =>
                    {
                        Expr::Constant(self.number(argument, true))
                    }
                    _ => self.unsupported(node),
                }
            }
            "tuple" | "expression_list" => Expr::Tuple(self.lower_all(node)),
            "list" => Expr::List(self.lower_all(node)),
            "dictionary" => {
                let entries = named_children(node)
                    .into_iter()
                    .map(|entry| match entry.kind() {
                        "pair" => {
                            let key = entry
                                .child_by_field_name("key")
                                .map(|key| self.lower_expr(key))
                                .unwrap_or_else(|| self.unsupported(entry));
                            let value = entry
                                .child_by_field_name("value")
                                .map(|value| self.lower_expr(value))
                                .unwrap_or_else(|| self.unsupported(entry));
                            (key, value)
                        }
                        _ => {
                            let value = first_named(entry)
                                .map(|value| self.lower_expr(value))
                                .unwrap_or_else(|| self.unsupported(entry));
                            (self.unsupported(entry), value)
                        }
                    })
                    .collect();
                Expr::Dict(entries)
            }
            _ => self.unsupported(node),
        }
    }

    fn subscript(&mut self, value: Node<'_>, params: Vec<Node<'_>>) -> Expr {
        let mut params: Vec<Expr> = params.into_iter().map(|p| self.lower_expr(p)).collect();
        let slice = if params.len() == 1 {
            params.remove(0)
        } else {
            Expr::Tuple(params)
        };
        Expr::Subscript {
            value: Box::new(self.lower_expr(value)),
            slice: Box::new(slice),
        }
    }

    fn lower_call(&mut self, node: Node<'_>) -> Expr {
        let Some(function) = node.child_by_field_name("function") else {
            return self.unsupported(node);
        };
        let func = Box::new(self.lower_expr(function));
        let mut args = Vec::new();
        let mut keywords = Vec::new();

        match node.child_by_field_name("arguments") {
            Some(arguments) if arguments.kind() == "argument_list" => {
                for argument in named_children(arguments) {
                    match argument.kind() {
                        "keyword_argument" => keywords.push(Keyword {
                            arg: Some(self.field_text(argument, "name")),
                            value: argument
                                .child_by_field_name("value")
                                .map(|value| self.lower_expr(value))
                                .unwrap_or_else(|| self.unsupported(argument)),
                        }),
                        "dictionary_splat" => keywords.push(Keyword {
                            arg: None,
                            value: first_named(argument)
                                .map(|value| self.lower_expr(value))
                                .unwrap_or_else(|| self.unsupported(argument)),
                        }),
                        _ => args.push(self.lower_expr(argument)),
                    }
                }
            }
            // A bare generator argument: `f(x for x in xs)`
            Some(other) => args.push(self.unsupported(other)),
            None => {}
        }

        Expr::Call {
            func,
            args,
            keywords,
        }
    }

    fn lower_concatenated(&mut self, node: Node<'_>) -> Expr {
        let mut text = String::new();
        let mut bytes = String::new();
        let (mut saw_str, mut saw_bytes) = (false, false);

        for part in named_children(node) {
            match decode_string(self.text(part)) {
                Some(Constant::Str(value)) => {
                    saw_str = true;
                    text.push_str(&value);
                }
                Some(Constant::Bytes(value)) => {
                    saw_bytes = true;
                    bytes.push_str(&value);
                }
                _ => return self.unsupported(node),
            }
        }

        match (saw_str, saw_bytes) {
            (true, true) => self.unsupported(node),
            (_, true) => Expr::Constant(Constant::Bytes(bytes)),
            _ => Expr::Constant(Constant::Str(text)),
        }
    }

    fn number(&self, node: Node<'_>, negative: bool) -> Constant {
        let text = self.text(node);
        if text.ends_with(['j', 'J']) {
            Constant::Complex(complex_literal(text, negative))
        } else if node.kind() == "float" {
            Constant::Float(float_literal(text, negative))
        } else {
            Constant::Int(int_literal(text, negative))
        }
    }

    fn lower_all(&mut self, node: Node<'_>) -> Vec<Expr> {
        named_children(node)
            .into_iter()
            .map(|child| self.lower_expr(child))
            .collect()
    }

    fn unsupported(&self, node: Node<'_>) -> Expr {
        Expr::Unsupported(self.text(node).to_string())
    }
}

/// Named children without interleaved comments
fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    named_children(node).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(source: &str) -> SyntaxTree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        assert!(!tree.root_node().has_error());
        build_tree(tree.root_node(), source)
    }

    fn only_stmt(tree: &SyntaxTree) -> &Stmt {
        tree.stmt(tree.module_body()[0])
    }

    fn annotation_of(source: &str) -> Expr {
        let tree = build(source);
        match only_stmt(&tree) {
            Stmt::AnnAssign { annotation, .. } => annotation.clone(),
            other => panic!("expected annotated assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_decorated_class_with_fields() {
        let source = r#"
@invocation("add", title="Add")
class AddInvocation(BaseInvocation):
    """Adds numbers."""
    a: int = InputField(default=0, description="First")
    b: int
    def invoke(self, context):
        return IntegerOutput(value=self.a + self.b)
"#;
        let tree = build(source);
        let Stmt::ClassDef {
            name,
            decorators,
            body,
        } = only_stmt(&tree)
        else {
            panic!("expected class");
        };
        assert_eq!(name, "AddInvocation");
        assert_eq!(decorators.len(), 1);
        assert!(matches!(&decorators[0], Expr::Call { func, .. } if func.as_name() == Some("invocation")));
        assert_eq!(body.len(), 4);
        assert_eq!(only_stmt(&tree).docstring(&tree), Some("Adds numbers."));

        match tree.stmt(body[2]) {
            Stmt::AnnAssign { target, value, .. } => {
                assert_eq!(target.as_name(), Some("b"));
                assert!(value.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(tree.stmt(body[3]), Stmt::FunctionDef { name, .. } if name == "invoke"));
        assert_eq!(tree.parent(body[3]), Some(tree.module_body()[0]));
    }

    #[test]
    fn test_subscript_with_many_params_lowers_to_tuple_slice() {
        let annotation = annotation_of("x: Dict[str, int]\n");
        assert_eq!(
            annotation,
            Expr::Subscript {
                value: Box::new(Expr::Name("Dict".into())),
                slice: Box::new(Expr::Tuple(vec![
                    Expr::Name("str".into()),
                    Expr::Name("int".into()),
                ])),
            }
        );
    }

    #[test]
    fn test_attribute_annotation() {
        let annotation = annotation_of("x: typing.Optional[int]\n");
        match annotation {
            Expr::Subscript { value, slice } => {
                assert!(matches!(*value, Expr::Attribute { ref attr, .. } if attr == "Optional"));
                assert_eq!(*slice, Expr::Name("int".into()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_union_annotation_is_unsupported() {
        assert!(matches!(annotation_of("x: int | None\n"), Expr::Unsupported(_)));
    }

    #[test]
    fn test_literals() {
        let tree = build("x: T = f(-3, 2.50, 0x10, 'a' \"b\", None, True, ..., [1], {'k': 2})\n");
        let Stmt::AnnAssign {
            value: Some(Expr::Call { args, .. }),
            ..
        } = only_stmt(&tree)
        else {
            panic!("expected call value");
        };
        assert_eq!(args[0], Expr::Constant(Constant::Int("-3".into())));
        assert_eq!(args[1], Expr::Constant(Constant::Float("2.5".into())));
        assert_eq!(args[2], Expr::Constant(Constant::Int("16".into())));
        assert_eq!(args[3], Expr::Constant(Constant::Str("ab".into())));
        assert_eq!(args[4], Expr::Constant(Constant::None));
        assert_eq!(args[5], Expr::Constant(Constant::Bool(true)));
        assert_eq!(args[6], Expr::Constant(Constant::Ellipsis));
        assert_eq!(args[7], Expr::List(vec![Expr::Constant(Constant::Int("1".into()))]));
        assert_eq!(
            args[8],
            Expr::Dict(vec![(
                Expr::Constant(Constant::Str("k".into())),
                Expr::Constant(Constant::Int("2".into()))
            )])
        );
    }

    #[test]
    fn test_keywords_and_splats() {
        let tree = build("x: T = Field(1, description='d', **extra)\n");
        let Stmt::AnnAssign {
            value: Some(Expr::Call { args, keywords, .. }),
            ..
        } = only_stmt(&tree)
        else {
            panic!("expected call value");
        };
        assert_eq!(args.len(), 1);
        assert_eq!(keywords.len(), 2);
        assert!(keywords[0].is("description"));
        assert_eq!(keywords[0].value.as_str(), Some("d"));
        assert_eq!(keywords[1].arg, None);
    }

    #[test]
    fn test_fstring_is_not_constant() {
        let tree = build("x: str = f\"{y}\"\n");
        assert!(matches!(
            only_stmt(&tree),
            Stmt::AnnAssign {
                value: Some(Expr::Unsupported(_)),
                ..
            }
        ));
    }

    #[test]
    fn test_compound_statements_keep_nested_returns() {
        let source = r#"
def invoke(self):
    if flag:
        return A()
    else:
        for x in xs:
            return B()
    try:
        pass
    except Exception:
        return C()
"#;
        let tree = build(source);
        let function = tree.module_body()[0];
        let returns: Vec<NodeId> = tree
            .walk_from(function)
            .into_iter()
            .filter(|id| matches!(tree.stmt(*id), Stmt::Return { .. }))
            .collect();
        assert_eq!(returns.len(), 3);
        for id in returns {
            assert!(!tree.is_top_level(id));
        }
    }

    #[test]
    fn test_async_function_flag() {
        let tree = build("async def fetch():\n    pass\n\ndef plain():\n    pass\n");
        let body = tree.module_body();
        assert!(matches!(tree.stmt(body[0]), Stmt::FunctionDef { is_async: true, .. }));
        assert!(matches!(tree.stmt(body[1]), Stmt::FunctionDef { is_async: false, .. }));
    }

    #[test]
    fn test_comments_are_skipped() {
        let tree = build("# header\nclass A:\n    # inner\n    x: int\n");
        assert_eq!(tree.module_body().len(), 1);
        assert_eq!(tree.stmt(tree.module_body()[0]).body().len(), 1);
    }
}
