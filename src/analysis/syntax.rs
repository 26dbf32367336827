//! Navigation helpers over the C# tree-sitter grammar.
//!
//! Everything here is purely syntactic. Symbol questions go through
//! [`SemanticModel`](super::SemanticModel).

use tree_sitter::Node;

/// Depth cap for upward walks over parent links.
pub const MAX_ANCESTOR_DEPTH: usize = 256;

/// Node kinds that declare a type.
pub const TYPE_DECLARATION_KINDS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "record_struct_declaration",
    "interface_declaration",
    "record_declaration",
    "enum_declaration",
];

/// Node kinds that own an executable body.
pub const BODY_OWNER_KINDS: &[&str] = &[
    "method_declaration",
    "constructor_declaration",
    "destructor_declaration",
    "operator_declaration",
    "conversion_operator_declaration",
    "accessor_declaration",
    "local_function_statement",
    "lambda_expression",
    "anonymous_method_expression",
];

/// Bounded iterator over the ancestors of a node.
///
/// Parent links are followed lazily and never more than
/// [`MAX_ANCESTOR_DEPTH`] times.
pub struct Ancestors<'a> {
    next: Option<Node<'a>>,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Node<'a>> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.next?;
        self.remaining -= 1;
        self.next = node.parent();
        Some(node)
    }
}

/// Ancestors of `node`, nearest first, excluding `node` itself.
pub fn ancestors(node: Node<'_>) -> Ancestors<'_> {
    Ancestors {
        next: node.parent(),
        remaining: MAX_ANCESTOR_DEPTH,
    }
}

/// `node` followed by its ancestors.
pub fn ancestors_and_self(node: Node<'_>) -> Ancestors<'_> {
    Ancestors {
        next: Some(node),
        remaining: MAX_ANCESTOR_DEPTH,
    }
}

/// Nearest ancestor whose kind is one of `kinds`.
pub fn first_ancestor<'a>(node: Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
    ancestors(node).find(|n| kinds.contains(&n.kind()))
}

/// Text of a node.
pub fn text<'s>(node: Node<'_>, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

/// Named children, skipping comments.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// All children including anonymous tokens.
pub fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// First direct child of the given kind.
pub fn child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    children(node).into_iter().find(|c| c.kind() == kind)
}

/// Modifier keywords on a declaration (`public`, `static`, `readonly`, ...).
pub fn modifiers<'s>(node: Node<'_>, source: &'s [u8]) -> Vec<&'s str> {
    children(node)
        .into_iter()
        .filter(|c| c.kind() == "modifier")
        .map(|c| text(c, source).trim())
        .collect()
}

/// Whether a declaration carries the given modifier keyword.
pub fn has_modifier(node: Node<'_>, source: &[u8], keyword: &str) -> bool {
    modifiers(node, source).contains(&keyword)
}

/// Pre-order walk over `node` and its descendants.
///
/// The callback returns `false` to skip a node's children.
pub fn walk_descendants<'a>(node: Node<'a>, f: &mut impl FnMut(Node<'a>) -> bool) {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if !f(current) {
            continue;
        }
        let mut cursor = current.walk();
        let kids: Vec<_> = current.named_children(&mut cursor).collect();
        stack.extend(kids.into_iter().rev());
    }
}

/// Descendants of `node` (including itself) with the given kind.
pub fn descendants_of_kind<'a>(node: Node<'a>, kind: &str) -> Vec<Node<'a>> {
    let mut found = Vec::new();
    walk_descendants(node, &mut |n| {
        if n.kind() == kind {
            found.push(n);
        }
        true
    });
    found
}

/// Strip parentheses, casts are kept.
pub fn unparenthesize(mut node: Node<'_>) -> Node<'_> {
    for _ in 0..MAX_ANCESTOR_DEPTH {
        if node.kind() != "parenthesized_expression" {
            break;
        }
        match named_children(node).into_iter().next() {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Whether the node is `this`.
pub fn is_this(node: Node<'_>) -> bool {
    matches!(node.kind(), "this_expression" | "this")
}

/// Whether the node is `base`.
pub fn is_base(node: Node<'_>) -> bool {
    matches!(node.kind(), "base_expression" | "base")
}

/// An argument in an argument list.
#[derive(Debug, Clone, Copy)]
pub struct Argument<'a> {
    /// The `argument` node.
    pub node: Node<'a>,
    /// The argument expression.
    pub expression: Node<'a>,
    /// Parameter name for `name: value` arguments.
    pub name: Option<Node<'a>>,
}

/// Arguments of an `argument_list` node.
pub fn argument_list_arguments(list: Node<'_>) -> Vec<Argument<'_>> {
    named_children(list)
        .into_iter()
        .filter(|c| c.kind() == "argument")
        .filter_map(|arg| {
            let name = arg.child_by_field_name("name");
            let expression = named_children(arg)
                .into_iter()
                .rev()
                .find(|p| Some(*p) != name)?;
            Some(Argument {
                node: arg,
                expression,
                name,
            })
        })
        .collect()
}

/// Arguments of an invocation or object creation (empty if none).
pub fn call_arguments(call: Node<'_>) -> Vec<Argument<'_>> {
    call_argument_list(call)
        .map(argument_list_arguments)
        .unwrap_or_default()
}

/// The argument list node of a call, if present.
pub fn call_argument_list(call: Node<'_>) -> Option<Node<'_>> {
    call.child_by_field_name("arguments")
        .or_else(|| child_of_kind(call, "argument_list"))
}

/// The simple name of the invoked member: `Register` for
/// `DependencyProperty.Register(...)`, `SetValue` for `SetValue(...)`.
pub fn invoked_name<'s>(invocation: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
    if invocation.kind() != "invocation_expression" {
        return None;
    }
    let function = invocation.child_by_field_name("function")?;
    simple_name_of(function, source)
}

/// Receiver of an invocation written as `receiver.Member(...)`.
pub fn invocation_receiver(invocation: Node<'_>) -> Option<Node<'_>> {
    let function = unparenthesize(invocation.child_by_field_name("function")?);
    if function.kind() == "member_access_expression" {
        function.child_by_field_name("expression")
    } else {
        None
    }
}

/// The rightmost simple identifier of a name or member access.
pub fn simple_name_of<'s>(node: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
    match node.kind() {
        "identifier" => Some(text(node, source)),
        "generic_name" => named_children(node)
            .into_iter()
            .find(|c| c.kind() == "identifier")
            .map(|c| text(c, source)),
        "member_access_expression" | "qualified_name" | "member_binding_expression" => {
            let name = node
                .child_by_field_name("name")
                .or_else(|| named_children(node).into_iter().last())?;
            simple_name_of(name, source)
        }
        "alias_qualified_name" => {
            let name = node
                .child_by_field_name("name")
                .or_else(|| named_children(node).into_iter().last())?;
            simple_name_of(name, source)
        }
        _ => None,
    }
}

/// Simple name of the type in `new T(...)`.
pub fn created_type_name<'s>(creation: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
    if creation.kind() != "object_creation_expression" {
        return None;
    }
    let ty = creation.child_by_field_name("type")?;
    simple_name_of(ty, source)
}

/// Name identifier of a declaration (`name` field).
pub fn declared_name<'s>(node: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
    node.child_by_field_name("name").map(|n| text(n, source))
}

/// Variable declarators of a field, event field or local declaration.
pub fn variable_declarators(declaration: Node<'_>) -> Vec<Node<'_>> {
    let var_decl = if declaration.kind() == "variable_declaration" {
        Some(declaration)
    } else {
        child_of_kind(declaration, "variable_declaration")
    };
    var_decl
        .map(|vd| {
            named_children(vd)
                .into_iter()
                .filter(|c| c.kind() == "variable_declarator")
                .collect()
        })
        .unwrap_or_default()
}

/// The declared type of a field, event field or local declaration.
pub fn variable_declaration_type(declaration: Node<'_>) -> Option<Node<'_>> {
    let var_decl = if declaration.kind() == "variable_declaration" {
        declaration
    } else {
        child_of_kind(declaration, "variable_declaration")?
    };
    var_decl.child_by_field_name("type")
}

/// Initializer expression of a variable declarator (`x = <expr>`).
pub fn declarator_initializer(declarator: Node<'_>) -> Option<Node<'_>> {
    if let Some(init) = declarator.child_by_field_name("initializer") {
        return Some(equals_value_expression(init).unwrap_or(init));
    }
    let kids = children(declarator);
    if let Some(clause) = kids.iter().find(|c| c.kind() == "equals_value_clause") {
        return equals_value_expression(*clause);
    }
    let eq = kids.iter().position(|c| c.kind() == "=")?;
    kids[eq + 1..].iter().copied().find(|c| c.is_named())
}

fn equals_value_expression(node: Node<'_>) -> Option<Node<'_>> {
    if node.kind() == "equals_value_clause" {
        named_children(node).into_iter().next()
    } else {
        Some(node)
    }
}

/// Initializer of a property declaration (`{ get; } = <expr>;`).
pub fn property_initializer(property: Node<'_>) -> Option<Node<'_>> {
    let value = property.child_by_field_name("value")?;
    if value.kind() == "arrow_expression_clause" {
        None
    } else {
        Some(value)
    }
}

/// The storage initializer of a field declarator or property declaration.
pub fn storage_initializer(member: Node<'_>) -> Option<Node<'_>> {
    match member.kind() {
        "variable_declarator" => declarator_initializer(member),
        "property_declaration" => property_initializer(member),
        _ => None,
    }
}

/// One accessor of a property.
#[derive(Debug, Clone, Copy)]
pub struct Accessor<'a> {
    pub node: Node<'a>,
    /// `get`, `set`, `init`, `add` or `remove`.
    pub keyword: &'static str,
    /// Block or arrow clause; `None` for `get;`.
    pub body: Option<Node<'a>>,
}

/// Accessors of a property declaration.
pub fn property_accessors(property: Node<'_>) -> Vec<Accessor<'_>> {
    let list = property
        .child_by_field_name("accessors")
        .or_else(|| child_of_kind(property, "accessor_list"));
    let Some(list) = list else {
        return Vec::new();
    };

    named_children(list)
        .into_iter()
        .filter(|c| c.kind() == "accessor_declaration")
        .filter_map(|acc| {
            let keyword = children(acc).into_iter().find_map(|c| match c.kind() {
                "get" => Some("get"),
                "set" => Some("set"),
                "init" => Some("init"),
                "add" => Some("add"),
                "remove" => Some("remove"),
                _ => None,
            })?;
            let body = children(acc)
                .into_iter()
                .find(|c| matches!(c.kind(), "block" | "arrow_expression_clause"));
            Some(Accessor {
                node: acc,
                keyword,
                body,
            })
        })
        .collect()
}

/// Body (block or arrow clause) of a method, constructor or local function.
pub fn member_body(member: Node<'_>) -> Option<Node<'_>> {
    member
        .child_by_field_name("body")
        .filter(|b| matches!(b.kind(), "block" | "arrow_expression_clause"))
        .or_else(|| {
            children(member)
                .into_iter()
                .find(|c| matches!(c.kind(), "block" | "arrow_expression_clause"))
        })
}

/// Statements of a block, without braces and comments.
pub fn block_statements(block: Node<'_>) -> Vec<Node<'_>> {
    named_children(block)
        .into_iter()
        .filter(|c| c.kind() != "empty_statement")
        .collect()
}

/// Parameters of a method, constructor, local function or lambda.
pub fn parameters(member: Node<'_>) -> Vec<Node<'_>> {
    let list = member
        .child_by_field_name("parameters")
        .or_else(|| child_of_kind(member, "parameter_list"));
    match list {
        Some(l) if l.kind() == "parameter_list" => named_children(l)
            .into_iter()
            .filter(|c| c.kind() == "parameter")
            .collect(),
        // `x => ...` lambdas have a bare identifier
        Some(l) if matches!(l.kind(), "identifier" | "implicit_parameter") => vec![l],
        _ => Vec::new(),
    }
}

/// Whether a parameter is declared with the `this` modifier.
pub fn is_this_parameter(parameter: Node<'_>, source: &[u8]) -> bool {
    children(parameter)
        .into_iter()
        .take_while(|c| Some(*c) != parameter.child_by_field_name("name"))
        .any(|c| {
            c.kind() == "this"
                || (matches!(c.kind(), "modifier" | "parameter_modifier")
                    && text(c, source).trim() == "this")
        })
}

/// Whether a parameter declares a default value.
pub fn parameter_has_default(parameter: Node<'_>) -> bool {
    children(parameter)
        .into_iter()
        .any(|c| c.kind() == "equals_value_clause" || c.kind() == "=")
}

/// Whether a parameter is a `params` array.
pub fn is_params_parameter(parameter: Node<'_>, source: &[u8]) -> bool {
    children(parameter)
        .into_iter()
        .any(|c| c.kind() == "params" || (c.kind() == "modifier" && text(c, source).trim() == "params"))
}

/// Attribute names applied to a declaration or parameter (`CallerMemberName`).
pub fn attribute_names<'s>(node: Node<'_>, source: &'s [u8]) -> Vec<&'s str> {
    children(node)
        .into_iter()
        .filter(|c| c.kind() == "attribute_list")
        .flat_map(named_children)
        .filter(|a| a.kind() == "attribute")
        .filter_map(|a| {
            let name = a
                .child_by_field_name("name")
                .or_else(|| named_children(a).into_iter().next())?;
            simple_name_of(name, source).or_else(|| Some(text(name, source)))
        })
        .collect()
}

/// Value of a string literal, without quotes and prefixes.
///
/// Escape sequences are kept verbatim; the names this is used for
/// never contain them.
pub fn string_literal_value(node: Node<'_>, source: &[u8]) -> Option<String> {
    let node = unparenthesize(node);
    match node.kind() {
        "string_literal" | "verbatim_string_literal" | "raw_string_literal" => {
            let raw = text(node, source).trim();
            let raw = raw.trim_start_matches('@');
            let raw = raw.trim_end_matches("u8");
            let quotes = if node.kind() == "raw_string_literal" {
                raw.chars().take_while(|c| *c == '"').count()
            } else {
                1
            };
            if quotes == 0 || raw.len() < quotes * 2 {
                return None;
            }
            Some(raw[quotes..raw.len() - quotes].to_string())
        }
        _ => None,
    }
}

/// The name produced by `nameof(X)`, `nameof(this.X)` or `nameof(A.B.X)`.
pub fn nameof_value(node: Node<'_>, source: &[u8]) -> Option<String> {
    let node = unparenthesize(node);
    if node.kind() != "invocation_expression" {
        return None;
    }
    let function = node.child_by_field_name("function")?;
    if function.kind() != "identifier" || text(function, source) != "nameof" {
        return None;
    }
    let arg = call_arguments(node).into_iter().next()?;
    simple_name_of(arg.expression, source).map(str::to_string)
}

/// A compile-time name: string literal or `nameof`.
pub fn constant_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    string_literal_value(node, source).or_else(|| nameof_value(node, source))
}

/// Whether an expression is `null`, `""`, `string.Empty` or `String.Empty`.
pub fn is_null_or_empty_name(node: Node<'_>, source: &[u8]) -> bool {
    let node = unparenthesize(node);
    if node.kind() == "null_literal" {
        return true;
    }
    if let Some(value) = string_literal_value(node, source) {
        return value.is_empty();
    }
    let t: String = text(node, source).split_whitespace().collect();
    matches!(
        t.as_str(),
        "string.Empty" | "String.Empty" | "System.String.Empty" | "global::System.String.Empty"
    )
}

/// Leading documentation comment (`///` or `/** */`) directly before a
/// declaration.
///
/// Attributes are part of the declaration node, so the comment is the
/// previous sibling.
pub fn has_documentation(declaration: Node<'_>, source: &[u8]) -> bool {
    let Some(prev) = declaration.prev_sibling() else {
        return false;
    };
    if prev.kind() != "comment" {
        return false;
    }
    // A comment on the line above or on the same line as the declaration.
    if prev.end_position().row + 1 < declaration.start_position().row {
        return false;
    }
    let t = text(prev, source).trim_start();
    t.starts_with("///") || t.starts_with("/**")
}

/// Whether `node` lies within `outer` (inclusive).
pub fn is_within(node: Node<'_>, outer: Node<'_>) -> bool {
    outer.start_byte() <= node.start_byte() && node.end_byte() <= outer.end_byte()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{CSharpAnalyzer, LanguageAnalyzer, ParsedFile};
    use std::path::Path;

    fn parse(source: &str) -> ParsedFile {
        CSharpAnalyzer::new()
            .parse(Path::new("Foo.cs"), source.as_bytes())
            .unwrap()
    }

    fn first<'a>(parsed: &'a ParsedFile, kind: &str) -> Node<'a> {
        descendants_of_kind(parsed.tree.root_node(), kind)
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn test_ancestors_are_bounded_and_ordered() {
        let parsed = parse("class Foo { void M() { var x = 1; } }");
        let literal = first(&parsed, "integer_literal");
        let kinds: Vec<_> = ancestors(literal).map(|n| n.kind()).collect();
        assert_eq!(kinds.last(), Some(&"compilation_unit"));
        assert!(kinds.contains(&"method_declaration"));
        assert!(kinds.len() <= MAX_ANCESTOR_DEPTH);
        assert_eq!(ancestors_and_self(literal).next().map(|n| n.kind()), Some("integer_literal"));
    }

    #[test]
    fn test_invoked_name_variants() {
        let parsed = parse(
            "class Foo { void M() { DependencyProperty.Register(\"A\"); SetValue(A, 1); this.GetValue(A); } }",
        );
        let names: Vec<_> = descendants_of_kind(parsed.tree.root_node(), "invocation_expression")
            .into_iter()
            .filter_map(|n| invoked_name(n, &parsed.source))
            .collect();
        assert_eq!(names, vec!["Register", "SetValue", "GetValue"]);
    }

    #[test]
    fn test_declarator_initializer() {
        let parsed = parse("class Foo { static readonly object A = new object(), B; }");
        let declarators = variable_declarators(first(&parsed, "field_declaration"));
        assert_eq!(declarators.len(), 2);
        let init = declarator_initializer(declarators[0]).unwrap();
        assert_eq!(init.kind(), "object_creation_expression");
        assert!(declarator_initializer(declarators[1]).is_none());
    }

    #[test]
    fn test_property_accessors() {
        let parsed = parse("class Foo { int Bar { get => 1; private set { } } int Baz { get; } }");
        let props = descendants_of_kind(parsed.tree.root_node(), "property_declaration");
        let accessors = property_accessors(props[0]);
        assert_eq!(accessors.len(), 2);
        assert_eq!(accessors[0].keyword, "get");
        assert_eq!(accessors[0].body.map(|b| b.kind()), Some("arrow_expression_clause"));
        assert_eq!(accessors[1].keyword, "set");
        assert_eq!(accessors[1].body.map(|b| b.kind()), Some("block"));
        let auto = property_accessors(props[1]);
        assert_eq!(auto.len(), 1);
        assert!(auto[0].body.is_none());
    }

    #[test]
    fn test_constant_names() {
        let parsed = parse(
            "class Foo { void M() { N(\"Bar\"); N(nameof(Bar)); N(nameof(this.Baz)); N(@\"Qux\"); N(string.Empty); N(null); } }",
        );
        let args: Vec<_> = descendants_of_kind(parsed.tree.root_node(), "argument")
            .into_iter()
            .map(|a| *named_children(a).last().unwrap())
            .collect();
        assert_eq!(constant_name(args[0], &parsed.source).as_deref(), Some("Bar"));
        // nameof(Bar) contains its own argument node
        let names: Vec<_> = args
            .iter()
            .filter_map(|a| constant_name(*a, &parsed.source))
            .collect();
        assert!(names.contains(&"Baz".to_string()));
        assert!(names.contains(&"Qux".to_string()));
        assert!(args.iter().any(|a| is_null_or_empty_name(*a, &parsed.source)));
    }

    #[test]
    fn test_named_arguments_carry_their_name() {
        let parsed = parse("class Foo { void M() { N(1, defaultValue: \"a\", value: value); } }");
        let call = descendants_of_kind(parsed.tree.root_node(), "invocation_expression")[0];
        let args = call_arguments(call);
        let names: Vec<_> = args
            .iter()
            .map(|a| a.name.map(|n| text(n, &parsed.source)))
            .collect();
        let values: Vec<_> = args.iter().map(|a| text(a.expression, &parsed.source)).collect();
        assert_eq!(names, vec![None, Some("defaultValue"), Some("value")]);
        assert_eq!(values, vec!["1", "\"a\"", "value"]);
        assert_ne!(args[2].name.map(|n| n.id()), Some(args[2].expression.id()));
    }

    #[test]
    fn test_empty_string_values() {
        let parsed = parse("class Foo { void M() { N(\"\", @\"\", \"a\"); } }");
        let call = descendants_of_kind(parsed.tree.root_node(), "invocation_expression")[0];
        let args = call_arguments(call);
        let values: Vec<_> = args
            .iter()
            .map(|a| string_literal_value(a.expression, &parsed.source))
            .collect();
        assert_eq!(
            values,
            vec![Some(String::new()), Some(String::new()), Some("a".to_string())]
        );
        assert!(is_null_or_empty_name(args[0].expression, &parsed.source));
        assert!(!is_null_or_empty_name(args[2].expression, &parsed.source));
    }

    #[test]
    fn test_has_documentation() {
        let parsed = parse(
            "class Foo\n{\n    /// <summary>Docs</summary>\n    public static int A;\n\n    // plain\n    public static int B;\n}\n",
        );
        let fields = descendants_of_kind(parsed.tree.root_node(), "field_declaration");
        assert!(has_documentation(fields[0], &parsed.source));
        assert!(!has_documentation(fields[1], &parsed.source));
    }

    #[test]
    fn test_this_parameter() {
        let parsed = parse("static class Ext { public static int GetBar(this Foo element) => 1; }");
        let params = parameters(first(&parsed, "method_declaration"));
        assert_eq!(params.len(), 1);
        assert!(is_this_parameter(params[0], &parsed.source));
    }
}
