//! Symbol resolution over a parsed compilation.
//!
//! The model indexes every type declared in the compilation, resolves
//! type syntax through namespaces and `using` directives, binds names and
//! member accesses, and picks overloads for invocations and object
//! creations. Framework symbols come from the shared [`SymbolCatalog`].
//!
//! Every query returns `None` when it cannot be answered with certainty.
//! Callers treat `None` as "stay silent".

use std::collections::{HashMap, HashSet, VecDeque};

use tree_sitter::Node;

use super::facts::{DeclarationKind, MemberKind};
use super::syntax::{self, Argument, TYPE_DECLARATION_KINDS};
use super::types::{self, TypeRef};
use super::ParsedFile;
use crate::catalog::{KnownMember, KnownMemberKind, KnownTypeKind, SymbolCatalog};

/// Cap on supertype walks.
const MAX_SUPERTYPES: usize = 64;

/// Index of a source type in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub usize);

/// Index of a source member: owning type plus position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberId {
    pub ty: TypeId,
    pub index: usize,
}

/// A type declared in source.
#[derive(Debug)]
pub struct TypeSymbol<'a> {
    pub file: usize,
    pub node: Node<'a>,
    pub name: String,
    /// Namespace-qualified metadata name (`` Ns.Outer.Inner`1 ``).
    pub full_name: String,
    pub kind: DeclarationKind,
    pub type_parameters: Vec<String>,
    pub modifiers: Vec<String>,
    pub base_syntax: Vec<Node<'a>>,
    pub members: Vec<MemberSymbol<'a>>,
    /// Parameter count for delegate declarations.
    pub delegate_arity: Option<usize>,
    pub has_conversion_operators: bool,
}

impl TypeSymbol<'_> {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn is_public(&self) -> bool {
        self.has_modifier("public")
    }
}

/// A member declared in source.
#[derive(Debug)]
pub struct MemberSymbol<'a> {
    pub kind: MemberKind,
    pub name: String,
    /// The declarator for fields and event fields, the declaration otherwise.
    pub node: Node<'a>,
    /// The whole declaration (`field_declaration` for fields).
    pub declaration: Node<'a>,
    /// Field, property or event type; method return type.
    pub type_syntax: Option<Node<'a>>,
    pub modifiers: Vec<String>,
    pub parameters: Vec<Node<'a>>,
    pub is_extension: bool,
}

impl MemberSymbol<'_> {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn is_static(&self) -> bool {
        self.has_modifier("static") || self.has_modifier("const")
    }

    pub fn is_public(&self) -> bool {
        self.has_modifier("public")
    }

    pub fn is_readonly(&self) -> bool {
        self.has_modifier("readonly") || self.has_modifier("const")
    }
}

/// What a name or expression binds to.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol<'a> {
    /// A source member.
    Member(MemberId),
    /// A catalog member.
    Known(&'static KnownMember),
    /// A type.
    Type(TypeRef),
    /// A namespace prefix (`System.Windows`).
    Namespace(String),
    /// A local variable (declarator, foreach or catch identifier).
    Local(Node<'a>),
    /// A parameter (`parameter` node or bare lambda identifier).
    Parameter(Node<'a>),
    /// The implicit `value` of a setter; holds the accessor.
    Value(Node<'a>),
}

/// A parameter of a resolved method or constructor.
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub name: String,
    /// `None` when the declared type did not resolve.
    pub ty: Option<TypeRef>,
    pub has_default: bool,
    pub is_params: bool,
}

/// Name binding before overload resolution.
enum Binding<'a> {
    Symbol(Symbol<'a>),
    Methods {
        candidates: Vec<Symbol<'a>>,
        /// Receiver type for extension-method lookup.
        receiver: Option<TypeRef>,
        name: String,
    },
}

enum Selection<'a> {
    Selected(Symbol<'a>),
    Ambiguous,
    NotApplicable,
}

struct Applicable<'a> {
    symbol: Symbol<'a>,
    parameters: Vec<ParameterInfo>,
    mapping: Vec<usize>,
}

/// Resolution service over one immutable compilation.
pub struct SemanticModel<'a> {
    catalog: &'a SymbolCatalog,
    files: &'a [ParsedFile],
    roots: HashMap<usize, usize>,
    types: Vec<TypeSymbol<'a>>,
    by_full_name: HashMap<String, TypeId>,
    by_simple_name: HashMap<(String, usize), Vec<TypeId>>,
    by_node: HashMap<usize, TypeId>,
    members_by_node: HashMap<usize, MemberId>,
    namespaces: HashSet<String>,
}

impl<'a> SemanticModel<'a> {
    /// Index all type declarations of `files`.
    pub fn new(files: &'a [ParsedFile], catalog: &'a SymbolCatalog) -> Self {
        let mut model = Self {
            catalog,
            files,
            roots: HashMap::new(),
            types: Vec::new(),
            by_full_name: HashMap::new(),
            by_simple_name: HashMap::new(),
            by_node: HashMap::new(),
            members_by_node: HashMap::new(),
            namespaces: HashSet::new(),
        };

        for (index, file) in files.iter().enumerate() {
            let root = file.tree.root_node();
            model.roots.insert(root.id(), index);
            model.collect_declarations(index, root, "", None);
        }

        tracing::debug!(
            files = files.len(),
            types = model.types.len(),
            "semantic model built"
        );
        model
    }

    /// The catalog this model resolves framework symbols against.
    pub fn catalog(&self) -> &'a SymbolCatalog {
        self.catalog
    }

    pub fn files(&self) -> &'a [ParsedFile] {
        self.files
    }

    pub fn types(&self) -> &[TypeSymbol<'a>] {
        &self.types
    }

    pub fn type_symbol(&self, id: TypeId) -> &TypeSymbol<'a> {
        &self.types[id.0]
    }

    pub fn member(&self, id: MemberId) -> &MemberSymbol<'a> {
        &self.types[id.ty.0].members[id.index]
    }

    /// Members of a source type with their ids.
    pub fn members_of(&self, id: TypeId) -> impl Iterator<Item = (MemberId, &MemberSymbol<'a>)> {
        self.types[id.0]
            .members
            .iter()
            .enumerate()
            .map(move |(index, m)| (MemberId { ty: id, index }, m))
    }

    /// Source type declared by a type declaration node.
    pub fn declared_type(&self, declaration: Node<'a>) -> Option<TypeId> {
        self.by_node.get(&declaration.id()).copied()
    }

    /// Source member declared by a declarator or member declaration node.
    pub fn declared_member(&self, declaration: Node<'a>) -> Option<MemberId> {
        self.members_by_node.get(&declaration.id()).copied()
    }

    /// Innermost source type containing `node`.
    pub fn containing_type(&self, node: Node<'a>) -> Option<TypeId> {
        syntax::ancestors(node)
            .filter(|n| TYPE_DECLARATION_KINDS.contains(&n.kind()))
            .find_map(|n| self.declared_type(n))
    }

    /// The type reference for a source type, generic parameters unbound.
    pub fn type_ref(&self, id: TypeId) -> TypeRef {
        let ty = &self.types[id.0];
        if ty.type_parameters.is_empty() {
            TypeRef::named(ty.full_name.clone())
        } else {
            TypeRef::generic(
                ty.full_name.clone(),
                ty.type_parameters
                    .iter()
                    .map(|name| TypeRef::TypeParameter { name: name.clone() })
                    .collect(),
            )
        }
    }

    /// The file that contains `node`.
    pub fn file_of(&self, node: Node<'a>) -> Option<&'a ParsedFile> {
        let root = syntax::ancestors_and_self(node).last()?;
        let index = self.roots.get(&root.id())?;
        Some(&self.files[*index])
    }

    /// Source bytes of the file that contains `node`.
    pub fn source_of(&self, node: Node<'a>) -> Option<&'a [u8]> {
        self.file_of(node).map(|f| f.source.as_slice())
    }

    /// Text of a node.
    pub fn text(&self, node: Node<'a>) -> &'a str {
        self.source_of(node)
            .map(|src| syntax::text(node, src))
            .unwrap_or("")
    }

    // ---------------------------------------------------------------
    // Index construction
    // ---------------------------------------------------------------

    fn collect_declarations(
        &mut self,
        file: usize,
        container: Node<'a>,
        namespace: &str,
        outer: Option<TypeId>,
    ) {
        let files = self.files;
        let src = &files[file].source;
        let mut namespace = namespace.to_string();

        for child in syntax::named_children(container) {
            match child.kind() {
                "namespace_declaration" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| normalize_name(syntax::text(n, src)))
                        .unwrap_or_default();
                    let inner = join_namespace(&namespace, &name);
                    self.register_namespace(&inner);
                    if let Some(body) = child
                        .child_by_field_name("body")
                        .or_else(|| syntax::child_of_kind(child, "declaration_list"))
                    {
                        self.collect_declarations(file, body, &inner, None);
                    }
                }
                "file_scoped_namespace_declaration" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| normalize_name(syntax::text(n, src)))
                        .unwrap_or_default();
                    namespace = join_namespace(&namespace, &name);
                    self.register_namespace(&namespace);
                    // Grammar versions differ on whether members nest here.
                    self.collect_declarations(file, child, &namespace, None);
                }
                "declaration_list" => {
                    self.collect_declarations(file, child, &namespace, outer);
                }
                kind if TYPE_DECLARATION_KINDS.contains(&kind)
                    || kind == "delegate_declaration" =>
                {
                    self.collect_type(file, child, &namespace, outer);
                }
                _ => {}
            }
        }
    }

    fn register_namespace(&mut self, namespace: &str) {
        let mut ns = namespace;
        while !ns.is_empty() {
            self.namespaces.insert(ns.to_string());
            ns = types::metadata_namespace(ns);
        }
    }

    fn collect_type(&mut self, file: usize, node: Node<'a>, namespace: &str, outer: Option<TypeId>) {
        let files = self.files;
        let src = &files[file].source;
        let Some(kind) = DeclarationKind::from_node_kind(node.kind()) else {
            return;
        };
        let Some(name) = syntax::declared_name(node, src).map(str::to_string) else {
            return;
        };

        let type_parameters = type_parameter_names(node, src);
        let metadata_name = metadata_type_name(&name, type_parameters.len());
        let full_name = match outer {
            Some(outer) => format!("{}.{}", self.types[outer.0].full_name, metadata_name),
            None => join_namespace(namespace, &metadata_name),
        };

        let base_syntax = syntax::child_of_kind(node, "base_list")
            .map(|list| {
                syntax::named_children(list)
                    .into_iter()
                    .filter_map(|b| match b.kind() {
                        "argument_list" => None,
                        "primary_constructor_base_type" => b
                            .child_by_field_name("type")
                            .or_else(|| syntax::named_children(b).into_iter().next()),
                        _ => Some(b),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let delegate_arity = (kind == DeclarationKind::Delegate)
            .then(|| syntax::parameters(node).len());

        let id = TypeId(self.types.len());
        let modifiers = syntax::modifiers(node, src)
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let is_static_type = modifiers.iter().any(|m| m == "static");
        self.types.push(TypeSymbol {
            file,
            node,
            name: name.clone(),
            full_name: full_name.clone(),
            kind,
            type_parameters,
            modifiers,
            base_syntax,
            members: Vec::new(),
            delegate_arity,
            has_conversion_operators: false,
        });
        self.by_node.insert(node.id(), id);
        self.by_full_name.entry(full_name.clone()).or_insert(id);
        let arity = types::metadata_arity(&full_name);
        self.by_simple_name
            .entry((name, arity))
            .or_default()
            .push(id);

        let body = node
            .child_by_field_name("body")
            .or_else(|| syntax::child_of_kind(node, "declaration_list"))
            .or_else(|| syntax::child_of_kind(node, "enum_member_declaration_list"));
        let Some(body) = body else {
            return;
        };

        for child in syntax::named_children(body) {
            let kind = child.kind();
            if TYPE_DECLARATION_KINDS.contains(&kind) || kind == "delegate_declaration" {
                self.collect_type(file, child, namespace, Some(id));
                continue;
            }
            if kind == "conversion_operator_declaration" {
                self.types[id.0].has_conversion_operators = true;
                continue;
            }
            for member in member_symbols(child, src, is_static_type) {
                let index = self.types[id.0].members.len();
                self.members_by_node
                    .insert(member.node.id(), MemberId { ty: id, index });
                self.types[id.0].members.push(member);
            }
        }
    }

    // ---------------------------------------------------------------
    // Type syntax
    // ---------------------------------------------------------------

    /// Resolve a type written in source.
    pub fn resolve_type_syntax(&self, ty: Node<'a>) -> Option<TypeRef> {
        match ty.kind() {
            "predefined_type" => types::keyword_type(self.text(ty).trim()).map(TypeRef::named),
            "implicit_type" => None,
            "identifier" => {
                let name = self.text(ty);
                if name == "var" || name == "dynamic" {
                    return types::keyword_type(name).map(TypeRef::named);
                }
                self.lookup_type_name(name, Vec::new(), ty)
            }
            "generic_name" => {
                let name = syntax::simple_name_of(ty, self.source_of(ty)?)?;
                let args = self.type_arguments(ty)?;
                self.lookup_type_name(name, args, ty)
            }
            "qualified_name" | "alias_qualified_name" => self.resolve_qualified_type(ty),
            "nullable_type" => {
                let inner = ty
                    .child_by_field_name("type")
                    .or_else(|| syntax::named_children(ty).into_iter().next())?;
                let inner = self.resolve_type_syntax(inner)?;
                match self.is_value_type(&inner) {
                    Some(true) => Some(TypeRef::nullable(inner)),
                    Some(false) => Some(inner),
                    None if matches!(inner, TypeRef::TypeParameter { .. }) => Some(inner),
                    None => None,
                }
            }
            "array_type" => {
                let element = ty
                    .child_by_field_name("type")
                    .or_else(|| syntax::named_children(ty).into_iter().next())?;
                Some(TypeRef::Array {
                    element: Box::new(self.resolve_type_syntax(element)?),
                })
            }
            _ => None,
        }
    }

    fn type_arguments(&self, generic: Node<'a>) -> Option<Vec<TypeRef>> {
        let list = syntax::child_of_kind(generic, "type_argument_list")?;
        syntax::named_children(list)
            .into_iter()
            .map(|arg| self.resolve_type_syntax(arg))
            .collect()
    }

    fn resolve_qualified_type(&self, ty: Node<'a>) -> Option<TypeRef> {
        let name_node = ty
            .child_by_field_name("name")
            .or_else(|| syntax::named_children(ty).into_iter().last())?;
        let qualifier = ty
            .child_by_field_name("qualifier")
            .or_else(|| syntax::named_children(ty).into_iter().next())?;

        let (simple, args) = match name_node.kind() {
            "generic_name" => (
                syntax::simple_name_of(name_node, self.source_of(name_node)?)?,
                self.type_arguments(name_node)?,
            ),
            _ => (self.text(name_node), Vec::new()),
        };
        let metadata = metadata_type_name(simple, args.len());

        let prefix = normalize_name(self.text(qualifier));
        if ty.kind() == "alias_qualified_name" || prefix == "global" {
            return self.find_type(&metadata).map(|full| make_type(full, args));
        }

        let candidate = format!("{}.{}", prefix, metadata);
        if let Some(full) = self.find_type(&candidate) {
            return Some(make_type(full, args));
        }

        // Outer type qualifier (`Outer.Inner`) or a using alias.
        if let Some(TypeRef::Named { name, .. }) = self.resolve_type_syntax(qualifier) {
            let nested = format!("{}.{}", name, metadata);
            if let Some(full) = self.find_type(&nested) {
                return Some(make_type(full, args));
            }
        }
        if let Some(target) = self.using_alias(&prefix, ty) {
            let aliased = format!("{}.{}", target, metadata);
            if let Some(full) = self.find_type(&aliased) {
                return Some(make_type(full, args));
            }
        }
        None
    }

    /// Metadata name of an existing source or catalog type.
    fn find_type(&self, full_name: &str) -> Option<String> {
        if self.by_full_name.contains_key(full_name) || self.catalog.get_type(full_name).is_some() {
            Some(full_name.to_string())
        } else {
            None
        }
    }

    fn is_namespace(&self, name: &str) -> bool {
        self.namespaces.contains(name) || self.catalog.is_namespace(name)
    }

    /// Resolve a simple type name at `at`.
    fn lookup_type_name(&self, name: &str, args: Vec<TypeRef>, at: Node<'a>) -> Option<TypeRef> {
        let arity = args.len();
        if arity == 0 {
            if let Some(tp) = self.type_parameter_in_scope(name, at) {
                return Some(tp);
            }
        }
        if let Some(keyword) = types::keyword_type(name) {
            if arity == 0 && name != "dynamic" {
                return Some(TypeRef::named(keyword));
            }
        }

        let metadata = metadata_type_name(name, arity);

        // Nested types of the enclosing types.
        for decl in syntax::ancestors(at).filter(|n| TYPE_DECLARATION_KINDS.contains(&n.kind())) {
            if let Some(id) = self.declared_type(decl) {
                let nested = format!("{}.{}", self.types[id.0].full_name, metadata);
                if self.by_full_name.contains_key(&nested) {
                    return Some(make_type(nested, args));
                }
            }
        }

        // Enclosing namespaces, innermost first, then the global namespace.
        let mut namespace = self.namespace_of(at);
        loop {
            let candidate = join_namespace(&namespace, &metadata);
            if let Some(full) = self.find_type(&candidate) {
                return Some(make_type(full, args));
            }
            if namespace.is_empty() {
                break;
            }
            namespace = types::metadata_namespace(&namespace).to_string();
        }

        // Imported namespaces; more than one distinct match is ambiguous.
        let (imports, aliases) = self.usings_in_scope(at);
        if arity == 0 {
            if let Some((_, target)) = aliases.iter().find(|(alias, _)| alias == name) {
                if let Some(full) = self.find_type(target) {
                    return Some(TypeRef::named(full));
                }
            }
        }
        let mut found: Vec<String> = imports
            .iter()
            .filter_map(|ns| self.find_type(&format!("{}.{}", ns, metadata)))
            .collect();
        found.sort();
        found.dedup();
        match found.len() {
            1 => return found.pop().map(|full| make_type(full, args)),
            0 => {}
            _ => return None,
        }

        // Unique simple-name match across source and catalog.
        let mut unique: Vec<String> = self
            .by_simple_name
            .get(&(name.to_string(), arity))
            .map(|ids| ids.iter().map(|id| self.types[id.0].full_name.clone()).collect())
            .unwrap_or_default();
        unique.extend(
            self.catalog
                .types_named(name, arity)
                .iter()
                .map(|t| t.full_name.to_string()),
        );
        unique.sort();
        unique.dedup();
        if unique.len() == 1 {
            return unique.pop().map(|full| make_type(full, args));
        }
        None
    }

    fn type_parameter_in_scope(&self, name: &str, at: Node<'a>) -> Option<TypeRef> {
        let src = self.source_of(at)?;
        syntax::ancestors_and_self(at)
            .filter(|n| {
                matches!(
                    n.kind(),
                    "method_declaration" | "local_function_statement" | "delegate_declaration"
                ) || TYPE_DECLARATION_KINDS.contains(&n.kind())
            })
            .find(|n| type_parameter_names(*n, src).iter().any(|p| p == name))
            .map(|_| TypeRef::TypeParameter {
                name: name.to_string(),
            })
    }

    /// Namespace enclosing `at`.
    fn namespace_of(&self, at: Node<'a>) -> String {
        let mut parts: Vec<String> = syntax::ancestors(at)
            .filter(|n| n.kind() == "namespace_declaration")
            .filter_map(|n| n.child_by_field_name("name"))
            .map(|n| normalize_name(self.text(n)))
            .collect();

        if let Some(root) = syntax::ancestors_and_self(at).last() {
            if let Some(file_scoped) = syntax::named_children(root)
                .into_iter()
                .find(|c| c.kind() == "file_scoped_namespace_declaration")
            {
                if let Some(name) = file_scoped.child_by_field_name("name") {
                    parts.push(normalize_name(self.text(name)));
                }
            }
        }

        parts.reverse();
        parts.join(".")
    }

    /// Imported namespaces and aliases visible at `at`.
    fn usings_in_scope(&self, at: Node<'a>) -> (Vec<String>, Vec<(String, String)>) {
        let mut scopes: Vec<Node<'a>> = syntax::ancestors(at)
            .filter(|n| n.kind() == "namespace_declaration")
            .flat_map(|n| {
                let body = n
                    .child_by_field_name("body")
                    .or_else(|| syntax::child_of_kind(n, "declaration_list"));
                std::iter::once(n).chain(body)
            })
            .collect();
        if let Some(root) = syntax::ancestors_and_self(at).last() {
            scopes.push(root);
            scopes.extend(
                syntax::named_children(root)
                    .into_iter()
                    .filter(|c| c.kind() == "file_scoped_namespace_declaration"),
            );
        }

        let mut imports = Vec::new();
        let mut aliases = Vec::new();
        for scope in scopes {
            for directive in syntax::named_children(scope)
                .into_iter()
                .filter(|c| c.kind() == "using_directive")
            {
                let tokens = syntax::children(directive);
                if tokens.iter().any(|t| t.kind() == "static") {
                    continue;
                }
                let named = syntax::named_children(directive);
                let Some(target) = named.last() else {
                    continue;
                };
                let target = normalize_name(self.text(*target));
                if tokens.iter().any(|t| t.kind() == "=") {
                    if let Some(alias) = directive
                        .child_by_field_name("alias")
                        .or_else(|| named.first().copied())
                    {
                        aliases.push((self.text(alias).trim().to_string(), target));
                    }
                } else {
                    imports.push(target);
                }
            }
        }
        (imports, aliases)
    }

    fn using_alias(&self, alias: &str, at: Node<'a>) -> Option<String> {
        let (_, aliases) = self.usings_in_scope(at);
        aliases
            .into_iter()
            .find(|(a, _)| a == alias)
            .map(|(_, target)| target)
    }

    // ---------------------------------------------------------------
    // Type relations
    // ---------------------------------------------------------------

    /// Whether a type is a value type; `None` when unknown.
    pub fn is_value_type(&self, ty: &TypeRef) -> Option<bool> {
        match ty {
            TypeRef::Named { name, .. } => {
                if let Some(id) = self.by_full_name.get(name) {
                    return Some(self.types[id.0].kind.is_value_type());
                }
                self.catalog.get_type(name).map(|t| t.kind.is_value_type())
            }
            TypeRef::Nullable { .. } => Some(true),
            TypeRef::Array { .. } | TypeRef::Null => Some(false),
            TypeRef::TypeParameter { .. } => None,
        }
    }

    /// Parameter count of a delegate type.
    pub fn delegate_arity(&self, ty: &TypeRef) -> Option<usize> {
        let name = ty.full_name()?;
        if let Some(id) = self.by_full_name.get(name) {
            return self.types[id.0].delegate_arity;
        }
        self.catalog
            .get_type(name)
            .filter(|t| t.kind == KnownTypeKind::Delegate)
            .map(|t| t.delegate_arity)
    }

    /// Direct supertypes; `None` when some of them cannot be resolved.
    fn direct_supertypes(&self, ty: &TypeRef) -> Option<Vec<TypeRef>> {
        match ty {
            TypeRef::Named { name, args } => {
                if let Some(id) = self.by_full_name.get(name) {
                    let decl = &self.types[id.0];
                    let mut out = Vec::new();
                    for base in &decl.base_syntax {
                        let resolved = self.resolve_type_syntax(*base)?;
                        out.push(substitute(&resolved, &decl.type_parameters, args));
                    }
                    match decl.kind {
                        DeclarationKind::Class | DeclarationKind::Record => {
                            out.push(TypeRef::named(types::OBJECT))
                        }
                        DeclarationKind::Struct => out.push(TypeRef::named(types::VALUE_TYPE)),
                        DeclarationKind::Enum => out.push(TypeRef::named(types::ENUM)),
                        DeclarationKind::Delegate => {
                            out.push(TypeRef::named("System.MulticastDelegate"))
                        }
                        DeclarationKind::Interface => {}
                    }
                    return Some(out);
                }

                let known = self.catalog.get_type(name)?;
                let carry = |base: &str| {
                    let arity = types::metadata_arity(base);
                    if arity > 0 && arity == args.len() {
                        TypeRef::generic(base, args.clone())
                    } else {
                        TypeRef::named(base)
                    }
                };
                let mut out: Vec<TypeRef> = known.base.iter().map(|b| carry(*b)).collect();
                out.extend(known.interfaces.iter().map(|i| carry(*i)));
                Some(out)
            }
            TypeRef::Nullable { .. } => Some(vec![TypeRef::named(types::VALUE_TYPE)]),
            TypeRef::Array { element } => {
                let mut out = vec![TypeRef::named(types::ARRAY)];
                for generic in [
                    "System.Collections.Generic.IList`1",
                    "System.Collections.Generic.ICollection`1",
                    "System.Collections.Generic.IEnumerable`1",
                    "System.Collections.Generic.IReadOnlyList`1",
                ] {
                    out.push(TypeRef::generic(generic, vec![(**element).clone()]));
                }
                Some(out)
            }
            TypeRef::Null => Some(Vec::new()),
            TypeRef::TypeParameter { .. } => None,
        }
    }

    /// `ty` and all of its supertypes, breadth first, with a completeness flag.
    pub fn supertypes(&self, ty: &TypeRef) -> (Vec<TypeRef>, bool) {
        let mut out = Vec::new();
        let mut complete = true;
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([ty.clone()]);
        seen.insert(ty.clone());

        while let Some(current) = queue.pop_front() {
            if out.len() >= MAX_SUPERTYPES {
                complete = false;
                break;
            }
            match self.direct_supertypes(&current) {
                Some(bases) => {
                    for base in bases {
                        if seen.insert(base.clone()) {
                            queue.push_back(base);
                        }
                    }
                }
                None => complete = false,
            }
            out.push(current);
        }
        (out, complete)
    }

    /// Whether `ty` is or derives from the named type.
    pub fn is_subtype_of(&self, ty: &TypeRef, full_name: &str) -> Option<bool> {
        let (supers, complete) = self.supertypes(ty);
        if supers.iter().any(|s| s.is(full_name)) {
            Some(true)
        } else if complete {
            Some(false)
        } else {
            None
        }
    }

    fn declares_conversions(&self, ty: &TypeRef) -> bool {
        ty.full_name()
            .and_then(|name| self.by_full_name.get(name))
            .map(|id| self.types[id.0].has_conversion_operators)
            .unwrap_or(false)
    }

    /// Implicit conversion from `from` to `to`: identity, boxing, nullable
    /// lifting, implicit numeric and reference conversions.
    pub fn converts(&self, from: &TypeRef, to: &TypeRef) -> Option<bool> {
        if from == to || to.is_object() {
            return Some(true);
        }
        match (from, to) {
            (TypeRef::TypeParameter { .. }, _) | (_, TypeRef::TypeParameter { .. }) => None,
            (TypeRef::Null, TypeRef::Nullable { .. }) => Some(true),
            (TypeRef::Null, _) => self.is_value_type(to).map(|v| !v),
            (TypeRef::Nullable { inner: a }, TypeRef::Nullable { inner: b }) => self.converts(a, b),
            (_, TypeRef::Nullable { inner }) => self.converts(from, inner),
            (TypeRef::Nullable { .. }, _) => {
                if to.is(types::VALUE_TYPE) {
                    Some(true)
                } else {
                    Some(false)
                }
            }
            _ => {
                if self.declares_conversions(from) || self.declares_conversions(to) {
                    return None;
                }
                if from.has_type_parameters() || to.has_type_parameters() {
                    return None;
                }
                if let (Some(a), Some(b)) = (from.full_name(), to.full_name()) {
                    if types::implicit_numeric(a, b) {
                        return Some(true);
                    }
                }
                let (supers, complete) = self.supertypes(from);
                if supers.iter().skip(1).any(|s| s == to) {
                    return Some(true);
                }
                if complete {
                    Some(false)
                } else {
                    None
                }
            }
        }
    }

    /// Whether the expression converts implicitly to `to`.
    pub fn converts_expression(&self, expr: Node<'a>, to: &TypeRef) -> Option<bool> {
        let expr = syntax::unparenthesize(expr);
        match expr.kind() {
            "lambda_expression" => {
                return self.delegate_conversion(to, &[syntax::parameters(expr).len()]);
            }
            "anonymous_method_expression" => {
                if syntax::child_of_kind(expr, "parameter_list").is_none() {
                    return match self.delegate_arity(to) {
                        Some(_) => Some(true),
                        None => self.delegate_conversion(to, &[]),
                    };
                }
                return self.delegate_conversion(to, &[syntax::parameters(expr).len()]);
            }
            "null_literal" => return self.converts(&TypeRef::Null, to),
            "default_expression" if expr.child_by_field_name("type").is_none()
                && syntax::named_children(expr).is_empty() =>
            {
                return Some(true)
            }
            "throw_expression" => return Some(true),
            "integer_literal" => {
                let numeric = |t: &TypeRef| {
                    t.full_name()
                        .map(|n| n == "System.Int32" || types::implicit_numeric("System.Byte", n))
                        .unwrap_or(false)
                };
                match to {
                    TypeRef::Nullable { inner } if numeric(inner) => return Some(true),
                    t if numeric(t) => return Some(true),
                    _ => {}
                }
            }
            _ => {}
        }

        if let Some(arities) = self.method_group_arities(expr) {
            return self.delegate_conversion(to, &arities);
        }
        let from = self.type_of(expr)?;
        self.converts(&from, to)
    }

    fn delegate_conversion(&self, to: &TypeRef, arities: &[usize]) -> Option<bool> {
        if let Some(arity) = self.delegate_arity(to) {
            return Some(arities.contains(&arity));
        }
        if to.is_object() {
            return Some(false);
        }
        if to.is("System.Delegate")
            || to.is("System.MulticastDelegate")
            || matches!(to, TypeRef::TypeParameter { .. })
        {
            return None;
        }
        Some(false)
    }

    // ---------------------------------------------------------------
    // Members
    // ---------------------------------------------------------------

    /// Members named `name` on `ty` and its supertypes.
    ///
    /// Non-method members stop at the most derived declaration; methods
    /// collect across the hierarchy, skipping overrides.
    fn lookup_members(&self, ty: &TypeRef, name: &str) -> (Vec<Symbol<'a>>, bool) {
        let (supers, complete) = self.supertypes(ty);
        let mut found = Vec::new();
        let mut found_non_method = false;

        for st in &supers {
            let Some(full) = st.full_name() else {
                continue;
            };
            if let Some(id) = self.by_full_name.get(full) {
                for (mid, m) in self.members_of(*id) {
                    if m.name != name || m.kind == MemberKind::Constructor {
                        continue;
                    }
                    if m.kind == MemberKind::Method {
                        if !m.has_modifier("override") {
                            found.push(Symbol::Member(mid));
                        }
                    } else if !found_non_method {
                        found.push(Symbol::Member(mid));
                        found_non_method = true;
                    }
                }
            } else {
                for m in self.catalog.members_named(full, name) {
                    if m.kind == KnownMemberKind::Method {
                        found.push(Symbol::Known(m));
                    } else if m.kind != KnownMemberKind::Constructor && !found_non_method {
                        found.push(Symbol::Known(m));
                        found_non_method = true;
                    }
                }
            }
            if found_non_method {
                break;
            }
        }
        (found, complete)
    }

    fn is_method(&self, symbol: &Symbol<'a>) -> bool {
        match symbol {
            Symbol::Member(id) => self.member(*id).kind == MemberKind::Method,
            Symbol::Known(m) => m.kind == KnownMemberKind::Method,
            _ => false,
        }
    }

    /// Source extension methods named `name` (static classes only).
    fn extension_methods(&self, name: &str) -> Vec<Symbol<'a>> {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, t)| t.has_modifier("static"))
            .flat_map(|(i, t)| {
                t.members.iter().enumerate().filter_map(move |(index, m)| {
                    (m.is_extension && m.name == name).then_some(Symbol::Member(MemberId {
                        ty: TypeId(i),
                        index,
                    }))
                })
            })
            .collect()
    }

    // ---------------------------------------------------------------
    // Name binding
    // ---------------------------------------------------------------

    fn bind(&self, node: Node<'a>) -> Option<Binding<'a>> {
        let node = syntax::unparenthesize(node);
        match node.kind() {
            "identifier" | "generic_name" => self.bind_simple_name(node),
            "member_access_expression" => {
                let receiver = node.child_by_field_name("expression")?;
                let name_node = node.child_by_field_name("name")?;
                let name = syntax::simple_name_of(name_node, self.source_of(node)?)?;
                self.bind_member(receiver, name)
            }
            "member_binding_expression" => {
                let access = syntax::ancestors(node)
                    .find(|a| a.kind() == "conditional_access_expression")?;
                let receiver = access
                    .child_by_field_name("condition")
                    .or_else(|| syntax::named_children(access).into_iter().next())?;
                let name_node = node
                    .child_by_field_name("name")
                    .or_else(|| syntax::named_children(node).into_iter().last())?;
                let name = syntax::simple_name_of(name_node, self.source_of(node)?)?;
                self.bind_member(receiver, name)
            }
            "conditional_access_expression" => {
                let binding = syntax::named_children(node)
                    .into_iter()
                    .rev()
                    .find(|c| c.kind() == "member_binding_expression")?;
                self.bind(binding)
            }
            "qualified_name" | "predefined_type" | "alias_qualified_name" => self
                .resolve_type_syntax(node)
                .map(|t| Binding::Symbol(Symbol::Type(t))),
            _ => None,
        }
    }

    fn bind_simple_name(&self, node: Node<'a>) -> Option<Binding<'a>> {
        let src = self.source_of(node)?;
        let name = syntax::simple_name_of(node, src)?;

        if node.kind() == "identifier" {
            if let Some(local) = self.lookup_local(node, name) {
                return Some(Binding::Symbol(local));
            }
        }

        for decl in syntax::ancestors(node).filter(|n| TYPE_DECLARATION_KINDS.contains(&n.kind())) {
            let Some(id) = self.declared_type(decl) else {
                return None;
            };
            let (found, complete) = self.lookup_members(&self.type_ref(id), name);
            if let Some(value) = found.iter().find(|s| !self.is_method(s)) {
                return Some(Binding::Symbol(value.clone()));
            }
            if !found.is_empty() {
                return Some(Binding::Methods {
                    candidates: found,
                    receiver: None,
                    name: name.to_string(),
                });
            }
            if !complete {
                tracing::trace!(name, "member lookup crossed an unresolved base type");
            }
        }

        if node.kind() == "generic_name" {
            return self
                .resolve_type_syntax(node)
                .map(|t| Binding::Symbol(Symbol::Type(t)));
        }
        if let Some(ty) = self.lookup_type_name(name, Vec::new(), node) {
            return Some(Binding::Symbol(Symbol::Type(ty)));
        }
        if self.is_namespace(name) {
            return Some(Binding::Symbol(Symbol::Namespace(name.to_string())));
        }
        None
    }

    fn bind_member(&self, receiver: Node<'a>, name: &str) -> Option<Binding<'a>> {
        let receiver = syntax::unparenthesize(receiver);

        let receiver_type = if syntax::is_this(receiver) {
            self.type_ref(self.containing_type(receiver)?)
        } else if syntax::is_base(receiver) {
            let own = self.type_ref(self.containing_type(receiver)?);
            let bases = self.direct_supertypes(&own)?;
            bases.into_iter().next()?
        } else {
            match self.bind(receiver) {
                Some(Binding::Symbol(Symbol::Type(ty))) => {
                    return self.bind_on_type(&ty, name, None);
                }
                Some(Binding::Symbol(Symbol::Namespace(ns))) => {
                    let qualified = format!("{}.{}", ns, name);
                    if let Some(full) = self.find_type(&qualified) {
                        return Some(Binding::Symbol(Symbol::Type(TypeRef::named(full))));
                    }
                    if self.is_namespace(&qualified) {
                        return Some(Binding::Symbol(Symbol::Namespace(qualified)));
                    }
                    return None;
                }
                Some(Binding::Symbol(symbol)) => self.symbol_type(&symbol)?,
                Some(Binding::Methods { .. }) => return None,
                None => self.type_of(receiver)?,
            }
        };

        let receiver_type = match receiver_type {
            TypeRef::Nullable { inner } => *inner,
            other => other,
        };
        self.bind_on_type(&receiver_type, name, Some(receiver_type.clone()))
    }

    fn bind_on_type(
        &self,
        ty: &TypeRef,
        name: &str,
        instance: Option<TypeRef>,
    ) -> Option<Binding<'a>> {
        let (found, complete) = self.lookup_members(ty, name);
        if let Some(value) = found.iter().find(|s| !self.is_method(s)) {
            return Some(Binding::Symbol(value.clone()));
        }
        if found.is_empty() {
            if instance.is_none() {
                // Nested type (`Outer.Inner`).
                if let Some(outer) = ty.full_name() {
                    let nested = format!("{}.{}", outer, name);
                    if let Some(full) = self.find_type(&nested) {
                        return Some(Binding::Symbol(Symbol::Type(TypeRef::named(full))));
                    }
                }
            }
            if !complete && instance.is_none() {
                return None;
            }
        }
        if found.is_empty() && instance.is_none() {
            return None;
        }
        Some(Binding::Methods {
            candidates: found,
            receiver: instance,
            name: name.to_string(),
        })
    }

    /// Locals, parameters and the setter `value` visible at `at`.
    fn lookup_local(&self, at: Node<'a>, name: &str) -> Option<Symbol<'a>> {
        let src = self.source_of(at)?;
        for scope in syntax::ancestors(at) {
            match scope.kind() {
                "block" | "switch_section" => {
                    for statement in syntax::named_children(scope) {
                        if statement.start_byte() >= at.start_byte() {
                            break;
                        }
                        if statement.kind() == "local_declaration_statement" {
                            if let Some(d) = syntax::variable_declarators(statement)
                                .into_iter()
                                .find(|d| declarator_name(*d, src) == Some(name))
                            {
                                return Some(Symbol::Local(d));
                            }
                        }
                    }
                }
                "for_statement" | "using_statement" | "fixed_statement" => {
                    if let Some(d) = syntax::variable_declarators(scope)
                        .into_iter()
                        .find(|d| declarator_name(*d, src) == Some(name))
                    {
                        return Some(Symbol::Local(d));
                    }
                }
                "foreach_statement" => {
                    if let Some(left) = scope.child_by_field_name("left") {
                        if left.kind() == "identifier" && syntax::text(left, src) == name {
                            return Some(Symbol::Local(left));
                        }
                    }
                }
                "catch_clause" => {
                    if let Some(decl) = syntax::child_of_kind(scope, "catch_declaration") {
                        if let Some(n) = decl.child_by_field_name("name") {
                            if syntax::text(n, src) == name {
                                return Some(Symbol::Local(n));
                            }
                        }
                    }
                }
                "accessor_declaration" => {
                    let keyword = syntax::children(scope)
                        .into_iter()
                        .map(|c| c.kind())
                        .find(|k| matches!(*k, "get" | "set" | "init" | "add" | "remove"));
                    if name == "value" && matches!(keyword, Some("set" | "init" | "add" | "remove"))
                    {
                        return Some(Symbol::Value(scope));
                    }
                }
                "lambda_expression"
                | "anonymous_method_expression"
                | "local_function_statement"
                | "method_declaration"
                | "constructor_declaration"
                | "operator_declaration"
                | "conversion_operator_declaration"
                | "indexer_declaration" => {
                    for p in syntax::parameters(scope) {
                        let pname = if p.kind() == "identifier" {
                            Some(p)
                        } else {
                            p.child_by_field_name("name")
                        };
                        if pname.map(|n| syntax::text(n, src)) == Some(name) {
                            return Some(Symbol::Parameter(p));
                        }
                    }
                    if scope.kind() == "indexer_declaration" {
                        continue;
                    }
                }
                kind if TYPE_DECLARATION_KINDS.contains(&kind) => return None,
                _ => {}
            }
        }
        None
    }

    // ---------------------------------------------------------------
    // Resolution
    // ---------------------------------------------------------------

    /// Resolve the symbol referenced or declared by `node`.
    pub fn resolve(&self, node: Node<'a>) -> Option<Symbol<'a>> {
        let node = syntax::unparenthesize(node);
        match node.kind() {
            "invocation_expression" => self.resolve_invocation(node),
            "object_creation_expression" => self.resolve_creation(node),
            "variable_declarator"
            | "property_declaration"
            | "method_declaration"
            | "constructor_declaration"
            | "event_declaration"
            | "enum_member_declaration" => self.declared_member(node).map(Symbol::Member),
            "parameter" => Some(Symbol::Parameter(node)),
            "identifier" => {
                if let Some(parent) = node.parent() {
                    let is_name_of = |field: &str| parent.child_by_field_name(field) == Some(node);
                    match parent.kind() {
                        "member_access_expression" if is_name_of("name") => {
                            return self.resolve(parent)
                        }
                        "member_binding_expression" => return self.resolve(parent),
                        _ => {}
                    }
                }
                match self.bind(node)? {
                    Binding::Symbol(symbol) => Some(symbol),
                    Binding::Methods { .. } => None,
                }
            }
            _ => match self.bind(node)? {
                Binding::Symbol(symbol) => Some(symbol),
                Binding::Methods { .. } => None,
            },
        }
    }

    fn resolve_invocation(&self, invocation: Node<'a>) -> Option<Symbol<'a>> {
        let function = invocation.child_by_field_name("function")?;
        let args = syntax::call_arguments(invocation);

        match self.bind(function)? {
            Binding::Methods {
                candidates,
                receiver,
                name,
            } => {
                match self.select_overload(&candidates, &args, None) {
                    Selection::Selected(symbol) => return Some(symbol),
                    Selection::Ambiguous => return None,
                    Selection::NotApplicable => {}
                }
                let receiver = receiver?;
                let extensions = self.extension_methods(&name);
                match self.select_overload(&extensions, &args, Some(&receiver)) {
                    Selection::Selected(symbol) => Some(symbol),
                    _ => None,
                }
            }
            Binding::Symbol(symbol) => {
                // Delegate invocation: `handler(sender, e)`.
                let ty = self.symbol_type(&symbol)?;
                self.delegate_arity(&ty)?;
                let (invoke, _) = self.lookup_members(&ty, "Invoke");
                match self.select_overload(&invoke, &args, None) {
                    Selection::Selected(symbol) => Some(symbol),
                    _ => None,
                }
            }
        }
    }

    fn resolve_creation(&self, creation: Node<'a>) -> Option<Symbol<'a>> {
        let ty = self.resolve_type_syntax(creation.child_by_field_name("type")?)?;
        let full = ty.full_name()?;
        let candidates: Vec<Symbol<'a>> = match self.by_full_name.get(full) {
            Some(id) => self
                .members_of(*id)
                .filter(|(_, m)| m.kind == MemberKind::Constructor)
                .map(|(mid, _)| Symbol::Member(mid))
                .collect(),
            None => self
                .catalog
                .members_named(full, ".ctor")
                .map(Symbol::Known)
                .collect(),
        };
        let args = syntax::call_arguments(creation);
        match self.select_overload(&candidates, &args, None) {
            Selection::Selected(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Parameters of a method or constructor symbol.
    pub fn parameters_of(&self, symbol: &Symbol<'a>) -> Option<Vec<ParameterInfo>> {
        match symbol {
            Symbol::Known(m) => Some(
                m.parameters
                    .iter()
                    .map(|p| ParameterInfo {
                        name: p.name.to_string(),
                        ty: Some(TypeRef::named(p.ty)),
                        has_default: false,
                        is_params: false,
                    })
                    .collect(),
            ),
            Symbol::Member(id) => {
                let member = self.member(*id);
                if !matches!(member.kind, MemberKind::Method | MemberKind::Constructor) {
                    return None;
                }
                let src = self.source_of(member.node)?;
                Some(
                    member
                        .parameters
                        .iter()
                        .map(|p| ParameterInfo {
                            name: p
                                .child_by_field_name("name")
                                .map(|n| syntax::text(n, src).to_string())
                                .unwrap_or_default(),
                            ty: p
                                .child_by_field_name("type")
                                .and_then(|t| self.resolve_type_syntax(t)),
                            has_default: syntax::parameter_has_default(*p),
                            is_params: syntax::is_params_parameter(*p, src),
                        })
                        .collect(),
                )
            }
            _ => None,
        }
    }

    /// Pair each argument of `call` with the parameter of `symbol` it binds to.
    pub fn argument_parameters(
        &self,
        call: Node<'a>,
        symbol: &Symbol<'a>,
    ) -> Option<Vec<(Argument<'a>, ParameterInfo)>> {
        let mut params = self.parameters_of(symbol)?;
        if let Symbol::Member(id) = symbol {
            if self.member(*id).is_extension && self.is_extension_call(call) {
                params.remove(0);
            }
        }
        let args = syntax::call_arguments(call);
        let mapping = self.map_arguments(&params, &args)?;
        Some(
            args.into_iter()
                .zip(mapping)
                .map(|(arg, index)| (arg, params[index].clone()))
                .collect(),
        )
    }

    fn is_extension_call(&self, call: Node<'a>) -> bool {
        call.child_by_field_name("function")
            .map(|f| {
                matches!(
                    syntax::unparenthesize(f).kind(),
                    "member_access_expression" | "conditional_access_expression" | "member_binding_expression"
                )
            })
            .unwrap_or(false)
    }

    /// Map arguments to parameter indexes; `None` if the call cannot bind.
    fn map_arguments(&self, params: &[ParameterInfo], args: &[Argument<'a>]) -> Option<Vec<usize>> {
        let mut used = vec![false; params.len()];
        let mut mapping = Vec::with_capacity(args.len());

        for (position, arg) in args.iter().enumerate() {
            let index = match arg.name {
                Some(name) => {
                    let name = self.text(name);
                    params.iter().position(|p| p.name == name)?
                }
                None if position < params.len() => position,
                None => match params.last() {
                    Some(last) if last.is_params => params.len() - 1,
                    _ => return None,
                },
            };
            if used[index] && !params[index].is_params {
                return None;
            }
            used[index] = true;
            mapping.push(index);
        }

        let satisfied = params
            .iter()
            .zip(&used)
            .all(|(p, used)| *used || p.has_default || p.is_params);
        satisfied.then_some(mapping)
    }

    fn select_overload(
        &self,
        candidates: &[Symbol<'a>],
        args: &[Argument<'a>],
        extension_receiver: Option<&TypeRef>,
    ) -> Selection<'a> {
        let mut applicable: Vec<Applicable<'a>> = Vec::new();

        for candidate in candidates {
            let Some(mut params) = self.parameters_of(candidate) else {
                continue;
            };
            if let Some(receiver) = extension_receiver {
                if params.is_empty() {
                    continue;
                }
                let this_param = params.remove(0);
                if let Some(ty) = &this_param.ty {
                    if self.converts(receiver, ty) == Some(false) {
                        continue;
                    }
                }
            }
            let Some(mapping) = self.map_arguments(&params, args) else {
                continue;
            };

            let mut ok = true;
            for (arg, index) in args.iter().zip(&mapping) {
                let param = &params[*index];
                let Some(ty) = &param.ty else {
                    continue;
                };
                let conversion = if param.is_params {
                    match ty {
                        TypeRef::Array { element } => {
                            match (
                                self.converts_expression(arg.expression, ty),
                                self.converts_expression(arg.expression, element),
                            ) {
                                (Some(true), _) | (_, Some(true)) => Some(true),
                                (Some(false), Some(false)) => Some(false),
                                _ => None,
                            }
                        }
                        _ => None,
                    }
                } else {
                    self.converts_expression(arg.expression, ty)
                };
                if conversion == Some(false) {
                    ok = false;
                    break;
                }
            }
            if ok {
                applicable.push(Applicable {
                    symbol: candidate.clone(),
                    parameters: params,
                    mapping,
                });
            }
        }

        match applicable.len() {
            0 => Selection::NotApplicable,
            1 => match applicable.pop() {
                Some(only) => Selection::Selected(only.symbol),
                None => Selection::NotApplicable,
            },
            _ => {
                let best: Vec<usize> = (0..applicable.len())
                    .filter(|&i| {
                        (0..applicable.len())
                            .filter(|&j| j != i)
                            .all(|j| self.is_better(&applicable[i], &applicable[j]))
                    })
                    .collect();
                if best.len() == 1 {
                    Selection::Selected(applicable.swap_remove(best[0]).symbol)
                } else {
                    Selection::Ambiguous
                }
            }
        }
    }

    /// Better function member: every argument's parameter type is at least as
    /// specific as in `b`, and at least one is strictly more specific.
    fn is_better(&self, a: &Applicable<'a>, b: &Applicable<'a>) -> bool {
        let mut strictly = false;
        for (ia, ib) in a.mapping.iter().zip(&b.mapping) {
            let (Some(ta), Some(tb)) = (&a.parameters[*ia].ty, &b.parameters[*ib].ty) else {
                return false;
            };
            if ta == tb {
                continue;
            }
            match (self.converts(ta, tb), self.converts(tb, ta)) {
                (Some(true), Some(false)) => strictly = true,
                (Some(true), Some(true)) => {}
                _ => return false,
            }
        }
        if !strictly {
            // Fewer defaulted parameters wins on an otherwise equal match.
            return a.parameters.len() < b.parameters.len()
                && a.mapping.len() == a.parameters.len();
        }
        true
    }

    /// Parameter counts of the methods an expression names, if it is a
    /// method group.
    fn method_group_arities(&self, expr: Node<'a>) -> Option<Vec<usize>> {
        if !matches!(
            expr.kind(),
            "identifier" | "generic_name" | "member_access_expression"
        ) {
            return None;
        }
        match self.bind(expr)? {
            Binding::Methods { candidates, .. } if !candidates.is_empty() => Some(
                candidates
                    .iter()
                    .filter_map(|c| self.parameters_of(c))
                    .map(|p| p.len())
                    .collect(),
            ),
            _ => None,
        }
    }

    // ---------------------------------------------------------------
    // Types of symbols and expressions
    // ---------------------------------------------------------------

    /// Declared type of a value symbol, return type of a method.
    pub fn symbol_type(&self, symbol: &Symbol<'a>) -> Option<TypeRef> {
        match symbol {
            Symbol::Member(id) => {
                let member = self.member(*id);
                match member.kind {
                    MemberKind::Constructor | MemberKind::EnumMember => Some(self.type_ref(id.ty)),
                    _ => self.resolve_type_syntax(member.type_syntax?),
                }
            }
            Symbol::Known(m) => Some(TypeRef::named(m.ty)),
            Symbol::Local(node) => {
                let declaration = match node.kind() {
                    "variable_declarator" => node.parent()?,
                    "identifier" => {
                        let parent = node.parent()?;
                        if parent.kind() == "foreach_statement" || parent.kind() == "catch_declaration" {
                            let ty = parent.child_by_field_name("type")?;
                            return self.resolve_type_syntax(ty);
                        }
                        return None;
                    }
                    _ => return None,
                };
                let ty = declaration.child_by_field_name("type")?;
                if ty.kind() == "implicit_type" || self.text(ty) == "var" {
                    self.type_of(syntax::declarator_initializer(*node)?)
                } else {
                    self.resolve_type_syntax(ty)
                }
            }
            Symbol::Parameter(node) => {
                if node.kind() != "parameter" {
                    return None;
                }
                self.resolve_type_syntax(node.child_by_field_name("type")?)
            }
            Symbol::Value(accessor) => {
                let owner = syntax::ancestors(*accessor).find(|n| {
                    matches!(
                        n.kind(),
                        "property_declaration" | "indexer_declaration" | "event_declaration"
                    )
                })?;
                self.resolve_type_syntax(owner.child_by_field_name("type")?)
            }
            Symbol::Type(_) | Symbol::Namespace(_) => None,
        }
    }

    /// Static type of an expression.
    pub fn type_of(&self, expr: Node<'a>) -> Option<TypeRef> {
        let expr = syntax::unparenthesize(expr);
        match expr.kind() {
            "integer_literal" => {
                let t = self.text(expr).to_ascii_lowercase();
                let name = if t.ends_with("ul") || t.ends_with("lu") {
                    "System.UInt64"
                } else if t.ends_with('l') {
                    "System.Int64"
                } else if t.ends_with('u') {
                    "System.UInt32"
                } else {
                    "System.Int32"
                };
                Some(TypeRef::named(name))
            }
            "real_literal" => {
                let t = self.text(expr).to_ascii_lowercase();
                let name = if t.ends_with('f') {
                    "System.Single"
                } else if t.ends_with('m') {
                    "System.Decimal"
                } else {
                    "System.Double"
                };
                Some(TypeRef::named(name))
            }
            "string_literal"
            | "verbatim_string_literal"
            | "raw_string_literal"
            | "interpolated_string_expression" => Some(TypeRef::named(types::STRING)),
            "character_literal" => Some(TypeRef::named("System.Char")),
            "boolean_literal" => Some(TypeRef::named("System.Boolean")),
            "null_literal" => Some(TypeRef::Null),
            "typeof_expression" => Some(TypeRef::named("System.Type")),
            "default_expression" => {
                let ty = expr
                    .child_by_field_name("type")
                    .or_else(|| syntax::named_children(expr).into_iter().next())?;
                self.resolve_type_syntax(ty)
            }
            "cast_expression" => self.resolve_type_syntax(expr.child_by_field_name("type")?),
            "as_expression" => {
                let ty = expr
                    .child_by_field_name("right")
                    .or_else(|| syntax::named_children(expr).into_iter().last())?;
                self.resolve_type_syntax(ty)
            }
            "object_creation_expression" | "array_creation_expression" => {
                self.resolve_type_syntax(expr.child_by_field_name("type")?)
            }
            "this_expression" | "this" => Some(self.type_ref(self.containing_type(expr)?)),
            "checked_expression" => self.type_of(syntax::named_children(expr).into_iter().next()?),
            "conditional_expression" => {
                let a = self.type_of(expr.child_by_field_name("consequence")?)?;
                let b = self.type_of(expr.child_by_field_name("alternative")?)?;
                match (&a, &b) {
                    _ if a == b => Some(a),
                    (TypeRef::Null, _) if self.is_value_type(&b) == Some(false) => Some(b),
                    (_, TypeRef::Null) if self.is_value_type(&a) == Some(false) => Some(a),
                    _ => None,
                }
            }
            "prefix_unary_expression" => {
                let operand = syntax::named_children(expr).into_iter().last()?;
                let operator = syntax::children(expr).into_iter().next()?;
                match operator.kind() {
                    "!" => Some(TypeRef::named("System.Boolean")),
                    "-" | "+" | "~" | "++" | "--" => self.type_of(operand),
                    _ => None,
                }
            }
            "binary_expression" => {
                let operator = expr.child_by_field_name("operator").map(|o| self.text(o))?;
                match operator {
                    "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => {
                        Some(TypeRef::named("System.Boolean"))
                    }
                    _ => {
                        let left = self.type_of(expr.child_by_field_name("left")?)?;
                        let right = self.type_of(expr.child_by_field_name("right")?)?;
                        if operator == "+"
                            && (left.is(types::STRING) || right.is(types::STRING))
                        {
                            return Some(TypeRef::named(types::STRING));
                        }
                        (left == right).then_some(left)
                    }
                }
            }
            "invocation_expression" => {
                if let Some(function) = expr.child_by_field_name("function") {
                    if function.kind() == "identifier" && self.text(function) == "nameof" {
                        return Some(TypeRef::named(types::STRING));
                    }
                }
                let symbol = self.resolve_invocation(expr)?;
                let ty = self.symbol_type(&symbol)?;
                if ty.has_type_parameters() {
                    return None;
                }
                Some(ty)
            }
            "element_access_expression" => {
                let target = self.type_of(expr.child_by_field_name("expression")?)?;
                match target {
                    TypeRef::Array { element } => Some(*element),
                    _ => None,
                }
            }
            "identifier" | "generic_name" | "member_access_expression" | "conditional_access_expression" => {
                if expr.kind() == "member_access_expression" {
                    // Framework enum members are not listed one by one.
                    let receiver = expr.child_by_field_name("expression")?;
                    if let Some(Binding::Symbol(Symbol::Type(ty))) = self.bind(receiver) {
                        let is_known_enum = ty
                            .full_name()
                            .and_then(|name| self.catalog.get_type(name))
                            .map(|t| t.kind == KnownTypeKind::Enum)
                            .unwrap_or(false);
                        if is_known_enum {
                            return Some(ty);
                        }
                    }
                }
                match self.bind(expr)? {
                    Binding::Symbol(symbol) => {
                        let ty = self.symbol_type(&symbol)?;
                        if expr.kind() == "conditional_access_expression"
                            && self.is_value_type(&ty) == Some(true)
                        {
                            return Some(TypeRef::nullable(ty));
                        }
                        Some(ty)
                    }
                    Binding::Methods { .. } => None,
                }
            }
            _ => None,
        }
    }
}

fn normalize_name(text: &str) -> String {
    let cleaned: String = text.split_whitespace().collect();
    cleaned
        .strip_prefix("global::")
        .unwrap_or(&cleaned)
        .to_string()
}

fn join_namespace(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        namespace.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

fn metadata_type_name(name: &str, arity: usize) -> String {
    if arity == 0 {
        name.to_string()
    } else {
        format!("{}`{}", name, arity)
    }
}

fn make_type(full_name: String, args: Vec<TypeRef>) -> TypeRef {
    if args.is_empty() {
        TypeRef::named(full_name)
    } else {
        TypeRef::generic(full_name, args)
    }
}

/// Replace type parameters by position.
fn substitute(ty: &TypeRef, params: &[String], args: &[TypeRef]) -> TypeRef {
    match ty {
        TypeRef::TypeParameter { name } => params
            .iter()
            .position(|p| p == name)
            .and_then(|i| args.get(i))
            .cloned()
            .unwrap_or_else(|| ty.clone()),
        TypeRef::Named { name, args: inner } => TypeRef::generic(
            name.clone(),
            inner.iter().map(|a| substitute(a, params, args)).collect(),
        ),
        TypeRef::Nullable { inner } => TypeRef::nullable(substitute(inner, params, args)),
        TypeRef::Array { element } => TypeRef::Array {
            element: Box::new(substitute(element, params, args)),
        },
        TypeRef::Null => TypeRef::Null,
    }
}

fn type_parameter_names(node: Node<'_>, src: &[u8]) -> Vec<String> {
    let list = node
        .child_by_field_name("type_parameters")
        .or_else(|| syntax::child_of_kind(node, "type_parameter_list"));
    let Some(list) = list else {
        return Vec::new();
    };
    syntax::named_children(list)
        .into_iter()
        .filter(|c| c.kind() == "type_parameter")
        .filter_map(|tp| {
            tp.child_by_field_name("name")
                .or_else(|| syntax::child_of_kind(tp, "identifier"))
                .map(|n| syntax::text(n, src).to_string())
        })
        .collect()
}

fn declarator_name<'s>(declarator: Node<'_>, src: &'s [u8]) -> Option<&'s str> {
    declarator
        .child_by_field_name("name")
        .or_else(|| syntax::child_of_kind(declarator, "identifier"))
        .map(|n| syntax::text(n, src))
}

/// Member symbols declared by one member declaration node.
fn member_symbols<'a>(node: Node<'a>, src: &[u8], in_static_type: bool) -> Vec<MemberSymbol<'a>> {
    let modifiers: Vec<String> = syntax::modifiers(node, src)
        .into_iter()
        .map(str::to_string)
        .collect();
    let single = |kind: MemberKind, name: Option<&str>, type_syntax: Option<Node<'a>>| {
        name.map(|name| MemberSymbol {
            kind,
            name: name.to_string(),
            node,
            declaration: node,
            type_syntax,
            modifiers: modifiers.clone(),
            parameters: syntax::parameters(node),
            is_extension: false,
        })
    };

    match node.kind() {
        "field_declaration" | "event_field_declaration" => {
            let kind = if node.kind() == "field_declaration" {
                MemberKind::Field
            } else {
                MemberKind::Event
            };
            let ty = syntax::variable_declaration_type(node);
            syntax::variable_declarators(node)
                .into_iter()
                .filter_map(|d| {
                    declarator_name(d, src).map(|name| MemberSymbol {
                        kind,
                        name: name.to_string(),
                        node: d,
                        declaration: node,
                        type_syntax: ty,
                        modifiers: modifiers.clone(),
                        parameters: Vec::new(),
                        is_extension: false,
                    })
                })
                .collect()
        }
        "property_declaration" => single(
            MemberKind::Property,
            syntax::declared_name(node, src),
            node.child_by_field_name("type"),
        )
        .into_iter()
        .collect(),
        "event_declaration" => single(
            MemberKind::Event,
            syntax::declared_name(node, src),
            node.child_by_field_name("type"),
        )
        .into_iter()
        .collect(),
        "method_declaration" => {
            let returns = node
                .child_by_field_name("returns")
                .or_else(|| node.child_by_field_name("type"));
            let mut member = single(MemberKind::Method, syntax::declared_name(node, src), returns);
            if let Some(m) = member.as_mut() {
                m.is_extension = in_static_type
                    && m.parameters
                        .first()
                        .map(|p| syntax::is_this_parameter(*p, src))
                        .unwrap_or(false);
            }
            member.into_iter().collect()
        }
        "constructor_declaration" => single(
            MemberKind::Constructor,
            syntax::declared_name(node, src),
            None,
        )
        .into_iter()
        .collect(),
        "enum_member_declaration" => single(
            MemberKind::EnumMember,
            syntax::declared_name(node, src),
            None,
        )
        .into_iter()
        .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Compilation;

    const CONTROL: &str = r#"
namespace Demo
{
    using System.Collections.ObjectModel;
    using System.Windows;
    using System.Windows.Controls;

    public class FooControl : Control
    {
        public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
            nameof(Bar),
            typeof(int),
            typeof(FooControl),
            new PropertyMetadata(default(int), OnBarChanged));

        public int Bar
        {
            get => (int)this.GetValue(BarProperty);
            set => this.SetValue(BarProperty, value);
        }

        public ObservableCollection<int> Items { get; } = new ObservableCollection<int>();

        private static void OnBarChanged(DependencyObject d, DependencyPropertyChangedEventArgs e)
        {
        }
    }
}
"#;

    fn compile(source: &str) -> Compilation {
        Compilation::from_sources([("FooControl.cs", source)]).unwrap()
    }

    fn find<'a>(compilation: &'a Compilation, kind: &str, text: &str) -> Node<'a> {
        let file = &compilation.files()[0];
        syntax::descendants_of_kind(file.tree.root_node(), kind)
            .into_iter()
            .find(|n| file.node_text(*n).starts_with(text))
            .unwrap()
    }

    #[test]
    fn test_indexes_source_types() {
        let compilation = compile(CONTROL);
        let model = SemanticModel::new(compilation.files(), SymbolCatalog::shared());
        assert_eq!(model.types().len(), 1);
        assert_eq!(model.types()[0].full_name, "Demo.FooControl");
        let names: Vec<_> = model.types()[0].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["BarProperty", "Bar", "Items", "OnBarChanged"]);
    }

    #[test]
    fn test_resolves_register_overload() {
        let compilation = compile(CONTROL);
        let model = SemanticModel::new(compilation.files(), SymbolCatalog::shared());
        let register = find(&compilation, "invocation_expression", "DependencyProperty.Register");
        match model.resolve(register) {
            Some(Symbol::Known(m)) => {
                assert_eq!(m.name, "Register");
                assert_eq!(m.parameters.len(), 4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_resolves_metadata_constructor_with_method_group() {
        let compilation = compile(CONTROL);
        let model = SemanticModel::new(compilation.files(), SymbolCatalog::shared());
        let creation = find(&compilation, "object_creation_expression", "new PropertyMetadata");
        match model.resolve(creation) {
            Some(Symbol::Known(m)) => {
                let types: Vec<_> = m.parameters.iter().map(|p| p.ty).collect();
                assert_eq!(
                    types,
                    vec!["System.Object", "System.Windows.PropertyChangedCallback"]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_method_groups_never_fill_object_parameters() {
        let compilation = compile(
            r#"
using System.Windows;
public class FooControl : FrameworkElement
{
    private static readonly FrameworkPropertyMetadata A = new FrameworkPropertyMetadata(OnBarChanged, CoerceBar);
    private static readonly PropertyMetadata B = new PropertyMetadata((d, e) => { });

    private static void OnBarChanged(DependencyObject d, DependencyPropertyChangedEventArgs e) { }

    private static object CoerceBar(DependencyObject d, object value) => value;
}
"#,
        );
        let model = SemanticModel::new(compilation.files(), SymbolCatalog::shared());
        let object = TypeRef::named("System.Object");
        let group = find(&compilation, "identifier", "OnBarChanged");
        assert_eq!(model.converts_expression(group, &object), Some(false));

        let framework = find(&compilation, "object_creation_expression", "new FrameworkPropertyMetadata");
        match model.resolve(framework) {
            Some(Symbol::Known(m)) => {
                let types: Vec<_> = m.parameters.iter().map(|p| p.ty).collect();
                assert_eq!(
                    types,
                    vec!["System.Windows.PropertyChangedCallback", "System.Windows.CoerceValueCallback"]
                );
            }
            other => panic!("unexpected {:?}", other),
        }

        let lambda = find(&compilation, "object_creation_expression", "new PropertyMetadata");
        match model.resolve(lambda) {
            Some(Symbol::Known(m)) => {
                let types: Vec<_> = m.parameters.iter().map(|p| p.ty).collect();
                assert_eq!(types, vec!["System.Windows.PropertyChangedCallback"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_set_value_picks_dependency_property_overload() {
        let compilation = compile(CONTROL);
        let model = SemanticModel::new(compilation.files(), SymbolCatalog::shared());
        let call = find(&compilation, "invocation_expression", "this.SetValue");
        match model.resolve(call) {
            Some(Symbol::Known(m)) => {
                assert_eq!(m.name, "SetValue");
                assert_eq!(m.parameters[0].ty, "System.Windows.DependencyProperty");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_conversions() {
        let compilation = compile(CONTROL);
        let model = SemanticModel::new(compilation.files(), SymbolCatalog::shared());
        let int = TypeRef::named("System.Int32");
        let double = TypeRef::named("System.Double");
        let string = TypeRef::named("System.String");
        let collection = TypeRef::generic(
            "System.Collections.ObjectModel.ObservableCollection`1",
            vec![int.clone()],
        );
        let enumerable = TypeRef::named("System.Collections.IEnumerable");

        assert_eq!(model.converts(&int, &double), Some(true));
        assert_eq!(model.converts(&string, &int), Some(false));
        assert_eq!(model.converts(&TypeRef::Null, &int), Some(false));
        assert_eq!(model.converts(&TypeRef::Null, &TypeRef::nullable(int.clone())), Some(true));
        assert_eq!(model.converts(&collection, &enumerable), Some(true));
        assert_eq!(
            model.converts(&TypeRef::named("Demo.FooControl"), &TypeRef::named("System.Windows.DependencyObject")),
            Some(true)
        );
    }

    #[test]
    fn test_type_of_members_and_literals() {
        let compilation = compile(CONTROL);
        let model = SemanticModel::new(compilation.files(), SymbolCatalog::shared());
        let field = find(&compilation, "identifier", "BarProperty");
        assert_eq!(
            model.type_of(field),
            Some(TypeRef::named("System.Windows.DependencyProperty"))
        );
        let default = find(&compilation, "default_expression", "default(int)");
        assert_eq!(model.type_of(default), Some(TypeRef::named("System.Int32")));
    }

    #[test]
    fn test_resolves_extension_call() {
        let compilation = compile(
            r#"
using System.Windows;
public static class Foo
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.RegisterAttached(
        "Bar", typeof(int), typeof(Foo));

    public static void SetBar(this DependencyObject element, int value) => element.SetValue(BarProperty, value);
}

public class Window1 : FrameworkElement
{
    public void M() { this.SetBar(1); }
}
"#,
        );
        let model = SemanticModel::new(compilation.files(), SymbolCatalog::shared());
        let call = find(&compilation, "invocation_expression", "this.SetBar");
        let symbol = model.resolve(call).unwrap();
        match symbol {
            Symbol::Member(id) => {
                assert_eq!(model.member(id).name, "SetBar");
                assert!(model.member(id).is_extension);
            }
            ref other => panic!("unexpected {:?}", other),
        }

        // The receiver fills `this`, so `1` binds to `value`.
        let bound = model.argument_parameters(call, &symbol).unwrap();
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].1.name, "value");
    }

    #[test]
    fn test_unknown_receiver_stays_unresolved() {
        let compilation = compile(
            "class Foo { void M() { Unknown.Register(\"A\", typeof(int), typeof(Foo)); } }",
        );
        let model = SemanticModel::new(compilation.files(), SymbolCatalog::shared());
        let call = find(&compilation, "invocation_expression", "Unknown.Register");
        assert!(model.resolve(call).is_none());
    }
}
