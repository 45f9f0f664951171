// src/model/program.rs
//! In-memory program model.
//!
//! ProgramModel stores the resolved types and declarations a host has
//! collected for one analysis session, providing type-safe lookups by ID and
//! qualified name. Hosts with their own symbol tables implement [`Resolver`]
//! directly instead.

use rustc_hash::FxHashMap;

use crate::model::resolver::{ResolveError, Resolver};
use crate::model::{DeclId, DeclKind, Declaration, Marker, TypeId};

/// A type known to the resolver
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub id: TypeId,
    /// Qualified name, e.g. `fluent.dsl.Builder`
    pub name: String,
    /// Direct supertypes in declaration order: superclass first, then
    /// interfaces
    pub supertypes: Vec<TypeId>,
    /// Declared methods in declaration order
    pub methods: Vec<DeclId>,
    /// Type-level ignore marker
    pub ignored: bool,
    /// Declaration standing for the type name itself
    pub decl: DeclId,
}

/// Session-wide store of resolved program facts
#[derive(Debug, Default)]
pub struct ProgramModel {
    types: Vec<TypeInfo>,
    decls: Vec<Declaration>,
    type_by_name: FxHashMap<String, TypeId>,
}

impl ProgramModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type by qualified name
    pub fn add_type(&mut self, qualified_name: impl Into<String>) -> TypeId {
        let name = qualified_name.into();
        let id = TypeId::new(self.types.len() as u32);
        let decl = self.push_decl(Declaration {
            id: DeclId::new(0),
            kind: DeclKind::Type,
            name: name.clone(),
            owner: None,
            is_static: false,
            is_default: false,
            ty: Some(id),
            opener: None,
            terminator: None,
            ignored: false,
        });
        self.types.push(TypeInfo {
            id,
            name: name.clone(),
            supertypes: Vec::new(),
            methods: Vec::new(),
            ignored: false,
            decl,
        });
        self.type_by_name.insert(name, id);
        id
    }

    pub fn add_supertype(&mut self, ty: TypeId, supertype: TypeId) {
        self.types[ty.index() as usize].supertypes.push(supertype);
    }

    pub fn ignore_type(&mut self, ty: TypeId) {
        self.types[ty.index() as usize].ignored = true;
    }

    /// Register an instance method. `ty` is the return type; `None` is void.
    pub fn add_method(&mut self, owner: TypeId, name: impl Into<String>, ty: Option<TypeId>) -> DeclId {
        self.add_method_decl(owner, name, ty, false, false)
    }

    pub fn add_static_method(
        &mut self,
        owner: TypeId,
        name: impl Into<String>,
        ty: Option<TypeId>,
    ) -> DeclId {
        self.add_method_decl(owner, name, ty, true, false)
    }

    pub fn add_default_method(
        &mut self,
        owner: TypeId,
        name: impl Into<String>,
        ty: Option<TypeId>,
    ) -> DeclId {
        self.add_method_decl(owner, name, ty, false, true)
    }

    pub fn add_constructor(&mut self, owner: TypeId) -> DeclId {
        let name = self.types[owner.index() as usize].name.clone();
        let id = self.push_decl(Declaration {
            id: DeclId::new(0),
            kind: DeclKind::Constructor,
            name,
            owner: Some(owner),
            is_static: false,
            is_default: false,
            ty: Some(owner),
            opener: None,
            terminator: None,
            ignored: false,
        });
        self.types[owner.index() as usize].methods.push(id);
        id
    }

    pub fn add_field(&mut self, owner: TypeId, name: impl Into<String>, ty: TypeId) -> DeclId {
        self.add_member(owner, name, DeclKind::Field, Some(ty), false)
    }

    pub fn add_static_field(
        &mut self,
        owner: TypeId,
        name: impl Into<String>,
        ty: TypeId,
    ) -> DeclId {
        self.add_member(owner, name, DeclKind::Field, Some(ty), true)
    }

    /// Register a local variable or parameter. `ty` of `None` stands for a
    /// receiver (`this`) identifier, which contributes no chain obligations.
    pub fn add_parameter(&mut self, name: impl Into<String>, ty: Option<TypeId>) -> DeclId {
        self.push_decl(Declaration {
            id: DeclId::new(0),
            kind: DeclKind::Parameter,
            name: name.into(),
            owner: None,
            is_static: false,
            is_default: false,
            ty,
            opener: None,
            terminator: None,
            ignored: false,
        })
    }

    pub fn mark_opener(&mut self, decl: DeclId, message: Option<&str>) {
        self.decls[decl.index() as usize].opener = Some(match message {
            Some(text) => Marker::with_message(text),
            None => Marker::plain(),
        });
    }

    pub fn mark_terminator(&mut self, decl: DeclId, message: Option<&str>) {
        self.decls[decl.index() as usize].terminator = Some(match message {
            Some(text) => Marker::with_message(text),
            None => Marker::plain(),
        });
    }

    pub fn mark_ignored(&mut self, decl: DeclId) {
        self.decls[decl.index() as usize].ignored = true;
    }

    /// Declaration standing for the type name itself (method-ref qualifiers)
    pub fn type_decl(&self, ty: TypeId) -> DeclId {
        self.types[ty.index() as usize].decl
    }

    fn add_method_decl(
        &mut self,
        owner: TypeId,
        name: impl Into<String>,
        ty: Option<TypeId>,
        is_static: bool,
        is_default: bool,
    ) -> DeclId {
        let id = self.push_decl(Declaration {
            id: DeclId::new(0),
            kind: DeclKind::Method,
            name: name.into(),
            owner: Some(owner),
            is_static,
            is_default,
            ty,
            opener: None,
            terminator: None,
            ignored: false,
        });
        self.types[owner.index() as usize].methods.push(id);
        id
    }

    fn add_member(
        &mut self,
        owner: TypeId,
        name: impl Into<String>,
        kind: DeclKind,
        ty: Option<TypeId>,
        is_static: bool,
    ) -> DeclId {
        self.push_decl(Declaration {
            id: DeclId::new(0),
            kind,
            name: name.into(),
            owner: Some(owner),
            is_static,
            is_default: false,
            ty,
            opener: None,
            terminator: None,
            ignored: false,
        })
    }

    fn push_decl(&mut self, mut decl: Declaration) -> DeclId {
        let id = DeclId::new(self.decls.len() as u32);
        decl.id = id;
        self.decls.push(decl);
        id
    }
}

impl Resolver for ProgramModel {
    fn declaration(&self, id: DeclId) -> Result<&Declaration, ResolveError> {
        self.decls
            .get(id.index() as usize)
            .ok_or(ResolveError::UnknownDeclaration(id.index()))
    }

    fn type_info(&self, id: TypeId) -> Result<&TypeInfo, ResolveError> {
        self.types
            .get(id.index() as usize)
            .ok_or(ResolveError::UnknownType(id.index()))
    }

    fn lookup_type(&self, qualified_name: &str) -> Option<TypeId> {
        self.type_by_name.get(qualified_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup_type() {
        let mut model = ProgramModel::new();
        let builder = model.add_type("fluent.dsl.Builder");

        assert_eq!(model.lookup_type("fluent.dsl.Builder"), Some(builder));
        assert_eq!(model.lookup_type("fluent.dsl.Missing"), None);
        assert_eq!(model.type_info(builder).unwrap().name, "fluent.dsl.Builder");
    }

    #[test]
    fn methods_keep_declaration_order() {
        let mut model = ProgramModel::new();
        let builder = model.add_type("Builder");
        let step = model.add_method(builder, "step", Some(builder));
        let build = model.add_method(builder, "build", None);

        assert_eq!(model.type_info(builder).unwrap().methods, vec![step, build]);
    }

    #[test]
    fn constructor_yields_constructed_type() {
        let mut model = ProgramModel::new();
        let builder = model.add_type("Builder");
        let ctor = model.add_constructor(builder);

        let decl = model.declaration(ctor).unwrap();
        assert!(decl.is_constructor());
        assert_eq!(decl.ty, Some(builder));
    }

    #[test]
    fn markers_are_queryable_after_construction() {
        let mut model = ProgramModel::new();
        let builder = model.add_type("Builder");
        let open = model.add_method(builder, "open", Some(builder));
        model.mark_opener(open, Some("complete the sentence"));
        let build = model.add_method(builder, "build", None);
        model.mark_terminator(build, None);

        let open = model.declaration(open).unwrap();
        assert_eq!(
            open.opener().and_then(|m| m.message.as_deref()),
            Some("complete the sentence")
        );
        let build = model.declaration(build).unwrap();
        assert!(build.terminator().is_some());
        assert!(build.terminator().unwrap().message.is_none());
    }

    #[test]
    fn unknown_handles_resolve_to_errors() {
        let model = ProgramModel::new();
        assert!(matches!(
            model.declaration(DeclId::new(9)),
            Err(ResolveError::UnknownDeclaration(9))
        ));
        assert!(matches!(
            model.type_info(TypeId::new(2)),
            Err(ResolveError::UnknownType(2))
        ));
    }
}
