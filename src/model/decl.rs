// src/model/decl.rs
//! First-class identity types and resolved declarations.
//!
//! Marker lookups are resolved once, when a declaration is constructed; the
//! analysis only ever sees the plain query methods.

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name(u32);

        impl $name {
            pub fn new(index: u32) -> Self {
                Self(index)
            }

            pub fn index(self) -> u32 {
                self.0
            }
        }
    };
}

define_entity_id! {
    /// Identity for a type known to the resolver
    pub struct TypeId;
}

define_entity_id! {
    /// Identity for a resolved declaration (method, constructor, field, ...)
    pub struct DeclId;
}

/// Kind of a resolved declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Method,
    Constructor,
    Type,
    Field,
    Parameter,
}

/// An opener or terminator marker, with its optional custom diagnostic
/// message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marker {
    pub message: Option<String>,
}

impl Marker {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// A resolved symbol: immutable for the lifetime of the analysis session
#[derive(Debug, Clone)]
pub struct Declaration {
    pub id: DeclId,
    pub kind: DeclKind,
    /// Simple (unqualified) name
    pub name: String,
    /// Enclosing type, if any
    pub owner: Option<TypeId>,
    pub is_static: bool,
    /// Default interface method (never a lambda target)
    pub is_default: bool,
    /// Return type (Method, `None` = void), constructed type (Constructor),
    /// declared type (Field/Parameter), self type (Type)
    pub ty: Option<TypeId>,
    pub(crate) opener: Option<Marker>,
    pub(crate) terminator: Option<Marker>,
    pub(crate) ignored: bool,
}

impl Declaration {
    /// Opener marker, if the declaration carries one
    pub fn opener(&self) -> Option<&Marker> {
        self.opener.as_ref()
    }

    /// Terminator marker, if the declaration carries one
    pub fn terminator(&self) -> Option<&Marker> {
        self.terminator.as_ref()
    }

    /// Whether diagnostics inside this declaration are suppressed
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == DeclKind::Constructor
    }

    /// Rendering used for terminal-set membership and diagnostics
    pub fn signature(&self) -> String {
        match self.kind {
            DeclKind::Method | DeclKind::Constructor => format!("{}()", self.name),
            _ => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str) -> Declaration {
        Declaration {
            id: DeclId::new(0),
            kind: DeclKind::Method,
            name: name.to_string(),
            owner: None,
            is_static: false,
            is_default: false,
            ty: None,
            opener: None,
            terminator: None,
            ignored: false,
        }
    }

    #[test]
    fn ids_compare_by_index() {
        assert_eq!(TypeId::new(3), TypeId::new(3));
        assert_ne!(DeclId::new(0), DeclId::new(1));
        assert_eq!(DeclId::new(7).index(), 7);
    }

    #[test]
    fn method_signature_appends_parens() {
        assert_eq!(method("build").signature(), "build()");
    }

    #[test]
    fn field_signature_is_bare_name() {
        let mut decl = method("limit");
        decl.kind = DeclKind::Field;
        assert_eq!(decl.signature(), "limit");
    }

    #[test]
    fn marker_queries_reflect_flags() {
        let mut decl = method("open");
        assert!(decl.opener().is_none());
        assert!(decl.terminator().is_none());
        assert!(!decl.is_ignored());

        decl.opener = Some(Marker::with_message("finish the sentence"));
        decl.terminator = Some(Marker::plain());
        decl.ignored = true;

        assert_eq!(
            decl.opener().and_then(|m| m.message.as_deref()),
            Some("finish the sentence")
        );
        assert!(decl.terminator().is_some());
        assert!(decl.is_ignored());
    }
}
