//! Static types of the language.
//!
//! Every expression in the AST carries a [`VarType`]. Primitive types have a
//! fixed byte size; structs are laid out sequentially with no padding, so a
//! member's offset is the sum of the sizes of the members declared before it.

use std::{fmt::Display, rc::Rc};

use crate::lexer::tokens::TokenKind;

#[derive(Debug, Clone, PartialEq)]
pub enum VarType {
    Void,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Struct(Rc<StructLayout>),
    Pointer(Rc<VarType>),
    Array(Rc<VarType>, u32),
    /// Type of an expression that failed to resolve.
    Error,
}

impl VarType {
    /// Maps a primitive type keyword to its type. Primitives are resolved
    /// before any scope is consulted and can never be shadowed.
    pub fn primitive(kind: TokenKind) -> Option<VarType> {
        match kind {
            TokenKind::Void => Some(VarType::Void),
            TokenKind::Char => Some(VarType::Char),
            TokenKind::Short => Some(VarType::Short),
            TokenKind::Int => Some(VarType::Int),
            TokenKind::Long => Some(VarType::Long),
            TokenKind::Float => Some(VarType::Float),
            TokenKind::Double => Some(VarType::Double),
            _ => None,
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u32 {
        match self {
            VarType::Void | VarType::Error => 0,
            VarType::Char => 1,
            VarType::Short => 2,
            VarType::Int | VarType::Float => 4,
            VarType::Long | VarType::Double | VarType::Pointer(_) => 8,
            VarType::Struct(layout) => layout.size,
            VarType::Array(element, count) => element.size() * count,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            VarType::Char | VarType::Short | VarType::Int | VarType::Long
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, VarType::Float | VarType::Double)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Values that can be tested for truth.
    pub fn is_scalar(&self) -> bool {
        self.is_numeric() || matches!(self, VarType::Pointer(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, VarType::Error)
    }

    pub fn pointer_to(self) -> VarType {
        VarType::Pointer(Rc::new(self))
    }

    pub fn as_struct(&self) -> Option<&Rc<StructLayout>> {
        match self {
            VarType::Struct(layout) => Some(layout),
            _ => None,
        }
    }

    /// The struct a pointer points at, if any.
    pub fn pointee_struct(&self) -> Option<&Rc<StructLayout>> {
        match self {
            VarType::Pointer(base) => base.as_struct(),
            _ => None,
        }
    }
}

impl Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarType::Void => write!(f, "void"),
            VarType::Char => write!(f, "char"),
            VarType::Short => write!(f, "short"),
            VarType::Int => write!(f, "int"),
            VarType::Long => write!(f, "long"),
            VarType::Float => write!(f, "float"),
            VarType::Double => write!(f, "double"),
            VarType::Struct(layout) => write!(f, "struct {}", layout.name),
            VarType::Pointer(base) => write!(f, "{}*", base),
            VarType::Array(element, count) => write!(f, "{}[{}]", element, count),
            VarType::Error => write!(f, "<error>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub var_type: VarType,
    pub name: String,
    /// Byte offset from the start of the struct.
    pub offset: u32,
}

/// A declared struct. Two layouts are the same type only if they come from
/// the same declaration, which is what `id` identifies.
#[derive(Debug, Clone)]
pub struct StructLayout {
    pub id: usize,
    pub name: String,
    pub members: Vec<Member>,
    pub size: u32,
}

impl StructLayout {
    pub fn new(id: usize, name: String) -> Self {
        StructLayout {
            id,
            name,
            members: vec![],
            size: 0,
        }
    }

    /// Appends a member at the current end of the struct.
    ///
    /// Returns `false` if a member with that name already exists.
    pub fn push_member(&mut self, name: String, var_type: VarType) -> bool {
        if self.member(&name).is_some() {
            return false;
        }

        let offset = self.size;
        self.size += var_type.size();
        self.members.push(Member {
            var_type,
            name,
            offset,
        });

        true
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.name == name)
    }

    /// Position of the member in declaration order.
    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|member| member.name == name)
    }
}

impl PartialEq for StructLayout {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
