use crate::error::{Error, Position};
use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Void,                                    // "void"
    Boolean,                                 // "bool"
    UInt64,                                  // "uint64"
    Pointer(Box<DataType>, usize),           // type "*" { "*" }
    Struct(String, Vec<(String, DataType)>), // "struct" ident "{" { type ident ";" } "}"
    Class(String),                           // "class" ident ";"
}

impl DataType {
    /// Wrap `self` in `depth` levels of indirection.
    pub fn pointer(self, depth: usize) -> DataType {
        match (self, depth) {
            (ty, 0) => ty,
            (DataType::Pointer(base, n), depth) => DataType::Pointer(base, n + depth),
            (ty, depth) => DataType::Pointer(Box::new(ty), depth),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Void => write!(f, "void"),
            DataType::Boolean => write!(f, "bool"),
            DataType::UInt64 => write!(f, "uint64"),
            DataType::Pointer(base, depth) => write!(f, "{}{}", base, "*".repeat(*depth)),
            DataType::Struct(name, _) => write!(f, "struct {}", name),
            DataType::Class(name) => write!(f, "class {}", name),
        }
    }
}

/// Resolves type names. Lookup order is primitives, structs, classes.
#[derive(Debug)]
pub struct TypeTable {
    primitives: IndexMap<&'static str, DataType>,
    structs: IndexMap<String, DataType>,
    classes: IndexMap<String, DataType>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    pub fn new() -> Self {
        let primitives = IndexMap::from([
            ("void", DataType::Void),
            ("bool", DataType::Boolean),
            ("uint64", DataType::UInt64),
        ]);
        TypeTable {
            primitives,
            structs: IndexMap::new(),
            classes: IndexMap::new(),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.primitives.contains_key(name)
            || self.structs.contains_key(name)
            || self.classes.contains_key(name)
    }

    pub fn resolve(&self, name: &str, pos: &Position) -> Result<DataType, Error> {
        self.primitives
            .get(name)
            .or_else(|| self.structs.get(name))
            .or_else(|| self.classes.get(name))
            .cloned()
            .ok_or_else(|| Error::UnknownDataType(name.to_string(), pos.clone()))
    }

    /// Register a struct or class definition. A later definition with the same name replaces
    /// the earlier one.
    pub fn register(&mut self, ty: DataType) {
        match &ty {
            DataType::Struct(name, _) => {
                self.structs.insert(name.clone(), ty);
            }
            DataType::Class(name) => {
                self.classes.insert(name.clone(), ty);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> Position {
        Position {
            file: "test.ion".into(),
            line: 1,
            col: 1,
        }
    }

    #[test]
    fn primitives_resolve() {
        let table = TypeTable::new();
        assert_eq!(table.resolve("uint64", &here()).ok(), Some(DataType::UInt64));
        assert_eq!(table.resolve("bool", &here()).ok(), Some(DataType::Boolean));
        assert!(table.exists("void"));
    }

    #[test]
    fn unknown_type_fails() {
        let table = TypeTable::new();
        assert!(matches!(
            table.resolve("float", &here()),
            Err(Error::UnknownDataType(name, _)) if name == "float"
        ));
    }

    #[test]
    fn struct_before_class() {
        let mut table = TypeTable::new();
        table.register(DataType::Class("Point".into()));
        table.register(DataType::Struct(
            "Point".into(),
            vec![("x".into(), DataType::UInt64)],
        ));
        assert!(matches!(
            table.resolve("Point", &here()),
            Ok(DataType::Struct(..))
        ));
    }

    #[test]
    fn pointer_depth_accumulates() {
        let ty = DataType::UInt64.pointer(1).pointer(2);
        assert_eq!(ty, DataType::Pointer(Box::new(DataType::UInt64), 3));
        assert_eq!(ty.to_string(), "uint64***");
    }
}
