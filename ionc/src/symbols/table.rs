use crate::error::{Error, Position};
use crate::grammer::ast::Node;
use crate::symbols::types::DataType;
use indexmap::IndexMap;
use std::fmt;

/// Index into the variable arena; also the storage label `var_<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub usize);

/// Index into the function arena; also the code label `function_<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub usize);

impl VarId {
    pub fn label(&self) -> String {
        format!("var_{}", self.0)
    }
}

impl FuncId {
    pub fn label(&self) -> String {
        format!("function_{}", self.0)
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for FuncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub id: VarId,
    pub name: String,
    pub ty: DataType,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub id: FuncId,
    pub name: String,
    pub body: Option<Node>,
}

/// Flat, global symbol tables. Variables and functions live in separate arenas but share
/// one namespace.
#[derive(Debug, Default)]
pub struct Symbols {
    vars: Vec<Variable>,
    funcs: Vec<Function>,
    var_names: IndexMap<String, VarId>,
    func_names: IndexMap<String, FuncId>,
}

impl Symbols {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_declared(&self, name: &str) -> bool {
        self.var_names.contains_key(name) || self.func_names.contains_key(name)
    }

    pub fn declare_var(&mut self, name: &str, ty: DataType, pos: &Position) -> Result<VarId, Error> {
        if self.is_declared(name) {
            return Err(Error::VariableRedeclaration(name.to_string(), pos.clone()));
        }
        let id = VarId(self.vars.len());
        self.vars.push(Variable {
            id,
            name: name.to_string(),
            ty,
        });
        self.var_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Declare a function before its body is parsed, so the body may refer to it.
    pub fn declare_func(&mut self, name: &str, pos: &Position) -> Result<FuncId, Error> {
        if self.is_declared(name) {
            return Err(Error::FunctionRedeclaration(name.to_string(), pos.clone()));
        }
        let id = FuncId(self.funcs.len());
        self.funcs.push(Function {
            id,
            name: name.to_string(),
            body: None,
        });
        self.func_names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn define_func(&mut self, id: FuncId, body: Node) {
        if let Some(func) = self.funcs.get_mut(id.0) {
            func.body = Some(body);
        }
    }

    pub fn lookup_var(&self, name: &str, pos: &Position) -> Result<VarId, Error> {
        self.var_names
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownVariable(name.to_string(), pos.clone()))
    }

    pub fn lookup_func(&self, name: &str, pos: &Position) -> Result<FuncId, Error> {
        self.func_names
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownFunction(name.to_string(), pos.clone()))
    }

    pub fn var(&self, id: VarId) -> Option<&Variable> {
        self.vars.get(id.0)
    }

    pub fn func(&self, id: FuncId) -> Option<&Function> {
        self.funcs.get(id.0)
    }

    pub fn into_parts(self) -> (Vec<Function>, Vec<Variable>) {
        (self.funcs, self.vars)
    }
}
