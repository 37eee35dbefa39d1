use crate::compile::Program;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Source names of a program and the labels they were lowered to
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SymbolMap {
    pub functions: IndexMap<String, FuncEntry>,
    pub variables: IndexMap<String, VarEntry>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FuncEntry {
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct VarEntry {
    pub label: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl SymbolMap {
    pub fn generate(program: &Program) -> Self {
        let functions = program
            .functions
            .iter()
            .map(|func| {
                let entry = FuncEntry {
                    label: func.id.label(),
                };
                (func.name.clone(), entry)
            })
            .collect();

        let variables = program
            .variables
            .iter()
            .map(|var| {
                let entry = VarEntry {
                    label: var.id.label(),
                    ty: var.ty.to_string(),
                };
                (var.name.clone(), entry)
            })
            .collect();

        SymbolMap {
            functions,
            variables,
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
