use crate::inst::Inst;

use color_print::cformat;
use std::fmt;

/// Storage unit of a `res*` reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    QWord,
}

impl Width {
    pub fn bytes(self) -> usize {
        match self {
            Width::Byte => 1,
            Width::QWord => 8,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            Width::Byte => "resb",
            Width::QWord => "resq",
        }
    }
}

/// One line of an assembly unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `BITS 64`, `segment .text`, `global _start`
    Directive(String),
    /// `label: resq 1`
    Reserve(String, Width, usize),
    /// `label:` with an optional trailing comment
    Label(String, Option<String>),
    Inst(Inst),
}

impl Line {
    pub fn label(name: impl Into<String>) -> Self {
        Line::Label(name.into(), None)
    }

    pub fn cformat(&self) -> String {
        match self {
            Line::Directive(text) => cformat!("<m>{}</>", text),
            Line::Reserve(name, width, count) => {
                cformat!("    <c>{}</>: {} {}", name, width.directive(), count)
            }
            Line::Label(name, Some(comment)) => cformat!("<g>{}:</> <y>;; {}</>", name, comment),
            Line::Label(name, None) => cformat!("<g>{}:</>", name),
            Line::Inst(inst) => format!("    {}", inst.cformat()),
        }
    }
}

impl From<Inst> for Line {
    fn from(inst: Inst) -> Self {
        Line::Inst(inst)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Directive(text) => write!(f, "{}", text),
            Line::Reserve(name, width, count) => {
                write!(f, "    {}: {} {}", name, width.directive(), count)
            }
            Line::Label(name, Some(comment)) => write!(f, "{}: ;; {}", name, comment),
            Line::Label(name, None) => write!(f, "{}:", name),
            Line::Inst(inst) => write!(f, "    {}", inst),
        }
    }
}

/// A complete assembly unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code(pub Vec<Line>);

impl Code {
    pub fn lines(&self) -> &[Line] {
        &self.0
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|line| match line {
            Line::Label(name, _) | Line::Reserve(name, _, _) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.0 {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
