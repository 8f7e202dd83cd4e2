use crate::blocks::{BlockShape, RFID_MODULE};
use crate::context::GenerationContext;
use crate::program::{BlockInstance, Program};

pub const IMPORT_KEY: &str = "import_rfid";
pub const IMPORT_LINE: &str = "from rfid import *";

/// Binding strength of an expression fragment. Lower binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Order {
    Atomic = 0,
    Loosest = 99,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub code: String,
    pub order: Order,
}

impl Expression {
    /// Code ready to drop into a slot whose consumer binds at `outer`.
    pub fn embed(&self, outer: Order) -> String {
        if self.order > outer {
            format!("({})", self.code)
        } else {
            self.code.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Expression(Expression),
    /// Newline-terminated line.
    Statement(String),
}

impl Fragment {
    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Fragment::Expression(expr) => Some(expr),
            Fragment::Statement(_) => None,
        }
    }

    pub fn as_statement(&self) -> Option<&str> {
        match self {
            Fragment::Statement(line) => Some(line),
            Fragment::Expression(_) => None,
        }
    }
}

pub fn emit(block: &BlockInstance, ctx: &mut GenerationContext) -> Fragment {
    ctx.define(IMPORT_KEY, IMPORT_LINE);
    let kind = block.kind();
    let code = match *block {
        BlockInstance::ScanCard => format!("{}.{}()", RFID_MODULE, kind.name()),
        BlockInstance::ScanAndCheck(list)
        | BlockInstance::ScanAndAddCard(list)
        | BlockInstance::ScanAndRemoveCard(list)
        | BlockInstance::ClearList(list) => format!(
            "{}.{}(\"{}\")",
            RFID_MODULE,
            kind.name(),
            list.list_name()
        ),
    };
    match kind.spec().shape {
        BlockShape::Expression => Fragment::Expression(Expression {
            code,
            order: Order::Atomic,
        }),
        BlockShape::Statement => Fragment::Statement(format!("{}\n", code)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCode {
    pub definitions: Vec<String>,
    pub body: String,
    /// Top-level expression fragments, left for the consuming construct.
    pub expressions: Vec<Expression>,
}

impl GeneratedCode {
    pub fn source(&self) -> String {
        let mut out = String::new();
        for def in &self.definitions {
            out.push_str(def);
            out.push('\n');
        }
        out.push_str(&self.body);
        out
    }
}

pub fn generate(program: &Program) -> GeneratedCode {
    let mut ctx = GenerationContext::new();
    let mut body = String::new();
    let mut expressions = Vec::new();
    for block in &program.blocks {
        match emit(block, &mut ctx) {
            Fragment::Statement(line) => body.push_str(&line),
            Fragment::Expression(expr) => expressions.push(expr),
        }
    }
    GeneratedCode {
        definitions: ctx.definitions().map(str::to_string).collect(),
        body,
        expressions,
    }
}
