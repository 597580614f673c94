#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Ident(String),
    List(Vec<Expr>),
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// A condition operand keeps the id of the sub-block it came from so the
/// emitter can name it in per-check trace events.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub block_id: String,
    pub expr: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    While,
    Until,
}

impl LoopMode {
    pub fn parse(value: &str) -> Option<LoopMode> {
        match value {
            "WHILE" => Some(LoopMode::While),
            "UNTIL" => Some(LoopMode::Until),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Break,
    Continue,
}

impl FlowKind {
    pub fn parse(value: &str) -> Option<FlowKind> {
        match value {
            "BREAK" => Some(FlowKind::Break),
            "CONTINUE" => Some(FlowKind::Continue),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declare {
        name: String,
        init: Option<Expr>,
    },
    Assign {
        target: String,
        value: Expr,
    },
    ExprStmt {
        expr: Expr,
    },
    Repeat {
        id: String,
        times: Option<Expr>,
        body: Vec<Statement>,
    },
    RepeatExt {
        id: String,
        times: Option<Expr>,
        body: Vec<Statement>,
    },
    WhileUntil {
        id: String,
        mode: LoopMode,
        condition: Option<Condition>,
        body: Vec<Statement>,
    },
    DoWhile {
        id: String,
        mode: LoopMode,
        condition: Option<Condition>,
        body: Vec<Statement>,
    },
    For {
        id: String,
        var: String,
        from: Option<Expr>,
        to: Option<Expr>,
        by: Option<Expr>,
        body: Vec<Statement>,
    },
    ForEach {
        id: String,
        var: String,
        list: Option<Expr>,
        body: Vec<Statement>,
    },
    Flow {
        id: String,
        kind: FlowKind,
    },
}

impl Statement {
    /// The stable block id used for trace emission, if this statement kind
    /// carries one.
    pub fn block_id(&self) -> Option<&str> {
        match self {
            Statement::Repeat { id, .. }
            | Statement::RepeatExt { id, .. }
            | Statement::WhileUntil { id, .. }
            | Statement::DoWhile { id, .. }
            | Statement::For { id, .. }
            | Statement::ForEach { id, .. }
            | Statement::Flow { id, .. } => Some(id),
            Statement::Declare { .. } | Statement::Assign { .. } | Statement::ExprStmt { .. } => {
                None
            }
        }
    }

    pub fn body(&self) -> Option<&[Statement]> {
        match self {
            Statement::Repeat { body, .. }
            | Statement::RepeatExt { body, .. }
            | Statement::WhileUntil { body, .. }
            | Statement::DoWhile { body, .. }
            | Statement::For { body, .. }
            | Statement::ForEach { body, .. } => Some(body),
            Statement::Declare { .. }
            | Statement::Assign { .. }
            | Statement::ExprStmt { .. }
            | Statement::Flow { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Script {
    pub name: Option<String>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct Program {
    pub scripts: Vec<Script>,
}
