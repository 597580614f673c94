use crate::ast::{Expr, FlowKind, Program, Script, Statement};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone)]
pub struct SemanticError {
    pub message: String,
}

impl Display for SemanticError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for SemanticError {}

#[derive(Debug, Clone)]
pub struct SemanticWarning {
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct SemanticReport {
    pub warnings: Vec<SemanticWarning>,
}

// Emitted identifiers must survive as JavaScript identifiers.
const JS_KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "export", "extends", "finally", "for", "function", "if", "import", "in", "instanceof",
    "let", "new", "return", "super", "switch", "this", "throw", "try", "typeof", "var", "void",
    "while", "with", "yield",
];

pub fn analyze(program: &Program) -> Result<SemanticReport, SemanticError> {
    if program.scripts.is_empty() {
        return Err(SemanticError {
            message: "Program must define at least one script.".to_string(),
        });
    }

    let mut script_names = HashSet::new();
    for script in &program.scripts {
        if let Some(name) = &script.name {
            if !script_names.insert(name.to_lowercase()) {
                return Err(SemanticError {
                    message: format!("Duplicate script name '{}'.", name),
                });
            }
        }
    }

    let mut block_ids = HashSet::new();
    let mut warnings = Vec::new();
    for script in &program.scripts {
        analyze_script(script, &mut block_ids, &mut warnings)?;
    }
    Ok(SemanticReport { warnings })
}

fn analyze_script(
    script: &Script,
    block_ids: &mut HashSet<String>,
    warnings: &mut Vec<SemanticWarning>,
) -> Result<(), SemanticError> {
    let mut declared = HashSet::new();
    analyze_statements(
        &script.body,
        false,
        block_ids,
        &mut declared,
        warnings,
    )
}

fn analyze_statements(
    statements: &[Statement],
    in_loop: bool,
    block_ids: &mut HashSet<String>,
    declared: &mut HashSet<String>,
    warnings: &mut Vec<SemanticWarning>,
) -> Result<(), SemanticError> {
    for statement in statements {
        if let Some(id) = statement.block_id() {
            if !block_ids.insert(id.to_string()) {
                return Err(SemanticError {
                    message: format!("Duplicate block id '{}'.", id),
                });
            }
        }
        match statement {
            Statement::Declare { name, .. } => {
                check_name(name, "variable")?;
                if !declared.insert(name.to_lowercase()) {
                    warnings.push(SemanticWarning {
                        message: format!("Variable '{}' is declared more than once.", name),
                    });
                }
            }
            Statement::Assign { target, .. } => {
                check_name(target, "variable")?;
            }
            Statement::ExprStmt { .. } => {}
            Statement::Repeat { body, .. } | Statement::RepeatExt { body, .. } => {
                analyze_statements(body, true, block_ids, declared, warnings)?;
            }
            Statement::WhileUntil {
                id,
                condition,
                body,
                ..
            }
            | Statement::DoWhile {
                id,
                condition,
                body,
                ..
            } => {
                if condition.is_none() {
                    warnings.push(SemanticWarning {
                        message: format!(
                            "Loop '{}' has no condition; it defaults to false.",
                            id
                        ),
                    });
                }
                analyze_statements(body, true, block_ids, declared, warnings)?;
            }
            Statement::For { id, var, by, body, .. } => {
                check_name(var, "loop variable")?;
                if let Some(Expr::Number(step)) = by {
                    if *step == 0.0 {
                        warnings.push(SemanticWarning {
                            message: format!("Numeric for loop '{}' has a step of 0.", id),
                        });
                    }
                }
                analyze_statements(body, true, block_ids, declared, warnings)?;
            }
            Statement::ForEach { var, body, .. } => {
                check_name(var, "loop variable")?;
                analyze_statements(body, true, block_ids, declared, warnings)?;
            }
            Statement::Flow { kind, .. } => {
                if !in_loop {
                    let keyword = match kind {
                        FlowKind::Break => "break",
                        FlowKind::Continue => "continue",
                    };
                    return Err(SemanticError {
                        message: format!("A '{}' statement must be inside a loop.", keyword),
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_name(name: &str, what: &str) -> Result<(), SemanticError> {
    if !is_identifier(name) {
        return Err(SemanticError {
            message: format!("Invalid {} name '{}'.", what, name),
        });
    }
    if JS_KEYWORDS.contains(&name) {
        return Err(SemanticError {
            message: format!("'{}' is a reserved word and cannot be a {} name.", name, what),
        });
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
