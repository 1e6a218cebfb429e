//! 合取范式（CNF）条件
//!
//! 前端在语义分析后把连接谓词规范化为 CNF；优化器只读取它，
//! 不对表达式本身做任何解释。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 文字：一个原子谓词或其否定
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// 谓词表达式（前端给出的规范化文本）
    pub expr: String,
    /// 是否取反
    pub negated: bool,
}

impl Literal {
    pub fn positive(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            negated: false,
        }
    }

    pub fn negative(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            negated: true,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "NOT {}", self.expr)
        } else {
            write!(f, "{}", self.expr)
        }
    }
}

/// 子句：文字的析取
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Clause(pub Vec<Literal>);

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let multi = self.0.len() > 1;
        if multi {
            write!(f, "(")?;
        }
        for (i, lit) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " OR ")?;
            }
            write!(f, "{}", lit)?;
        }
        if multi {
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// 合取范式：子句的合取，空 CNF 表示恒真
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cnf(pub Vec<Clause>);

impl Cnf {
    pub fn new() -> Self {
        Self::default()
    }

    /// 单个文字构成的 CNF
    pub fn from_literal(literal: Literal) -> Self {
        Self(vec![Clause(vec![literal])])
    }

    /// 解析简单的条件文本
    ///
    /// 顶层按 `AND` 拆分为子句，子句内按 `OR` 拆分为文字，`NOT ` 前缀表示取反。
    /// 不处理括号嵌套，复杂表达式由前端负责规范化。
    pub fn parse(text: &str) -> Self {
        let clauses = split_keyword(text, "AND")
            .into_iter()
            .map(|clause| {
                let literals = split_keyword(clause, "OR")
                    .into_iter()
                    .map(|lit| {
                        let lit = lit.trim().trim_start_matches('(').trim_end_matches(')').trim();
                        match strip_not(lit) {
                            Some(rest) => Literal::negative(rest),
                            None => Literal::positive(lit),
                        }
                    })
                    .collect();
                Clause(literals)
            })
            .collect();
        Self(clauses)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.0
    }

    /// 两个条件的合取
    pub fn and(&self, other: &Cnf) -> Cnf {
        let mut clauses = self.0.clone();
        clauses.extend(other.0.iter().cloned());
        Cnf(clauses)
    }
}

impl fmt::Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "TRUE");
        }
        for (i, clause) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

fn split_keyword<'a>(text: &'a str, keyword: &str) -> Vec<&'a str> {
    let pattern = format!(" {} ", keyword);
    let upper = text.to_ascii_uppercase();
    let mut parts = Vec::new();
    let mut start = 0;
    while let Some(pos) = upper[start..].find(&pattern) {
        parts.push(text[start..start + pos].trim());
        start += pos + pattern.len();
    }
    parts.push(text[start..].trim());
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

fn strip_not(lit: &str) -> Option<&str> {
    match lit.get(..4) {
        Some(prefix) if lit.len() > 4 && prefix.eq_ignore_ascii_case("NOT ") => {
            Some(lit[4..].trim())
        }
        _ => None,
    }
}
