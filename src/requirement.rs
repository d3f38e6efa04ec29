//! Version requirement expressions such as `>= 1.1`, `~> 1.7` or `>= 1.5, < 2`.
//!
//! An expression is a comma-separated list of clauses, each an optional
//! operator followed by a dotted numeric version. All clauses must hold.
//!
//! | Operator | Meaning                                   |
//! |----------|-------------------------------------------|
//! | `=`      | exactly (also used when no operator given) |
//! | `!=`     | anything but                              |
//! | `>`      | greater than                              |
//! | `>=`     | at least                                  |
//! | `<`      | less than                                 |
//! | `<=`     | at most                                   |
//! | `~>`     | pessimistic: `~> 1.7` means `>= 1.7, < 2` |

use std::fmt;
use std::str::FromStr;
use crate::error::WrapperError;
use crate::version::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Pessimistic,
}

impl Op {
    // Two-character operators first so `>=` is not read as `>`.
    const TOKENS: [(&'static str, Op); 7] = [
        ("~>", Op::Pessimistic),
        (">=", Op::Ge),
        ("<=", Op::Le),
        ("!=", Op::Ne),
        ("=", Op::Eq),
        (">", Op::Gt),
        ("<", Op::Lt),
    ];

    fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Pessimistic => "~>",
        }
    }
}

/// A single `<op> <version>` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub op: Op,
    pub version: Version,
}

impl Constraint {
    pub fn matches(&self, version: &Version) -> bool {
        match self.op {
            Op::Eq => version == &self.version,
            Op::Ne => version != &self.version,
            Op::Gt => version > &self.version,
            Op::Ge => version >= &self.version,
            Op::Lt => version < &self.version,
            Op::Le => version <= &self.version,
            Op::Pessimistic => {
                version >= &self.version
                    && self.version.bump().is_none_or(|upper| version < &upper)
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.as_str(), self.version)
    }
}

/// A parsed requirement: every constraint must be satisfied.
///
/// The default requirement has no constraints and accepts any version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirement {
    constraints: Vec<Constraint>,
}

impl Requirement {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn parse(expression: &str) -> Result<Self, WrapperError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(WrapperError::invalid_requirement(expression, "empty requirement"));
        }
        let constraints = trimmed
            .split(',')
            .map(|clause| parse_clause(expression, clause))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { constraints })
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn satisfied_by(&self, version: &Version) -> bool {
        self.constraints.iter().all(|constraint| constraint.matches(version))
    }
}

fn parse_clause(expression: &str, clause: &str) -> Result<Constraint, WrapperError> {
    let clause = clause.trim();
    if clause.is_empty() {
        return Err(WrapperError::invalid_requirement(expression, "empty clause"));
    }
    let (op, rest) = Op::TOKENS
        .iter()
        .find_map(|(token, op)| clause.strip_prefix(token).map(|rest| (*op, rest)))
        .unwrap_or((Op::Eq, clause));
    let version = rest
        .trim()
        .parse::<Version>()
        .map_err(|err| WrapperError::invalid_requirement(expression, err.to_string()))?;
    Ok(Constraint { op, version })
}

impl FromStr for Requirement {
    type Err = WrapperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Requirement::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraints.is_empty() {
            return f.write_str(">= 0");
        }
        let parts: Vec<String> = self.constraints.iter().map(Constraint::to_string).collect();
        f.write_str(&parts.join(", "))
    }
}

/// Parses `expression` and checks `version` against it.
pub fn satisfied(expression: &str, version: &str) -> Result<bool, WrapperError> {
    let requirement = Requirement::parse(expression)?;
    let version = version
        .parse::<Version>()
        .map_err(|err| WrapperError::invalid_requirement(expression, err.to_string()))?;
    Ok(requirement.satisfied_by(&version))
}
