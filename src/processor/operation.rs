//! The closed set of document operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A document operation a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Summary,
    Appeal,
    Review,
    Lawsuit,
    LawsuitResponse,
    ContractAnalysis,
    Chat,
}

impl Operation {
    /// Every operation, in the order they are listed to users.
    pub const ALL: [Operation; 7] = [
        Operation::Summary,
        Operation::Appeal,
        Operation::Review,
        Operation::Lawsuit,
        Operation::LawsuitResponse,
        Operation::ContractAnalysis,
        Operation::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Summary => "summary",
            Operation::Appeal => "appeal",
            Operation::Review => "review",
            Operation::Lawsuit => "lawsuit",
            Operation::LawsuitResponse => "lawsuit_response",
            Operation::ContractAnalysis => "contract_analysis",
            Operation::Chat => "chat",
        }
    }

    /// Human-friendly label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Operation::Summary => "Summary",
            Operation::Appeal => "Appeal",
            Operation::Review => "Review",
            Operation::Lawsuit => "Lawsuit",
            Operation::LawsuitResponse => "Lawsuit Response",
            Operation::ContractAnalysis => "Contract Analysis",
            Operation::Chat => "Chat Response",
        }
    }

    /// Only chat takes a question.
    pub fn takes_question(&self) -> bool {
        matches!(self, Operation::Chat)
    }

    /// Comma-separated identifiers of every operation.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(Operation::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An identifier outside the operation set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation '{0}'")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    /// Exact match on the identifier; no case folding or aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}
