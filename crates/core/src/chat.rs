use serde::{Deserialize, Serialize};

/// One result row: column name to value, in column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "bot" => Ok(Self::Bot),
            _ => Err(format!("Invalid chat role: {s}")),
        }
    }
}

/// One message in a conversation, optionally carrying tabular results.
///
/// Fields are private so a turn cannot be edited once built; corrections are
/// new turns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    role: Role,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rows: Option<Vec<Row>>,
}

impl ChatTurn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), columns: None, rows: None }
    }

    #[must_use]
    pub fn bot(content: impl Into<String>) -> Self {
        Self { role: Role::Bot, content: content.into(), columns: None, rows: None }
    }

    /// Bot turn carrying a materialized result set.
    #[must_use]
    pub fn bot_with_results(content: impl Into<String>, results: ResultSet) -> Self {
        let ResultSet { columns, rows } = results;
        Self { role: Role::Bot, content: content.into(), columns: Some(columns), rows: Some(rows) }
    }

    /// Rebuilds a turn from persisted parts.
    #[must_use]
    pub fn from_parts(
        role: Role,
        content: String,
        columns: Option<Vec<String>>,
        rows: Option<Vec<Row>>,
    ) -> Self {
        Self { role, content, columns, rows }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    #[must_use]
    pub fn rows(&self) -> Option<&[Row]> {
        self.rows.as_deref()
    }
}

/// In-memory table produced by the query executor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
