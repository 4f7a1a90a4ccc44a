//! Intent: the structured reading of a free-text test request.
//!
//! An intent is recomputed for every request and never persisted. It carries
//! a single action and a single target; compound requests collapse to the
//! first label found.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What the user wants the device to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Click,
    Input,
    Assert,
    Wait,
    Launch,
    Swipe,
    #[default]
    Unknown,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Click => "click",
            Action::Input => "input",
            Action::Assert => "assert",
            Action::Wait => "wait",
            Action::Launch => "launch",
            Action::Swipe => "swipe",
            Action::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the action is aimed at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Button,
    Input,
    Image,
    Text,
    Coordinate,
    #[default]
    Unspecified,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Button => "button",
            Target::Input => "input",
            Target::Image => "image",
            Target::Text => "text",
            Target::Coordinate => "coordinate",
            Target::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub action: Action,
    pub target: Target,

    /// Literal lifted from the request: a quoted string or a coordinate token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Best-guess capability namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// Auxiliary parameters (e.g. `timeout`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl Intent {
    /// The literal value, or `""` when none was extracted.
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn has_value(&self) -> bool {
        self.value.as_deref().is_some_and(|v| !v.is_empty())
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Action: {}", self.action)?;
        writeln!(f, "Target: {}", self.target)?;
        if self.has_value() {
            writeln!(f, "Value: {}", self.value_str())?;
        }
        if let Some(module) = &self.module {
            writeln!(f, "Module: {module}")?;
        }
        if !self.parameters.is_empty() {
            writeln!(f, "Parameters:")?;
            for (key, value) in &self.parameters {
                writeln!(f, " - {key}: {value}")?;
            }
        }
        Ok(())
    }
}
