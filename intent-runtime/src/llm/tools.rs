//! Poll editing tools exposed to the LLM

use serde::{Deserialize, Serialize};

pub const ADD_DATE: &str = "add_date";
pub const REMOVE_DATE: &str = "remove_date";
pub const UPDATE_TITLE: &str = "update_title";
pub const ADD_TIMESLOT: &str = "add_timeslot";
pub const ADD_QUESTION: &str = "add_question";
pub const REMOVE_QUESTION: &str = "remove_question";
pub const CHANGE_QUESTION_TYPE: &str = "change_question_type";
pub const ADD_OPTION: &str = "add_option";
pub const REMOVE_OPTION: &str = "remove_option";
pub const SET_REQUIRED: &str = "set_required";
pub const RENAME_QUESTION: &str = "rename_question";

/// A tool that can be called by the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (e.g., "add_date")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Input parameters
    pub parameters: Vec<ToolParameter>,
}

impl Tool {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Every tool also takes an optional self-reported confidence
    fn with_confidence(self) -> Self {
        self.with_parameter(ToolParameter::number(
            "confidence",
            "How sure you are that this is what the user wants, between 0 and 1",
            false,
        ))
    }

    fn with_question_number(self) -> Self {
        self.with_parameter(ToolParameter::number(
            "question_number",
            "Position of the question, starting at 1",
            true,
        ))
    }

    /// Convert to JSON schema for LLM (Ollama function calling format)
    pub fn to_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let mut property = serde_json::json!({
                "type": param.param_type,
                "description": param.description,
            });
            if let Some(values) = &param.allowed_values {
                property["enum"] = serde_json::json!(values);
            }
            properties.insert(param.name.clone(), property);

            if param.required {
                required.push(param.name.clone());
            }
        }

        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        })
    }
}

/// Tool parameter definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub param_type: String, // "string", "number", "boolean"
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
}

impl ToolParameter {
    pub fn new(name: &str, description: &str, param_type: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            param_type: param_type.to_string(),
            required,
            allowed_values: None,
        }
    }

    pub fn string(name: &str, description: &str, required: bool) -> Self {
        Self::new(name, description, "string", required)
    }

    pub fn number(name: &str, description: &str, required: bool) -> Self {
        Self::new(name, description, "number", required)
    }

    pub fn boolean(name: &str, description: &str, required: bool) -> Self {
        Self::new(name, description, "boolean", required)
    }

    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.allowed_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }
}

/// The full catalogue, one tool per poll action
pub fn poll_tools() -> Vec<Tool> {
    vec![
        Tool::new(ADD_DATE, "Add a candidate date to a date poll")
            .with_parameter(ToolParameter::string("date", "Date as YYYY-MM-DD", true))
            .with_confidence(),
        Tool::new(REMOVE_DATE, "Remove a candidate date from a date poll")
            .with_parameter(ToolParameter::string("date", "Date as YYYY-MM-DD", true))
            .with_confidence(),
        Tool::new(UPDATE_TITLE, "Rename the poll")
            .with_parameter(ToolParameter::string("title", "New poll title", true))
            .with_confidence(),
        Tool::new(ADD_TIMESLOT, "Add a time slot to an existing date of a date poll")
            .with_parameter(ToolParameter::string("date", "Date as YYYY-MM-DD", true))
            .with_parameter(ToolParameter::string("start", "Start time as HH:MM", true))
            .with_parameter(ToolParameter::string("end", "End time as HH:MM", true))
            .with_confidence(),
        Tool::new(ADD_QUESTION, "Add a single choice question to a form poll")
            .with_parameter(ToolParameter::string("subject", "What the question is about", true))
            .with_confidence(),
        Tool::new(REMOVE_QUESTION, "Remove a question from a form poll")
            .with_question_number()
            .with_confidence(),
        Tool::new(CHANGE_QUESTION_TYPE, "Change the kind of a form question")
            .with_question_number()
            .with_parameter(
                ToolParameter::string("new_type", "New question kind", true)
                    .one_of(&["single", "multiple", "text", "matrix"]),
            )
            .with_confidence(),
        Tool::new(ADD_OPTION, "Add an answer option to a form question")
            .with_question_number()
            .with_parameter(ToolParameter::string("option_text", "Label of the option", true))
            .with_confidence(),
        Tool::new(REMOVE_OPTION, "Remove an answer option from a form question")
            .with_question_number()
            .with_parameter(ToolParameter::string("option_text", "Label of the option", true))
            .with_confidence(),
        Tool::new(SET_REQUIRED, "Make a form question required or optional")
            .with_question_number()
            .with_parameter(ToolParameter::boolean("required", "Whether an answer is mandatory", true))
            .with_confidence(),
        Tool::new(RENAME_QUESTION, "Change the wording of a form question")
            .with_question_number()
            .with_parameter(ToolParameter::string("new_title", "New question title", true))
            .with_confidence(),
    ]
}
