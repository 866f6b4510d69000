//! Preparation Guide Tool
//!
//! Maps a scan description to a fixed purpose/preparation text by keyword.

use async_trait::async_trait;
use serde_json::Value;

use crate::mcp::{InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema};

/// Returned when no keyword matches
pub const PREPARATION_NOT_AVAILABLE: &str =
    "Sorry, preparation details for this scan is not available.";

/// Keyword sets checked in order; the first matching set wins
const GUIDES: &[(&[&str], &str)] = &[
    (
        &["abdomen"],
        "#Purpose: To visualize abdominal organs.\n#Preparation: Fast for 6-8 hours before the scan.",
    ),
    (
        &["pelvic", "pelvis"],
        "#Purpose: To visualize pelvic organs.\n#Preparation: Drink several glasses of water to ensure a full bladder.",
    ),
    (
        &["obstetric", "obs"],
        "#Purpose: To monitor fetal development.\n#Preparation: No specific preparation is needed, but wearing loose clothing is recommended.",
    ),
    (
        &["kidneys"],
        "#Purpose: To visualize the kidneys.\n#Preparation: Drink 1 liter of water one hour before the appointment and do not urinate.",
    ),
];

/// Look up the preparation guide for a scan (case-insensitive substring match)
pub fn preparation_guide(query: &str) -> &'static str {
    let query = query.to_lowercase();

    GUIDES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| query.contains(k)))
        .map(|(_, text)| *text)
        .unwrap_or(PREPARATION_NOT_AVAILABLE)
}

/// Preparation guide tool
pub struct PreparationGuideTool;

#[async_trait]
impl Tool for PreparationGuideTool {
    fn name(&self) -> &str {
        "preparation_guide_tool"
    }

    fn description(&self) -> &str {
        "Provides preparation guides for specific ultrasound types."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object().property(
                "query",
                PropertySchema::string("The ultrasound scan the user asks about, e.g. 'pelvic scan'"),
                true,
            ),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let query = input
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::invalid_params("query must be a string"))?;

        Ok(ToolOutput::text(preparation_guide(query)))
    }
}
