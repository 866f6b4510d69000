//! Appointment Booking Tool
//!
//! Hands out the booking form link. Takes no arguments.

use async_trait::async_trait;
use serde_json::Value;

use crate::mcp::{InputSchema, Tool, ToolError, ToolOutput, ToolSchema};

/// Appointment booking tool
pub struct AppointmentBookingTool {
    form_link: String,
}

impl AppointmentBookingTool {
    pub fn new(form_link: impl Into<String>) -> Self {
        Self {
            form_link: form_link.into(),
        }
    }

    /// The sentence returned to the model
    pub fn reply(&self) -> String {
        format!(
            "To book an appointment, please fill out this form: {}",
            self.form_link
        )
    }
}

#[async_trait]
impl Tool for AppointmentBookingTool {
    fn name(&self) -> &str {
        "appointment_booking_tool"
    }

    fn description(&self) -> &str {
        "Provides a link to the appointment booking form."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object(),
        }
    }

    async fn execute(&self, _input: Value) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text(self.reply()))
    }
}
