//! Domain Tools
//!
//! The four tools the SonoCare agents can call:
//! - `preparation`: fixed preparation guides looked up by scan keyword
//! - `search`: web search for general ultrasound questions
//! - `appointment`: the appointment booking form link
//! - `out_of_scope`: fixed refusal for unrelated requests

mod appointment;
mod out_of_scope;
mod preparation;
mod search;

pub use appointment::AppointmentBookingTool;
pub use out_of_scope::{OutOfScopeGuardrailTool, OUT_OF_SCOPE_REPLY};
pub use preparation::{preparation_guide, PreparationGuideTool, PREPARATION_NOT_AVAILABLE};
pub use search::SearchInfoTool;
