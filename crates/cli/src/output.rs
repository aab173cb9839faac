//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

use virtuoso_common::{Journey, JourneyCheckpoint, LibraryCheckpoint, StepOutput};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Human,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Prose with suggested follow-ups, for AI assistants
    Ai,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Render a created step
pub fn render_step(output: &StepOutput, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(output)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(output)?),
        OutputFormat::Human => Ok(step_human(output)),
        OutputFormat::Ai => Ok(step_ai(output)),
    }
}

fn step_human(output: &StepOutput) -> String {
    let mut text = format!(
        "✅ Created {} step at position {} in checkpoint {}\n",
        output.step_type, output.position, output.checkpoint_id
    );
    let _ = writeln!(text, "   Step ID: {}", output.step_id);
    let _ = writeln!(text, "   Step: {}", output.parsed_step);
    for (key, value) in &output.extra {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let _ = writeln!(text, "   {}: {}", key, value);
    }
    if output.using_context {
        let _ = writeln!(text, "   {}", "(checkpoint from session)".dimmed());
    }
    if output.auto_position {
        let _ = writeln!(text, "   {}", "(position auto-incremented)".dimmed());
    }
    text
}

fn step_ai(output: &StepOutput) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "Created a {} step (id {}) at position {} in checkpoint {}.",
        output.step_type, output.step_id, output.position, output.checkpoint_id
    );
    let _ = writeln!(text, "Step: {}", output.parsed_step);
    if output.using_context {
        let _ = writeln!(
            text,
            "The checkpoint came from the session, so later steps can omit --checkpoint."
        );
    }
    if output.auto_position {
        let _ = writeln!(
            text,
            "The position was assigned automatically; the next step goes to position {}.",
            output.position + 1
        );
    }
    let _ = writeln!(text);
    let _ = writeln!(text, "Next steps:");
    for suggestion in suggestions(&output.step_type) {
        let _ = writeln!(text, "- {}", suggestion);
    }
    text
}

/// Follow-up commands worth suggesting after a step of this type
fn suggestions(step_type: &str) -> Vec<&'static str> {
    match step_type {
        "NAVIGATE" => vec![
            "Wait for the page: api-cli wait element <SELECTOR>",
            "Check the page loaded: api-cli assert exists <SELECTOR>",
        ],
        "CLICK" | "MOUSE" => vec![
            "Verify the result: api-cli assert exists <SELECTOR>",
            "Wait for changes: api-cli wait element <SELECTOR>",
        ],
        "WRITE" | "KEY" => vec![
            "Submit the form: api-cli interact click <SELECTOR>",
            "Press Enter: api-cli interact key Enter",
        ],
        "STORE" => vec!["Check the stored value: api-cli assert variable <NAME> <EXPECTED>"],
        "WAIT" => vec!["Interact with the element: api-cli interact click <SELECTOR>"],
        "PICK" => vec!["Verify the selection: api-cli assert selected <SELECTOR>"],
        "UPLOAD" => vec!["Submit the upload: api-cli interact click <SELECTOR>"],
        t if t.starts_with("ASSERT") => vec![
            "Add another assertion: api-cli assert <TYPE> <SELECTOR>",
            "Continue the flow: api-cli interact click <SELECTOR>",
        ],
        _ => vec![
            "Add the next step, e.g. api-cli interact click <SELECTOR>",
            "Inspect the session: api-cli session show",
        ],
    }
}

/// Print any serializable value in a machine format, or via the fallback for
/// human and ai output
pub fn print_value<T: Serialize>(
    value: &T,
    format: OutputFormat,
    human: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Human | OutputFormat::Ai => print!("{}", human()),
    }
    Ok(())
}

pub fn table<T: TableDisplay>(items: &[T]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(T::headers());
    for item in items {
        table.add_row(item.row());
    }
    table
}

/// Library checkpoint summary for human output
pub fn library_human(checkpoint: &LibraryCheckpoint) -> String {
    let mut text = format!("📚 Library checkpoint {}: {}\n", checkpoint.id, checkpoint.name);
    if let Some(description) = &checkpoint.description {
        let _ = writeln!(text, "   {}", description);
    }
    if !checkpoint.steps.is_empty() {
        let _ = writeln!(text, "{}", table(&checkpoint.steps));
    }
    text
}

impl TableDisplay for virtuoso_common::LibraryStep {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Action", "Value"]
    }

    fn row(&self) -> Vec<String> {
        let value = match &self.value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        vec![self.id.to_string(), self.action.clone(), value]
    }
}

/// Journey checkpoints for human output
pub fn journey_human(journey: &Journey) -> String {
    let mut text = format!("🧭 Journey {}: {}\n", journey.id, journey.display_name());
    if journey.cases.is_empty() {
        let _ = writeln!(text, "   No checkpoints");
    } else {
        let _ = writeln!(text, "{}", table(&journey.cases));
    }
    text
}

impl TableDisplay for JourneyCheckpoint {
    fn headers() -> Vec<&'static str> {
        vec!["#", "ID", "Title", "Steps"]
    }

    fn row(&self) -> Vec<String> {
        let title = if self.position == 1 {
            format!("{} [Navigation]", self.title)
        } else {
            self.title.clone()
        };
        vec![
            self.position.to_string(),
            self.id.to_string(),
            title,
            self.steps.len().to_string(),
        ]
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message.red());
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("⚠️  {}", message.yellow());
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use virtuoso_common::CheckpointId;

    fn sample() -> StepOutput {
        let mut extra = Map::new();
        extra.insert("element".into(), json!("Login"));
        StepOutput {
            status: "success".into(),
            step_type: "ASSERT_EXISTS".into(),
            checkpoint_id: CheckpointId::parse("1678318").unwrap(),
            step_id: 19636330,
            position: 3,
            parsed_step: "see \"Login\"".into(),
            using_context: true,
            auto_position: true,
            extra,
        }
    }

    #[test]
    fn test_human_output() {
        colored::control::set_override(false);
        let text = render_step(&sample(), OutputFormat::Human).unwrap();
        assert!(text.starts_with("✅ Created ASSERT_EXISTS step at position 3 in checkpoint 1678318"));
        assert!(text.contains("Step ID: 19636330"));
        assert!(text.contains("element: Login"));
        assert!(text.contains("(checkpoint from session)"));
        assert!(text.contains("(position auto-incremented)"));
    }

    #[test]
    fn test_json_output_parses_back() {
        let text = render_step(&sample(), OutputFormat::Json).unwrap();
        let parsed: StepOutput = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_yaml_output_parses_back() {
        let text = render_step(&sample(), OutputFormat::Yaml).unwrap();
        let parsed: StepOutput = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed.step_id, 19636330);
        assert_eq!(parsed.checkpoint_id.as_str(), "1678318");
    }

    #[test]
    fn test_ai_output_suggests_next_steps() {
        let text = render_step(&sample(), OutputFormat::Ai).unwrap();
        assert!(text.contains("Next steps:"));
        assert!(text.contains("next step goes to position 4"));
        assert!(text.contains("api-cli assert"));
    }

    #[test]
    fn test_journey_table_marks_navigation() {
        let mut journey = Journey {
            id: 608048,
            title: "Checkout".into(),
            cases: vec![JourneyCheckpoint {
                id: 1,
                title: "Open site".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        journey.number_checkpoints();
        let text = journey_human(&journey);
        assert!(text.starts_with("🧭 Journey 608048: Checkout"));
        assert!(text.contains("Open site [Navigation]"));
    }

    #[test]
    fn test_format_from_config_string() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("AI".parse::<OutputFormat>().unwrap(), OutputFormat::Ai);
        assert!("table".parse::<OutputFormat>().is_err());
    }
}
