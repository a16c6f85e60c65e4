use riskledger_client::ClientError;
use serde_json::Value;

pub fn render_error(error: &ClientError) -> String {
    let mut lines = vec![
        "Something went wrong, but it's easy to fix.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];

    if let Some(data) = &error.data {
        lines.extend(column_report_lines(data));
    }

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    if error.recovery_steps.is_empty() {
        lines.push("  1. Retry the command.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}

fn column_report_lines(data: &Value) -> Vec<String> {
    let missing = string_list(data, "missing");
    let detected = string_list(data, "detectedHeaders");
    if missing.is_empty() && detected.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![String::new()];
    if !missing.is_empty() {
        lines.push(format!("  Missing:  {}", missing.join(", ")));
    }
    if detected.is_empty() {
        lines.push("  Headers:  (none)".to_string());
    } else {
        lines.push(format!("  Headers:  {}", detected.join(", ")));
    }
    lines
}

fn string_list(data: &Value, key: &str) -> Vec<String> {
    data.get(key)
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
