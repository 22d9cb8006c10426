//! Prompt assembly and the Selector's JSON-extraction heuristic (§4.5, §9).
//!
//! "The 'extract the first `{` ... last `}`' heuristic is intentional: the Selector's
//! output is not guaranteed to be pure JSON. Keep the heuristic; treat parse failure as
//!'no tool call' rather than as an error." (§9)

use core_types::Role;
use serde_json::Value;

/// A parsed tool-selection decision from the Selector (§4.5 step 4b-d).
pub struct ToolSelection {
    pub tool: String,
    pub parameters: Value,
}

/// Extracts the substring between the first `{` and the last `}` and parses it as JSON.
/// Returns `None` on missing braces or a parse failure — both mean "no tool call" (§9),
/// never an error.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Parses the Selector's raw response into a [`ToolSelection`], or `None` if the parsed
/// object has no `tool` key (§4.5 step 4c) — exits the selection-execution cycle.
pub fn parse_selection(raw: &str) -> Option<ToolSelection> {
    let value = extract_json_object(raw)?;
    let tool = value.get("tool")?.as_str()?.to_string();
    let parameters = value
        .get("parameters")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));
    Some(ToolSelection { tool, parameters })
}

/// Extracts the synthesizer's `response` field if present, else falls back to the raw
/// text (§4.5 step 6).
pub fn extract_synthesis_text(raw: &str) -> String {
    extract_json_object(raw)
        .and_then(|v| v.get("response").and_then(|r| r.as_str()).map(str::to_string))
        .unwrap_or_else(|| raw.to_string())
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Initial selector prompt (§4.5 step 3): tool catalog, bound repository url (or
/// `"none"`), the user message, and up to the last five messages (truncated to 200 chars
/// each).
pub fn initial_selector_prompt(
    catalog: &[(String, String)],
    repo_url: Option<&str>,
    user_message: &str,
    recent: &[(Role, String)],
) -> String {
    let mut out = String::new();
    out.push_str("You are selecting the next tool to call, or none.\n\n");
    out.push_str("Available tools:\n");
    for (name, description) in catalog {
        out.push_str(&format!("- {name}: {description}\n"));
    }
    out.push_str(&format!("\nRepository: {}\n", repo_url.unwrap_or("none")));
    out.push_str("\nRecent conversation:\n");
    for (role, content) in recent {
        out.push_str(&format!("{}: {}\n", role_label(*role), content));
    }
    out.push_str(&format!("\nUser message: {user_message}\n"));
    out.push_str(
        "\nRespond with a JSON object. Include a \"tool\" key naming the tool to call and a \
         \"parameters\" object, or omit \"tool\" entirely if no tool call is needed.",
    );
    out
}

/// Follow-up selector prompt (§4.5 step 4f): tool catalog (names only), the last five
/// messages (truncated to 150 chars), the just-called tool, whether it succeeded, and
/// either its data (truncated to 5000 chars) or its error.
pub fn followup_selector_prompt(
    tool_names: &[String],
    recent: &[(Role, String)],
    last_tool: &str,
    success: bool,
    data_or_error: &str,
) -> String {
    let mut out = String::new();
    out.push_str("Available tools: ");
    out.push_str(&tool_names.join(", "));
    out.push_str("\n\nRecent conversation:\n");
    for (role, content) in recent {
        out.push_str(&format!("{}: {}\n", role_label(*role), content));
    }
    out.push_str(&format!(
        "\nLast tool called: {last_tool} ({})\n",
        if success { "succeeded" } else { "failed" }
    ));
    out.push_str(&format!("Result: {data_or_error}\n"));
    out.push_str(
        "\nRespond with a JSON object naming the next \"tool\" to call (with \"parameters\"), \
         or omit \"tool\" to stop and synthesize a final answer.",
    );
    out
}

/// Final synthesis prompt (§4.5 step 5): up to the last ten messages (truncated to 500
/// chars), the bound repository url, and the concatenated `tools_used`.
pub fn synthesis_prompt(
    recent: &[(Role, String)],
    repo_url: Option<&str>,
    tools_used: &[String],
) -> String {
    let mut out = String::new();
    out.push_str("Compose the final answer for the user based on the conversation below.\n\n");
    out.push_str(&format!("Repository: {}\n", repo_url.unwrap_or("none")));
    out.push_str(&format!("Tools used: {}\n\n", tools_used.join(", ")));
    out.push_str("Conversation:\n");
    for (role, content) in recent {
        out.push_str(&format!("{}: {}\n", role_label(*role), content));
    }
    out.push_str(
        "\nRespond with a JSON object containing a \"response\" field, or plain text.",
    );
    out
}
