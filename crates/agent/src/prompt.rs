//! System prompt rendering.
//!
//! The prompt is a pure function of the registered tools, so two agents with
//! the same registry produce byte-identical instructions.

use ponder_core::tool::{ToolDescriptor, ToolParameter, ToolRegistry};

/// Render one parameter line: `- name: description (type, required)`.
fn render_parameter(p: &ToolParameter) -> String {
    let required = if p.required { ", required" } else { "" };
    format!("- {}: {} ({}{})", p.name, p.description, p.kind, required)
}

/// Render the tool catalogue section.
pub fn render_catalogue(tools: &[ToolDescriptor]) -> String {
    if tools.is_empty() {
        return "No tools available.".into();
    }

    tools
        .iter()
        .map(|tool| {
            let params = if tool.parameters.is_empty() {
                "No parameters.".to_string()
            } else {
                tool.parameters
                    .iter()
                    .map(render_parameter)
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            format!(
                "Tool: {}\nDescription: {}\nParameters:\n{}\n",
                tool.name, tool.description, params
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the full ReAct system prompt for a registry.
pub fn render_system_prompt(tools: &ToolRegistry) -> String {
    format!(
        r#"# Task

You are a helpful AI assistant that can use tools to solve problems step by step.

# Tools

You can use the following tools:

{catalogue}

# Instructions

1. Think about the problem step by step
2. When you need to use a tool, use the following format:
   Thought: <your reasoning about what to do>
   Action: <tool_name>
   Action Input: <tool parameters in JSON format>
3. Tools will respond with:
   Observation: <tool result>
4. After receiving an observation, continue your reasoning
5. When you have a final answer, respond with:
   Thought: <your final reasoning>
   Answer: <your final answer>

# Important Rules

- ALWAYS follow the Thought/Action/Observation/Answer format
- Use only one tool at a time
- NEVER make up tool results
- If a tool fails, try a different approach
- If you can't find an answer, say "I don't know" instead of making something up
- Do NOT provide an Answer if you are unable to complete all required actions
- When your answer draws on a web source, end it with a reference formatted as:

[Article Title](URL) by [Author Name], published on [Publication Date] and accessed on [Access Date].

For example:

> [The Impact of AI on Society](https://www.example.com/ai-impact-society) by John Doe, published on 2023-06-15 and accessed on 2025-04-06.
"#,
        catalogue = render_catalogue(&tools.descriptors())
    )
}
