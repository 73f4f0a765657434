use include_dir::{include_dir, Dir};
use serde::Serialize;
use std::collections::HashMap;
use strum_macros::{Display, EnumIter, EnumString};
use tera::{Context, Error as TeraError, Tera};

use crate::providers::base::ToolProtocol;
use crate::tools::ToolRegistry;

static PROMPTS: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/prompts");

/// Canned system prompts that give the agent a particular manner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Personality {
    Therapist,
    Teacher,
    CreativeWriter,
    CodingMentor,
}

impl Personality {
    pub fn prompt(&self) -> Result<String, TeraError> {
        let empty: HashMap<String, String> = HashMap::new();
        load_prompt_file(&format!("personalities/{}.md", self), &empty)
    }
}

#[derive(Serialize)]
struct ToolEntry<'a> {
    name: &'a str,
    description: &'a str,
}

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

/// Render one of the prompt templates bundled into the library
pub fn load_prompt_file<T: Serialize>(name: &str, context_data: &T) -> Result<String, TeraError> {
    let template = PROMPTS
        .get_file(name)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| TeraError::msg(format!("Prompt template not found: {}", name)))?;
    load_prompt(template, context_data)
}

/// The system prompt a backend gets when the caller supplies none.
///
/// Action-line backends are taught the Thought/Action/PAUSE loop and every
/// registered tool; the others get tool-call JSON instructions.
pub fn default_system_prompt(
    protocol: ToolProtocol,
    registry: &ToolRegistry,
) -> Result<String, TeraError> {
    match protocol {
        ToolProtocol::ActionLine => {
            let tools: Vec<ToolEntry> = registry
                .tools()
                .map(|tool| ToolEntry {
                    name: tool.name(),
                    description: tool.description(),
                })
                .collect();
            let mut context = HashMap::new();
            context.insert("tools", tools);
            load_prompt_file("react.md", &context)
        }
        ToolProtocol::Native | ToolProtocol::JsonFallback => {
            let empty: HashMap<String, String> = HashMap::new();
            load_prompt_file("tool_call.md", &empty)
        }
    }
}
