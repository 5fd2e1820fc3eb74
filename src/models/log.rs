use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::candidate::ToolUse;
use super::role::Role;

/// One line of a conversation log
///
/// Every field is optional: session logs interleave conversation messages with
/// summaries, snapshots and other bookkeeping records, and those must parse
/// without error so they can still contribute a working directory.
#[derive(Debug, Clone, Deserialize)]
pub struct LogRecord {
    #[serde(
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_timestamp"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// Message content is either a plain string or a list of typed blocks
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolUse {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

/// Text and tool invocations pulled out of a message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedContent {
    pub text: String,
    pub tool_uses: Vec<ToolUse>,
}

impl MessageContent {
    /// Concatenate text blocks (newline-joined) and collect tool_use blocks.
    /// Blocks of any other shape are ignored.
    pub fn normalize(&self) -> NormalizedContent {
        match self {
            MessageContent::Text(text) => {
                NormalizedContent { text: text.clone(), tool_uses: Vec::new() }
            }
            MessageContent::Blocks(blocks) => {
                let mut texts: Vec<String> = Vec::new();
                let mut tool_uses = Vec::new();

                for block in blocks {
                    if let Value::String(s) = block {
                        texts.push(s.clone());
                        continue;
                    }
                    match ContentBlock::deserialize(block) {
                        Ok(ContentBlock::Text { text }) => texts.push(text),
                        Ok(ContentBlock::ToolUse { name, input }) => {
                            tool_uses.push(ToolUse { name, input });
                        }
                        Ok(ContentBlock::Other) | Err(_) => {}
                    }
                }

                NormalizedContent { text: texts.join("\n"), tool_uses }
            }
        }
    }
}
