// Parse descriptors and show their canonical form

use serde::Serialize;
use spellcast_hotkey::{Modifier, NativeKeyCode, ParseError, Platform, SequenceParser};

use super::{resolver_for, Command};
use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;

/// One step of a parsed descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepInfo {
    pub key: String,
    pub name: String,
    pub modifiers: Vec<Modifier>,
    pub code: String,
}

/// A parsed descriptor as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorInfo {
    pub input: String,
    pub canonical: String,
    pub steps: Vec<StepInfo>,
}

/// Native codes are shown as four hex digits, e.g. `0x0047`
pub fn format_code(code: NativeKeyCode) -> String {
    format!("0x{:04X}", code)
}

pub fn describe(parser: &SequenceParser, descriptor: &str) -> Result<DescriptorInfo, ParseError> {
    let sequence = parser.parse(descriptor)?;
    let steps = sequence
        .keys()
        .iter()
        .map(|key| StepInfo {
            key: key.to_string(),
            name: key.name.clone(),
            modifiers: key.modifiers.iter().copied().collect(),
            code: format_code(key.code),
        })
        .collect();

    Ok(DescriptorInfo {
        input: descriptor.to_string(),
        canonical: sequence.canonical(),
        steps,
    })
}

/// Parse one or more descriptors
pub struct ParseCommand {
    descriptors: Vec<String>,
    platform: Option<Platform>,
    json: bool,
}

impl ParseCommand {
    pub fn new(descriptors: Vec<String>) -> Self {
        Self {
            descriptors,
            platform: None,
            json: false,
        }
    }

    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Parse every descriptor, keeping failures alongside successes
    pub fn describe_all(&self) -> Vec<Result<DescriptorInfo, ParseError>> {
        let parser = SequenceParser::new(resolver_for(self.platform));
        self.descriptors
            .iter()
            .map(|descriptor| describe(&parser, descriptor))
            .collect()
    }

    fn print_text(&self, results: &[Result<DescriptorInfo, ParseError>]) {
        let style = OutputStyle::default();
        for result in results {
            match result {
                Ok(info) => {
                    println!("{} → {}", info.input, style.code(&info.canonical));
                    for (idx, step) in info.steps.iter().enumerate() {
                        let modifiers = if step.modifiers.is_empty() {
                            "-".to_string()
                        } else {
                            step.modifiers
                                .iter()
                                .map(|m| m.as_str())
                                .collect::<Vec<_>>()
                                .join("+")
                        };
                        println!(
                            "  {}. {:<12} modifiers: {:<20} code: {}",
                            idx + 1,
                            step.name,
                            modifiers,
                            step.code
                        );
                    }
                }
                Err(e) => println!("{}", style.error(&e.to_string())),
            }
        }
    }
}

#[async_trait::async_trait]
impl Command for ParseCommand {
    async fn execute(&self) -> CliResult<()> {
        let results = self.describe_all();

        if self.json {
            let parsed: Vec<&DescriptorInfo> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
            let json = serde_json::to_string_pretty(&parsed)
                .map_err(|e| CliError::Internal(format!("Failed to serialize output: {}", e)))?;
            println!("{}", json);
        } else {
            self.print_text(&results);
        }

        let mut errors = results.into_iter().filter_map(Result::err);
        match errors.next() {
            None => Ok(()),
            Some(first) if self.descriptors.len() == 1 => Err(first.into()),
            Some(_) => Err(CliError::InvalidArgument {
                message: format!("{} descriptor(s) failed to parse", errors.count() + 1),
            }),
        }
    }
}
