use std::fs;
use std::io::{self, Read};

use anyhow::Context;
use renoquote_core::domain::input::ParsedInput;
use renoquote_core::errors::ApplicationError;

/// Reads a `ParsedInput` JSON document from a file path, or stdin for `-`.
pub fn read_parsed_input(source: &str) -> Result<ParsedInput, ApplicationError> {
    load(source).map_err(|error| ApplicationError::Input(format!("{error:#}")))
}

fn load(source: &str) -> anyhow::Result<ParsedInput> {
    let raw = if source == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("could not read input from stdin")?;
        buffer
    } else {
        fs::read_to_string(source).with_context(|| format!("could not read input `{source}`"))?
    };

    serde_json::from_str(&raw).with_context(|| format!("`{source}` is not a valid parsed input"))
}
