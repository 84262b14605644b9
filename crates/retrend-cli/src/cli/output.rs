use anyhow::Result;
use serde::Serialize;

/// Writes command results either as text or as JSON on stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct Printer {
    pub json: bool,
    pub pretty: bool,
}

impl Printer {
    pub fn new(json: bool, pretty: bool) -> Self {
        Self {
            json: json || pretty,
            pretty,
        }
    }

    /// Print `value` in JSON mode, otherwise each of `lines`
    pub fn emit<T: Serialize>(&self, value: &T, lines: &[String]) -> Result<()> {
        if self.json {
            println!("{}", self.to_json(value)?);
        } else {
            for line in lines {
                println!("{}", line);
            }
        }
        Ok(())
    }

    pub fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(rendered)
    }
}
