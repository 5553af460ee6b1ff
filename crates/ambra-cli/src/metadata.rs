//! Object-metadata file parsing.
//!
//! The metadata file is a list of `source { ... }` records in textproto
//! shape, one field per line:
//!
//! ```text
//! source {
//!   input_channel: 0
//!   azimuth: -30.0
//!   elevation: 15.0
//!   distance: 1.0
//!   gain: 1.0
//! }
//! ```

use anyhow::{bail, Context, Result};

/// One object source record.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub input_channel: usize,
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
    pub gain: f32,
}

impl Default for SourceRecord {
    fn default() -> Self {
        Self {
            input_channel: 0,
            azimuth: 0.0,
            elevation: 0.0,
            distance: 1.0,
            gain: 1.0,
        }
    }
}

/// Parses the metadata text into source records.
pub fn parse_source_list(text: &str) -> Result<Vec<SourceRecord>> {
    let mut sources = Vec::new();
    let mut current: Option<SourceRecord> = None;

    for (line_number, raw_line) in text.lines().enumerate() {
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let context = || format!("line {}", line_number + 1);

        if line.starts_with("source") && line.ends_with('{') {
            if current.is_some() {
                bail!("{}: nested source block", context());
            }
            current = Some(SourceRecord::default());
        } else if line == "}" {
            let record = current
                .take()
                .with_context(|| format!("{}: unmatched closing brace", context()))?;
            sources.push(record);
        } else if let Some((key, value)) = line.split_once(':') {
            let record = current
                .as_mut()
                .with_context(|| format!("{}: field outside a source block", context()))?;
            let key = key.trim();
            let value = value.trim();
            match key {
                "input_channel" => {
                    record.input_channel = value
                        .parse()
                        .with_context(|| format!("{}: bad input_channel", context()))?
                }
                "azimuth" => {
                    record.azimuth = value
                        .parse()
                        .with_context(|| format!("{}: bad azimuth", context()))?
                }
                "elevation" => {
                    record.elevation = value
                        .parse()
                        .with_context(|| format!("{}: bad elevation", context()))?
                }
                "distance" => {
                    record.distance = value
                        .parse()
                        .with_context(|| format!("{}: bad distance", context()))?
                }
                "gain" => {
                    record.gain = value
                        .parse()
                        .with_context(|| format!("{}: bad gain", context()))?
                }
                other => bail!("{}: unknown field \"{other}\"", context()),
            }
        } else {
            bail!("{}: unparseable line \"{line}\"", context());
        }
    }
    if current.is_some() {
        bail!("unterminated source block");
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_sources() {
        let text = r#"
# comment
source {
  input_channel: 0
  azimuth: -30.0
  elevation: 15.0
  distance: 2.0
  gain: 0.5
}
source {
  input_channel: 1
  azimuth: 30.0
}
"#;
        let sources = parse_source_list(text).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].input_channel, 0);
        assert_eq!(sources[0].azimuth, -30.0);
        assert_eq!(sources[0].distance, 2.0);
        assert_eq!(sources[0].gain, 0.5);
        // Unset fields keep their defaults.
        assert_eq!(sources[1].distance, 1.0);
        assert_eq!(sources[1].gain, 1.0);
    }

    #[test]
    fn rejects_malformed_blocks() {
        assert!(parse_source_list("source {\nsource {\n}\n}").is_err());
        assert!(parse_source_list("}").is_err());
        assert!(parse_source_list("source {\n  sideways: 3\n}").is_err());
        assert!(parse_source_list("source {\n  azimuth: north\n}").is_err());
        assert!(parse_source_list("source {").is_err());
    }

    #[test]
    fn empty_input_is_empty_list() {
        assert!(parse_source_list("").unwrap().is_empty());
    }
}
