use std::collections::HashMap;

/// Arbitrary front matter fields as parsed YAML values.
pub type Fields = HashMap<String, serde_yaml_ng::Value>;

/// Result of parsing a document with optional front matter.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub fields: Fields,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("invalid YAML in front matter: {0}")]
    InvalidYaml(String),
}

/// Parse a Markdown document, extracting YAML front matter if present.
///
/// Front matter must be delimited by `---` on its own line at the very
/// start of the document. Documents without a complete delimiter pair are
/// treated as plain bodies with no fields.
pub fn parse(content: &str) -> Result<ParsedDocument, FrontmatterError> {
    let trimmed = content.trim_start();

    if !trimmed.starts_with("---") {
        return Ok(ParsedDocument {
            fields: Fields::new(),
            body: content.to_owned(),
        });
    }

    // Find the closing `---` delimiter (skip the opening one).
    let after_opening = &trimmed[3..];
    let Some(end_pos) = after_opening.find("\n---") else {
        return Ok(ParsedDocument {
            fields: Fields::new(),
            body: content.to_owned(),
        });
    };

    let yaml_str = &after_opening[..end_pos];
    let rest_start = end_pos + 4; // skip past "\n---"
    let body = after_opening[rest_start..]
        .strip_prefix('\n')
        .unwrap_or(&after_opening[rest_start..]);

    let fields: Fields = serde_yaml_ng::from_str(yaml_str)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    Ok(ParsedDocument {
        fields,
        body: body.to_owned(),
    })
}

/// Parse a whole document as a YAML (or JSON, being a YAML subset)
/// mapping with no body.
pub fn parse_data_file(content: &str) -> Result<ParsedDocument, FrontmatterError> {
    let fields: Fields = serde_yaml_ng::from_str(content)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    Ok(ParsedDocument {
        fields,
        body: String::new(),
    })
}
