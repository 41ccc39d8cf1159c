//! crates/biblia_core/src/analysis.rs
//!
//! Typed, tolerant decoding of AI theological commentary. The model is asked
//! for a bare JSON object, but real responses wrap it in code fences, prepend
//! chatter, or rename fields between runs. Each logical field therefore has
//! an explicit ordered list of accepted aliases, and every field is optional;
//! an absent field is a gap in the analysis, not an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What kind of passage the analysis covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnalysisMode {
    Chapter,
    Verse,
}

/// A commentary request: the passage text plus an optional human-readable
/// reference (e.g. `"Gênesis 1:1"`) to anchor the prompt.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub mode: AnalysisMode,
    pub passage: String,
    pub reference: Option<String>,
}

/// A cross reference suggested by the analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    pub reference: Option<String>,
    pub kind: Option<String>,
    pub text: Option<String>,
    pub reason: Option<String>,
}

/// The decoded commentary. Field names follow the app's display sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub theme: Option<String>,
    pub exegesis: Option<String>,
    pub history: Option<String>,
    pub theology: Option<String>,
    pub application: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<CrossReference>,
}

/// Ordered alias lists, first match wins.
const THEME_ALIASES: &[&str] = &["theme", "intro"];
const EXEGESIS_ALIASES: &[&str] = &["exegesis", "original"];
const HISTORY_ALIASES: &[&str] = &["history", "context"];
const THEOLOGY_ALIASES: &[&str] = &["theology", "doctrine"];
const APPLICATION_ALIASES: &[&str] = &["application", "conclusion"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnalysisDecodeError {
    #[error("the model response did not contain a JSON object")]
    NotJson,
}

static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)```(?:json)?").unwrap());

/// Removes markdown code-fence markers the model tends to wrap JSON in.
pub fn strip_code_fences(raw: &str) -> String {
    FENCE_RE.replace_all(raw, "").trim().to_string()
}

/// The substring from the first `{` through the last `}`, when both exist in
/// that order. Recovers a JSON object embedded in surrounding chatter.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    if last <= first {
        return None;
    }
    Some(&text[first..=last])
}

/// Parses the response body as JSON, trying the fence-stripped text directly
/// and then the first embedded object.
fn parse_lenient(raw: &str) -> Result<Value, AnalysisDecodeError> {
    let stripped = strip_code_fences(raw);
    if let Ok(value) = serde_json::from_str::<Value>(&stripped) {
        return Ok(value);
    }
    let extracted = extract_first_json_object(&stripped).ok_or(AnalysisDecodeError::NotJson)?;
    serde_json::from_str(extracted).map_err(|_| AnalysisDecodeError::NotJson)
}

/// First alias present as a non-empty string.
fn field(value: &Value, aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        if let Some(text) = value.get(alias).and_then(Value::as_str) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn decode_reference(value: &Value) -> CrossReference {
    CrossReference {
        reference: field(value, &["ref", "reference"]),
        kind: field(value, &["type", "kind"]),
        text: field(value, &["text", "excerpt"]),
        reason: field(value, &["reason", "explanation"]),
    }
}

/// Decodes a raw model response into a typed [`Analysis`].
///
/// Errors only when no JSON object can be recovered at all; a valid object
/// with unknown or missing fields decodes to a (possibly empty) analysis.
pub fn decode_analysis(raw: &str) -> Result<Analysis, AnalysisDecodeError> {
    let value = parse_lenient(raw)?;

    let references = value
        .get("references")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(decode_reference).collect())
        .unwrap_or_default();

    Ok(Analysis {
        theme: field(&value, THEME_ALIASES),
        exegesis: field(&value, EXEGESIS_ALIASES),
        history: field(&value, HISTORY_ALIASES),
        theology: field(&value, THEOLOGY_ALIASES),
        application: field(&value, APPLICATION_ALIASES),
        references,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_canonical_field_names() {
        let raw = r#"{"theme":"Criação","exegesis":"No princípio...","history":"Contexto",
                      "theology":"Soberania","application":"Confiança"}"#;
        let analysis = decode_analysis(raw).unwrap();
        assert_eq!(analysis.theme.as_deref(), Some("Criação"));
        assert_eq!(analysis.application.as_deref(), Some("Confiança"));
        assert!(analysis.references.is_empty());
    }

    #[test]
    fn earlier_alias_wins_over_later() {
        let raw = r#"{"theme":"primary","intro":"secondary","original":"exe"}"#;
        let analysis = decode_analysis(raw).unwrap();
        assert_eq!(analysis.theme.as_deref(), Some("primary"));
        assert_eq!(analysis.exegesis.as_deref(), Some("exe"));
    }

    #[test]
    fn strips_fences_and_surrounding_chatter() {
        let raw = "Claro! Aqui está:\n```json\n{\"context\":\"história\",\"doctrine\":\"graça\"}\n```\nEspero que ajude.";
        let analysis = decode_analysis(raw).unwrap();
        assert_eq!(analysis.history.as_deref(), Some("história"));
        assert_eq!(analysis.theology.as_deref(), Some("graça"));
    }

    #[test]
    fn blank_strings_read_as_absent() {
        let analysis = decode_analysis(r#"{"theme":"  ","intro":"fallback"}"#).unwrap();
        assert_eq!(analysis.theme.as_deref(), Some("fallback"));
    }

    #[test]
    fn decodes_lenient_cross_references() {
        let raw = r#"{"theme":"t","references":[
            {"ref":"Rm 5:1","type":"Teologia Sistemática","text":"resumo","reason":"conexão"},
            {"reference":"Sl 23:1","explanation":"eco"}
        ]}"#;
        let analysis = decode_analysis(raw).unwrap();
        assert_eq!(analysis.references.len(), 2);
        assert_eq!(analysis.references[0].reference.as_deref(), Some("Rm 5:1"));
        assert_eq!(analysis.references[1].reference.as_deref(), Some("Sl 23:1"));
        assert_eq!(analysis.references[1].reason.as_deref(), Some("eco"));
    }

    #[test]
    fn rejects_responses_without_an_object() {
        assert_eq!(
            decode_analysis("A IA está indisponível no momento."),
            Err(AnalysisDecodeError::NotJson)
        );
        assert_eq!(decode_analysis("}{"), Err(AnalysisDecodeError::NotJson));
    }
}
