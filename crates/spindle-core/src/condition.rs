//! Sequence flow condition payloads.
//!
//! Conditions are stored on flows as expression bodies. The common case is a
//! disjunction over discrete result codes:
//!
//! ```text
//! ${$RESULT_CODE=='0' || $RESULT_CODE=='2'}
//! ```
//!
//! which the editor shows in the compact form `0,2`. Anything else is kept
//! as a free-text expression.

use std::sync::OnceLock;

use regex::Regex;

/// Name of the process variable tested by result-code conditions.
pub const RESULT_CODE_VARIABLE: &str = "$RESULT_CODE";

fn result_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$RESULT_CODE=='(\d+)'").expect("result code pattern is valid")
    })
}

/// A parsed flow condition.
///
/// # Examples
///
/// ```
/// use spindle_core::condition::Condition;
///
/// let condition = Condition::parse("${$RESULT_CODE=='0' || $RESULT_CODE=='2'}").unwrap();
/// assert_eq!(condition.display_value(), "0,2");
///
/// let rebuilt = Condition::from_display_value("0,2").unwrap();
/// assert_eq!(rebuilt, condition);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Result codes combined by logical OR, in textual order.
    ResultCodes(Vec<String>),
    /// Any other expression, kept verbatim.
    Expression(String),
}

impl Condition {
    /// Parses a stored expression body.
    ///
    /// Returns `None` for an empty body.
    pub fn parse(body: &str) -> Option<Self> {
        if body.is_empty() {
            return None;
        }

        let codes: Vec<String> = result_code_pattern()
            .captures_iter(body)
            .map(|captures| captures[1].to_string())
            .collect();

        if codes.is_empty() {
            Some(Self::Expression(body.to_string()))
        } else {
            Some(Self::ResultCodes(codes))
        }
    }

    /// Parses the compact form entered in the property form.
    ///
    /// `"0, 2"` becomes a result-code set; a value that already looks like a
    /// full `${...}` expression is kept verbatim. Blank input yields `None`.
    pub fn from_display_value(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if value.contains("${") && value.contains('}') {
            return Some(Self::Expression(value.to_string()));
        }

        let codes: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect();

        if codes.is_empty() {
            None
        } else {
            Some(Self::ResultCodes(codes))
        }
    }

    /// Returns the compact text shown to users and used as a synthesized flow name.
    pub fn display_value(&self) -> String {
        match self {
            Self::ResultCodes(codes) => codes.join(","),
            Self::Expression(body) => body.clone(),
        }
    }

    /// Builds the expression body stored on the flow.
    pub fn to_expression(&self) -> String {
        match self {
            Self::ResultCodes(codes) => {
                let terms: Vec<String> = codes
                    .iter()
                    .map(|code| format!("{RESULT_CODE_VARIABLE}=='{code}'"))
                    .collect();
                format!("${{{}}}", terms.join(" || "))
            }
            Self::Expression(body) => body.clone(),
        }
    }
}
