//! Filename and token patterns for readme-census
//! Kept in a separate crate so the compiled patterns are shared between the core and the CLI

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Eight-digit date tokens embedded in document filenames
pub mod date_token {
    use super::*;

    pub static DATE_PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\d{8}").expect("Invalid regex pattern"));

    /// First run of eight digits in `text`, valid or not
    pub fn find(text: &str) -> Option<&str> {
        DATE_PATTERN.find(text).map(|m| m.as_str())
    }

    /// Parse a `YYYYMMDD` token as a calendar date
    pub fn parse(token: &str) -> Option<NaiveDate> {
        if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(token, "%Y%m%d").ok()
    }

    /// Find the first token in `text` and validate it
    pub fn extract(text: &str) -> Option<NaiveDate> {
        find(text).and_then(parse)
    }
}

/// Filename regexes for expected document kinds
pub mod filename {
    use super::*;

    const DATE: &str = r"\d{8}.*";

    /// `PREFIX…[date…].ext`
    pub fn prefixed(prefix: &str, dated: bool, extension: &str) -> Result<Regex, regex::Error> {
        build(&format!("^{}.*", regex::escape(prefix)), dated, "", extension)
    }

    /// `…TEXT…[date…].ext`
    pub fn containing(text: &str, dated: bool, extension: &str) -> Result<Regex, regex::Error> {
        build(&format!("^.*{}.*", regex::escape(text)), dated, "", extension)
    }

    /// `…[date…]SUFFIX.ext`
    pub fn suffixed(suffix: &str, dated: bool, extension: &str) -> Result<Regex, regex::Error> {
        build("^.*", dated, &regex::escape(suffix), extension)
    }

    fn build(head: &str, dated: bool, tail: &str, extension: &str) -> Result<Regex, regex::Error> {
        let extension = extension.trim_start_matches('.');
        let date = if dated { DATE } else { "" };
        Regex::new(&format!("{head}{date}{tail}\\.{}$", regex::escape(extension)))
    }
}

/// Project code normalization
pub mod project_code {
    /// Strip the registry prefix and every space from a README code value
    pub fn normalize(raw: &str, prefix: Option<&str>) -> Option<String> {
        let mut code = raw.to_string();
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            code = code.replace(prefix, "");
        }
        let code: String = code.chars().filter(|c| *c != ' ').collect();
        let code = code.trim();
        if code.is_empty() { None } else { Some(code.to_string()) }
    }

    /// Derive a code from a folder named like `project-22011-title`
    pub fn from_folder_name(name: &str) -> Option<String> {
        let mut parts = name.split('-');
        parts.next()?;
        let code = parts.next()?.trim();
        if code.is_empty() { None } else { Some(code.to_string()) }
    }
}
