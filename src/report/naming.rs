//! Dashboard test names derived from document URI, feature and scenario names.

use std::sync::OnceLock;
use regex::Regex;

use super::attempt::TestCaseAttempt;

fn word_re() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    // Underscore separates words.
    WORD.get_or_init(|| Regex::new(r"[\p{Alphabetic}\p{Nd}]+").expect("static pattern"))
}

/// Collapse free text into one camel-case token: `Hello World` -> `helloWorld`.
///
/// The first letter overall is lower-cased, the first letter of every later
/// word is upper-cased, upper-case letters inside words are kept, and
/// everything that is not a letter or digit is dropped.
pub fn to_identifier_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in word_re().find_iter(text) {
        let mut chars = word.as_str().chars();
        let Some(first) = chars.next() else { continue };
        if out.is_empty() {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.push_str(chars.as_str());
    }
    out
}

/// Identifier case with a leading capital: `User Login` -> `UserLogin`.
pub fn to_class_case(text: &str) -> String {
    let camel = to_identifier_case(text);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => camel,
    }
}

/// File name of the document without its extension.
///
/// `C:\features\login.feature` -> `login`. Both separators are accepted; a
/// name without a dot is kept whole.
pub fn package_name(uri: &str) -> &str {
    let start = uri.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let file = &uri[start..];
    match file.rfind('.') {
        Some(end) => &file[..end],
        None => file,
    }
}

/// Camel-case scenario name; also the screenshot file name prefix.
pub fn test_name(attempt: &TestCaseAttempt) -> String {
    to_identifier_case(&attempt.pickle_name)
}

/// `<uri>: <package>.<FeatureClass>.<scenarioTest>`
pub fn full_test_name(attempt: &TestCaseAttempt) -> String {
    format!(
        "{}: {}.{}.{}",
        attempt.uri,
        package_name(&attempt.uri),
        to_class_case(&attempt.feature_name),
        test_name(attempt),
    )
}
