//! Mediux set source: GraphQL client, payload schemas, and set-URL
//! parsing.

pub mod client;
pub mod query;
pub mod schemas;

pub use client::MediuxClient;

/// Extract a set id from user input: either a bare id or a set page URL
/// like `https://mediux.pro/sets/12345`.
pub fn parse_set_reference(input: &str) -> Option<u64> {
    let input = input.trim().trim_end_matches('/');
    if let Ok(id) = input.parse() {
        return Some(id);
    }
    if !input.contains("/sets/") {
        return None;
    }
    let tail = input.rsplit('/').next()?;
    let tail = tail.split('?').next()?;
    tail.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_ids() {
        assert_eq!(parse_set_reference("12345"), Some(12345));
        assert_eq!(parse_set_reference("  678 "), Some(678));
    }

    #[test]
    fn accepts_set_page_urls() {
        assert_eq!(parse_set_reference("https://mediux.pro/sets/9000"), Some(9000));
        assert_eq!(parse_set_reference("https://mediux.pro/sets/9000/"), Some(9000));
        assert_eq!(
            parse_set_reference("https://mediux.pro/sets/9000?utm_source=x"),
            Some(9000)
        );
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(parse_set_reference("https://mediux.pro/user/alice"), None);
        assert_eq!(parse_set_reference("not a set"), None);
        assert_eq!(parse_set_reference(""), None);
    }
}
