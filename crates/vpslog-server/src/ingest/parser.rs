//! Line parsers for the web-access and authentication logs
//!
//! These are best-effort field extractors, not validating decoders. A line
//! that does not fit yields `None` and is dropped by the pipeline; one bad
//! line never stops the rest of the file from being ingested.

use crate::models::{AuthAction, AuthRecord, RecordBatch, RecordKind, WebAccessRecord};

/// Minimum whitespace-separated tokens in a usable access log line
const WEB_ACCESS_MIN_TOKENS: usize = 9;

/// A parser for one log source
///
/// Implementations map a single raw line to a record, or `None` to skip it.
pub trait LineParser: Send + Sync {
    type Record: Send;

    /// Kind of record this parser produces
    fn kind(&self) -> RecordKind;

    fn parse_line(&self, line: &str) -> Option<Self::Record>;

    /// Wrap parsed records for a single store append
    fn into_batch(&self, records: Vec<Self::Record>) -> RecordBatch;
}

/// Parser for combined-format web-server access log lines
#[derive(Debug, Clone, Copy, Default)]
pub struct WebAccessParser;

impl LineParser for WebAccessParser {
    type Record = WebAccessRecord;

    fn kind(&self) -> RecordKind {
        RecordKind::WebAccess
    }

    fn parse_line(&self, line: &str) -> Option<WebAccessRecord> {
        parse_web_access_line(line)
    }

    fn into_batch(&self, records: Vec<WebAccessRecord>) -> RecordBatch {
        RecordBatch::WebAccess(records)
    }
}

/// Parser for sshd lines from the system authentication log
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthParser;

impl LineParser for AuthParser {
    type Record = AuthRecord;

    fn kind(&self) -> RecordKind {
        RecordKind::Auth
    }

    fn parse_line(&self, line: &str) -> Option<AuthRecord> {
        parse_auth_line(line)
    }

    fn into_batch(&self, records: Vec<AuthRecord>) -> RecordBatch {
        RecordBatch::Auth(records)
    }
}

/// Extract fields from one access log line by token position
///
/// Token 0 is the remote address, token 5 the quoted method, token 6 the
/// path and token 8 the status code. Fewer than nine tokens or a status code
/// that is not an integer makes the line unparseable.
pub fn parse_web_access_line(line: &str) -> Option<WebAccessRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < WEB_ACCESS_MIN_TOKENS {
        return None;
    }

    let status_code = tokens[8].parse::<i32>().ok()?;

    Some(WebAccessRecord {
        remote_addr: tokens[0].to_string(),
        method: tokens[5].replace('"', ""),
        path: tokens[6].to_string(),
        status_code,
        raw: line.trim_end().to_string(),
    })
}

/// Classify one authentication log line and pull out user and address
///
/// The action never fails to classify (`unknown` is a valid result). The only
/// skip is a standalone `for` token with nothing after it.
pub fn parse_auth_line(line: &str) -> Option<AuthRecord> {
    let action = if line.contains("Accepted") {
        AuthAction::Accepted
    } else if line.contains("Failed") {
        AuthAction::Failed
    } else {
        AuthAction::Unknown
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();

    // Loose IPv4 heuristic: exactly three dots, octets unchecked
    let ip_address = tokens
        .iter()
        .find(|token| token.matches('.').count() == 3)
        .map(|token| token.to_string());

    let user = match tokens.iter().position(|token| *token == "for") {
        Some(idx) => Some(tokens.get(idx + 1)?.to_string()),
        None => None,
    };

    Some(AuthRecord {
        user,
        ip_address,
        action,
        raw: line.trim_end().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_LINE: &str =
        "127.0.0.1 - - [10/Oct/2023:13:55:36 +0000] \"GET /index.html HTTP/1.1\" 200 512";

    #[test]
    fn test_parse_web_access_line() {
        let record = parse_web_access_line(ACCESS_LINE).unwrap();
        assert_eq!(record.remote_addr, "127.0.0.1");
        assert_eq!(record.method, "GET");
        assert_eq!(record.path, "/index.html");
        assert_eq!(record.status_code, 200);
        assert_eq!(record.raw, ACCESS_LINE);
    }

    #[test]
    fn test_parse_web_access_single_token_timestamp_shifts_fields() {
        let record =
            parse_web_access_line("127.0.0.1 - - [10/Oct/2023] \"GET /index.html HTTP/1.1\" 200 512")
                .unwrap();
        assert_eq!(record.method, "/index.html");
        assert_eq!(record.path, "HTTP/1.1\"");
        assert_eq!(record.status_code, 512);
    }

    #[test]
    fn test_parse_web_access_full_combined_format() {
        let line = "203.0.113.9 - - [10/Oct/2023:13:55:36 +0000] \"POST /api/login HTTP/1.1\" 401 17 \"-\" \"curl/8.0\"\n";
        let record = parse_web_access_line(line).unwrap();
        assert_eq!(record.remote_addr, "203.0.113.9");
        assert_eq!(record.method, "POST");
        assert_eq!(record.path, "/api/login");
        assert_eq!(record.status_code, 401);
        assert!(!record.raw.ends_with('\n'));
    }

    #[test]
    fn test_parse_web_access_too_few_tokens() {
        assert!(parse_web_access_line("").is_none());
        assert!(parse_web_access_line("127.0.0.1 - - [10/Oct/2023] \"GET / HTTP/1.1\"").is_none());
        assert!(parse_web_access_line("a b c d e f g h").is_none());
    }

    #[test]
    fn test_parse_web_access_non_integer_status() {
        let line = "127.0.0.1 - - [10/Oct/2023:13:55:36 +0000] \"GET /index.html HTTP/1.1\" OK 512";
        assert!(parse_web_access_line(line).is_none());

        let line = "127.0.0.1 - - [10/Oct/2023:13:55:36 +0000] \"GET /index.html HTTP/1.1\" 20.0 512";
        assert!(parse_web_access_line(line).is_none());
    }

    #[test]
    fn test_parse_web_access_exactly_nine_tokens() {
        let record = parse_web_access_line("a b c d e \"PUT /x y 404").unwrap();
        assert_eq!(record.remote_addr, "a");
        assert_eq!(record.method, "PUT");
        assert_eq!(record.path, "/x");
        assert_eq!(record.status_code, 404);
    }

    #[test]
    fn test_parse_web_access_strips_all_quotes_from_method() {
        let record = parse_web_access_line("a b c d e \"\"GET\" /x y 301").unwrap();
        assert_eq!(record.method, "GET");
    }

    #[test]
    fn test_parse_auth_accepted() {
        let line = "Jan 1 00:00:00 host sshd[1]: Accepted password for alice from 10.0.0.5 port 22";
        let record = parse_auth_line(line).unwrap();
        assert_eq!(record.user.as_deref(), Some("alice"));
        assert_eq!(record.ip_address.as_deref(), Some("10.0.0.5"));
        assert_eq!(record.action, AuthAction::Accepted);
        assert_eq!(record.raw, line);
    }

    #[test]
    fn test_parse_auth_failed() {
        let line = "Jan 1 00:00:01 host sshd[2]: Failed password for root from 192.168.1.20 port 4242 ssh2";
        let record = parse_auth_line(line).unwrap();
        assert_eq!(record.user.as_deref(), Some("root"));
        assert_eq!(record.ip_address.as_deref(), Some("192.168.1.20"));
        assert_eq!(record.action, AuthAction::Failed);
    }

    #[test]
    fn test_parse_auth_accepted_wins_over_failed() {
        let record = parse_auth_line("Failed earlier, Accepted now").unwrap();
        assert_eq!(record.action, AuthAction::Accepted);
    }

    #[test]
    fn test_parse_auth_unknown_without_user_or_ip() {
        let record = parse_auth_line("Jan 1 00:00:02 host CRON[3]: session opened").unwrap();
        assert_eq!(record.action, AuthAction::Unknown);
        assert_eq!(record.user, None);
        assert_eq!(record.ip_address, None);
    }

    #[test]
    fn test_parse_auth_invalid_user_takes_token_after_for() {
        let line = "sshd[4]: Failed password for invalid user admin from 10.1.1.1 port 22";
        let record = parse_auth_line(line).unwrap();
        assert_eq!(record.user.as_deref(), Some("invalid"));
    }

    #[test]
    fn test_parse_auth_for_must_be_standalone() {
        let record = parse_auth_line("forwarding disabled for_now").unwrap();
        assert_eq!(record.user, None);
    }

    #[test]
    fn test_parse_auth_trailing_for_skips_line() {
        assert!(parse_auth_line("Accepted publickey for").is_none());
    }

    #[test]
    fn test_parse_auth_ip_heuristic_is_loose() {
        let record = parse_auth_line("from 999.1.2.3 and 1.2.3.4").unwrap();
        assert_eq!(record.ip_address.as_deref(), Some("999.1.2.3"));

        let record = parse_auth_line("version 1.2.3 only").unwrap();
        assert_eq!(record.ip_address, None);
    }

    #[test]
    fn test_parser_kinds() {
        assert_eq!(WebAccessParser.kind(), RecordKind::WebAccess);
        assert_eq!(AuthParser.kind(), RecordKind::Auth);
        assert_eq!(AuthParser.into_batch(Vec::new()).kind(), RecordKind::Auth);
    }
}
