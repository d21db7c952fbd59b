/// Account identity extraction from a bearer token payload.
///
/// The token is read, never verified: the client only needs the account id the
/// backend already encoded for it. The payload segment is base64url-decoded
/// and scanned for the first meaningful claim among `nameid`, `sub`,
/// `accountId`.
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::Value;

const ACCOUNT_CLAIMS: [&str; 3] = ["nameid", "sub", "accountId"];

/// Returns the account id carried by the token, or `None` when the token is
/// malformed, no claim is present, or the claim does not start with an
/// integer. A zero id is treated as absent.
pub fn account_id_from_token(token: &str) -> Option<i64> {
    let payload = decode_payload(token)?;
    let claim = first_meaningful_claim(&payload)?;
    let id = integer_prefix(claim)?;
    (id != 0).then_some(id)
}

fn decode_payload(token: &str) -> Option<Value> {
    let segment = token.split('.').nth(1)?;
    let trimmed = segment.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// First claim in priority order whose value is present and non-empty.
/// A claim holding an empty string or the number zero falls through to the
/// next candidate; any other value wins the lookup even if it later fails to
/// parse.
fn first_meaningful_claim(payload: &Value) -> Option<&Value> {
    ACCOUNT_CLAIMS
        .iter()
        .filter_map(|name| payload.get(name))
        .find(|value| is_meaningful(value))
}

fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Integer prefix parse: optional sign, longest digit run, trailing text
/// ignored. Fractional numbers truncate toward zero.
fn integer_prefix(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let (sign, rest) = match s.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, s.strip_prefix('+').unwrap_or(s)),
            };
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return None;
            }
            digits.parse::<i64>().ok().map(|v| sign * v)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &str) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.c2ln",
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_prefers_nameid() {
        let token = token_with_payload(r#"{"nameid":"12","sub":"34","accountId":56}"#);
        assert_eq!(account_id_from_token(&token), Some(12));
    }

    #[test]
    fn test_falls_back_to_sub_then_account_id() {
        let token = token_with_payload(r#"{"sub":"34","accountId":56}"#);
        assert_eq!(account_id_from_token(&token), Some(34));

        let token = token_with_payload(r#"{"accountId":56}"#);
        assert_eq!(account_id_from_token(&token), Some(56));
    }

    #[test]
    fn test_empty_string_claim_falls_through() {
        let token = token_with_payload(r#"{"nameid":"","sub":"7"}"#);
        assert_eq!(account_id_from_token(&token), Some(7));
    }

    #[test]
    fn test_zero_number_claim_falls_through() {
        let token = token_with_payload(r#"{"nameid":0,"sub":9}"#);
        assert_eq!(account_id_from_token(&token), Some(9));
    }

    #[test]
    fn test_non_numeric_claim_does_not_fall_through() {
        // "admin" wins the lookup, then fails the parse; later claims are
        // never consulted
        let token = token_with_payload(r#"{"nameid":"admin","sub":"9"}"#);
        assert_eq!(account_id_from_token(&token), None);
    }

    #[test]
    fn test_digit_prefix_with_trailing_text() {
        let token = token_with_payload(r#"{"nameid":"42abc"}"#);
        assert_eq!(account_id_from_token(&token), Some(42));
    }

    #[test]
    fn test_string_zero_yields_none() {
        let token = token_with_payload(r#"{"nameid":"0"}"#);
        assert_eq!(account_id_from_token(&token), None);
    }

    #[test]
    fn test_number_claim() {
        let token = token_with_payload(r#"{"sub":1234}"#);
        assert_eq!(account_id_from_token(&token), Some(1234));
    }

    #[test]
    fn test_padded_segment_is_tolerated() {
        let mut token = token_with_payload(r#"{"nameid":5}"#);
        token = token.replace(".c2ln", "==.c2ln");
        assert_eq!(account_id_from_token(&token), Some(5));
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(account_id_from_token(""), None);
        assert_eq!(account_id_from_token("no-dots-here"), None);
        assert_eq!(account_id_from_token("a.!!!not-base64!!!.c"), None);

        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("plain text"));
        assert_eq!(account_id_from_token(&not_json), None);
    }

    #[test]
    fn test_no_known_claims() {
        let token = token_with_payload(r#"{"email":"leader@club.edu"}"#);
        assert_eq!(account_id_from_token(&token), None);
    }
}
