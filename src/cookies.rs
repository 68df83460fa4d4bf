//! Minimal RFC 6265-style handling of the session cookie.
//!
//! The request side tolerates multiple `name=value` pairs, stray whitespace,
//! and malformed pairs. Lookup is by exact cookie name; when the named cookie
//! is absent the first well-formed pair wins as a fallback.

/// Build the `Set-Cookie` value that establishes a session.
pub fn session_cookie(name: &str, token: &str) -> String {
    format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// Build the `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// Extract the session token from a `Cookie` header value.
pub fn decode(header: &str, name: &str) -> Option<String> {
    let mut fallback = None;

    for pair in header.split(';') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };

        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }

        if key == name {
            return Some(value.to_string());
        }

        if fallback.is_none() {
            fallback = Some(value.to_string());
        }
    }

    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "jamhub_session";

    #[test]
    fn decodes_named_cookie() {
        assert_eq!(
            decode("jamhub_session=abc123", NAME).as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn named_cookie_wins_over_earlier_pairs() {
        let header = "theme=dark; jamhub_session=tok42; lang=en";
        assert_eq!(decode(header, NAME).as_deref(), Some("tok42"));
    }

    #[test]
    fn falls_back_to_first_pair_when_name_absent() {
        let header = "legacy=old-token; other=ignored";
        assert_eq!(decode(header, NAME).as_deref(), Some("old-token"));
    }

    #[test]
    fn tolerates_whitespace_and_malformed_pairs() {
        let header = "broken ;  jamhub_session = padded ; =empty";
        assert_eq!(decode(header, NAME).as_deref(), Some("padded"));
    }

    #[test]
    fn empty_header_yields_none() {
        assert_eq!(decode("", NAME), None);
        assert_eq!(decode(";;", NAME), None);
    }

    #[test]
    fn set_cookie_values_carry_attributes() {
        let set = session_cookie(NAME, "tok");
        assert!(set.starts_with("jamhub_session=tok"));
        assert!(set.contains("HttpOnly"));

        let clear = clear_session_cookie(NAME);
        assert!(clear.contains("Max-Age=0"));
    }
}
