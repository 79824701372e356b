use serde::Serialize;
use tracing::warn;

/// Encode `value` as compact single-line JSON.
pub fn try_encode<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Encode `value` as compact single-line JSON, absorbing failures.
///
/// Logging must never fail the caller: an encoding error is reported as a
/// `warn!` diagnostic and an empty string is returned in place of the line.
pub fn encode_line<T: Serialize + ?Sized>(value: &T) -> String {
    match try_encode(value) {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, "failed to encode log entry");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::{Error as _, Serializer};

    struct Unrepresentable;

    impl Serialize for Unrepresentable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("value has no JSON form"))
        }
    }

    #[derive(Serialize)]
    struct Wrapper {
        ok: &'static str,
        bad: Unrepresentable,
    }

    #[test]
    fn failure_degrades_to_empty_string() {
        assert_eq!(encode_line(&Unrepresentable), "");
        assert_eq!(encode_line(&Wrapper { ok: "x", bad: Unrepresentable }), "");
    }

    #[test]
    fn try_encode_surfaces_the_error() {
        let err = try_encode(&Unrepresentable).unwrap_err();
        assert!(err.to_string().contains("value has no JSON form"));
    }

    #[test]
    fn output_is_single_line() {
        let value = serde_json::json!({ "message": "line one\nline two" });
        let line = encode_line(&value);
        assert!(!line.contains('\n'));
        assert_eq!(line, r#"{"message":"line one\nline two"}"#);
    }
}
