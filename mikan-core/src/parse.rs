//! パース関連のユーティリティ関数

use crate::errors::Error;
use crate::Result;
use mikan_wire::{MiResult, MiValue};

/// フィールドの値を文字列として取り出す
///
/// 文字列を期待するフィールドにタプルやリストが入っていればエラーにします。
pub fn cstring_value<'a>(name: &str, field: &'a MiResult) -> Result<&'a str> {
    match &field.value {
        MiValue::CString(value) => Ok(value),
        other => Err(Error::schema(format!(
            "field '{}' is a {}, expected cstring",
            name,
            other.kind_name()
        ))),
    }
}

/// フィールドの値を符号なし10進数としてパースする
///
/// 空文字列、符号、空白、10進数字以外を含む値はエラーにします。
///
/// # Examples
/// ```
/// use mikan_core::parse::parse_unsigned;
///
/// assert_eq!(parse_unsigned("line", "42").unwrap(), 42);
/// assert!(parse_unsigned("line", "-1").is_err());
/// ```
pub fn parse_unsigned(field: &str, s: &str) -> Result<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::schema(format!(
            "field '{}' is not an unsigned integer: '{}'",
            field, s
        )));
    }
    s.parse::<u64>()
        .map_err(|e| Error::schema(format!("field '{}' is out of range '{}': {}", field, s, e)))
}

/// `0`/`1` のフラグをパースする
pub fn parse_flag(field: &str, s: &str) -> Result<bool> {
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(Error::schema(format!(
            "field '{}' must be \"0\" or \"1\": '{}'",
            field, s
        ))),
    }
}

/// アドレス文字列をu64にパース
///
/// `0x` プレフィックス付きの16進数のみをサポートします。
///
/// # Examples
/// ```
/// use mikan_core::parse::parse_address;
///
/// assert_eq!(parse_address("0x0000555555555139"), Some(0x555555555139));
/// assert_eq!(parse_address("<PENDING>"), None);
/// ```
pub fn parse_address(s: &str) -> Option<u64> {
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    u64::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unsigned() {
        assert_eq!(parse_unsigned("times", "0").unwrap(), 0);
        assert_eq!(parse_unsigned("line", "1234").unwrap(), 1234);
    }

    #[test]
    fn test_parse_unsigned_invalid() {
        assert!(parse_unsigned("line", "").is_err());
        assert!(parse_unsigned("line", "+1").is_err());
        assert!(parse_unsigned("line", " 1").is_err());
        assert!(parse_unsigned("line", "12a").is_err());
        assert!(parse_unsigned("line", "99999999999999999999999").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag("macro-info", "0").unwrap());
        assert!(parse_flag("macro-info", "1").unwrap());
        assert!(matches!(parse_flag("macro-info", "yes"), Err(Error::Schema(_))));
    }

    #[test]
    fn test_cstring_value() {
        let field = MiResult::named("line", MiValue::CString("4".to_string()));
        assert_eq!(cstring_value("line", &field).unwrap(), "4");

        let list = MiResult::named("line", MiValue::List(vec![]));
        let err = cstring_value("line", &list).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert_eq!(
            err.to_string(),
            "unexpected result shape: field 'line' is a list, expected cstring"
        );
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x1234"), Some(0x1234));
        assert_eq!(parse_address("0XABCD"), Some(0xabcd));
        assert_eq!(parse_address("1234"), None);
        assert_eq!(parse_address("0xghij"), None);
    }
}
