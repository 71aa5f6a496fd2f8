//! MIのc-stringのエスケープ解除
//!
//! GDBはc-stringの中の `"` を `\"` に、`\` を `\\` にエスケープして出力します。
//! ここではその逆変換を行い、GDBが送ろうとした元の文字列を復元します。

use crate::{Error, Result};

/// 字句解析器が切り出したc-stringトークン（前後の `"` を含む）のエスケープを解除する
///
/// - `\"` -> `"`
/// - `\\` -> `\`
/// - `\n` -> 改行
/// - `\r` -> 復帰
/// - `\t` -> タブ
///
/// それ以外のエスケープはバックスラッシュを落として次の文字をそのまま残します。
///
/// # Examples
/// ```
/// use mikan_wire::unescape_cstring;
///
/// assert_eq!(unescape_cstring(r#""a\"b\nc""#).unwrap(), "a\"b\nc");
/// ```
pub fn unescape_cstring(raw: &str) -> Result<String> {
    let inner = raw.strip_prefix('"').unwrap_or(raw);
    let inner = inner.strip_suffix('"').unwrap_or(inner);

    let mut result = String::new();
    result
        .try_reserve(inner.len())
        .map_err(|e| Error::out_of_memory("unescaping a c-string", e))?;

    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some(other) => result.push(other),
            // 字句解析器は閉じ引用符の直前に孤立した `\` を残さない
            None => result.push('\\'),
        }
    }

    Ok(result)
}
