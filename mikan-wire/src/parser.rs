//! 行単位のプッシュ型パーサー
//!
//! 任意に分割されたバイト列を受け取り、行が揃うたびに `Output` を作ります。

use crate::grammar::parse_tokens;
use crate::lexer::tokenize;
use crate::line::LineExtractor;
use crate::output::{Output, OutputKind};
use crate::Result;
use tracing::{trace, warn};

/// MI出力のプッシュ型パーサー
///
/// コールバックは持たず、`push` ごとに完成した行の `Output` を順に返します。
///
/// # Examples
/// ```
/// use mikan_wire::{MiParser, OutputKind};
///
/// let mut parser = MiParser::new();
/// assert!(parser.push(b"^do").unwrap().is_empty());
/// let outputs = parser.push(b"ne\n(gdb)\n").unwrap();
/// assert_eq!(outputs.len(), 2);
/// assert!(matches!(outputs[1].kind, OutputKind::Prompt));
/// ```
#[derive(Debug, Default)]
pub struct MiParser {
    lines: LineExtractor,
}

impl MiParser {
    /// 新しいパーサーを作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// バイト列を追加し、完成した行をすべて解析する
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Output>> {
        self.lines
            .push(data)?
            .into_iter()
            .map(|line| parse_line(&decode_line(line)))
            .collect()
    }

    pub fn push_str(&mut self, text: &str) -> Result<Vec<Output>> {
        self.push(text.as_bytes())
    }

    /// 終端のない残りを最後の行として解析する
    pub fn flush(&mut self) -> Result<Option<Output>> {
        self.lines
            .flush()
            .map(|line| parse_line(&decode_line(line)))
            .transpose()
    }

    /// 終端の揃っていない行を保持しているか
    pub fn is_buffering(&self) -> bool {
        self.lines.is_buffering()
    }
}

/// 終端文字を除いた1行を解析する
///
/// 構文エラーも `OutputKind::ParseError` を持つ `Output` として返します。
/// `Err` になるのはメモリ確保に失敗した場合だけです。
pub fn parse_line(line: &str) -> Result<Output> {
    let tokens = tokenize(line);
    trace!("{} tokens in {:?}", tokens.len(), line);
    let kind = parse_tokens(&tokens)?;
    if let OutputKind::ParseError { token, position } = &kind {
        warn!(
            "parse error at column {}-{} near {:?}: {:?}",
            position.start_column, position.end_column, token, line
        );
    }
    Ok(Output {
        kind,
        line: line.to_string(),
    })
}

/// UTF-8として解釈できないバイトは置換文字にする
fn decode_line(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(line) => line,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::ResultClass;

    #[test]
    fn test_push_keeps_partial_line() {
        let mut parser = MiParser::new();
        assert!(parser.push_str("^done,a=\"").unwrap().is_empty());
        assert!(parser.is_buffering());
        let outputs = parser.push_str("1\"\n").unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].line, "^done,a=\"1\"");
        assert_eq!(
            outputs[0].as_result().map(|r| r.result_class),
            Some(ResultClass::Done)
        );
        assert!(!parser.is_buffering());
    }

    #[test]
    fn test_flush_parses_unterminated_remainder() {
        let mut parser = MiParser::new();
        assert!(parser.push_str("(gdb)").unwrap().is_empty());
        let output = parser.flush().unwrap().unwrap();
        assert_eq!(output.kind, OutputKind::Prompt);
        assert!(parser.flush().unwrap().is_none());
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let output = parse_line(&decode_line(b"~\"\xff\"".to_vec())).unwrap();
        assert_eq!(output.line, "~\"\u{fffd}\"");
        assert!(!output.is_parse_error());
    }

    #[test]
    fn test_parse_error_keeps_line() {
        let output = parse_line("garbage").unwrap();
        assert!(output.is_parse_error());
        assert_eq!(output.line, "garbage");
    }
}
