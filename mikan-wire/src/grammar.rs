//! MI出力1行の構文解析
//!
//! 字句解析器が返すトークン列を再帰下降で読み、1つの `OutputKind` を組み立てます。
//!
//! ```text
//! output        ::= (oob_record | result_record | "(gdb)") EOL
//! result_record ::= [INTEGER] "^" IDENTIFIER ("," result)*
//! oob_record    ::= async_record | stream_record
//! async_record  ::= [INTEGER] ("*" | "+" | "=") IDENTIFIER ("," result)*
//! stream_record ::= ("~" | "@" | "&") CSTRING
//! result        ::= [IDENTIFIER "="] value
//! value         ::= CSTRING | "{" [result ("," result)*] "}" | "[" [result ("," result)*] "]"
//! ```
//!
//! 文法を続けられない最初のトークンで解析を打ち切り、
//! `OutputKind::ParseError` として報告します。

use crate::cstring::unescape_cstring;
use crate::lexer::{Token, TokenKind};
use crate::output::{
    AsyncClass, AsyncKind, AsyncRecord, OobRecord, OutputKind, ResultClass, ResultRecord,
    StreamKind, StreamRecord,
};
use crate::value::{MiResult, MiValue};
use crate::{Error, Result};

/// プロンプトの括弧内に書かれる名前
const PROMPT_NAME: &str = "gdb";

/// タプルとリストを入れ子にできる深さの上限
///
/// これを超える開き括弧は構文エラーとして報告します。
/// 値ツリーの生成・表示・破棄の再帰もこの深さに収まります。
pub const MAX_DEPTH: usize = 256;

/// 解析を止める理由
enum Stop<'a> {
    /// 文法に合わないトークン
    Syntax(Token<'a>),
    /// 継続できないエラー
    Fatal(Error),
}

impl From<Error> for Stop<'_> {
    fn from(e: Error) -> Self {
        Stop::Fatal(e)
    }
}

type Step<'a, T> = std::result::Result<T, Stop<'a>>;

/// 1行分のトークン列を解析する
///
/// `tokens` は `TokenKind::Eol` で終わっている必要があります。
/// 構文エラーは `Ok(OutputKind::ParseError { .. })` として返し、
/// `Err` になるのはメモリ確保の失敗だけです。
pub fn parse_tokens(tokens: &[Token<'_>]) -> Result<OutputKind> {
    let mut grammar = Grammar {
        tokens,
        pos: 0,
        depth: 0,
    };
    match grammar.output() {
        Ok(kind) => Ok(kind),
        Err(Stop::Syntax(token)) => Ok(OutputKind::ParseError {
            token: token.text.to_string(),
            position: token.position,
        }),
        Err(Stop::Fatal(e)) => Err(e),
    }
}

struct Grammar<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    /// 現在開いているタプルとリストの数
    depth: usize,
}

impl<'t, 'a> Grammar<'t, 'a> {
    /// 現在のトークン（末尾の `Eol` より先には進まない）
    fn peek(&self) -> Step<'a, Token<'a>> {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .copied()
            .ok_or(Stop::Syntax(Token {
                kind: TokenKind::Eol,
                text: "\n",
                position: Default::default(),
            }))
    }

    fn advance(&mut self) -> Step<'a, Token<'a>> {
        let token = self.peek()?;
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        Ok(token)
    }

    /// `kind` のトークンを1つ読む。違えばそのトークンで構文エラー
    fn expect(&mut self, kind: TokenKind) -> Step<'a, Token<'a>> {
        let token = self.peek()?;
        if token.kind != kind {
            return Err(Stop::Syntax(token));
        }
        self.advance()
    }

    fn output(&mut self) -> Step<'a, OutputKind> {
        let first = self.peek()?;
        let kind = match first.kind {
            TokenKind::OpenParen => self.prompt()?,
            TokenKind::Tilde | TokenKind::AtSign | TokenKind::Ampersand => {
                OutputKind::OutOfBand(OobRecord::Stream(self.stream_record()?))
            }
            TokenKind::Integer => {
                self.advance()?;
                self.record_after_token(Some(first.text.to_string()))?
            }
            _ => self.record_after_token(None)?,
        };
        self.expect(TokenKind::Eol)?;
        Ok(kind)
    }

    /// トークンを付けられるレコード（結果レコードと非同期レコード）
    fn record_after_token(&mut self, token: Option<String>) -> Step<'a, OutputKind> {
        let sigil = self.peek()?;
        let async_kind = match sigil.kind {
            TokenKind::Caret => return Ok(OutputKind::Result(self.result_record(token)?)),
            TokenKind::Star => AsyncKind::Exec,
            TokenKind::Plus => AsyncKind::Status,
            TokenKind::EqualSign => AsyncKind::Notify,
            _ => return Err(Stop::Syntax(sigil)),
        };
        self.advance()?;
        let class = self.expect(TokenKind::Identifier)?;
        let results = self.result_list()?;
        Ok(OutputKind::OutOfBand(OobRecord::Async(AsyncRecord {
            token,
            kind: async_kind,
            async_class: AsyncClass::from_text(class.text),
            results,
        })))
    }

    fn result_record(&mut self, token: Option<String>) -> Step<'a, ResultRecord> {
        self.expect(TokenKind::Caret)?;
        let class = self.expect(TokenKind::Identifier)?;
        let results = self.result_list()?;
        Ok(ResultRecord {
            token,
            result_class: ResultClass::from_text(class.text),
            results,
        })
    }

    fn stream_record(&mut self) -> Step<'a, StreamRecord> {
        let sigil = self.advance()?;
        let kind = match sigil.kind {
            TokenKind::Tilde => StreamKind::Console,
            TokenKind::AtSign => StreamKind::Target,
            TokenKind::Ampersand => StreamKind::Log,
            _ => return Err(Stop::Syntax(sigil)),
        };
        let text = self.expect(TokenKind::CString)?;
        Ok(StreamRecord {
            kind,
            text: unescape_cstring(text.text)?,
        })
    }

    fn prompt(&mut self) -> Step<'a, OutputKind> {
        self.expect(TokenKind::OpenParen)?;
        let name = self.expect(TokenKind::Identifier)?;
        if name.text != PROMPT_NAME {
            return Err(Stop::Syntax(name));
        }
        self.expect(TokenKind::ClosedParen)?;
        Ok(OutputKind::Prompt)
    }

    /// `("," result)*`
    fn result_list(&mut self) -> Step<'a, Vec<MiResult>> {
        let mut results = Vec::new();
        while self.peek()?.kind == TokenKind::Comma {
            self.advance()?;
            results.push(self.result()?);
        }
        Ok(results)
    }

    fn result(&mut self) -> Step<'a, MiResult> {
        let variable = if self.peek()?.kind == TokenKind::Identifier {
            let name = self.advance()?;
            self.expect(TokenKind::EqualSign)?;
            Some(name.text.to_string())
        } else {
            None
        };
        let value = self.value()?;
        Ok(MiResult { variable, value })
    }

    fn value(&mut self) -> Step<'a, MiValue> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::CString => {
                self.advance()?;
                Ok(MiValue::CString(unescape_cstring(token.text)?))
            }
            TokenKind::OpenBrace => Ok(MiValue::Tuple(self.nested(TokenKind::ClosedBrace)?)),
            TokenKind::OpenBracket => Ok(MiValue::List(self.nested(TokenKind::ClosedBracket)?)),
            _ => Err(Stop::Syntax(token)),
        }
    }

    /// 開き括弧を読み、`close` までの要素を読む
    fn nested(&mut self, close: TokenKind) -> Step<'a, Vec<MiResult>> {
        let open = self.advance()?;
        if self.depth >= MAX_DEPTH {
            return Err(Stop::Syntax(open));
        }
        self.depth += 1;
        let items = self.items(close)?;
        self.depth -= 1;
        Ok(items)
    }

    /// 開き括弧の後から `close` までの要素
    fn items(&mut self, close: TokenKind) -> Step<'a, Vec<MiResult>> {
        let mut items = Vec::new();
        if self.peek()?.kind == close {
            self.advance()?;
            return Ok(items);
        }
        loop {
            items.push(self.result()?);
            let next = self.advance()?;
            match next.kind {
                TokenKind::Comma => continue,
                kind if kind == close => return Ok(items),
                _ => return Err(Stop::Syntax(next)),
            }
        }
    }
}
