//! MI出力1行の字句解析
//!
//! 固定の文字クラス表と、明示的な状態・遷移関数で動く字句解析器です。
//! 認識できない文字も `TokenKind::Unknown` として必ず出力し、
//! 文法側が正確な位置で構文エラーを報告できるようにします。

use crate::output::Position;

/// 行末トークンのテキスト（行は終端文字を除いて渡されるため合成する）
const EOL_TEXT: &str = "\n";

/// トークンの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `{`
    OpenBrace,
    /// `}`
    ClosedBrace,
    /// `(`
    OpenParen,
    /// `)`
    ClosedParen,
    /// `[`
    OpenBracket,
    /// `]`
    ClosedBracket,
    /// `,`
    Comma,
    /// `=`
    EqualSign,
    /// `~`
    Tilde,
    /// `@`
    AtSign,
    /// `&`
    Ampersand,
    /// `^`
    Caret,
    /// `+`
    Plus,
    /// `*`
    Star,
    /// 整数 `[0-9]+`
    Integer,
    /// 識別子 `[A-Za-z_-][A-Za-z0-9_.-]*`（クラス名や変数名）
    Identifier,
    /// エスケープ付きのc-string（前後の `"` を含む）
    CString,
    /// 行末
    Eol,
    /// 認識できない文字
    Unknown,
}

/// トークン
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// 行から切り出したテキスト
    pub text: &'a str,
    pub position: Position,
}

/// 文字クラス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    /// 1文字で完結する記号
    Symbol(TokenKind),
    Digit,
    /// 識別子の先頭にも使える文字
    IdentStart,
    /// 識別子の2文字目以降にだけ使える文字 (`.`)
    IdentRest,
    /// トークンの区切りとして読み飛ばす空白
    Blank,
    Quote,
    Backslash,
    Other,
}

/// ASCIIの文字クラス表
static CHAR_CLASSES: [CharClass; 128] = build_char_classes();

const fn build_char_classes() -> [CharClass; 128] {
    let mut table = [CharClass::Other; 128];
    let mut b = 0;
    while b < 128 {
        table[b] = match b as u8 {
            b'{' => CharClass::Symbol(TokenKind::OpenBrace),
            b'}' => CharClass::Symbol(TokenKind::ClosedBrace),
            b'(' => CharClass::Symbol(TokenKind::OpenParen),
            b')' => CharClass::Symbol(TokenKind::ClosedParen),
            b'[' => CharClass::Symbol(TokenKind::OpenBracket),
            b']' => CharClass::Symbol(TokenKind::ClosedBracket),
            b',' => CharClass::Symbol(TokenKind::Comma),
            b'=' => CharClass::Symbol(TokenKind::EqualSign),
            b'~' => CharClass::Symbol(TokenKind::Tilde),
            b'@' => CharClass::Symbol(TokenKind::AtSign),
            b'&' => CharClass::Symbol(TokenKind::Ampersand),
            b'^' => CharClass::Symbol(TokenKind::Caret),
            b'+' => CharClass::Symbol(TokenKind::Plus),
            b'*' => CharClass::Symbol(TokenKind::Star),
            b'0'..=b'9' => CharClass::Digit,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'-' => CharClass::IdentStart,
            b'.' => CharClass::IdentRest,
            b' ' | b'\t' | 0x0b | 0x0c => CharClass::Blank,
            b'"' => CharClass::Quote,
            b'\\' => CharClass::Backslash,
            _ => CharClass::Other,
        };
        b += 1;
    }
    table
}

fn classify(byte: u8) -> CharClass {
    CHAR_CLASSES
        .get(byte as usize)
        .copied()
        .unwrap_or(CharClass::Other)
}

/// 字句解析器の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Integer,
    Identifier,
    CString,
    /// c-string内で `\` を読んだ直後
    CStringEscape,
}

/// 1文字読んだときの動作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// 文字を消費して次の状態へ
    Continue(State),
    /// 空白を読み飛ばす
    Skip,
    /// トークンを確定する。`consume` なら現在の文字もトークンに含める
    Emit { kind: TokenKind, consume: bool },
    /// 閉じられていないc-string。開き引用符だけを不明な文字として確定する
    Backtrack,
    /// 行末
    End,
}

/// 状態遷移関数。`class` が `None` なら行末
fn transition(state: State, class: Option<CharClass>) -> Step {
    use CharClass as C;
    match (state, class) {
        (State::Start, None) => Step::End,
        (State::Start, Some(C::Blank)) => Step::Skip,
        (State::Start, Some(C::Symbol(kind))) => Step::Emit {
            kind,
            consume: true,
        },
        (State::Start, Some(C::Digit)) => Step::Continue(State::Integer),
        (State::Start, Some(C::IdentStart)) => Step::Continue(State::Identifier),
        (State::Start, Some(C::Quote)) => Step::Continue(State::CString),
        (State::Start, Some(_)) => Step::Emit {
            kind: TokenKind::Unknown,
            consume: true,
        },

        (State::Integer, Some(C::Digit)) => Step::Continue(State::Integer),
        (State::Integer, _) => Step::Emit {
            kind: TokenKind::Integer,
            consume: false,
        },

        (State::Identifier, Some(C::IdentStart | C::IdentRest | C::Digit)) => {
            Step::Continue(State::Identifier)
        }
        (State::Identifier, _) => Step::Emit {
            kind: TokenKind::Identifier,
            consume: false,
        },

        (State::CString, Some(C::Quote)) => Step::Emit {
            kind: TokenKind::CString,
            consume: true,
        },
        (State::CString, Some(C::Backslash)) => Step::Continue(State::CStringEscape),
        (State::CString, Some(_)) => Step::Continue(State::CString),
        (State::CString | State::CStringEscape, None) => Step::Backtrack,
        (State::CStringEscape, Some(_)) => Step::Continue(State::CString),
    }
}

/// 1行分の字句解析器
///
/// イテレータとしてトークンを返し、最後に必ず `TokenKind::Eol` を1つ返します。
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    line: &'a str,
    pos: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// 終端文字を除いた1行から字句解析器を作成する
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            pos: 0,
            finished: false,
        }
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token<'a> {
        Token {
            kind,
            text: &self.line[start..end],
            position: Position {
                start_column: start + 1,
                end_column: end,
            },
        }
    }

    /// `at` から始まる文字のバイト長
    fn char_len_at(&self, at: usize) -> usize {
        self.line[at..].chars().next().map_or(1, char::len_utf8)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }

        let bytes = self.line.as_bytes();
        let mut state = State::Start;
        let mut start = self.pos;
        let mut i = self.pos;

        loop {
            let class = bytes.get(i).map(|&b| classify(b));
            match transition(state, class) {
                Step::Continue(next) => {
                    state = next;
                    i += 1;
                }
                Step::Skip => {
                    i += 1;
                    start = i;
                }
                Step::Emit { kind, consume } => {
                    let end = if !consume {
                        i
                    } else if kind == TokenKind::Unknown {
                        // 非ASCII文字は文字単位で切り出す
                        i + self.char_len_at(i)
                    } else {
                        i + 1
                    };
                    self.pos = end;
                    return Some(self.token(kind, start, end));
                }
                Step::Backtrack => {
                    self.pos = start + 1;
                    return Some(self.token(TokenKind::Unknown, start, start + 1));
                }
                Step::End => {
                    self.finished = true;
                    let column = self.line.len() + 1;
                    return Some(Token {
                        kind: TokenKind::Eol,
                        text: EOL_TEXT,
                        position: Position {
                            start_column: column,
                            end_column: column,
                        },
                    });
                }
            }
        }
    }
}

/// 1行をトークン列に分解する
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    Lexer::new(line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(start_column: usize, end_column: usize) -> Position {
        Position {
            start_column,
            end_column,
        }
    }

    fn kinds(line: &str) -> Vec<TokenKind> {
        tokenize(line).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_result_record_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"12^done,value="1""#),
            vec![Integer, Caret, Identifier, Comma, Identifier, EqualSign, CString, Eol]
        );
    }

    #[test]
    fn test_columns() {
        let tokens = tokenize(r#"^done,msg="hi""#);
        assert_eq!(tokens[0].position, pos(1, 1));
        assert_eq!(tokens[1].text, "done");
        assert_eq!(tokens[1].position, pos(2, 5));
        assert_eq!(tokens[5].text, r#""hi""#);
        assert_eq!(tokens[5].position, pos(11, 14));
        let eol = tokens.last().unwrap();
        assert_eq!(eol.kind, TokenKind::Eol);
        assert_eq!(eol.position, pos(15, 15));
    }

    #[test]
    fn test_prompt_with_trailing_blank() {
        use TokenKind::*;
        assert_eq!(kinds("(gdb) "), vec![OpenParen, Identifier, ClosedParen, Eol]);
    }

    #[test]
    fn test_escaped_quote_stays_in_cstring() {
        let tokens = tokenize(r#"~"say \"hi\"\n""#);
        assert_eq!(tokens[1].kind, TokenKind::CString);
        assert_eq!(tokens[1].text, r#""say \"hi\"\n""#);
        assert_eq!(tokens[2].kind, TokenKind::Eol);
    }

    #[test]
    fn test_unknown_characters_are_reported() {
        let tokens = tokenize("^done;");
        assert_eq!(tokens[2].kind, TokenKind::Unknown);
        assert_eq!(tokens[2].text, ";");
        assert_eq!(tokens[2].position, pos(6, 6));

        let tokens = tokenize("é");
        assert_eq!(tokens[0].kind, TokenKind::Unknown);
        assert_eq!(tokens[0].text, "é");
        assert_eq!(tokens[0].position, pos(1, 2));
    }

    #[test]
    fn test_unterminated_cstring_backtracks() {
        use TokenKind::*;
        let tokens = tokenize(r#"~"abc"#);
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![Tilde, Unknown, Identifier, Eol]
        );
        assert_eq!(tokens[1].text, "\"");
        assert_eq!(tokens[1].position, pos(2, 2));
    }

    #[test]
    fn test_empty_line_is_only_eol() {
        assert_eq!(kinds(""), vec![TokenKind::Eol]);
    }

    #[test]
    fn test_identifier_with_dash_and_digits() {
        let tokens = tokenize("=thread-group-added,id=\"i1\"");
        assert_eq!(tokens[1].text, "thread-group-added");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }
}
