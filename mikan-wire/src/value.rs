//! MIのresult値（値ツリー）
//!
//! GDBは多くの情報を `name=value` の並びで返します。値はc-string、
//! `{...}` で囲まれたタプル、`[...]` で囲まれたリストのいずれかで、
//! 入れ子にできます。JSONのオブジェクトに近いものと考えてください。

use std::fmt;

/// 1つのresult（`name=value` または名前のない値）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiResult {
    /// 変数名
    ///
    /// タプルの要素は名前を持つべきですが、名前のない要素を出力するGDBも
    /// あるため許容します。リストの要素は名前を持たないことがあります。
    pub variable: Option<String>,
    /// 値
    pub value: MiValue,
}

/// resultの値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiValue {
    /// エスケープ解除済みのc-string
    CString(String),
    /// タプル `{...}`
    Tuple(Vec<MiResult>),
    /// リスト `[...]`
    List(Vec<MiResult>),
}

impl MiResult {
    /// 名前付きのresultを作成する
    pub fn named(variable: impl Into<String>, value: MiValue) -> Self {
        Self {
            variable: Some(variable.into()),
            value,
        }
    }

    /// 名前のないresultを作成する
    pub fn unnamed(value: MiValue) -> Self {
        Self {
            variable: None,
            value,
        }
    }

    /// 変数名が `name` か
    pub fn is_named(&self, name: &str) -> bool {
        self.variable.as_deref() == Some(name)
    }

    pub fn as_cstring(&self) -> Option<&str> {
        self.value.as_cstring()
    }

    pub fn as_tuple(&self) -> Option<&[MiResult]> {
        self.value.as_tuple()
    }

    pub fn as_list(&self) -> Option<&[MiResult]> {
        self.value.as_list()
    }
}

impl MiValue {
    /// 値の種類名（エラーメッセージ用）
    pub fn kind_name(&self) -> &'static str {
        match self {
            MiValue::CString(_) => "cstring",
            MiValue::Tuple(_) => "tuple",
            MiValue::List(_) => "list",
        }
    }

    pub fn as_cstring(&self) -> Option<&str> {
        match self {
            MiValue::CString(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[MiResult]> {
        match self {
            MiValue::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[MiResult]> {
        match self {
            MiValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// 名前が `name` の最初のresultを探す
pub fn find<'a>(results: &'a [MiResult], name: &str) -> Option<&'a MiResult> {
    results.iter().find(|r| r.is_named(name))
}

/// 名前が `name` の最初のc-stringを探す
///
/// 同名の値がc-string以外の場合は無視します。
pub fn find_cstring<'a>(results: &'a [MiResult], name: &str) -> Option<&'a str> {
    results
        .iter()
        .filter(|r| r.is_named(name))
        .find_map(MiResult::as_cstring)
}

/// MIの表記で書き戻す（ログやデバッグ表示用）
impl fmt::Display for MiResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(variable) = &self.variable {
            write!(f, "{}=", variable)?;
        }
        write!(f, "{}", self.value)
    }
}

impl fmt::Display for MiValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MiValue::CString(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\r' => write!(f, "\\r")?,
                        '\t' => write!(f, "\\t")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "\"")
            }
            MiValue::Tuple(items) => {
                write!(f, "{{")?;
                write_items(f, items)?;
                write!(f, "}}")
            }
            MiValue::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
        }
    }
}

fn write_items(f: &mut fmt::Formatter, items: &[MiResult]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
