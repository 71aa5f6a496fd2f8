//! ブレークポイント情報
//!
//! `-break-info` の結果から、ブレークポイントの一覧を組み立てます。

use crate::errors::Error;
use crate::parse::{cstring_value, parse_address, parse_unsigned};
use crate::Result;
use mikan_wire::{MiResult, ResultRecord};
use tracing::debug;

/// 複数箇所のブレークポイントの `addr`
const ADDR_MULTIPLE: &str = "<MULTIPLE>";
/// 保留中のブレークポイントの `addr`
const ADDR_PENDING: &str = "<PENDING>";

/// ブレークポイントに到達したあとの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// `del` 到達したら削除（tbreak）
    Delete,
    /// `dstp` 次に停止したら削除
    DeleteNextStop,
    /// `dis` 到達したら無効化
    Disable,
    /// `keep` そのまま残す
    Keep,
    /// `disp` が出力されなかった
    #[default]
    Unknown,
}

impl Disposition {
    fn from_text(text: &str) -> Result<Self> {
        match text {
            "del" => Ok(Disposition::Delete),
            "dstp" => Ok(Disposition::DeleteNextStop),
            "dis" => Ok(Disposition::Disable),
            "keep" => Ok(Disposition::Keep),
            _ => Err(Error::schema(format!("unknown breakpoint disposition '{}'", text))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Delete => "del",
            Disposition::DeleteNextStop => "dstp",
            Disposition::Disable => "dis",
            Disposition::Keep => "keep",
            Disposition::Unknown => "unknown",
        }
    }
}

/// ブレークポイントのアドレス
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointAddress {
    /// 具体的なアドレス（GDBが出力したテキストのまま）
    Address(String),
    /// `<PENDING>` 共有ライブラリの読み込み待ち
    Pending,
    /// `<MULTIPLE>` 複数の箇所に設定されている
    Multiple,
}

impl BreakpointAddress {
    fn from_text(text: &str) -> Self {
        match text {
            ADDR_MULTIPLE => BreakpointAddress::Multiple,
            ADDR_PENDING => BreakpointAddress::Pending,
            _ => BreakpointAddress::Address(text.to_string()),
        }
    }

    /// アドレスの数値（16進数として読めた場合）
    pub fn value(&self) -> Option<u64> {
        match self {
            BreakpointAddress::Address(text) => parse_address(text),
            _ => None,
        }
    }
}

/// ブレークポイント
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Breakpoint {
    /// 番号。複数箇所のブレークポイントの各箇所は "1.2" のような形式
    pub number: String,
    /// `addr` が `<MULTIPLE>` だった
    pub multi: bool,
    /// 複数箇所のブレークポイントの1箇所（番号に `.` を含む）
    pub from_multi: bool,
    /// 種類 (`breakpoint`, `watchpoint`, `catchpoint` など)
    pub kind: Option<String>,
    /// キャッチポイントの種類
    pub catch_type: Option<String>,
    pub disposition: Disposition,
    pub enabled: bool,
    pub address: Option<BreakpointAddress>,
    /// `addr` が `<PENDING>` だった
    pub pending: bool,
    pub func_name: Option<String>,
    pub file: Option<String>,
    pub fullname: Option<String>,
    /// 行番号（不明なら0）
    pub line: u64,
    /// 到達した回数
    pub times: u64,
    /// ユーザーが指定した位置
    pub original_location: Option<String>,
    /// 各箇所のブレークポイント（出力された順）
    pub multi_breakpoints: Vec<Breakpoint>,
    /// 親のブレークポイントの番号（各箇所の場合のみ）
    pub multi_breakpoint: Option<String>,
}

impl Breakpoint {
    /// `number` のうち `.` より前の部分
    fn parent_number(&self) -> Option<&str> {
        self.number.split_once('.').map(|(parent, _)| parent)
    }

    /// 各箇所のブレークポイントを子として追加する
    fn attach_location(&mut self, mut child: Breakpoint) -> Result<()> {
        if child.parent_number() != Some(self.number.as_str()) {
            return Err(Error::schema(format!(
                "breakpoint location {} does not belong to breakpoint {}",
                child.number, self.number
            )));
        }
        child.multi_breakpoint = Some(self.number.clone());
        self.multi_breakpoints.push(child);
        Ok(())
    }

    /// タプルのフィールドから1つのブレークポイントを読む
    fn from_fields(fields: &[MiResult]) -> Result<Self> {
        let mut bkpt = Breakpoint::default();
        let mut number = None;

        for field in fields {
            let Some(name) = field.variable.as_deref() else {
                continue;
            };
            let value = move || cstring_value(name, field);
            match name {
                "number" => number = Some(value()?.to_string()),
                "enabled" => bkpt.enabled = value()?.starts_with('y'),
                "addr" => {
                    let value = value()?;
                    bkpt.multi = value == ADDR_MULTIPLE;
                    bkpt.pending = value == ADDR_PENDING;
                    bkpt.address = Some(BreakpointAddress::from_text(value));
                }
                "catch-type" => bkpt.catch_type = Some(value()?.to_string()),
                "type" => bkpt.kind = Some(value()?.to_string()),
                "disp" => bkpt.disposition = Disposition::from_text(value()?)?,
                "func" => bkpt.func_name = Some(value()?.to_string()),
                "file" => bkpt.file = Some(value()?.to_string()),
                "fullname" => bkpt.fullname = Some(value()?.to_string()),
                "line" => bkpt.line = parse_unsigned(name, value()?)?,
                "times" => bkpt.times = parse_unsigned(name, value()?)?,
                "original-location" => bkpt.original_location = Some(value()?.to_string()),
                _ => {}
            }
        }

        bkpt.number = number.ok_or_else(|| Error::schema("breakpoint without 'number'"))?;
        bkpt.from_multi = bkpt.number.contains('.');

        // 新しいGDBは各箇所を `locations` に入れ子で出力する
        if let Some(locations) = mikan_wire::value::find(fields, "locations") {
            let entries = locations.as_list().ok_or_else(|| {
                Error::schema(format!(
                    "'locations' of breakpoint {} is a {}, expected list",
                    bkpt.number,
                    locations.value.kind_name()
                ))
            })?;
            for entry in entries {
                let location = Breakpoint::from_fields(entry_tuple(entry)?)?;
                bkpt.attach_location(location)?;
            }
        }

        Ok(bkpt)
    }
}

/// `body` の要素をタプルとして取り出す
fn entry_tuple(entry: &MiResult) -> Result<&[MiResult]> {
    entry.as_tuple().ok_or_else(|| {
        Error::schema(format!(
            "breakpoint entry is a {}, expected tuple",
            entry.value.kind_name()
        ))
    })
}

/// `-break-info` の結果からブレークポイントの一覧を組み立てる
///
/// ```text
/// ^done,BreakpointTable={nr_rows="1",nr_cols="6",hdr=[...],body=[bkpt={...},{...}]}
/// ```
pub fn break_info(record: &ResultRecord) -> Result<Vec<Breakpoint>> {
    let table = match record.results.as_slice() {
        [table] if table.is_named("BreakpointTable") => table,
        _ => return Err(Error::schema("expected a single 'BreakpointTable' result")),
    };
    let table = table
        .as_tuple()
        .filter(|fields| !fields.is_empty())
        .ok_or_else(|| Error::schema("'BreakpointTable' is not a non-empty tuple"))?;

    let (body_index, body) = table
        .iter()
        .enumerate()
        .find_map(|(i, r)| r.as_list().filter(|_| r.is_named("body")).map(|list| (i, list)))
        .ok_or_else(|| Error::schema("'BreakpointTable' has no 'body' list"))?;
    if body_index + 1 != table.len() {
        return Err(Error::schema("'body' is not the last field of 'BreakpointTable'"));
    }

    let mut breakpoints: Vec<Breakpoint> = Vec::new();
    for entry in body {
        let fields = entry_tuple(entry)?;
        // GDBは2つ目以降の `bkpt=` を省略することがある
        if let Some(variable) = entry.variable.as_deref() {
            if variable != "bkpt" {
                return Err(Error::schema(format!(
                    "unexpected breakpoint entry '{}'",
                    variable
                )));
            }
        }

        let bkpt = Breakpoint::from_fields(fields)?;
        if bkpt.from_multi {
            let parent = breakpoints.last_mut().ok_or_else(|| {
                Error::schema(format!(
                    "breakpoint location {} appears before its breakpoint",
                    bkpt.number
                ))
            })?;
            parent.attach_location(bkpt)?;
        } else {
            breakpoints.push(bkpt);
        }
    }

    debug!("extracted {} breakpoints", breakpoints.len());
    Ok(breakpoints)
}
