//! スタックフレーム情報

use crate::errors::Error;
use crate::parse::{cstring_value, parse_address, parse_unsigned};
use crate::Result;
use mikan_wire::ResultRecord;

/// アドレスを取得できないフレームの `addr`
const ADDR_UNAVAILABLE: &str = "<unavailable>";

/// スタックフレーム
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackFrame {
    /// フレームの深さ（0が最も内側）
    pub level: u64,
    /// 実行位置のアドレス（取得できなければ `None`）
    pub address: Option<String>,
    pub func: Option<String>,
    pub file: Option<String>,
    pub fullname: Option<String>,
    /// 行番号（不明なら0）
    pub line: u64,
    /// 関数を含む共有オブジェクト
    pub from: Option<String>,
}

impl StackFrame {
    /// 実行位置のアドレスの数値
    pub fn pc(&self) -> Option<u64> {
        self.address.as_deref().and_then(parse_address)
    }
}

/// `-stack-info-frame` の結果からフレームを取り出す
///
/// ```text
/// ^done,frame={level="0",addr="0x0000555555555139",func="main",file="hello.c",line="4"}
/// ```
pub fn stack_info_frame(record: &ResultRecord) -> Result<StackFrame> {
    let fields = match record.results.as_slice() {
        [frame] if frame.is_named("frame") => frame
            .as_tuple()
            .filter(|fields| !fields.is_empty())
            .ok_or_else(|| Error::schema("'frame' is not a non-empty tuple"))?,
        _ => return Err(Error::schema("expected a single 'frame' result")),
    };

    let mut frame = StackFrame::default();
    let mut level = None;
    let mut address = None;
    let mut line = None;

    for field in fields {
        let Some(name) = field.variable.as_deref() else {
            continue;
        };
        let value = move || cstring_value(name, field);
        match name {
            "level" => level = Some(value()?),
            "addr" => address = Some(value()?),
            "func" => frame.func = Some(value()?.to_string()),
            "file" => frame.file = Some(value()?.to_string()),
            "fullname" => frame.fullname = Some(value()?.to_string()),
            "line" => line = Some(value()?),
            "from" => frame.from = Some(value()?.to_string()),
            _ => {}
        }
    }

    let level = level.ok_or_else(|| Error::schema("frame without 'level'"))?;
    let address = address.ok_or_else(|| Error::schema("frame without 'addr'"))?;

    frame.level = parse_unsigned("level", level)?;
    frame.address = (address != ADDR_UNAVAILABLE).then(|| address.to_string());
    frame.line = line.map(|l| parse_unsigned("line", l)).transpose()?.unwrap_or(0);
    Ok(frame)
}
