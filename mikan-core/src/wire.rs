//! MI出力ストリームの窓口
//!
//! `Wire` は受け取ったバイト列を `MiParser` に渡し、完成したレコードを
//! 1つずつ `WireHandler` の対応するメソッドに渡します。

use crate::command::{extract, CommandKind, MiCommand};
use crate::errors::Error;
use crate::Result;
use mikan_wire::{
    AsyncRecord, MiParser, OobRecord, Output, OutputKind, Position, ResultRecord, StreamKind,
};
use std::fmt;
use tracing::debug;

/// レコードの受け取り手
///
/// 全てのメソッドは何もしない既定の実装を持つので、
/// 必要なイベントのメソッドだけを実装します。
pub trait WireHandler {
    /// ストリームレコード（エスケープ解除済みのテキスト）
    fn on_stream(&mut self, kind: StreamKind, text: String) {
        let _ = (kind, text);
    }

    /// 非同期レコード
    fn on_async(&mut self, record: AsyncRecord) {
        let _ = record;
    }

    /// 結果レコード
    fn on_result(&mut self, record: ResultRecord) {
        let _ = record;
    }

    /// プロンプト。`line` は受け取った行そのもの
    fn on_prompt(&mut self, line: String) {
        let _ = line;
    }

    /// 解析できなかった行
    fn on_parse_error(&mut self, line: String, token: String, position: Position) {
        let _ = (line, token, position);
    }
}

/// `Wire` の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireState {
    /// 保持している行がない
    Idle,
    /// 終端の揃っていない行を保持している
    Buffering,
}

/// ハンドラに渡されたイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEvent {
    Stream { kind: StreamKind, text: String },
    Async(AsyncRecord),
    Result(ResultRecord),
    Prompt(String),
    ParseError {
        line: String,
        token: String,
        position: Position,
    },
}

/// イベントを順に記録するハンドラ
impl WireHandler for Vec<WireEvent> {
    fn on_stream(&mut self, kind: StreamKind, text: String) {
        self.push(WireEvent::Stream { kind, text });
    }

    fn on_async(&mut self, record: AsyncRecord) {
        self.push(WireEvent::Async(record));
    }

    fn on_result(&mut self, record: ResultRecord) {
        self.push(WireEvent::Result(record));
    }

    fn on_prompt(&mut self, line: String) {
        self.push(WireEvent::Prompt(line));
    }

    fn on_parse_error(&mut self, line: String, token: String, position: Position) {
        self.push(WireEvent::ParseError {
            line,
            token,
            position,
        });
    }
}

/// MI出力ストリームの窓口
///
/// # Examples
/// ```
/// use mikan_core::{Wire, WireEvent, WireState};
///
/// let mut wire = Wire::new(Vec::<WireEvent>::new());
/// wire.push_str("~\"hello\\n\"\n(gd").unwrap();
/// assert_eq!(wire.state(), WireState::Buffering);
/// wire.push_str("b)\n").unwrap();
/// assert_eq!(wire.handler().len(), 2);
/// ```
#[derive(Debug)]
pub struct Wire<H: WireHandler> {
    /// 行単位のパーサー
    parser: MiParser,
    /// レコードの受け取り手
    handler: H,
}

impl<H: WireHandler> Wire<H> {
    /// 新しい窓口を作成する
    pub fn new(handler: H) -> Self {
        Self {
            parser: MiParser::new(),
            handler,
        }
    }

    /// 受け取ったバイト列を処理する
    ///
    /// 完成した行ごとにハンドラのメソッドを1回ずつ、行の順に呼び出します。
    pub fn push(&mut self, data: &[u8]) -> Result<()> {
        for output in self.parser.push(data)? {
            self.dispatch(output);
        }
        Ok(())
    }

    pub fn push_str(&mut self, text: &str) -> Result<()> {
        self.push(text.as_bytes())
    }

    /// ストリームの終わりで、終端のない残りを最後の行として処理する
    pub fn flush(&mut self) -> Result<()> {
        if let Some(output) = self.parser.flush()? {
            self.dispatch(output);
        }
        Ok(())
    }

    pub fn state(&self) -> WireState {
        if self.parser.is_buffering() {
            WireState::Buffering
        } else {
            WireState::Idle
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    fn dispatch(&mut self, output: Output) {
        let Output { kind, line } = output;
        match kind {
            OutputKind::OutOfBand(OobRecord::Stream(stream)) => {
                debug!("dispatching {:?} stream record", stream.kind);
                self.handler.on_stream(stream.kind, stream.text);
            }
            OutputKind::OutOfBand(OobRecord::Async(record)) => {
                debug!("dispatching {} async record", record.async_class);
                self.handler.on_async(record);
            }
            OutputKind::Result(record) => {
                debug!("dispatching ^{} result record", record.result_class);
                self.handler.on_result(record);
            }
            OutputKind::Prompt => {
                debug!("dispatching prompt");
                self.handler.on_prompt(line);
            }
            OutputKind::ParseError { token, position } => {
                debug!("dispatching parse error");
                self.handler.on_parse_error(line, token, position);
            }
        }
    }
}

/// 1つのコマンドに対するGDBの出力をまとめて解釈する
///
/// `output_text` はちょうど1つの結果レコードだけを含んでいる必要があります。
/// ストリームや非同期レコード、プロンプト、解析できない行が混ざっていれば
/// `Error::Usage` を返します。
///
/// # Examples
/// ```
/// use mikan_core::{interpret, CommandKind, MiCommand};
///
/// let command = interpret(
///     "^done,line=\"4\",file=\"hello.c\"\n",
///     CommandKind::FileListExecSourceFile,
/// )
/// .unwrap();
/// assert!(matches!(command, MiCommand::FileListExecSourceFile(_)));
/// ```
pub fn interpret(output_text: &str, kind: CommandKind) -> Result<MiCommand> {
    let mut parser = MiParser::new();
    let mut outputs = parser.push_str(output_text)?;
    outputs.extend(parser.flush()?);

    let count = outputs.len();
    let mut outputs = outputs.into_iter();
    let record = match (outputs.next(), count) {
        (None, _) => return Err(Error::usage("no output to interpret")),
        (Some(Output {
            kind: OutputKind::Result(record),
            ..
        }), 1) => record,
        (Some(output), 1) => {
            return Err(Error::usage(format!(
                "expected a result record, got {}",
                describe(&output.kind)
            )))
        }
        (Some(_), n) => {
            return Err(Error::usage(format!(
                "expected a single result record, got {} records",
                n
            )))
        }
    };

    extract(kind, &record)
}

/// エラーメッセージ用のレコードの種類名
fn describe(kind: &OutputKind) -> &'static str {
    match kind {
        OutputKind::OutOfBand(OobRecord::Stream(_)) => "a stream record",
        OutputKind::OutOfBand(OobRecord::Async(_)) => "an async record",
        OutputKind::Result(_) => "a result record",
        OutputKind::Prompt => "a prompt",
        OutputKind::ParseError { .. } => "an unparsable line",
    }
}

impl fmt::Display for WireEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WireEvent::Stream { kind, text } => write!(f, "stream {} {:?}", kind.sigil(), text),
            WireEvent::Async(record) => {
                write!(f, "async {}", record.kind.sigil())?;
                if let Some(token) = &record.token {
                    write!(f, " token={}", token)?;
                }
                write!(f, " {}", record.async_class)?;
                for result in &record.results {
                    write!(f, " {}", result)?;
                }
                Ok(())
            }
            WireEvent::Result(record) => {
                write!(f, "result")?;
                if let Some(token) = &record.token {
                    write!(f, " token={}", token)?;
                }
                write!(f, " ^{}", record.result_class)?;
                for result in &record.results {
                    write!(f, " {}", result)?;
                }
                Ok(())
            }
            WireEvent::Prompt(line) => write!(f, "prompt {:?}", line),
            WireEvent::ParseError {
                line,
                token,
                position,
            } => write!(
                f,
                "parse-error {}-{} {:?} in {:?}",
                position.start_column, position.end_column, token, line
            ),
        }
    }
}
