//! MIの出力レコード
//!
//! GDBの出力1行から1つの `Output` が作られます。

use crate::value::MiResult;
use std::fmt;

/// 行内のトークン位置（1始まり、両端を含むバイト単位の桁）
///
/// 1バイトのトークンでは `start_column == end_column` になります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub start_column: usize,
    pub end_column: usize,
}

/// MIの出力1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// 出力の種類と内容
    pub kind: OutputKind,
    /// このレコードの元になった行（終端文字を除く）
    ///
    /// 構文エラーの場合も含め、常に保持されます。
    pub line: String,
}

/// 出力の種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputKind {
    /// 帯域外レコード（特定の入力コマンドに結び付かない出力）
    OutOfBand(OobRecord),
    /// 結果レコード（入力コマンドへの応答）
    Result(ResultRecord),
    /// プロンプト `(gdb)`
    Prompt,
    /// 構文エラー
    ParseError {
        /// エラーの起きたトークン
        token: String,
        /// トークンの位置
        position: Position,
    },
}

/// 帯域外レコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OobRecord {
    Async(AsyncRecord),
    Stream(StreamRecord),
}

/// 結果レコード `<token>^<class>,<results>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// 入力コマンドに付けた数字のトークン（付けていなければ `None`）
    pub token: Option<String>,
    pub result_class: ResultClass,
    /// resultの並び（なければ空）
    pub results: Vec<MiResult>,
}

/// 非同期レコード `*stopped,...` / `+download,...` / `=thread-created,...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncRecord {
    /// トークン
    ///
    /// 文法上は許されていますが、GDB 7.0以降は出力しません。
    /// 古いGDBの出力を正しく表現するために解析だけは行います。
    pub token: Option<String>,
    pub kind: AsyncKind,
    pub async_class: AsyncClass,
    pub results: Vec<MiResult>,
}

/// ストリームレコード `~"..."` / `@"..."` / `&"..."`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRecord {
    pub kind: StreamKind,
    /// エスケープ解除済みのテキスト
    pub text: String,
}

/// 結果レコードのクラス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultClass {
    /// `^done`
    Done,
    /// `^running`（`^done` と同等。ターゲットの状態判定には `*running` を使う）
    Running,
    /// `^connected`（`-target-select` の応答。`^done` と同等）
    Connected,
    /// `^error`
    Error,
    /// `^exit`
    Exit,
    /// 未知のクラス
    Unsupported,
}

/// 非同期レコードの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsyncKind {
    /// `+` 時間のかかる処理の進捗
    Status,
    /// `*` ターゲットの状態変化
    Exec,
    /// `=` 補足情報の通知
    Notify,
}

/// ストリームレコードの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// `~` コンソール出力
    Console,
    /// `@` ターゲットプログラムの出力
    Target,
    /// `&` GDB内部のログ出力
    Log,
}

/// 非同期レコードのクラス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsyncClass {
    Download,
    Stopped,
    Running,
    ThreadGroupAdded,
    ThreadGroupRemoved,
    ThreadGroupStarted,
    ThreadGroupExited,
    ThreadCreated,
    ThreadExited,
    ThreadSelected,
    LibraryLoaded,
    LibraryUnloaded,
    TraceframeChanged,
    TsvCreated,
    TsvModified,
    TsvDeleted,
    BreakpointCreated,
    BreakpointModified,
    BreakpointDeleted,
    RecordStarted,
    RecordStopped,
    CmdParamChanged,
    MemoryChanged,
    /// 未知のクラス
    Unsupported,
}

impl ResultClass {
    /// 出力中のテキストから分類する。未知のテキストは `Unsupported`
    pub fn from_text(text: &str) -> Self {
        match text {
            "done" => ResultClass::Done,
            "running" => ResultClass::Running,
            "connected" => ResultClass::Connected,
            "error" => ResultClass::Error,
            "exit" => ResultClass::Exit,
            _ => ResultClass::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultClass::Done => "done",
            ResultClass::Running => "running",
            ResultClass::Connected => "connected",
            ResultClass::Error => "error",
            ResultClass::Exit => "exit",
            ResultClass::Unsupported => "unsupported",
        }
    }
}

impl AsyncClass {
    /// 出力中のテキストから分類する。未知のテキストは `Unsupported`
    pub fn from_text(text: &str) -> Self {
        match text {
            "download" => AsyncClass::Download,
            "stopped" => AsyncClass::Stopped,
            "running" => AsyncClass::Running,
            "thread-group-added" => AsyncClass::ThreadGroupAdded,
            "thread-group-removed" => AsyncClass::ThreadGroupRemoved,
            "thread-group-started" => AsyncClass::ThreadGroupStarted,
            "thread-group-exited" => AsyncClass::ThreadGroupExited,
            "thread-created" => AsyncClass::ThreadCreated,
            "thread-exited" => AsyncClass::ThreadExited,
            "thread-selected" => AsyncClass::ThreadSelected,
            "library-loaded" => AsyncClass::LibraryLoaded,
            "library-unloaded" => AsyncClass::LibraryUnloaded,
            "traceframe-changed" => AsyncClass::TraceframeChanged,
            "tsv-created" => AsyncClass::TsvCreated,
            "tsv-modified" => AsyncClass::TsvModified,
            "tsv-deleted" => AsyncClass::TsvDeleted,
            "breakpoint-created" => AsyncClass::BreakpointCreated,
            "breakpoint-modified" => AsyncClass::BreakpointModified,
            "breakpoint-deleted" => AsyncClass::BreakpointDeleted,
            "record-started" => AsyncClass::RecordStarted,
            "record-stopped" => AsyncClass::RecordStopped,
            "cmd-param-changed" => AsyncClass::CmdParamChanged,
            "memory-changed" => AsyncClass::MemoryChanged,
            _ => AsyncClass::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AsyncClass::Download => "download",
            AsyncClass::Stopped => "stopped",
            AsyncClass::Running => "running",
            AsyncClass::ThreadGroupAdded => "thread-group-added",
            AsyncClass::ThreadGroupRemoved => "thread-group-removed",
            AsyncClass::ThreadGroupStarted => "thread-group-started",
            AsyncClass::ThreadGroupExited => "thread-group-exited",
            AsyncClass::ThreadCreated => "thread-created",
            AsyncClass::ThreadExited => "thread-exited",
            AsyncClass::ThreadSelected => "thread-selected",
            AsyncClass::LibraryLoaded => "library-loaded",
            AsyncClass::LibraryUnloaded => "library-unloaded",
            AsyncClass::TraceframeChanged => "traceframe-changed",
            AsyncClass::TsvCreated => "tsv-created",
            AsyncClass::TsvModified => "tsv-modified",
            AsyncClass::TsvDeleted => "tsv-deleted",
            AsyncClass::BreakpointCreated => "breakpoint-created",
            AsyncClass::BreakpointModified => "breakpoint-modified",
            AsyncClass::BreakpointDeleted => "breakpoint-deleted",
            AsyncClass::RecordStarted => "record-started",
            AsyncClass::RecordStopped => "record-stopped",
            AsyncClass::CmdParamChanged => "cmd-param-changed",
            AsyncClass::MemoryChanged => "memory-changed",
            AsyncClass::Unsupported => "unsupported",
        }
    }
}

impl AsyncKind {
    /// 行頭の記号
    pub fn sigil(&self) -> char {
        match self {
            AsyncKind::Status => '+',
            AsyncKind::Exec => '*',
            AsyncKind::Notify => '=',
        }
    }
}

impl StreamKind {
    /// 行頭の記号
    pub fn sigil(&self) -> char {
        match self {
            StreamKind::Console => '~',
            StreamKind::Target => '@',
            StreamKind::Log => '&',
        }
    }
}

impl fmt::Display for ResultClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AsyncClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Output {
    /// 結果レコードなら取り出す
    pub fn as_result(&self) -> Option<&ResultRecord> {
        match &self.kind {
            OutputKind::Result(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self.kind, OutputKind::ParseError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_class_from_text() {
        assert_eq!(ResultClass::from_text("done"), ResultClass::Done);
        assert_eq!(ResultClass::from_text("connected"), ResultClass::Connected);
        assert_eq!(ResultClass::from_text("finished"), ResultClass::Unsupported);
    }

    #[test]
    fn test_async_class_text_round_trip() {
        for text in ["stopped", "thread-group-added", "tsv-deleted", "memory-changed"] {
            assert_eq!(AsyncClass::from_text(text).as_str(), text);
        }
        assert_eq!(AsyncClass::from_text("some-future-event"), AsyncClass::Unsupported);
    }
}
