//! Mikan GDB/MI コマンド結果の解釈
//!
//! このクレートは、`mikan-wire` が解析したMIレコードを受け取り、
//! ハンドラへの振り分けと、コマンド結果からブレークポイントやフレーム、
//! ソースファイルなどの型付きのオブジェクトへの変換を行います。

pub mod breakpoint;
pub mod command;
pub mod errors;
pub mod frame;
pub mod parse;
pub mod source;
pub mod wire;

pub use breakpoint::{Breakpoint, BreakpointAddress, Disposition};
pub use command::{extract, CommandKind, MiCommand};
pub use errors::Error;
pub use frame::StackFrame;
pub use source::{CurrentSourceFile, SourceFile};
pub use wire::{interpret, Wire, WireEvent, WireHandler, WireState};

// 他のクレートから使用するために再エクスポート
pub use mikan_wire::{AsyncRecord, Position, ResultClass, ResultRecord, StreamKind};

/// コマンド結果の解釈の結果型
pub type Result<T> = std::result::Result<T, Error>;
