//! Mikan GDB/MI 出力デコーダ
//!
//! このクレートは、GDB/MIの出力ストリームを解析する機能を提供します。
//! 任意に分割されたバイト列から行を切り出し、字句解析と構文解析を経て
//! 結果レコード・非同期レコード・ストリームレコード・プロンプトに分類します。

pub mod cstring;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod line;
pub mod output;
pub mod parser;
pub mod value;

pub use cstring::unescape_cstring;
pub use error::Error;
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use line::{ByteAccumulator, LineExtractor};
pub use output::{
    AsyncClass, AsyncKind, AsyncRecord, OobRecord, Output, OutputKind, Position, ResultClass,
    ResultRecord, StreamKind, StreamRecord,
};
pub use parser::{parse_line, MiParser};
pub use value::{MiResult, MiValue};

/// MIデコードの結果型
pub type Result<T> = std::result::Result<T, Error>;
