//! エラー型

use std::collections::TryReserveError;

/// MIデコード処理のエラー
///
/// 行単位の構文エラーはエラーではなく `OutputKind::ParseError` として
/// 出力されるため、ここに現れるのは処理を継続できない致命的なものだけです。
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// バッファの確保に失敗した
    #[error("out of memory while {context}: {source}")]
    OutOfMemory {
        context: &'static str,
        #[source]
        source: TryReserveError,
    },
}

impl Error {
    pub(crate) fn out_of_memory(context: &'static str, source: TryReserveError) -> Self {
        Error::OutOfMemory { context, source }
    }
}
