//! エラー型

use mikan_wire::ResultClass;

/// コマンド結果の解釈で起きるエラー
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 結果レコードの形が想定と違う
    #[error("unexpected result shape: {0}")]
    Schema(String),

    /// `^done` 以外の結果クラス
    #[error("unexpected result class ^{0}")]
    UnexpectedResultClass(ResultClass),

    /// 入力の渡し方が間違っている
    #[error("usage error: {0}")]
    Usage(String),

    /// 解釈方法を知らないコマンド
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),

    /// MIデコード中の致命的なエラー
    #[error(transparent)]
    Wire(#[from] mikan_wire::Error),
}

impl Error {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Error::Schema(message.into())
    }

    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Error::Usage(message.into())
    }
}
