//! バイト蓄積バッファと行の切り出し
//!
//! デバッガの出力は任意の位置で分割されたチャンクとして届きます。
//! ここでは受け取ったバイト列を蓄積し、終端文字（`\r\n`、`\r`、`\n`）まで
//! 揃った行だけを取り出します。終端の揃っていない末尾は次の呼び出しまで保持します。

use crate::{Error, Result};
use tracing::trace;

/// 行終端に使われるバイト
const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// 伸長可能なバイトバッファ
///
/// 確保に失敗した場合はアボートせず `Error::OutOfMemory` を返します。
#[derive(Debug, Default)]
pub struct ByteAccumulator {
    data: Vec<u8>,
}

impl ByteAccumulator {
    /// 空のバッファを作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// バイト列を末尾に追加する
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.data
            .try_reserve(bytes.len())
            .map_err(|e| Error::out_of_memory("accumulating output", e))?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// 蓄積済みのバイト列
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `from` 以降で `set` に含まれるいずれかのバイトが最初に現れる位置を探す
    pub fn find_first_of(&self, from: usize, set: &[u8]) -> Option<usize> {
        self.data
            .get(from..)?
            .iter()
            .position(|b| set.contains(b))
            .map(|offset| from + offset)
    }

    /// 先頭 `count` バイトを捨てる
    pub fn discard_prefix(&mut self, count: usize) {
        self.data.drain(..count.min(self.data.len()));
    }

    /// すべてのバイトを取り出してバッファを空にする
    pub fn take_all(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }
}

/// 行の切り出し器
///
/// 取り出した行には終端文字を含めません。
#[derive(Debug, Default)]
pub struct LineExtractor {
    buffer: ByteAccumulator,
    /// 直前の行が末尾の `\r` で終わった。次に届く `\n` はその終端の一部
    pending_lf: bool,
}

impl LineExtractor {
    /// 新しい切り出し器を作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// 終端の揃っていない行を保持しているか
    pub fn is_buffering(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// 保持している未完成の行のバイト数
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// バイト列を追加し、完成した行をすべて取り出す
    pub fn push(&mut self, mut data: &[u8]) -> Result<Vec<Vec<u8>>> {
        if self.pending_lf && !data.is_empty() {
            self.pending_lf = false;
            if data[0] == LF {
                data = &data[1..];
            }
        }

        // 終端を含まないチャンクは追加するだけで走査しない
        let has_terminator = data.iter().any(|&b| b == CR || b == LF);
        let scanned = self.buffer.len();
        self.buffer.append(data)?;
        if !has_terminator {
            return Ok(Vec::new());
        }

        // 保持していた部分には終端がないので、追加した部分から探す
        let mut lines = Vec::new();
        let mut start = 0;
        let mut search = scanned;
        while let Some(pos) = self.buffer.find_first_of(search, &[CR, LF]) {
            let bytes = self.buffer.as_bytes();
            let terminator_len = if bytes[pos] == CR {
                match bytes.get(pos + 1) {
                    Some(&LF) => 2,
                    Some(_) => 1,
                    None => {
                        // `\r` がバッファの末尾。`\n` が後から届くかもしれない
                        self.pending_lf = true;
                        1
                    }
                }
            } else {
                1
            };

            lines.push(copy_line(&bytes[start..pos])?);
            start = pos + terminator_len;
            search = start;
        }

        self.buffer.discard_prefix(start);
        trace!("extracted {} lines", lines.len());
        Ok(lines)
    }

    /// 終端のない残りを最後の行として取り出す
    ///
    /// ストリームの終わりで呼び出します。残りがなければ `None`。
    pub fn flush(&mut self) -> Option<Vec<u8>> {
        self.pending_lf = false;
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer.take_all())
        }
    }
}

/// 行を新しいバッファに複製する
fn copy_line(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    line.try_reserve_exact(bytes.len())
        .map_err(|e| Error::out_of_memory("copying a line", e))?;
    line.extend_from_slice(bytes);
    Ok(line)
}
