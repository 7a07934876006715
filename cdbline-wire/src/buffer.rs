//! 出力バッファとプロンプト検出
//!
//! トランスポートから届く断片を蓄積し、プロンプトが現れた時点で
//! 一つの応答として切り出します。切り出されなかった部分は次の
//! 呼び出しまで保持されます。

use crate::prompt::find_prompt;
use tracing::trace;

/// 入力断片の区切り方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// 断片は改行を除いた一行ずつ届く。追加時に改行を補う
    #[default]
    Lines,
    /// 断片をそのまま連結する
    Raw,
}

/// CDB出力の蓄積バッファ
#[derive(Debug, Default)]
pub struct OutputBuffer {
    text: String,
    framing: Framing,
}

impl OutputBuffer {
    /// 新しいバッファを作成する
    pub fn new(framing: Framing) -> Self {
        Self {
            text: String::new(),
            framing,
        }
    }

    /// 区切り方を取得する
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// 断片を追加する
    pub fn push(&mut self, chunk: &str) {
        self.text.push_str(chunk);
        if self.framing == Framing::Lines {
            self.text.push('\n');
        }
    }

    /// プロンプトまでの応答を一つ切り出す
    ///
    /// 応答末尾の改行は一つだけ取り除かれます。プロンプト自身と、
    /// プロンプト行に続く空白は消費されます。
    ///
    /// # Returns
    /// プロンプトが見つからなければ `None`（バッファは変更されない）
    pub fn take_response(&mut self) -> Option<String> {
        let (idx, len) = find_prompt(&self.text)?;

        let mut response = self.text[..idx].to_string();
        if response.ends_with("\r\n") {
            response.truncate(response.len() - 2);
        } else if response.ends_with('\n') {
            response.pop();
        }

        let rest = &self.text[idx + len..];
        let trimmed = rest.trim_start_matches([' ', '\t']);
        let trimmed = trimmed
            .strip_prefix("\r\n")
            .or_else(|| trimmed.strip_prefix('\n'))
            .unwrap_or(trimmed);
        let consumed = self.text.len() - trimmed.len();
        trace!(
            "Prompt {:?} at {}, {} bytes left",
            &self.text[idx..idx + len],
            idx,
            trimmed.len()
        );
        self.text.drain(..consumed);

        Some(response)
    }

    /// まだ応答として切り出されていないテキスト
    pub fn pending(&self) -> &str {
        &self.text
    }

    /// バッファが空かどうか
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// バッファを空にする
    pub fn clear(&mut self) {
        self.text.clear();
    }
}
