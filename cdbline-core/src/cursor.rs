//! 実行位置（カーソル）

use crate::frontend::Breakpoint;
use cdbline_wire::StackFrame;

/// 実アドレスが得られない停止位置に使う番兵アドレス
///
/// ブレークポイント到達の通知には命令ポインタが含まれないため、
/// この値を入れてカーソル通知を強制します。
pub const SYNTHETIC_ADDRESS: &str = "deadbeef";

/// 現在の実行位置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    /// ソースファイル
    pub file: String,
    /// ソース行（1始まり）
    pub line: Option<u32>,
    /// 命令アドレス
    pub address: String,
    /// 関数名
    pub function: String,
    /// 今回の解析サイクルで位置が変わったかどうか
    pub changed: bool,
}

impl Cursor {
    /// 位置情報を消去する
    pub fn reset(&mut self) {
        *self = Cursor::default();
    }

    /// ブレークポイントの位置へ移動する
    ///
    /// ブレークポイントの行は0始まりで保持されているため1を足す。
    pub fn move_to_breakpoint(&mut self, bp: &Breakpoint) {
        self.file = bp.filename.clone();
        self.line = Some(bp.line.saturating_add(1));
        self.address = SYNTHETIC_ADDRESS.to_string();
        self.function.clear();
        self.changed = true;
    }

    /// スタックフレームの位置へ移動する
    ///
    /// ソース位置を持たないフレームでは何もしない。
    pub fn move_to_frame(&mut self, frame: &StackFrame) -> bool {
        let (Some(file), Some(line)) = (&frame.file, frame.line) else {
            return false;
        };
        self.file = file.clone();
        self.line = Some(line);
        self.address = frame.address.clone();
        self.function = frame.function.clone();
        self.changed = true;
        true
    }
}
