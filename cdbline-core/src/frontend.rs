//! 外部との境界
//!
//! ドライバはトランスポート（デバッガプロセスへの書き込み）と
//! フロントエンド（UI、ブレークポイント一覧、ウォッチ）をこのトレイト越しにだけ扱います。

use crate::cursor::Cursor;
use crate::Result;
use cdbline_wire::{BreakpointStatus, Instruction, Local, Register, StackFrame};

/// デバッガプロセスへの書き込み口
pub trait Transport {
    /// コマンド一行を送る
    fn send(&mut self, text: &str) -> Result<()>;
}

/// ブレークポイント（フロントエンドが所有する）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    /// デバッガに通知される番号
    pub number: u32,
    pub filename: String,
    /// 行（0始まり）
    pub line: u32,
    /// 一度到達したら消える
    pub temporary: bool,
    /// 関数名で指定する場合
    pub function: Option<String>,
    pub enabled: bool,
}

impl Breakpoint {
    /// ファイルと行で指定するブレークポイントを作成する
    pub fn at_line(number: u32, filename: impl Into<String>, line: u32) -> Self {
        Self {
            number,
            filename: filename.into(),
            line,
            temporary: false,
            function: None,
            enabled: true,
        }
    }

    /// 関数名で指定するブレークポイントを作成する
    pub fn at_function(number: u32, function: impl Into<String>) -> Self {
        Self {
            number,
            filename: String::new(),
            line: 0,
            temporary: false,
            function: Some(function.into()),
            enabled: true,
        }
    }
}

/// ツールチップを表示する画面上の矩形
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TipRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// フロントエンド
///
/// ブレークポイント検索とバックトレース要否の問い合わせ以外は通知であり、
/// 結果の受け取りが不要なものは既定で何もしません。
pub trait FrontEnd {
    /// 番号からブレークポイントを探す
    fn lookup_breakpoint(&self, number: u32) -> Option<Breakpoint>;

    /// バックトレースの更新を必要としているか
    fn wants_backtrace(&self) -> bool;

    /// 実行位置が変わった
    fn on_cursor_changed(&mut self, cursor: &Cursor);

    /// 実行位置の表示を消す
    fn on_cursor_reset(&mut self) {}

    /// バックトレース表示を要求する
    fn on_backtrace_requested(&mut self, switch_to_first: bool);

    /// ユーザーにメッセージを表示する
    fn on_display_message(&mut self, title: &str, text: &str);

    /// ホストのウィンドウを前面に出す
    fn on_bring_to_front(&mut self);

    fn on_backtrace(&mut self, _frames: &[StackFrame]) {}

    fn on_watch_value(&mut self, _expression: &str, _value: &str) {}

    /// 先行するウォッチ評価がすべて終わった
    fn on_watches_updated(&mut self) {}

    fn on_locals(&mut self, _locals: &[Local]) {}

    fn on_tooltip(&mut self, _expression: &str, _value: &str, _rect: TipRect) {}

    fn on_registers(&mut self, _registers: &[Register]) {}

    fn on_disassembly_frame(&mut self, _frame: &StackFrame) {}

    fn on_disassembly(&mut self, _instructions: &[Instruction]) {}

    fn on_breakpoint_added(&mut self, _number: u32, _status: BreakpointStatus) {}

    fn on_breakpoint_removed(&mut self, _number: u32) {}

    fn on_detached(&mut self) {}
}
