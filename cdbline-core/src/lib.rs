//! cdbline のコア機能
//!
//! このクレートは、CDBをテキストコンソール越しに操作するドライバを提供します。
//! コマンドキュー、応答の切り出しと解析、非同期通知の処理、
//! デバッガ操作（ステップ実行、ブレークポイント、ウォッチなど）を統合します。

pub mod cmdline;
pub mod command;
pub mod config;
pub mod cursor;
pub mod driver;
pub mod errors;
pub mod frontend;
pub mod macros;
pub mod operation;
pub mod queue;

pub use cmdline::{build_command_line, DebugTarget, PATH_SEPARATOR};
pub use command::{Command, CommandKind, ParseContext};
pub use config::DriverConfig;
pub use cursor::{Cursor, SYNTHETIC_ADDRESS};
pub use driver::{DebuggeeState, Driver};
pub use errors::DriverError;
pub use frontend::{Breakpoint, FrontEnd, TipRect, Transport};
pub use macros::MacroExpander;
pub use operation::Operation;
pub use queue::{CommandQueue, Dispatch, Priority};

// 他のクレートから使用するために再エクスポート
pub use cdbline_wire::{
    BreakpointStatus, Framing, Instruction, Local, Register, StackFrame,
};

/// ドライバの結果型
pub type Result<T> = anyhow::Result<T>;
