//! デバッガコマンド
//!
//! 一つのコマンドは、CDBへ送るテキストとその応答の解析方法の組です。
//! テキストは生成時に確定し、以後変更されません。

use crate::cursor::Cursor;
use crate::frontend::{Breakpoint, FrontEnd, TipRect};
use cdbline_wire::{parse_breakpoint_reply, parse_locals, Grammar};
use tracing::{debug, info};

/// コマンドの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// 応答を読み捨てるコマンド（`g`, `p`, `l+t` など）
    Plain(String),
    /// フレームを切り替える。`None` は現在のフレームの表示
    SwitchFrame(Option<usize>),
    /// バックトレースを取得する
    Backtrace { switch_to_first: bool },
    AddBreakpoint(Breakpoint),
    RemoveBreakpoint(Breakpoint),
    /// ウォッチ式を評価する
    Watch(String),
    /// ローカル変数を取得する
    InfoLocals,
    /// ウォッチ表示の更新（送信テキストを持たない）
    UpdateWatchesTree,
    /// ツールチップ用に式を評価する
    TooltipEvaluation { expression: String, rect: TipRect },
    InfoRegisters,
    /// 逆アセンブル対象のフレームを調べる
    DisassemblyInit,
    /// 関数を逆アセンブルする
    Disassembly(String),
    Detach,
}

impl CommandKind {
    /// CDBへ送るテキストを組み立てる
    pub fn render(&self) -> String {
        match self {
            CommandKind::Plain(text) => text.clone(),
            CommandKind::SwitchFrame(Some(number)) => format!(".frame {}", number),
            CommandKind::SwitchFrame(None) => "k n 1".to_string(),
            CommandKind::Backtrace { .. } => "k n".to_string(),
            CommandKind::AddBreakpoint(bp) => {
                let mut cmd = format!("bu{} ", bp.number);
                if bp.temporary {
                    cmd.push_str("/1 ");
                }
                match bp.function.as_deref() {
                    Some(function) if !function.is_empty() => cmd.push_str(function),
                    // CDBの行番号は1始まり
                    _ => cmd.push_str(&format!("`{}:{}`", bp.filename, bp.line.saturating_add(1))),
                }
                cmd
            }
            CommandKind::RemoveBreakpoint(bp) => format!("bc {}", bp.number),
            CommandKind::Watch(expression) => format!("?? {}", expression),
            CommandKind::InfoLocals => "dv".to_string(),
            CommandKind::UpdateWatchesTree => String::new(),
            CommandKind::TooltipEvaluation { expression, .. } => format!("?? {}", expression),
            CommandKind::InfoRegisters => "r".to_string(),
            CommandKind::DisassemblyInit => "k n 1".to_string(),
            CommandKind::Disassembly(symbol) => format!("uf {}", symbol),
            CommandKind::Detach => ".detach".to_string(),
        }
    }
}

/// キューに積まれたコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
    issued_at: u64,
    kind: CommandKind,
}

impl Command {
    /// コマンドを作成する
    pub fn new(kind: CommandKind, issued_at: u64) -> Self {
        Self {
            text: kind.render(),
            issued_at,
            kind,
        }
    }

    /// 送信テキスト
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 発行順の通し番号
    pub fn issued_at(&self) -> u64 {
        self.issued_at
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// デバッグ対象の実行を再開させるコマンドかどうか
    pub fn resumes_execution(&self) -> bool {
        matches!(&self.kind, CommandKind::Plain(text) if matches!(text.as_str(), "g" | "p" | "t" | "gu"))
    }

    /// 送信せずにその場で処理するだけのコマンドかどうか
    pub fn is_placeholder_only(&self) -> bool {
        self.text.is_empty()
    }

    /// 応答を解析し、結果を状態とフロントエンドへ反映する
    pub fn parse(&self, output: &str, ctx: &mut ParseContext<'_>) {
        match &self.kind {
            CommandKind::Plain(_) => {
                for line in output.lines() {
                    debug!("[{}] {}", self.text, line);
                }
            }

            CommandKind::SwitchFrame(_) => {
                let frames = ctx.grammar.frames.parse_all(output);
                match frames.first() {
                    Some(frame) if ctx.cursor.move_to_frame(frame) => {
                        ctx.notify_cursor = true;
                    }
                    _ => debug!("No source location in frame output: {:?}", output),
                }
            }

            CommandKind::Backtrace { switch_to_first } => {
                let frames = ctx.grammar.frames.parse_all(output);
                debug!("Backtrace: {} frames", frames.len());
                if *switch_to_first {
                    if let Some(frame) = frames.first() {
                        if ctx.cursor.move_to_frame(frame) {
                            ctx.notify_cursor = true;
                        }
                    }
                }
                ctx.frontend.on_backtrace(&frames);
            }

            CommandKind::AddBreakpoint(bp) => {
                let reply = parse_breakpoint_reply(output);
                for line in &reply.diagnostics {
                    info!("{}", line);
                }
                debug!("Breakpoint {} -> {:?}", bp.number, reply.status);
                ctx.frontend.on_breakpoint_added(bp.number, reply.status);
            }

            CommandKind::RemoveBreakpoint(bp) => {
                ctx.frontend.on_breakpoint_removed(bp.number);
            }

            CommandKind::Watch(expression) => {
                ctx.frontend.on_watch_value(expression, output.trim());
            }

            CommandKind::InfoLocals => {
                let locals = parse_locals(output);
                ctx.frontend.on_locals(&locals);
            }

            CommandKind::UpdateWatchesTree => {
                ctx.frontend.on_watches_updated();
            }

            CommandKind::TooltipEvaluation { expression, rect } => {
                ctx.frontend.on_tooltip(expression, output.trim(), *rect);
            }

            CommandKind::InfoRegisters => {
                let registers = ctx.grammar.registers.parse(output);
                ctx.frontend.on_registers(&registers);
            }

            CommandKind::DisassemblyInit => {
                let frames = ctx.grammar.frames.parse_all(output);
                if let Some(frame) = frames.first() {
                    ctx.frontend.on_disassembly_frame(frame);
                    ctx.follow_ups
                        .push(CommandKind::Disassembly(frame.symbol().to_string()));
                } else {
                    debug!("No frame to disassemble: {:?}", output);
                }
            }

            CommandKind::Disassembly(_) => {
                let instructions = ctx.grammar.disassembly.parse(output);
                ctx.frontend.on_disassembly(&instructions);
            }

            CommandKind::Detach => {
                for line in output.lines() {
                    info!("{}", line);
                }
                ctx.frontend.on_detached();
            }
        }
    }
}

/// 応答解析中に参照・更新される状態
pub struct ParseContext<'a> {
    pub cursor: &'a mut Cursor,
    pub frontend: &'a mut dyn FrontEnd,
    pub grammar: &'a Grammar,
    /// 続けて最優先で実行するコマンド
    pub follow_ups: Vec<CommandKind>,
    /// カーソル変更を通知する必要があるか
    pub notify_cursor: bool,
}

impl<'a> ParseContext<'a> {
    pub fn new(
        cursor: &'a mut Cursor,
        frontend: &'a mut dyn FrontEnd,
        grammar: &'a Grammar,
    ) -> Self {
        Self {
            cursor,
            frontend,
            grammar,
            follow_ups: Vec::new(),
            notify_cursor: false,
        }
    }
}
