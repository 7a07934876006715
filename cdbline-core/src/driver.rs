//! CDBドライバのメインロジック
//!
//! デバッガ操作をコマンドとしてキューに積み、CDBの出力を受け取って
//! 応答の解析と非同期通知（ブレークポイント到達、アクセス違反）の処理を行います。
//! すべての処理は `feed` と各操作の呼び出しの中で同期的に完結します。

use crate::cmdline::{build_command_line, DebugTarget};
use crate::command::{Command, CommandKind, ParseContext};
use crate::config::DriverConfig;
use crate::cursor::Cursor;
use crate::errors::{DriverError, ERR_UNKNOWN_BREAKPOINT, MSG_ACCESS_VIOLATION};
use crate::frontend::{Breakpoint, FrontEnd, TipRect, Transport};
use crate::macros::MacroExpander;
use crate::operation::Operation;
use crate::queue::{CommandQueue, Dispatch, Priority};
use crate::Result;
use cdbline_wire::{Grammar, Notification, OutputBuffer};
use tracing::{debug, info, warn};

/// デバッグ対象の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebuggeeState {
    /// 未起動、または終了済み
    NotStarted,
    /// 実行中
    Running,
    /// プロンプトで停止している
    Stopped,
    /// デタッチ済み
    Detached,
}

/// CDBドライバ
pub struct Driver<T: Transport, F: FrontEnd> {
    /// CDBへの書き込み口
    transport: T,
    /// UIとブレークポイント一覧
    frontend: F,
    config: DriverConfig,
    macros: MacroExpander,
    grammar: Grammar,
    queue: CommandQueue,
    /// まだ応答として切り出されていない出力
    buffer: OutputBuffer,
    cursor: Cursor,
    state: DebuggeeState,
    /// 実行開始を要求済みか
    started: bool,
    /// 直近の出力でプロンプトが見つかったか
    program_stopped: bool,
}

impl<T: Transport, F: FrontEnd> Driver<T, F> {
    /// 新しいドライバを作成する
    pub fn new(transport: T, frontend: F, config: DriverConfig) -> Result<Self> {
        Ok(Self {
            transport,
            frontend,
            buffer: OutputBuffer::new(config.framing),
            config,
            macros: MacroExpander::new()?,
            grammar: Grammar::new()?,
            queue: CommandQueue::new(),
            cursor: Cursor::default(),
            state: DebuggeeState::NotStarted,
            started: false,
            program_stopped: true,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DriverConfig {
        &mut self.config
    }

    /// マクロ展開器を取得する
    pub fn macros_mut(&mut self) -> &mut MacroExpander {
        &mut self.macros
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn state(&self) -> DebuggeeState {
        self.state
    }

    /// 未処理の出力
    pub fn pending_output(&self) -> &str {
        self.buffer.pending()
    }

    /// デバッグ対象が起動済みで、終了していないか
    pub fn is_debugging_started(&self) -> bool {
        self.started
    }

    /// 直近の出力でプロンプトを受け取ったか
    pub fn is_program_stopped(&self) -> bool {
        self.program_stopped
    }

    /// 操作がこのバックエンドで実装されているか
    pub fn supports(&self, op: Operation) -> bool {
        op.is_supported()
    }

    // ---- コマンドライン ----

    /// 実行ファイルを起動するコマンドラインを取得する
    ///
    /// 作業ディレクトリが設定されていれば、プロセスの作業ディレクトリを変更します。
    pub fn get_command_line(&self, debugger: &str, debuggee: &str) -> Result<String> {
        let debuggee = self.macros.expand(debuggee);
        self.render_command_line(debugger, DebugTarget::Launch(&debuggee))
    }

    /// プロセスにアタッチするコマンドラインを取得する
    pub fn get_command_line_for_pid(&self, debugger: &str, pid: u32) -> Result<String> {
        self.render_command_line(debugger, DebugTarget::Attach(pid))
    }

    fn render_command_line(&self, debugger: &str, target: DebugTarget<'_>) -> Result<String> {
        let debugger = self.macros.expand(debugger);
        let directories: Vec<String> = self
            .config
            .directories
            .iter()
            .map(|dir| self.macros.expand(dir))
            .filter(|dir| !dir.is_empty())
            .collect();
        let cmd = build_command_line(&debugger, target, &directories);

        if let Some(dir) = self.config.working_dir.as_ref().filter(|d| !d.as_os_str().is_empty()) {
            std::env::set_current_dir(dir).map_err(|source| DriverError::WorkingDirectory {
                path: dir.clone(),
                source,
            })?;
        }

        debug!("Command line: {}", cmd);
        Ok(cmd)
    }

    // ---- キュー ----

    fn queue_command(&mut self, kind: CommandKind) -> Result<()> {
        self.queue.enqueue(kind);
        self.run_queue()
    }

    /// 送信可能なら先頭のコマンドを送る
    ///
    /// 送信テキストを持たないコマンドはその場で処理し、次へ進みます。
    pub fn run_queue(&mut self) -> Result<()> {
        loop {
            match self.queue.dispatch(&mut self.transport)? {
                Dispatch::Idle => return Ok(()),
                Dispatch::Sent => {
                    if self.queue.current().is_some_and(Command::resumes_execution) {
                        self.state = DebuggeeState::Running;
                    }
                    return Ok(());
                }
                Dispatch::Action(cmd) => self.complete(&cmd, ""),
            }
        }
    }

    /// 未送信のコマンドと未処理の出力をすべて破棄する
    ///
    /// デバッガプロセスが終了した後にトランスポート側から呼ぶ。
    pub fn clear_queue(&mut self) {
        if !self.queue.is_empty() {
            warn!("Dropping {} queued commands", self.queue.len());
        }
        self.queue.clear();
        self.buffer.clear();
    }

    fn complete(&mut self, cmd: &Command, output: &str) {
        let mut ctx = ParseContext::new(&mut self.cursor, &mut self.frontend, &self.grammar);
        cmd.parse(output, &mut ctx);
        let ParseContext {
            follow_ups,
            notify_cursor,
            ..
        } = ctx;

        for kind in follow_ups.into_iter().rev() {
            self.queue.enqueue_with(kind, Priority::High);
        }
        if notify_cursor {
            self.frontend.on_cursor_changed(&self.cursor);
        }
    }

    // ---- 出力の処理 ----

    /// CDBの出力を受け取る
    ///
    /// プロンプトが現れるまで出力は蓄積され、現れた時点で送信中のコマンドの
    /// 応答として解析されます。同じテキストは非同期通知の走査にも使われます。
    ///
    /// 次のコマンドの送信に失敗しても、切り出した応答の解析と通知は最後まで行い、
    /// 最初の送信エラーを返します。失敗したコマンドはキューの先頭に残ります。
    pub fn feed(&mut self, chunk: &str) -> Result<()> {
        self.cursor.changed = false;
        self.buffer.push(chunk);
        debug!("{}", chunk);

        let mut found = false;
        let mut send_error = None;
        while let Some(response) = self.buffer.take_response() {
            found = true;
            self.program_stopped = true;
            if self.state == DebuggeeState::Running {
                self.state = DebuggeeState::Stopped;
            }

            // 送信済みのコマンドだけが応答を受け取る
            let in_flight = self.queue.is_busy();
            self.queue.set_busy(false);
            match in_flight.then(|| self.queue.remove_top(false)).flatten() {
                Some(cmd) => self.complete(&cmd, &response),
                None => debug!("Prompt without a pending command"),
            }
            if let Err(e) = self.run_queue() {
                send_error.get_or_insert(e);
            }
            if let Err(e) = self.dispatch_notifications(&response) {
                send_error.get_or_insert(e);
            }
        }

        if !found {
            // 応答待ち
            self.program_stopped = false;
        }
        send_error.map_or(Ok(()), Err)
    }

    fn dispatch_notifications(&mut self, batch: &str) -> Result<()> {
        let mut notify_change = false;
        let mut send_error = None;

        for notification in self.grammar.classifier.scan(batch) {
            match notification {
                Notification::ExecutionFailure(line) => {
                    info!("{}", line);
                }

                Notification::AccessViolation(line) => {
                    warn!("{}", line);
                    self.frontend.on_bring_to_front();
                    self.frontend.on_backtrace_requested(true);
                    if let Err(e) = self.do_backtrace(true) {
                        send_error.get_or_insert(e);
                    }
                    self.frontend.on_display_message(MSG_ACCESS_VIOLATION, &line);
                }

                // Breakpoint 0 hit
                // >   38:     if (!RegisterClassEx (&wincl))
                Notification::BreakpointHit { number, line } => {
                    info!("{}", line);
                    match self.frontend.lookup_breakpoint(number) {
                        Some(bp) => {
                            self.cursor.move_to_breakpoint(&bp);
                            notify_change = true;
                        }
                        None => warn!(
                            "{}: nothing known about breakpoint {}",
                            ERR_UNKNOWN_BREAKPOINT, number
                        ),
                    }
                }
            }
        }

        if notify_change {
            self.frontend.on_cursor_changed(&self.cursor);
        }
        send_error.map_or(Ok(()), Err)
    }

    fn reset_cursor(&mut self) {
        self.cursor.reset();
        self.frontend.on_cursor_reset();
    }

    // ---- デバッガ操作 ----

    /// デバッグを開始する
    ///
    /// ソース行表示を設定し、`do_not_run` が無効なら実行を始めます。
    pub fn start(&mut self) -> Result<()> {
        self.queue_command(CommandKind::Plain("l+t".into()))?; // source mode
        self.queue_command(CommandKind::Plain("l+s".into()))?; // show source lines
        self.queue_command(CommandKind::Plain("l+o".into()))?; // only source lines

        if !self.config.do_not_run {
            self.queue_command(CommandKind::Plain("g".into()))?;
            self.started = true;
        }
        Ok(())
    }

    /// デバッガを終了する
    ///
    /// 積まれているコマンドは破棄されず、`q` はその後に送られます。
    pub fn stop(&mut self) -> Result<()> {
        self.reset_cursor();
        self.queue_command(CommandKind::Plain("q".into()))?;
        self.started = false;
        self.state = DebuggeeState::NotStarted;
        Ok(())
    }

    /// 実行を継続する
    pub fn continue_execution(&mut self) -> Result<()> {
        self.reset_cursor();
        self.queue_command(CommandKind::Plain("g".into()))?;
        self.started = true;
        Ok(())
    }

    fn step_with(&mut self, primitive: &str) -> Result<()> {
        self.reset_cursor();
        self.queue_command(CommandKind::Plain(primitive.into()))?;
        // 停止したファイルと行はフレーム表示から得る
        self.queue_command(CommandKind::SwitchFrame(None))
    }

    /// ステップオーバー
    pub fn step(&mut self) -> Result<()> {
        self.step_with("p")
    }

    /// ステップイン
    pub fn step_in(&mut self) -> Result<()> {
        self.step_with("t")
    }

    /// 現在の関数から抜けるまで実行
    pub fn step_out(&mut self) -> Result<()> {
        self.step_with("gu")
    }

    /// バックトレースを要求する
    pub fn backtrace(&mut self) -> Result<()> {
        self.do_backtrace(false)
    }

    fn do_backtrace(&mut self, switch_to_first: bool) -> Result<()> {
        if self.frontend.wants_backtrace() {
            self.queue_command(CommandKind::Backtrace { switch_to_first })?;
        }
        Ok(())
    }

    /// 現在の関数を逆アセンブルする
    pub fn disassemble(&mut self) -> Result<()> {
        self.queue_command(CommandKind::DisassemblyInit)
    }

    /// レジスタを取得する
    pub fn cpu_registers(&mut self) -> Result<()> {
        self.queue_command(CommandKind::InfoRegisters)
    }

    /// フレームを切り替える
    pub fn switch_to_frame(&mut self, number: usize) -> Result<()> {
        self.reset_cursor();
        self.queue_command(CommandKind::SwitchFrame(Some(number)))
    }

    /// ブレークポイントを設定する（無効なブレークポイントは送らない）
    pub fn add_breakpoint(&mut self, bp: &Breakpoint) -> Result<()> {
        if !bp.enabled {
            debug!("Breakpoint {} is disabled, not sending", bp.number);
            return Ok(());
        }
        self.queue_command(CommandKind::AddBreakpoint(bp.clone()))
    }

    /// ブレークポイントを削除する
    pub fn remove_breakpoint(&mut self, bp: &Breakpoint) -> Result<()> {
        self.queue_command(CommandKind::RemoveBreakpoint(bp.clone()))
    }

    /// ツールチップ用に式を評価する
    pub fn evaluate_symbol(&mut self, expression: &str, rect: TipRect) -> Result<()> {
        self.queue_command(CommandKind::TooltipEvaluation {
            expression: expression.to_string(),
            rect,
        })
    }

    /// ウォッチをすべて評価し直す
    ///
    /// 最後に送信テキストを持たない更新コマンドを積むため、
    /// `on_watches_updated` は個々の評価結果がすべて届いた後に呼ばれます。
    pub fn update_watches<S: AsRef<str>>(&mut self, locals: bool, watches: &[S]) -> Result<()> {
        if locals {
            self.queue_command(CommandKind::InfoLocals)?;
        }
        for watch in watches {
            self.queue_command(CommandKind::Watch(watch.as_ref().to_string()))?;
        }
        self.queue_command(CommandKind::UpdateWatchesTree)
    }

    /// ウォッチを一つ評価し直す
    pub fn update_watch(&mut self, expression: &str) -> Result<()> {
        self.queue_command(CommandKind::Watch(expression.to_string()))?;
        self.queue_command(CommandKind::UpdateWatchesTree)
    }

    /// デタッチする（デバッグ対象は停止しない）
    pub fn detach(&mut self) -> Result<()> {
        self.queue_command(CommandKind::Detach)?;
        self.started = false;
        self.state = DebuggeeState::Detached;
        Ok(())
    }

    // ---- 未実装の操作 ----

    fn unsupported(&self, op: Operation) -> Result<()> {
        warn!("{} is not supported by the CDB backend", op);
        Err(DriverError::Unsupported(op).into())
    }

    pub fn step_instruction(&mut self) -> Result<()> {
        self.unsupported(Operation::StepInstruction)
    }

    pub fn set_next_statement(&mut self, _filename: &str, _line: u32) -> Result<()> {
        self.unsupported(Operation::SetNextStatement)
    }

    pub fn set_var_value(&mut self, _var: &str, _value: &str) -> Result<()> {
        self.unsupported(Operation::SetVarValue)
    }

    pub fn memory_dump(&mut self) -> Result<()> {
        self.unsupported(Operation::MemoryDump)
    }

    pub fn running_threads(&mut self) -> Result<()> {
        self.unsupported(Operation::RunningThreads)
    }

    pub fn info_frame(&mut self) -> Result<()> {
        self.unsupported(Operation::InfoFrame)
    }

    pub fn info_dll(&mut self) -> Result<()> {
        self.unsupported(Operation::InfoDll)
    }

    pub fn info_files(&mut self) -> Result<()> {
        self.unsupported(Operation::InfoFiles)
    }

    pub fn info_fpu(&mut self) -> Result<()> {
        self.unsupported(Operation::InfoFpu)
    }

    pub fn info_signals(&mut self) -> Result<()> {
        self.unsupported(Operation::InfoSignals)
    }

    /// 実行中のプロセスへのアタッチ（コマンドラインの `-p` を使うこと）
    pub fn attach(&mut self, _pid: u32) -> Result<()> {
        self.unsupported(Operation::Attach)
    }
}
