//! テスト用のトランスポートとフロントエンド

#![allow(dead_code)]

use cdbline_core::{
    Breakpoint, BreakpointStatus, Cursor, Driver, DriverConfig, FrontEnd, Instruction, Local,
    Register, Result, StackFrame, TipRect, Transport,
};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// 送信されたコマンドを記録するトランスポート
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Vec<String>,
    /// 真の間、送信はすべて失敗する
    pub broken: bool,
}

impl Transport for RecordingTransport {
    fn send(&mut self, text: &str) -> Result<()> {
        if self.broken {
            anyhow::bail!("pipe closed");
        }
        self.sent.push(text.to_string());
        Ok(())
    }
}

/// 通知を記録するフロントエンド
#[derive(Default)]
pub struct RecordingFrontEnd {
    pub breakpoints: Vec<Breakpoint>,
    pub backtrace_wanted: bool,
    /// 通知の発生順
    pub events: Vec<String>,
    pub cursor_changes: Vec<Cursor>,
    pub cursor_resets: usize,
    pub backtrace_requests: Vec<bool>,
    pub messages: Vec<(String, String)>,
    pub brought_to_front: usize,
    pub backtraces: Vec<Vec<StackFrame>>,
    pub watch_values: Vec<(String, String)>,
    pub watches_updated: usize,
    pub locals: Vec<Local>,
    pub tooltips: Vec<(String, String, TipRect)>,
    pub registers: Vec<Register>,
    pub disassembly_frames: Vec<StackFrame>,
    pub disassembly: Vec<Instruction>,
    pub added: Vec<(u32, BreakpointStatus)>,
    pub removed: Vec<u32>,
    pub detached: usize,
}

impl FrontEnd for RecordingFrontEnd {
    fn lookup_breakpoint(&self, number: u32) -> Option<Breakpoint> {
        self.breakpoints.iter().find(|bp| bp.number == number).cloned()
    }

    fn wants_backtrace(&self) -> bool {
        self.backtrace_wanted
    }

    fn on_cursor_changed(&mut self, cursor: &Cursor) {
        self.events.push(format!(
            "cursor {}:{}",
            cursor.file,
            cursor.line.unwrap_or_default()
        ));
        self.cursor_changes.push(cursor.clone());
    }

    fn on_cursor_reset(&mut self) {
        self.cursor_resets += 1;
    }

    fn on_backtrace_requested(&mut self, switch_to_first: bool) {
        self.events.push("backtrace requested".into());
        self.backtrace_requests.push(switch_to_first);
    }

    fn on_display_message(&mut self, title: &str, text: &str) {
        self.events.push(format!("message {}", title));
        self.messages.push((title.to_string(), text.to_string()));
    }

    fn on_bring_to_front(&mut self) {
        self.events.push("front".into());
        self.brought_to_front += 1;
    }

    fn on_backtrace(&mut self, frames: &[StackFrame]) {
        self.events.push(format!("backtrace {}", frames.len()));
        self.backtraces.push(frames.to_vec());
    }

    fn on_watch_value(&mut self, expression: &str, value: &str) {
        self.events.push(format!("watch {}={}", expression, value));
        self.watch_values.push((expression.to_string(), value.to_string()));
    }

    fn on_watches_updated(&mut self) {
        self.events.push("watches updated".into());
        self.watches_updated += 1;
    }

    fn on_locals(&mut self, locals: &[Local]) {
        self.events.push(format!("locals {}", locals.len()));
        self.locals = locals.to_vec();
    }

    fn on_tooltip(&mut self, expression: &str, value: &str, rect: TipRect) {
        self.tooltips
            .push((expression.to_string(), value.to_string(), rect));
    }

    fn on_registers(&mut self, registers: &[Register]) {
        self.registers = registers.to_vec();
    }

    fn on_disassembly_frame(&mut self, frame: &StackFrame) {
        self.disassembly_frames.push(frame.clone());
    }

    fn on_disassembly(&mut self, instructions: &[Instruction]) {
        self.disassembly = instructions.to_vec();
    }

    fn on_breakpoint_added(&mut self, number: u32, status: BreakpointStatus) {
        self.added.push((number, status));
    }

    fn on_breakpoint_removed(&mut self, number: u32) {
        self.removed.push(number);
    }

    fn on_detached(&mut self) {
        self.detached += 1;
    }
}

pub type TestDriver = Driver<RecordingTransport, RecordingFrontEnd>;

/// 既定設定のドライバを作成する
pub fn driver() -> TestDriver {
    driver_with(DriverConfig::default())
}

pub fn driver_with(config: DriverConfig) -> TestDriver {
    Driver::new(
        RecordingTransport::default(),
        RecordingFrontEnd::default(),
        config,
    )
    .expect("driver")
}

/// 応答とプロンプトを一行ずつ流し込む
pub fn respond(driver: &mut TestDriver, lines: &[&str]) {
    for line in lines {
        driver.feed(line).expect("feed");
    }
    driver.feed("0:000> ").expect("feed prompt");
}

pub fn sent(driver: &TestDriver) -> Vec<String> {
    driver.transport().sent.clone()
}

/// 記録されたログイベント
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl LogCapture {
    /// 指定レベルのメッセージ一覧
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

/// クロージャ実行中のログを記録する
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, LogCapture) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture)
}
