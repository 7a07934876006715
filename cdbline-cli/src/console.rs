//! 端末に出力するトランスポートとフロントエンド

use cdbline_core::{
    Breakpoint, BreakpointStatus, Cursor, FrontEnd, Instruction, Local, Register, Result,
    StackFrame, TipRect, Transport,
};

/// 送信コマンドを表示するトランスポート
///
/// デバッガプロセスは起動しないため、送信内容は端末に表示するだけです。
#[derive(Default)]
pub struct ConsoleTransport {
    pub sent: usize,
}

impl Transport for ConsoleTransport {
    fn send(&mut self, text: &str) -> Result<()> {
        self.sent += 1;
        println!("-> {}", text);
        Ok(())
    }
}

/// 通知を端末に表示するフロントエンド
pub struct ConsoleFrontEnd {
    pub breakpoints: Vec<Breakpoint>,
    pub watches: Vec<String>,
    pub show_backtrace: bool,
}

impl ConsoleFrontEnd {
    pub fn new(breakpoints: Vec<Breakpoint>) -> Self {
        Self {
            breakpoints,
            watches: Vec::new(),
            show_backtrace: true,
        }
    }

    /// 次に使うブレークポイント番号
    pub fn next_breakpoint_number(&self) -> u32 {
        self.breakpoints
            .iter()
            .map(|bp| bp.number.saturating_add(1))
            .max()
            .unwrap_or(0)
    }
}

fn print_frame(frame: &StackFrame) {
    match (&frame.file, frame.line) {
        (Some(file), Some(line)) => {
            println!("  #{:<2} {} at {}:{}", frame.number, frame.function, file, line)
        }
        _ => println!("  #{:<2} {}", frame.number, frame.function),
    }
}

impl FrontEnd for ConsoleFrontEnd {
    fn lookup_breakpoint(&self, number: u32) -> Option<Breakpoint> {
        self.breakpoints.iter().find(|bp| bp.number == number).cloned()
    }

    fn wants_backtrace(&self) -> bool {
        self.show_backtrace
    }

    fn on_cursor_changed(&mut self, cursor: &Cursor) {
        match cursor.line {
            Some(line) => println!("Stopped at {}:{}", cursor.file, line),
            None => println!("Stopped at {}", cursor.address),
        }
    }

    fn on_backtrace_requested(&mut self, switch_to_first: bool) {
        if switch_to_first {
            println!("Backtrace requested (switching to first frame)");
        } else {
            println!("Backtrace requested");
        }
    }

    fn on_display_message(&mut self, title: &str, text: &str) {
        println!();
        println!("[{}] {}", title, text);
        println!();
    }

    fn on_bring_to_front(&mut self) {}

    fn on_backtrace(&mut self, frames: &[StackFrame]) {
        println!("Backtrace ({} frames):", frames.len());
        for frame in frames {
            print_frame(frame);
        }
    }

    fn on_watch_value(&mut self, expression: &str, value: &str) {
        println!("  {} = {}", expression, value);
    }

    fn on_watches_updated(&mut self) {
        println!("Watches updated");
    }

    fn on_locals(&mut self, locals: &[Local]) {
        if locals.is_empty() {
            println!("No locals");
            return;
        }
        println!("Locals:");
        for local in locals {
            println!("  {} = {}", local.name, local.value);
        }
    }

    fn on_tooltip(&mut self, expression: &str, value: &str, _rect: TipRect) {
        println!("{} = {}", expression, value);
    }

    fn on_registers(&mut self, registers: &[Register]) {
        for chunk in registers.chunks(4) {
            let row: Vec<String> = chunk
                .iter()
                .map(|r| format!("{:>4}={}", r.name, r.value))
                .collect();
            println!("  {}", row.join("  "));
        }
    }

    fn on_disassembly_frame(&mut self, frame: &StackFrame) {
        println!("Disassembly of {}:", frame.symbol());
    }

    fn on_disassembly(&mut self, instructions: &[Instruction]) {
        for instr in instructions {
            println!("  {}  {}", instr.address, instr.text);
        }
    }

    fn on_breakpoint_added(&mut self, number: u32, status: BreakpointStatus) {
        match status {
            BreakpointStatus::Set => println!("Breakpoint {} set", number),
            BreakpointStatus::Deferred => println!("Breakpoint {} deferred (location not resolved yet)", number),
            BreakpointStatus::Redefined => println!("Breakpoint {} redefined", number),
        }
    }

    fn on_breakpoint_removed(&mut self, number: u32) {
        println!("Breakpoint {} removed", number);
    }

    fn on_detached(&mut self) {
        println!("Detached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_breakpoint_number() {
        let mut frontend = ConsoleFrontEnd::new(Vec::new());
        assert_eq!(frontend.next_breakpoint_number(), 0);
        frontend.breakpoints.push(Breakpoint::at_line(4, "a.cpp", 1));
        frontend.breakpoints.push(Breakpoint::at_line(1, "b.cpp", 1));
        assert_eq!(frontend.next_breakpoint_number(), 5);
        assert!(frontend.lookup_breakpoint(1).is_some());
        assert!(frontend.lookup_breakpoint(2).is_none());

        frontend.breakpoints.push(Breakpoint::at_function(u32::MAX, "app!main"));
        assert_eq!(frontend.next_breakpoint_number(), u32::MAX);
    }
}
