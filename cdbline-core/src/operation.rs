//! デバッガ操作の一覧と対応状況

use std::fmt;

/// デバッガ操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Start,
    Stop,
    Continue,
    Step,
    StepIn,
    StepOut,
    StepInstruction,
    SetNextStatement,
    Backtrace,
    Disassemble,
    CpuRegisters,
    SwitchToFrame,
    SetVarValue,
    MemoryDump,
    RunningThreads,
    InfoFrame,
    InfoDll,
    InfoFiles,
    InfoFpu,
    InfoSignals,
    AddBreakpoint,
    RemoveBreakpoint,
    EvaluateSymbol,
    UpdateWatches,
    Attach,
    Detach,
}

impl Operation {
    /// 全操作
    pub const ALL: [Operation; 26] = [
        Operation::Start,
        Operation::Stop,
        Operation::Continue,
        Operation::Step,
        Operation::StepIn,
        Operation::StepOut,
        Operation::StepInstruction,
        Operation::SetNextStatement,
        Operation::Backtrace,
        Operation::Disassemble,
        Operation::CpuRegisters,
        Operation::SwitchToFrame,
        Operation::SetVarValue,
        Operation::MemoryDump,
        Operation::RunningThreads,
        Operation::InfoFrame,
        Operation::InfoDll,
        Operation::InfoFiles,
        Operation::InfoFpu,
        Operation::InfoSignals,
        Operation::AddBreakpoint,
        Operation::RemoveBreakpoint,
        Operation::EvaluateSymbol,
        Operation::UpdateWatches,
        Operation::Attach,
        Operation::Detach,
    ];

    /// CDBバックエンドで実装されているかどうか
    pub fn is_supported(self) -> bool {
        !matches!(
            self,
            Operation::StepInstruction
                | Operation::SetNextStatement
                | Operation::SetVarValue
                | Operation::MemoryDump
                | Operation::RunningThreads
                | Operation::InfoFrame
                | Operation::InfoDll
                | Operation::InfoFiles
                | Operation::InfoFpu
                | Operation::InfoSignals
                | Operation::Attach
        )
    }

    /// 操作の表示名
    pub fn name(self) -> &'static str {
        match self {
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::Continue => "continue",
            Operation::Step => "step",
            Operation::StepIn => "step in",
            Operation::StepOut => "step out",
            Operation::StepInstruction => "step instruction",
            Operation::SetNextStatement => "set next statement",
            Operation::Backtrace => "backtrace",
            Operation::Disassemble => "disassemble",
            Operation::CpuRegisters => "CPU registers",
            Operation::SwitchToFrame => "switch to frame",
            Operation::SetVarValue => "set variable value",
            Operation::MemoryDump => "memory dump",
            Operation::RunningThreads => "running threads",
            Operation::InfoFrame => "frame info",
            Operation::InfoDll => "DLL info",
            Operation::InfoFiles => "files info",
            Operation::InfoFpu => "FPU info",
            Operation::InfoSignals => "signals info",
            Operation::AddBreakpoint => "add breakpoint",
            Operation::RemoveBreakpoint => "remove breakpoint",
            Operation::EvaluateSymbol => "evaluate symbol",
            Operation::UpdateWatches => "update watches",
            Operation::Attach => "attach",
            Operation::Detach => "detach",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_operations() {
        let unsupported: Vec<_> = Operation::ALL
            .iter()
            .filter(|op| !op.is_supported())
            .collect();
        assert_eq!(unsupported.len(), 11);
        assert!(!Operation::Attach.is_supported());
        assert!(Operation::Detach.is_supported());
        assert!(Operation::Step.is_supported());
    }

    #[test]
    fn test_display() {
        assert_eq!(Operation::InfoFpu.to_string(), "FPU info");
    }
}
