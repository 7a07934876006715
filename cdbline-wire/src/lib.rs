//! cdbline CDB出力のテキスト処理
//!
//! このクレートは、CDBのコンソール出力を扱うための純粋なテキスト処理を提供します。
//! プロンプト検出、出力バッファリング、行分類、スタックフレームやレジスタなどの
//! 出力文法の解析を行います。I/Oは一切行いません。

pub mod breakpoint;
pub mod buffer;
pub mod classify;
pub mod disasm;
pub mod frame;
pub mod locals;
pub mod prompt;
pub mod registers;

pub use breakpoint::{parse_breakpoint_reply, BreakpointReply, BreakpointStatus};
pub use buffer::{Framing, OutputBuffer};
pub use classify::{LineClass, LineClassifier, Notification, Rule, RULE_ORDER};
pub use disasm::{DisassemblyParser, Instruction};
pub use frame::{FrameParser, StackFrame};
pub use locals::{parse_locals, Local};
pub use prompt::{find_prompt, PROMPTS, PROMPT_THREAD0, PROMPT_THREAD1};
pub use registers::{Register, RegisterParser};

/// テキスト処理の結果型
pub type Result<T> = anyhow::Result<T>;

/// CDB出力の文法一式
///
/// 正規表現は生成時に一度だけコンパイルされます。
pub struct Grammar {
    /// 非同期通知の行分類器
    pub classifier: LineClassifier,
    /// スタックフレーム行の解析器
    pub frames: FrameParser,
    /// `r` コマンド出力の解析器
    pub registers: RegisterParser,
    /// `uf` コマンド出力の解析器
    pub disassembly: DisassemblyParser,
}

impl Grammar {
    /// 文法一式を作成する
    pub fn new() -> Result<Self> {
        Ok(Self {
            classifier: LineClassifier::new()?,
            frames: FrameParser::new()?,
            registers: RegisterParser::new()?,
            disassembly: DisassemblyParser::new()?,
        })
    }
}
