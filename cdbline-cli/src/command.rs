//! REPLコマンド

/// REPLコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// 開始コマンドを送る
    Start,
    /// 実行継続
    Continue,
    /// ステップオーバー
    Step,
    /// ステップイン
    StepIn,
    /// 現在の関数から抜けるまで実行
    StepOut,
    /// バックトレース表示
    Backtrace,
    /// フレーム切り替え
    Frame(usize),
    /// ブレークポイントを設定（ファイル:行 または 関数名）
    Break(String),
    /// ブレークポイントを削除
    Delete(u32),
    /// ウォッチ式を追加して評価
    Watch(String),
    /// ウォッチとローカル変数をすべて評価
    Watches,
    /// 式を一度だけ評価
    Print(String),
    /// レジスタ表示
    Registers,
    /// 逆アセンブル
    Disassemble,
    /// デタッチ
    Detach,
    /// デバッガ終了
    Stop,
    /// デバッガ出力として一行流し込む
    Feed(String),
    /// 送信待ちのコマンド一覧
    Queue,
    /// ヘルプ表示
    Help,
    /// 終了
    Quit,
}

impl ReplCommand {
    /// コマンド文字列をパースする
    pub fn parse(input: &str) -> Option<Self> {
        // "<" 以降は空白も含めてそのまま出力として扱う
        if let Some(output) = input.strip_prefix('<') {
            return Some(ReplCommand::Feed(output.strip_prefix(' ').unwrap_or(output).to_string()));
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.is_empty() {
            return None;
        }
        let rest = || parts[1..].join(" ");

        match parts[0] {
            "start" | "run" | "r" => Some(ReplCommand::Start),
            "continue" | "c" | "g" => Some(ReplCommand::Continue),
            "next" | "n" | "p" => Some(ReplCommand::Step),
            "step" | "s" | "t" => Some(ReplCommand::StepIn),
            "finish" | "f" | "gu" => Some(ReplCommand::StepOut),
            "backtrace" | "bt" | "k" => Some(ReplCommand::Backtrace),
            "frame" => parts.get(1)?.parse().ok().map(ReplCommand::Frame),
            "break" | "b" if parts.len() > 1 => Some(ReplCommand::Break(rest())),
            "delete" | "d" => parts.get(1)?.parse().ok().map(ReplCommand::Delete),
            "watch" | "w" if parts.len() > 1 => Some(ReplCommand::Watch(rest())),
            "watches" | "locals" => Some(ReplCommand::Watches),
            "print" | "?" if parts.len() > 1 => Some(ReplCommand::Print(rest())),
            "registers" | "regs" => Some(ReplCommand::Registers),
            "disassemble" | "disas" => Some(ReplCommand::Disassemble),
            "detach" => Some(ReplCommand::Detach),
            "stop" | "kill" => Some(ReplCommand::Stop),
            "queue" => Some(ReplCommand::Queue),
            "help" | "h" => Some(ReplCommand::Help),
            "quit" | "q" | "exit" => Some(ReplCommand::Quit),
            _ => None,
        }
    }
}

/// ブレークポイントの位置指定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// ファイルと行（1始まり）
    Line(String, u32),
    Function(String),
}

impl Location {
    /// "file:line" または関数名をパースする
    ///
    /// ファイル名にドライブ文字のコロンが含まれるため、最後のコロンで分割する。
    pub fn parse(input: &str) -> Self {
        if let Some((file, line)) = input.rsplit_once(':') {
            if let Ok(line) = line.parse::<u32>() {
                if !file.is_empty() && line > 0 {
                    return Location::Line(file.to_string(), line);
                }
            }
        }
        Location::Function(input.to_string())
    }
}
