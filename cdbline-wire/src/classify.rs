//! 非同期通知の行分類
//!
//! 応答テキストを一行ずつ調べ、実行失敗・アクセス違反・ブレークポイント到達の
//! 通知を拾い出します。規則は `RULE_ORDER` の順に評価され、最初に一致した
//! 規則がその行の分類になります。

use crate::Result;
use regex::Regex;
use tracing::trace;

/// 分類規則
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// "Cannot execute " で始まる行
    ExecutionFailure,
    /// "Access violation" を含む行
    AccessViolation,
    /// "Breakpoint <番号> hit" に一致する行
    BreakpointHit,
}

/// 規則の評価順
pub const RULE_ORDER: [Rule; 3] = [
    Rule::ExecutionFailure,
    Rule::AccessViolation,
    Rule::BreakpointHit,
];

impl Rule {
    /// カーソル位置を決める規則かどうか
    pub fn affects_cursor(self) -> bool {
        matches!(self, Rule::BreakpointHit)
    }
}

/// 一行の分類結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    ExecutionFailure,
    AccessViolation,
    BreakpointHit(u32),
    /// 意味を持たない出力
    Chatter,
}

/// 走査で得られた通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    ExecutionFailure(String),
    AccessViolation(String),
    BreakpointHit { number: u32, line: String },
}

/// 行分類器
pub struct LineClassifier {
    breakpoint_hit: Regex,
}

impl LineClassifier {
    /// 行分類器を作成する
    pub fn new() -> Result<Self> {
        // 例: Breakpoint 0 hit
        let breakpoint_hit = Regex::new(r"Breakpoint ([0-9]+) hit")?;
        Ok(Self { breakpoint_hit })
    }

    fn apply(&self, rule: Rule, line: &str) -> Option<LineClass> {
        match rule {
            Rule::ExecutionFailure => line
                .starts_with("Cannot execute ")
                .then_some(LineClass::ExecutionFailure),
            Rule::AccessViolation => line
                .contains("Access violation")
                .then_some(LineClass::AccessViolation),
            Rule::BreakpointHit => self
                .breakpoint_hit
                .captures(line)
                .and_then(|caps| caps[1].parse().ok())
                .map(LineClass::BreakpointHit),
        }
    }

    /// 一行を分類する
    pub fn classify(&self, line: &str) -> LineClass {
        self.classify_gated(line, false)
    }

    /// 一行を分類する
    ///
    /// `cursor_claimed` が真の場合、カーソルに影響する規則は評価しない。
    pub fn classify_gated(&self, line: &str, cursor_claimed: bool) -> LineClass {
        RULE_ORDER
            .iter()
            .filter(|rule| !(cursor_claimed && rule.affects_cursor()))
            .find_map(|rule| self.apply(*rule, line))
            .unwrap_or(LineClass::Chatter)
    }

    /// 応答テキスト全体を走査して通知を集める
    ///
    /// 最初のブレークポイント到達以降、ブレークポイント行は無視されます。
    /// アクセス違反の行で走査は打ち切られます（以降の行は例外の詳細出力とみなす）。
    pub fn scan(&self, batch: &str) -> Vec<Notification> {
        let mut notifications = Vec::new();
        let mut cursor_claimed = false;

        for line in batch.lines() {
            let class = self.classify_gated(line, cursor_claimed);
            if class != LineClass::Chatter {
                trace!("{:?}: {}", class, line);
            }
            match class {
                LineClass::ExecutionFailure => {
                    notifications.push(Notification::ExecutionFailure(line.to_string()));
                }
                LineClass::AccessViolation => {
                    notifications.push(Notification::AccessViolation(line.to_string()));
                    break;
                }
                LineClass::BreakpointHit(number) => {
                    notifications.push(Notification::BreakpointHit {
                        number,
                        line: line.to_string(),
                    });
                    cursor_claimed = true;
                }
                LineClass::Chatter => {}
            }
        }

        notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order() {
        assert_eq!(
            RULE_ORDER,
            [Rule::ExecutionFailure, Rule::AccessViolation, Rule::BreakpointHit]
        );
        assert!(Rule::BreakpointHit.affects_cursor());
        assert!(!Rule::AccessViolation.affects_cursor());
    }

    #[test]
    fn test_classify_lines() {
        let classifier = LineClassifier::new().unwrap();
        assert_eq!(
            classifier.classify("Cannot execute 'g', target is not running"),
            LineClass::ExecutionFailure
        );
        assert_eq!(
            classifier.classify("(f3c.e18): Access violation - code c0000005 (first chance)"),
            LineClass::AccessViolation
        );
        assert_eq!(
            classifier.classify("Breakpoint 12 hit"),
            LineClass::BreakpointHit(12)
        );
        assert_eq!(
            classifier.classify(">   38:     if (!RegisterClassEx (&wincl))"),
            LineClass::Chatter
        );
    }

    #[test]
    fn test_prefix_rule_needs_line_start() {
        let classifier = LineClassifier::new().unwrap();
        assert_eq!(
            classifier.classify("note: Cannot execute here"),
            LineClass::Chatter
        );
    }

    #[test]
    fn test_execution_failure_precedes_other_rules() {
        let classifier = LineClassifier::new().unwrap();
        assert_eq!(
            classifier.classify("Cannot execute after Access violation, Breakpoint 1 hit"),
            LineClass::ExecutionFailure
        );
        assert_eq!(
            classifier.classify("Access violation near Breakpoint 1 hit"),
            LineClass::AccessViolation
        );
    }

    #[test]
    fn test_breakpoint_number_overflow_is_chatter() {
        let classifier = LineClassifier::new().unwrap();
        assert_eq!(
            classifier.classify("Breakpoint 99999999999999 hit"),
            LineClass::Chatter
        );
    }

    #[test]
    fn test_scan_keeps_first_breakpoint_only() {
        let classifier = LineClassifier::new().unwrap();
        let batch = "Breakpoint 1 hit\n>   10: foo();\nBreakpoint 2 hit";
        assert_eq!(
            classifier.scan(batch),
            vec![Notification::BreakpointHit {
                number: 1,
                line: "Breakpoint 1 hit".into()
            }]
        );
    }

    #[test]
    fn test_scan_stops_at_access_violation() {
        let classifier = LineClassifier::new().unwrap();
        let batch = "Access violation - code c0000005\nBreakpoint 3 hit\nCannot execute x";
        let notifications = classifier.scan(batch);
        assert_eq!(notifications.len(), 1);
        assert!(matches!(notifications[0], Notification::AccessViolation(_)));
    }

    #[test]
    fn test_scan_after_breakpoint_still_reports_failures() {
        let classifier = LineClassifier::new().unwrap();
        let batch = "Breakpoint 0 hit\nCannot execute foo\nAccess violation - code c0000005";
        let notifications = classifier.scan(batch);
        assert_eq!(notifications.len(), 3);
        assert!(matches!(notifications[1], Notification::ExecutionFailure(_)));
        assert!(matches!(notifications[2], Notification::AccessViolation(_)));
    }

    #[test]
    fn test_scan_handles_crlf() {
        let classifier = LineClassifier::new().unwrap();
        let notifications = classifier.scan("ModLoad: 7c900000\r\nBreakpoint 4 hit\r\n");
        assert_eq!(
            notifications,
            vec![Notification::BreakpointHit {
                number: 4,
                line: "Breakpoint 4 hit".into()
            }]
        );
    }
}
