//! コマンドキュー
//!
//! 送信中のコマンドは常に高々一つです。先頭のコマンドの応答が解析されて
//! 取り除かれるまで、次のコマンドは送られません。

use crate::command::{Command, CommandKind};
use crate::errors::DriverError;
use crate::frontend::Transport;
use crate::Result;
use std::collections::VecDeque;
use tracing::debug;

/// キューへの積み方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// 末尾に積む
    Low,
    /// 先頭に積む（送信中のコマンドがあればその直後）
    High,
}

/// `dispatch` の結果
#[derive(Debug)]
pub enum Dispatch {
    /// 送信中か、キューが空
    Idle,
    /// 先頭のコマンドを送信した
    Sent,
    /// 送信テキストを持たない先頭コマンドを取り出した
    Action(Command),
}

/// コマンドキュー
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
    busy: bool,
    next_ordinal: u64,
}

impl CommandQueue {
    /// 新しいコマンドキューを作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// コマンドを末尾に積む
    pub fn enqueue(&mut self, kind: CommandKind) -> u64 {
        self.enqueue_with(kind, Priority::Low)
    }

    /// 優先度を指定してコマンドを積む
    ///
    /// # Returns
    /// 発行順の通し番号
    pub fn enqueue_with(&mut self, kind: CommandKind, priority: Priority) -> u64 {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        let cmd = Command::new(kind, ordinal);

        match priority {
            Priority::Low => self.pending.push_back(cmd),
            // 送信済みの先頭は追い越さない
            Priority::High if self.busy && !self.pending.is_empty() => {
                self.pending.insert(1, cmd)
            }
            Priority::High => self.pending.push_front(cmd),
        }
        ordinal
    }

    /// 先頭のコマンド
    pub fn current(&self) -> Option<&Command> {
        self.pending.front()
    }

    /// 先頭のコマンドを取り除く
    pub fn remove_top(&mut self, still_busy: bool) -> Option<Command> {
        self.busy = still_busy;
        self.pending.pop_front()
    }

    /// 送信中のコマンドがあるか
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// 送信中フラグを設定する
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// 積まれているコマンド数（送信中のものを含む）
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// 積まれているコマンドを先頭から列挙する
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.pending.iter()
    }

    /// 未送信のコマンドをすべて破棄する
    pub fn clear(&mut self) {
        self.pending.clear();
        self.busy = false;
    }

    /// 送信中でなければ先頭のコマンドを送る
    pub fn dispatch(&mut self, transport: &mut dyn Transport) -> Result<Dispatch> {
        if self.busy {
            return Ok(Dispatch::Idle);
        }
        let Some(head) = self.pending.front() else {
            return Ok(Dispatch::Idle);
        };

        if head.is_placeholder_only() {
            return Ok(self
                .pending
                .pop_front()
                .map_or(Dispatch::Idle, Dispatch::Action));
        }

        debug!("Sending command #{}: {}", head.issued_at(), head.text());
        transport
            .send(head.text())
            .map_err(|source| DriverError::Transport {
                command: head.text().to_string(),
                source,
            })?;
        self.busy = true;
        Ok(Dispatch::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Wire {
        sent: Vec<String>,
    }

    impl Transport for Wire {
        fn send(&mut self, text: &str) -> Result<()> {
            self.sent.push(text.to_string());
            Ok(())
        }
    }

    struct Broken;

    impl Transport for Broken {
        fn send(&mut self, _text: &str) -> Result<()> {
            anyhow::bail!("pipe closed")
        }
    }

    #[test]
    fn test_dispatch_one_at_a_time() {
        let mut queue = CommandQueue::new();
        let mut wire = Wire::default();
        queue.enqueue(CommandKind::Plain("l+t".into()));
        queue.enqueue(CommandKind::Plain("g".into()));

        assert!(matches!(queue.dispatch(&mut wire).unwrap(), Dispatch::Sent));
        assert!(queue.is_busy());
        assert!(matches!(queue.dispatch(&mut wire).unwrap(), Dispatch::Idle));
        assert_eq!(wire.sent, vec!["l+t"]);

        let done = queue.remove_top(false).unwrap();
        assert_eq!(done.text(), "l+t");
        assert!(matches!(queue.dispatch(&mut wire).unwrap(), Dispatch::Sent));
        assert_eq!(wire.sent, vec!["l+t", "g"]);
    }

    #[test]
    fn test_placeholder_is_not_sent() {
        let mut queue = CommandQueue::new();
        let mut wire = Wire::default();
        queue.enqueue(CommandKind::UpdateWatchesTree);

        match queue.dispatch(&mut wire).unwrap() {
            Dispatch::Action(cmd) => assert_eq!(cmd.kind(), &CommandKind::UpdateWatchesTree),
            other => panic!("unexpected {:?}", other),
        }
        assert!(wire.sent.is_empty());
        assert!(queue.is_empty());
        assert!(!queue.is_busy());
    }

    #[test]
    fn test_high_priority_does_not_overtake_in_flight() {
        let mut queue = CommandQueue::new();
        let mut wire = Wire::default();
        queue.enqueue(CommandKind::DisassemblyInit);
        queue.enqueue(CommandKind::InfoRegisters);
        queue.dispatch(&mut wire).unwrap();

        queue.enqueue_with(CommandKind::Disassembly("app!main".into()), Priority::High);
        let texts: Vec<_> = queue.iter().map(|c| c.text().to_string()).collect();
        assert_eq!(texts, vec!["k n 1", "uf app!main", "r"]);
    }

    #[test]
    fn test_ordinals_increase() {
        let mut queue = CommandQueue::new();
        assert_eq!(queue.enqueue(CommandKind::InfoLocals), 0);
        assert_eq!(queue.enqueue(CommandKind::InfoRegisters), 1);
        assert_eq!(queue.current().unwrap().issued_at(), 0);
    }

    #[test]
    fn test_send_failure_keeps_command() {
        let mut queue = CommandQueue::new();
        queue.enqueue(CommandKind::Plain("g".into()));
        let err = queue.dispatch(&mut Broken).unwrap_err();
        assert!(err.to_string().contains("pipe closed"));
        let source = err
            .downcast_ref::<DriverError>()
            .and_then(<DriverError as std::error::Error>::source)
            .unwrap();
        assert_eq!(source.to_string(), "pipe closed");
        assert!(!queue.is_busy());
        assert_eq!(queue.len(), 1);
    }
}
