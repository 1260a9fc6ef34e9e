//! 发布侧协作方
//!
//! 关节状态快照、刚度值、诊断状态都是 fire-and-forget：核心不等待
//! 消费方，也不接受背压。通道实现用 `try_send`，满了就丢：
//! 一个迟到的订阅者不允许拖慢控制循环。

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwapOption;
use crossbeam_channel::{Receiver, Sender, bounded};
use tracing::trace;

/// 全身关节状态快照（名字与位置同序）
#[derive(Debug, Clone)]
pub struct JointStateSnapshot {
    pub stamp: Instant,
    pub names: Arc<Vec<String>>,
    pub positions: Vec<f64>,
}

/// 状态发布方（fire-and-forget，不得阻塞控制循环）
pub trait StatePublisher: Send {
    fn publish_stiffness(&self, level: f32);
    fn publish_joint_state(&self, snapshot: JointStateSnapshot);
}

/// 诊断协作方
///
/// 每周期被调用一次；返回 `false` 表示机器人状态不健康，
/// 控制循环据此触发有序停机（降刚度 + rest），而不是崩溃。
pub trait Diagnostics: Send {
    fn publish(&mut self) -> bool;
}

/// 不发布任何东西（测试与裸跑）
pub struct NullPublisher;

impl StatePublisher for NullPublisher {
    fn publish_stiffness(&self, _level: f32) {}
    fn publish_joint_state(&self, _snapshot: JointStateSnapshot) {}
}

/// 永远健康的诊断桩
pub struct AlwaysOkDiagnostics;

impl Diagnostics for AlwaysOkDiagnostics {
    fn publish(&mut self) -> bool {
        true
    }
}

/// 基于通道的发布器
///
/// 每类消息一条有界通道；同时用 arc-swap 缓存最新快照，
/// 供监视端零拷贝读取（不消费通道）。
pub struct ChannelPublisher {
    stiffness_tx: Sender<f32>,
    joint_state_tx: Sender<JointStateSnapshot>,
    latest: Arc<ArcSwapOption<JointStateSnapshot>>,
}

/// `ChannelPublisher` 的消费端
pub struct PublishReceivers {
    pub stiffness_rx: Receiver<f32>,
    pub joint_state_rx: Receiver<JointStateSnapshot>,
}

impl ChannelPublisher {
    /// 创建发布器与消费端，`queue` 为每条通道的容量
    pub fn new(queue: usize) -> (Self, PublishReceivers) {
        let (stiffness_tx, stiffness_rx) = bounded(queue);
        let (joint_state_tx, joint_state_rx) = bounded(queue);
        (
            Self {
                stiffness_tx,
                joint_state_tx,
                latest: Arc::new(ArcSwapOption::const_empty()),
            },
            PublishReceivers {
                stiffness_rx,
                joint_state_rx,
            },
        )
    }

    /// 最新快照的只读句柄
    pub fn latest(&self) -> Arc<ArcSwapOption<JointStateSnapshot>> {
        Arc::clone(&self.latest)
    }
}

impl StatePublisher for ChannelPublisher {
    fn publish_stiffness(&self, level: f32) {
        if self.stiffness_tx.try_send(level).is_err() {
            trace!("stiffness channel full, dropping sample");
        }
    }

    fn publish_joint_state(&self, snapshot: JointStateSnapshot) {
        self.latest.store(Some(Arc::new(snapshot.clone())));
        if self.joint_state_tx.try_send(snapshot).is_err() {
            trace!("joint state channel full, dropping snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(positions: Vec<f64>) -> JointStateSnapshot {
        JointStateSnapshot {
            stamp: Instant::now(),
            names: Arc::new(vec!["HeadYaw".to_string()]),
            positions,
        }
    }

    #[test]
    fn test_channel_publisher_delivers() {
        let (publisher, receivers) = ChannelPublisher::new(4);
        publisher.publish_stiffness(1.0);
        publisher.publish_joint_state(snapshot(vec![0.5]));

        assert_eq!(receivers.stiffness_rx.recv().unwrap(), 1.0);
        assert_eq!(receivers.joint_state_rx.recv().unwrap().positions, vec![0.5]);
    }

    #[test]
    fn test_full_channel_drops_instead_of_blocking() {
        let (publisher, receivers) = ChannelPublisher::new(1);
        publisher.publish_stiffness(0.1);
        publisher.publish_stiffness(0.2); // 满，丢弃

        assert_eq!(receivers.stiffness_rx.recv().unwrap(), 0.1);
        assert!(receivers.stiffness_rx.try_recv().is_err());
    }

    #[test]
    fn test_latest_cache_tracks_newest_snapshot() {
        let (publisher, _receivers) = ChannelPublisher::new(1);
        let latest = publisher.latest();
        assert!(latest.load().is_none());

        publisher.publish_joint_state(snapshot(vec![0.1]));
        publisher.publish_joint_state(snapshot(vec![0.2])); // 通道满，但缓存仍更新

        let cached = latest.load();
        assert_eq!(cached.as_ref().unwrap().positions, vec![0.2]);
    }
}
