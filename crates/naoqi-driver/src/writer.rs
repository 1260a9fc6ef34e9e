//! 命令写入器与变化检测
//!
//! 后端写入调用昂贵且带宽受限，不能每周期无脑下发。写入器逐关节
//! 比较控制器刚算出的命令与最近一次测量角度，只有最大偏差超过
//! 配置阈值时才把整组命令推给后端。
//!
//! 执行通道（高层 Motion / 低层 DCM）在连接时一次性选定，
//! 连接期间绝不切换。

use std::sync::Arc;

use naoqi_backend::{DcmBackend, MotionBackend};
use tracing::trace;

use crate::buffer::JointStateBuffer;
use crate::Result;

/// 执行通道标识
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePath {
    /// 高层运动通道（默认）
    Motion,
    /// 低层 DCM 直写通道
    Dcm,
}

/// 连接时选定的写入通道（持有对应后端）
pub(crate) enum WriteChannel {
    Motion(Arc<dyn MotionBackend + Sync>),
    Dcm(Arc<dyn DcmBackend + Sync>),
}

/// 带变化检测的命令写入器
pub struct CommandWriter {
    channel: WriteChannel,
    precision: f64,
}

impl CommandWriter {
    pub(crate) fn new(channel: WriteChannel, precision: f64) -> Self {
        Self { channel, precision }
    }

    pub fn path(&self) -> WritePath {
        match self.channel {
            WriteChannel::Motion(_) => WritePath::Motion,
            WriteChannel::Dcm(_) => WritePath::Dcm,
        }
    }

    /// 有实质变化时写入整组命令
    ///
    /// 返回本周期是否真的写了后端。所有偏差都不超过阈值（含全零）
    /// 时不写且不算错误。
    pub fn write_if_changed(&self, buffer: &JointStateBuffer) -> Result<bool> {
        let max_delta = buffer.max_command_delta();
        if max_delta <= self.precision {
            return Ok(false);
        }
        trace!(max_delta, "joint commands changed, pushing to backend");

        match &self.channel {
            WriteChannel::Motion(motion) => motion.write_commands(buffer.commands())?,
            WriteChannel::Dcm(dcm) => dcm.write_commands(buffer.commands())?,
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use naoqi_backend::mock::{MockEvent, MockRobot};

    fn setup(precision: f64) -> (MockRobot, CommandWriter, JointStateBuffer) {
        let robot = MockRobot::new();
        let names = vec!["HeadYaw".to_string(), "HeadPitch".to_string()];
        MotionBackend::init(&robot, &names).unwrap();
        let writer = CommandWriter::new(
            WriteChannel::Motion(Arc::new(robot.clone())),
            precision,
        );
        let buffer = JointStateBuffer::new(2);
        (robot, writer, buffer)
    }

    #[test]
    fn test_write_when_one_joint_exceeds_precision() {
        let (robot, writer, mut buffer) = setup(0.1);
        // measured = [0, 0], commands = [0.05, 0.2] → max diff 0.2 > 0.1
        buffer.set_command(0, 0.05);
        buffer.set_command(1, 0.2);

        assert!(writer.write_if_changed(&buffer).unwrap());
        assert_eq!(
            robot.events(),
            vec![MockEvent::MotionWrite(vec![0.05, 0.2])]
        );
    }

    #[test]
    fn test_no_write_when_all_below_precision() {
        let (robot, writer, mut buffer) = setup(0.1);
        buffer.set_command(0, 0.05);
        buffer.set_command(1, 0.05);

        assert!(!writer.write_if_changed(&buffer).unwrap());
        assert!(robot.events().is_empty());
    }

    #[test]
    fn test_all_zero_diffs_is_not_an_error() {
        let (robot, writer, buffer) = setup(0.1);
        assert!(!writer.write_if_changed(&buffer).unwrap());
        assert!(robot.events().is_empty());
    }

    #[test]
    fn test_dcm_channel_writes_dcm_backend() {
        let robot = MockRobot::new();
        let names = vec!["HeadYaw".to_string()];
        DcmBackend::init(&robot, &names).unwrap();
        let writer = CommandWriter::new(WriteChannel::Dcm(Arc::new(robot.clone())), 0.1);
        assert_eq!(writer.path(), WritePath::Dcm);

        let mut buffer = JointStateBuffer::new(1);
        buffer.set_command(0, 0.5);
        assert!(writer.write_if_changed(&buffer).unwrap());
        assert_eq!(robot.events(), vec![MockEvent::DcmWrite(vec![0.5])]);
    }

    #[test]
    fn test_write_failure_propagates() {
        let (robot, writer, mut buffer) = setup(0.1);
        buffer.set_command(0, 1.0);
        robot.fail_writes(true);
        assert!(writer.write_if_changed(&buffer).is_err());
    }
}
