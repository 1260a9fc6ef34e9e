//! 传感器读取器
//!
//! 每周期把后端上报的最新执行器角度灌入缓冲区，一次批量调用。

use std::sync::Arc;

use naoqi_backend::MemoryBackend;
use tracing::error;

use crate::buffer::JointStateBuffer;
use crate::{DriverError, Result};

/// 每周期一次的批量传感器读取
pub struct SensorReader {
    memory: Arc<dyn MemoryBackend + Sync>,
}

impl SensorReader {
    pub fn new(memory: Arc<dyn MemoryBackend + Sync>) -> Self {
        Self { memory }
    }

    /// 读取全部受控关节的当前角度并写入缓冲区
    ///
    /// 每个值同时进入测量槽和命令槽（保持原位默认值）。
    /// 后端返回的数量与关节数不符时立即失败，缓冲区保持原样，
    /// 绝不写入错位的部分数据。
    pub fn read(&self, buffer: &mut JointStateBuffer) -> Result<()> {
        let values = self.memory.read_all_angles()?;

        if values.len() != buffer.len() {
            error!(
                expected = buffer.len(),
                actual = values.len(),
                "backend returned a mismatched sensor batch, refusing to store it"
            );
            return Err(DriverError::SensorCountMismatch {
                expected: buffer.len(),
                actual: values.len(),
            });
        }

        buffer.load_sensor_values(&values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use naoqi_backend::mock::MockRobot;

    fn reader_for(robot: &MockRobot, joints: &[&str]) -> SensorReader {
        let names: Vec<String> = joints.iter().map(|s| s.to_string()).collect();
        MemoryBackend::init(robot, &names).unwrap();
        SensorReader::new(Arc::new(robot.clone()))
    }

    #[test]
    fn test_read_fills_measured_and_command_slots() {
        let robot = MockRobot::new();
        let reader = reader_for(&robot, &["HeadYaw", "HeadPitch"]);
        robot.set_angle("HeadYaw", 0.3);
        robot.set_angle("HeadPitch", -0.1);

        let mut buffer = JointStateBuffer::new(2);
        reader.read(&mut buffer).unwrap();

        assert!((buffer.angles()[0] - 0.3).abs() < 1e-6);
        assert!((buffer.commands()[0] - 0.3).abs() < 1e-6);
        assert!((buffer.angles()[1] + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_short_read_fails_and_leaves_buffer_untouched() {
        let robot = MockRobot::new();
        let reader = reader_for(&robot, &["HeadYaw", "HeadPitch"]);
        robot.set_angle("HeadYaw", 0.7);

        let mut buffer = JointStateBuffer::new(2);
        robot.short_read(true);

        let err = reader.read(&mut buffer).unwrap_err();
        assert!(matches!(
            err,
            DriverError::SensorCountMismatch {
                expected: 2,
                actual: 1
            }
        ));
        // 缓冲区保持原样
        assert_eq!(buffer.angles(), &[0.0, 0.0]);
        assert_eq!(buffer.commands(), &[0.0, 0.0]);
    }
}
