//! # naoqi-backend
//!
//! NAOqi 机器人本体后端的窄接口契约层。
//!
//! 驱动核心（`naoqi-driver`）只通过三个窄接口访问机器人：
//!
//! - [`MotionBackend`]：高层运动通道（ALMotion 语义）。唤醒、刚度插值、
//!   关节名解析、角度读取、关节命令写入、底盘速度移动、rest 姿态
//! - [`DcmBackend`]：低层直写通道（DCM 语义）。绕过运动仲裁，
//!   与高层通道在刚度上互斥
//! - [`MemoryBackend`]：传感器内存读取（ALMemory 语义）。
//!   批量读取执行器当前角度
//!
//! 真实的会话层（qi 消息、网络连接）不在本 crate 范围内；
//! 这里只定义调用语义和错误类型，由上层注入具体实现。
//!
//! # Mock 模式
//!
//! 启用 `mock` feature 后，[`mock::MockRobot`] 提供一个确定性的
//! 进程内机器人实现，用于无硬件测试（记录调用序列、可注入故障）。

mod error;
pub mod dcm;
pub mod memory;
pub mod motion;

#[cfg(feature = "mock")]
pub mod mock;

pub use dcm::DcmBackend;
pub use error::BackendError;
pub use memory::MemoryBackend;
pub use motion::MotionBackend;

/// 后端调用统一的 Result 别名
pub type Result<T> = std::result::Result<T, BackendError>;
