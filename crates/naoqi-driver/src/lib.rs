//! # naoqi-driver
//!
//! 通用关节控制器框架与 NAOqi 原生运动后端之间的实时桥接核心。
//!
//! 每个周期做的事情是固定的：采样执行器传感器状态 → 交给通用控制器
//! 做一次 update → 检测命令是否有实质变化 → 只把变化了的命令写回
//! 后端。除此之外还负责关节集同步、刚度/安全协调、连接生命周期。
//!
//! # 数据流（每半个周期单向）
//!
//! ```text
//! backend ─▶ SensorReader ─▶ JointStateBuffer ─▶ Controller::update
//!                                   │
//!                                   ▼ (commands)
//! backend ◀─ CommandWriter ◀─ JointStateBuffer
//! ```
//!
//! # 线程模型
//!
//! 单线程协作式：一个控制线程驱动固定频率的周期，周期内没有并行。
//! 后端调用同步阻塞，不设超时。外部异步到达的速度命令统一经过
//! [`stiffness::StiffnessCoordinator`]（单写者），不直接触碰后端。
//!
//! # 快速上手
//!
//! ```rust,ignore
//! use naoqi_driver::prelude::*;
//!
//! let config = DriverConfig::default().normalized();
//! let frequency = config.controller_frequency;
//! let mut robot = Robot::connect(config, backends, publisher, diagnostics)?;
//! let cycle = ControlCycle::new(frequency)?;
//! cycle.run(&mut robot, &mut HoldPosition)?;
//! ```

pub mod buffer;
pub mod config;
pub mod controller;
pub mod cycle;
mod error;
pub mod joints;
pub mod lifecycle;
pub mod publish;
pub mod reader;
pub mod stiffness;
pub mod writer;

pub use buffer::{JointIo, JointStateBuffer};
pub use config::DriverConfig;
pub use controller::{Controller, ControllerError, HoldPosition};
pub use cycle::{ControlCycle, CycleExit};
pub use error::{ConnectFailure, DriverError};
pub use joints::JointSet;
pub use lifecycle::{Backends, ConnectionState, Robot};
pub use publish::{Diagnostics, JointStateSnapshot, StatePublisher};
pub use stiffness::StiffnessCoordinator;
pub use writer::WritePath;

/// 驱动核心统一的 Result 别名
pub type Result<T> = std::result::Result<T, DriverError>;

pub mod prelude {
    //! 常用类型一站式导入
    pub use crate::{
        Backends, ConnectionState, ControlCycle, Controller, CycleExit, DriverConfig, DriverError,
        HoldPosition, JointStateBuffer, Robot, WritePath,
    };
}
