//! 通用控制器接缝
//!
//! 控制器框架对核心是不透明协作方：核心每周期调用一次
//! [`Controller::update`]，把缓冲区的读写句柄、当前时间戳和周期
//! 交给它。update 失败对本次运行是致命的（记日志并终止循环）。

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::buffer::JointIo;

/// 控制器 update 错误（周期致命）
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ControllerError {
    pub message: String,
}

impl ControllerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 每周期被调用一次的通用控制器
pub trait Controller {
    /// 读取测量值、写入命令槽
    ///
    /// 调用时缓冲区的测量值已是本周期的传感器采样；命令槽预置为
    /// 当前位置（保持原位默认值）。
    fn update(
        &mut self,
        io: JointIo<'_>,
        now: Instant,
        period: Duration,
    ) -> Result<(), ControllerError>;
}

/// 什么都不做的控制器：命令槽保持传感器预置值，机器人保持原位
pub struct HoldPosition;

impl Controller for HoldPosition {
    fn update(
        &mut self,
        _io: JointIo<'_>,
        _now: Instant,
        _period: Duration,
    ) -> Result<(), ControllerError> {
        Ok(())
    }
}
