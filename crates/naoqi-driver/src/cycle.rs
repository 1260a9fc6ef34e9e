//! 固定频率控制循环
//!
//! 周期体（Connected 期间按配置频率执行）：
//!
//! 1. 取时间戳；观察到 Disconnected 则在任何后端 I/O 之前干净退出
//! 2. 发布当前刚度值
//! 3. 批量读取传感器（读必须完整结束才进入 update）
//! 4. 诊断发布；not-ok 触发有序停机（下一轮循环顶端退出）
//! 5. 通用控制器 update(now, period)；失败对本次运行致命
//! 6. 变化检测 + 命令写入；后端写失败同样致命
//! 7. 发布关节状态快照
//! 8. spin-sleep 到周期剩余时间
//!
//! 取消信号只有 Disconnected 转换，每轮检查一次；进行中的后端调用
//! 不被打断、不设超时；后端挂起会停住整个循环（已知限制）。

use std::time::{Duration, Instant};

use spin_sleep::SpinSleeper;
use tracing::{error, info, warn};

use crate::controller::Controller;
use crate::lifecycle::Robot;
use crate::{DriverError, Result};

/// 循环退出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleExit {
    /// 外部触发的断开（stop_service）
    Disconnected,
    /// 诊断 not-ok 引发的有序停机
    DiagnosticsStop,
    /// 达到测试/限时运行设定的周期数
    CycleLimit,
}

/// 固定频率循环驱动器
pub struct ControlCycle {
    period: Duration,
    sleeper: SpinSleeper,
    max_cycles: Option<u64>,
}

impl ControlCycle {
    /// 按控制频率（Hz）创建
    pub fn new(frequency_hz: f64) -> Result<Self> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(DriverError::Config(format!(
                "controller frequency must be > 0, got {frequency_hz}"
            )));
        }
        if frequency_hz > 1000.0 {
            warn!("very high controller frequency: {frequency_hz} Hz");
        }
        Ok(Self {
            period: Duration::from_secs_f64(1.0 / frequency_hz),
            sleeper: SpinSleeper::default(),
            max_cycles: None,
        })
    }

    /// 限制运行周期数（测试或定时运行）
    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = Some(max_cycles);
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// 阻塞运行，直到断开、诊断停机、周期数耗尽或致命错误
    ///
    /// 周期内顺序保证：读完整结束 → update → 写；上一周期的写发出
    /// 之前不会开始下一周期（单线程顺序执行，天然成立）。
    pub fn run<C: Controller>(&self, robot: &mut Robot, controller: &mut C) -> Result<CycleExit> {
        let mut cycles: u64 = 0;
        let mut diagnostics_stop = false;

        loop {
            if let Some(max) = self.max_cycles
                && cycles >= max
            {
                return Ok(CycleExit::CycleLimit);
            }

            let cycle_start = Instant::now();

            // 断开检查：之后不再发生任何后端 I/O
            if !robot.is_connected() {
                info!("shutting down the main loop");
                return Ok(if diagnostics_stop {
                    CycleExit::DiagnosticsStop
                } else {
                    CycleExit::Disconnected
                });
            }

            robot.publish_stiffness();

            robot.read_sensors()?;

            if !robot.publish_diagnostics() {
                warn!("diagnostics reported not-ok, stopping the service");
                robot.stop_service();
                diagnostics_stop = true;
                cycles += 1;
                continue;
            }

            if let Err(e) = robot.update_controller(controller, cycle_start, self.period) {
                error!("controller update failed, terminating the loop: {e}");
                return Err(e);
            }

            robot.write_commands().map_err(|e| {
                error!("joint command write failed, terminating the loop: {e}");
                e
            })?;

            robot.publish_joint_state();

            cycles += 1;

            let elapsed = cycle_start.elapsed();
            if elapsed < self.period {
                self.sleeper.sleep(self.period - elapsed);
            }
        }
    }
}
