//! 传感器内存读取契约（ALMemory 语义）

use crate::Result;

/// 传感器内存后端
///
/// 机器人把执行器的传感器值写入共享内存；驱动核心每个周期
/// 批量读取一次。后端以 `f32` 上报，缓冲区以 `f64` 存储，
/// 拓宽转换发生在驱动核心的读取器中。
pub trait MemoryBackend: Send {
    /// 以受控关节集订阅对应的传感器键（每次连接一次，幂等）
    fn init(&self, joint_names: &[String]) -> Result<()>;

    /// 批量读取全部受控关节的当前角度
    ///
    /// 返回序列必须与 `init` 传入的关节顺序一致。长度是否等于
    /// 受控关节数由调用方校验，后端不保证（已观测到短读）。
    fn read_all_angles(&self) -> Result<Vec<f32>>;

    /// 读取机器人本体类型（如 "H25"、"H21"）
    fn body_type(&self) -> Result<String>;
}
