//! 关节状态缓冲区
//!
//! 面向通用控制器框架的共享数据模型：按关节索引的平行数组
//! （struct-of-arrays），规范顺序由 [`crate::JointSet`] 持有。
//!
//! # 不变量
//!
//! 四个数组在连接时按关节数一次性定长分配，之后绝不改变长度；
//! 所有数组与后端名单保持索引对齐。

/// 按关节索引的状态数组
///
/// 角度/速度/力矩为测量值（后端单位，弧度），command 为控制器
/// 本周期计算出的目标角度。后端目前只上报角度；速度与力矩数组
/// 保留在数据模型中，始终为 0。
#[derive(Debug)]
pub struct JointStateBuffer {
    angles: Vec<f64>,
    velocities: Vec<f64>,
    efforts: Vec<f64>,
    commands: Vec<f64>,
}

impl JointStateBuffer {
    /// 按关节数定长分配（连接时调用一次）
    pub fn new(joint_count: usize) -> Self {
        Self {
            angles: vec![0.0; joint_count],
            velocities: vec![0.0; joint_count],
            efforts: vec![0.0; joint_count],
            commands: vec![0.0; joint_count],
        }
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn velocities(&self) -> &[f64] {
        &self.velocities
    }

    pub fn efforts(&self) -> &[f64] {
        &self.efforts
    }

    pub fn commands(&self) -> &[f64] {
        &self.commands
    }

    /// 灌入一批传感器角度（调用方已校验长度）
    ///
    /// 每个值同时写入测量槽和命令槽：命令槽的默认值等于当前位置，
    /// 没有外部命令时关节保持原位。
    pub(crate) fn load_sensor_values(&mut self, values: &[f32]) {
        debug_assert_eq!(values.len(), self.angles.len());
        for (i, &value) in values.iter().enumerate() {
            self.angles[i] = f64::from(value);
            self.commands[i] = f64::from(value);
        }
    }

    /// 所有关节中 `|command - measured|` 的最大值
    pub fn max_command_delta(&self) -> f64 {
        self.commands
            .iter()
            .zip(&self.angles)
            .map(|(command, measured)| (command - measured).abs())
            .fold(0.0, f64::max)
    }

    /// 借出控制器视图
    pub fn io<'a>(&'a mut self, names: &'a [String]) -> JointIo<'a> {
        JointIo {
            names,
            angles: &self.angles,
            velocities: &self.velocities,
            efforts: &self.efforts,
            commands: &mut self.commands,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_command(&mut self, index: usize, value: f64) {
        self.commands[index] = value;
    }
}

/// 通用控制器的每周期读写句柄
///
/// 测量值只读，命令槽可写；生命周期限制在一次 update 调用内，
/// 保证周期内 读 → update → 写 的顺序无法被绕过。
pub struct JointIo<'a> {
    pub names: &'a [String],
    pub angles: &'a [f64],
    pub velocities: &'a [f64],
    pub efforts: &'a [f64],
    pub commands: &'a mut [f64],
}

impl JointIo<'_> {
    pub fn joint_count(&self) -> usize {
        self.names.len()
    }
}
