//! 受控关节集
//!
//! [`JointSet`] 持有规范的关节顺序：连接时确定一次，之后所有按关节
//! 索引的数组（缓冲区、后端名单）都对齐到这个顺序。对齐是不变量，
//! 构造之后不允许任何改动。

use std::sync::Arc;

/// H21 本体上不可独立控制的关节
const H21_MIMIC_JOINTS: &[&str] = &["RHand", "LHand", "RWristYaw", "LWristYaw"];

/// 受控关节的有序集合（构造后不可变）
#[derive(Debug, Clone)]
pub struct JointSet {
    names: Arc<Vec<String>>,
}

impl JointSet {
    /// 从（已过滤的）名字列表构造；顺序即规范顺序
    pub fn from_names(names: Vec<String>) -> Self {
        Self {
            names: Arc::new(names),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// 共享名字列表（发布方持有，避免每周期克隆）
    pub fn shared_names(&self) -> Arc<Vec<String>> {
        Arc::clone(&self.names)
    }
}

/// 剔除 mimic 关节，幸存者保持相对顺序
///
/// 规则：名字含 "Wheel" 的一律剔除；本体类型为 "H21" 时再剔除
/// 手与腕偏航。相邻的命中项必须全部剔除，不允许漏删。
pub fn filter_mimic_joints(names: &mut Vec<String>, body_type: &str) {
    names.retain(|name| {
        if name.contains("Wheel") {
            return false;
        }
        if body_type == "H21" && H21_MIMIC_JOINTS.contains(&name.as_str()) {
            return false;
        }
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_wheels_always_filtered() {
        let mut joints = names(&["HeadYaw", "WheelFL", "WheelFR", "WheelB", "HeadPitch"]);
        filter_mimic_joints(&mut joints, "H25");
        assert_eq!(joints, names(&["HeadYaw", "HeadPitch"]));
    }

    #[test]
    fn test_h21_drops_hands_and_wrists() {
        let mut joints = names(&["LElbowRoll", "LWristYaw", "LHand", "RWristYaw", "RHand"]);
        filter_mimic_joints(&mut joints, "H21");
        assert_eq!(joints, names(&["LElbowRoll"]));
    }

    #[test]
    fn test_h25_keeps_hands_and_wrists() {
        let mut joints = names(&["LWristYaw", "LHand", "RWristYaw", "RHand"]);
        filter_mimic_joints(&mut joints, "H25");
        assert_eq!(joints.len(), 4);
    }

    #[test]
    fn test_adjacent_matches_all_dropped() {
        // 连续命中也必须全部剔除，不允许漏删
        let mut joints = names(&["WheelFL", "WheelFR", "WheelB", "HeadYaw"]);
        filter_mimic_joints(&mut joints, "H25");
        assert_eq!(joints, names(&["HeadYaw"]));
    }

    #[test]
    fn test_survivor_order_preserved() {
        let mut joints = names(&["A", "WheelX", "B", "WheelY", "C"]);
        filter_mimic_joints(&mut joints, "H25");
        assert_eq!(joints, names(&["A", "B", "C"]));
    }
}
