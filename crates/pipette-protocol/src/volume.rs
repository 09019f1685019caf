//! 体积换算
//!
//! 液体体积（uL）与柱塞直线位移（mm）之间的线性换算，纯函数。

/// 体积 ↔ 柱塞位移换算器
///
/// `displacement = volume * k`，`k` 为配置中的 `mm_to_ul`。
/// 允许负体积：吸液时由调用方取负号得到回抽方向的位移。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeConverter {
    factor: f64,
}

impl VolumeConverter {
    /// 使用换算系数创建（系数由 `PipetteConfig::validate` 保证 > 0）
    pub const fn new(factor: f64) -> Self {
        Self { factor }
    }

    /// 换算系数（mm/uL）
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// 体积 → 柱塞位移
    #[inline]
    pub fn volume_to_displacement(&self, volume_ul: f64) -> f64 {
        volume_ul * self.factor
    }

    /// 柱塞位移 → 体积
    #[inline]
    pub fn displacement_to_volume(&self, displacement_mm: f64) -> f64 {
        displacement_mm / self.factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_p300_scenario() {
        let converter = VolumeConverter::new(0.1);
        assert!((converter.volume_to_displacement(100.0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_volume() {
        let converter = VolumeConverter::new(0.37);
        assert_eq!(converter.volume_to_displacement(0.0), 0.0);
    }

    #[test]
    fn test_negative_volume_is_signed() {
        let converter = VolumeConverter::new(0.1);
        assert!((converter.volume_to_displacement(-50.0) + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse() {
        let converter = VolumeConverter::new(0.25);
        assert!((converter.displacement_to_volume(5.0) - 20.0).abs() < 1e-12);
    }

    proptest! {
        /// 线性：f(2v) == 2 f(v)
        #[test]
        fn prop_linear(v in -1.0e4f64..1.0e4, k in 1.0e-3f64..10.0) {
            let converter = VolumeConverter::new(k);
            let single = converter.volume_to_displacement(v);
            let double = converter.volume_to_displacement(2.0 * v);
            prop_assert!((double - 2.0 * single).abs() <= 1e-9 * (1.0 + double.abs()));
        }
    }
}
