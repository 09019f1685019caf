//! 实验耗材（labware）坐标接口
//!
//! 移液器不关心孔板、吸头架的建模方式，只通过 [`LabwareDirectory`]
//! 查询孔的几何信息，并按以下规则把位置描述解析为坐标：
//!
//! | 位置描述 | 解析结果 | 记录当前孔 |
//! |---------|---------|-----------|
//! | `Location::Well` | 孔底 (x, y, z) | 是 |
//! | `Location::InWell` | 给定点 | 是 |
//! | `Location::Point` | 给定点 | 否 |

use pipette_protocol::Point3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 耗材错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LabwareError {
    /// 未知耗材
    #[error("Unknown labware: {0}")]
    UnknownLabware(String),

    /// 未知孔
    #[error("Unknown well: {0}")]
    UnknownWell(WellRef),

    /// 孔引用格式错误（应为 `labware/well`）
    #[error("Invalid well reference '{0}', expected 'labware/well'")]
    InvalidWellRef(String),

    /// 孔阵行数超出 A-Z
    #[error("Grid has {rows} rows, at most {max} (A-Z) are supported", max = MAX_GRID_ROWS)]
    TooManyRows { rows: u8 },
}

/// 孔阵最多行数（行名 A-Z）
pub const MAX_GRID_ROWS: u8 = 26;

/// 孔引用：耗材名 + 孔名
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WellRef {
    pub labware: String,
    pub well: String,
}

impl WellRef {
    pub fn new(labware: impl Into<String>, well: impl Into<String>) -> Self {
        Self {
            labware: labware.into(),
            well: well.into(),
        }
    }
}

impl fmt::Display for WellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.labware, self.well)
    }
}

impl FromStr for WellRef {
    type Err = LabwareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((labware, well)) if !labware.is_empty() && !well.is_empty() => {
                Ok(WellRef::new(labware, well))
            },
            _ => Err(LabwareError::InvalidWellRef(s.to_string())),
        }
    }
}

/// 孔的几何信息（甲板坐标，mm）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WellGeometry {
    /// 孔中心 x
    pub x: f64,
    /// 孔中心 y
    pub y: f64,
    /// 孔底 z
    pub z: f64,
    /// 孔顶 z
    pub top: f64,
    /// 孔径
    pub diameter: f64,
}

impl WellGeometry {
    /// 孔底中心
    pub fn bottom(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }

    /// 搅拌半径：避开孔壁
    pub fn stir_radius(&self) -> f64 {
        self.diameter / 2.0 - self.diameter / 6.0
    }
}

/// 位置描述
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Location {
    /// 孔本身（解析为孔底）
    Well(WellRef),
    /// 孔内的显式坐标
    InWell { well: WellRef, point: Point3 },
    /// 裸坐标
    Point(Point3),
}

impl Location {
    /// 孔位置
    pub fn well(labware: impl Into<String>, well: impl Into<String>) -> Self {
        Location::Well(WellRef::new(labware, well))
    }

    /// 裸坐标
    pub fn point(x: f64, y: f64, z: f64) -> Self {
        Location::Point(Point3::new(x, y, z))
    }

    /// 所引用的孔
    pub fn well_ref(&self) -> Option<&WellRef> {
        match self {
            Location::Well(well) | Location::InWell { well, .. } => Some(well),
            Location::Point(_) => None,
        }
    }
}

impl From<WellRef> for Location {
    fn from(well: WellRef) -> Self {
        Location::Well(well)
    }
}

impl From<Point3> for Location {
    fn from(point: Point3) -> Self {
        Location::Point(point)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Well(well) => write!(f, "{well}"),
            Location::InWell { well, point } => {
                write!(f, "{well}@({}, {}, {})", point.x, point.y, point.z)
            },
            Location::Point(p) => write!(f, "({}, {}, {})", p.x, p.y, p.z),
        }
    }
}

/// 当前所在的孔（位置上下文）
#[derive(Debug, Clone, PartialEq)]
pub struct WellContext {
    pub well: WellRef,
    pub geometry: WellGeometry,
}

/// 解析后的位置
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// 运动目标点
    pub point: Point3,
    /// 关联的孔（裸坐标为 None）
    pub well: Option<WellContext>,
    /// 是否由孔本身解析而来（而非显式坐标）
    pub bare_well: bool,
}

/// 耗材目录
pub trait LabwareDirectory {
    /// 查询孔的几何信息
    fn well(&self, well: &WellRef) -> Result<WellGeometry, LabwareError>;

    /// 把位置描述解析为坐标
    fn resolve(&self, location: &Location) -> Result<ResolvedLocation, LabwareError> {
        match location {
            Location::Well(well) => {
                let geometry = self.well(well)?;
                Ok(ResolvedLocation {
                    point: geometry.bottom(),
                    well: Some(WellContext {
                        well: well.clone(),
                        geometry,
                    }),
                    bare_well: true,
                })
            },
            Location::InWell { well, point } => {
                let geometry = self.well(well)?;
                Ok(ResolvedLocation {
                    point: *point,
                    well: Some(WellContext {
                        well: well.clone(),
                        geometry,
                    }),
                    bare_well: false,
                })
            },
            Location::Point(point) => Ok(ResolvedLocation {
                point: *point,
                well: None,
                bare_well: false,
            }),
        }
    }
}

impl<T: LabwareDirectory + ?Sized> LabwareDirectory for &T {
    fn well(&self, well: &WellRef) -> Result<WellGeometry, LabwareError> {
        (**self).well(well)
    }
}

/// 内存中的甲板
///
/// 每个耗材保存按插入顺序排列的孔，供测试和 dry-run 使用。
///
/// ```rust
/// use pipette_client::labware::{Deck, GridLayout, LabwareDirectory, WellRef};
///
/// let mut deck = Deck::new();
/// deck.add_grid("plate", &GridLayout {
///     rows: 8,
///     columns: 12,
///     a1_x: 10.0,
///     a1_y: 80.0,
///     pitch: 9.0,
///     bottom_z: 5.0,
///     depth: 10.0,
///     diameter: 6.4,
/// })
/// .unwrap();
///
/// let b2 = deck.well(&WellRef::new("plate", "B2")).unwrap();
/// assert_eq!((b2.x, b2.y), (19.0, 71.0));
/// assert_eq!(deck.wells("plate").len(), 96);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Deck {
    labware: Vec<(String, Vec<(String, WellGeometry)>)>,
}

/// 规则孔阵布局
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridLayout {
    pub rows: u8,
    pub columns: u8,
    /// A1 中心 x
    pub a1_x: f64,
    /// A1 中心 y
    pub a1_y: f64,
    /// 孔间距（行列相同）
    pub pitch: f64,
    pub bottom_z: f64,
    pub depth: f64,
    pub diameter: f64,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加单个孔
    pub fn add_well(&mut self, labware: &str, well: &str, geometry: WellGeometry) {
        let wells = match self.labware.iter_mut().position(|(name, _)| name == labware) {
            Some(index) => &mut self.labware[index].1,
            None => {
                self.labware.push((labware.to_string(), Vec::new()));
                let last = self.labware.len() - 1;
                &mut self.labware[last].1
            },
        };
        match wells.iter_mut().find(|(name, _)| name == well) {
            Some(entry) => entry.1 = geometry,
            None => wells.push((well.to_string(), geometry)),
        }
    }

    /// 添加规则孔阵，孔按列优先顺序（A1, B1, ..., A2, ...）插入
    ///
    /// 列号增加时 x 增加，行号增加时 y 减小。行数超过 26 时不添加任何孔。
    pub fn add_grid(&mut self, labware: &str, layout: &GridLayout) -> Result<(), LabwareError> {
        if layout.rows > MAX_GRID_ROWS {
            return Err(LabwareError::TooManyRows { rows: layout.rows });
        }
        for column in 0..layout.columns {
            for row in 0..layout.rows {
                let name = format!("{}{}", (b'A' + row) as char, column + 1);
                let geometry = WellGeometry {
                    x: layout.a1_x + f64::from(column) * layout.pitch,
                    y: layout.a1_y - f64::from(row) * layout.pitch,
                    z: layout.bottom_z,
                    top: layout.bottom_z + layout.depth,
                    diameter: layout.diameter,
                };
                self.add_well(labware, &name, geometry);
            }
        }
        Ok(())
    }

    /// 耗材的全部孔（插入顺序）
    pub fn wells(&self, labware: &str) -> Vec<WellRef> {
        self.labware
            .iter()
            .find(|(name, _)| name == labware)
            .map(|(_, wells)| {
                wells
                    .iter()
                    .map(|(well, _)| WellRef::new(labware, well.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl LabwareDirectory for Deck {
    fn well(&self, well: &WellRef) -> Result<WellGeometry, LabwareError> {
        let (_, wells) = self
            .labware
            .iter()
            .find(|(name, _)| *name == well.labware)
            .ok_or_else(|| LabwareError::UnknownLabware(well.labware.clone()))?;
        wells
            .iter()
            .find(|(name, _)| *name == well.well)
            .map(|(_, geometry)| *geometry)
            .ok_or_else(|| LabwareError::UnknownWell(well.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> WellGeometry {
        WellGeometry {
            x: 10.0,
            y: 20.0,
            z: 5.0,
            top: 15.0,
            diameter: 6.0,
        }
    }

    fn deck() -> Deck {
        let mut deck = Deck::new();
        deck.add_well("plate", "A1", geometry());
        deck
    }

    #[test]
    fn test_resolve_bare_well_to_bottom() {
        let resolved = deck().resolve(&Location::well("plate", "A1")).unwrap();
        assert_eq!(resolved.point, Point3::new(10.0, 20.0, 5.0));
        assert!(resolved.bare_well);
        assert_eq!(resolved.well.unwrap().well, WellRef::new("plate", "A1"));
    }

    #[test]
    fn test_resolve_in_well_keeps_point() {
        let location = Location::InWell {
            well: WellRef::new("plate", "A1"),
            point: Point3::new(10.0, 20.0, 8.0),
        };
        let resolved = deck().resolve(&location).unwrap();
        assert_eq!(resolved.point.z, 8.0);
        assert!(!resolved.bare_well);
        assert!(resolved.well.is_some());
    }

    #[test]
    fn test_resolve_point_has_no_well() {
        let resolved = deck().resolve(&Location::point(1.0, 2.0, 3.0)).unwrap();
        assert!(resolved.well.is_none());
        assert!(!resolved.bare_well);
    }

    #[test]
    fn test_unknown_labware_and_well() {
        let deck = deck();
        assert_eq!(
            deck.resolve(&Location::well("rack", "A1")).unwrap_err(),
            LabwareError::UnknownLabware("rack".to_string())
        );
        assert_eq!(
            deck.resolve(&Location::well("plate", "H12")).unwrap_err(),
            LabwareError::UnknownWell(WellRef::new("plate", "H12"))
        );
    }

    #[test]
    fn test_stir_radius() {
        // 6/2 - 6/6 = 2
        assert!((geometry().stir_radius() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_well_ref_parse() {
        assert_eq!(
            "plate/B3".parse::<WellRef>().unwrap(),
            WellRef::new("plate", "B3")
        );
        assert!("plate".parse::<WellRef>().is_err());
        assert!("/A1".parse::<WellRef>().is_err());
    }

    #[test]
    fn test_grid_order_is_column_major() {
        let mut deck = Deck::new();
        deck.add_grid(
            "tips",
            &GridLayout {
                rows: 2,
                columns: 2,
                a1_x: 0.0,
                a1_y: 0.0,
                pitch: 9.0,
                bottom_z: 0.0,
                depth: 50.0,
                diameter: 5.0,
            },
        )
        .unwrap();
        let names: Vec<String> = deck.wells("tips").iter().map(|w| w.well.clone()).collect();
        assert_eq!(names, vec!["A1", "B1", "A2", "B2"]);
        assert!(deck.wells("missing").is_empty());
    }

    #[test]
    fn test_grid_rows_limited_to_letters() {
        let layout = |rows| GridLayout {
            rows,
            columns: 1,
            a1_x: 0.0,
            a1_y: 0.0,
            pitch: 9.0,
            bottom_z: 0.0,
            depth: 10.0,
            diameter: 5.0,
        };
        let mut deck = Deck::new();

        deck.add_grid("tall", &layout(26)).unwrap();
        let wells = deck.wells("tall");
        assert_eq!(wells.len(), 26);
        assert_eq!(wells[25].well, "Z1");

        for rows in [27, 200, u8::MAX] {
            assert_eq!(
                deck.add_grid("bad", &layout(rows)),
                Err(LabwareError::TooManyRows { rows })
            );
        }
        assert!(deck.wells("bad").is_empty());
    }
}
