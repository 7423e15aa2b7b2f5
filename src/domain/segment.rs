// ==========================================
// DR Margin Tool - 客户分段
// ==========================================
// 分段规则: 客户类别 == 46 → 车队（flotte），其余（含缺失）→ 非车队
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 客户分段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Flotte,
    NonFlotte,
    #[serde(rename = "totale", alias = "tutti")]
    All,
}

impl Segment {
    /// KPI 表固定顺序
    pub const KPI_ORDER: [Segment; 3] = [Segment::Flotte, Segment::NonFlotte, Segment::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Flotte => "flotte",
            Segment::NonFlotte => "non_flotte",
            Segment::All => "totale",
        }
    }

    /// 判断客户类别是否属于本分段
    ///
    /// NaN 类别 != 车队代码，因此归入非车队
    pub fn contains(&self, customer_category: f64, flotte_code: f64) -> bool {
        match self {
            Segment::Flotte => customer_category == flotte_code,
            Segment::NonFlotte => customer_category != flotte_code,
            Segment::All => true,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Segment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flotte" => Ok(Segment::Flotte),
            "non_flotte" | "non-flotte" | "clienti" => Ok(Segment::NonFlotte),
            "tutti" | "totale" | "all" => Ok(Segment::All),
            other => Err(format!("segmento sconosciuto: {}", other)),
        }
    }
}
