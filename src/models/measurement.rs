use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[default]
    #[serde(rename = "F")]
    Female,
}

// 各部位尺寸, 单位一致, 只存储不计算

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlouseMeasurements {
    pub length: Option<f64>,
    pub half_length: Option<f64>,
    pub bust: Option<f64>,
    pub under_bust: Option<f64>,
    pub shoulder: Option<f64>,
    pub waist: Option<f64>,
    pub neck: Option<f64>,
    pub hip: Option<f64>,
    pub sleeve: Option<f64>,
    pub round_sleeve: Option<f64>,
    pub nipple_to_nipple: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GownMeasurements {
    pub length: Option<f64>,
    pub half_length: Option<f64>,
    pub three_quarter_length: Option<f64>,
    pub bust: Option<f64>,
    pub under_bust: Option<f64>,
    pub shoulder: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub sleeve: Option<f64>,
    pub round_sleeve: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JacketMeasurements {
    pub length: Option<f64>,
    pub half_length: Option<f64>,
    pub collar: Option<f64>,
    pub back: Option<f64>,
    pub half_back: Option<f64>,
    pub chest: Option<f64>,
    pub shoulder: Option<f64>,
    pub armhole: Option<f64>,
    pub waist: Option<f64>,
    pub sleeve: Option<f64>,
    pub round_sleeve: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkirtMeasurements {
    pub length: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrouserMeasurements {
    pub length: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub thigh: Option<f64>,
    pub crotch: Option<f64>,
    pub seat: Option<f64>,
    pub cuff: Option<f64>,
}

/// 客户量体档案 (measurements 集合)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientMeasurements {
    pub client_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub blouse_measurements: BlouseMeasurements,
    #[serde(default)]
    pub gown_measurements: GownMeasurements,
    #[serde(default)]
    pub jacket_measurements: JacketMeasurements,
    #[serde(default)]
    pub skirt_measurements: SkirtMeasurements,
    #[serde(default)]
    pub trouser_measurements: TrouserMeasurements,
}
