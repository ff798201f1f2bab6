use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 等级成绩（4.0 绩点制）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D-")]
    DMinus,
    #[serde(rename = "F")]
    F,
}

// (等级, 最低百分制分数, 绩点)，按分数从高到低
const GRADE_TABLE: [(LetterGrade, f64, f64); 13] = [
    (LetterGrade::APlus, 97.0, 4.0),
    (LetterGrade::A, 93.0, 4.0),
    (LetterGrade::AMinus, 90.0, 3.7),
    (LetterGrade::BPlus, 87.0, 3.3),
    (LetterGrade::B, 83.0, 3.0),
    (LetterGrade::BMinus, 80.0, 2.7),
    (LetterGrade::CPlus, 77.0, 2.3),
    (LetterGrade::C, 73.0, 2.0),
    (LetterGrade::CMinus, 70.0, 1.7),
    (LetterGrade::DPlus, 67.0, 1.3),
    (LetterGrade::D, 63.0, 1.0),
    (LetterGrade::DMinus, 60.0, 0.7),
    (LetterGrade::F, 0.0, 0.0),
];

impl LetterGrade {
    /// 百分制分数换算为等级
    pub fn from_numeric(score: f64) -> Self {
        GRADE_TABLE
            .iter()
            .find(|(_, min, _)| score >= *min)
            .map(|(letter, _, _)| *letter)
            .unwrap_or(LetterGrade::F)
    }

    /// 对应绩点
    pub fn grade_points(&self) -> f64 {
        self.entry().2
    }

    /// 该等级的最低百分制分数
    pub fn min_numeric(&self) -> f64 {
        self.entry().1
    }

    fn entry(&self) -> &'static (LetterGrade, f64, f64) {
        // GRADE_TABLE 覆盖全部等级
        GRADE_TABLE
            .iter()
            .find(|(letter, _, _)| letter == self)
            .unwrap_or(&GRADE_TABLE[GRADE_TABLE.len() - 1])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::DMinus => "D-",
            LetterGrade::F => "F",
        }
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LetterGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        GRADE_TABLE
            .iter()
            .map(|(letter, _, _)| *letter)
            .find(|letter| letter.as_str() == normalized)
            .ok_or_else(|| format!("Invalid letter grade: {s}"))
    }
}

// 课程成绩
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub letter: LetterGrade,
    pub numeric: f64,
    pub comment: Option<String>,
    pub graded_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_thresholds() {
        assert_eq!(LetterGrade::from_numeric(100.0), LetterGrade::APlus);
        assert_eq!(LetterGrade::from_numeric(97.0), LetterGrade::APlus);
        assert_eq!(LetterGrade::from_numeric(96.9), LetterGrade::A);
        assert_eq!(LetterGrade::from_numeric(90.0), LetterGrade::AMinus);
        assert_eq!(LetterGrade::from_numeric(85.0), LetterGrade::B);
        assert_eq!(LetterGrade::from_numeric(70.0), LetterGrade::CMinus);
        assert_eq!(LetterGrade::from_numeric(60.0), LetterGrade::DMinus);
        assert_eq!(LetterGrade::from_numeric(59.99), LetterGrade::F);
        assert_eq!(LetterGrade::from_numeric(0.0), LetterGrade::F);
    }

    #[test]
    fn test_grade_points() {
        assert_eq!(LetterGrade::APlus.grade_points(), 4.0);
        assert_eq!(LetterGrade::A.grade_points(), 4.0);
        assert_eq!(LetterGrade::AMinus.grade_points(), 3.7);
        assert_eq!(LetterGrade::BPlus.grade_points(), 3.3);
        assert_eq!(LetterGrade::CMinus.grade_points(), 1.7);
        assert_eq!(LetterGrade::DMinus.grade_points(), 0.7);
        assert_eq!(LetterGrade::F.grade_points(), 0.0);
    }

    #[test]
    fn test_parse_and_serialize() {
        assert_eq!(" b+ ".parse::<LetterGrade>().unwrap(), LetterGrade::BPlus);
        assert!("E".parse::<LetterGrade>().is_err());
        assert_eq!(
            serde_json::to_string(&LetterGrade::AMinus).unwrap(),
            r#""A-""#
        );
    }
}
