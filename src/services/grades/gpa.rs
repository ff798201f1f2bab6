//! 绩点计算
//!
//! 按学分加权的 4.0 制平均绩点，保留两位小数；总学分为 0 时为 0.0。

use crate::models::grades::entities::LetterGrade;

pub fn compute_gpa<I>(grades: I) -> f64
where
    I: IntoIterator<Item = (LetterGrade, i32)>,
{
    let (weighted, credits) = grades
        .into_iter()
        .filter(|(_, credits)| *credits > 0)
        .fold((0.0_f64, 0_i64), |(weighted, total), (letter, credits)| {
            (
                weighted + letter.grade_points() * f64::from(credits),
                total + i64::from(credits),
            )
        });

    if credits == 0 {
        return 0.0;
    }
    round2(weighted / credits as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
