//! 提示词构造

use crate::models::courses::entities::{Course, StudyPlanWeek};

const JSON_ONLY: &str =
    "Respond with JSON only. Do not wrap it in markdown and do not add commentary.";

fn course_context(course: &Course) -> String {
    let mut text = format!(
        "Course: {} ({})\nCredits: {}\n",
        course.title, course.code, course.credits
    );
    if let Some(description) = course.description.as_deref().filter(|d| !d.trim().is_empty()) {
        text.push_str(&format!("Description: {}\n", description.trim()));
    }
    text
}

// 已有学习计划时把每周主题带给模型
fn plan_context(weeks: &[StudyPlanWeek], only_week: Option<u32>) -> String {
    let lines: Vec<String> = weeks
        .iter()
        .filter(|w| only_week.is_none_or(|n| w.week == n))
        .map(|w| {
            if w.topics.is_empty() {
                format!("- Week {}: {}", w.week, w.title)
            } else {
                format!("- Week {}: {} ({})", w.week, w.title, w.topics.join(", "))
            }
        })
        .collect();

    if lines.is_empty() {
        String::new()
    } else {
        format!("Study plan:\n{}\n", lines.join("\n"))
    }
}

pub fn study_plan_prompt(course: &Course, weeks: u32, focus: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are an experienced university curriculum designer.\n",
    );
    prompt.push_str(&course_context(course));
    prompt.push_str(&format!(
        "\nCreate a {weeks}-week study plan for this course.\n"
    ));
    if let Some(focus) = focus.map(str::trim).filter(|f| !f.is_empty()) {
        prompt.push_str(&format!("Give particular emphasis to: {focus}\n"));
    }
    prompt.push_str(
        "\nReturn a JSON array with exactly one object per week, in order. Each object has:\n\
         - \"week\": the week number starting at 1\n\
         - \"title\": a short title\n\
         - \"objectives\": list of learning objectives\n\
         - \"topics\": list of topics covered\n\
         - \"readings\": list of suggested readings\n\
         - \"activities\": list of in-class or lab activities\n\
         - \"assessments\": list of assessments due that week (may be empty)\n\
         - \"outcomes\": list of expected learning outcomes\n",
    );
    prompt.push_str(JSON_ONLY);
    prompt
}

pub fn quiz_prompt(
    course: &Course,
    count: u32,
    difficulty: &str,
    topic: Option<&str>,
) -> String {
    let mut prompt = String::from("You are writing a quiz for university students.\n");
    prompt.push_str(&course_context(course));
    prompt.push_str(&plan_context(&course.study_plan, None));
    prompt.push_str(&format!(
        "\nWrite {count} multiple-choice questions of {difficulty} difficulty"
    ));
    match topic.map(str::trim).filter(|t| !t.is_empty()) {
        Some(topic) => prompt.push_str(&format!(" about: {topic}.\n")),
        None => prompt.push_str(" covering the course material.\n"),
    }
    prompt.push_str(
        "\nReturn a JSON object {\"title\": string, \"questions\": [...]} where each question has:\n\
         - \"question\": the question text\n\
         - \"options\": list of four answer options without letter prefixes\n\
         - \"correct_answer\": the letter of the correct option (A, B, C or D)\n\
         - \"points\": a positive number\n\
         - \"explanation\": one sentence explaining the answer\n",
    );
    prompt.push_str(JSON_ONLY);
    prompt
}

pub fn assignment_prompt(course: &Course, topic: &str, week: Option<u32>) -> String {
    let mut prompt = String::from("You are designing a graded assignment for university students.\n");
    prompt.push_str(&course_context(course));
    prompt.push_str(&plan_context(&course.study_plan, week));
    prompt.push_str(&format!("\nTopic: {}\n", topic.trim()));
    if let Some(week) = week {
        prompt.push_str(&format!("The assignment is due in week {week}.\n"));
    }
    prompt.push_str(
        "\nReturn a JSON object with:\n\
         - \"title\": assignment title\n\
         - \"description\": full instructions for students\n\
         - \"max_score\": total points as a number\n\
         - \"rubric\": list of {\"criterion\": string, \"points\": number}\n\
         - \"deliverables\": list of items students must submit\n",
    );
    prompt.push_str(JSON_ONLY);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> Course {
        Course {
            id: 1,
            department_id: 1,
            instructor_id: 2,
            code: "CS101".into(),
            title: "Intro to Programming".into(),
            description: Some("Basics of programming in Rust".into()),
            credits: 3,
            study_plan: vec![StudyPlanWeek {
                topics: vec!["ownership".into()],
                ..StudyPlanWeek::empty(1)
            }],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_study_plan_prompt_mentions_inputs() {
        let prompt = study_plan_prompt(&course(), 10, Some("systems programming"));
        assert!(prompt.contains("CS101"));
        assert!(prompt.contains("10-week"));
        assert!(prompt.contains("systems programming"));
        assert!(prompt.contains("\"outcomes\""));
    }

    #[test]
    fn test_quiz_prompt_includes_plan_context() {
        let prompt = quiz_prompt(&course(), 5, "medium", None);
        assert!(prompt.contains("5 multiple-choice questions of medium difficulty"));
        assert!(prompt.contains("Week 1: Week 1 (ownership)"));
    }

    #[test]
    fn test_assignment_prompt_filters_week() {
        let prompt = assignment_prompt(&course(), "Borrow checker", Some(3));
        assert!(prompt.contains("Topic: Borrow checker"));
        assert!(prompt.contains("due in week 3"));
        assert!(!prompt.contains("ownership"));
    }
}
