//! Prompt templates. Pure string assembly, no state, no side effects.

const LEVEL1_RULES: &str = r#"You are an educational AI. Create a Level 1 Assessment (Recall & Understanding) based on the text below.

Rules:
1. Generate 10 Multiple Choice Questions (MCQs).
2. Focus strictly on DEFINITIONS, DIRECT FACTS, and basic UNDERSTANDING from the text.
3. Do not ask complex analysis questions yet.
4. Provide 4 options for each question.
5. Output JSON format only."#;

const LEVEL1_SCHEMA: &str = r#"[
    {
        "id": 1,
        "question": "What is...",
        "options": ["A", "B", "C", "D"],
        "correct_answer": "A",
        "explanation": "Brief explanation of why A is correct."
    },
    ...
]"#;

const LEVEL2_RULES: &str = r#"You are an educational AI. Create a Level 2 Assessment (Application & Analysis) based on the text below.

Rules:
1. Generate 10 Multiple Choice Questions (MCQs).
2. Focus on SCENARIOS, CASE STUDIES, and APPLICATION of concepts.
3. Questions should start like "A student observes that..." or "If X happens...", asking the user to apply knowledge.
4. Provide 4 options for each question.
5. Output JSON format only."#;

const LEVEL2_SCHEMA: &str = r#"[
    {
        "id": 1,
        "question": "Scenario...",
        "options": ["A", "B", "C", "D"],
        "correct_answer": "B",
        "explanation": "Brief explanation of why B is correct in this scenario."
    },
    ...
]"#;

const LEVEL3_RULES: &str = r#"You are an educational AI. Create a Level 3 Assessment (Creation & Evaluation) based on the text below.

Rules:
1. Generate 5 Short Answer / Thought-Provoking Questions.
2. Focus on "Create a solution", "Critique this method", "Propose an alternative".
3. These are Open-Ended questions requiring synthesis of newer case studies or concepts.
4. Output JSON format only."#;

const LEVEL3_SCHEMA: &str = r#"[
    {
        "id": 1,
        "question": "Propose a method to...",
        "type": "short_answer",
        "explanation": "Key elements that should be in the student's answer."
    },
    ...
]"#;

/// Assessment prompt for a difficulty level. Levels outside 1-3 fall back
/// to the level 1 template; the API layer rejects them before this point.
pub fn assessment_prompt(level: u8, context: &str) -> String {
    let (rules, schema) = match level {
        2 => (LEVEL2_RULES, LEVEL2_SCHEMA),
        3 => (LEVEL3_RULES, LEVEL3_SCHEMA),
        _ => (LEVEL1_RULES, LEVEL1_SCHEMA),
    };
    format!("{rules}\n\nText Context:\n{context}\n\nOutput JSON format:\n{schema}")
}

const ROADMAP_SYSTEM_PROMPT: &str = r#"You are an expert educational consultant. Your task is to create a detailed, high-quality learning roadmap based on a user's goal.

The roadmap must be structured as follows in JSON format:
{
    "title": "A catchy title for the course",
    "description": "A brief overview of the course",
    "total_days": 30, // Default to 30 if not specified
    "weeks": [
        {
            "week_number": 1,
            "goal": "Goal for this week",
            "days": [
                {
                    "day_number": 1,
                    "topic": "Topic for the day",
                    "learning_objectives": ["Objective 1", "Objective 2"],
                    "youtube_video_title": "Title of the recommended YouTube video",
                    "youtube_video_url": "Actual URL to the recommended YouTube video",
                    "reference_content": "A highly comprehensive, in-depth tutorial (minimum 400 words). Do NOT summarize. Provide the actual learning material. For coding (like Python/ML), list out the exact data types, variables, and fully explain the functions of libraries like NumPy and Pandas including code syntax. For Mathematics, explicitly state the relevant formulas and exactly when/where they are used. This field must be rich enough that the user can learn the topic entirely from reading it.",
                    "questions": [
                        {"question": "A concept-checking question", "type": "recall", "hint": "A helpful hint or detailed answer to show in a popup"},
                        {"question": "A scenario-based question", "type": "application", "hint": "A helpful hint or detailed answer to show in a popup"}
                    ]
                }
            ]
        },
        {
            "week_number": 2,
            "goal": "Goal for Week 2",
            "days": [
                {
                    "day_number": 8,
                    "topic": "Title only for upcoming days",
                    "learning_objectives": [],
                    "youtube_video_url": "",
                    "reference_content": "CONTENT_NOT_GENERATED",
                    "questions": []
                }
            ]
        }
    ]
}

IMPORTANT:
- You MUST generate the FULL outline (all days) for the requested duration.
- However, you MUST only generate the deep content (`reference_content`, `youtube_video_url`, `questions` with `hint`) for **Week 1 (Days 1-7)**.
- For all days in Week 2 and onwards, set `reference_content` to "CONTENT_NOT_GENERATED", `youtube_video_url` to "", and `questions` to an empty list [].
- Ensure logical progression.
- Return ONLY the JSON. No markdown formatting."#;

pub fn roadmap_prompt(goal: &str) -> String {
    format!("{ROADMAP_SYSTEM_PROMPT}\n\nUser Goal: {goal}")
}

const WEEK_CONTENT_SYSTEM_PROMPT: &str = r#"You are an expert educational consultant. Your task is to fill in the deep educational content for a specific week of a learning roadmap.

For each day in the provided list, you must provide:
1. `learning_objectives`: A list of key things the user will learn.
2. `youtube_search_term`: A specific search term to find the best tutorial.
3. `youtube_video_title`: The title of a recommended video.
4. `youtube_video_url`: An actual URL found via web search.
5. `reference_content`: A highly comprehensive, in-depth tutorial (minimum 400 words).
6. `questions`: 2 questions with a `hint` field (the answer/explanation).

IMPORTANT:
- THE CONTENT MUST BE EXTREMELY ELABORATE. For coding, include data types, syntax, and library functions. For Math, include formulas and derivations.
- Return ONLY the JSON array matching the 'days' structure."#;

pub fn week_content_prompt(roadmap_title: &str, week_number: u32, outline: &str) -> String {
    format!(
        "{WEEK_CONTENT_SYSTEM_PROMPT}\n\nRoadmap Title: {roadmap_title}\nWeek {week_number} Outline:\n{outline}"
    )
}

pub fn doubt_prompt(context: &str, query: &str) -> String {
    format!(
        "You are a helpful study assistant. Answer the student's question using the course material below. \
         If the material does not cover the question, say so before answering from general knowledge.\n\n\
         Course Material:\n{context}\n\nQuestion: {query}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_level_gets_its_own_template() {
        let l1 = assessment_prompt(1, "ctx");
        let l2 = assessment_prompt(2, "ctx");
        let l3 = assessment_prompt(3, "ctx");

        assert!(l1.contains("Level 1 Assessment"));
        assert!(l1.contains("10 Multiple Choice"));
        assert!(l2.contains("Level 2 Assessment"));
        assert!(l2.contains("SCENARIOS"));
        assert!(l3.contains("Level 3 Assessment"));
        assert!(l3.contains("short_answer"));
    }

    #[test]
    fn context_is_embedded_in_the_prompt() {
        let prompt = assessment_prompt(1, "the mitochondria is the powerhouse");
        assert!(prompt.contains("Text Context:\nthe mitochondria is the powerhouse"));
    }

    #[test]
    fn roadmap_prompt_requests_sentinel_for_later_weeks() {
        let prompt = roadmap_prompt("learn linear algebra in 30 days");
        assert!(prompt.contains("CONTENT_NOT_GENERATED"));
        assert!(prompt.ends_with("User Goal: learn linear algebra in 30 days"));
    }

    #[test]
    fn week_prompt_carries_the_outline() {
        let prompt = week_content_prompt("Linear Algebra", 2, "Day 8: Matrices\nDay 9: Determinants");
        assert!(prompt.contains("Week 2 Outline:"));
        assert!(prompt.contains("Day 9: Determinants"));
    }
}
