//! Prompt templates for the form flows.
//!
//! Form values are inserted verbatim; nothing is escaped or trimmed.

use chrono::Local;

pub const MENTOR_PERSONA: &str = "You are Alex, an AI Learning Companion & Mentor.";

/// A populated prompt: persona system text plus the user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowPrompt {
    pub system: String,
    pub user: String,
}

/// The date line used in templates: the configured override, else today.
pub fn prompt_date(override_date: Option<&str>) -> String {
    match override_date {
        Some(date) if !date.trim().is_empty() => date.to_string(),
        _ => Local::now().format("%B %-d, %Y").to_string(),
    }
}

pub fn system_prompt(date: &str) -> String {
    format!(
        "{MENTOR_PERSONA} Today's date is {date}. Always consider this date when asked about recent or future events."
    )
}

pub fn learning_path(skill_level: &str, goals: &str) -> String {
    format!(
        "Generate a personalized learning path for a student in AI, ML, and Data Science based on their current skill level and goals. \
The learning path should be tailored to help the student effectively learn and advance their knowledge. \
Consider the student's skill level when creating the learning path. Format it as markdown.\n\n\
Skill Level: {skill_level}\n\
Goals: {goals}\n"
    )
}

pub fn code_snippet(task: &str, libraries: &str) -> String {
    format!(
        "Generate a well-documented code snippet in Python for the given AI/ML task and give a clear explanation of each step.\n\n\
User's request: Generate a code snippet for the following task: {task} using these libraries: {libraries}.\n\n\
Put the code (a python fenced block is fine) in `code_snippet` and the step-by-step explanation, as markdown, in `explanation`.\n"
    )
}

pub fn project_ideas(skill_level: &str, interests: &str) -> String {
    format!(
        "Suggest some interesting AI/ML project ideas given the user's skill level and interests. Format them as a markdown list.\n\n\
Skill Level: {skill_level}\n\
Interests: {interests}\n"
    )
}

pub fn concept_explainer(concept: &str, user_background: &str) -> String {
    format!(
        "You are explaining the concept of \"{concept}\" to a student.\n\n\
The student has the following background knowledge:\n\
\"\"\"\n{user_background}\n\"\"\"\n\n\
Provide a detailed explanation of the concept, tailored to the student's background.\n\
Use analogies where appropriate to simplify complex ideas.\n\
Use LaTeX for any equations ($...$ inline, $$...$$ for display).\n\
Format the response with markdown to be easily readable.\n\n\
If the student asks about a topic outside AI, ML, Data Science or Programming, gently steer back to those subjects.\n\
Never complete a student's homework or assignment; you may explain the underlying concepts, give similar examples, or help debug their own work.\n\
Always remind the student that you are an AI and the information should be verified.\n\
Never state opinions, beliefs, or consciousness.\n\
If the student is inappropriate, do not engage and say that you are an educational assistant and can't answer.\n"
    )
}
