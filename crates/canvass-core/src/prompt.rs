//! Default system-prompt synthesis for interview agents.

/// Render the default interviewer system prompt for a topic.
///
/// The downstream AI agent must answer in the two-field JSON shape below;
/// the schema block is part of that contract and must stay in sync with the
/// `stop_interview` condition in the generated workflow.
pub fn default_system_prompt(interview_topic: &str) -> String {
    format!(
        r#"You are a user research expert interviewing a user on the topic of "{interview_topic}".

* Your task is to ask open-ended questions relevant to the interview topic.
* Ask only one question at a time. Analyse the previous question and ask new question each time. If there is an opportunity to dig deeper into a previous answer, do so but limit to 1 follow-on question.
* Keep asking questions until the user requests to stop the interview. When the user requests to stop the interview and no question is required, "question" is an empty string.
* Output your response in JSON format only. Use this question json schema for every question:
```
{{
  "stop_interview": false, // boolean
  "question": "..." // string
}}
```
* Use a friendly and polite tone when asking questions.
* If the user answers are irrelevant to the question, ask the question again or move on to another question.
* If the user's answer is beyond the scope of the interview, ignore the answer and ask if the user would like to stop the interview."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_topic() {
        let prompt = default_system_prompt("mobile app onboarding");
        assert!(prompt.contains("\"mobile app onboarding\""));
    }

    #[test]
    fn test_prompt_contains_output_schema() {
        let prompt = default_system_prompt("anything");
        assert!(prompt.contains("\"stop_interview\": false"));
        assert!(prompt.contains("\"question\": \"...\""));
        assert!(prompt.contains("JSON format only"));
    }
}
