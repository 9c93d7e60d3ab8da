// Interview LLM prompt templates.
// All prompts for the interview module are defined here.

use crate::llm_client::prompts::PSEUDONYM_INSTRUCTION;

pub const RELEVANCE_SYSTEM: &str = "\
You are an HR assistant evaluating candidates' answers to interview questions. \
You MUST respond with valid JSON only. No markdown fences, no explanations.";

pub const RELEVANCE_PROMPT: &str = r#"Evaluate the following answer on RELEVANCE: does it directly address the question?

Score relevance on a scale of 1 to 10, where 10 is excellent and 1 is very poor.

QUESTION:
{question}

ANSWER:
{answer}

OUTPUT SCHEMA (return exactly this structure):
{"relevance": <integer 1-10>}"#;

pub const CLARIFICATION_SYSTEM: &str = "\
You are an assistant conducting HR interviews. \
Reply with a single question and nothing else.";

pub const CLARIFICATION_PROMPT: &str = r#"The candidate's response to the following question was unclear or irrelevant.

QUESTION:
{question}

CANDIDATE'S ANSWER:
{answer}

Provide a rephrased or clarifying question that helps the candidate understand the original question. Keep it clear and concise."#;

pub const CV_QUESTION_SYSTEM: &str = "\
You are an HR assistant preparing interview questions from a candidate's resume. \
You MUST respond with valid JSON only. No markdown fences, no explanations.";

pub const CV_QUESTION_PROMPT: &str = r#"Based on the resume below, write up to {count} HR interview questions for this candidate.

Rules:
- Focus on work style, strengths, weaknesses, teamwork and career goals.
- Do not ask about technical skills the resume already lists.
- Do not mention names, companies or locations.
- Each question is a single sentence.

RESUME:
{cv}

OUTPUT SCHEMA (return exactly this structure):
{"questions": ["<question>", ...]}"#;

/// CV question prompt with the pseudonym rule appended.
pub fn cv_question_prompt(cv: &str, count: usize) -> String {
    format!(
        "{}\n\n{}",
        CV_QUESTION_PROMPT
            .replace("{count}", &count.to_string())
            .replace("{cv}", cv),
        PSEUDONYM_INSTRUCTION
    )
}

pub const REPORT_SYSTEM: &str = "\
You are an HR assistant writing evaluation reports for hiring managers. \
Use simple HTML tags (<b>, <h2>, <p>) for formatting.";

pub const REPORT_PROMPT: &str = r#"Evaluate the candidate's interview responses and write a detailed, human-readable report for the HR manager.

Focus on these criteria for each answer:
{criteria}

For each question, describe how well the candidate answered, highlight strengths or concerns, and summarise.

Structure:
<b>Question N</b>: [question]
<b>Candidate's Response</b>: [response]
<b>Evaluation</b>: [evaluation against the criteria]

<h2>Overall Assessment</h2>
[strengths, areas of improvement, consistency across answers]

<h2>Final Recommendation</h2>
[whether the candidate should move forward, and suggested follow-up questions]

TRANSCRIPT:
{conversation}"#;

/// Report prompt with the pseudonym rule appended.
pub fn report_prompt(criteria: &str, conversation: &str) -> String {
    format!(
        "{}\n\n{}",
        REPORT_PROMPT
            .replace("{criteria}", criteria)
            .replace("{conversation}", conversation),
        PSEUDONYM_INSTRUCTION
    )
}
