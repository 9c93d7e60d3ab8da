// CV LLM prompt templates.

pub const CV_SEGMENT_PROMPT: &str = r#"Segment the following CV text into JSON with the fields "name", "email", "work_experiences", "educations" and "skills".

Each work experience has "position", "company", "from_to" (dates as "YYYY to YYYY" or "YYYY to Present") and "description".
Each education entry has "degree", "institution" and "from_to" in the same date format.
"skills" is an array of the relevant skills mentioned in the text.
Omit fields that are not present. Do not add empty keys.

OUTPUT SCHEMA (example):
{
  "name": "string",
  "email": "string",
  "work_experiences": [
    {"position": "string", "company": "string", "from_to": "2021 to Present", "description": "string"}
  ],
  "educations": [
    {"degree": "string", "institution": "string", "from_to": "2017 to 2021"}
  ],
  "skills": ["string"]
}

CV TEXT:
{cv_text}"#;

pub const CV_FIT_PROMPT: &str = r#"You are an HR assistant evaluating a candidate's CV against a job description.
Compare the relevant skills, experience and qualifications, then score how well the candidate fits the job from 1 to 10, where 10 is an excellent fit and 1 is a poor fit.

JOB DESCRIPTION:
{job_description}

CANDIDATE CV:
{cv_text}

OUTPUT SCHEMA (return exactly this structure):
{"score": <integer 1-10>}"#;
