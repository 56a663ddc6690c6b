// Prompt templates and builders for every analysis.
// Builders are pure: they only render already-sanitized input into a template.

use crate::llm_client::prompts::{JSON_OBJECT_ONLY_INSTRUCTION, NO_FABRICATION_INSTRUCTION};
use crate::models::resume::{ResumeDocument, Style};

/// System prompt for single-bullet enhancement. Plain text out, not JSON.
pub const BULLET_SYSTEM: &str = "You are an expert resume writer. \
    You rewrite a single resume bullet point so it is clear, specific and results-oriented. \
    Respond with the rewritten bullet only: no quotes, no list marker, no explanations.";

/// Replace: {style_instruction}, {text}
const BULLET_PROMPT_TEMPLATE: &str = r#"Rewrite the resume bullet below.

{style_instruction}

RULES:
1. Start with a strong action verb
2. Keep every fact from the original; do NOT invent numbers, tools or outcomes
3. If the original implies an outcome, state it plainly
4. Return exactly one bullet, on one line

BULLET:
{text}"#;

/// System prompt for job-description matching.
pub const JOB_MATCH_SYSTEM: &str = "You are an expert technical recruiter and resume strategist. \
    You compare a candidate's resume with a job description and suggest targeted rewrites. \
    You MUST respond with valid JSON only.";

/// Replace: {style_instruction}, {job_description}, {description}, {skills},
///          {projects}, {experience}, {achievements}, {no_fabrication}, {json_only}
const JOB_MATCH_PROMPT_TEMPLATE: &str = r#"Compare the candidate's resume with the job description and score how well it matches.
Then rewrite the resume sections that would most improve the match.

{style_instruction}

JOB DESCRIPTION:
{job_description}

RESUME:
Summary: {description}
Skills: {skills}
Projects: {projects}
Experience: {experience}
Achievements: {achievements}

Return a JSON object shaped like this example (illustrative, not a strict schema):
{
  "matchScore": 74,
  "summary": "Strong backend fit; missing hands-on Kubernetes experience.",
  "matchedSkills": ["Rust", "PostgreSQL"],
  "missingSkills": ["Kubernetes"],
  "suggestions": {
    "description": "Rewritten summary aligned with the role",
    "skills": [{"domain": "Backend", "languages": ["Rust", "PostgreSQL"]}],
    "projects": [{"name": "Exact project name", "description": "Rewritten description"}],
    "experience": [{"role": "Exact role", "company": "Exact company", "description": "Rewritten description"}],
    "achievements": [{"title": "Exact title", "description": "Rewritten description"}]
  }
}

HARD RULES:
1. matchScore is an integer from 0 to 100
2. Keep project names, roles, companies and achievement titles exactly as given
3. Omit any section from "suggestions" that is already optimal for this role
4. {no_fabrication}
5. {json_only}"#;

/// System prompt for ATS scoring of structured resume text.
pub const ATS_SYSTEM: &str = "You are an Applicant Tracking System (ATS) expert. \
    You evaluate how well a resume will be parsed and ranked by automated screening software. \
    You MUST respond with valid JSON only.";

/// Shared ATS output contract, used by both the text and file analyses.
const ATS_OUTPUT_CONTRACT: &str = r#"Return a JSON object shaped like this example (illustrative, not a strict schema):
{
  "score": 78,
  "breakdown": {
    "formatting": {"score": 85, "feedback": "Standard section headings, no tables"},
    "keywords": {"score": 70, "feedback": "Few role-specific keywords"},
    "experience": {"score": 80, "feedback": "Bullets are mostly quantified"},
    "skills": {"score": 75, "feedback": "Skills listed but not grouped"},
    "achievements": {"score": 60, "feedback": "Achievements lack measurable outcomes"}
  },
  "strengths": ["Clear role progression"],
  "improvements": ["Quantify the impact of the payments project"],
  "missingKeywords": ["CI/CD", "observability"]
}

HARD RULES:
1. All scores are integers from 0 to 100
2. Leave "improvements" empty for sections that are already optimal"#;

/// Replace: {description}, {skills}, {projects}, {experience}, {achievements},
///          {contract}, {no_fabrication}, {json_only}
const ATS_PROMPT_TEMPLATE: &str = r#"Evaluate the ATS compatibility of the resume below.

RESUME:
Summary: {description}
Skills: {skills}
Projects: {projects}
Experience: {experience}
Achievements: {achievements}

{contract}
3. {no_fabrication}
4. {json_only}"#;

/// Instructions for the agent that extracts a full resume from an uploaded file.
pub const RESUME_EXTRACTION_INSTRUCTIONS: &str = r#"You are a resume parsing assistant with access to one uploaded resume document through file search.
Read the whole document and extract its content into the JSON object below (illustrative, not a strict schema):
{
  "name": "Full name",
  "email": "email@example.com",
  "phone": "+1 555 0100",
  "location": "City, Country",
  "links": ["https://github.com/handle"],
  "description": "Professional summary as written",
  "skills": [{"domain": "Languages", "languages": ["Rust", "TypeScript"]}],
  "projects": [{"name": "Project", "description": "What it does and the outcome", "link": ""}],
  "experience": [{"role": "Title", "company": "Company", "duration": "Jan 2021 - Present", "description": "Responsibilities and results"}],
  "education": [{"institution": "University", "degree": "B.Sc. Computer Science", "duration": "2016 - 2020", "grade": "3.8 GPA"}],
  "achievements": [{"title": "Award", "description": "Details"}]
}

HARD RULES:
1. Copy facts exactly as they appear in the document; do NOT invent or embellish
2. Use an empty string or empty list for anything the document does not contain
3. Group skills by domain when the document does, otherwise use a single "General" domain
4. Return ONLY the JSON object. No prose, no citations, no markdown."#;

/// Conversation message that triggers resume extraction.
pub const RESUME_EXTRACTION_MESSAGE: &str =
    "Parse the attached resume and return the JSON object described in your instructions.";

/// Conversation message that triggers the ATS file analysis.
pub const ATS_FILE_MESSAGE: &str =
    "Evaluate the ATS compatibility of the attached resume and return the JSON object described in your instructions.";

/// Conversation message that triggers the job-match file analysis.
pub const JOB_MATCH_FILE_MESSAGE: &str =
    "Compare the attached resume with the job description in your instructions and return the JSON object described there.";

/// Replace: {style_instruction}, {job_description}
const JOB_MATCH_FILE_TEMPLATE: &str = r#"You are an expert technical recruiter with access to one uploaded resume document through file search.
Compare that resume with the job description below, score the match and rewrite the resume sections that would most improve it.

{style_instruction}

JOB DESCRIPTION:
{job_description}

Return a JSON object shaped like this example (illustrative, not a strict schema):
{
  "matchScore": 74,
  "summary": "Strong backend fit; missing hands-on Kubernetes experience.",
  "matchedSkills": ["Rust", "PostgreSQL"],
  "missingSkills": ["Kubernetes"],
  "suggestions": {
    "description": "Rewritten summary aligned with the role",
    "experience": [{"role": "Exact role", "company": "Exact company", "description": "Rewritten description"}],
    "projects": [{"name": "Exact project name", "description": "Rewritten description"}]
  }
}

HARD RULES:
1. matchScore is an integer from 0 to 100
2. Omit any section from "suggestions" that is already optimal for this role
3. Use ONLY facts found in the document; do NOT invent experience or metrics
4. Return ONLY the JSON object. No prose, no citations, no markdown."#;

fn style_instruction(style: Style) -> &'static str {
    match style {
        Style::Elaborative => {
            "TONE: elaborative. Use complete, descriptive sentences that give context on scope, \
             technologies and outcomes. Two sentences per item are acceptable."
        }
        Style::Concise => {
            "TONE: concise and professional. Use short, punchy phrasing that leads with the action \
             and the measurable result. One sentence per item."
        }
    }
}

/// Substitutes `{name}` placeholders in a single scan of `template`.
/// Inserted values are never rescanned, so user text containing braces is
/// kept verbatim. Unknown `{...}` sequences are copied through unchanged.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail.find('}').and_then(|close| {
            let key = &tail[1..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn build_bullet_prompt(text: &str, style: Style) -> String {
    fill_template(
        BULLET_PROMPT_TEMPLATE,
        &[("style_instruction", style_instruction(style)), ("text", text)],
    )
}

pub fn build_job_match_prompt(resume: &ResumeDocument, job_description: &str, style: Style) -> String {
    let sections = ResumeSections::render(resume);
    fill_template(
        JOB_MATCH_PROMPT_TEMPLATE,
        &[
            ("style_instruction", style_instruction(style)),
            ("no_fabrication", NO_FABRICATION_INSTRUCTION),
            ("json_only", JSON_OBJECT_ONLY_INSTRUCTION),
            ("description", &sections.description),
            ("skills", &sections.skills),
            ("projects", &sections.projects),
            ("experience", &sections.experience),
            ("achievements", &sections.achievements),
            ("job_description", job_description),
        ],
    )
}

pub fn build_ats_prompt(resume: &ResumeDocument) -> String {
    let sections = ResumeSections::render(resume);
    fill_template(
        ATS_PROMPT_TEMPLATE,
        &[
            ("contract", ATS_OUTPUT_CONTRACT),
            ("no_fabrication", NO_FABRICATION_INSTRUCTION),
            ("json_only", JSON_OBJECT_ONLY_INSTRUCTION),
            ("description", &sections.description),
            ("skills", &sections.skills),
            ("projects", &sections.projects),
            ("experience", &sections.experience),
            ("achievements", &sections.achievements),
        ],
    )
}

/// Agent instructions for ATS analysis of an uploaded file.
pub fn build_ats_file_instructions() -> String {
    format!(
        "You are an Applicant Tracking System (ATS) expert with access to one uploaded resume \
         document through file search. Evaluate how well that document will be parsed and ranked \
         by automated screening software, including layout and formatting problems visible in \
         the file.\n\n{ATS_OUTPUT_CONTRACT}\n3. {NO_FABRICATION_INSTRUCTION}\n4. {JSON_OBJECT_ONLY_INSTRUCTION}"
    )
}

/// Agent instructions for job matching against an uploaded file.
pub fn build_job_match_file_instructions(job_description: &str, style: Style) -> String {
    fill_template(
        JOB_MATCH_FILE_TEMPLATE,
        &[
            ("style_instruction", style_instruction(style)),
            ("job_description", job_description),
        ],
    )
}

/// Resume sections flattened to single lines. Empty collections render as "".
struct ResumeSections {
    description: String,
    skills: String,
    projects: String,
    experience: String,
    achievements: String,
}

impl ResumeSections {
    fn render(resume: &ResumeDocument) -> Self {
        Self {
            description: resume.description.clone(),
            skills: resume
                .skills
                .iter()
                .map(|s| format!("{}: {}", s.domain, s.languages.join(", ")))
                .collect::<Vec<_>>()
                .join("; "),
            projects: resume
                .projects
                .iter()
                .map(|p| format!("{} - {}", p.name, p.description))
                .collect::<Vec<_>>()
                .join(" | "),
            experience: resume
                .experience
                .iter()
                .map(|e| format!("{} at {} - {}", e.role, e.company, e.description))
                .collect::<Vec<_>>()
                .join(" | "),
            achievements: resume
                .achievements
                .iter()
                .map(|a| format!("{} - {}", a.title, a.description))
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}
