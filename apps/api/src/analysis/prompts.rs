// LLM prompt constants for resume analysis.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Persona for the analysis call. Combined with the JSON-only fragment at call time.
pub const ANALYSIS_PERSONA: &str = "You are an expert HR consultant and resume analyst. \
    Analyse resumes against job descriptions with precision and provide actionable insights. \
    Be realistic with scores - most resumes are not perfect matches.";

/// Sampling temperature for analysis. Near-deterministic.
pub const ANALYSIS_TEMPERATURE: f32 = 0.1;
pub const ANALYSIS_MAX_TOKENS: u32 = 2000;

/// Analysis prompt template.
/// Replace: {resume_text}, {job_description}, {realistic_scoring}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Please analyse the following resume against the job description and provide a comprehensive analysis in the exact JSON format specified below.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

ANALYSIS REQUIREMENTS:
Return a single JSON object with this EXACT schema (no additional text, just valid JSON):
{
  "matchScore": <integer between 0-100>,
  "missingKeywords": ["keyword1", "keyword2"],
  "foundKeywords": ["keyword1", "keyword2"],
  "suggestions": [
    "specific actionable suggestion 1",
    "specific actionable suggestion 2",
    "specific actionable suggestion 3",
    "specific actionable suggestion 4"
  ],
  "strengths": [
    "strength 1",
    "strength 2",
    "strength 3"
  ],
  "weaknesses": [
    "weakness 1",
    "weakness 2",
    "weakness 3"
  ],
  "atsScore": <integer between 0-100>,
  "readabilityScore": <integer between 0-100>
}

ANALYSIS CRITERIA:
- matchScore: Overall percentage match between resume and job requirements (perfect matches are rare)
- missingKeywords: Important keywords/skills from the job description not found in the resume
- foundKeywords: Relevant keywords/skills from the job description found in the resume
- suggestions: Specific, actionable recommendations to improve the resume for this job
- strengths: What the candidate does well relative to the job requirements
- weaknesses: Areas where the resume could be improved for this position
- atsScore: How well the resume would perform with Applicant Tracking Systems (formatting, keywords, structure)
- readabilityScore: How easy the resume is to read and understand

{realistic_scoring}"#;
