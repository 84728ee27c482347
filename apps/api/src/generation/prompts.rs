// Prompt construction for job description generation.
// Pure string templating: no I/O, same inputs always give the same prompt.

use serde_json::Value;

const PERSONA_LINE: &str = "You are an expert technical recruiter and professional copywriter.";

/// Sections the generated JD must contain, in order.
pub const REQUIRED_SECTIONS: &[&str] = &[
    "Summary",
    "Responsibilities",
    "Required Qualifications",
    "Preferred Qualifications",
    "About the Company (if company info exists)",
    "How to Apply",
];

/// Payload fields the model is told to weave into the JD when present.
const HINTED_FIELDS: &[&str] = &[
    "skills",
    "experience",
    "location",
    "salary",
    "benefits",
    "company",
];

const CLOSING_INSTRUCTION: &str = "Output only the Job Description text (no additional commentary). \
    Start with a short one-line title header followed by the sections.";

/// Builds the instruction prompt sent to the provider.
///
/// `input` is embedded pretty-printed (two-space indent, object keys in
/// insertion order, non-ASCII kept as-is). The title line is omitted when
/// `title` is empty.
pub fn build_prompt(
    input: &Value,
    word_count: u32,
    tone: &str,
    title: &str,
    language: &str,
) -> String {
    let pretty_input =
        serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string());

    let title_section = if title.is_empty() {
        String::new()
    } else {
        format!("Title: {title}\n\n")
    };

    let hinted_fields = HINTED_FIELDS
        .iter()
        .map(|f| format!("`{f}`"))
        .collect::<Vec<_>>();
    let hinted_fields = format!(
        "{}, or {}",
        hinted_fields[..hinted_fields.len() - 1].join(", "),
        hinted_fields[hinted_fields.len() - 1]
    );

    format!(
        "{PERSONA_LINE}\n\n\
        {title_section}\
        Below is structured input describing a role and related details. Use all relevant fields\n\
        from the JSON to produce a professional, well-formatted Job Description (JD) in {language}.\n\n\
        Requirements for the JD:\n\
        - Tone: {tone}\n\
        - Target length: ~{word_count} words. Focus on clarity and completeness; hitting exact words is not required but try to be close.\n\
        - Include sections: {sections}.\n\
        - If the JSON contains fields like {hinted_fields}, integrate them sensibly into the JD.\n\
        - Use professional language and bullet points where appropriate.\n\n\
        INPUT JSON:\n{pretty_input}\n\n\
        {CLOSING_INSTRUCTION}\n",
        sections = REQUIRED_SECTIONS.join(", "),
    )
}
