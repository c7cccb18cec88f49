// All LLM prompt templates for post generation and refinement.
// Rendering is pure string work: no I/O, no backend calls.

use crate::content::normalize::truncate_chars;

/// Max characters of the style sample embedded in a generate prompt.
pub const MAX_STYLE_SAMPLE_CHARS: usize = 5_000;
/// Max characters of the source article embedded in a generate prompt.
/// Smaller than the fetch cap on purpose; the fetched text keeps headroom.
pub const MAX_SOURCE_CHARS: usize = 5_000;

/// Formatting rules shared by both templates.
const FORMAT_RULES: &str = "\
- Use LinkedIn formatting: short paragraphs, line breaks, and bullet points if the style reference uses them.
- Include hashtags only if the style reference uses them.
- CRITICAL: Do NOT have the author introduce themselves (e.g. do NOT write \"Hi, I'm {persona_name}\"). Dive straight into the value.
- Emojis: use about 4-5 in total. One to open the hook line, one per list item or bullet, and a final one at the close. Expressive, never cluttered.";

/// Output-only contract, repeated in both templates.
const OUTPUT_RULE: &str = "\
Output ONLY the post body. No preamble, no title, no explanation, no \"Here is your post\", no surrounding quotes.";

/// Generate template.
/// Replace: {persona_name}, {style_sample}, {source_content}, {format_rules}, {output_rule}
pub const GENERATE_PROMPT_TEMPLATE: &str = r#"You are an expert social media manager and ghostwriter.

You are given two texts:
1. Style Reference: text written by {persona_name}. Study their tone, vocabulary, sentence structure, emoji usage, and formatting habits.
2. Source Content: an article or text to be transformed.

TASK:
Rewrite the Source Content into a high-engagement LinkedIn post that sounds EXACTLY like {persona_name}.

STYLE REFERENCE ({persona_name}):
{style_sample}

SOURCE CONTENT:
{source_content}

REQUIREMENTS:
- Match the persona strictly: tone, vocabulary, sentence structure, and emoji habits.
- Keep it engaging, with a strong hook in the first line.
{format_rules}

{output_rule}"#;

/// Refine template.
/// Replace: {persona_name}, {current_draft}, {feedback}, {format_rules}, {output_rule}
pub const REFINE_PROMPT_TEMPLATE: &str = r#"You are an expert social media manager and ghostwriter for {persona_name}.

CURRENT POST:
{current_draft}

USER FEEDBACK:
"{feedback}"

TASK:
Rewrite the Current Post so it addresses the User Feedback while keeping the voice and style of {persona_name}.
Keep the same formatting rules:
{format_rules}

{output_rule}"#;

/// Renders the generate prompt. Style sample and source are capped at 5,000 chars each.
pub fn build_generate_prompt(
    persona_name: &str,
    style_sample: &str,
    source_content: &str,
) -> String {
    let format_rules = render(FORMAT_RULES, &[("persona_name", persona_name)]);
    render(
        GENERATE_PROMPT_TEMPLATE,
        &[
            ("persona_name", persona_name),
            ("style_sample", truncate_chars(style_sample, MAX_STYLE_SAMPLE_CHARS)),
            ("source_content", truncate_chars(source_content, MAX_SOURCE_CHARS)),
            ("format_rules", &format_rules),
            ("output_rule", OUTPUT_RULE),
        ],
    )
}

/// Renders the refine prompt. The draft is embedded verbatim.
pub fn build_refine_prompt(persona_name: &str, current_draft: &str, feedback: &str) -> String {
    let format_rules = render(FORMAT_RULES, &[("persona_name", persona_name)]);
    render(
        REFINE_PROMPT_TEMPLATE,
        &[
            ("persona_name", persona_name),
            ("current_draft", current_draft),
            ("feedback", feedback.trim()),
            ("format_rules", &format_rules),
            ("output_rule", OUTPUT_RULE),
        ],
    )
}

/// Single-pass `{name}` substitution.
///
/// Substituted values are copied as-is and never scanned again, so article
/// text containing `{feedback}` or similar stays literal. Unknown
/// placeholders are left untouched.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let capacity = template.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>();
    let mut out = String::with_capacity(capacity);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
