//! Prompt construction for the two backend operations: section formatting and
//! assistant chat.

/// System instruction prepended to every assistant conversation.
pub const ASSISTANT_SYSTEM_PROMPT: &str = "\
You are a scientist writing a research paper. Using the data provided by the \
user, give proper paragraphs in formal scientific style.

YOUR PRIMARY TASK:
When the user provides bullet points or informal notes, convert them into \
formal, well-structured scientific paper text.

WRITING STYLE REQUIREMENTS:
- Write in formal academic tone suitable for peer-reviewed journals
- Use third person and passive voice where appropriate
- Convert bullet points into flowing paragraphs with proper transitions
- Maintain scientific rigor and precision
- Write complete, publication-ready paragraphs
- NEVER return bullet points - always return formatted paragraphs

MATHEMATICAL EXPRESSIONS (CRITICAL):
When providing mathematical expressions or equations, ALWAYS use proper LaTeX \
syntax:
- Inline math: $E = mc^2$
- Display equations: $$\\int_0^\\infty e^{-x^2} dx = \\frac{\\sqrt{\\pi}}{2}$$
- Use LaTeX commands: \\alpha, \\beta, \\frac{a}{b}, \\sum, \\int, \\sqrt{x}

FORMATTING:
- The user's content will be rendered with LaTeX support
- Do not use plain text for equations or formulas
- Always return properly formatted paragraphs, never bullet points";

/// Build the formatting prompt for a single section's notes.
pub fn section_prompt(title: &str, content: &str, citations: &[String]) -> String {
    let mut prompt = format!(
        "You are a scientist writing a research paper. Convert the following \
         bullet points into a concise scientific paragraph.\n\n\
         CRITICAL RULES:\n\
         - Use ONLY the information provided below - do not add extra details \
         or expand beyond what's given\n\
         - Keep the paragraph concise and to the point\n\
         - Convert bullet points to flowing sentences, but stay brief\n\
         - Use formal academic tone\n\
         - For math expressions, use LaTeX: $E = mc^2$ or $$\\int_0^\\infty$$\n\
         - Return ONLY the paragraph, no extra text\n\n\
         Section Title: {title}\n\n\
         Data:\n{content}\n"
    );
    if !citations.is_empty() {
        prompt.push_str(&format!(
            "\nIntegrate the following citations naturally if possible: {}\n",
            citations.join(", ")
        ));
    }
    prompt.push_str("\nScientific paragraph:");
    prompt
}
