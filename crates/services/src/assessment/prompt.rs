use super::AssessmentRequest;

/// Builds the single grading instruction sent to a judge backend.
pub fn build_prompt(request: &AssessmentRequest) -> String {
    let diacritical = if request.original_diacritical_text.trim().is_empty() {
        request.original_text.as_str()
    } else {
        request.original_diacritical_text.as_str()
    };
    let verse_line = match request.verse_count {
        Some(n) => format!("Number of verses: {n}\n"),
        None => String::new(),
    };

    format!(
        "You are an experienced recitation instructor. Compare a student's \
recitation, given as an automatic transcript, with the canonical text of the \
passage and grade it.\n\
\n\
Passage reference: {reference}\n\
{verse_line}\
Canonical text (plain):\n{plain}\n\
\n\
Canonical text (fully vowelized):\n{diacritical}\n\
\n\
Student transcript:\n{transcript}\n\
\n\
Grade the words recited, not the transcript's punctuation or spelling \
conventions. Every score is an integer from 0 to 100.\n\
Classify each mistake with exactly one of these types:\n\
- \"missing\": a word or verse of the canonical text was not recited\n\
- \"incorrect\": a word was recited wrongly or mispronounced\n\
- \"extra\": something was recited that is not in the canonical text\n\
- \"order\": words or verses were recited out of order\n\
\n\
Respond with JSON ONLY, no prose and no code fences, using exactly this shape:\n\
{{\"score\": 0, \"feedback\": \"\", \"accuracyDetails\": {{\"overallAccuracy\": 0, \
\"pronunciation\": 0, \"completeness\": 0, \"correctOrder\": 0}}, \
\"mistakes\": [{{\"type\": \"missing\", \"description\": \"\"}}], \
\"suggestions\": [\"\"], \"confidence\": 0.0}}\n\
confidence is your certainty in this grading, from 0.0 to 1.0.",
        reference = request.reference,
        plain = request.original_text.trim(),
        diacritical = diacritical.trim(),
        transcript = request.transcript.trim(),
    )
}
