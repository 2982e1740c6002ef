//! Instruction construction for translation attempts.
//!
//! The formality clause is a closed lookup on (target language, polite
//! flag) — defined only for Korean and Khmer, each with one polite and one
//! casual variant. Every other target gets no clause.

use crate::lang::Language;

use super::TranslationRequest;

/// Register instruction for the target language, if it has one.
pub fn formality_clause(target: Language, polite: bool) -> Option<&'static str> {
    match (target, polite) {
        (Language::Korean, true) => Some(
            "Use polite/formal Korean (존댓말/honorifics). Ensure the tone is respectful.",
        ),
        (Language::Korean, false) => Some(
            "Use casual/informal Korean (반말). Ensure the tone is friendly and conversational.",
        ),
        (Language::Khmer, true) => Some(
            "Use formal/polite Khmer (ភាសាផ្លូវការ/គួរសម). Use appropriate honorifics \
             (words like ខ្ញុំ, លោក, អ្នក) and polite particles suitable for business or \
             addressing elders. Ensure it sounds natural, not robotic.",
        ),
        (Language::Khmer, false) => Some(
            "Use natural, spoken Khmer (ភាសានិយាយ). Use casual vocabulary and sentence \
             structures common in daily conversation between friends. Avoid stiff, \
             written-style language.",
        ),
        (Language::English, _) => None,
    }
}

/// Build the full model instruction for one attempt.
pub fn build_instruction(request: &TranslationRequest) -> String {
    let mut instruction = format!(
        "Act as a professional translator.\n\
         Translate the following text from {} to {}.\n",
        request.source, request.target,
    );

    if let Some(clause) = request
        .polite
        .and_then(|polite| formality_clause(request.target, polite))
    {
        instruction.push_str(clause);
        instruction.push('\n');
    }

    instruction.push_str(
        "Ensure the translation is natural, idiomatically correct, and culturally \
         appropriate for the target audience.\n\
         Return ONLY the translated text, no explanations.\n\n",
    );
    instruction.push_str(&format!("Text: \"{}\"", request.text));

    instruction
}
