use crate::languages;
use crate::models::{LearnerProfile, Proficiency};

pub const DIALOGUE: &str = include_str!("../data/prompts/dialogue.txt");
pub const GUIDANCE_BEGINNER: &str = include_str!("../data/prompts/guidance_beginner.txt");
pub const GUIDANCE_INTERMEDIATE: &str = include_str!("../data/prompts/guidance_intermediate.txt");
pub const GUIDANCE_ADVANCED: &str = include_str!("../data/prompts/guidance_advanced.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

pub fn guidance_for(proficiency: Proficiency) -> &'static str {
    match proficiency {
        Proficiency::Beginner => GUIDANCE_BEGINNER.trim(),
        Proficiency::Intermediate => GUIDANCE_INTERMEDIATE.trim(),
        Proficiency::Advanced => GUIDANCE_ADVANCED.trim(),
    }
}

/// Instruction text sent alongside the image. Language codes are resolved to
/// names; only the learner's own tier guidance is included.
pub fn dialogue_prompt(profile: &LearnerProfile) -> String {
    let age = profile.age().to_string();
    render(
        DIALOGUE,
        &[
            (
                "native_language",
                languages::display_name(&profile.native_language),
            ),
            (
                "target_language",
                languages::display_name(&profile.target_language),
            ),
            ("age", &age),
            ("proficiency", profile.proficiency.as_str()),
            ("guidance", guidance_for(profile.proficiency)),
        ],
    )
}
