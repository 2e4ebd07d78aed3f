//! Prompt templates for the model pipelines.
//!
//! Callers build the user prompt before submitting a task; the worker
//! only adds the kind's system prompt and, for leaf analysis, threads the
//! vision description into [`diagnosis_prompt`].

use crate::task::TaskKind;

/// User text sent with the leaf image to the vision model.
pub const LEAF_DESCRIPTION_PROMPT: &str = "Describe this leaf in detail.";

pub const PATHOLOGIST_SYSTEM_PROMPT: &str = "You are a plant pathologist.";

pub const CHAT_SYSTEM_PROMPT: &str = "You are an agricultural assistant.";

pub const FERTILIZER_SYSTEM_PROMPT: &str =
    "You are a fertilizer market analyst. Use reasoning and provide practical recommendations.";

pub const DOCTOR_SYSTEM_PROMPT: &str =
    "You are an agricultural extension advisor who knows local plant clinics, \
     crop doctors and agronomists. Provide practical contact guidance.";

/// System prompt for the reasoning call of a given task kind.
pub fn system_prompt(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::LeafAnalysis => PATHOLOGIST_SYSTEM_PROMPT,
        TaskKind::Chat => CHAT_SYSTEM_PROMPT,
        TaskKind::ShopSearch => FERTILIZER_SYSTEM_PROMPT,
        TaskKind::DoctorSearch => DOCTOR_SYSTEM_PROMPT,
    }
}

/// Second stage of the leaf pipeline: diagnose from the vision output.
pub fn diagnosis_prompt(description: &str, location: Option<&str>) -> String {
    let mut prompt = format!(
        "Based on this description: {description}. Identify crop and disease with remedy."
    );
    if let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) {
        prompt.push_str(&format!(" The farm is located in {location}."));
    }
    prompt
}

pub fn shop_search_prompt(crop: &str, requirement: &str) -> String {
    format!(
        "\nFind best fertilizers online for crop: {crop}\n\
         Requirement: {requirement}\n\
         Provide:\n\
         - Product Name\n\
         - NPK Ratio\n\
         - Approx Price\n\
         - Usage Reason\n\
         - Online availability\n\
         - Why this matches user requirement\n"
    )
}

pub fn doctor_search_prompt(location: &str, crop: Option<&str>) -> String {
    let mut prompt = format!("Find plant doctors, crop clinics or agronomists near: {location}\n");
    if let Some(crop) = crop.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str(&format!("Crop: {crop}\n"));
    }
    prompt.push_str(
        "Provide:\n\
         - Name\n\
         - Type of service\n\
         - Approx distance or area\n\
         - How to contact\n",
    );
    prompt
}
