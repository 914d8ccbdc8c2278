use crate::models::{FocusArea, PatientRecord};

/// Format the analysis prompt for a patient and the chosen focus areas.
///
/// Free-text fields are inserted verbatim.
pub fn build(record: &PatientRecord, focus_areas: &[FocusArea]) -> String {
    let history = record.history_labels().join(", ");
    let focus = focus_areas
        .iter()
        .map(FocusArea::label)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Please analyze this dental X-ray image with the following context:\n\
         \n\
         Patient Information:\n\
         - Name: {name}\n\
         - Age: {age}\n\
         - Gender: {gender}\n\
         - Medical History: {history}\n\
         - Current Complaints: {complaints}\n\
         - Previous Treatments: {treatments}\n\
         - Smoking Status: {smoking}\n\
         \n\
         Focus Areas: {focus}\n\
         \n\
         Provide:\n\
         1. Identified abnormalities\n\
         2. Potential diagnosis\n\
         3. Recommendations\n",
        name = record.name,
        age = record.age,
        gender = record.gender,
        complaints = record.dental_complaints,
        treatments = record.previous_treatments,
        smoking = record.smoking_status,
    )
}
