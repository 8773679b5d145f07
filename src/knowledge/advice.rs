//! Static treatment advice and explanations for known diagnoses

const GENERIC_ADVICE: &str = "Consult a specialist for an appropriate treatment plan. \
General care includes adequate rest, staying hydrated, and avoiding known risk factors.";

const GENERIC_EXPLANATION: &str = "A medical condition that needs further evaluation by a \
health professional. This diagnosis is based on the symptoms you reported and may need \
additional examination to confirm.";

/// Treatment advice for a diagnosis label, falling back to generic advice
pub fn treatment_advice(diagnosis: &str) -> &'static str {
    match diagnosis {
        "Fungal infection" => {
            "- Use an antifungal cream (such as clotrimazole or miconazole)\n\
             - Keep the skin area dry and clean\n\
             - Change clothes and towels regularly\n\
             - Avoid sharing personal items\n\
             - See a doctor if it does not improve within 2 weeks"
        }
        "Allergy" => {
            "- Avoid known allergens\n\
             - Use antihistamines (such as cetirizine or loratadine)\n\
             - Use eye drops for eye symptoms\n\
             - Consider an allergy test to identify the cause\n\
             - See a doctor for stronger prescription medication if needed"
        }
        "GERD" => {
            "- Avoid spicy, acidic, and fatty foods\n\
             - Eat small, frequent meals\n\
             - Do not lie down right after eating\n\
             - Use antacids or PPI medication (such as omeprazole)\n\
             - Raise the head of the bed when sleeping"
        }
        _ => GENERIC_ADVICE,
    }
}

/// Short explanation of a diagnosis label, falling back to a generic note
pub fn disease_explanation(diagnosis: &str) -> &'static str {
    match diagnosis {
        "Fungal infection" => {
            "A skin infection caused by various dermatophyte fungi. Common symptoms include \
             a red rash, itching, and skin discoloration. It often appears in moist areas such \
             as between the toes, the armpits, or the groin."
        }
        "Allergy" => {
            "An excessive immune reaction to foreign substances (allergens) such as pollen, \
             dust, or certain foods. Symptoms include sneezing, watery eyes, itching, and \
             skin rash."
        }
        "GERD" => {
            "Gastroesophageal Reflux Disease (GERD) is a condition where stomach acid flows back \
             into the esophagus. Symptoms include heartburn, a sour taste in the mouth, and \
             difficulty swallowing. It is caused by a weakened valve between the stomach and \
             the esophagus."
        }
        _ => GENERIC_EXPLANATION,
    }
}
