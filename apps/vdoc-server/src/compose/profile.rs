//! Page profiles
//!
//! The drug, recipe and nutrition pages share one form flow and differ only
//! in the data below.

use serde::{Deserialize, Serialize};

/// What the page asks about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Drug,
    Recipe,
    Nutrition,
}

impl SubjectKind {
    pub const ALL: [SubjectKind; 3] = [
        SubjectKind::Drug,
        SubjectKind::Recipe,
        SubjectKind::Nutrition,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "drug" | "drugs" => Some(Self::Drug),
            "recipe" | "chef" => Some(Self::Recipe),
            "nutrition" | "food" => Some(Self::Nutrition),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drug => "drug",
            Self::Recipe => "recipe",
            Self::Nutrition => "nutrition",
        }
    }

    pub fn profile(self) -> &'static PageProfile {
        match self {
            Self::Drug => &DRUG,
            Self::Recipe => &RECIPE,
            Self::Nutrition => &NUTRITION,
        }
    }
}

/// How typed input and extracted text become one subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubjectPolicy {
    /// Typed input wins; extracted text is used only when input is blank
    PreferInput,
    /// Non-blank input and extracted text joined with ", "
    JoinAll,
}

/// Which gateway reads text out of a cropped image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    Ocr,
    Vision,
}

/// Configuration of one page variant
pub struct PageProfile {
    pub kind: SubjectKind,
    pub title: &'static str,
    pub input_placeholder: &'static str,
    pub submit_label: &'static str,
    pub extract_label: &'static str,
    /// Label prefixed to the subject in the prompt ("Drug name", ...)
    pub subject_label: &'static str,
    pub example_subject: &'static str,
    pub example_question: &'static str,
    pub example_answer: &'static str,
    /// Prefix that starts the model's answer
    pub continuation_cue: &'static str,
    pub error_message: &'static str,
    pub extraction_failed: &'static str,
    pub subject_policy: SubjectPolicy,
    pub extraction: ExtractionMode,
    instructions: fn(&str) -> String,
}

impl std::fmt::Debug for PageProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageProfile")
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("subject_policy", &self.subject_policy)
            .field("extraction", &self.extraction)
            .finish_non_exhaustive()
    }
}

impl PageProfile {
    /// Task instruction block for `subject`, headed by the subject label
    pub fn instructions(&self, subject: &str) -> String {
        format!(
            "{}: {}\n\n{}",
            self.subject_label,
            subject,
            (self.instructions)(subject)
        )
    }
}

static DRUG: PageProfile = PageProfile {
    kind: SubjectKind::Drug,
    title: "Drug Interaction Checker",
    input_placeholder: "Enter drug name",
    submit_label: "Check Interactions",
    extract_label: "Extract Text",
    subject_label: "Drug name",
    example_subject: "Warfarin",
    example_question: "Drug name: give the complete drug interaction and primary use of Warfarin",
    example_answer: "**Drug Name:** Warfarin\n\n\
**Primary Use:** Anticoagulant (prevents blood clots)\n\n\
**Drug Interactions:**\n\n\
* **Antibiotics:**\n    * **Rifampin:** Decreases warfarin effectiveness\n    * **Ciprofloxacin:** Increases warfarin effectiveness\n\
* **NSAIDs (Pain Relievers):**\n    * **Aspirin, Ibuprofen:** Increase warfarin effectiveness\n\
* **Other Anticoagulants:**\n    * **Heparin:** Additive anticoagulant effect\n\
* **Antidepressants:**\n    * **Fluoxetine:** Increases warfarin effectiveness\n\
* **Anticonvulsants:**\n    * **Carbamazepine:** Decreases warfarin effectiveness\n\
* **Antivirals:**\n    * **Ritonavir:** Increases warfarin effectiveness\n\
* **Herbal Supplements:**\n    * **Ginkgo biloba:** Increases bleeding risk\n    * **Garlic:** May increase anticoagulant effect\n\
* **Foods:**\n    * **Leafy green vegetables (e.g., spinach, kale):** High in vitamin K, which can reduce warfarin effectiveness",
    continuation_cue: "Drug interaction: ",
    error_message: "An error occurred while fetching the drug interaction information.",
    extraction_failed: "Failed to extract text from image",
    subject_policy: SubjectPolicy::PreferInput,
    extraction: ExtractionMode::Ocr,
    instructions: drug_instructions,
};

static RECIPE: PageProfile = PageProfile {
    kind: SubjectKind::Recipe,
    title: "AI Chef Assistant",
    input_placeholder: "Enter ingredients",
    submit_label: "Get Recipe",
    extract_label: "Extract Ingredients",
    subject_label: "Ingredients",
    example_subject: "spinach, eggs",
    example_question: "Ingredients: spinach, eggs",
    example_answer: "## Spinach Egg Scramble\n\n\
**Steps:**\n\n\
1. Wash 2 cups of spinach and chop roughly.\n\
2. Whisk 3 eggs with a pinch of salt and pepper.\n\
3. Wilt the spinach in a pan with a teaspoon of olive oil for 2 minutes.\n\
4. Pour in the eggs and stir gently over low heat until just set.\n\n\
**Nutrients:** protein, vitamin K, vitamin A, folate, iron, choline.\n\n\
**Health benefits:** high-quality protein for satiety and muscle repair; leafy greens support eye and bone health.",
    continuation_cue: "Recipe: ",
    error_message: "An error occurred while fetching the food information.",
    extraction_failed: "Failed to extract ingredients from image",
    subject_policy: SubjectPolicy::JoinAll,
    extraction: ExtractionMode::Vision,
    instructions: recipe_instructions,
};

static NUTRITION: PageProfile = PageProfile {
    kind: SubjectKind::Nutrition,
    title: "Food Information Checker",
    input_placeholder: "Enter food item",
    submit_label: "Get Information",
    extract_label: "Extract Text",
    subject_label: "Food items",
    example_subject: "banana",
    example_question: "Food items: banana",
    example_answer: "| **Banana** | |\n\
|---|---|\n\
| Calories per serving | About 105 kcal (1 medium banana) |\n\
| Macronutrients | 1.3 g protein, 0.4 g fat, 27 g carbohydrates |\n\
| Micronutrients | Potassium, vitamin B6, vitamin C, magnesium |\n\
| Fiber | 3.1 g |\n\
| Benefits | Supports heart health and digestion |\n\
| Potential harmful effects | High sugar when overripe |\n\
| Additives | None in the whole fruit |\n\
| Dietary considerations | Gluten-free, vegan |",
    continuation_cue: "Nutrition information: ",
    error_message: "An error occurred while fetching the food information.",
    extraction_failed: "Failed to extract text from image",
    subject_policy: SubjectPolicy::JoinAll,
    extraction: ExtractionMode::Ocr,
    instructions: nutrition_instructions,
};

fn drug_instructions(subject: &str) -> String {
    format!(
        "1. Give the complete drug interactions and the primary use of {subject}, in the same structure as the example above.

2. If the drug name {subject} is not recognized:
   a) Convert the drug name completely to lowercase and check again
   b) If still unrecognized, use advanced string matching algorithms to identify the closest matching drug name
   c) If a close match is found, provide the information as in step 1, but preface with:
      \"The drug '[unrecognized drug]' is not recognized. Did you mean [closest match]? Here's information for [closest match]:\"
   d) If no close match is found, respond with:
      \"The drug '[unrecognized drug]' is not recognized and no close matches were found. Please verify the spelling and try again.\"

3. Do not invent interactions for a drug you cannot identify."
    )
}

fn recipe_instructions(subject: &str) -> String {
    format!(
        "1. For the given ingredients in {subject}:
   - Provide a detailed recipe to cook a healthy food item using these ingredients.
   - Ensure the recipe is easy to follow with step-by-step instructions.
   - List all the nutrients present in the final dish.
   - Mention any health benefits of the dish.

2. If an ingredient in {subject} is not recognized:
   a) Convert the ingredient name completely to lowercase and check again
   b) If still unrecognized, use advanced string matching algorithms to identify the closest matching ingredient
   c) If a close match is found, provide the information as in step 1, but preface with:
      \"The ingredient '[unrecognized ingredient]' is not recognized. Did you mean [closest match]? Here's the recipe using [closest match]:\"
   d) If no close match is found, respond with:
      \"The ingredient '[unrecognized ingredient]' is not recognized and no close matches were found. Please verify the spelling and try again.\"

3. Do not include any disclaimers or suggestions to consult a healthcare professional in the response.
4. Focus on healthy recipes and detailed nutrient information as the most prioritized information."
    )
}

fn nutrition_instructions(subject: &str) -> String {
    format!(
        "1. For each valid food item in {subject}:
   - Provide comprehensive nutritional information, including:
     a) Calories per serving
     b) Macronutrients (proteins, fats, carbohydrates)
     c) Micronutrients (vitamins and minerals)
     d) Fiber content
   - Detail the health effects of the food, including:
     a) Benefits to health
     b) Potential harmful effects
     c) Any chemicals or additives present and their effects, including sweeteners, colors, and artificial flavors
     d) Hazards associated with sweeteners, colors, and artificial flavors used
     e) Countries that have banned these sweeteners, colors, and artificial flavors and the reasons for the bans
   - Mention any dietary considerations or restrictions (e.g., gluten-free, vegan)

2. Format the response in a table with two columns for each food item, where the left column contains the section titles and the right column contains the descriptions.
3. Center the food item name at the top of each table and make it bold.

4. If a food item in {subject} is not recognized:
   a) Convert the food item name completely to lowercase and check again
   b) If still unrecognized, use advanced string matching algorithms to identify the closest matching food item
   c) If a close match is found, provide the information as in step 1, but preface with:
      \"The food item '[unrecognized food item]' is not recognized. Did you mean [closest match]? Here's information for [closest match]:\"
   d) If no close match is found, respond with:
      \"The food item '[unrecognized food item]' is not recognized and no close matches were found. Please verify the spelling and try again.\"

5. Do not include any disclaimers or suggestions to consult a healthcare professional in the response.
6. Focus on the nutritional information and health effects as the most prioritized information."
    )
}
