//! Prompt templates sent to the model.

use std::fmt;
use std::str::FromStr;

pub const MIN_CALORIE_GOAL: u32 = 1000;
pub const MAX_CALORIE_GOAL: u32 = 5000;
pub const CALORIE_STEP: u32 = 100;

const NUTRITION_PROMPT: &str = "You are an expert nutritionist. As a skilled nutritionist, you are required to analyze the food items in the image and determine the total nutritional value, also provide the details of every food items with calories intake in below format. You may also give just an estimate of its nutritional content if you are not able to guess it correctly, but make sure that the response that you give sounds professional.
1. Item 1 - number of calories
2. Item 2 - number of calories
......
......
Finally you can also mention whether the food is healthy or not and also mention the percentage split of the ratio of carbohydrates, fats, fibres, sugar and other important nutrients required in our diet";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DietType {
    Balanced,
    Keto,
    Vegan,
    LowCarb,
    HighProtein,
}

impl DietType {
    pub const ALL: [DietType; 5] = [
        DietType::Balanced,
        DietType::Keto,
        DietType::Vegan,
        DietType::LowCarb,
        DietType::HighProtein,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DietType::Balanced => "Balanced",
            DietType::Keto => "Keto",
            DietType::Vegan => "Vegan",
            DietType::LowCarb => "Low Carb",
            DietType::HighProtein => "High Protein",
        }
    }
}

impl fmt::Display for DietType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DietType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        DietType::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown diet type: {s}"))
    }
}

/// Daily calorie target, always within `[MIN_CALORIE_GOAL, MAX_CALORIE_GOAL]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalorieGoal(u32);

impl CalorieGoal {
    pub fn new(value: u32) -> Result<Self, String> {
        if (MIN_CALORIE_GOAL..=MAX_CALORIE_GOAL).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!(
                "Calorie goal must be between {MIN_CALORIE_GOAL} and {MAX_CALORIE_GOAL}."
            ))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for CalorieGoal {
    fn default() -> Self {
        Self(MIN_CALORIE_GOAL)
    }
}

impl FromStr for CalorieGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("Calorie goal must be a whole number, got {:?}.", s.trim()))?;
        CalorieGoal::new(value)
    }
}

pub fn build_nutrition_prompt() -> String {
    NUTRITION_PROMPT.to_string()
}

pub fn build_diet_prompt(goal: CalorieGoal, diet: DietType) -> String {
    format!(
        "Create a {} diet plan for a daily intake of {} calories.",
        diet.label(),
        goal.get()
    )
}

/// The ingredient list is passed through verbatim.
pub fn build_meal_plan_prompt(ingredients: &str) -> String {
    format!("Generate a meal plan using the following ingredients: {ingredients}.")
}
