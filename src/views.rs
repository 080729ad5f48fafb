//! Server-rendered HTML for the six screens.

use std::fmt::Write as _;

use crate::prompt::{CalorieGoal, DietType, CALORIE_STEP, MAX_CALORIE_GOAL, MIN_CALORIE_GOAL};
use crate::session::SessionContext;

pub const APP_TITLE: &str = "NutriGen - Your Personalized Nutrition and Diet Planner";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    NutritionCalculator,
    DietPlanner,
    MealPlan,
    About,
    ContactUs,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Home,
        Page::NutritionCalculator,
        Page::DietPlanner,
        Page::MealPlan,
        Page::About,
        Page::ContactUs,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::NutritionCalculator => "Nutrition Calculator",
            Page::DietPlanner => "Diet Planner",
            Page::MealPlan => "Meal Plan",
            Page::About => "About",
            Page::ContactUs => "Contact Us",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::NutritionCalculator => "/nutrition-calculator",
            Page::DietPlanner => "/diet-planner",
            Page::MealPlan => "/meal-plan",
            Page::About => "/about",
            Page::ContactUs => "/contact-us",
        }
    }

    pub fn from_path(path: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|p| p.path() == path)
    }
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// What a screen shows below its inputs after a confirm action.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    pub error: Option<String>,
    pub result: Option<String>,
    pub preview: Option<String>,
}

impl Outcome {
    pub fn input_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn result(text: impl Into<String>) -> Self {
        Self {
            result: Some(text.into()),
            ..Self::default()
        }
    }

    fn render(&self, heading: &str) -> String {
        let mut html = String::new();
        if let Some(error) = &self.error {
            let _ = write!(html, r#"<div class="error">{}</div>"#, escape(error));
        }
        if let Some(src) = &self.preview {
            let _ = write!(
                html,
                r#"<img class="preview-image" src="{}" alt="Uploaded Image">"#,
                escape(src)
            );
        }
        if let Some(text) = &self.result {
            let _ = write!(
                html,
                r#"<div class="result"><div class="result-label">{}</div><pre class="result-text">{}</pre></div>"#,
                escape(heading),
                escape(text)
            );
        }
        html
    }
}

pub fn home() -> String {
    r#"<h2>Welcome to NutriGen!</h2>
<p>NutriGen helps you calculate nutrition from an image, plan your diet based on calorie input, and generate meal plans using selected ingredients.</p>
<img class="logo" src="/static/homepage_logo.svg" alt="NutriGen">
<p>Get started by navigating to one of the sections from the sidebar.</p>"#
        .to_string()
}

pub fn about() -> String {
    r#"<h2>About NutriGen</h2>
<p>NutriGen is a web application that helps you analyze nutrition, plan diets, and create meal plans with ease.</p>"#
        .to_string()
}

pub fn contact_us(emails: &[String]) -> String {
    if emails.is_empty() {
        return r#"<h2>Contact Us</h2>
<p>For any inquiries, please reach out to the NutriGen team.</p>"#
            .to_string();
    }
    let addresses = emails
        .iter()
        .map(|e| format!(r#"<a href="mailto:{0}">{0}</a>"#, escape(e)))
        .collect::<Vec<_>>()
        .join(" or ");
    format!("<h2>Contact Us</h2>\n<p>For any inquiries, please reach out at {addresses}.</p>")
}

pub fn nutrition_calculator(outcome: &Outcome) -> String {
    format!(
        r#"<h2>Nutrition Calculator</h2>
<form method="post" action="{action}" enctype="multipart/form-data">
  <label for="image">Upload an image of your food</label>
  <input type="file" id="image" name="image" accept=".jpg,.jpeg,.png,image/jpeg,image/png">
  <img id="preview" class="preview-image" alt="Uploaded Image" hidden>
  <button type="submit">Process Image</button>
</form>
<script>
  document.getElementById('image').addEventListener('change', (e) => {{
    const file = e.target.files[0];
    const preview = document.getElementById('preview');
    if (!file) {{ preview.hidden = true; return; }}
    const reader = new FileReader();
    reader.onload = (ev) => {{ preview.src = ev.target.result; preview.hidden = false; }};
    reader.readAsDataURL(file);
  }});
</script>
{outcome}"#,
        action = Page::NutritionCalculator.path(),
        outcome = outcome.render("Nutritional Information:"),
    )
}

pub fn diet_planner(goal: CalorieGoal, diet: DietType, outcome: &Outcome) -> String {
    let options: String = DietType::ALL
        .iter()
        .map(|d| {
            let selected = if *d == diet { " selected" } else { "" };
            format!(
                r#"<option value="{0}"{1}>{0}</option>"#,
                escape(d.label()),
                selected
            )
        })
        .collect();

    format!(
        r#"<h2>Diet Planner</h2>
<form method="post" action="{action}">
  <label for="calorie_goal">Enter Your Daily Calorie Goal</label>
  <input type="number" id="calorie_goal" name="calorie_goal" min="{min}" max="{max}" step="{step}" value="{value}">
  <label for="diet_type">Select Your Diet Type</label>
  <select id="diet_type" name="diet_type">{options}</select>
  <button type="submit">Generate Diet Plan</button>
</form>
{outcome}"#,
        action = Page::DietPlanner.path(),
        min = MIN_CALORIE_GOAL,
        max = MAX_CALORIE_GOAL,
        step = CALORIE_STEP,
        value = goal.get(),
        outcome = outcome.render("Diet Plan:"),
    )
}

pub fn meal_plan(ingredients: &str, outcome: &Outcome) -> String {
    format!(
        r#"<h2>Meal Plan</h2>
<form method="post" action="{action}">
  <label for="ingredients">Enter Ingredients (comma-separated)</label>
  <textarea id="ingredients" name="ingredients" rows="4">{ingredients}</textarea>
  <button type="submit">Generate Meal Plan</button>
</form>
{outcome}"#,
        action = Page::MealPlan.path(),
        ingredients = escape(ingredients),
        outcome = outcome.render("Meal Plan:"),
    )
}

fn navigation(current: Page) -> String {
    let mut html = String::from(r#"<nav><h3>Navigation</h3><ul>"#);
    for page in Page::ALL {
        let class = if page == current { r#" class="active""# } else { "" };
        let _ = write!(
            html,
            r#"<li><a href="{}"{}>{}</a></li>"#,
            page.path(),
            class,
            page.title()
        );
    }
    html.push_str("</ul></nav>");
    html
}

fn account_panel(ctx: &SessionContext, current: Page) -> String {
    let next = current.path();
    match (ctx.logged_in, ctx.username.as_deref()) {
        (true, Some(name)) => format!(
            r#"<section class="account"><h3>Account</h3><p>Signed in as <strong>{name}</strong></p>
<form method="post" action="/account/logout"><input type="hidden" name="next" value="{next}"><button type="submit">Log out</button></form></section>"#,
            name = escape(name),
        ),
        _ => format!(
            r#"<section class="account"><h3>Account</h3>
<form method="post" action="/account/login">
  <input type="hidden" name="next" value="{next}">
  <input name="username" placeholder="Username">
  <input name="password" type="password" placeholder="Password">
  <button type="submit">Log in</button>
</form>
<form method="post" action="/account/register">
  <input type="hidden" name="next" value="{next}">
  <input name="username" placeholder="Username">
  <input name="password" type="password" placeholder="Password">
  <button type="submit">Register</button>
</form></section>"#
        ),
    }
}

/// Wrap a screen body in the shared page chrome.
pub fn layout(ctx: &SessionContext, messages: &[String], body: &str) -> String {
    let current = ctx.current_page;
    let notices: String = messages
        .iter()
        .map(|m| format!(r#"<div class="notice">{}</div>"#, escape(m)))
        .collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>NutriGen - {page_title}</title>
<style>{STYLE}</style>
</head>
<body>
<aside class="sidebar">
{nav}
{account}
<h3>Quick Links</h3>
<ul class="links"><li><a href="#">Privacy Policy</a></li><li><a href="#">Terms of Service</a></li><li><a href="{contact}">Contact Us</a></li></ul>
</aside>
<main class="container">
<h1>{APP_TITLE}</h1>
{notices}
{body}
</main>
</body>
</html>"##,
        page_title = current.title(),
        nav = navigation(current),
        account = account_panel(ctx, current),
        contact = Page::ContactUs.path(),
    )
}

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); min-height: 100vh; display: flex; gap: 20px; padding: 20px; }
.sidebar { background: #f8f9ff; border-radius: 20px; padding: 20px; width: 260px; flex-shrink: 0; }
.sidebar h3 { color: #667eea; margin: 15px 0 10px; text-transform: uppercase; letter-spacing: 1px; font-size: 0.85em; }
.sidebar ul { list-style: none; }
.sidebar li a { display: block; padding: 6px 10px; border-radius: 10px; color: #333; text-decoration: none; }
.sidebar li a.active { background: #667eea; color: white; }
.sidebar input { width: 100%; margin-bottom: 6px; padding: 6px; }
.sidebar form { margin-bottom: 10px; }
.container { background: white; border-radius: 20px; box-shadow: 0 20px 60px rgba(0,0,0,0.3); padding: 40px; flex: 1; max-width: 900px; }
h1 { color: #333; margin-bottom: 20px; font-size: 1.8em; }
h2 { color: #333; margin-bottom: 15px; }
p { margin-bottom: 10px; color: #444; line-height: 1.6; }
label { display: block; margin: 10px 0 5px; color: #555; font-weight: 600; }
textarea, select, input[type=number] { width: 100%; padding: 8px; border-radius: 8px; border: 1px solid #ccc; }
button { margin-top: 12px; background: #667eea; color: white; border: none; padding: 8px 18px; border-radius: 20px; font-weight: 600; cursor: pointer; }
.logo, .preview-image { max-width: 100%; border-radius: 10px; margin: 20px 0; box-shadow: 0 4px 15px rgba(0,0,0,0.1); }
.result { background: #f8f9ff; border-radius: 10px; padding: 20px; margin-top: 20px; }
.result-label { color: #667eea; font-weight: 600; margin-bottom: 10px; }
.result-text { color: #333; line-height: 1.6; white-space: pre-wrap; font-family: inherit; }
.error { background: #fee; border: 2px solid #fcc; color: #c33; padding: 15px; border-radius: 10px; margin-top: 20px; }
.notice { background: #eef7ee; border: 2px solid #cec; color: #363; padding: 10px; border-radius: 10px; margin-bottom: 15px; }
"#;
