//! Prompt text sent to the model.

use std::fmt::Write as _;

use catseed_core::{CategoryContext, OptionChoice};

const NO_DESCRIPTION: &str = "No description available";
const NO_OPTIONS: &str = "No options available yet.";

fn description(category: &CategoryContext) -> &str {
    category
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(NO_DESCRIPTION)
}

/// Prompt asking for the variant options that fit a category.
#[must_use]
pub fn variant_prompt(category: &CategoryContext) -> String {
    format!(
        r#"
You are an e-commerce domain expert.

Given a product category, generate all realistic product variant options
used in modern e-commerce platforms.

Rules:
- Variants must be relevant to the category
- Do NOT invent impossible variants
- Keep options reusable across products
- Values must be strings
- Return ONLY valid JSON, no markdown, no code blocks, just raw JSON

Output format:
{{
  "options": [
    {{
      "code": "snake_case",
      "name": "Human Readable",
      "values": ["value1", "value2"]
    }}
  ]
}}

Category:
Name: {name}
Description: {description}
"#,
        name = category.name,
        description = description(category),
    )
}

/// Prompt asking which of `options` apply to a category.
#[must_use]
pub fn option_prompt(category: &CategoryContext, options: &[OptionChoice]) -> String {
    format!(
        r#"
You are an e-commerce domain expert.

Given a product category and a list of available product variant options,
determine which options are relevant and should be suggested for this category.

Rules:
- Only suggest options that make sense for the category
- Be selective - not all options apply to every category
- Consider the category's typical products
- Return ONLY valid JSON, no markdown, no code blocks, just raw JSON

Output format:
{{
  "suggested_option_codes": ["option_code1", "option_code2", "option_code3"]
}}

Category:
Name: {name}
Description: {description}

Available Options:
{options}
"#,
        name = category.name,
        description = description(category),
        options = options_list(options),
    )
}

fn options_list(options: &[OptionChoice]) -> String {
    if options.is_empty() {
        return NO_OPTIONS.to_string();
    }
    let mut out = String::new();
    for (i, option) in options.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "- {} (code: {})", option.name, option.code);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(description: Option<&str>) -> CategoryContext {
        CategoryContext {
            name: "Running Shoes".to_string(),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn variant_prompt_names_the_category() {
        let prompt = variant_prompt(&category(Some("Shoes for running")));
        assert!(prompt.contains("Name: Running Shoes"));
        assert!(prompt.contains("Description: Shoes for running"));
        assert!(prompt.contains("\"options\": ["));
    }

    #[test]
    fn missing_description_uses_placeholder() {
        let prompt = variant_prompt(&category(None));
        assert!(prompt.contains("Description: No description available"));

        let prompt = option_prompt(&category(Some("   ")), &[]);
        assert!(prompt.contains("Description: No description available"));
    }

    #[test]
    fn option_prompt_lists_choices_by_name_and_code() {
        let options = vec![
            OptionChoice {
                code: "color".to_string(),
                name: "Color".to_string(),
            },
            OptionChoice {
                code: "shoe_size".to_string(),
                name: "Shoe Size".to_string(),
            },
        ];
        let prompt = option_prompt(&category(None), &options);
        assert!(prompt.contains("- Color (code: color)\n- Shoe Size (code: shoe_size)"));
    }

    #[test]
    fn option_prompt_without_choices_says_so() {
        let prompt = option_prompt(&category(None), &[]);
        assert!(prompt.contains("Available Options:\nNo options available yet."));
    }
}
