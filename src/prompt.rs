//! Prompt Builder - deterministic toddler-flashcard prompt construction
//!
//! Pure function from (word, category) to the generation request string.
//! Same inputs always produce the same prompt.

/// Subject clause for a word, styled by its category. Unknown categories
/// fall back to a generic descriptor.
fn subject_for(word: &str, category: &str) -> String {
    match category {
        "Animals & Creatures" => format!("a cute, friendly {word}, adorable and non-threatening"),
        "Food & Drink" => format!("a delicious-looking {word}, appetizing and colorful"),
        "Body Parts" => format!("a cartoon {word}, simple and educational"),
        "Clothing & Accessories" => format!("a bright, colorful {word}"),
        "Household Items & Furniture" => format!("a simple, recognizable {word}"),
        "Vehicles & Transportation" => format!("a friendly, colorful {word}"),
        "Nature & Weather" => format!("a beautiful {word}, vibrant and cheerful"),
        "Colors" => format!("a {word} colored object or shape"),
        "Shapes & Measurements" => format!("a clear {word} shape"),
        "Numbers & Quantities" => format!("the number {word} in a playful style"),
        "Common Objects & Toys" => format!("a fun, colorful {word}"),
        "People & Relationships" => format!("a friendly cartoon {word}, diverse and inclusive"),
        _ => format!("a simple, clear {word}"),
    }
}

/// Build the full generation prompt for one word.
pub fn build_prompt(word: &str, category: &str) -> String {
    format!(
        r#"A simple, clean illustration for toddler flashcard: {subject}.

Style: cute, friendly, educational, children's book illustration
Background: pure white (#FFFFFF)
Colors: bright, vibrant, high contrast
Details: bold outlines, minimal details, no text
Composition: centered, fills 75% of frame
Age: perfect for ages 1-4 years
Quality: high resolution, crisp and clear

The image should be instantly recognizable and engaging for young children."#,
        subject = subject_for(word, category)
    )
}
