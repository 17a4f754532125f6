/// Builds the instruction sent to the text service. The reply layout it asks
/// for is what `parser` reads back, but nothing enforces it.
pub fn build_prompt(labels: &[String]) -> String {
    format!(
        "\n\
Given these possible food labels: {},\n\
1. List only the key ingredients (3–6 items max).\n\
2. Give calories per ingredient per serving.\n\
3. Estimate total calories per serving (as a number only).\n\
4. Dish Name based on label recieved.\n\
\n\
Respond in this format:\n\
Dish Name: <name>\n\
Ingredients: <comma-separated>\n\
Calories Per Ingredient: <comma separated>\n\
Total Calories Per Serving: <number>\n",
        labels.join(", ")
    )
}
