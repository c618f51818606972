//! Fixed prompts for the recommendation flow

/// Prepended to the user's query on the first turn
pub const INSTRUCTION_PREFIX: &str = "You are helping a user choose a dependency. \
Give a recommendation based on the user's request. \
You may be given a JSON report about a package along with the request; do not repeat the JSON back to the user. \
Judge whether the package is malicious or deprecated using the report you receive as tool input. \
Give little weight to the number of stars or forks. \
If the package is malicious or deprecated, recommend a safer alternative. \
If the package is safe, recommend the package. \
Keep the answer short and do not restate the tool output. \
The user says:";

/// Sent after the tool answer in a fresh context to get the final paragraph
pub const SUMMARY_INSTRUCTION: &str = "Summarize the previous response in a single short paragraph. \
Focus on whether the package is malicious or deprecated. \
If you advise to not use the package, recommend a safer alternative. \
If the package is safe, recommend the package.";

/// Build the first user message from the free-text query
pub fn build_user_prompt(query: &str) -> String {
    format!("{} {}", INSTRUCTION_PREFIX, query)
}
