const INSTRUCTIONS: &str = r#"Analyze the 'Original Text' and 'New Text' below. Identify all changes and represent them as a sequence of blocks.

Your response MUST be a single, valid JSON object containing ONLY the key "change_blocks".
The value of "change_blocks" MUST be a JSON array of block objects.
Each block object MUST have the following keys:
- "status": one of "equal", "deleted", "added", "modified".
- "text1": the relevant text from the Original Text. MUST be "" when status is "added".
- "text2": the relevant text from the New Text. MUST be "" when status is "deleted".

Guidelines:
- Represent the entire content of both inputs through the sequence of blocks.
- Keep text segments and line breaks exactly as they appear. Use \n for newlines inside JSON strings.
- Use "equal" for segments that are identical in both texts.
- Use "deleted" for text that exists only in the Original Text.
- Use "added" for text that exists only in the New Text.
- Use "modified" only for segments that correspond but have internal changes. Prefer "deleted" followed by "added" when the texts are unrelated.
- Cover both texts sequentially without gaps or overlaps: concatenating every "text1" rebuilds the Original Text, concatenating every "text2" rebuilds the New Text.

Example response:
{
  "change_blocks": [
    {"status": "equal", "text1": "This part is unchanged.\n", "text2": "This part is unchanged.\n"},
    {"status": "modified", "text1": "The old sentence.", "text2": "The revised sentence."},
    {"status": "deleted", "text1": "This section was removed.", "text2": ""},
    {"status": "added", "text1": "", "text2": "This section was newly added."},
    {"status": "equal", "text1": " The end.", "text2": " The end."}
  ]
}

Do not include anything outside the single JSON object, no code fences and no explanations."#;

/// Build the classification prompt for one chunk pair.
pub fn build_prompt(original: &str, revised: &str) -> String {
    format!(
        "{INSTRUCTIONS}\n\
         --- Original Text ---\n{original}\n--- End Original Text ---\n\
         --- New Text ---\n{revised}\n--- End New Text ---\n\
         Now, provide the JSON output:"
    )
}
